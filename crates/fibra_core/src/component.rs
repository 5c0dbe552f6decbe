//! Components
//!
//! A component is a render function from props to a single element. Stateful
//! components use the [`Hooks`] handle they are given to read and schedule
//! state, which is how the renderer knows which fiber a hook belongs to.

use std::any::{type_name, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::element::Element;
use crate::hooks::Hooks;
use crate::props::Props;

/// Render behaviour of a component
pub trait Render: 'static {
    fn render(&self, props: &Props, hooks: &mut Hooks<'_>) -> Element;
}

impl<F> Render for F
where
    F: Fn(&Props, &mut Hooks<'_>) -> Element + 'static,
{
    fn render(&self, props: &Props, hooks: &mut Hooks<'_>) -> Element {
        self(props, hooks)
    }
}

/// A named, shareable component
///
/// Two components are the same type if they wrap the same render type under the
/// same name. Clones are always equal, so a fiber built for one pass is reused
/// by the next as long as the component value comes from the same definition.
#[derive(Clone)]
pub struct Component {
    name: Rc<str>,
    type_id: TypeId,
    render: Rc<dyn Render>,
}

impl Component {
    /// Wrap a render function or closure under `name`
    pub fn new<F>(name: impl Into<Rc<str>>, render: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> Element + 'static,
    {
        Self::from_render(name, render)
    }

    /// Wrap any [`Render`] implementation
    pub fn from_render<R: Render>(name: impl Into<Rc<str>>, render: R) -> Self {
        Self {
            name: name.into(),
            type_id: TypeId::of::<R>(),
            render: Rc::new(render),
        }
    }

    /// Wrap a render function, naming the component after its type
    pub fn from_fn<F>(render: F) -> Self
    where
        F: Fn(&Props, &mut Hooks<'_>) -> Element + 'static,
    {
        Self::new(type_name::<F>(), render)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the render function
    pub fn render(&self, props: &Props, hooks: &mut Hooks<'_>) -> Element {
        self.render.render(props, hooks)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::text_element;

    fn greeting(props: &Props, _hooks: &mut Hooks<'_>) -> Element {
        let name = props.get("name").map(|v| v.to_string()).unwrap_or_default();
        text_element(format!("hello {}", name))
    }

    fn farewell(_props: &Props, _hooks: &mut Hooks<'_>) -> Element {
        text_element("bye")
    }

    #[test]
    fn test_clones_are_equal() {
        let a = Component::new("Greeting", greeting);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_distinct_functions_differ() {
        // Function items each have a unique type
        let a = Component::new("Same", greeting);
        let b = Component::new("Same", farewell);
        assert_ne!(a, b);
    }

    #[test]
    fn test_same_function_different_name() {
        let a = Component::new("A", greeting);
        let b = Component::new("B", greeting);
        assert_ne!(a, b);
        assert_eq!(Component::new("A", greeting), a);
    }

    struct Fixed(&'static str);

    impl Render for Fixed {
        fn render(&self, _props: &Props, _hooks: &mut Hooks<'_>) -> Element {
            text_element(self.0)
        }
    }

    #[test]
    fn test_custom_render_type() {
        let c = Component::from_render("Fixed", Fixed("x"));
        let mut slots = crate::hooks::HookSlots::new();
        let out = c.render(&Props::new(), &mut Hooks::detached(&mut slots));
        assert_eq!(out.props().node_value().unwrap().to_string(), "x");
        // Same render type and name, different data
        assert_eq!(c, Component::from_render("Fixed", Fixed("y")));
    }

    #[test]
    fn test_closure_component() {
        let suffix = String::from("!");
        let c = Component::new("Shout", move |props: &Props, _hooks: &mut Hooks<'_>| {
            let text = props.get("text").map(|v| v.to_string()).unwrap_or_default();
            text_element(format!("{}{}", text, suffix))
        });
        let mut slots = crate::hooks::HookSlots::new();
        let out = c.render(
            &Props::new().with("text", "hey"),
            &mut Hooks::detached(&mut slots),
        );
        assert_eq!(out.props().node_value().unwrap().to_string(), "hey!");
    }

    #[test]
    fn test_from_fn_name() {
        let c = Component::from_fn(greeting);
        assert!(c.name().ends_with("greeting"));
    }
}
