//! Element descriptors
//!
//! An [`Element`] is the immutable description of one UI node: a type, its
//! props and its ordered children. Elements are cheap to clone; the props are
//! shared behind an `Rc` and never mutated after creation.
//!
//! # Example
//!
//! ```rust
//! use fibra_core::{children, create_element, props, ElementType};
//!
//! let ui = create_element(
//!     "div",
//!     props! { "id" => "x" },
//!     children![create_element("span", None, children!["hi"])],
//! );
//!
//! assert_eq!(ui.props().children().len(), 1);
//! let span = &ui.props().children()[0];
//! assert!(span.props().children()[0].ty().is_text());
//! ```

use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::props::{
    event_prop_key, EventHandler, PropValue, Props, DEFAULT_EVENT_PREFIX, NODE_VALUE,
};

// =============================================================================
// ElementType
// =============================================================================

/// What an element describes
///
/// Equality decides whether a fiber can be reused across passes: text matches
/// text, tags match by name, components match by identity.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// A text node; its content is the `nodeValue` prop
    Text,
    /// A tagged element node (`"div"`)
    Tag(String),
    /// A component resolved by invoking it with its props
    Component(Component),
}

impl ElementType {
    pub fn is_text(&self) -> bool {
        matches!(self, ElementType::Text)
    }

    pub fn tag_name(&self) -> Option<&str> {
        match self {
            ElementType::Tag(name) => Some(name),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&Component> {
        match self {
            ElementType::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Short label for logs and snapshots
    pub fn label(&self) -> &str {
        match self {
            ElementType::Text => "#text",
            ElementType::Tag(name) => name,
            ElementType::Component(component) => component.name(),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Tag(tag.to_string())
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Tag(tag)
    }
}

impl From<Component> for ElementType {
    fn from(component: Component) -> Self {
        ElementType::Component(component)
    }
}

// =============================================================================
// Element
// =============================================================================

/// Immutable element descriptor
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    ty: ElementType,
    props: Rc<Props>,
}

impl Element {
    pub fn new(ty: impl Into<ElementType>, props: Props) -> Self {
        Self {
            ty: ty.into(),
            props: Rc::new(props),
        }
    }

    /// A text element whose `nodeValue` is `value`'s display form
    pub fn text(value: impl fmt::Display) -> Self {
        text_element(value)
    }

    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[Element] {
        self.props.children()
    }

    /// Whether both descriptors share the same props allocation
    pub fn shares_props(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.props, &other.props)
    }
}

// =============================================================================
// Children
// =============================================================================

/// A child passed to [`create_element`] before normalization
///
/// Element children are kept as they are. Any other value becomes a text
/// element. `Many` is flattened in place and `Empty` is dropped.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Value(PropValue),
    Many(Vec<Child>),
    Empty,
}

impl Child {
    fn flatten_into(self, out: &mut Vec<Element>) {
        match self {
            Child::Element(element) | Child::Value(PropValue::Element(element)) => {
                out.push(element)
            }
            Child::Value(value) => out.push(text_element(value)),
            Child::Many(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            Child::Empty => {}
        }
    }
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<ElementBuilder> for Child {
    fn from(builder: ElementBuilder) -> Self {
        Child::Element(builder.build())
    }
}

impl From<PropValue> for Child {
    fn from(value: PropValue) -> Self {
        Child::Value(value)
    }
}

macro_rules! impl_value_child {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Value(PropValue::from(value))
                }
            }
        )*
    };
}

impl_value_child!(&str, String, &String, bool, f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(child: Option<T>) -> Self {
        child.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(children: Vec<T>) -> Self {
        Child::Many(children.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Build a text element
pub fn text_element(value: impl fmt::Display) -> Element {
    Element::new(
        ElementType::Text,
        Props::new().with(NODE_VALUE, value.to_string()),
    )
}

/// Build an element from a type, optional props and children
///
/// Never fails: any child that is not an element is converted to a text
/// element holding its string form.
pub fn create_element<I>(
    ty: impl Into<ElementType>,
    props: impl Into<Option<Props>>,
    children: I,
) -> Element
where
    I: IntoIterator,
    I::Item: Into<Child>,
{
    let mut normalized = Vec::new();
    for child in children {
        child.into().flatten_into(&mut normalized);
    }

    let props = props.into().unwrap_or_default().with_children(normalized);
    Element::new(ty, props)
}

/// Start a builder for a tagged element
///
/// ```rust
/// use fibra_core::{tag, Element};
///
/// let el: Element = tag("button").prop("id", "go").child("Go").build();
/// assert_eq!(el.ty().tag_name(), Some("button"));
/// ```
pub fn tag(name: impl Into<String>) -> ElementBuilder {
    ElementBuilder::new(ElementType::Tag(name.into()))
}

/// Fluent element builder
#[derive(Clone, Debug)]
pub struct ElementBuilder {
    ty: ElementType,
    props: Props,
    children: Vec<Child>,
}

impl ElementBuilder {
    pub fn new(ty: impl Into<ElementType>) -> Self {
        Self {
            ty: ty.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// Bind a handler for `event` under the default `on` prefix
    pub fn on(mut self, event: &str, handler: EventHandler) -> Self {
        self.props
            .insert(event_prop_key(DEFAULT_EVENT_PREFIX, event), handler);
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Element {
        create_element(self.ty, self.props, self.children)
    }
}

impl From<ElementBuilder> for Element {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}
