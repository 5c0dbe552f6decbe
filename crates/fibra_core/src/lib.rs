//! Fibra Core
//!
//! The render-target independent half of the Fibra UI engine:
//!
//! - **Elements**: immutable descriptors built with [`create_element`]
//! - **Props**: an ordered map of typed [`PropValue`]s plus children
//! - **Components**: render functions that turn props into an element
//! - **Hooks**: per-fiber `use_state` and `use_effect`
//! - **Configuration**: [`RendererConfig`] presets and builders
//!
//! The reconciler in `fibra_reconciler` turns elements into host nodes.
//!
//! # Example
//!
//! ```rust
//! use fibra_core::prelude::*;
//!
//! fn label(props: &Props, _hooks: &mut Hooks<'_>) -> Element {
//!     let text = props.get("text").map(|v| v.to_string()).unwrap_or_default();
//!     tag("span").child(text).build()
//! }
//!
//! let ui = create_element(
//!     "div",
//!     props! { "id" => "root" },
//!     children![
//!         create_element(Component::new("Label", label), props! { "text" => "hi" }, children![]),
//!     ],
//! );
//! assert_eq!(ui.children()[0].ty().label(), "Label");
//! ```

pub mod component;
pub mod config;
pub mod element;
pub mod error;
pub mod hooks;
pub mod props;

pub use component::{Component, Render};
pub use config::RendererConfig;
pub use element::{create_element, tag, text_element, Child, Element, ElementBuilder, ElementType};
pub use error::{FibraError, HostError, Result};
pub use hooks::{
    deps_changed, Cleanup, Deps, FiberId, HookSlots, Hooks, SetState, StateUpdate, Teardown,
    UpdateSink,
};
pub use props::{
    event_name, event_prop_key, AnyValue, Event, EventCallback, EventHandler, PropValue, Props,
    CHILDREN, DEFAULT_EVENT_PREFIX, NODE_VALUE,
};

/// Build a [`Props`] map from `key => value` pairs
///
/// ```rust
/// let props = fibra_core::props! { "id" => "x", "tabIndex" => 2 };
/// assert_eq!(props.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::Props::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Props::new()$(.with($key, $value))+
    };
}

/// Build a list of children, converting each item with [`Child::from`]
#[macro_export]
macro_rules! children {
    () => {
        ::std::vec::Vec::<$crate::Child>::new()
    };
    ($($child:expr),+ $(,)?) => {
        ::std::vec![$($crate::Child::from($child)),+]
    };
}

/// Common imports for building UIs
pub mod prelude {
    pub use crate::component::Component;
    pub use crate::element::{create_element, tag, text_element, Child, Element};
    pub use crate::hooks::{Cleanup, Deps, Hooks, SetState};
    pub use crate::props::{Event, EventHandler, PropValue, Props};
    pub use crate::{children, props};
}
