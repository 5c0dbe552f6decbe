//! Render target interface
//!
//! A [`Host`] owns the persistent node tree that the reconciler mutates. All
//! methods take `&self`; implementations keep their tree behind interior
//! mutability, the way a DOM document handle works.

use std::fmt::Debug;

use fibra_core::{EventHandler, HostError, PropValue};

/// A concrete render target
pub trait Host {
    /// Handle to a node owned by the host; clones refer to the same node
    type Node: Clone + PartialEq + Debug;

    fn create_text_node(&self, text: &str) -> Self::Node;

    fn create_element_node(&self, tag: &str) -> Self::Node;

    /// Set a property with direct field semantics
    fn set_property(&self, node: &Self::Node, key: &str, value: &PropValue);

    fn clear_property(&self, node: &Self::Node, key: &str);

    fn add_event_listener(&self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Remove a listener previously added with the same handler
    fn remove_event_listener(&self, node: &Self::Node, event: &str, handler: &EventHandler);

    /// Append `child` as the last child of `parent`, detaching it first if it
    /// is attached elsewhere
    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

    /// Insert `child` into `parent` directly before `reference`
    fn insert_before(
        &self,
        parent: &Self::Node,
        child: &Self::Node,
        reference: &Self::Node,
    ) -> Result<(), HostError>;

    /// Detach `node` from its parent
    fn remove(&self, node: &Self::Node);

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
}
