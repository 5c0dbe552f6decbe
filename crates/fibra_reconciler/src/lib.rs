//! Fibra Reconciler
//!
//! Turns element trees from `fibra_core` into a persistent node tree owned by
//! a [`Host`], and keeps it up to date across passes.
//!
//! - [`Host`]: the render-target interface
//! - [`Adapter`]: node creation, prop diffs and attachment over a host
//! - [`FiberTree`]: the arena of fibers mirroring the element tree
//! - [`Renderer`]: the render driver and state-update queue

pub mod adapter;
pub mod fiber;
pub mod host;
pub mod reconciler;

pub use adapter::Adapter;
pub use fiber::{FiberKind, FiberNode, FiberSnapshot, FiberTree};
pub use host::Host;
pub use reconciler::{RenderStats, Renderer};

// Re-export core types so hosts and apps need a single dependency
pub use fibra_core::{
    children, create_element, props, tag, text_element, Child, Cleanup, Component, Deps,
    Element, ElementType, Event, EventHandler, FibraError, HostError, Hooks, PropValue, Props,
    RendererConfig, SetState, Teardown,
};
