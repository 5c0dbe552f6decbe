//! Error types for Fibra
//!
//! Nothing in the render/hook path returns these to callers. They are built at
//! the point of failure, logged through `tracing`, and counted in the renderer's
//! statistics. Host implementations return [`HostError`] from the operations
//! that can fail.

use thiserror::Error;

/// Errors raised by a render target when a tree mutation is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The parent cannot hold children (e.g. a text node)
    #[error("node cannot hold children: {0}")]
    InvalidParent(String),

    /// A node handle does not refer to a live node
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The reference node passed to `insert_before` is not a child of the parent
    #[error("reference node is not a child of the parent: {0}")]
    NotAChild(String),

    /// Inserting the node would make it its own ancestor
    #[error("insertion would create a cycle: {0}")]
    Cycle(String),

    /// Error reported by the JavaScript DOM
    #[error("DOM error: {0}")]
    Js(String),
}

/// Errors that can occur while rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FibraError {
    /// `render` was given no container, or a re-render lost its host parent
    #[error("render target is missing or detached")]
    InvalidContainer,

    /// A freshly created node could not be attached to its host parent
    #[error("failed to attach node: {0}")]
    Attach(#[from] HostError),

    /// A state update targeted a fiber that has been unmounted
    #[error("state update targets an unmounted fiber")]
    UnknownFiber,

    /// Too many chained state updates were processed in a single flush
    #[error("maximum update depth of {limit} exceeded; dropped {dropped} pending update(s)")]
    UpdateDepthExceeded {
        /// The configured limit
        limit: usize,
        /// Updates discarded when the limit was hit
        dropped: usize,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// A render was requested while another pass holds the fiber tree
    #[error("render requested while a pass is already running")]
    Reentrant,
}

/// Result type for Fibra operations
pub type Result<T> = std::result::Result<T, FibraError>;
