//! Fibra DOM
//!
//! An in-memory document implementing [`fibra_reconciler::Host`]. It backs
//! the integration tests and the scenario runner, and can be used to render
//! headlessly.
//!
//! ```rust
//! use fibra_dom::Document;
//! use fibra_reconciler::{tag, Renderer};
//!
//! let doc = Document::new();
//! let root = doc.create_container();
//! let renderer = Renderer::new(doc.clone());
//!
//! renderer.render(tag("p").child("hello"), Some(&root));
//! assert_eq!(doc.to_html(root), "<p>hello</p>");
//! ```

pub mod document;

pub use document::{Document, NodeId, NodeKind};
