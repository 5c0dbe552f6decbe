//! Fibra Web
//!
//! Browser host for the Fibra reconciler. Nodes are live `web_sys::Node`s;
//! props are written as DOM properties and handlers are bound through
//! `wasm_bindgen` closures.
//!
//! ```ignore
//! let renderer = fibra_web::mount(app(), "root")?;
//! ```

mod error;
pub mod host;

pub use host::WebHost;

use fibra_core::{Element, HostError};
use fibra_reconciler::Renderer;

/// Render `element` into the element with id `root_id`
///
/// Returns the renderer so later passes can reconcile against this root.
pub fn mount(element: impl Into<Element>, root_id: &str) -> Result<Renderer<WebHost>, HostError> {
    let host = WebHost::from_window()?;
    let container = host.container_by_id(root_id)?;

    let renderer = Renderer::new(host);
    renderer.render(element, Some(&container));
    Ok(renderer)
}
