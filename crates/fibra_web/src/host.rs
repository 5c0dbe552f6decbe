//! `Host` implementation over the browser DOM

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use fibra_core::{Event, EventHandler, HostError, PropValue};
use fibra_reconciler::Host;

use crate::error::js_error;

type Listener = Closure<dyn FnMut(web_sys::Event)>;

/// Listeners registered per (event name, handler address)
type ListenerRegistry = FxHashMap<(String, usize), Vec<(web_sys::Node, Listener)>>;

/// Renders into a browser document
pub struct WebHost {
    document: web_sys::Document,
    listeners: RefCell<ListenerRegistry>,
}

impl WebHost {
    pub fn new(document: web_sys::Document) -> Self {
        Self {
            document,
            listeners: RefCell::new(FxHashMap::default()),
        }
    }

    /// Host for the current window's document
    pub fn from_window() -> Result<Self, HostError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| HostError::Js("DOM is not available".into()))?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }

    /// Look up a mount point by element id
    pub fn container_by_id(&self, id: &str) -> Result<web_sys::Node, HostError> {
        self.document
            .get_element_by_id(id)
            .map(Into::into)
            .ok_or_else(|| HostError::UnknownNode(format!("#{}", id)))
    }

    /// Number of live listener closures
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().values().map(Vec::len).sum()
    }

    /// Unbind and drop every listener registered on `root` or its descendants
    fn release_listeners(&self, root: &web_sys::Node) {
        let mut listeners = self.listeners.borrow_mut();
        listeners.retain(|(event, _), entries| {
            entries.retain(|(target, closure)| {
                if !root.contains(Some(target)) {
                    return true;
                }
                if let Err(err) = target
                    .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                {
                    tracing::warn!(event = event.as_str(), error = %js_error(err), "failed to remove listener");
                }
                false
            });
            !entries.is_empty()
        });
    }
}

fn to_js(value: &PropValue) -> Option<JsValue> {
    match value {
        PropValue::Str(s) => Some(JsValue::from_str(s)),
        PropValue::Number(n) => Some(JsValue::from_f64(*n)),
        PropValue::Bool(b) => Some(JsValue::from_bool(*b)),
        PropValue::List(items) => {
            let array = js_sys::Array::new();
            for item in items.iter().filter_map(to_js) {
                array.push(&item);
            }
            Some(array.into())
        }
        PropValue::Handler(_) | PropValue::Element(_) | PropValue::Any(_) => None,
    }
}

impl Host for WebHost {
    type Node = web_sys::Node;

    fn create_text_node(&self, text: &str) -> web_sys::Node {
        self.document.create_text_node(text).into()
    }

    fn create_element_node(&self, tag: &str) -> web_sys::Node {
        match self.document.create_element(tag) {
            Ok(element) => element.into(),
            Err(err) => {
                tracing::error!(tag, error = %js_error(err), "invalid tag, rendering a placeholder");
                self.document
                    .create_comment(&format!("invalid tag: {}", tag))
                    .into()
            }
        }
    }

    fn set_property(&self, node: &web_sys::Node, key: &str, value: &PropValue) {
        let Some(js) = to_js(value) else {
            tracing::warn!(key, value = %value, "prop has no DOM representation, skipping");
            return;
        };
        if let Err(err) = js_sys::Reflect::set(node, &JsValue::from_str(key), &js) {
            tracing::warn!(key, error = %js_error(err), "failed to set property");
        }
    }

    fn clear_property(&self, node: &web_sys::Node, key: &str) {
        if let Err(err) = js_sys::Reflect::set(node, &JsValue::from_str(key), &JsValue::from_str("")) {
            tracing::warn!(key, error = %js_error(err), "failed to clear property");
        }
    }

    fn add_event_listener(&self, node: &web_sys::Node, event: &str, handler: &EventHandler) {
        let key = (event.to_string(), handler.addr());
        let mut listeners = self.listeners.borrow_mut();
        let entries = listeners.entry(key).or_default();
        if entries.iter().any(|(n, _)| n == node) {
            return;
        }

        let handler = handler.clone();
        let closure = Closure::wrap(Box::new(move |ev: web_sys::Event| {
            handler.call(&Event::new(ev.type_()));
        }) as Box<dyn FnMut(web_sys::Event)>);

        match node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            Ok(()) => entries.push((node.clone(), closure)),
            Err(err) => tracing::warn!(event, error = %js_error(err), "failed to add listener"),
        }
    }

    fn remove_event_listener(&self, node: &web_sys::Node, event: &str, handler: &EventHandler) {
        let key = (event.to_string(), handler.addr());
        let mut listeners = self.listeners.borrow_mut();
        let Some(entries) = listeners.get_mut(&key) else {
            return;
        };
        let Some(index) = entries.iter().position(|(n, _)| n == node) else {
            return;
        };

        let (node, closure) = entries.swap_remove(index);
        if entries.is_empty() {
            listeners.remove(&key);
        }
        if let Err(err) =
            node.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!(event, error = %js_error(err), "failed to remove listener");
        }
    }

    fn append_child(&self, parent: &web_sys::Node, child: &web_sys::Node) -> Result<(), HostError> {
        parent.append_child(child).map(drop).map_err(js_error)
    }

    fn insert_before(
        &self,
        parent: &web_sys::Node,
        child: &web_sys::Node,
        reference: &web_sys::Node,
    ) -> Result<(), HostError> {
        parent
            .insert_before(child, Some(reference))
            .map(drop)
            .map_err(js_error)
    }

    fn remove(&self, node: &web_sys::Node) {
        self.release_listeners(node);
        if let Some(parent) = node.parent_node() {
            if let Err(err) = parent.remove_child(node) {
                tracing::warn!(error = %js_error(err), "failed to remove node");
            }
        }
    }

    fn parent(&self, node: &web_sys::Node) -> Option<web_sys::Node> {
        node.parent_node()
    }
}
