//! Render-target adapter
//!
//! Translates element descriptors into host operations: node creation, prop
//! diffs and attachment. The adapter keeps no tree state of its own.

use fibra_core::{event_name, Element, ElementType, HostError, Props, PropValue};

use crate::host::Host;

/// Stateless translation layer over a [`Host`]
pub struct Adapter<'a, H: Host> {
    host: &'a H,
    event_prefix: &'a str,
}

impl<'a, H: Host> Adapter<'a, H> {
    pub fn new(host: &'a H, event_prefix: &'a str) -> Self {
        Self { host, event_prefix }
    }

    /// Create the concrete node for a descriptor
    ///
    /// Components have no node of their own and yield `None`.
    pub fn create_node(&self, element: &Element) -> Option<H::Node> {
        match element.ty() {
            ElementType::Text => {
                let text = element
                    .props()
                    .node_value()
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                Some(self.host.create_text_node(&text))
            }
            ElementType::Tag(tag) => Some(self.host.create_element_node(tag)),
            ElementType::Component(_) => None,
        }
    }

    fn event_name(&self, key: &str) -> Option<String> {
        event_name(self.event_prefix, key)
    }

    /// Bring `node` from `prev` props to `next` props
    ///
    /// Removals run before additions. Entries equal in both maps are left
    /// untouched. Returns the number of host mutations issued.
    pub fn apply_props(&self, node: &H::Node, prev: &Props, next: &Props) -> usize {
        let mut mutations = 0;

        for (key, value) in prev.iter() {
            if next.get(key) == Some(value) {
                continue;
            }

            match self.event_name(key) {
                Some(event) => {
                    if let PropValue::Handler(handler) = value {
                        self.host.remove_event_listener(node, &event, handler);
                        mutations += 1;
                    }
                }
                None if !next.contains_key(key) => {
                    self.host.clear_property(node, key);
                    mutations += 1;
                }
                None => {}
            }
        }

        for (key, value) in next.iter() {
            if prev.get(key) == Some(value) {
                continue;
            }

            match self.event_name(key) {
                Some(event) => match value {
                    PropValue::Handler(handler) => {
                        self.host.add_event_listener(node, &event, handler);
                        mutations += 1;
                    }
                    other => {
                        tracing::warn!(key, value = %other, "event prop is not a handler, skipping");
                    }
                },
                None => {
                    self.host.set_property(node, key, value);
                    mutations += 1;
                }
            }
        }

        mutations
    }

    /// Attach `child` under `parent`, before `before` when given
    pub fn attach(
        &self,
        parent: &H::Node,
        child: &H::Node,
        before: Option<&H::Node>,
    ) -> Result<(), HostError> {
        match before {
            Some(reference) => self.host.insert_before(parent, child, reference),
            None => self.host.append_child(parent, child),
        }
    }

    pub fn detach(&self, node: &H::Node) {
        self.host.remove(node);
    }

    /// Whether `node` currently sits directly under `parent`
    pub fn is_attached_to(&self, node: &H::Node, parent: &H::Node) -> bool {
        self.host.parent(node).as_ref() == Some(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibra_core::{create_element, tag, EventHandler};
    use std::cell::RefCell;

    /// Host that records every call as a line of text
    #[derive(Default)]
    struct LogHost {
        log: RefCell<Vec<String>>,
        next: RefCell<usize>,
    }

    impl LogHost {
        fn push(&self, line: String) {
            self.log.borrow_mut().push(line);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.borrow_mut())
        }

        fn alloc(&self) -> usize {
            let mut next = self.next.borrow_mut();
            *next += 1;
            *next
        }
    }

    impl Host for LogHost {
        type Node = usize;

        fn create_text_node(&self, text: &str) -> usize {
            let id = self.alloc();
            self.push(format!("text {} {:?}", id, text));
            id
        }

        fn create_element_node(&self, tag: &str) -> usize {
            let id = self.alloc();
            self.push(format!("element {} {}", id, tag));
            id
        }

        fn set_property(&self, node: &usize, key: &str, value: &PropValue) {
            self.push(format!("set {} {}={}", node, key, value));
        }

        fn clear_property(&self, node: &usize, key: &str) {
            self.push(format!("clear {} {}", node, key));
        }

        fn add_event_listener(&self, node: &usize, event: &str, _handler: &EventHandler) {
            self.push(format!("listen {} {}", node, event));
        }

        fn remove_event_listener(&self, node: &usize, event: &str, _handler: &EventHandler) {
            self.push(format!("unlisten {} {}", node, event));
        }

        fn append_child(&self, parent: &usize, child: &usize) -> Result<(), HostError> {
            self.push(format!("append {} {}", parent, child));
            Ok(())
        }

        fn insert_before(
            &self,
            parent: &usize,
            child: &usize,
            reference: &usize,
        ) -> Result<(), HostError> {
            self.push(format!("insert {} {} before {}", parent, child, reference));
            Ok(())
        }

        fn remove(&self, node: &usize) {
            self.push(format!("remove {}", node));
        }

        fn parent(&self, _node: &usize) -> Option<usize> {
            None
        }
    }

    #[test]
    fn test_create_node() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");

        let text = create_element("p", None, fibra_core::children!["hi"]);
        assert_eq!(adapter.create_node(&text.children()[0]), Some(1));
        assert_eq!(adapter.create_node(&tag("div").build()), Some(2));
        assert_eq!(host.take(), vec!["text 1 \"hi\"", "element 2 div"]);
    }

    #[test]
    fn test_apply_from_empty() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");
        let props = Props::new()
            .with("id", "x")
            .with("onClick", EventHandler::new(|_| {}));

        assert_eq!(adapter.apply_props(&7, &Props::new(), &props), 2);
        assert_eq!(host.take(), vec!["set 7 id=x", "listen 7 click"]);
    }

    #[test]
    fn test_apply_same_props_is_noop() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");
        let props = Props::new()
            .with("id", "x")
            .with("onClick", EventHandler::new(|_| {}));

        assert_eq!(adapter.apply_props(&1, &props, &props.clone()), 0);
        assert!(host.take().is_empty());
    }

    #[test]
    fn test_removals_before_additions() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");
        let prev = Props::new()
            .with("title", "a")
            .with("onClick", EventHandler::new(|_| {}));
        let next = Props::new()
            .with("id", "y")
            .with("onClick", EventHandler::new(|_| {}));

        adapter.apply_props(&1, &prev, &next);
        assert_eq!(
            host.take(),
            vec![
                "clear 1 title",
                "unlisten 1 click",
                "set 1 id=y",
                "listen 1 click",
            ]
        );
    }

    #[test]
    fn test_changed_value_overwrites_without_clear() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");

        adapter.apply_props(
            &1,
            &Props::new().with("value", 1),
            &Props::new().with("value", 2),
        );
        assert_eq!(host.take(), vec!["set 1 value=2"]);
    }

    #[test]
    fn test_non_handler_event_prop_skipped() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");

        let count = adapter.apply_props(&1, &Props::new(), &Props::new().with("onClick", "x"));
        assert_eq!(count, 0);
        assert!(host.take().is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "handle");
        let props = Props::new()
            .with("handleInput", EventHandler::new(|_| {}))
            .with("onClick", "plain");

        adapter.apply_props(&1, &Props::new(), &props);
        assert_eq!(host.take(), vec!["listen 1 input", "set 1 onClick=plain"]);
    }

    #[test]
    fn test_attach_uses_reference() {
        let host = LogHost::default();
        let adapter = Adapter::new(&host, "on");

        adapter.attach(&1, &2, None).unwrap();
        adapter.attach(&1, &3, Some(&2)).unwrap();
        assert_eq!(host.take(), vec!["append 1 2", "insert 1 3 before 2"]);
    }
}
