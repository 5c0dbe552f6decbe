//! Fiber tree
//!
//! One fiber per element. Host fibers (text and tagged elements) own a
//! concrete node; component fibers are structural and own the component's
//! hook slots instead. Fibers live in a slotmap arena so handles stay valid
//! while the tree is rebuilt around them.

use slotmap::SlotMap;
use smallvec::SmallVec;

use fibra_core::{Element, ElementType, FiberId, HookSlots};

/// A unit of work in the fiber tree
#[derive(Debug)]
pub struct FiberNode<N> {
    pub(crate) element: Element,
    pub(crate) node: Option<N>,
    pub(crate) parent: Option<FiberId>,
    pub(crate) children: SmallVec<[FiberId; 4]>,
    pub(crate) hooks: HookSlots,
}

impl<N> FiberNode<N> {
    pub fn new(element: Element, node: Option<N>, parent: Option<FiberId>) -> Self {
        Self {
            element,
            node,
            parent,
            children: SmallVec::new(),
            hooks: HookSlots::default(),
        }
    }

    /// The element this fiber was last rendered from
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn node(&self) -> Option<&N> {
        self.node.as_ref()
    }

    pub fn parent(&self) -> Option<FiberId> {
        self.parent
    }

    pub fn children(&self) -> &[FiberId] {
        &self.children
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_component(&self) -> bool {
        matches!(self.element.ty(), ElementType::Component(_))
    }
}

/// Arena of fibers for all roots of a renderer
#[derive(Debug)]
pub struct FiberTree<N> {
    fibers: SlotMap<FiberId, FiberNode<N>>,
}

impl<N> Default for FiberTree<N> {
    fn default() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }
}

impl<N: Clone> FiberTree<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fiber: FiberNode<N>) -> FiberId {
        self.fibers.insert(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&FiberNode<N>> {
        self.fibers.get(id)
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut FiberNode<N>> {
        self.fibers.get_mut(id)
    }

    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// First concrete node in document order at or below `id`
    pub fn first_host_node(&self, id: FiberId) -> Option<N> {
        let fiber = self.fibers.get(id)?;
        if let Some(node) = &fiber.node {
            return Some(node.clone());
        }
        fiber
            .children
            .iter()
            .find_map(|&child| self.first_host_node(child))
    }

    /// Outermost concrete nodes at or below `id`, in document order
    ///
    /// For a host fiber this is its own node. For a component it is whatever
    /// its output placed directly into the host parent.
    pub fn top_host_nodes(&self, id: FiberId) -> Vec<N> {
        let mut out = Vec::new();
        self.collect_top_host_nodes(id, &mut out);
        out
    }

    fn collect_top_host_nodes(&self, id: FiberId, out: &mut Vec<N>) {
        let Some(fiber) = self.fibers.get(id) else {
            return;
        };
        match &fiber.node {
            Some(node) => out.push(node.clone()),
            None => {
                for &child in &fiber.children {
                    self.collect_top_host_nodes(child, out);
                }
            }
        }
    }

    /// Nearest ancestor node of `id`, skipping structural fibers
    pub fn host_ancestor(&self, id: FiberId) -> Option<N> {
        let mut current = self.fibers.get(id)?.parent;
        while let Some(parent) = current {
            let fiber = self.fibers.get(parent)?;
            if let Some(node) = &fiber.node {
                return Some(node.clone());
            }
            current = fiber.parent;
        }
        None
    }

    /// The root fiber `id` belongs to
    pub fn root_of(&self, id: FiberId) -> FiberId {
        let mut current = id;
        while let Some(parent) = self.fibers.get(current).and_then(|f| f.parent) {
            current = parent;
        }
        current
    }

    /// First concrete node that follows the subtree of `id` under the same
    /// host parent
    ///
    /// Walks up through structural parents until a host parent is reached.
    /// `None` means the subtree is last in its host parent.
    pub fn host_sibling_after(&self, id: FiberId) -> Option<N> {
        let mut current = id;
        loop {
            let parent_id = self.fibers.get(current)?.parent?;
            let parent = self.fibers.get(parent_id)?;

            let position = parent.children.iter().position(|&c| c == current)?;
            let following = parent.children[position + 1..]
                .iter()
                .find_map(|&sibling| self.first_host_node(sibling));
            if following.is_some() {
                return following;
            }

            if parent.node.is_some() {
                return None;
            }
            current = parent_id;
        }
    }

    /// Remove `id` and every descendant, parents before children
    ///
    /// The removed fiber is not unlinked from its parent's child list; callers
    /// rebuild that list themselves.
    pub fn remove_subtree(&mut self, id: FiberId) -> Vec<FiberNode<N>> {
        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(fiber) = self.fibers.remove(next) {
                stack.extend(fiber.children.iter().rev().copied());
                removed.push(fiber);
            }
        }
        removed
    }

    /// Structural view of the subtree at `id`
    pub fn snapshot(&self, id: FiberId) -> Option<FiberSnapshot> {
        let fiber = self.fibers.get(id)?;
        let kind = match fiber.element.ty() {
            ElementType::Text => FiberKind::Text(
                fiber
                    .element
                    .props()
                    .node_value()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            ),
            ElementType::Tag(tag) => FiberKind::Tag(tag.clone()),
            ElementType::Component(component) => FiberKind::Component(component.name().into()),
        };

        Some(FiberSnapshot {
            kind,
            has_node: fiber.node.is_some(),
            hook_count: fiber.hooks.len(),
            children: fiber
                .children
                .iter()
                .filter_map(|&child| self.snapshot(child))
                .collect(),
        })
    }
}

/// What a fiber was built from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FiberKind {
    Text(String),
    Tag(String),
    Component(String),
}

/// Owned, comparable view of a fiber subtree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FiberSnapshot {
    pub kind: FiberKind,
    pub has_node: bool,
    pub hook_count: usize,
    pub children: Vec<FiberSnapshot>,
}

impl FiberSnapshot {
    /// Number of fibers in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(FiberSnapshot::count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibra_core::{children, create_element, tag, text_element, Component, Hooks, Props};

    fn noop(_props: &Props, _hooks: &mut Hooks<'_>) -> Element {
        text_element("")
    }

    /// Link `child` under `parent`
    fn add(
        tree: &mut FiberTree<u32>,
        parent: FiberId,
        element: Element,
        node: Option<u32>,
    ) -> FiberId {
        let id = tree.insert(FiberNode::new(element, node, Some(parent)));
        tree.get_mut(parent).unwrap().children.push(id);
        id
    }

    // root(div 1)
    //   comp
    //     span 2
    //     comp
    //   text 3
    fn sample() -> (FiberTree<u32>, [FiberId; 5]) {
        let mut tree = FiberTree::new();
        let component = Component::new("C", noop);
        let root = tree.insert(FiberNode::new(tag("div").build(), Some(1), None));
        let comp_el = create_element(component, None, children![]);
        let comp = add(&mut tree, root, comp_el.clone(), None);
        let span = add(&mut tree, comp, tag("span").build(), Some(2));
        let inner = add(&mut tree, comp, comp_el, None);
        let text = add(&mut tree, root, text_element("t"), Some(3));
        (tree, [root, comp, span, inner, text])
    }

    #[test]
    fn test_first_and_top_host_nodes() {
        let (tree, [root, comp, _, inner, _]) = sample();
        assert_eq!(tree.first_host_node(root), Some(1));
        assert_eq!(tree.first_host_node(comp), Some(2));
        assert_eq!(tree.first_host_node(inner), None);
        assert_eq!(tree.top_host_nodes(comp), vec![2]);
        assert_eq!(tree.top_host_nodes(root), vec![1]);
    }

    #[test]
    fn test_host_sibling_after() {
        let (tree, [root, comp, span, inner, text]) = sample();
        assert_eq!(tree.host_sibling_after(comp), Some(3));
        // span is followed by an empty component, then the walk leaves comp
        assert_eq!(tree.host_sibling_after(span), Some(3));
        assert_eq!(tree.host_sibling_after(inner), Some(3));
        assert_eq!(tree.host_sibling_after(text), None);
        assert_eq!(tree.host_sibling_after(root), None);
    }

    #[test]
    fn test_host_ancestor_and_root() {
        let (tree, [root, comp, span, inner, _]) = sample();
        assert_eq!(tree.host_ancestor(span), Some(1));
        assert_eq!(tree.host_ancestor(inner), Some(1));
        assert_eq!(tree.host_ancestor(root), None);
        assert_eq!(tree.root_of(inner), root);
        assert_eq!(tree.root_of(comp), root);
    }

    #[test]
    fn test_remove_subtree() {
        let (mut tree, [_, comp, span, inner, text]) = sample();
        let removed = tree.remove_subtree(comp);
        assert_eq!(removed.len(), 3);
        assert!(removed[0].is_component());
        assert!(!tree.contains(span) && !tree.contains(inner));
        assert!(tree.contains(text));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_snapshot() {
        let (tree, [root, ..]) = sample();
        let snap = tree.snapshot(root).unwrap();
        assert_eq!(snap.count(), 5);
        assert_eq!(snap.kind, FiberKind::Tag("div".into()));
        assert_eq!(snap.children[0].kind, FiberKind::Component("C".into()));
        assert!(!snap.children[0].has_node);
        assert_eq!(snap.children[1].kind, FiberKind::Text("t".into()));
    }
}
