//! Render driver
//!
//! [`Renderer`] owns the fiber tree for every container it has rendered into.
//! A render pass walks a new element tree against the fiber tree of the
//! previous pass, reusing fibers whose type matches at the same position and
//! rebuilding the rest. Host mutations go through the [`Adapter`].
//!
//! State setters reach the renderer through the [`UpdateSink`] seam. An update
//! issued while no pass is running is processed immediately; one issued during
//! a pass is queued and flushed before the outer call returns.
//!
//! # Example
//!
//! ```ignore
//! let renderer = Renderer::new(host);
//! renderer.render(app(), Some(&container));
//! assert_eq!(renderer.stats().passes, 1);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::mem;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use fibra_core::{
    Component, Element, ElementType, FiberId, FibraError, HookSlots, Hooks, Props,
    RendererConfig, Result, StateUpdate, UpdateSink,
};

use crate::adapter::Adapter;
use crate::fiber::{FiberNode, FiberSnapshot, FiberTree};
use crate::host::Host;

// =============================================================================
// Statistics
// =============================================================================

/// Cumulative counters for a renderer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Render passes run, including those triggered by state updates
    pub passes: u64,
    /// Host nodes created
    pub nodes_created: u64,
    /// Host fibers updated in place
    pub nodes_reused: u64,
    /// Host nodes detached while unmounting
    pub nodes_removed: u64,
    /// Nodes that could not be attached to their host parent
    pub attach_failures: u64,
    /// State updates applied
    pub state_updates: u64,
    /// State updates discarded by the update depth guard
    pub dropped_updates: u64,
}

// =============================================================================
// Renderer
// =============================================================================

struct Root<N> {
    container: N,
    fiber: FiberId,
}

struct RenderState<N> {
    tree: FiberTree<N>,
    roots: Vec<Root<N>>,
}

struct RendererInner<H: Host> {
    host: H,
    config: RendererConfig,
    state: RefCell<RenderState<H::Node>>,
    pending: RefCell<VecDeque<StateUpdate>>,
    flushing: Cell<bool>,
    stats: Cell<RenderStats>,
    weak_self: Weak<RendererInner<H>>,
}

/// Renders element trees into a [`Host`]
///
/// Cloning a renderer yields another handle to the same fiber tree.
pub struct Renderer<H: Host + 'static> {
    inner: Rc<RendererInner<H>>,
}

impl<H: Host + 'static> Clone for Renderer<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<H: Host + 'static> Renderer<H> {
    /// Create a renderer with the standard configuration
    pub fn new(host: H) -> Self {
        Self::build(host, RendererConfig::standard())
    }

    /// Create a renderer with a custom configuration
    pub fn with_config(host: H, config: RendererConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(host, config))
    }

    fn build(host: H, config: RendererConfig) -> Self {
        let inner = Rc::new_cyclic(|weak_self| RendererInner {
            host,
            config,
            state: RefCell::new(RenderState {
                tree: FiberTree::new(),
                roots: Vec::new(),
            }),
            pending: RefCell::new(VecDeque::new()),
            flushing: Cell::new(false),
            stats: Cell::new(RenderStats::default()),
            weak_self: weak_self.clone(),
        });
        Self { inner }
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn config(&self) -> &RendererConfig {
        &self.inner.config
    }

    /// Render `element` into `container`
    ///
    /// Rendering into a container that already holds a root reconciles
    /// against it. A missing container is a logged no-op. State updates
    /// scheduled during the pass are processed before this returns.
    pub fn render(&self, element: impl Into<Element>, container: Option<&H::Node>) {
        let Some(container) = container else {
            tracing::warn!(error = %FibraError::InvalidContainer, "render skipped");
            return;
        };

        let Ok(mut state) = self.inner.state.try_borrow_mut() else {
            tracing::error!(error = %FibraError::Reentrant, "render skipped");
            return;
        };

        self.inner.render_root(&mut state, element.into(), container);
        drop(state);

        self.inner.flush_pending();
    }

    /// Tear down the root rendered into `container`
    ///
    /// Removes its nodes and runs its effect cleanups. Returns false if the
    /// container holds no root.
    pub fn unmount(&self, container: &H::Node) -> bool {
        let Ok(mut state) = self.inner.state.try_borrow_mut() else {
            tracing::error!(error = %FibraError::Reentrant, "unmount skipped");
            return false;
        };

        let RenderState { tree, roots } = &mut *state;
        let Some(index) = roots.iter().position(|root| root.container == *container) else {
            return false;
        };
        let root = roots.remove(index);

        self.inner.pass(tree).unmount(root.fiber);
        drop(state);

        tracing::debug!(container = ?container, "unmounted root");
        self.inner.flush_pending();
        true
    }

    pub fn stats(&self) -> RenderStats {
        self.inner.stats.get()
    }

    /// Number of containers holding a root
    pub fn root_count(&self) -> usize {
        self.inner.state.borrow().roots.len()
    }

    /// Number of live fibers across all roots
    pub fn fiber_count(&self) -> usize {
        self.inner.state.borrow().tree.len()
    }

    /// Structural view of the fiber tree rendered into `container`
    pub fn snapshot(&self, container: &H::Node) -> Option<FiberSnapshot> {
        let state = self.inner.state.borrow();
        let root = state
            .roots
            .iter()
            .find(|root| root.container == *container)?;
        state.tree.snapshot(root.fiber)
    }
}

impl<H: Host + 'static> RendererInner<H> {
    fn sink(&self) -> Weak<dyn UpdateSink> {
        let sink: Weak<dyn UpdateSink> = self.weak_self.clone();
        sink
    }

    fn pass<'a>(&'a self, tree: &'a mut FiberTree<H::Node>) -> Pass<'a, H> {
        Pass {
            adapter: Adapter::new(&self.host, &self.config.event_prefix),
            reuse_host_nodes: self.config.reuse_host_nodes,
            tree,
            sink: self.sink(),
            stats: &self.stats,
        }
    }

    fn bump(&self, f: impl FnOnce(&mut RenderStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn render_root(&self, state: &mut RenderState<H::Node>, element: Element, container: &H::Node) {
        let RenderState { tree, roots } = state;
        let existing = roots.iter().position(|root| root.container == *container);
        let old = existing.map(|index| roots[index].fiber);

        let fiber = self.pass(tree).reconcile(None, old, element, container, None);

        match existing {
            Some(index) => roots[index].fiber = fiber,
            None => roots.push(Root {
                container: container.clone(),
                fiber,
            }),
        }

        self.bump(|stats| stats.passes += 1);
        tracing::debug!(fibers = tree.len(), roots = roots.len(), "render pass complete");
    }

    /// Re-render one fiber from its own element in place
    fn rerender_fiber(&self, state: &mut RenderState<H::Node>, id: FiberId) {
        let RenderState { tree, roots } = state;
        let Some(fiber) = tree.get(id) else {
            tracing::warn!(error = %FibraError::UnknownFiber, fiber = ?id, "re-render skipped");
            return;
        };

        let element = fiber.element.clone();
        let parent = fiber.parent;
        let host_parent = match &fiber.node {
            Some(node) => self.host.parent(node),
            None => tree.host_ancestor(id).or_else(|| {
                let root = tree.root_of(id);
                roots
                    .iter()
                    .find(|r| r.fiber == root)
                    .map(|r| r.container.clone())
            }),
        };

        let Some(host_parent) = host_parent else {
            tracing::warn!(error = %FibraError::InvalidContainer, fiber = ?id, "re-render skipped");
            return;
        };

        let before = tree.host_sibling_after(id);
        let next = self
            .pass(tree)
            .reconcile(parent, Some(id), element, &host_parent, before.as_ref());

        if next != id {
            match parent.and_then(|p| tree.get_mut(p)) {
                Some(parent) => {
                    for child in parent.children.iter_mut().filter(|c| **c == id) {
                        *child = next;
                    }
                }
                None => {
                    for root in roots.iter_mut().filter(|r| r.fiber == id) {
                        root.fiber = next;
                    }
                }
            }
        }

        self.bump(|stats| stats.passes += 1);
    }

    /// Process queued state updates, one pass each
    fn flush_pending(&self) {
        if self.flushing.replace(true) {
            return;
        }
        let _guard = FlushGuard(&self.flushing);

        let limit = self.config.max_update_depth;
        let mut processed = 0;

        loop {
            let Some(update) = self.pending.borrow_mut().pop_front() else {
                break;
            };

            if processed >= limit {
                let dropped = 1 + self.pending.borrow_mut().drain(..).count();
                tracing::error!(
                    error = %FibraError::UpdateDepthExceeded { limit, dropped },
                    "state updates dropped"
                );
                self.bump(|stats| stats.dropped_updates += dropped as u64);
                break;
            }

            let Ok(mut state) = self.state.try_borrow_mut() else {
                self.pending.borrow_mut().push_front(update);
                break;
            };

            processed += 1;
            let id = update.fiber();
            let Some(fiber) = state.tree.get_mut(id) else {
                tracing::warn!(error = %FibraError::UnknownFiber, fiber = ?id, "state update ignored");
                continue;
            };

            update.apply(&mut fiber.hooks);
            self.bump(|stats| stats.state_updates += 1);
            self.rerender_fiber(&mut state, id);
        }
    }
}

impl<H: Host + 'static> UpdateSink for RendererInner<H> {
    fn schedule(&self, update: StateUpdate) {
        self.pending.borrow_mut().push_back(update);

        // A running pass or flush picks the update up before it returns
        if self.flushing.get() || self.state.try_borrow_mut().is_err() {
            return;
        }
        self.flush_pending();
    }
}

struct FlushGuard<'a>(&'a Cell<bool>);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

// =============================================================================
// Pass
// =============================================================================

/// Mutable view of the fiber tree for the duration of one pass
struct Pass<'a, H: Host> {
    adapter: Adapter<'a, H>,
    reuse_host_nodes: bool,
    tree: &'a mut FiberTree<H::Node>,
    sink: Weak<dyn UpdateSink>,
    stats: &'a Cell<RenderStats>,
}

impl<'a, H: Host> Pass<'a, H> {
    fn bump(&self, f: impl FnOnce(&mut RenderStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    /// Reconcile `element` against the fiber at the same position
    ///
    /// Returns the fiber now representing `element`: `old` when it was reused,
    /// otherwise a fresh one.
    fn reconcile(
        &mut self,
        parent: Option<FiberId>,
        old: Option<FiberId>,
        element: Element,
        host_parent: &H::Node,
        before: Option<&H::Node>,
    ) -> FiberId {
        if let Some(old) = old {
            if let Some(fiber) = self.tree.get(old) {
                if fiber.element.ty() == element.ty() {
                    if self.reuse_host_nodes || fiber.is_component() {
                        self.update(old, element, host_parent, before);
                    } else {
                        self.rebuild(old, element, host_parent, before);
                    }
                    return old;
                }
            }
            self.unmount(old);
        }

        self.mount(parent, element, host_parent, before)
    }

    /// Build a fiber subtree for `element` and attach its nodes
    fn mount(
        &mut self,
        parent: Option<FiberId>,
        element: Element,
        host_parent: &H::Node,
        before: Option<&H::Node>,
    ) -> FiberId {
        let node = self.adapter.create_node(&element);
        let id = self
            .tree
            .insert(FiberNode::new(element.clone(), node.clone(), parent));
        tracing::trace!(fiber = ?id, ty = element.ty().label(), "mount");

        match (element.ty(), node) {
            (ElementType::Component(component), _) => {
                let output = self.invoke(id, component, element.props());
                let child = self.mount(Some(id), output, host_parent, before);
                self.set_children(id, SmallVec::from_slice(&[child]));
            }
            (_, Some(node)) => {
                self.bump(|stats| stats.nodes_created += 1);
                self.adapter.apply_props(&node, &Props::new(), element.props());

                let mut children = SmallVec::new();
                for child in element.children() {
                    children.push(self.mount(Some(id), child.clone(), &node, None));
                }
                self.set_children(id, children);

                self.attach(host_parent, &node, before);
            }
            (_, None) => {}
        }

        id
    }

    /// Update a reused fiber from `element`
    fn update(
        &mut self,
        id: FiberId,
        element: Element,
        host_parent: &H::Node,
        before: Option<&H::Node>,
    ) {
        let Some(fiber) = self.tree.get_mut(id) else {
            return;
        };
        let prev = mem::replace(&mut fiber.element, element.clone());
        let node = fiber.node.clone();
        tracing::trace!(fiber = ?id, ty = element.ty().label(), "update");

        match (element.ty(), node) {
            (ElementType::Component(component), _) => {
                let output = self.invoke(id, component, element.props());
                self.reconcile_children(id, vec![output], host_parent, before);
            }
            (_, Some(node)) => {
                self.bump(|stats| stats.nodes_reused += 1);
                if !element.shares_props(&prev) {
                    self.adapter.apply_props(&node, prev.props(), element.props());
                }
                self.reconcile_children(id, element.children().to_vec(), &node, None);
            }
            (_, None) => {}
        }
    }

    /// Give a host fiber a fresh node, keeping the fiber and its descendants
    ///
    /// Children are reconciled into the new node before the old one is
    /// removed, so nested components keep their hooks.
    fn rebuild(
        &mut self,
        id: FiberId,
        element: Element,
        host_parent: &H::Node,
        before: Option<&H::Node>,
    ) {
        let node = self.adapter.create_node(&element);
        let Some(fiber) = self.tree.get_mut(id) else {
            return;
        };
        fiber.element = element.clone();
        let stale = mem::replace(&mut fiber.node, node.clone());
        tracing::trace!(fiber = ?id, ty = element.ty().label(), "rebuild");

        if let Some(node) = &node {
            self.bump(|stats| stats.nodes_created += 1);
            self.adapter.apply_props(node, &Props::new(), element.props());
            self.reconcile_children(id, element.children().to_vec(), node, None);
        }

        if let Some(stale) = stale {
            self.adapter.detach(&stale);
            self.bump(|stats| stats.nodes_removed += 1);
        }

        if let Some(node) = &node {
            self.attach(host_parent, node, before);
        }
    }

    /// Positional diff of a fiber's children against `elements`
    fn reconcile_children(
        &mut self,
        id: FiberId,
        elements: Vec<Element>,
        host_parent: &H::Node,
        before: Option<&H::Node>,
    ) {
        let old_children: SmallVec<[FiberId; 4]> = self
            .tree
            .get(id)
            .map(|fiber| fiber.children.clone())
            .unwrap_or_default();

        let mut next = SmallVec::with_capacity(elements.len());
        for (index, element) in elements.into_iter().enumerate() {
            // New nodes go before the first surviving node that follows them
            // Old siblings of a rebuilt parent still sit in its stale node
            let reference = old_children[(index + 1).min(old_children.len())..]
                .iter()
                .find_map(|&old| self.tree.first_host_node(old))
                .filter(|node| self.adapter.is_attached_to(node, host_parent))
                .or_else(|| before.cloned());

            let old = old_children.get(index).copied();
            next.push(self.reconcile(Some(id), old, element, host_parent, reference.as_ref()));
        }

        for &stale in old_children.iter().skip(next.len()) {
            self.unmount(stale);
        }

        self.set_children(id, next);
    }

    fn set_children(&mut self, id: FiberId, children: SmallVec<[FiberId; 4]>) {
        if let Some(fiber) = self.tree.get_mut(id) {
            fiber.children = children;
        }
    }

    /// Run a component with the hook slots of its fiber
    fn invoke(&mut self, id: FiberId, component: &Component, props: &Props) -> Element {
        let mut slots = self
            .tree
            .get_mut(id)
            .map(|fiber| mem::take(&mut fiber.hooks))
            .unwrap_or_else(HookSlots::default);

        let output = {
            let mut hooks = Hooks::new(id, &mut slots, self.sink.clone());
            component.render(props, &mut hooks)
        };
        tracing::trace!(fiber = ?id, component = component.name(), hooks = slots.len(), "rendered");

        if let Some(fiber) = self.tree.get_mut(id) {
            fiber.hooks = slots;
        }
        output
    }

    fn attach(&mut self, parent: &H::Node, node: &H::Node, before: Option<&H::Node>) {
        if let Err(err) = self.adapter.attach(parent, node, before) {
            tracing::error!(error = %FibraError::from(err), node = ?node, "attach failed");
            self.bump(|stats| stats.attach_failures += 1);
        }
    }

    /// Remove a fiber subtree, its nodes and its effects
    fn unmount(&mut self, id: FiberId) {
        for node in self.tree.top_host_nodes(id) {
            self.adapter.detach(&node);
            self.bump(|stats| stats.nodes_removed += 1);
        }

        let removed = self.tree.remove_subtree(id);
        tracing::trace!(fiber = ?id, fibers = removed.len(), "unmount");
        for mut fiber in removed {
            fiber.hooks.run_cleanups();
        }
    }
}
