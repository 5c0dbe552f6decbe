//! Hook state: `use_state` and `use_effect`
//!
//! Every component fiber owns a [`HookSlots`] list. While the component runs,
//! the renderer lends that list out through a [`Hooks`] handle whose cursor
//! advances once per hook call, so hooks are matched to slots by call order.
//!
//! State setters do not touch the slots directly. They package the change as a
//! [`StateUpdate`] and hand it to the renderer through the [`UpdateSink`]
//! trait, which breaks the dependency cycle between this crate and the
//! reconciler. The renderer applies the update to the owning fiber and
//! re-renders that subtree.
//!
//! # Example
//!
//! ```rust
//! use fibra_core::{text_element, Element, Hooks, Props};
//!
//! fn counter(_props: &Props, hooks: &mut Hooks<'_>) -> Element {
//!     let (count, set_count) = hooks.use_state(0i32);
//!     let _ = set_count; // wired to a click handler in real code
//!     text_element(count)
//! }
//! ```

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::props::PropValue;

new_key_type! {
    /// Handle to a fiber in the renderer's fiber tree
    pub struct FiberId;
}

/// Teardown returned by an effect
pub type Cleanup = Box<dyn FnOnce()>;

type CleanupCell = Rc<RefCell<Option<Cleanup>>>;

// =============================================================================
// Slots
// =============================================================================

enum HookSlot {
    State(Box<dyn Any>),
    Effect(EffectSlot),
}

struct EffectSlot {
    deps: Option<Vec<PropValue>>,
    cleanup: CleanupCell,
}

/// Per-fiber hook storage, indexed by call order
#[derive(Default)]
pub struct HookSlots {
    slots: SmallVec<[HookSlot; 4]>,
}

impl HookSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replace the state value at `index` with `f(current)`
    ///
    /// A slot that is missing or holds another type is left alone.
    pub fn replace_state<T: 'static>(&mut self, index: usize, f: impl FnOnce(T) -> T) {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::warn!(index, "state update for a hook slot that does not exist");
            return;
        };

        let HookSlot::State(value) = slot else {
            tracing::warn!(index, "state update for a hook slot holding an effect");
            return;
        };

        let current = std::mem::replace(value, Box::new(()));
        match current.downcast::<T>() {
            Ok(current) => *value = Box::new(f(*current)),
            Err(current) => {
                tracing::warn!(
                    index,
                    expected = type_name::<T>(),
                    "state update with mismatched value type"
                );
                *value = current;
            }
        }
    }

    /// Run every pending effect cleanup once
    pub fn run_cleanups(&mut self) {
        for slot in &self.slots {
            if let HookSlot::Effect(effect) = slot {
                run_cleanup(&effect.cleanup);
            }
        }
    }
}

impl fmt::Debug for HookSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<&str> = self
            .slots
            .iter()
            .map(|slot| match slot {
                HookSlot::State(_) => "state",
                HookSlot::Effect(_) => "effect",
            })
            .collect();
        f.debug_struct("HookSlots").field("slots", &kinds).finish()
    }
}

fn run_cleanup(cell: &CleanupCell) {
    // Take first so a cleanup that re-enters cannot run twice
    let cleanup = cell.borrow_mut().take();
    if let Some(cleanup) = cleanup {
        cleanup();
    }
}

// =============================================================================
// Updates
// =============================================================================

/// A deferred change to one fiber's hook state
pub struct StateUpdate {
    fiber: FiberId,
    apply: Box<dyn FnOnce(&mut HookSlots)>,
}

impl StateUpdate {
    pub fn new(fiber: FiberId, apply: impl FnOnce(&mut HookSlots) + 'static) -> Self {
        Self {
            fiber,
            apply: Box::new(apply),
        }
    }

    /// The fiber whose hooks this update targets
    pub fn fiber(&self) -> FiberId {
        self.fiber
    }

    /// Apply the change to the fiber's slots
    pub fn apply(self, slots: &mut HookSlots) {
        (self.apply)(slots)
    }
}

impl fmt::Debug for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateUpdate")
            .field("fiber", &self.fiber)
            .finish_non_exhaustive()
    }
}

/// Receiver for state updates, implemented by the renderer
pub trait UpdateSink {
    fn schedule(&self, update: StateUpdate);
}

struct DetachedSink;

impl UpdateSink for DetachedSink {
    fn schedule(&self, _update: StateUpdate) {}
}

// =============================================================================
// Hooks
// =============================================================================

/// Hook context lent to a component while it renders
pub struct Hooks<'a> {
    fiber: FiberId,
    slots: &'a mut HookSlots,
    cursor: usize,
    sink: Weak<dyn UpdateSink>,
}

impl<'a> Hooks<'a> {
    pub fn new(fiber: FiberId, slots: &'a mut HookSlots, sink: Weak<dyn UpdateSink>) -> Self {
        Self {
            fiber,
            slots,
            cursor: 0,
            sink,
        }
    }

    /// A context whose setters go nowhere, for calling a component outside a
    /// renderer
    pub fn detached(slots: &'a mut HookSlots) -> Self {
        let sink: Weak<dyn UpdateSink> = Weak::<DetachedSink>::new();
        Self::new(FiberId::default(), slots, sink)
    }

    /// The fiber these hooks belong to
    pub fn fiber(&self) -> FiberId {
        self.fiber
    }

    /// Number of hooks called so far in this render
    pub fn calls(&self) -> usize {
        self.cursor
    }

    fn next_index(&mut self) -> usize {
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    /// Local state for the current fiber
    ///
    /// The first render stores `initial`; later renders return the stored
    /// value and ignore the argument.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, SetState<T>) {
        self.use_state_with(move || initial)
    }

    /// Like [`Hooks::use_state`], computing the initial value only on the
    /// first render
    pub fn use_state_with<T: Clone + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> (T, SetState<T>) {
        let index = self.next_index();

        let existing = match self.slots.slots.get(index) {
            Some(HookSlot::State(value)) => match value.downcast_ref::<T>() {
                Some(value) => Some(value.clone()),
                None => {
                    tracing::warn!(
                        index,
                        expected = type_name::<T>(),
                        "state hook changed type between renders, resetting"
                    );
                    None
                }
            },
            Some(HookSlot::Effect(effect)) => {
                tracing::warn!(index, "hook order changed between renders, resetting slot");
                // The effect is discarded with its slot
                run_cleanup(&effect.cleanup);
                None
            }
            None => None,
        };

        let value = match existing {
            Some(value) => value,
            None => {
                let value = init();
                self.store(index, HookSlot::State(Box::new(value.clone())));
                value
            }
        };

        let setter = SetState {
            fiber: self.fiber,
            index,
            sink: self.sink.clone(),
            _marker: PhantomData,
        };
        (value, setter)
    }

    /// Run `effect` when `deps` differ from the previous render
    ///
    /// Before a re-run, the cleanup returned by the previous run is called.
    /// The returned [`Teardown`] runs the current cleanup on demand; each
    /// cleanup runs at most once whichever path reaches it first.
    pub fn use_effect<E>(&mut self, effect: E, deps: impl Into<Deps>) -> Teardown
    where
        E: FnOnce() -> Option<Cleanup>,
    {
        let index = self.next_index();
        let next = deps.into().0;

        let previous = match self.slots.slots.get(index) {
            Some(HookSlot::Effect(slot)) => Some((slot.deps.clone(), slot.cleanup.clone())),
            Some(HookSlot::State(_)) => {
                tracing::warn!(index, "hook order changed between renders, resetting slot");
                None
            }
            None => None,
        };

        let cleanup = match previous {
            Some((prev_deps, cell)) => {
                if !deps_changed(prev_deps.as_deref(), next.as_deref()) {
                    return Teardown { cleanup: cell };
                }
                run_cleanup(&cell);
                cell
            }
            None => Rc::new(RefCell::new(None)),
        };

        if let Some(teardown) = effect() {
            *cleanup.borrow_mut() = Some(teardown);
        }

        self.store(
            index,
            HookSlot::Effect(EffectSlot {
                deps: next,
                cleanup: cleanup.clone(),
            }),
        );

        Teardown { cleanup }
    }

    fn store(&mut self, index: usize, slot: HookSlot) {
        if index < self.slots.slots.len() {
            self.slots.slots[index] = slot;
        } else {
            self.slots.slots.push(slot);
        }
    }
}

/// Whether an effect should re-run
///
/// Missing dependencies on either side always count as a change. Otherwise
/// the lists must match in length and element-wise.
pub fn deps_changed(prev: Option<&[PropValue]>, next: Option<&[PropValue]>) -> bool {
    match (prev, next) {
        (Some(prev), Some(next)) => {
            prev.len() != next.len() || prev.iter().zip(next).any(|(a, b)| a != b)
        }
        _ => true,
    }
}

// =============================================================================
// SetState
// =============================================================================

/// Setter returned by [`Hooks::use_state`]
///
/// Calling it schedules a re-render of the owning fiber. Setters outlive the
/// render that created them and may be captured in event handlers.
pub struct SetState<T> {
    fiber: FiberId,
    index: usize,
    sink: Weak<dyn UpdateSink>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            fiber: self.fiber,
            index: self.index,
            sink: self.sink.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("fiber", &self.fiber)
            .field("index", &self.index)
            .finish()
    }
}

impl<T: 'static> SetState<T> {
    /// Replace the state
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Replace the state with a function of the current value
    pub fn update(&self, f: impl FnOnce(T) -> T + 'static) {
        let Some(sink) = self.sink.upgrade() else {
            tracing::warn!(fiber = ?self.fiber, "state set after the renderer was dropped");
            return;
        };

        let index = self.index;
        sink.schedule(StateUpdate::new(self.fiber, move |slots| {
            slots.replace_state(index, f)
        }));
    }
}

// =============================================================================
// Effects
// =============================================================================

/// Effect dependencies
///
/// `Deps::always()` re-runs the effect on every render. An empty list runs it
/// once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deps(Option<Vec<PropValue>>);

impl Deps {
    pub fn always() -> Self {
        Self(None)
    }

    pub fn empty() -> Self {
        Self(Some(Vec::new()))
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for Deps {
    fn from(deps: Vec<T>) -> Self {
        Self(Some(deps.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<PropValue>, const N: usize> From<[T; N]> for Deps {
    fn from(deps: [T; N]) -> Self {
        Self(Some(deps.into_iter().map(Into::into).collect()))
    }
}

/// Handle to the cleanup of the latest effect run
#[derive(Clone)]
pub struct Teardown {
    cleanup: CleanupCell,
}

impl Teardown {
    /// Run the cleanup now if it has not run yet
    pub fn run(&self) {
        run_cleanup(&self.cleanup);
    }

    pub fn is_pending(&self) -> bool {
        self.cleanup.borrow().is_some()
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Teardown")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct RecordingSink {
        updates: RefCell<Vec<StateUpdate>>,
    }

    impl UpdateSink for RecordingSink {
        fn schedule(&self, update: StateUpdate) {
            self.updates.borrow_mut().push(update);
        }
    }

    fn sink() -> (Rc<RecordingSink>, Weak<dyn UpdateSink>) {
        let sink = Rc::new(RecordingSink::default());
        let weak: Weak<dyn UpdateSink> = Rc::downgrade(&sink) as Weak<dyn UpdateSink>;
        (sink, weak)
    }

    fn drain(sink: &RecordingSink, slots: &mut HookSlots) {
        for update in sink.updates.borrow_mut().drain(..) {
            update.apply(slots);
        }
    }

    #[test]
    fn test_use_state_initial_then_persisted() {
        let (sink, weak) = sink();
        let fiber = FiberId::default();
        let mut slots = HookSlots::new();

        let (value, set) = Hooks::new(fiber, &mut slots, weak.clone()).use_state(1);
        assert_eq!(value, 1);

        set.set(5);
        assert_eq!(sink.updates.borrow().len(), 1);
        assert_eq!(sink.updates.borrow()[0].fiber(), fiber);
        drain(&sink, &mut slots);

        let (value, _) = Hooks::new(fiber, &mut slots, weak).use_state(1);
        assert_eq!(value, 5);
    }

    #[test]
    fn test_functional_update() {
        let (sink, weak) = sink();
        let mut slots = HookSlots::new();

        let (_, set) = Hooks::new(FiberId::default(), &mut slots, weak.clone()).use_state(10);
        set.update(|n| n + 1);
        set.update(|n| n * 2);
        drain(&sink, &mut slots);

        let (value, _) = Hooks::new(FiberId::default(), &mut slots, weak).use_state(0);
        assert_eq!(value, 22);
    }

    #[test]
    fn test_hooks_match_by_call_order() {
        let (sink, weak) = sink();
        let mut slots = HookSlots::new();

        let mut hooks = Hooks::new(FiberId::default(), &mut slots, weak.clone());
        let (_, set_a) = hooks.use_state("a".to_string());
        let (_, set_b) = hooks.use_state(0u8);
        assert_eq!(hooks.calls(), 2);

        set_b.set(7);
        set_a.set("z".to_string());
        drain(&sink, &mut slots);

        let mut hooks = Hooks::new(FiberId::default(), &mut slots, weak);
        assert_eq!(hooks.use_state(String::new()).0, "z");
        assert_eq!(hooks.use_state(0u8).0, 7);
    }

    #[test]
    fn test_mismatched_type_is_ignored() {
        let mut slots = HookSlots::new();
        Hooks::detached(&mut slots).use_state(3i32);
        slots.replace_state::<String>(0, |s| s);
        assert_eq!(Hooks::detached(&mut slots).use_state(0i32).0, 3);
    }

    #[test]
    fn test_setter_after_sink_dropped() {
        let (sink, weak) = sink();
        let mut slots = HookSlots::new();
        let (_, set) = Hooks::new(FiberId::default(), &mut slots, weak).use_state(0);
        drop(sink);
        // Must not panic
        set.set(1);
    }

    #[test]
    fn test_effect_runs_on_dep_change_only() {
        let runs = Rc::new(Cell::new(0));
        let cleanups = Rc::new(Cell::new(0));
        let mut slots = HookSlots::new();

        let mut render = |dep: i32| {
            let (r, c) = (runs.clone(), cleanups.clone());
            Hooks::detached(&mut slots).use_effect(
                move || {
                    r.set(r.get() + 1);
                    Some(Box::new(move || c.set(c.get() + 1)) as Cleanup)
                },
                [dep],
            )
        };

        render(1);
        render(1);
        assert_eq!((runs.get(), cleanups.get()), (1, 0));

        render(2);
        assert_eq!((runs.get(), cleanups.get()), (2, 1));

        let teardown = render(2);
        assert!(teardown.is_pending());
        teardown.run();
        teardown.run();
        assert_eq!(cleanups.get(), 2);
    }

    #[test]
    fn test_effect_without_deps_runs_every_render() {
        let runs = Rc::new(Cell::new(0));
        let mut slots = HookSlots::new();

        for _ in 0..3 {
            let r = runs.clone();
            Hooks::detached(&mut slots).use_effect(
                move || {
                    r.set(r.get() + 1);
                    None
                },
                Deps::always(),
            );
        }
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_run_cleanups_once() {
        let cleanups = Rc::new(Cell::new(0));
        let mut slots = HookSlots::new();

        let c = cleanups.clone();
        let teardown = Hooks::detached(&mut slots).use_effect(
            move || Some(Box::new(move || c.set(c.get() + 1)) as Cleanup),
            Deps::empty(),
        );

        slots.run_cleanups();
        slots.run_cleanups();
        teardown.run();
        assert_eq!(cleanups.get(), 1);
    }

    #[test]
    fn test_state_over_effect_slot_runs_cleanup() {
        let cleanups = Rc::new(Cell::new(0));
        let mut slots = HookSlots::new();

        let c = cleanups.clone();
        Hooks::detached(&mut slots).use_effect(
            move || Some(Box::new(move || c.set(c.get() + 1)) as Cleanup),
            Deps::empty(),
        );

        let (value, _) = Hooks::detached(&mut slots).use_state(5u8);
        assert_eq!(value, 5);
        assert_eq!(cleanups.get(), 1);

        slots.run_cleanups();
        assert_eq!(cleanups.get(), 1);
    }

    #[test]
    fn test_deps_changed() {
        let a = [PropValue::from(1), PropValue::from("x")];
        let b = [PropValue::from(1), PropValue::from("y")];
        assert!(!deps_changed(Some(&a[..]), Some(&a[..])));
        assert!(deps_changed(Some(&a[..]), Some(&b[..])));
        assert!(deps_changed(Some(&a[..]), Some(&a[..1])));
        assert!(deps_changed(None, Some(&a[..])));
        assert!(deps_changed(Some(&a[..]), None));
        assert!(!deps_changed(Some(&[][..]), Some(&[][..])));
    }
}
