//! Editor events and the listener registry collaborators subscribe to.
//!
//! The renderer, the sync layer and the layout engine learn about changes
//! exclusively through [`EditorEvent`]s. Dispatch is synchronous and
//! fire-and-forget: a listener cannot veto or fail an edit.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use story_model::{Choice, ChoiceId, ChoicePatch, ProjectId, Scene, SceneId, ScenePatch};

/// Something that happened to the story graph.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    SceneAdded(Scene),
    SceneUpdated { id: SceneId, patch: ScenePatch },
    SceneDeleted(SceneId),
    ChoiceAdded(Choice),
    ChoiceUpdated { id: ChoiceId, patch: ChoicePatch },
    ChoiceDeleted(ChoiceId),
    /// The focused scene changed.
    SelectionChanged(Option<SceneId>),
    /// The graph's shape changed; the project needs a new layout.
    LayoutInvalidated(ProjectId),
    /// The whole state was replaced from a snapshot.
    SnapshotApplied,
}

impl EditorEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            EditorEvent::SceneAdded(_) => "scene_added",
            EditorEvent::SceneUpdated { .. } => "scene_updated",
            EditorEvent::SceneDeleted(_) => "scene_deleted",
            EditorEvent::ChoiceAdded(_) => "choice_added",
            EditorEvent::ChoiceUpdated { .. } => "choice_updated",
            EditorEvent::ChoiceDeleted(_) => "choice_deleted",
            EditorEvent::SelectionChanged(_) => "selection_changed",
            EditorEvent::LayoutInvalidated(_) => "layout_invalidated",
            EditorEvent::SnapshotApplied => "snapshot_applied",
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&EditorEvent)>;

/// Registry of event listeners.
///
/// Cloning yields another handle to the same registry, so the stores and the
/// editor all dispatch to one listener list.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Rc<RefCell<Vec<(ListenerId, Listener)>>>,
    next_id: Rc<Cell<u64>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It receives every event emitted from now on.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&EditorEvent) + 'static,
    {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver an event to every listener registered at the time of the call.
    pub fn emit(&self, event: &EditorEvent) {
        // Dispatch over a copy so listeners may (un)subscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        log::trace!("emit {} to {} listener(s)", event.kind(), listeners.len());
        for listener in listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Listener that records every event it receives. Handy for tests and for
/// collaborators that batch work per frame.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EditorEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe this log to `bus`.
    pub fn attach(&self, bus: &EventBus) -> ListenerId {
        let events = Rc::clone(&self.events);
        bus.subscribe(move |event| events.borrow_mut().push(event.clone()))
    }

    /// Take all recorded events, leaving the log empty.
    pub fn drain(&self) -> Vec<EditorEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_listeners_is_noop() {
        let bus = EventBus::new();
        bus.emit(&EditorEvent::SnapshotApplied);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let log = EventLog::new();
        let id = log.attach(&bus);

        bus.emit(&EditorEvent::SelectionChanged(None));
        assert_eq!(log.len(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.emit(&EditorEvent::SelectionChanged(None));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_clones_share_listeners() {
        let bus = EventBus::new();
        let handle = bus.clone();
        let log = EventLog::new();
        log.attach(&bus);

        handle.emit(&EditorEvent::SnapshotApplied);

        assert_eq!(log.drain(), vec![EditorEvent::SnapshotApplied]);
        assert!(log.is_empty());
    }

    #[test]
    fn test_listener_can_unsubscribe_itself_during_dispatch() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

        let id = {
            let bus = bus.clone();
            let calls = Rc::clone(&calls);
            let slot = Rc::clone(&slot);
            bus.clone().subscribe(move |_| {
                calls.set(calls.get() + 1);
                if let Some(id) = slot.get() {
                    bus.unsubscribe(id);
                }
            })
        };
        slot.set(Some(id));

        bus.emit(&EditorEvent::SnapshotApplied);
        bus.emit(&EditorEvent::SnapshotApplied);

        assert_eq!(calls.get(), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
