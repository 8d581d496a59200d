//! Choice store - owns the choices and keeps the graph indices current.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use story_model::{Choice, ChoiceId, ChoicePatch, ProjectId, SceneId};

use super::Upsert;
use crate::events::{EditorEvent, EventBus};
use crate::graph::{rebuild_indices, GraphIndices};

/// How an update affected the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceChange {
    /// An endpoint or the rank changed; the layout is stale.
    Structural,
    /// Only presentation (the label) changed.
    Cosmetic,
}

/// Owns every choice of the open project.
///
/// The indices are rebuilt eagerly after each edit of the choice collection
/// and shared behind an `Arc`. Reads with no edit in between observe the same
/// allocation.
#[derive(Debug)]
pub struct ChoiceStore {
    choices: Vec<Choice>,
    indices: Arc<GraphIndices>,

    /// Project whose layout gets invalidated on structural edits.
    project_id: Option<ProjectId>,

    loaded: bool,
    emit_before_load: bool,
    events: EventBus,
}

impl ChoiceStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            choices: Vec::new(),
            indices: Arc::new(GraphIndices::default()),
            project_id: None,
            loaded: false,
            emit_before_load: false,
            events,
        }
    }

    pub fn with_emit_before_load(mut self, emit: bool) -> Self {
        self.emit_before_load = emit;
        self
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_project(&mut self, project_id: Option<ProjectId>) {
        self.project_id = project_id;
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    fn emit(&self, event: EditorEvent) {
        if self.loaded || self.emit_before_load {
            self.events.emit(&event);
        }
    }

    /// Tell the layout engine the graph changed shape. Best effort: without
    /// an active project there is nothing to re-lay-out.
    pub(crate) fn invalidate_layout(&self) {
        match self.project_id {
            Some(project_id) => self.events.emit(&EditorEvent::LayoutInvalidated(project_id)),
            None => log::debug!("layout invalidation skipped, no active project"),
        }
    }

    fn reindex(&mut self) {
        self.indices = Arc::new(rebuild_indices(&self.choices));
    }

    fn position(&self, id: ChoiceId) -> Option<usize> {
        self.choices.iter().position(|c| c.id == id)
    }

    /// All choices in insertion order.
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn get(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// The current indices. Cheap to clone; stable until the next edit.
    pub fn indices(&self) -> Arc<GraphIndices> {
        Arc::clone(&self.indices)
    }

    pub fn choices_for_scene(&self, scene_id: SceneId) -> &[Choice] {
        self.indices.choices_for_scene(scene_id)
    }

    pub fn predecessors(&self, scene_id: SceneId) -> &BTreeSet<SceneId> {
        self.indices.predecessors(scene_id)
    }

    pub fn successors(&self, scene_id: SceneId) -> &BTreeSet<SceneId> {
        self.indices.successors(scene_id)
    }

    /// Add a choice. A choice with the same id is replaced in place and
    /// reported as [`EditorEvent::ChoiceUpdated`] with the fields that differ;
    /// the layout is invalidated only if an endpoint or the rank changed.
    ///
    /// Endpoints are not checked against the scene store.
    pub fn add_choice(&mut self, choice: Choice) -> Upsert {
        let Some(index) = self.position(choice.id) else {
            self.choices.push(choice.clone());
            self.reindex();
            self.emit(EditorEvent::ChoiceAdded(choice));
            self.invalidate_layout();
            return Upsert::Inserted;
        };
        if self.choices[index] == choice {
            return Upsert::Unchanged;
        }

        let id = choice.id;
        let patch = ChoicePatch::between(&self.choices[index], &choice);
        let structural = patch.is_structural_for(&self.choices[index]);
        self.choices[index] = choice;
        self.reindex();
        if patch.is_empty() {
            return Upsert::Unchanged;
        }
        self.emit(EditorEvent::ChoiceUpdated { id, patch });
        if structural {
            self.invalidate_layout();
        }
        Upsert::Replaced
    }

    /// Apply a partial update. `None` for an unknown id or an empty patch.
    pub fn update_choice(&mut self, id: ChoiceId, patch: ChoicePatch) -> Option<ChoiceChange> {
        if patch.is_empty() {
            return None;
        }
        let Some(index) = self.position(id) else {
            log::debug!("update of unknown choice {} ignored", id);
            return None;
        };

        let change = if patch.is_structural_for(&self.choices[index]) {
            ChoiceChange::Structural
        } else {
            ChoiceChange::Cosmetic
        };
        patch.apply_to(&mut self.choices[index]);

        // the indices hold copies of the choices, so labels need a rebuild too
        self.reindex();
        self.emit(EditorEvent::ChoiceUpdated { id, patch });
        if change == ChoiceChange::Structural {
            self.invalidate_layout();
        }
        Some(change)
    }

    pub fn delete_choice(&mut self, id: ChoiceId) -> Option<Choice> {
        let Some(index) = self.position(id) else {
            log::debug!("delete of unknown choice {} ignored", id);
            return None;
        };
        let removed = self.choices.remove(index);
        self.reindex();
        self.emit(EditorEvent::ChoiceDeleted(id));
        self.invalidate_layout();
        Some(removed)
    }

    /// Replace every choice at once without emitting events. Later
    /// duplicates of an id win.
    pub fn set_choices(&mut self, choices: Vec<Choice>) {
        let mut positions: HashMap<ChoiceId, usize> = HashMap::with_capacity(choices.len());
        let mut deduped: Vec<Choice> = Vec::with_capacity(choices.len());
        for choice in choices {
            match positions.get(&choice.id) {
                Some(&index) => deduped[index] = choice,
                None => {
                    positions.insert(choice.id, deduped.len());
                    deduped.push(choice);
                }
            }
        }
        self.choices = deduped;
        self.reindex();
    }

    /// Drop all choices and return to the not-yet-loaded state.
    pub fn clear(&mut self) {
        self.choices.clear();
        self.reindex();
        self.project_id = None;
        self.loaded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn loaded_store() -> (ChoiceStore, EventLog, ProjectId) {
        let bus = EventBus::new();
        let log = EventLog::new();
        log.attach(&bus);
        let project = ProjectId::new();
        let mut store = ChoiceStore::new(bus);
        store.set_project(Some(project));
        store.mark_loaded();
        (store, log, project)
    }

    #[test]
    fn test_add_choice_indexes_and_invalidates() {
        let (mut store, log, project) = loaded_store();
        let (a, b) = (SceneId::new(), SceneId::new());
        let choice = Choice::new(a, b, "Onward");

        assert_eq!(store.add_choice(choice.clone()), Upsert::Inserted);

        assert_eq!(store.choices_for_scene(a), &[choice.clone()]);
        assert!(store.successors(a).contains(&b));
        assert!(store.predecessors(b).contains(&a));
        assert_eq!(
            log.drain(),
            vec![
                EditorEvent::ChoiceAdded(choice),
                EditorEvent::LayoutInvalidated(project)
            ]
        );
    }

    #[test]
    fn test_re_adding_choice_reports_update() {
        let (mut store, log, project) = loaded_store();
        let (a, b) = (SceneId::new(), SceneId::new());
        let choice = Choice::new(a, b, "Open the door");
        let id = choice.id;
        store.add_choice(choice.clone());
        log.drain();

        let relabeled = Choice {
            label: "Kick the door".to_string(),
            ..choice.clone()
        };
        assert_eq!(store.add_choice(relabeled), Upsert::Replaced);
        assert_eq!(
            log.drain(),
            vec![EditorEvent::ChoiceUpdated {
                id,
                patch: ChoicePatch::new().label("Kick the door")
            }]
        );
        assert_eq!(store.choices_for_scene(a)[0].label, "Kick the door");

        let reordered = Choice {
            order_index: 3,
            ..store.get(id).unwrap().clone()
        };
        assert_eq!(store.add_choice(reordered), Upsert::Replaced);
        assert_eq!(
            log.drain(),
            vec![
                EditorEvent::ChoiceUpdated {
                    id,
                    patch: ChoicePatch::new().order_index(3)
                },
                EditorEvent::LayoutInvalidated(project)
            ]
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_choice_patch_keeps_indices() {
        let (mut store, log, _project) = loaded_store();
        let choice = Choice::new(SceneId::new(), SceneId::new(), "Stay");
        let id = choice.id;
        store.add_choice(choice);
        log.drain();
        let before = store.indices();

        assert_eq!(store.update_choice(id, ChoicePatch::new()), None);

        assert!(Arc::ptr_eq(&before, &store.indices()));
        assert!(log.is_empty());
    }

    #[test]
    fn test_cosmetic_update_does_not_invalidate_layout() {
        let (mut store, log, _project) = loaded_store();
        let choice = Choice::new(SceneId::new(), SceneId::new(), "Wait");
        let id = choice.id;
        let source = choice.source_scene_id;
        store.add_choice(choice);
        log.drain();

        let change = store.update_choice(id, ChoicePatch::new().label("Wait here"));

        assert_eq!(change, Some(ChoiceChange::Cosmetic));
        assert_eq!(store.choices_for_scene(source)[0].label, "Wait here");
        let events = log.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EditorEvent::ChoiceUpdated { .. }));
    }

    #[test]
    fn test_retarget_is_structural() {
        let (mut store, log, project) = loaded_store();
        let (a, b, c) = (SceneId::new(), SceneId::new(), SceneId::new());
        let choice = Choice::new(a, b, "Go");
        let id = choice.id;
        store.add_choice(choice);
        log.drain();

        let change = store.update_choice(id, ChoicePatch::new().target(c));

        assert_eq!(change, Some(ChoiceChange::Structural));
        assert!(store.successors(a).contains(&c));
        assert!(!store.successors(a).contains(&b));
        assert!(store.predecessors(b).is_empty());
        assert_eq!(log.drain().last(), Some(&EditorEvent::LayoutInvalidated(project)));
    }

    #[test]
    fn test_update_unknown_choice() {
        let (mut store, log, _project) = loaded_store();
        let before = store.indices();

        assert_eq!(store.update_choice(ChoiceId::new(), ChoicePatch::new().label("x")), None);

        assert!(Arc::ptr_eq(&before, &store.indices()));
        assert!(log.is_empty());
    }

    #[test]
    fn test_delete_choice() {
        let (mut store, log, project) = loaded_store();
        let (a, b) = (SceneId::new(), SceneId::new());
        let choice = Choice::new(a, b, "Leave");
        let id = choice.id;
        store.add_choice(choice);
        log.drain();

        assert!(store.delete_choice(id).is_some());
        assert!(store.delete_choice(id).is_none());

        assert!(store.choices_for_scene(a).is_empty());
        assert!(store.successors(a).is_empty());
        assert_eq!(
            log.drain(),
            vec![
                EditorEvent::ChoiceDeleted(id),
                EditorEvent::LayoutInvalidated(project)
            ]
        );
    }

    #[test]
    fn test_indices_are_stable_between_edits() {
        let (mut store, _log, _project) = loaded_store();
        store.add_choice(Choice::new(SceneId::new(), SceneId::new(), "One"));

        let first = store.indices();
        let second = store.indices();
        assert!(Arc::ptr_eq(&first, &second));

        store.add_choice(Choice::new(SceneId::new(), SceneId::new(), "Two"));
        assert!(!Arc::ptr_eq(&first, &store.indices()));
    }

    #[test]
    fn test_set_choices_is_silent() {
        let (mut store, log, _project) = loaded_store();
        let (a, b) = (SceneId::new(), SceneId::new());

        store.set_choices(vec![Choice::new(a, b, "x"), Choice::new(b, a, "y")]);

        assert!(log.is_empty());
        assert_eq!(store.len(), 2);
        assert!(store.successors(b).contains(&a));
    }

    #[test]
    fn test_layout_invalidation_without_project() {
        let bus = EventBus::new();
        let log = EventLog::new();
        log.attach(&bus);
        let mut store = ChoiceStore::new(bus);
        store.mark_loaded();

        store.add_choice(Choice::new(SceneId::new(), SceneId::new(), "x"));

        let events = log.drain();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], EditorEvent::ChoiceAdded(_)));
    }

    #[test]
    fn test_layout_invalidated_even_before_load() {
        let bus = EventBus::new();
        let log = EventLog::new();
        log.attach(&bus);
        let project = ProjectId::new();
        let mut store = ChoiceStore::new(bus);
        store.set_project(Some(project));

        store.add_choice(Choice::new(SceneId::new(), SceneId::new(), "x"));

        assert_eq!(log.drain(), vec![EditorEvent::LayoutInvalidated(project)]);
    }
}
