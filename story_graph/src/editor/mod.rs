//! Story Editor - the single object UI code talks to.
//!
//! The editor composes the stores into one state and is the only way to
//! change it. A mutation goes through these steps:
//! 1. **Apply**: the owning store updates its collection
//! 2. **Reindex**: choice edits rebuild the graph indices
//! 3. **Notify**: listeners receive [`EditorEvent`]s (renderer, sync layer)
//! 4. **Track**: an operation is registered for the persistence layer to
//!    confirm or fail later
//!
//! Undo and redo work on whole-state [`EditorSnapshot`]s.

mod snapshot;

pub use snapshot::*;

use std::collections::BTreeSet;
use std::sync::Arc;

use story_model::{
    ActId, Choice, ChoiceId, ChoicePatch, EntityRef, ProjectId, Scene, SceneId, ScenePatch,
};

use crate::config::EditorConfig;
use crate::events::{EditorEvent, EventBus, ListenerId};
use crate::graph::GraphIndices;
use crate::optimistic::{OperationId, OperationKind, OptimisticState, OptimisticTracker};
use crate::storage::{KeyValueStorage, MemoryStorage};
use crate::stores::{ChoiceChange, ChoiceStore, CollapsedStore, SceneStore, Upsert};

/// The branching-story graph engine.
///
/// Mutations return the [`OperationId`] to report back on once the backend
/// answers, or `None` when nothing changed (unknown id) or tracking is off.
/// Scene deletion does not cascade to choices and choices may point at
/// scenes that do not exist; see [`dangling_choices`](Self::dangling_choices).
#[derive(Debug)]
pub struct StoryEditor {
    config: EditorConfig,
    events: EventBus,
    scenes: SceneStore,
    choices: ChoiceStore,
    collapsed: CollapsedStore,
    tracker: OptimisticTracker,
    project_id: Option<ProjectId>,
}

impl StoryEditor {
    /// Create an empty, not yet loaded editor.
    pub fn new(config: EditorConfig, storage: impl KeyValueStorage + 'static) -> Self {
        let events = EventBus::new();
        let scenes =
            SceneStore::new(events.clone()).with_emit_before_load(config.emit_before_load);
        let choices =
            ChoiceStore::new(events.clone()).with_emit_before_load(config.emit_before_load);
        let collapsed = CollapsedStore::new(config.collapse_key_prefix.clone(), Box::new(storage));

        Self {
            config,
            events,
            scenes,
            choices,
            collapsed,
            tracker: OptimisticTracker::new(),
            project_id: None,
        }
    }

    /// Default configuration with in-memory storage.
    pub fn with_defaults() -> Self {
        Self::new(EditorConfig::default(), MemoryStorage::new())
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Seed the editor with a project's data and start emitting events.
    ///
    /// Seeding itself emits nothing. Any previous state is replaced.
    pub fn load(&mut self, project_id: ProjectId, scenes: Vec<Scene>, choices: Vec<Choice>) {
        self.project_id = Some(project_id);
        self.scenes.set_scenes(scenes);
        self.scenes.restore_current_scene_id(None);
        self.choices.set_project(Some(project_id));
        self.choices.set_choices(choices);
        self.collapsed.set_project(Some(project_id));
        self.tracker.clear();

        self.scenes.mark_loaded();
        self.choices.mark_loaded();
        log::info!(
            "loaded project {}: {} scenes, {} choices",
            project_id,
            self.scenes.len(),
            self.choices.len()
        );
    }

    /// Drop all state and return to the unloaded editor. Listeners stay
    /// registered.
    pub fn reset(&mut self) {
        self.scenes.clear();
        self.choices.clear();
        self.collapsed.clear();
        self.tracker.clear();
        self.project_id = None;
        log::info!("editor reset");
    }

    pub fn is_loaded(&self) -> bool {
        self.scenes.is_loaded()
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&EditorEvent) + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    fn track(&mut self, entity: EntityRef, kind: OperationKind) -> Option<OperationId> {
        self.config
            .track_operations
            .then(|| self.tracker.begin(entity, kind))
    }

    /// Add a scene. Re-adding a stored id is an update of that scene.
    pub fn add_scene(&mut self, scene: Scene) -> Option<OperationId> {
        let id = scene.id;
        match self.scenes.add_scene(scene) {
            Upsert::Inserted => self.track(id.into(), OperationKind::AddScene),
            Upsert::Replaced => self.track(id.into(), OperationKind::UpdateScene),
            Upsert::Unchanged => None,
        }
    }

    pub fn update_scene(&mut self, id: SceneId, patch: ScenePatch) -> Option<OperationId> {
        if !self.scenes.update_scene(id, patch) {
            return None;
        }
        self.track(id.into(), OperationKind::UpdateScene)
    }

    /// Delete a scene. Its choices stay until deleted explicitly.
    pub fn delete_scene(&mut self, id: SceneId) -> Option<OperationId> {
        self.scenes.delete_scene(id)?;
        self.track(id.into(), OperationKind::DeleteScene)
    }

    /// Focus a scene or clear focus. Returns `false` if nothing changed.
    pub fn set_current_scene_id(&mut self, id: Option<SceneId>) -> bool {
        self.scenes.set_current_scene_id(id)
    }

    /// Replace all scenes without emitting events.
    pub fn set_scenes(&mut self, scenes: Vec<Scene>) {
        self.scenes.set_scenes(scenes);
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scenes(&self) -> &[Scene] {
        self.scenes.scenes()
    }

    pub fn scenes_for_act(&self, act_id: ActId) -> Vec<&Scene> {
        self.scenes.scenes_for_act(act_id)
    }

    pub fn current_scene_id(&self) -> Option<SceneId> {
        self.scenes.current_scene_id()
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.scenes.current_scene()
    }

    /// Add a choice. Re-adding a stored id is an update of that choice.
    pub fn add_choice(&mut self, choice: Choice) -> Option<OperationId> {
        let id = choice.id;
        match self.choices.add_choice(choice) {
            Upsert::Inserted => self.track(id.into(), OperationKind::AddChoice),
            Upsert::Replaced => self.track(id.into(), OperationKind::UpdateChoice),
            Upsert::Unchanged => None,
        }
    }

    pub fn update_choice(&mut self, id: ChoiceId, patch: ChoicePatch) -> Option<OperationId> {
        let change = self.choices.update_choice(id, patch)?;
        if change == ChoiceChange::Cosmetic {
            log::trace!("cosmetic update of choice {}", id);
        }
        self.track(id.into(), OperationKind::UpdateChoice)
    }

    pub fn delete_choice(&mut self, id: ChoiceId) -> Option<OperationId> {
        self.choices.delete_choice(id)?;
        self.track(id.into(), OperationKind::DeleteChoice)
    }

    /// Replace all choices without per-choice events. Once loaded, the
    /// layout is invalidated since the graph may have changed shape.
    pub fn set_choices(&mut self, choices: Vec<Choice>) {
        self.choices.set_choices(choices);
        if self.is_loaded() {
            self.choices.invalidate_layout();
        }
    }

    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.get(id)
    }

    pub fn choices(&self) -> &[Choice] {
        self.choices.choices()
    }

    /// Outgoing choices of a scene, by `order_index` then id.
    pub fn get_choices_for_scene(&self, id: SceneId) -> &[Choice] {
        self.choices.choices_for_scene(id)
    }

    pub fn get_predecessors(&self, id: SceneId) -> &BTreeSet<SceneId> {
        self.choices.predecessors(id)
    }

    pub fn get_successors(&self, id: SceneId) -> &BTreeSet<SceneId> {
        self.choices.successors(id)
    }

    /// Shared handle to the current indices.
    pub fn indices(&self) -> Arc<GraphIndices> {
        self.choices.indices()
    }

    /// Scenes no choice leads into, in scene order.
    pub fn root_scenes(&self) -> Vec<&Scene> {
        let indices = self.choices.indices();
        self.scenes
            .scenes()
            .iter()
            .filter(|scene| !indices.has_incoming(scene.id))
            .collect()
    }

    /// Choices with an endpoint that is not a stored scene.
    pub fn dangling_choices(&self) -> Vec<&Choice> {
        self.choices
            .choices()
            .iter()
            .filter(|c| {
                !self.scenes.contains(c.source_scene_id) || !self.scenes.contains(c.target_scene_id)
            })
            .collect()
    }

    /// Flip a scene's collapsed flag. Returns the new state.
    pub fn toggle_node_collapsed(&mut self, id: SceneId) -> bool {
        self.collapsed.toggle(id)
    }

    pub fn is_node_collapsed(&self, id: SceneId) -> bool {
        self.collapsed.is_collapsed(id)
    }

    pub fn set_collapsed_nodes(&mut self, nodes: BTreeSet<SceneId>) {
        self.collapsed.set_collapsed_nodes(nodes);
    }

    pub fn collapsed_nodes(&self) -> &BTreeSet<SceneId> {
        self.collapsed.collapsed_nodes()
    }

    pub fn has_pending_operation(&self, entity: impl Into<EntityRef>) -> bool {
        self.tracker.has_pending(entity.into())
    }

    pub fn has_failed_operation(&self, entity: impl Into<EntityRef>) -> bool {
        self.tracker.has_failed(entity.into())
    }

    /// The backend stored the edit.
    pub fn confirm_operation(&mut self, id: OperationId) -> bool {
        self.tracker.confirm(id)
    }

    /// The backend rejected the edit. Local state is not reverted; apply an
    /// earlier snapshot to roll back.
    pub fn fail_operation(&mut self, id: OperationId, error: impl Into<String>) -> bool {
        self.tracker.fail(id, error)
    }

    pub fn dismiss_failures(&mut self, entity: impl Into<EntityRef>) -> usize {
        self.tracker.dismiss_failures(entity.into())
    }

    pub fn optimistic_state(&self) -> OptimisticState {
        self.tracker.state()
    }

    pub fn tracker(&self) -> &OptimisticTracker {
        &self.tracker
    }

    /// Capture an independent copy of the editable state.
    pub fn get_snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            scenes: self.scenes.scenes().to_vec(),
            choices: self.choices.choices().to_vec(),
            current_scene_id: self.scenes.current_scene_id(),
            collapsed_nodes: self.collapsed.collapsed_nodes().clone(),
        }
    }

    /// Replace the whole state with `snapshot` in one step.
    ///
    /// No per-entity events fire and nothing is tracked. Listeners get one
    /// [`EditorEvent::SnapshotApplied`] followed by a layout invalidation.
    pub fn apply_snapshot(&mut self, snapshot: EditorSnapshot) {
        let EditorSnapshot {
            scenes,
            choices,
            current_scene_id,
            collapsed_nodes,
        } = snapshot;

        self.scenes.set_scenes(scenes);
        self.scenes.restore_current_scene_id(current_scene_id);
        self.choices.set_choices(choices);
        self.collapsed.set_collapsed_nodes(collapsed_nodes);
        log::info!(
            "snapshot applied: {} scenes, {} choices",
            self.scenes.len(),
            self.choices.len()
        );

        self.events.emit(&EditorEvent::SnapshotApplied);
        self.choices.invalidate_layout();
    }
}
