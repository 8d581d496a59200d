//! Scene store - owns the scenes and the current-scene pointer.

use std::collections::HashMap;

use story_model::{ActId, Scene, SceneId, ScenePatch};

use super::Upsert;
use crate::events::{EditorEvent, EventBus};

/// Owns every scene of the open project.
///
/// Invariant: `current_scene_id` is `None` or the id of a stored scene.
#[derive(Debug)]
pub struct SceneStore {
    scenes: Vec<Scene>,
    current_scene_id: Option<SceneId>,

    /// Set once the initial data is in; events are held back until then.
    loaded: bool,
    emit_before_load: bool,
    events: EventBus,
}

impl SceneStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            scenes: Vec::new(),
            current_scene_id: None,
            loaded: false,
            emit_before_load: false,
            events,
        }
    }

    /// Emit events even before [`mark_loaded`](Self::mark_loaded).
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

    fn emit(&self, event: EditorEvent) {
        if self.loaded || self.emit_before_load {
            self.events.emit(&event);
        }
    }

    fn position(&self, id: SceneId) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    /// All scenes in insertion order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn get(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn current_scene_id(&self) -> Option<SceneId> {
        self.current_scene_id
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current_scene_id.and_then(|id| self.get(id))
    }

    /// Scenes of one act, ordered by `order` then id.
    pub fn scenes_for_act(&self, act_id: ActId) -> Vec<&Scene> {
        let mut scenes: Vec<&Scene> = self
            .scenes
            .iter()
            .filter(|s| s.act_id == Some(act_id))
            .collect();
        scenes.sort_by(|a, b| a.order.total_cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        scenes
    }

    /// Add a scene. A scene with the same id is replaced in place and
    /// reported as [`EditorEvent::SceneUpdated`] with the fields that differ.
    pub fn add_scene(&mut self, scene: Scene) -> Upsert {
        let Some(index) = self.position(scene.id) else {
            self.scenes.push(scene.clone());
            self.emit(EditorEvent::SceneAdded(scene));
            return Upsert::Inserted;
        };
        if self.scenes[index] == scene {
            return Upsert::Unchanged;
        }

        let id = scene.id;
        let patch = ScenePatch::between(&self.scenes[index], &scene);
        self.scenes[index] = scene;
        if patch.is_empty() {
            return Upsert::Unchanged;
        }
        self.emit(EditorEvent::SceneUpdated { id, patch });
        Upsert::Replaced
    }

    /// Apply a partial update. Returns `false` for an unknown id or an
    /// empty patch.
    pub fn update_scene(&mut self, id: SceneId, patch: ScenePatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let Some(index) = self.position(id) else {
            log::debug!("update of unknown scene {} ignored", id);
            return false;
        };
        patch.apply_to(&mut self.scenes[index]);
        self.emit(EditorEvent::SceneUpdated { id, patch });
        true
    }

    /// Remove a scene. Choices touching it are left alone.
    ///
    /// Deleting the current scene clears the pointer; no other scene is
    /// selected in its place.
    pub fn delete_scene(&mut self, id: SceneId) -> Option<Scene> {
        let Some(index) = self.position(id) else {
            log::debug!("delete of unknown scene {} ignored", id);
            return None;
        };
        let removed = self.scenes.remove(index);
        self.emit(EditorEvent::SceneDeleted(id));

        if self.current_scene_id == Some(id) {
            self.current_scene_id = None;
            self.emit(EditorEvent::SelectionChanged(None));
        }
        Some(removed)
    }

    /// Focus a scene, or clear focus with `None`.
    ///
    /// Returns `false` if nothing changed, including when `id` names a scene
    /// that is not stored.
    pub fn set_current_scene_id(&mut self, id: Option<SceneId>) -> bool {
        if let Some(scene_id) = id {
            if !self.contains(scene_id) {
                log::debug!("cannot select unknown scene {}", scene_id);
                return false;
            }
        }
        if self.current_scene_id == id {
            return false;
        }
        self.current_scene_id = id;
        self.emit(EditorEvent::SelectionChanged(id));
        true
    }

    /// Replace every scene at once without emitting events.
    ///
    /// Later duplicates of an id win. The current pointer is kept only if
    /// its scene is still present.
    pub fn set_scenes(&mut self, scenes: Vec<Scene>) {
        let mut positions: HashMap<SceneId, usize> = HashMap::with_capacity(scenes.len());
        let mut deduped: Vec<Scene> = Vec::with_capacity(scenes.len());
        for scene in scenes {
            match positions.get(&scene.id) {
                Some(&index) => deduped[index] = scene,
                None => {
                    positions.insert(scene.id, deduped.len());
                    deduped.push(scene);
                }
            }
        }
        self.scenes = deduped;

        if let Some(current) = self.current_scene_id {
            if !positions.contains_key(&current) {
                self.current_scene_id = None;
            }
        }
    }

    /// Set the pointer without emitting, as part of a bulk restore.
    pub(crate) fn restore_current_scene_id(&mut self, id: Option<SceneId>) {
        self.current_scene_id = id.filter(|scene_id| self.contains(*scene_id));
        if id.is_some() && self.current_scene_id.is_none() {
            log::debug!("restored selection points at a missing scene, cleared");
        }
    }

    /// Drop all scenes and return to the not-yet-loaded state.
    pub fn clear(&mut self) {
        self.scenes.clear();
        self.current_scene_id = None;
        self.loaded = false;
    }
}
