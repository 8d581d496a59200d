//! Choice definitions - the directed edges of the story graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChoiceId, SceneId};

/// A player-facing transition from one scene to another.
///
/// The endpoints are plain references: a choice may point at a scene that
/// has not been created yet or was already deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub source_scene_id: SceneId,
    pub target_scene_id: SceneId,

    /// Rank among the choices leaving the same source scene.
    pub order_index: i64,

    /// Text shown to the player.
    pub label: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Choice {
    /// Create a new choice from `source` to `target`.
    pub fn new(source: SceneId, target: SceneId, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ChoiceId::new(),
            source_scene_id: source,
            target_scene_id: target,
            order_index: 0,
            label: label.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Use a specific ID, e.g. one assigned by the backend.
    pub fn with_id(mut self, id: ChoiceId) -> Self {
        self.id = id;
        self
    }

    /// Set the rank among sibling choices.
    pub fn with_order_index(mut self, order_index: i64) -> Self {
        self.order_index = order_index;
        self
    }
}

/// A partial update of a choice. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoicePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_scene_id: Option<SceneId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_scene_id: Option<SceneId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ChoicePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: SceneId) -> Self {
        self.source_scene_id = Some(source);
        self
    }

    pub fn target(mut self, target: SceneId) -> Self {
        self.target_scene_id = Some(target);
        self
    }

    pub fn order_index(mut self, order_index: i64) -> Self {
        self.order_index = Some(order_index);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The patch that turns `old` into `new`, field by field.
    pub fn between(old: &Choice, new: &Choice) -> Self {
        Self {
            source_scene_id: (old.source_scene_id != new.source_scene_id)
                .then_some(new.source_scene_id),
            target_scene_id: (old.target_scene_id != new.target_scene_id)
                .then_some(new.target_scene_id),
            order_index: (old.order_index != new.order_index).then_some(new.order_index),
            label: (old.label != new.label).then(|| new.label.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source_scene_id.is_none()
            && self.target_scene_id.is_none()
            && self.order_index.is_none()
            && self.label.is_none()
    }

    /// Whether applying this patch to `choice` changes the graph's shape
    /// (an endpoint or the rank). Label edits are cosmetic.
    pub fn is_structural_for(&self, choice: &Choice) -> bool {
        self.source_scene_id
            .is_some_and(|source| source != choice.source_scene_id)
            || self
                .target_scene_id
                .is_some_and(|target| target != choice.target_scene_id)
            || self
                .order_index
                .is_some_and(|order| order != choice.order_index)
    }

    /// Write the present fields into `choice` and bump its `updated_at`.
    pub fn apply_to(&self, choice: &mut Choice) {
        if let Some(source) = self.source_scene_id {
            choice.source_scene_id = source;
        }
        if let Some(target) = self.target_scene_id {
            choice.target_scene_id = target;
        }
        if let Some(order_index) = self.order_index {
            choice.order_index = order_index;
        }
        if let Some(label) = &self.label {
            choice.label = label.clone();
        }
        choice.updated_at = Utc::now();
    }
}
