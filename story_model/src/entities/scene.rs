//! Scene definitions - the nodes of the story graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{ActId, ProjectId, SceneId};

/// A scene is one story beat or location in a project's narrative graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub project_id: ProjectId,

    /// Act the scene is filed under, if any.
    pub act_id: Option<ActId>,

    pub name: String,
    pub description: String,

    /// Rank of the scene inside its act.
    pub order: f64,

    pub script: String,
    pub location: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scene {
    /// Create a new scene with the given name.
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SceneId::new(),
            project_id,
            act_id: None,
            name: name.into(),
            description: String::new(),
            order: 0.0,
            script: String::new(),
            location: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Use a specific ID, e.g. one assigned by the backend.
    pub fn with_id(mut self, id: SceneId) -> Self {
        self.id = id;
        self
    }

    /// File the scene under an act.
    pub fn with_act(mut self, act_id: ActId) -> Self {
        self.act_id = Some(act_id);
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rank inside the act.
    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }
}

/// A partial update of a scene. Absent fields are left untouched.
///
/// The scene ID and project are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenePatch {
    /// `Some(None)` moves the scene out of its act.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub act_id: Option<Option<ActId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ScenePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn act(mut self, act_id: Option<ActId>) -> Self {
        self.act_id = Some(act_id);
        self
    }

    /// The patch that turns `old` into `new`, field by field.
    pub fn between(old: &Scene, new: &Scene) -> Self {
        fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
            (old != new).then(|| new.clone())
        }
        Self {
            act_id: changed(&old.act_id, &new.act_id),
            name: changed(&old.name, &new.name),
            description: changed(&old.description, &new.description),
            order: changed(&old.order, &new.order),
            script: changed(&old.script, &new.script),
            location: changed(&old.location, &new.location),
        }
    }

    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.act_id.is_none()
            && self.name.is_none()
            && self.description.is_none()
            && self.order.is_none()
            && self.script.is_none()
            && self.location.is_none()
    }

    /// Write the present fields into `scene` and bump its `updated_at`.
    pub fn apply_to(&self, scene: &mut Scene) {
        if let Some(act_id) = self.act_id {
            scene.act_id = act_id;
        }
        if let Some(name) = &self.name {
            scene.name = name.clone();
        }
        if let Some(description) = &self.description {
            scene.description = description.clone();
        }
        if let Some(order) = self.order {
            scene.order = order;
        }
        if let Some(script) = &self.script {
            scene.script = script.clone();
        }
        if let Some(location) = &self.location {
            scene.location = location.clone();
        }
        scene.updated_at = Utc::now();
    }
}

/// Distinguishes an explicit `null` from an absent field.
pub(crate) fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
