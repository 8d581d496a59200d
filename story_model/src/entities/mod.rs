//! Entity definitions for the story graph.

mod choice;
mod scene;

pub use choice::*;
pub use scene::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for scenes (graph nodes).
///
/// Ids are totally ordered so that anything sorted by a secondary key can
/// fall back to the id and stay reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneId(pub Uuid);

impl SceneId {
    /// Create a new random scene ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a scene ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for choices (graph edges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChoiceId(pub Uuid);

impl ChoiceId {
    /// Create a new random choice ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a choice ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ChoiceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the project a story graph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an act, a grouping of scenes inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActId(pub Uuid);

impl ActId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to any entity the editor mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Scene(SceneId),
    Choice(ChoiceId),
}

impl From<SceneId> for EntityRef {
    fn from(id: SceneId) -> Self {
        EntityRef::Scene(id)
    }
}

impl From<ChoiceId> for EntityRef {
    fn from(id: ChoiceId) -> Self {
        EntityRef::Choice(id)
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Scene(id) => write!(f, "scene:{}", id),
            EntityRef::Choice(id) => write!(f, "choice:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_ordered_by_uuid() {
        let a = SceneId::from_uuid(Uuid::from_u128(1));
        let b = SceneId::from_uuid(Uuid::from_u128(2));
        assert!(a < b);

        let c = ChoiceId::from_uuid(Uuid::from_u128(10));
        let d = ChoiceId::from_uuid(Uuid::from_u128(3));
        assert!(d < c);
    }

    #[test]
    fn test_entity_ref_from_ids() {
        let scene = SceneId::from_uuid(Uuid::nil());
        let choice = ChoiceId::from_uuid(Uuid::nil());

        assert_eq!(EntityRef::from(scene), EntityRef::Scene(scene));
        assert_eq!(EntityRef::from(choice), EntityRef::Choice(choice));
        assert!(EntityRef::from(scene).to_string().starts_with("scene:"));
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(SceneId::new(), SceneId::new());
        assert_ne!(ChoiceId::new(), ChoiceId::new());
    }
}
