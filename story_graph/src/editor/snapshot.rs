//! Editor snapshots - independent copies of the editable state for undo/redo.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use story_model::{Choice, Scene, SceneId};

/// Everything an undo step needs to put the editor back where it was.
///
/// A snapshot owns its data; later edits never show through. The editor
/// keeps no history of its own, callers hold on to snapshots themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    pub scenes: Vec<Scene>,
    pub choices: Vec<Choice>,
    pub current_scene_id: Option<SceneId>,
    pub collapsed_nodes: BTreeSet<SceneId>,
}
