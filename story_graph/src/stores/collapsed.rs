//! Collapsed-scene store - which scenes are folded away in the visual graph.
//!
//! Collapsing is presentation only: it never affects the graph itself. The
//! set is scoped per project and persisted under `<prefix>_<project id>` as a
//! JSON list of scene ids. Ids of deleted scenes are not cleaned up.

use std::collections::BTreeSet;

use story_model::{ProjectId, SceneId};

use crate::error::StorageError;
use crate::storage::KeyValueStorage;

pub struct CollapsedStore {
    nodes: BTreeSet<SceneId>,
    project_id: Option<ProjectId>,
    key_prefix: String,
    storage: Box<dyn KeyValueStorage>,
}

impl CollapsedStore {
    pub fn new(key_prefix: impl Into<String>, storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            nodes: BTreeSet::new(),
            project_id: None,
            key_prefix: key_prefix.into(),
            storage,
        }
    }

    fn key(&self, project_id: ProjectId) -> String {
        format!("{}_{}", self.key_prefix, project_id)
    }

    pub fn project_id(&self) -> Option<ProjectId> {
        self.project_id
    }

    /// Switch to another project, reloading its persisted set.
    ///
    /// Switching to the active project is a no-op. Unreadable or corrupt
    /// state loads as an empty set.
    pub fn set_project(&mut self, project_id: Option<ProjectId>) {
        if self.project_id == project_id {
            return;
        }
        self.project_id = project_id;
        self.nodes = match project_id {
            Some(project_id) => self.load_persisted(project_id),
            None => BTreeSet::new(),
        };
        log::info!(
            "collapsed scenes reloaded for project {:?}: {} hidden",
            project_id.map(|p| p.to_string()),
            self.nodes.len()
        );
    }

    fn load_persisted(&self, project_id: ProjectId) -> BTreeSet<SceneId> {
        let key = self.key(project_id);
        let parsed = self.storage.get(&key).and_then(|raw| {
            raw.map_or(Ok(Vec::new()), |raw| {
                serde_json::from_str::<Vec<SceneId>>(&raw).map_err(StorageError::from)
            })
        });
        match parsed {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                log::warn!("ignoring unreadable collapsed state under {}: {}", key, err);
                BTreeSet::new()
            }
        }
    }

    /// Write the set if there is anything to write. An empty set leaves the
    /// stored value untouched.
    fn persist(&mut self) {
        let Some(project_id) = self.project_id else {
            return;
        };
        if self.nodes.is_empty() {
            return;
        }
        let key = self.key(project_id);
        let ids: Vec<SceneId> = self.nodes.iter().copied().collect();
        let result = serde_json::to_string(&ids)
            .map_err(StorageError::from)
            .and_then(|payload| self.storage.set(&key, &payload));
        if let Err(err) = result {
            log::warn!("could not persist collapsed state under {}: {}", key, err);
        }
    }

    pub fn is_collapsed(&self, id: SceneId) -> bool {
        self.nodes.contains(&id)
    }

    /// Flip a scene's collapsed flag. Returns the new state.
    pub fn toggle(&mut self, id: SceneId) -> bool {
        let collapsed = if self.nodes.remove(&id) {
            false
        } else {
            self.nodes.insert(id);
            true
        };
        self.persist();
        collapsed
    }

    pub fn set_collapsed_nodes(&mut self, nodes: BTreeSet<SceneId>) {
        self.nodes = nodes;
        self.persist();
    }

    pub fn collapsed_nodes(&self) -> &BTreeSet<SceneId> {
        &self.nodes
    }

    /// Forget the in-memory set and the active project. Storage is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.project_id = None;
    }
}

impl std::fmt::Debug for CollapsedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollapsedStore")
            .field("nodes", &self.nodes)
            .field("project_id", &self.project_id)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}
