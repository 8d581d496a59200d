//! Optimistic operation tracking.
//!
//! Edits are applied locally right away and persisted by an external layer
//! some time later. The tracker remembers which entities still have a write
//! in flight and which writes were rejected, so the UI can show spinners and
//! error badges. It never rolls anything back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

use story_model::EntityRef;

/// Unique identifier for tracked operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    AddScene,
    UpdateScene,
    DeleteScene,
    AddChoice,
    UpdateChoice,
    DeleteChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationStatus {
    Pending,
    Success,
    Failed,
}

/// One mutation round-tripping to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    pub id: OperationId,
    pub entity: EntityRef,
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub timestamp: DateTime<Utc>,
    pub error: Option<String>,
}

/// Point-in-time view of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimisticState {
    pub operations: Vec<PendingOperation>,
    pub pending_entity_ids: BTreeSet<EntityRef>,
    pub failed_entity_ids: BTreeSet<EntityRef>,
}

/// Live list of operations still in flight or failed.
///
/// Confirmed operations are dropped as soon as they succeed, together with
/// older failures on the same entity.
#[derive(Debug, Clone, Default)]
pub struct OptimisticTracker {
    operations: Vec<PendingOperation>,
}

impl OptimisticTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new in-flight operation.
    pub fn begin(&mut self, entity: EntityRef, kind: OperationKind) -> OperationId {
        let id = OperationId::new();
        self.operations.push(PendingOperation {
            id,
            entity,
            kind,
            status: OperationStatus::Pending,
            timestamp: Utc::now(),
            error: None,
        });
        id
    }

    fn position_pending(&self, id: OperationId) -> Option<usize> {
        self.operations
            .iter()
            .position(|op| op.id == id && op.status == OperationStatus::Pending)
    }

    /// Persistence accepted the operation. Returns `false` if `id` is not
    /// pending.
    pub fn confirm(&mut self, id: OperationId) -> bool {
        let Some(index) = self.position_pending(id) else {
            log::debug!("confirmation for unknown operation {} ignored", id);
            return false;
        };
        let confirmed = self.operations.remove(index);
        // Operations are appended in order, so everything before `index`
        // on the same entity is older.
        let mut position = 0;
        self.operations.retain(|op| {
            let older = position < index;
            position += 1;
            !(older && op.entity == confirmed.entity && op.status == OperationStatus::Failed)
        });
        true
    }

    /// Persistence rejected the operation. Returns `false` if `id` is not
    /// pending.
    pub fn fail(&mut self, id: OperationId, error: impl Into<String>) -> bool {
        let Some(index) = self.position_pending(id) else {
            log::debug!("failure report for unknown operation {} ignored", id);
            return false;
        };
        let op = &mut self.operations[index];
        op.status = OperationStatus::Failed;
        op.error = Some(error.into());
        log::warn!(
            "{:?} on {} failed: {}",
            op.kind,
            op.entity,
            op.error.as_deref().unwrap_or_default()
        );
        true
    }

    /// Forget the failures recorded for an entity. Returns how many were
    /// removed.
    pub fn dismiss_failures(&mut self, entity: EntityRef) -> usize {
        let before = self.operations.len();
        self.operations
            .retain(|op| !(op.entity == entity && op.status == OperationStatus::Failed));
        before - self.operations.len()
    }

    pub fn has_pending(&self, entity: EntityRef) -> bool {
        self.operations
            .iter()
            .any(|op| op.entity == entity && op.status == OperationStatus::Pending)
    }

    pub fn has_failed(&self, entity: EntityRef) -> bool {
        self.operations
            .iter()
            .any(|op| op.entity == entity && op.status == OperationStatus::Failed)
    }

    pub fn get(&self, id: OperationId) -> Option<&PendingOperation> {
        self.operations.iter().find(|op| op.id == id)
    }

    pub fn operations(&self) -> &[PendingOperation] {
        &self.operations
    }

    fn entities_with(&self, status: OperationStatus) -> BTreeSet<EntityRef> {
        self.operations
            .iter()
            .filter(|op| op.status == status)
            .map(|op| op.entity)
            .collect()
    }

    pub fn pending_entity_ids(&self) -> BTreeSet<EntityRef> {
        self.entities_with(OperationStatus::Pending)
    }

    pub fn failed_entity_ids(&self) -> BTreeSet<EntityRef> {
        self.entities_with(OperationStatus::Failed)
    }

    pub fn state(&self) -> OptimisticState {
        OptimisticState {
            operations: self.operations.clone(),
            pending_entity_ids: self.pending_entity_ids(),
            failed_entity_ids: self.failed_entity_ids(),
        }
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }
}
