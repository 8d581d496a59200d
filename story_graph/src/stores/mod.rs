//! Stores - the exclusive owners of the editor's mutable state.
//!
//! - **scenes**: the node set and the focused-scene pointer
//! - **choices**: the edge set and its derived [`GraphIndices`](crate::GraphIndices)
//! - **collapsed**: scenes hidden in the visual graph, persisted per project

mod choices;
mod collapsed;
mod scenes;

pub use choices::*;
pub use collapsed::*;
pub use scenes::*;

/// Outcome of adding an entity whose id may already be stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The id was new.
    Inserted,
    /// An entity with the same id was replaced and reported as an update.
    Replaced,
    /// The id was stored with the same editable fields; nothing reported.
    Unchanged,
}
