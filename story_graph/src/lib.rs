//! # Story Graph
//!
//! The engine behind the branching-story editor. It keeps the scene/choice
//! graph of one project in memory, answers adjacency queries in constant time
//! and tells external collaborators (renderer, sync layer, layout engine)
//! about every change.
//!
//! ## Core Components
//!
//! - **graph**: lookup indices rebuilt from the choice collection
//! - **stores**: scene, choice and collapsed-scene stores
//! - **optimistic**: bookkeeping for edits awaiting backend confirmation
//! - **editor**: the [`StoryEditor`] facade with snapshot-based undo/redo
//! - **events**: typed listener registry for outgoing notifications
//!
//! ## Design Philosophy
//!
//! - **Single-threaded**: every call runs to completion; the engine never
//!   waits on I/O and persistence happens outside it
//! - **Relaxed integrity**: choices may reference missing scenes and scene
//!   deletion never cascades; queries on unknown ids return empty results
//! - **No errors across the facade**: failures are absorbed and logged, or
//!   reported as data through the optimistic tracker

pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod graph;
pub mod optimistic;
pub mod storage;
pub mod stores;

pub use config::*;
pub use editor::*;
pub use error::*;
pub use events::*;
pub use graph::*;
pub use optimistic::*;
pub use storage::*;
pub use stores::*;
