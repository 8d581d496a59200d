//! Graph module - lookup structures derived from the choice collection.
//!
//! Scenes are nodes and choices are directed edges. Nothing here owns data:
//! [`GraphIndices`] is recomputed from the edges and never edited in place.

mod indices;

pub use indices::*;
