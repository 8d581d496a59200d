//! # Story Model
//!
//! The data model of the branching-story editor. Scenes are the nodes of a
//! project's narrative graph and choices are the directed edges between them.
//! This crate only describes the data; keeping it consistent and queryable is
//! the job of `story_graph`.

pub mod entities;

pub use entities::*;
