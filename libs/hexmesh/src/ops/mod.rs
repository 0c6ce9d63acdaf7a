//! # Mesh Operations
//!
//! Algorithms that read or rewrite a [`Mesh`](crate::mesh::Mesh): vertex
//! merging, skin extraction and the spatial index both build on.

pub mod merge;
pub mod skin;
pub mod spatial_index;
