//! # Hexmesh
//!
//! Boundary extraction, vertex merging and hexahedral dual analysis for
//! unstructured meshes.
//!
//! ## Architecture
//!
//! ```text
//! io (JSON) → mesh (slot maps + tags + sets)
//!                 ├─ ops::merge  (kd-tree vertex merge)
//!                 ├─ ops::skin   (boundary facets)
//!                 └─ dual        (sheets + chords) → layout (2D sheet drawings)
//! ```
//!
//! ## Algorithms
//!
//! - **Skinning**: facet counting by hashed vertex keys, by vertex
//!   adjacency, or read directly off structured blocks
//! - **Merging**: kd-tree range queries, lower handle survives
//! - **Dual**: sheets and chords traced through opposite quad edges and
//!   opposite hex faces
//! - **Layout**: fixed loop and chord boundaries, Jacobi smoothing of the
//!   interior
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use hexmesh::mesh::Mesh;
//! use hexmesh::ops::skin::find_skin;
//!
//! let mut mesh = Mesh::new();
//! mesh.add_structured_block(DVec3::ZERO, [2, 2, 2], DVec3::ONE).unwrap();
//! let hexes = mesh.element_ids();
//! let skin = find_skin(&mut mesh, &hexes, false).unwrap();
//! assert_eq!(skin.forward.len(), 24);
//! ```

pub mod dual;
pub mod error;
pub mod handle;
pub mod io;
pub mod layout;
pub mod mesh;
pub mod ops;
pub mod primitives;

pub use dual::{DualComplex, MeshContext, SheetGraph, TopologyOperator};
pub use error::{ErrorCategory, MeshError, MeshResult};
pub use layout::{LaplacianLayout, LayoutParams, PlanarLayoutEngine, SheetLayout};
pub use mesh::Mesh;
pub use ops::merge::{merge_vertices, MergeOptions};
pub use ops::skin::{find_skin, Skin, SkinOptions, SkinStrategy};
