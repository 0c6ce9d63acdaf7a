//! # Primitives
//!
//! Mesh generation for small hexahedral test and demo meshes.

pub mod hex;

pub use hex::{
    add_hex_between, create_hex, create_hex_block, create_hex_doublet, create_hex_pair,
    create_pillowed_cube, create_split_hex_pair,
};
