//! # Mesh Errors
//!
//! Error types for skinning, merging and dual construction.
//!
//! ## Error Policy
//!
//! - Topology problems (non-manifold facets, corrupt dual valence) are
//!   reported with the offending handle, never averaged away
//! - Empty inputs are not errors; they produce empty results
//! - Only the CLI converts errors into exit codes

use std::path::PathBuf;

use thiserror::Error;

use crate::dual::DualVertexId;
use crate::mesh::VertexId;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Coarse classification of a [`MeshError`], used to pick exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments or references to things that do not exist.
    Validation,
    /// The mesh or its dual is topologically broken.
    Topology,
    /// Reading or writing a mesh file failed.
    Io,
}

/// Errors that can occur during mesh operations.
#[derive(Debug, Error)]
pub enum MeshError {
    /// A handle no longer refers to a live entry, or was never issued by
    /// this map.
    #[error("Stale {kind} handle {index}v{version}")]
    StaleHandle {
        kind: &'static str,
        index: u32,
        version: u32,
    },

    /// Element connectivity does not match its type.
    #[error("Invalid connectivity: {message}")]
    InvalidConnectivity { message: String },

    /// Element type or dimension not handled by the requested operation.
    #[error("Unsupported element: {message}")]
    UnsupportedElement { message: String },

    /// A facet is shared by more than two elements.
    #[error("Non-manifold facet {vertices:?} is shared by {count} elements")]
    NonManifoldFacet { vertices: Vec<VertexId>, count: usize },

    /// A dual vertex being smoothed does not have 3 or 4 neighbors.
    #[error("Corrupt dual topology at {vertex:?}: {valence} neighbors")]
    CorruptDualTopology { vertex: DualVertexId, valence: usize },

    /// The primal entities cannot seed a dual surface.
    #[error("Invalid sheet seed: {message}")]
    InvalidSheetSeed { message: String },

    /// A referenced entity set does not exist.
    #[error("Unknown {kind} set {id}")]
    UnknownSet { kind: &'static str, id: i32 },

    /// An argument is out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A mesh file could not be decoded or encoded.
    #[error("Malformed mesh file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MeshError {
    /// Creates an invalid connectivity error.
    pub fn invalid_connectivity(message: impl Into<String>) -> Self {
        Self::InvalidConnectivity {
            message: message.into(),
        }
    }

    /// Creates an unsupported element error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedElement {
            message: message.into(),
        }
    }

    /// Creates an invalid sheet seed error.
    pub fn invalid_seed(message: impl Into<String>) -> Self {
        Self::InvalidSheetSeed {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Returns the category used to report this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } | Self::Parse { .. } => ErrorCategory::Io,
            Self::NonManifoldFacet { .. }
            | Self::CorruptDualTopology { .. }
            | Self::InvalidConnectivity { .. } => ErrorCategory::Topology,
            Self::StaleHandle { .. }
            | Self::UnsupportedElement { .. }
            | Self::InvalidSheetSeed { .. }
            | Self::UnknownSet { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::Validation,
        }
    }
}
