//! CLI errors and their exit codes.

use config::constants::{EXIT_INTERNAL, EXIT_IO, EXIT_USAGE};
use hexmesh::{ErrorCategory, MeshError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkinError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error("{0}")]
    Usage(String),
}

impl SkinError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Mesh(err) => match err.category() {
                ErrorCategory::Validation => EXIT_USAGE,
                ErrorCategory::Io => EXIT_IO,
                ErrorCategory::Topology => EXIT_INTERNAL,
            },
        }
    }
}
