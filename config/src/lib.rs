//! # Config Crate
//!
//! Centralized configuration constants for the hex mesh tooling.
//! All magic numbers and tunable parameters are defined here so that the
//! skinner, the dual constructor, the layout smoother and the `skin` CLI
//! agree on tolerances, tag names and exit codes.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_LAYOUT_RADIUS, MERGE_EPSILON_DIVISOR};
//!
//! let min_edge = 2.0;
//! let epsilon = min_edge / MERGE_EPSILON_DIVISOR;
//! assert_eq!(epsilon, 0.5);
//! assert!(DEFAULT_LAYOUT_RADIUS > 0.0);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Tag Compatibility**: Tag names match the ones other mesh tools read
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

#[cfg(test)]
mod tests;
