//! # Configuration Constants
//!
//! Centralized constants for the hex mesh tooling. Precision values, layout
//! parameters, tag names and process exit codes are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Merge**: Vertex merge policy
//! - **Layout**: Dual-surface layout parameters
//! - **Tags**: Names of persisted mesh tags
//! - **Exit Codes**: `skin` process exit codes

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Used when deciding whether two layout positions coincide or a length
/// is degenerate.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

// =============================================================================
// MERGE CONSTANTS
// =============================================================================

/// Divisor applied to the minimum edge length to obtain the default merge
/// epsilon when none is given.
///
/// # Example
///
/// ```rust
/// use config::constants::MERGE_EPSILON_DIVISOR;
///
/// let min_edge_length = 1.0;
/// assert_eq!(min_edge_length / MERGE_EPSILON_DIVISOR, 0.25);
/// ```
pub const MERGE_EPSILON_DIVISOR: f64 = 4.0;

/// Number of points stored in a kd-tree leaf before it is split.
pub const KD_TREE_LEAF_SIZE: usize = 16;

// =============================================================================
// LAYOUT CONSTANTS
// =============================================================================

/// Radius of the circle boundary loop vertices are pinned to, in points.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_LAYOUT_RADIUS;
///
/// let step = 2.0 * std::f64::consts::PI / 4.0;
/// let x = DEFAULT_LAYOUT_RADIUS * step.cos();
/// assert!(x.abs() < 1e-9);
/// ```
pub const DEFAULT_LAYOUT_RADIUS: f64 = 10.0;

/// Radius of the second boundary loop, relative to [`DEFAULT_LAYOUT_RADIUS`].
pub const INNER_LOOP_RADIUS_FACTOR: f64 = 0.5;

/// Number of Laplacian smoothing iterations run per sheet.
pub const SMOOTHING_ITERATIONS: usize = 10;

/// Number of sheets a dual entity is expected to belong to before the
/// membership list spills to the heap.
///
/// A hexahedron sits in at most three sheets.
pub const INLINE_SHEET_MEMBERSHIP: usize = 3;

// =============================================================================
// TAG NAMES
// =============================================================================

/// Default name of the integer tag `skin -t` puts on skin vertices.
pub const DEFAULT_SKIN_TAG_NAME: &str = "fixed";

/// Tag identifying material sets (blocks).
pub const MATERIAL_SET_TAG_NAME: &str = "MATERIAL_SET";

/// Tag identifying Neumann sets (sidesets).
pub const NEUMANN_SET_TAG_NAME: &str = "NEUMANN_SET";

/// Tag carrying the orientation of a sideset relative to its elements.
pub const SENSE_TAG_NAME: &str = "SENSE";

/// Tag mapping a primal entity to its dual entity.
pub const DUAL_ENTITY_TAG_NAME: &str = "__DUAL_ENTITY";

/// Tag mapping a primal edge to the dual surface (sheet) containing its dual face.
pub const DUAL_SURFACE_TAG_NAME: &str = "DUAL_SURFACE";

/// Tag mapping a primal quad to the dual curve (chord) containing its dual edge.
pub const DUAL_CURVE_TAG_NAME: &str = "DUAL_CURVE";

// =============================================================================
// EXIT CODES
// =============================================================================

/// Process exit code on success.
pub const EXIT_SUCCESS: i32 = 0;

/// Process exit code for usage and validation errors.
pub const EXIT_USAGE: i32 = 1;

/// Process exit code for mesh I/O failures.
pub const EXIT_IO: i32 = 2;

/// Process exit code for internal and skinning failures.
pub const EXIT_INTERNAL: i32 = 3;
