//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_merge_divisor_shrinks_epsilon() {
    assert!(MERGE_EPSILON_DIVISOR > 1.0);
}

#[test]
fn test_kd_tree_leaf_size_nonzero() {
    assert!(KD_TREE_LEAF_SIZE > 0);
}

// =============================================================================
// LAYOUT TESTS
// =============================================================================

#[test]
fn test_layout_radius_matches_reference() {
    assert_eq!(DEFAULT_LAYOUT_RADIUS, 10.0);
}

#[test]
fn test_inner_loop_is_inside_outer_loop() {
    assert!(INNER_LOOP_RADIUS_FACTOR > 0.0 && INNER_LOOP_RADIUS_FACTOR < 1.0);
}

#[test]
fn test_smoothing_iterations_matches_reference() {
    assert_eq!(SMOOTHING_ITERATIONS, 10);
}

#[test]
fn test_hex_fits_inline_membership() {
    assert!(INLINE_SHEET_MEMBERSHIP >= 3);
}

// =============================================================================
// TAG AND EXIT CODE TESTS
// =============================================================================

#[test]
fn test_tag_names_are_distinct() {
    let names = [
        DEFAULT_SKIN_TAG_NAME,
        MATERIAL_SET_TAG_NAME,
        NEUMANN_SET_TAG_NAME,
        SENSE_TAG_NAME,
        DUAL_ENTITY_TAG_NAME,
        DUAL_SURFACE_TAG_NAME,
        DUAL_CURVE_TAG_NAME,
    ];
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_exit_codes_are_distinct() {
    let codes = [EXIT_SUCCESS, EXIT_USAGE, EXIT_IO, EXIT_INTERNAL];
    assert_eq!(codes, [0, 1, 2, 3]);
}
