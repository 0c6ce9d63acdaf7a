//! # Canonical Topology Tables
//!
//! Per element type constants describing which local vertices form each
//! side. Faces of 3D elements are listed so that their right-hand normal
//! points out of the element; this is what gives skin facets a forward
//! orientation.
//!
//! Local numbering follows the usual exodus/MOAB convention:
//!
//! ```text
//!        7-------6
//!       /|      /|
//!      4-------5 |
//!      | 3-----|-2
//!      |/      |/
//!      0-------1
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{MeshError, MeshResult};
use crate::mesh::VertexId;

// =============================================================================
// SIDE TABLES
// =============================================================================

const TRI_EDGES: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 0]];

const QUAD_EDGES: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 3], &[3, 0]];

const TET_EDGES: &[&[usize]] = &[&[0, 1], &[1, 2], &[2, 0], &[0, 3], &[1, 3], &[2, 3]];

const TET_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[0, 3, 2], &[0, 2, 1]];

const PYRAMID_EDGES: &[&[usize]] = &[
    &[0, 1],
    &[1, 2],
    &[2, 3],
    &[3, 0],
    &[0, 4],
    &[1, 4],
    &[2, 4],
    &[3, 4],
];

const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
    &[0, 3, 2, 1],
];

const PRISM_EDGES: &[&[usize]] = &[
    &[0, 1],
    &[1, 2],
    &[2, 0],
    &[0, 3],
    &[1, 4],
    &[2, 5],
    &[3, 4],
    &[4, 5],
    &[5, 3],
];

const PRISM_FACES: &[&[usize]] = &[
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[0, 3, 5, 2],
    &[0, 2, 1],
    &[3, 4, 5],
];

/// Hexahedron edges in canonical order.
pub const HEX_EDGES: &[&[usize]] = &[
    &[0, 1],
    &[1, 2],
    &[2, 3],
    &[3, 0],
    &[0, 4],
    &[1, 5],
    &[2, 6],
    &[3, 7],
    &[4, 5],
    &[5, 6],
    &[6, 7],
    &[7, 4],
];

/// Hexahedron faces in canonical order, outward oriented.
pub const HEX_FACES: &[&[usize]] = &[
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[0, 4, 7, 3],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];

/// Side opposite to each face of [`HEX_FACES`].
pub const HEX_OPPOSITE_FACE: [usize; 6] = [2, 3, 0, 1, 5, 4];

/// Side opposite to each edge of a quadrilateral.
pub const QUAD_OPPOSITE_EDGE: [usize; 4] = [2, 3, 0, 1];

// =============================================================================
// ELEMENT TYPES
// =============================================================================

/// Supported element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Edge,
    Tri,
    Quad,
    Polygon,
    Tet,
    Pyramid,
    Prism,
    Hex,
}

impl ElementType {
    /// Topological dimension.
    pub fn dimension(self) -> usize {
        match self {
            Self::Edge => 1,
            Self::Tri | Self::Quad | Self::Polygon => 2,
            Self::Tet | Self::Pyramid | Self::Prism | Self::Hex => 3,
        }
    }

    /// Fixed vertex count, `None` for polygons.
    pub fn vertex_count(self) -> Option<usize> {
        match self {
            Self::Edge => Some(2),
            Self::Tri => Some(3),
            Self::Quad => Some(4),
            Self::Polygon => None,
            Self::Tet => Some(4),
            Self::Pyramid => Some(5),
            Self::Prism => Some(6),
            Self::Hex => Some(8),
        }
    }

    /// Returns true if an element of this type can have `count` vertices.
    pub fn accepts(self, count: usize) -> bool {
        match self.vertex_count() {
            Some(expected) => expected == count,
            None => count >= 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Tri => "tri",
            Self::Quad => "quad",
            Self::Polygon => "polygon",
            Self::Tet => "tet",
            Self::Pyramid => "pyramid",
            Self::Prism => "prism",
            Self::Hex => "hex",
        }
    }

    /// Type of a side of dimension `dim` with `count` vertices.
    fn side_type(dim: usize, count: usize) -> Self {
        match (dim, count) {
            (1, _) => Self::Edge,
            (_, 3) => Self::Tri,
            (_, 4) => Self::Quad,
            _ => Self::Polygon,
        }
    }

    fn side_table(self, dim: usize) -> Option<&'static [&'static [usize]]> {
        match (self, dim) {
            (Self::Tri, 1) => Some(TRI_EDGES),
            (Self::Quad, 1) => Some(QUAD_EDGES),
            (Self::Tet, 1) => Some(TET_EDGES),
            (Self::Tet, 2) => Some(TET_FACES),
            (Self::Pyramid, 1) => Some(PYRAMID_EDGES),
            (Self::Pyramid, 2) => Some(PYRAMID_FACES),
            (Self::Prism, 1) => Some(PRISM_EDGES),
            (Self::Prism, 2) => Some(PRISM_FACES),
            (Self::Hex, 1) => Some(HEX_EDGES),
            (Self::Hex, 2) => Some(HEX_FACES),
            _ => None,
        }
    }

    /// Canonical sides of dimension `dim` for an element with `count`
    /// vertices.
    ///
    /// Only sides of dimension 1 or 2 below the element's own dimension
    /// exist; vertices are not sides.
    pub fn sides(self, dim: usize, count: usize) -> MeshResult<Vec<Side>> {
        if dim == 0 || dim >= self.dimension() {
            return Err(MeshError::unsupported(format!(
                "{} has no sides of dimension {}",
                self.name(),
                dim
            )));
        }
        if !self.accepts(count) {
            return Err(MeshError::invalid_connectivity(format!(
                "{} cannot have {} vertices",
                self.name(),
                count
            )));
        }
        if self == Self::Polygon {
            return Ok((0..count)
                .map(|i| Side {
                    kind: Self::Edge,
                    indices: SmallVec::from_slice(&[i, (i + 1) % count]),
                })
                .collect());
        }
        let table = self.side_table(dim).ok_or_else(|| {
            MeshError::unsupported(format!(
                "{} has no side table for dimension {}",
                self.name(),
                dim
            ))
        })?;
        Ok(table
            .iter()
            .map(|indices| Side {
                kind: Self::side_type(dim, indices.len()),
                indices: SmallVec::from_slice(indices),
            })
            .collect())
    }
}

/// One canonical side of an element: its type and local vertex indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub kind: ElementType,
    pub indices: SmallVec<[usize; 4]>,
}

impl Side {
    /// Maps local indices to the element's vertex handles.
    pub fn vertices(&self, connectivity: &[VertexId]) -> SmallVec<[VertexId; 4]> {
        self.indices.iter().map(|&i| connectivity[i]).collect()
    }
}

// =============================================================================
// ORIENTATION
// =============================================================================

/// Orientation of a facet relative to the element that bounds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sense {
    Forward,
    Reverse,
}

impl Sense {
    /// `+1` for forward, `-1` for reverse, as stored in `SENSE` tags.
    pub fn value(self) -> i32 {
        match self {
            Self::Forward => 1,
            Self::Reverse => -1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Compares the cyclic order of two vertex sequences.
///
/// Returns `Forward` when `other` is a rotation of `reference`, `Reverse`
/// when it is a rotation of the reversed sequence, and `None` when the two
/// do not describe the same cycle.
pub fn relative_sense<T: PartialEq>(reference: &[T], other: &[T]) -> Option<Sense> {
    let n = reference.len();
    if n == 0 || n != other.len() {
        return None;
    }
    // A two-vertex cycle has no rotation distinct from its reversal.
    if n == 2 {
        return if other[0] == reference[0] && other[1] == reference[1] {
            Some(Sense::Forward)
        } else if other[0] == reference[1] && other[1] == reference[0] {
            Some(Sense::Reverse)
        } else {
            None
        };
    }
    let start = other.iter().position(|v| *v == reference[0])?;
    if (0..n).all(|i| other[(start + i) % n] == reference[i]) {
        return Some(Sense::Forward);
    }
    if (0..n).all(|i| other[(start + n - i) % n] == reference[i]) {
        return Some(Sense::Reverse);
    }
    None
}

/// Order-independent identity of a facet: its sorted vertex handles.
pub type FacetKey = SmallVec<[VertexId; 4]>;

/// Builds the [`FacetKey`] of a vertex sequence.
pub fn facet_key(vertices: &[VertexId]) -> FacetKey {
    let mut key: FacetKey = SmallVec::from_slice(vertices);
    key.sort_unstable();
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_has_six_quad_faces() {
        let faces = ElementType::Hex.sides(2, 8).unwrap();
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.kind == ElementType::Quad));
    }

    #[test]
    fn test_hex_face_table_uses_every_vertex_three_times() {
        let mut uses = [0usize; 8];
        for face in HEX_FACES {
            for &i in face.iter() {
                uses[i] += 1;
            }
        }
        assert_eq!(uses, [3; 8]);
    }

    #[test]
    fn test_hex_opposite_faces_are_disjoint() {
        for (side, &opposite) in HEX_OPPOSITE_FACE.iter().enumerate() {
            assert_eq!(HEX_OPPOSITE_FACE[opposite], side);
            assert!(HEX_FACES[side].iter().all(|i| !HEX_FACES[opposite].contains(i)));
        }
    }

    #[test]
    fn test_every_hex_edge_lies_in_two_faces() {
        for edge in HEX_EDGES {
            let count = HEX_FACES
                .iter()
                .filter(|face| edge.iter().all(|i| face.contains(i)))
                .count();
            assert_eq!(count, 2);
        }
    }

    #[test]
    fn test_pyramid_faces_mix_tris_and_quad() {
        let faces = ElementType::Pyramid.sides(2, 5).unwrap();
        let quads = faces.iter().filter(|f| f.kind == ElementType::Quad).count();
        assert_eq!(faces.len(), 5);
        assert_eq!(quads, 1);
    }

    #[test]
    fn test_polygon_edges_wrap_around() {
        let edges = ElementType::Polygon.sides(1, 5).unwrap();
        assert_eq!(edges.len(), 5);
        assert_eq!(edges[4].indices.as_slice(), &[4, 0]);
    }

    #[test]
    fn test_sides_reject_own_dimension() {
        assert!(ElementType::Quad.sides(2, 4).is_err());
        assert!(ElementType::Hex.sides(0, 8).is_err());
    }

    #[test]
    fn test_sides_reject_wrong_vertex_count() {
        assert!(ElementType::Hex.sides(2, 7).is_err());
    }

    #[test]
    fn test_relative_sense_rotation_is_forward() {
        assert_eq!(relative_sense(&[1, 2, 3, 4], &[3, 4, 1, 2]), Some(Sense::Forward));
    }

    #[test]
    fn test_relative_sense_reversal_is_reverse() {
        assert_eq!(relative_sense(&[1, 2, 3, 4], &[1, 4, 3, 2]), Some(Sense::Reverse));
        assert_eq!(relative_sense(&[1, 2], &[2, 1]), Some(Sense::Reverse));
    }

    #[test]
    fn test_relative_sense_unrelated_is_none() {
        assert_eq!(relative_sense(&[1, 2, 3, 4], &[1, 3, 2, 4]), None);
        assert_eq!(relative_sense(&[1, 2, 3], &[1, 2]), None);
    }

    #[test]
    fn test_sense_values() {
        assert_eq!(Sense::Forward.value(), 1);
        assert_eq!(Sense::Reverse.value(), -1);
        assert_eq!(Sense::Forward.reversed(), Sense::Reverse);
    }
}
