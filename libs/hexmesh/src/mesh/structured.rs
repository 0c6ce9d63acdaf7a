//! # Structured Blocks
//!
//! A structured block is an `ni x nj x nk` lattice of hexahedra stored in
//! the unstructured mesh, remembered together with its index layout so the
//! skinner can read the boundary off the lattice instead of hashing faces.
//!
//! Vertex `(i, j, k)` sits at `i + j(ni+1) + k(ni+1)(nj+1)`; element
//! `(i, j, k)` at `i + j*ni + k*ni*nj`.

use glam::DVec3;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{ElementId, ElementType, Mesh, VertexId};

/// Hex face lying on each block boundary: i-min, i-max, j-min, j-max,
/// k-min, k-max.
const BOUNDARY_SIDES: [usize; 6] = [3, 1, 0, 2, 4, 5];

/// Index layout of a structured hex block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredBlock {
    dims: [usize; 3],
    vertices: Vec<VertexId>,
    elements: Vec<ElementId>,
}

impl StructuredBlock {
    /// Assembles a block from existing handles, checking the counts.
    pub fn from_parts(
        dims: [usize; 3],
        vertices: Vec<VertexId>,
        elements: Vec<ElementId>,
    ) -> MeshResult<Self> {
        let [ni, nj, nk] = dims;
        if ni == 0 || nj == 0 || nk == 0 {
            return Err(MeshError::invalid_argument(format!(
                "structured block dimensions must be positive, got {:?}",
                dims
            )));
        }
        if vertices.len() != (ni + 1) * (nj + 1) * (nk + 1) || elements.len() != ni * nj * nk {
            return Err(MeshError::invalid_argument(format!(
                "block {:?} needs {} vertices and {} elements, got {} and {}",
                dims,
                (ni + 1) * (nj + 1) * (nk + 1),
                ni * nj * nk,
                vertices.len(),
                elements.len()
            )));
        }
        Ok(Self {
            dims,
            vertices,
            elements,
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    pub fn vertex(&self, i: usize, j: usize, k: usize) -> VertexId {
        let [ni, nj, _] = self.dims;
        self.vertices[i + j * (ni + 1) + k * (ni + 1) * (nj + 1)]
    }

    pub fn element(&self, i: usize, j: usize, k: usize) -> ElementId {
        let [ni, nj, _] = self.dims;
        self.elements[i + j * ni + k * ni * nj]
    }

    /// Connectivity the hex at `(i, j, k)` must have for the boundary
    /// tables to hold.
    pub fn corners(&self, i: usize, j: usize, k: usize) -> [VertexId; 8] {
        lattice_corners(|i, j, k| self.vertex(i, j, k), i, j, k)
    }

    /// Boundary hex faces as `(element, side)` pairs.
    ///
    /// Elements are visited in block order and each element's sides in
    /// ascending side index.
    pub fn boundary_faces(&self) -> Vec<(ElementId, usize)> {
        let [ni, nj, nk] = self.dims;
        let mut faces = Vec::with_capacity(2 * (ni * nj + nj * nk + ni * nk));
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let on_boundary = [
                        i == 0,
                        i + 1 == ni,
                        j == 0,
                        j + 1 == nj,
                        k == 0,
                        k + 1 == nk,
                    ];
                    let mut sides: Vec<usize> = on_boundary
                        .iter()
                        .zip(BOUNDARY_SIDES)
                        .filter(|(hit, _)| **hit)
                        .map(|(_, side)| side)
                        .collect();
                    sides.sort_unstable();
                    let element = self.element(i, j, k);
                    faces.extend(sides.into_iter().map(|side| (element, side)));
                }
            }
        }
        faces
    }
}

impl Mesh {
    /// Adds an `ni x nj x nk` block of unit-oriented hexahedra.
    ///
    /// Returns the index of the block in [`Mesh::structured_blocks`].
    pub fn add_structured_block(
        &mut self,
        origin: DVec3,
        dims: [usize; 3],
        spacing: DVec3,
    ) -> MeshResult<usize> {
        let [ni, nj, nk] = dims;
        if ni == 0 || nj == 0 || nk == 0 {
            return Err(MeshError::invalid_argument(format!(
                "structured block dimensions must be positive, got {:?}",
                dims
            )));
        }
        let mut vertices = Vec::with_capacity((ni + 1) * (nj + 1) * (nk + 1));
        for k in 0..=nk {
            for j in 0..=nj {
                for i in 0..=ni {
                    let offset = DVec3::new(i as f64, j as f64, k as f64) * spacing;
                    vertices.push(self.add_vertex(origin + offset));
                }
            }
        }
        let v = |i: usize, j: usize, k: usize| vertices[i + j * (ni + 1) + k * (ni + 1) * (nj + 1)];
        let mut elements = Vec::with_capacity(ni * nj * nk);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let connectivity = lattice_corners(v, i, j, k);
                    elements.push(self.add_element(ElementType::Hex, &connectivity)?);
                }
            }
        }
        self.blocks.push(StructuredBlock::from_parts(dims, vertices, elements)?);
        Ok(self.blocks.len() - 1)
    }

    pub fn structured_blocks(&self) -> &[StructuredBlock] {
        &self.blocks
    }

    /// Registers a block whose vertices and elements already exist.
    ///
    /// Every element must be a hex whose connectivity is the lattice cell
    /// at its block position.
    pub fn register_structured_block(&mut self, block: StructuredBlock) -> MeshResult<usize> {
        for &vertex in block.vertices() {
            self.vertex(vertex)?;
        }
        let [ni, nj, nk] = block.dims();
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let id = block.element(i, j, k);
                    let element = self.element(id)?;
                    if element.kind() != ElementType::Hex {
                        return Err(MeshError::unsupported("structured blocks hold hexahedra only"));
                    }
                    if element.connectivity() != &block.corners(i, j, k)[..] {
                        return Err(MeshError::invalid_connectivity(format!(
                            "{:?} is not the lattice cell ({}, {}, {}) of its block",
                            id, i, j, k
                        )));
                    }
                }
            }
        }
        self.blocks.push(block);
        Ok(self.blocks.len() - 1)
    }
}

fn lattice_corners(
    v: impl Fn(usize, usize, usize) -> VertexId,
    i: usize,
    j: usize,
    k: usize,
) -> [VertexId; 8] {
    [
        v(i, j, k),
        v(i + 1, j, k),
        v(i + 1, j + 1, k),
        v(i, j + 1, k),
        v(i, j, k + 1),
        v(i + 1, j, k + 1),
        v(i + 1, j + 1, k + 1),
        v(i, j + 1, k + 1),
    ]
}
