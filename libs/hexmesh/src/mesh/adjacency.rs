//! # Vertex Adjacency
//!
//! Upward adjacency from vertices to the elements that use them. Built on
//! demand and kept in sync by [`Mesh`] once it exists.

use std::collections::{BTreeSet, HashMap};

use smallvec::SmallVec;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::mesh::topology::facet_key;
use crate::mesh::{ElementId, Mesh, VertexId};

/// Map from each vertex to the elements referencing it.
#[derive(Debug, Clone, Default)]
pub struct VertexAdjacency {
    map: HashMap<VertexId, SmallVec<[ElementId; 8]>>,
}

impl VertexAdjacency {
    /// Builds the adjacency of every live element of `mesh`.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut adjacency = Self::default();
        for (id, element) in mesh.elements() {
            adjacency.insert(id, element.connectivity());
        }
        adjacency
    }

    /// Elements using `vertex`, in insertion order.
    pub fn elements_of(&self, vertex: VertexId) -> &[ElementId] {
        self.map.get(&vertex).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Elements using every vertex in `vertices`, sorted by handle.
    pub fn elements_sharing(&self, vertices: &[VertexId]) -> Vec<ElementId> {
        let Some((first, rest)) = vertices.split_first() else {
            return Vec::new();
        };
        let mut candidates: Vec<ElementId> = self.elements_of(*first).to_vec();
        candidates.sort_unstable();
        candidates.retain(|element| rest.iter().all(|v| self.elements_of(*v).contains(element)));
        candidates
    }

    pub(crate) fn insert(&mut self, element: ElementId, connectivity: &[VertexId]) {
        for &vertex in connectivity {
            let entry = self.map.entry(vertex).or_default();
            if !entry.contains(&element) {
                entry.push(element);
            }
        }
    }

    pub(crate) fn remove(&mut self, element: ElementId, connectivity: &[VertexId]) {
        for vertex in connectivity {
            if let Some(entry) = self.map.get_mut(vertex) {
                entry.retain(|e| *e != element);
            }
        }
    }

    pub(crate) fn replace(&mut self, element: ElementId, old: VertexId, new: VertexId) {
        if let Some(entry) = self.map.get_mut(&old) {
            entry.retain(|e| *e != element);
        }
        let entry = self.map.entry(new).or_default();
        if !entry.contains(&element) {
            entry.push(element);
        }
    }

    pub(crate) fn forget(&mut self, vertex: VertexId) {
        self.map.remove(&vertex);
    }
}

impl Mesh {
    /// Builds the vertex adjacency if it does not exist yet and returns it.
    pub fn vertex_adjacency(&mut self) -> &VertexAdjacency {
        if self.adjacency.is_none() {
            let adjacency = VertexAdjacency::from_mesh(self);
            debug!(vertices = adjacency.map.len(), "built vertex adjacency");
            self.adjacency = Some(adjacency);
        }
        self.adjacency.get_or_insert_with(VertexAdjacency::default)
    }

    /// Adjacency built earlier, if any.
    pub fn cached_adjacency(&self) -> Option<&VertexAdjacency> {
        self.adjacency.as_ref()
    }

    /// Drops the cached adjacency.
    pub fn clear_adjacency(&mut self) {
        self.adjacency = None;
    }

    /// Existing element of dimension `dim` over exactly the given vertices.
    pub fn find_element(&mut self, dim: usize, vertices: &[VertexId]) -> Option<ElementId> {
        let key = facet_key(vertices);
        let candidates = self.vertex_adjacency().elements_sharing(vertices);
        candidates.into_iter().find(|&id| {
            self.element(id)
                .map(|e| e.dimension() == dim && facet_key(e.connectivity()) == key)
                .unwrap_or(false)
        })
    }

    /// Entities of dimension `dim` adjacent to any of `elements`.
    ///
    /// Downward queries return the sides of each element, creating missing
    /// ones when `create_if_missing` is set. Upward queries return the
    /// elements containing every vertex of the source. Asking for the
    /// source's own dimension returns the source. The result is sorted and
    /// free of duplicates.
    pub fn get_adjacencies(
        &mut self,
        elements: &[ElementId],
        dim: usize,
        create_if_missing: bool,
    ) -> MeshResult<Vec<ElementId>> {
        if dim == 0 || dim > 3 {
            return Err(MeshError::invalid_argument(format!(
                "adjacency dimension must be 1, 2 or 3, got {}",
                dim
            )));
        }
        let mut result = BTreeSet::new();
        for &id in elements {
            let element = self.element(id)?.clone();
            let own = element.dimension();
            if dim == own {
                result.insert(id);
            } else if dim < own {
                for (side, vertices) in element.side_vertices(dim)? {
                    match self.find_element(dim, &vertices) {
                        Some(existing) => {
                            result.insert(existing);
                        }
                        None if create_if_missing => {
                            result.insert(self.add_element(side.kind, &vertices)?);
                        }
                        None => {}
                    }
                }
            } else {
                let candidates = self.vertex_adjacency().elements_sharing(element.connectivity());
                for candidate in candidates {
                    if self.element(candidate)?.dimension() == dim {
                        result.insert(candidate);
                    }
                }
            }
        }
        Ok(result.into_iter().collect())
    }
}
