//! Boundary detection through the vertex-to-element adjacency.

use std::borrow::Cow;
use std::collections::HashSet;

use super::{non_manifold, Candidate, Selection};
use crate::error::MeshResult;
use crate::mesh::topology::facet_key;
use crate::mesh::{ElementId, Mesh, VertexAdjacency};

pub(super) fn boundary(mesh: &Mesh, selection: &Selection<'_>) -> MeshResult<Vec<Candidate>> {
    let adjacency = match mesh.cached_adjacency() {
        Some(adjacency) => Cow::Borrowed(adjacency),
        None => Cow::Owned(VertexAdjacency::from_mesh(mesh)),
    };
    let selected: HashSet<ElementId> = selection.ids().collect();
    let side_dim = selection.dimension - 1;

    let mut candidates = Vec::new();
    for (position, (id, element)) in selection.elements.iter().enumerate() {
        for (side, (shape, vertices)) in element.side_vertices(side_dim)?.into_iter().enumerate() {
            let key = facet_key(&vertices);
            let mut users = 1;
            for other in adjacency.elements_sharing(&vertices) {
                if other == *id || !selected.contains(&other) {
                    continue;
                }
                let other_element = mesh.element(other)?;
                if other_element.dimension() != selection.dimension {
                    continue;
                }
                let shares_side = other_element
                    .side_vertices(side_dim)?
                    .iter()
                    .any(|(_, v)| facet_key(v) == key);
                if shares_side {
                    users += 1;
                }
            }
            if users > 2 {
                return Err(non_manifold(&key, users));
            }
            if users == 1 {
                candidates.push(Candidate {
                    position,
                    element: *id,
                    side,
                    kind: shape.kind,
                    vertices,
                });
            }
        }
    }
    Ok(candidates)
}
