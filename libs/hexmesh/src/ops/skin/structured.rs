//! Boundary of whole structured blocks, read off the ijk layout.

use std::collections::{HashMap, HashSet};

use super::{Candidate, Selection};
use crate::mesh::{ElementId, Mesh, StructuredBlock, VertexId};

/// Blocks whose elements exactly cover the selection, if their vertices
/// are pairwise disjoint.
fn covering_blocks<'m>(
    mesh: &'m Mesh,
    selection: &Selection<'_>,
) -> Option<Vec<&'m StructuredBlock>> {
    let selected: HashSet<ElementId> = selection.ids().collect();
    let mut covered = 0;
    let mut blocks = Vec::new();
    for block in mesh.structured_blocks() {
        let inside = block.elements().iter().filter(|e| selected.contains(e)).count();
        if inside == 0 {
            continue;
        }
        if inside != block.elements().len() {
            return None;
        }
        covered += inside;
        blocks.push(block);
    }
    if covered != selected.len() || blocks.is_empty() {
        return None;
    }

    let mut seen: HashSet<VertexId> = HashSet::new();
    for block in &blocks {
        if !block.vertices().iter().all(|v| seen.insert(*v)) {
            return None;
        }
    }
    Some(blocks)
}

pub(super) fn boundary(mesh: &Mesh, selection: &Selection<'_>) -> Option<Vec<Candidate>> {
    if selection.dimension != 3 {
        return None;
    }
    let blocks = covering_blocks(mesh, selection)?;
    let positions: HashMap<ElementId, usize> = selection
        .ids()
        .enumerate()
        .map(|(position, id)| (id, position))
        .collect();

    let mut candidates = Vec::new();
    for block in blocks {
        for (element, side) in block.boundary_faces() {
            let position = *positions.get(&element)?;
            let (_, hex) = selection.elements[position];
            let (shape, vertices) = hex.side_vertices(2).ok()?.into_iter().nth(side)?;
            candidates.push(Candidate {
                position,
                element,
                side,
                kind: shape.kind,
                vertices,
            });
        }
    }
    candidates.sort_by_key(|c| (c.position, c.side));
    Some(candidates)
}
