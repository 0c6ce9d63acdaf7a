//! Facet counting keyed by sorted vertex handles.

use std::collections::HashMap;

use rayon::prelude::*;

use super::{non_manifold, Candidate, Selection};
use crate::error::MeshResult;
use crate::mesh::topology::facet_key;
use crate::mesh::FacetKey;

pub(super) fn boundary(selection: &Selection<'_>) -> MeshResult<Vec<Candidate>> {
    let side_dim = selection.dimension - 1;

    // Side enumeration is independent per element; the indexed collect
    // keeps input order.
    let per_element: Vec<Vec<Candidate>> = selection
        .elements
        .par_iter()
        .enumerate()
        .map(|(position, (id, element))| -> MeshResult<Vec<Candidate>> {
            Ok(element
                .side_vertices(side_dim)?
                .into_iter()
                .enumerate()
                .map(|(side, (shape, vertices))| Candidate {
                    position,
                    element: *id,
                    side,
                    kind: shape.kind,
                    vertices,
                })
                .collect())
        })
        .collect::<MeshResult<_>>()?;

    let mut counts: HashMap<FacetKey, usize> = HashMap::new();
    for candidate in per_element.iter().flatten() {
        *counts.entry(facet_key(&candidate.vertices)).or_insert(0) += 1;
    }
    let worst = counts
        .iter()
        .filter(|(_, count)| **count > 2)
        .min_by(|a, b| a.0.cmp(b.0));
    if let Some((key, count)) = worst {
        return Err(non_manifold(key, *count));
    }

    Ok(per_element
        .into_iter()
        .flatten()
        .filter(|candidate| counts.get(&facet_key(&candidate.vertices)) == Some(&1))
        .collect())
}
