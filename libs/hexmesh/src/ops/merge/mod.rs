//! # Vertex Merging
//!
//! Coalesces coincident vertices. Every live vertex, visited in handle
//! order, absorbs the live vertices within `epsilon` of it; the absorbed
//! vertices are redirected to the survivor and deleted.
//!
//! The pass is single and order dependent: a vertex absorbed early is never
//! reconsidered, so two survivors can end up closer than `epsilon` when a
//! chain of near points links them.


use std::collections::BTreeSet;

use config::constants::MERGE_EPSILON_DIVISOR;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Element, ElementId, ElementType, Mesh, VertexId};
use crate::ops::spatial_index::SpatialIndex;

/// Parameters for [`merge_with`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MergeOptions {
    /// Merge distance. `None` derives it from the shortest edge.
    pub epsilon: Option<f64>,
}

impl MergeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit merge distance.
    #[must_use]
    pub const fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }
}

/// Outcome of a merge pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Distance actually used.
    pub epsilon: f64,
    /// Number of vertices removed.
    pub merged: usize,
    /// `(survivor, removed)` pairs in merge order.
    pub pairs: Vec<(VertexId, VertexId)>,
    /// Elements left with a repeated vertex.
    pub degenerate_elements: Vec<ElementId>,
}

/// Merges vertices closer than `epsilon` and returns how many were removed.
pub fn merge_vertices(mesh: &mut Mesh, epsilon: f64) -> MeshResult<usize> {
    Ok(merge_with(mesh, &MergeOptions::new().with_epsilon(epsilon))?.merged)
}

/// Merges vertices according to `options`.
pub fn merge_with(mesh: &mut Mesh, options: &MergeOptions) -> MeshResult<MergeReport> {
    let epsilon = match options.epsilon {
        Some(epsilon) => epsilon,
        None => default_merge_epsilon(mesh),
    };
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(MeshError::invalid_argument(format!(
            "merge epsilon must be a non-negative number, got {}",
            epsilon
        )));
    }

    let mut report = MergeReport {
        epsilon,
        ..MergeReport::default()
    };
    if mesh.is_empty() {
        return Ok(report);
    }

    let points: Vec<_> = mesh.vertices().map(|(id, v)| (v.position, id)).collect();
    let order: Vec<VertexId> = points.iter().map(|(_, id)| *id).collect();
    let index = SpatialIndex::build(points);
    debug!(vertices = index.len(), epsilon, "built merge index");

    let mut dead: BTreeSet<VertexId> = BTreeSet::new();
    let mut touched: BTreeSet<ElementId> = BTreeSet::new();

    for survivor in order {
        if dead.contains(&survivor) {
            continue;
        }
        let position = mesh.position(survivor)?;
        let mut neighbors: Vec<VertexId> = index
            .within(position, epsilon)
            .into_iter()
            .map(|(id, _)| id)
            .filter(|id| *id > survivor && !dead.contains(id))
            .collect();
        neighbors.sort_unstable();

        for absorbed in neighbors {
            touched.extend(mesh.replace_vertex(absorbed, survivor)?);
            mesh.remove_vertex(absorbed)?;
            dead.insert(absorbed);
            report.pairs.push((survivor, absorbed));
        }
    }

    report.merged = report.pairs.len();
    for id in touched {
        if mesh.element(id)?.is_degenerate() {
            report.degenerate_elements.push(id);
        }
    }
    if !report.degenerate_elements.is_empty() {
        warn!(
            count = report.degenerate_elements.len(),
            "merge left elements with repeated vertices"
        );
    }
    info!(merged = report.merged, epsilon, "merged vertices");
    Ok(report)
}

/// Length of the shortest element edge, `None` when the mesh has no edges.
pub fn min_edge_length(mesh: &Mesh) -> Option<f64> {
    let elements: Vec<&Element> = mesh.elements().map(|(_, element)| element).collect();
    elements
        .par_iter()
        .filter_map(|element| element_min_edge(mesh, element))
        .reduce_with(f64::min)
}

fn element_min_edge(mesh: &Mesh, element: &Element) -> Option<f64> {
    let connectivity = element.connectivity();
    let edges: Vec<(VertexId, VertexId)> = if element.kind() == ElementType::Edge {
        vec![(connectivity[0], connectivity[1])]
    } else {
        element
            .side_vertices(1)
            .ok()?
            .into_iter()
            .map(|(_, vertices)| (vertices[0], vertices[1]))
            .collect()
    };
    edges
        .into_iter()
        .filter_map(|(a, b)| Some(mesh.position(a).ok()?.distance(mesh.position(b).ok()?)))
        .reduce(f64::min)
}

/// Merge distance used when none is given: shortest edge over
/// `MERGE_EPSILON_DIVISOR`, or zero for a mesh without edges.
pub fn default_merge_epsilon(mesh: &Mesh) -> f64 {
    min_edge_length(mesh).map_or(0.0, |length| length / MERGE_EPSILON_DIVISOR)
}
