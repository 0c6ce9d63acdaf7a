//! Laplacian smoothing of the free nodes and the blind chord post-pass.

use std::collections::BTreeMap;

use config::constants::EPSILON;
use glam::DVec2;
use tracing::debug;

use super::{LayoutParams, LayoutWeighting, SheetLayout};
use crate::dual::{DualVertexId, NodeRole, SheetGraph};
use crate::error::{MeshError, MeshResult};

/// Jacobi iterations over every node not fixed by the boundary pass.
///
/// Free nodes start at the origin. Each iteration moves every free node to
/// the weighted average of its neighbors' positions from the previous
/// iteration.
pub(super) fn smooth(
    graph: &SheetGraph,
    params: &LayoutParams,
    layout: &mut SheetLayout,
) -> MeshResult<()> {
    let free: Vec<DualVertexId> = graph
        .nodes()
        .map(|(node, _)| node)
        .filter(|node| !layout.is_fixed(*node))
        .collect();

    for &node in &free {
        let valence = graph.valence(node);
        let is_midpoint = graph.role(node) == Some(NodeRole::Midpoint);
        if !is_midpoint && !(3..=4).contains(&valence) {
            return Err(MeshError::CorruptDualTopology { vertex: node, valence });
        }
        layout.positions.insert(node, DVec2::ZERO);
    }
    if free.is_empty() {
        return Ok(());
    }

    for _ in 0..params.iterations {
        let previous: BTreeMap<DualVertexId, DVec2> = layout.positions.clone();
        for &node in &free {
            let here = previous.get(&node).copied().unwrap_or(DVec2::ZERO);
            let mut sum = DVec2::ZERO;
            let mut total = 0.0;
            for neighbor in graph.neighbors(node) {
                let there = previous.get(&neighbor).copied().unwrap_or(DVec2::ZERO);
                let weight = match params.weighting {
                    LayoutWeighting::Uniform => 1.0,
                    LayoutWeighting::InverseLength => {
                        let length = here.distance(there);
                        if length > EPSILON {
                            1.0 / length
                        } else {
                            1.0
                        }
                    }
                };
                sum += there * weight;
                total += weight;
            }
            if total > 0.0 {
                layout.positions.insert(node, sum / total);
            }
        }
    }
    debug!(
        sheet = graph.sheet().0,
        free = free.len(),
        iterations = params.iterations,
        "smoothed sheet"
    );
    Ok(())
}

/// Spreads the midpoints of parallel edges off the segment joining their
/// ends.
///
/// Smoothing puts every midpoint of a parallel group on the midpoint of
/// `ab`, so the split edges would still draw on top of each other. This
/// covers blind chords made of two parallel edges, the cycle `a, m1, b, m2`.
/// The free midpoints of a group are fanned out along the perpendicular of
/// `ab`, one segment length apart, or half a radius apart when `a` and `b`
/// coincide.
pub(super) fn fixup_degen_bchords(graph: &SheetGraph, radius: f64, layout: &mut SheetLayout) {
    let mut groups: BTreeMap<(DualVertexId, DualVertexId), Vec<DualVertexId>> = BTreeMap::new();
    for (node, role) in graph.nodes() {
        if role != NodeRole::Midpoint {
            continue;
        }
        let ends: Vec<DualVertexId> = graph.neighbors(node).collect();
        if let [a, b] = ends[..] {
            groups.entry((a.min(b), a.max(b))).or_default().push(node);
        }
    }

    let mut moved = 0;
    for ((a, b), group) in groups {
        if group.len() < 2 {
            continue;
        }
        let (Some(pa), Some(pb)) = (layout.position(a), layout.position(b)) else {
            continue;
        };
        let mid = (pa + pb) / 2.0;
        let length = pa.distance(pb);
        let (normal, spacing) = if length > EPSILON {
            ((pb - pa).perp() / length, length)
        } else {
            (DVec2::Y, radius / 2.0)
        };
        let center = (group.len() - 1) as f64 / 2.0;
        for (i, &node) in group.iter().enumerate() {
            if layout.is_fixed(node) {
                continue;
            }
            let offset = (i as f64 - center) * spacing;
            layout.positions.insert(node, mid + normal * offset);
            moved += 1;
        }
    }
    if moved > 0 {
        debug!(sheet = graph.sheet().0, moved, "spread parallel midpoints");
    }
}
