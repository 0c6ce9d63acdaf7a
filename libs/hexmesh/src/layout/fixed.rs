//! Fixed node placement: loop circles and pillow anchors.

use std::collections::BTreeSet;
use std::f64::consts::{FRAC_PI_2, PI};

use config::constants::INNER_LOOP_RADIUS_FACTOR;
use glam::DVec2;
use tracing::warn;

use super::SheetLayout;
use crate::dual::{DualVertexId, SheetGraph};
use crate::error::MeshResult;

fn on_circle(radius: f64, angle: f64) -> DVec2 {
    DVec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Boundary loops of the sheet as ordered cycles, each starting at its
/// lowest node.
pub(super) fn boundary_loops(graph: &SheetGraph) -> MeshResult<Vec<Vec<DualVertexId>>> {
    let mut remaining: BTreeSet<DualVertexId> = graph.loop_nodes().into_iter().collect();
    let mut loops = Vec::new();
    while let Some(start) = remaining.pop_first() {
        let mut cycle = vec![start];
        let mut previous = None;
        let mut current = start;
        loop {
            let next = graph.next_loop_vertex(previous, current)?;
            if next == start {
                break;
            }
            remaining.remove(&next);
            cycle.push(next);
            previous = Some(current);
            current = next;
        }
        loops.push(cycle);
    }
    Ok(loops)
}

/// Spaces each loop evenly on a circle: the first on `radius`, the second
/// on a smaller concentric circle. Later loops are stacked at the origin.
pub(super) fn place_loops(
    graph: &SheetGraph,
    radius: f64,
    layout: &mut SheetLayout,
) -> MeshResult<()> {
    let loops = boundary_loops(graph)?;
    for (index, cycle) in loops.iter().enumerate() {
        let ring = match index {
            0 => radius,
            1 => radius * INNER_LOOP_RADIUS_FACTOR,
            _ => {
                warn!(
                    sheet = graph.sheet().0,
                    loop_index = index,
                    "sheet has more than two boundary loops, pinning extra loop at the origin"
                );
                0.0
            }
        };
        let step = 2.0 * PI / cycle.len() as f64;
        for (i, &node) in cycle.iter().enumerate() {
            layout.fix(node, on_circle(ring, i as f64 * step));
        }
    }
    Ok(())
}

/// Anchors a sheet without boundary loops.
///
/// With at most three chords the first chord goes on the outer circle and
/// the free nodes of the second chord on the inner circle, half a step out
/// of phase. Otherwise three anchors taken from the first two chords are
/// spread 120 degrees apart.
pub(super) fn compute_pillow_fixed_points(
    graph: &SheetGraph,
    radius: f64,
    layout: &mut SheetLayout,
) {
    let chords = graph.chords();
    if (1..=3).contains(&chords.len()) {
        let first = &chords[0].nodes;
        let step = 2.0 * PI / first.len() as f64;
        for (i, &node) in first.iter().enumerate() {
            layout.fix(node, on_circle(radius, i as f64 * step));
        }
        if let Some(second) = chords.get(1) {
            let step = 2.0 * PI / second.nodes.len() as f64;
            for (i, &node) in second.nodes.iter().enumerate() {
                if !layout.is_fixed(node) {
                    let angle = (i as f64 + 0.5) * step;
                    layout.fix(node, on_circle(radius * INNER_LOOP_RADIUS_FACTOR, angle));
                }
            }
        }
        return;
    }

    let mut anchors: Vec<DualVertexId> = Vec::with_capacity(3);
    let mut push = |node: Option<&DualVertexId>| {
        if let Some(&node) = node {
            if !anchors.contains(&node) && anchors.len() < 3 {
                anchors.push(node);
            }
        }
    };
    if let Some(chord) = chords.first() {
        push(chord.nodes.first());
        push(chord.nodes.get(chord.nodes.len() / 2));
    }
    if let Some(chord) = chords.get(1) {
        push(chord.nodes.first());
    }
    let nodes: Vec<DualVertexId> = graph.nodes().map(|(node, _)| node).collect();
    for node in &nodes {
        push(Some(node));
    }

    for (k, &node) in anchors.iter().enumerate() {
        let angle = FRAC_PI_2 + k as f64 * 2.0 * PI / 3.0;
        layout.fix(node, on_circle(radius, angle));
    }
}
