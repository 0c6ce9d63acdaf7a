//! Sheet and chord tracing over the primal incidences.
//!
//! A sheet is the closure of a primal edge under "opposite edge in a
//! quad"; a chord is the closure of a quad under "opposite face in a hex".

use std::collections::{BTreeSet, VecDeque};

use tracing::debug;

use super::construct::PrimalTopology;
use crate::error::{MeshError, MeshResult};
use crate::mesh::ElementId;

/// Quads and hexes of one chord in walk order.
///
/// For open chords `quads[i]` and `quads[i + 1]` bound `hexes[i]`; for
/// blind chords `quads[i]` joins `hexes[i]` and `hexes[i + 1]`, wrapping.
#[derive(Debug, Clone, Default)]
pub(super) struct ChordTrace {
    pub quads: Vec<ElementId>,
    pub hexes: Vec<ElementId>,
    pub blind: bool,
}

/// Groups primal edges into sheets, seeded from the lowest unvisited edge.
pub(super) fn trace_sheets(primal: &PrimalTopology) -> MeshResult<Vec<Vec<ElementId>>> {
    let mut visited: BTreeSet<ElementId> = BTreeSet::new();
    let mut sheets = Vec::new();
    for &seed in &primal.edges {
        if !visited.insert(seed) {
            continue;
        }
        let mut sheet = Vec::new();
        let mut queue = VecDeque::from([seed]);
        while let Some(edge) = queue.pop_front() {
            sheet.push(edge);
            for &quad in primal.quads_of(edge) {
                let opposite = primal.opposite_edge(quad, edge)?;
                if visited.insert(opposite) {
                    queue.push_back(opposite);
                }
            }
        }
        sheets.push(sheet);
    }
    debug!(sheets = sheets.len(), "traced sheets");
    Ok(sheets)
}

/// Groups quads into chords. Open chords are traced first from boundary
/// quads, then the remaining quads form blind chords.
pub(super) fn trace_chords(primal: &PrimalTopology) -> MeshResult<Vec<ChordTrace>> {
    let mut visited: BTreeSet<ElementId> = BTreeSet::new();
    let mut chords = Vec::new();

    for &start in primal.quads.iter().filter(|&&q| primal.is_boundary(q)) {
        if visited.contains(&start) {
            continue;
        }
        chords.push(trace_open(primal, start, &mut visited)?);
    }
    for &start in &primal.quads {
        if visited.contains(&start) {
            continue;
        }
        chords.push(trace_blind(primal, start, &mut visited)?);
    }
    debug!(
        chords = chords.len(),
        blind = chords.iter().filter(|c| c.blind).count(),
        "traced chords"
    );
    Ok(chords)
}

fn revisited(quad: ElementId) -> MeshError {
    MeshError::invalid_connectivity(format!("chord walk reached {:?} twice", quad))
}

fn trace_open(
    primal: &PrimalTopology,
    start: ElementId,
    visited: &mut BTreeSet<ElementId>,
) -> MeshResult<ChordTrace> {
    let mut trace = ChordTrace::default();
    visited.insert(start);
    trace.quads.push(start);
    let mut current = start;
    let mut came_from: Option<ElementId> = None;
    while let Some(&hex) = primal.hexes_of(current).iter().find(|&&h| Some(h) != came_from) {
        let next = primal.opposite_face(hex, current)?;
        if !visited.insert(next) {
            return Err(revisited(next));
        }
        trace.hexes.push(hex);
        trace.quads.push(next);
        came_from = Some(hex);
        current = next;
    }
    Ok(trace)
}

fn trace_blind(
    primal: &PrimalTopology,
    start: ElementId,
    visited: &mut BTreeSet<ElementId>,
) -> MeshResult<ChordTrace> {
    let hexes = primal.hexes_of(start);
    let (&first, &second) = match hexes {
        [a, b] => (a, b),
        _ => {
            return Err(MeshError::invalid_connectivity(format!(
                "interior quad {:?} bounds {} hexes",
                start,
                hexes.len()
            )))
        }
    };
    let mut trace = ChordTrace {
        blind: true,
        ..ChordTrace::default()
    };
    visited.insert(start);
    trace.hexes.push(first);
    trace.quads.push(start);

    let mut current = start;
    let mut hex = second;
    loop {
        let next = primal.opposite_face(hex, current)?;
        if next == start {
            break;
        }
        if !visited.insert(next) {
            return Err(revisited(next));
        }
        trace.hexes.push(hex);
        trace.quads.push(next);
        hex = primal
            .hexes_of(next)
            .iter()
            .copied()
            .find(|&h| h != hex)
            .ok_or_else(|| {
                MeshError::invalid_connectivity(format!("{:?} ends a blind chord", next))
            })?;
        current = next;
    }
    Ok(trace)
}
