//! # Hexahedral Dual
//!
//! The combinatorial dual of a hex mesh:
//!
//! - one dual vertex per hexahedron and per boundary quad
//! - one dual edge per quad (hex to hex, or hex to boundary quad) and one
//!   "loop" edge per skin edge, joining the two boundary quads along it
//! - one dual face per primal edge, the cycle of dual edges around it
//!
//! Dual faces group into **sheets** (dual surfaces) through the opposite
//! edges of each quad, and dual edges into **chords** through the opposite
//! faces of each hex. A chord that never reaches the boundary is blind.
//!
//! Dual entities live in their own slot maps. The mapping
//! from primal elements to dual entities is a side table of
//! [`DualRecord`]s; [`DualComplex::persist_tags`] copies it into mesh tags.

mod construct;
mod context;
mod hyperplane;
mod sheet;
mod tags;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};

use config::constants::INLINE_SHEET_MEMBERSHIP;
use glam::DVec3;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{MeshError, MeshResult};
use crate::handle::{lookup, Handle};
use crate::mesh::ElementId;

pub use context::{MeshContext, TopologyOperator};
pub use sheet::{NodeRole, SheetChord, SheetEntities, SheetGraph, SheetLink};

new_key_type! {
    /// Handle of a dual vertex.
    pub struct DualVertexId;

    /// Handle of a dual edge.
    pub struct DualEdgeId;

    /// Handle of a dual face.
    pub struct DualFaceId;
}

impl Handle for DualVertexId {
    const KIND: &'static str = "dual vertex";
}

impl Handle for DualEdgeId {
    const KIND: &'static str = "dual edge";
}

impl Handle for DualFaceId {
    const KIND: &'static str = "dual face";
}

/// Index of a sheet (dual surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(pub u32);

/// Index of a chord (dual curve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChordId(pub u32);

/// Sheets a dual entity belongs to.
pub type SheetSet = SmallVec<[SheetId; INLINE_SHEET_MEMBERSHIP]>;

/// What a dual vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualVertexKind {
    Hex(ElementId),
    BoundaryQuad(ElementId),
    /// Point splitting a dual edge that is parallel to another in a sheet.
    Midpoint(DualEdgeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualVertex {
    pub kind: DualVertexKind,
    pub position: DVec3,
    pub sheets: SheetSet,
}

/// What a dual edge stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DualEdgeKind {
    Quad(ElementId),
    /// Loop edge across a skin edge.
    BoundaryEdge(ElementId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualEdge {
    pub kind: DualEdgeKind,
    pub vertices: [DualVertexId; 2],
    pub chord: Option<ChordId>,
    pub sheets: SheetSet,
    pub midpoint: Option<DualVertexId>,
}

impl DualEdge {
    pub fn is_loop(&self) -> bool {
        matches!(self.kind, DualEdgeKind::BoundaryEdge(_))
    }

    /// Endpoint opposite to `vertex`.
    pub fn other(&self, vertex: DualVertexId) -> Option<DualVertexId> {
        match self.vertices {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }
}

/// Cycle of dual edges around one primal edge.
#[derive(Debug, Clone, PartialEq)]
pub struct DualFace {
    pub edge: ElementId,
    /// Vertices in cycle order; `edges[i]` joins `vertices[i]` and
    /// `vertices[i + 1]` (wrapping).
    pub vertices: Vec<DualVertexId>,
    pub edges: Vec<DualEdgeId>,
    pub sheet: SheetId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub faces: Vec<DualFaceId>,
    pub primal_edges: Vec<ElementId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chord {
    /// Dual edges in walk order.
    pub edges: Vec<DualEdgeId>,
    /// `edges[i]` joins `vertices[i]` and `vertices[i + 1]`, wrapping
    /// around for blind chords.
    pub vertices: Vec<DualVertexId>,
    pub quads: Vec<ElementId>,
    pub blind: bool,
}

/// Dual entities standing for one primal element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DualRecord {
    /// For hexes and boundary quads.
    pub vertex: Option<DualVertexId>,
    /// For quads.
    pub edge: Option<DualEdgeId>,
    /// For edges.
    pub face: Option<DualFaceId>,
    /// For skin edges.
    pub loop_edge: Option<DualEdgeId>,
}

/// Any dual entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DualEntity {
    Vertex(DualVertexId),
    Edge(DualEdgeId),
    Face(DualFaceId),
}

/// The dual complex of a hex mesh.
#[derive(Debug, Clone, Default)]
pub struct DualComplex {
    vertices: SlotMap<DualVertexId, DualVertex>,
    edges: SlotMap<DualEdgeId, DualEdge>,
    faces: SlotMap<DualFaceId, DualFace>,
    sheets: Vec<Sheet>,
    chords: Vec<Chord>,
    records: BTreeMap<ElementId, DualRecord>,
}

impl DualComplex {
    pub fn vertex(&self, id: DualVertexId) -> MeshResult<&DualVertex> {
        lookup(&self.vertices, id)
    }

    pub fn edge(&self, id: DualEdgeId) -> MeshResult<&DualEdge> {
        lookup(&self.edges, id)
    }

    pub fn face(&self, id: DualFaceId) -> MeshResult<&DualFace> {
        lookup(&self.faces, id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (DualVertexId, &DualVertex)> + '_ {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (DualEdgeId, &DualEdge)> + '_ {
        self.edges.iter()
    }

    pub fn faces(&self) -> impl Iterator<Item = (DualFaceId, &DualFace)> + '_ {
        self.faces.iter()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// All sheet ids in discovery order.
    pub fn sheets(&self) -> impl Iterator<Item = SheetId> + '_ {
        (0..self.sheets.len() as u32).map(SheetId)
    }

    /// All chord ids in discovery order.
    pub fn chords(&self) -> impl Iterator<Item = ChordId> + '_ {
        (0..self.chords.len() as u32).map(ChordId)
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn chord_count(&self) -> usize {
        self.chords.len()
    }

    pub fn sheet(&self, id: SheetId) -> MeshResult<&Sheet> {
        self.sheets
            .get(id.0 as usize)
            .ok_or_else(|| MeshError::invalid_seed(format!("no sheet {}", id.0)))
    }

    pub fn chord(&self, id: ChordId) -> MeshResult<&Chord> {
        self.chords
            .get(id.0 as usize)
            .ok_or_else(|| MeshError::invalid_seed(format!("no chord {}", id.0)))
    }

    pub fn sheets_of_vertex(&self, id: DualVertexId) -> MeshResult<&[SheetId]> {
        Ok(&self.vertex(id)?.sheets)
    }

    pub fn sheets_of_edge(&self, id: DualEdgeId) -> MeshResult<&[SheetId]> {
        Ok(&self.edge(id)?.sheets)
    }

    /// Chords running inside a sheet, in chord order.
    pub fn chords_of_sheet(&self, sheet: SheetId) -> MeshResult<Vec<ChordId>> {
        self.sheet(sheet)?;
        let mut chords = Vec::new();
        for id in self.chords() {
            let chord = self.chord(id)?;
            let inside = match chord.edges.first() {
                Some(&edge) => self.edge(edge)?.sheets.contains(&sheet),
                None => false,
            };
            if inside {
                chords.push(id);
            }
        }
        Ok(chords)
    }

    /// Dual vertices of a chord in walk order.
    pub fn chord_vertices(&self, chord: ChordId) -> MeshResult<&[DualVertexId]> {
        Ok(&self.chord(chord)?.vertices)
    }

    pub fn is_blind_chord(&self, chord: ChordId) -> MeshResult<bool> {
        Ok(self.chord(chord)?.blind)
    }

    /// A sheet is a pillow when it has no boundary loop and at most three
    /// chords.
    pub fn is_pillow(&self, sheet: SheetId) -> MeshResult<bool> {
        let entities = self.get_dual_entities(sheet)?;
        Ok(entities.loop_edges.is_empty() && self.chords_of_sheet(sheet)?.len() <= 3)
    }

    /// Dual entities standing for a primal element.
    pub fn dual_of(&self, primal: ElementId) -> Option<&DualRecord> {
        self.records.get(&primal)
    }

    /// Primal element a dual entity stands for; `None` for midpoints.
    pub fn primal_of(&self, entity: DualEntity) -> MeshResult<Option<ElementId>> {
        Ok(match entity {
            DualEntity::Vertex(id) => match self.vertex(id)?.kind {
                DualVertexKind::Hex(e) | DualVertexKind::BoundaryQuad(e) => Some(e),
                DualVertexKind::Midpoint(_) => None,
            },
            DualEntity::Edge(id) => match self.edge(id)?.kind {
                DualEdgeKind::Quad(e) | DualEdgeKind::BoundaryEdge(e) => Some(e),
            },
            DualEntity::Face(id) => Some(self.face(id)?.edge),
        })
    }

    /// Checks the structural invariants of the complex.
    ///
    /// Every dual face belongs to exactly one existing sheet and closes up,
    /// every quad edge lies in exactly one chord, loop edges lie in none,
    /// and every dual edge joins two distinct live vertices.
    pub fn verify(&self) -> MeshResult<()> {
        let mut in_sheet: BTreeSet<DualFaceId> = BTreeSet::new();
        for sheet in &self.sheets {
            for &face in &sheet.faces {
                if !in_sheet.insert(face) {
                    return Err(MeshError::invalid_connectivity(format!(
                        "{:?} is listed by two sheets",
                        face
                    )));
                }
            }
        }
        for (id, face) in self.faces.iter() {
            if !in_sheet.contains(&id) {
                return Err(MeshError::invalid_connectivity(format!(
                    "{:?} belongs to no sheet",
                    id
                )));
            }
            self.sheet(face.sheet)?;
            let n = face.vertices.len();
            if n < 2 || n != face.edges.len() {
                return Err(MeshError::invalid_connectivity(format!("{:?} is not a cycle", id)));
            }
            for (i, &edge) in face.edges.iter().enumerate() {
                let [a, b] = self.edge(edge)?.vertices;
                let (u, v) = (face.vertices[i], face.vertices[(i + 1) % n]);
                if !((a == u && b == v) || (a == v && b == u)) {
                    return Err(MeshError::invalid_connectivity(format!(
                        "{:?} does not join consecutive vertices of {:?}",
                        edge, id
                    )));
                }
            }
        }

        let mut in_chord: BTreeMap<DualEdgeId, usize> = BTreeMap::new();
        for chord in &self.chords {
            for &edge in &chord.edges {
                *in_chord.entry(edge).or_insert(0) += 1;
            }
        }
        for (id, edge) in self.edges.iter() {
            let [a, b] = edge.vertices;
            if a == b {
                return Err(MeshError::invalid_connectivity(format!(
                    "{:?} joins a vertex to itself",
                    id
                )));
            }
            self.vertex(a)?;
            self.vertex(b)?;
            let expected = if edge.is_loop() { 0 } else { 1 };
            let found = in_chord.get(&id).copied().unwrap_or(0);
            if found != expected {
                return Err(MeshError::invalid_connectivity(format!(
                    "{:?} lies in {} chords, expected {}",
                    id, found, expected
                )));
            }
        }
        Ok(())
    }
}
