//! Construction of the dual complex from the hexes of a mesh.

use std::collections::{BTreeMap, HashMap};

use smallvec::SmallVec;
use tracing::{debug, info};

use super::hyperplane::{trace_chords, trace_sheets};
use super::{
    Chord, ChordId, DualComplex, DualEdge, DualEdgeId, DualEdgeKind, DualFace, DualVertex,
    DualVertexId, DualVertexKind, Sheet, SheetId, SheetSet,
};
use crate::error::{MeshError, MeshResult};
use crate::handle::{lookup, lookup_mut, retire_all};
use crate::mesh::topology::{facet_key, HEX_OPPOSITE_FACE, QUAD_OPPOSITE_EDGE};
use crate::mesh::{ElementId, ElementType, FacetKey, Mesh};

/// Primal incidences the dual is read from.
pub(super) struct PrimalTopology {
    pub hexes: Vec<ElementId>,
    pub quads: Vec<ElementId>,
    pub edges: Vec<ElementId>,
    /// Faces of each hex in side order.
    pub hex_quads: HashMap<ElementId, [ElementId; 6]>,
    /// Hexes bounded by each quad, sorted.
    pub quad_hexes: HashMap<ElementId, SmallVec<[ElementId; 2]>>,
    /// Edges of each quad in the quad's own side order.
    pub quad_edges: HashMap<ElementId, [ElementId; 4]>,
    /// Quads containing each edge, sorted.
    pub edge_quads: HashMap<ElementId, Vec<ElementId>>,
}

impl PrimalTopology {
    fn gather(mesh: &mut Mesh) -> MeshResult<Self> {
        let hexes = mesh.elements_of_type(ElementType::Hex);
        if hexes.is_empty() {
            return Err(MeshError::invalid_seed("mesh has no hexahedra"));
        }
        let quads = mesh.get_adjacencies(&hexes, 2, true)?;
        let edges = mesh.get_adjacencies(&quads, 1, true)?;

        let quad_by_key: HashMap<FacetKey, ElementId> = quads
            .iter()
            .map(|&q| Ok((facet_key(mesh.element(q)?.connectivity()), q)))
            .collect::<MeshResult<_>>()?;
        let edge_by_key: HashMap<FacetKey, ElementId> = edges
            .iter()
            .map(|&e| Ok((facet_key(mesh.element(e)?.connectivity()), e)))
            .collect::<MeshResult<_>>()?;

        let mut hex_quads = HashMap::with_capacity(hexes.len());
        let mut quad_hexes: HashMap<ElementId, SmallVec<[ElementId; 2]>> = HashMap::new();
        for &hex in &hexes {
            let mut faces = [hex; 6];
            let sides = mesh.element(hex)?.side_vertices(2)?;
            for (side, (_, vertices)) in sides.into_iter().enumerate() {
                let key = facet_key(&vertices);
                let quad = *quad_by_key.get(&key).ok_or_else(|| {
                    MeshError::invalid_connectivity(format!(
                        "face {} of {:?} has no quad",
                        side, hex
                    ))
                })?;
                faces[side] = quad;
                quad_hexes.entry(quad).or_default().push(hex);
            }
            hex_quads.insert(hex, faces);
        }
        for &quad in &quads {
            let users = quad_hexes.get(&quad).map_or(0, |h| h.len());
            if users > 2 {
                return Err(MeshError::NonManifoldFacet {
                    vertices: mesh.element(quad)?.connectivity().to_vec(),
                    count: users,
                });
            }
        }
        for list in quad_hexes.values_mut() {
            list.sort_unstable();
        }

        let mut quad_edges = HashMap::with_capacity(quads.len());
        let mut edge_quads: HashMap<ElementId, Vec<ElementId>> = HashMap::new();
        for &quad in &quads {
            let mut sides = [quad; 4];
            let quad_sides = mesh.element(quad)?.side_vertices(1)?;
            for (i, (_, vertices)) in quad_sides.into_iter().enumerate() {
                let edge = *edge_by_key.get(&facet_key(&vertices)).ok_or_else(|| {
                    MeshError::invalid_connectivity(format!("edge {} of {:?} is missing", i, quad))
                })?;
                sides[i] = edge;
                edge_quads.entry(edge).or_default().push(quad);
            }
            quad_edges.insert(quad, sides);
        }
        for list in edge_quads.values_mut() {
            list.sort_unstable();
        }

        debug!(
            hexes = hexes.len(),
            quads = quads.len(),
            edges = edges.len(),
            "gathered primal topology"
        );
        Ok(Self {
            hexes,
            quads,
            edges,
            hex_quads,
            quad_hexes,
            quad_edges,
            edge_quads,
        })
    }

    pub fn is_boundary(&self, quad: ElementId) -> bool {
        self.quad_hexes.get(&quad).map_or(0, |h| h.len()) == 1
    }

    pub fn hexes_of(&self, quad: ElementId) -> &[ElementId] {
        self.quad_hexes.get(&quad).map_or(&[], |h| h.as_slice())
    }

    pub fn quads_of(&self, edge: ElementId) -> &[ElementId] {
        self.edge_quads.get(&edge).map_or(&[], |q| q.as_slice())
    }

    /// Face of `hex` across from `quad`.
    pub fn opposite_face(&self, hex: ElementId, quad: ElementId) -> MeshResult<ElementId> {
        let faces = self
            .hex_quads
            .get(&hex)
            .ok_or_else(|| {
                MeshError::invalid_connectivity(format!("{:?} is not a traced hex", hex))
            })?;
        let side = faces.iter().position(|&q| q == quad).ok_or_else(|| {
            MeshError::invalid_connectivity(format!("{:?} does not bound {:?}", quad, hex))
        })?;
        Ok(faces[HEX_OPPOSITE_FACE[side]])
    }

    /// Edge of `quad` across from `edge`.
    pub fn opposite_edge(&self, quad: ElementId, edge: ElementId) -> MeshResult<ElementId> {
        let sides = self
            .quad_edges
            .get(&quad)
            .ok_or_else(|| {
                MeshError::invalid_connectivity(format!("{:?} is not a traced quad", quad))
            })?;
        let i = sides.iter().position(|&e| e == edge).ok_or_else(|| {
            MeshError::invalid_connectivity(format!("{:?} does not bound {:?}", edge, quad))
        })?;
        Ok(sides[QUAD_OPPOSITE_EDGE[i]])
    }
}

impl DualComplex {
    /// Builds the dual of every hex in `mesh`.
    ///
    /// Missing quads and edges are created in the mesh.
    pub fn build(mesh: &mut Mesh) -> MeshResult<Self> {
        let mut dual = Self::default();
        dual.populate(mesh)?;
        Ok(dual)
    }

    /// Discards every dual entity and builds the complex again.
    ///
    /// Handles issued before the rebuild become stale.
    pub fn rebuild(&mut self, mesh: &mut Mesh) -> MeshResult<()> {
        self.clear();
        self.populate(mesh)
    }

    pub(crate) fn clear(&mut self) {
        retire_all(&mut self.vertices);
        retire_all(&mut self.edges);
        retire_all(&mut self.faces);
        self.sheets.clear();
        self.chords.clear();
        self.records.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn populate(&mut self, mesh: &mut Mesh) -> MeshResult<()> {
        let primal = PrimalTopology::gather(mesh)?;

        for &hex in &primal.hexes {
            let position = mesh.centroid(hex)?;
            let id = self.vertices.insert(DualVertex {
                kind: DualVertexKind::Hex(hex),
                position,
                sheets: SheetSet::new(),
            });
            self.records.entry(hex).or_default().vertex = Some(id);
        }
        for &quad in primal.quads.iter().filter(|&&q| primal.is_boundary(q)) {
            let position = mesh.centroid(quad)?;
            let id = self.vertices.insert(DualVertex {
                kind: DualVertexKind::BoundaryQuad(quad),
                position,
                sheets: SheetSet::new(),
            });
            self.records.entry(quad).or_default().vertex = Some(id);
        }

        for &quad in &primal.quads {
            let ends: SmallVec<[DualVertexId; 2]> = match primal.hexes_of(quad) {
                [a, b] => [self.vertex_of(*a)?, self.vertex_of(*b)?].into_iter().collect(),
                [a] => [self.vertex_of(*a)?, self.vertex_of(quad)?].into_iter().collect(),
                other => {
                    return Err(MeshError::invalid_connectivity(format!(
                        "{:?} bounds {} hexes",
                        quad,
                        other.len()
                    )))
                }
            };
            let id = self.edges.insert(DualEdge {
                kind: DualEdgeKind::Quad(quad),
                vertices: [ends[0], ends[1]],
                chord: None,
                sheets: SheetSet::new(),
                midpoint: None,
            });
            self.records.entry(quad).or_default().edge = Some(id);
        }

        for &edge in &primal.edges {
            let boundary: SmallVec<[ElementId; 2]> = primal
                .quads_of(edge)
                .iter()
                .copied()
                .filter(|&q| primal.is_boundary(q))
                .collect();
            match boundary.as_slice() {
                [] => {}
                [a, b] => {
                    let id = self.edges.insert(DualEdge {
                        kind: DualEdgeKind::BoundaryEdge(edge),
                        vertices: [self.vertex_of(*a)?, self.vertex_of(*b)?],
                        chord: None,
                        sheets: SheetSet::new(),
                        midpoint: None,
                    });
                    self.records.entry(edge).or_default().loop_edge = Some(id);
                }
                other => {
                    return Err(MeshError::invalid_seed(format!(
                        "skin edge {:?} touches {} boundary quads",
                        edge,
                        other.len()
                    )))
                }
            }
        }

        let sheets = trace_sheets(&primal)?;
        for (index, sheet_edges) in sheets.into_iter().enumerate() {
            let sheet_id = SheetId(index as u32);
            let mut sheet = Sheet::default();
            for edge in sheet_edges {
                let face = self.face_around(&primal, edge, sheet_id)?;
                let face_id = self.faces.insert(face);
                self.records.entry(edge).or_default().face = Some(face_id);
                sheet.faces.push(face_id);
                sheet.primal_edges.push(edge);
            }
            self.sheets.push(sheet);
        }
        self.assign_sheet_membership()?;

        for (index, trace) in trace_chords(&primal)?.into_iter().enumerate() {
            let chord_id = ChordId(index as u32);
            let mut chord = Chord {
                blind: trace.blind,
                quads: trace.quads.clone(),
                ..Chord::default()
            };
            for &quad in &trace.quads {
                let edge = self.edge_of(quad)?;
                lookup_mut(&mut self.edges, edge)?.chord = Some(chord_id);
                chord.edges.push(edge);
            }
            if !trace.blind {
                if let Some(&first) = trace.quads.first() {
                    chord.vertices.push(self.vertex_of(first)?);
                }
            }
            for &hex in &trace.hexes {
                chord.vertices.push(self.vertex_of(hex)?);
            }
            if !trace.blind {
                if let Some(&last) = trace.quads.last() {
                    chord.vertices.push(self.vertex_of(last)?);
                }
            }
            self.chords.push(chord);
        }

        self.split_parallel_edges()?;

        info!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            faces = self.faces.len(),
            sheets = self.sheets.len(),
            chords = self.chords.len(),
            "built dual complex"
        );
        Ok(())
    }

    fn vertex_of(&self, primal: ElementId) -> MeshResult<DualVertexId> {
        self.records
            .get(&primal)
            .and_then(|r| r.vertex)
            .ok_or_else(|| MeshError::invalid_seed(format!("{:?} has no dual vertex", primal)))
    }

    fn edge_of(&self, quad: ElementId) -> MeshResult<DualEdgeId> {
        self.records
            .get(&quad)
            .and_then(|r| r.edge)
            .ok_or_else(|| MeshError::invalid_seed(format!("{:?} has no dual edge", quad)))
    }

    /// Orders the dual edges around a primal edge into a cycle.
    fn face_around(
        &self,
        primal: &PrimalTopology,
        edge: ElementId,
        sheet: SheetId,
    ) -> MeshResult<DualFace> {
        let mut ring: Vec<DualEdgeId> = primal
            .quads_of(edge)
            .iter()
            .map(|&q| self.edge_of(q))
            .collect::<MeshResult<_>>()?;
        if let Some(loop_edge) = self.records.get(&edge).and_then(|r| r.loop_edge) {
            ring.push(loop_edge);
        }

        let mut incident: BTreeMap<DualVertexId, SmallVec<[DualEdgeId; 2]>> = BTreeMap::new();
        for &id in &ring {
            for v in lookup(&self.edges, id)?.vertices {
                incident.entry(v).or_default().push(id);
            }
        }
        if let Some((_, list)) = incident.iter().find(|(_, list)| list.len() != 2) {
            return Err(MeshError::invalid_seed(format!(
                "edge {:?} is not manifold: a dual vertex around it has {} incident edges",
                edge,
                list.len()
            )));
        }
        let Some(&start) = incident.keys().next() else {
            return Err(MeshError::invalid_seed(format!("edge {:?} bounds no quad", edge)));
        };

        let mut vertices = vec![start];
        let mut edges = Vec::with_capacity(ring.len());
        let mut current = start;
        let mut via = incident[&start].iter().copied().min();
        while let Some(step) = via {
            edges.push(step);
            let next = lookup(&self.edges, step)?.other(current).ok_or_else(|| {
                MeshError::invalid_connectivity(format!("{:?} does not touch {:?}", step, current))
            })?;
            if next == start {
                break;
            }
            vertices.push(next);
            current = next;
            via = incident[&next].iter().copied().find(|&e| e != step);
        }
        if edges.len() != ring.len() {
            return Err(MeshError::invalid_seed(format!(
                "dual edges around {:?} form more than one cycle",
                edge
            )));
        }
        Ok(DualFace {
            edge,
            vertices,
            edges,
            sheet,
        })
    }

    fn assign_sheet_membership(&mut self) -> MeshResult<()> {
        for (index, sheet) in self.sheets.iter().enumerate() {
            let sheet_id = SheetId(index as u32);
            for &face_id in &sheet.faces {
                let face = lookup(&self.faces, face_id)?;
                for &edge in &face.edges {
                    let sheets = &mut lookup_mut(&mut self.edges, edge)?.sheets;
                    if !sheets.contains(&sheet_id) {
                        sheets.push(sheet_id);
                    }
                }
                for &vertex in &face.vertices {
                    let sheets = &mut lookup_mut(&mut self.vertices, vertex)?.sheets;
                    if !sheets.contains(&sheet_id) {
                        sheets.push(sheet_id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Splits every dual edge that shares both endpoints with another edge
    /// of the same sheet, so sheets stay simple graphs.
    fn split_parallel_edges(&mut self) -> MeshResult<()> {
        let mut split = Vec::new();
        for sheet in &self.sheets {
            let mut by_ends: BTreeMap<(DualVertexId, DualVertexId), Vec<DualEdgeId>> =
                BTreeMap::new();
            for &face_id in &sheet.faces {
                for &edge_id in &lookup(&self.faces, face_id)?.edges {
                    let [a, b] = lookup(&self.edges, edge_id)?.vertices;
                    if a == b {
                        return Err(MeshError::invalid_connectivity(format!(
                            "{:?} joins a vertex to itself",
                            edge_id
                        )));
                    }
                    let group = by_ends.entry((a.min(b), a.max(b))).or_default();
                    if !group.contains(&edge_id) {
                        group.push(edge_id);
                    }
                }
            }
            split.extend(by_ends.into_values().filter(|group| group.len() > 1).flatten());
        }
        split.sort_unstable();
        split.dedup();

        for edge_id in split {
            let edge = lookup(&self.edges, edge_id)?;
            if edge.midpoint.is_some() {
                continue;
            }
            let [a, b] = edge.vertices;
            let sheets = edge.sheets.clone();
            let position =
                (lookup(&self.vertices, a)?.position + lookup(&self.vertices, b)?.position) / 2.0;
            let midpoint = self.vertices.insert(DualVertex {
                kind: DualVertexKind::Midpoint(edge_id),
                position,
                sheets,
            });
            lookup_mut(&mut self.edges, edge_id)?.midpoint = Some(midpoint);
            debug!(edge = ?edge_id, "split parallel dual edge");
        }
        Ok(())
    }
}
