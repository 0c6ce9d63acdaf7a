//! # Sheet Queries
//!
//! Per-sheet views of the dual complex: the raw entity sets of a sheet and
//! the simple planar graph used to draw it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use super::{
    ChordId, DualComplex, DualEdgeId, DualFaceId, DualVertexId, DualVertexKind, SheetId,
};
use crate::error::{MeshError, MeshResult};
use crate::handle::Handle;

/// Dual entities of one sheet, each list sorted by handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetEntities {
    pub faces: Vec<DualFaceId>,
    pub edges: Vec<DualEdgeId>,
    /// Includes midpoints of split edges.
    pub vertices: Vec<DualVertexId>,
    pub loop_vertices: Vec<DualVertexId>,
    pub loop_edges: Vec<DualEdgeId>,
}

impl DualComplex {
    /// Collects the faces, edges and vertices of a sheet, with the loop
    /// entities along its boundary.
    pub fn get_dual_entities(&self, sheet: SheetId) -> MeshResult<SheetEntities> {
        let faces = &self.sheet(sheet)?.faces;
        let mut edges = BTreeSet::new();
        let mut vertices = BTreeSet::new();
        let mut loop_edges = BTreeSet::new();
        let mut loop_vertices = BTreeSet::new();
        for &face_id in faces {
            let face = self.face(face_id)?;
            vertices.extend(face.vertices.iter().copied());
            for &edge_id in &face.edges {
                edges.insert(edge_id);
                let edge = self.edge(edge_id)?;
                if let Some(midpoint) = edge.midpoint {
                    vertices.insert(midpoint);
                }
                if edge.is_loop() {
                    loop_edges.insert(edge_id);
                    loop_vertices.extend(edge.vertices);
                }
            }
        }
        let mut sorted_faces = faces.clone();
        sorted_faces.sort_unstable();
        Ok(SheetEntities {
            faces: sorted_faces,
            edges: edges.into_iter().collect(),
            vertices: vertices.into_iter().collect(),
            loop_vertices: loop_vertices.into_iter().collect(),
            loop_edges: loop_edges.into_iter().collect(),
        })
    }
}

/// Role of a node in a sheet drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Interior,
    /// Endpoint of a loop edge.
    Loop,
    /// Midpoint of a split edge.
    Midpoint,
}

/// One link of the drawing; split edges contribute two links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLink {
    pub a: DualVertexId,
    pub b: DualVertexId,
    pub edge: DualEdgeId,
    pub loop_edge: bool,
}

/// A chord of the sheet as a path (or cycle, when blind) of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetChord {
    pub chord: ChordId,
    pub nodes: Vec<DualVertexId>,
    pub blind: bool,
}

/// Simple graph of one sheet, ready for planar layout.
///
/// Neighbor lists are sorted so traversals are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGraph {
    sheet: SheetId,
    nodes: BTreeMap<DualVertexId, NodeRole>,
    links: Vec<SheetLink>,
    neighbors: BTreeMap<DualVertexId, Vec<(DualVertexId, bool)>>,
    chords: Vec<SheetChord>,
}

impl SheetGraph {
    /// Builds the drawing graph of a sheet.
    pub fn build(dual: &DualComplex, sheet: SheetId) -> MeshResult<Self> {
        let entities = dual.get_dual_entities(sheet)?;
        let loop_vertices: BTreeSet<DualVertexId> =
            entities.loop_vertices.iter().copied().collect();

        let mut nodes = BTreeMap::new();
        for &vertex in &entities.vertices {
            let role = match dual.vertex(vertex)?.kind {
                DualVertexKind::Midpoint(_) => NodeRole::Midpoint,
                _ if loop_vertices.contains(&vertex) => NodeRole::Loop,
                _ => NodeRole::Interior,
            };
            nodes.insert(vertex, role);
        }

        let mut links = Vec::with_capacity(entities.edges.len());
        for &edge_id in &entities.edges {
            let edge = dual.edge(edge_id)?;
            let [a, b] = edge.vertices;
            if a == b {
                return Err(MeshError::invalid_connectivity(format!(
                    "{:?} joins a vertex to itself",
                    edge_id
                )));
            }
            let loop_edge = edge.is_loop();
            match edge.midpoint {
                Some(m) => {
                    links.push(SheetLink {
                        a,
                        b: m,
                        edge: edge_id,
                        loop_edge,
                    });
                    links.push(SheetLink {
                        a: m,
                        b,
                        edge: edge_id,
                        loop_edge,
                    });
                }
                None => links.push(SheetLink {
                    a,
                    b,
                    edge: edge_id,
                    loop_edge,
                }),
            }
        }

        let mut chords = Vec::new();
        for chord_id in dual.chords_of_sheet(sheet)? {
            let chord = dual.chord(chord_id)?;
            let mut path = Vec::with_capacity(2 * chord.vertices.len());
            for (i, &vertex) in chord.vertices.iter().enumerate() {
                path.push(vertex);
                if let Some(&edge) = chord.edges.get(i) {
                    if let Some(m) = dual.edge(edge)?.midpoint {
                        path.push(m);
                    }
                }
            }
            chords.push(SheetChord {
                chord: chord_id,
                nodes: path,
                blind: chord.blind,
            });
        }

        Ok(Self::from_parts(sheet, nodes, links, chords))
    }

    /// Assembles a graph from its nodes, links and chord paths.
    ///
    /// Link ends missing from `nodes` are added as interior nodes.
    pub fn from_parts(
        sheet: SheetId,
        mut nodes: BTreeMap<DualVertexId, NodeRole>,
        links: Vec<SheetLink>,
        chords: Vec<SheetChord>,
    ) -> Self {
        for link in &links {
            nodes.entry(link.a).or_insert(NodeRole::Interior);
            nodes.entry(link.b).or_insert(NodeRole::Interior);
        }
        let mut neighbors: BTreeMap<DualVertexId, Vec<(DualVertexId, bool)>> =
            nodes.keys().map(|&v| (v, Vec::new())).collect();
        for link in &links {
            neighbors.entry(link.a).or_default().push((link.b, link.loop_edge));
            neighbors.entry(link.b).or_default().push((link.a, link.loop_edge));
        }
        for list in neighbors.values_mut() {
            list.sort_unstable_by_key(|(v, _)| *v);
        }
        Self {
            sheet,
            nodes,
            links,
            neighbors,
            chords,
        }
    }

    pub fn sheet(&self) -> SheetId {
        self.sheet
    }

    /// Nodes with their roles, sorted by handle.
    pub fn nodes(&self) -> impl Iterator<Item = (DualVertexId, NodeRole)> + '_ {
        self.nodes.iter().map(|(v, role)| (*v, *role))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn role(&self, node: DualVertexId) -> Option<NodeRole> {
        self.nodes.get(&node).copied()
    }

    pub fn links(&self) -> &[SheetLink] {
        &self.links
    }

    /// Neighbors of a node, sorted.
    pub fn neighbors(&self, node: DualVertexId) -> impl Iterator<Item = DualVertexId> + '_ {
        self.neighbors.get(&node).into_iter().flatten().map(|(v, _)| *v)
    }

    pub fn valence(&self, node: DualVertexId) -> usize {
        self.neighbors.get(&node).map_or(0, Vec::len)
    }

    /// Neighbors reached through loop links, sorted.
    pub fn loop_neighbors(&self, node: DualVertexId) -> Vec<DualVertexId> {
        self.neighbors
            .get(&node)
            .into_iter()
            .flatten()
            .filter(|(_, on_loop)| *on_loop)
            .map(|(v, _)| *v)
            .collect()
    }

    /// Nodes lying on loop links, sorted.
    pub fn loop_nodes(&self) -> Vec<DualVertexId> {
        self.neighbors
            .iter()
            .filter(|(_, list)| list.iter().any(|(_, on_loop)| *on_loop))
            .map(|(v, _)| *v)
            .collect()
    }

    /// Next node along the boundary loop after walking `previous → current`.
    ///
    /// Without a previous node the lowest loop neighbor is taken.
    pub fn next_loop_vertex(
        &self,
        previous: Option<DualVertexId>,
        current: DualVertexId,
    ) -> MeshResult<DualVertexId> {
        let around = self.loop_neighbors(current);
        if around.len() != 2 {
            return Err(MeshError::CorruptDualTopology {
                vertex: current,
                valence: around.len(),
            });
        }
        Ok(match previous {
            Some(p) if around[0] == p => around[1],
            _ => around[0],
        })
    }

    pub fn chords(&self) -> &[SheetChord] {
        &self.chords
    }

    pub fn has_loops(&self) -> bool {
        self.links.iter().any(|link| link.loop_edge)
    }

    /// Graphviz description of the sheet. Loop links are bold; midpoints
    /// are drawn as points.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "graph sheet_{} {{", self.sheet.0);
        for (node, role) in &self.nodes {
            let shape = match role {
                NodeRole::Interior => "circle",
                NodeRole::Loop => "doublecircle",
                NodeRole::Midpoint => "point",
            };
            let _ = writeln!(out, "  v{} [shape={}];", node.index(), shape);
        }
        for link in &self.links {
            let style = if link.loop_edge { " [style=bold]" } else { "" };
            let _ = writeln!(out, "  v{} -- v{}{};", link.a.index(), link.b.index(), style);
        }
        out.push_str("}\n");
        out
    }
}
