//! Tests for dual construction, sheet views and the mesh context.

use config::constants::{DUAL_CURVE_TAG_NAME, DUAL_ENTITY_TAG_NAME, DUAL_SURFACE_TAG_NAME};

use super::*;
use crate::layout::{PlanarLayoutEngine, SheetLayout};
use crate::mesh::{ElementType, Mesh};
use crate::primitives::{create_hex, create_hex_block, create_hex_doublet, create_pillowed_cube};

fn sheets_with_faces(dual: &DualComplex, faces: usize) -> Vec<SheetId> {
    dual.sheets()
        .filter(|&s| dual.sheet(s).map(|sheet| sheet.faces.len() == faces).unwrap_or(false))
        .collect()
}

fn pillow_sheet(dual: &DualComplex) -> SheetId {
    dual.sheets()
        .find(|&s| dual.is_pillow(s).unwrap())
        .expect("pillowed cube has a pillow sheet")
}

// =============================================================================
// CONSTRUCTION
// =============================================================================

#[test]
fn test_single_hex_dual() {
    let mut mesh = create_hex(glam::DVec3::ONE, false).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();

    // 1 hex + 6 boundary quads; 6 quad edges + 12 loop edges.
    assert_eq!(dual.vertex_count(), 7);
    assert_eq!(dual.edge_count(), 18);
    assert_eq!(dual.face_count(), 12);
    assert_eq!(dual.sheet_count(), 3);
    assert_eq!(dual.chord_count(), 3);
    dual.verify().unwrap();
}

#[test]
fn test_block_dual_counts() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();

    assert_eq!(dual.vertex_count(), 12);
    assert_eq!(dual.edge_count(), 31);
    assert_eq!(dual.face_count(), 20);
    assert_eq!(dual.sheet_count(), 4);
    assert_eq!(dual.chord_count(), 5);
    dual.verify().unwrap();

    // Two sheets cross the block, two run along it.
    assert_eq!(sheets_with_faces(&dual, 4).len(), 2);
    assert_eq!(sheets_with_faces(&dual, 6).len(), 2);
}

#[test]
fn test_build_creates_missing_faces_and_edges() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    assert!(mesh.elements_of_type(ElementType::Quad).is_empty());
    DualComplex::build(&mut mesh).unwrap();
    assert_eq!(mesh.elements_of_type(ElementType::Quad).len(), 11);
    assert_eq!(mesh.elements_of_type(ElementType::Edge).len(), 20);
}

#[test]
fn test_build_without_hexes_fails() {
    let mut mesh = Mesh::new();
    let err = DualComplex::build(&mut mesh).unwrap_err();
    assert!(matches!(err, MeshError::InvalidSheetSeed { .. }));
}

#[test]
fn test_block_chords() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();

    let mut lengths: Vec<usize> = dual
        .chords()
        .map(|c| dual.chord(c).unwrap().edges.len())
        .collect();
    lengths.sort_unstable();
    // Four chords cross one hex, one runs through both.
    assert_eq!(lengths, vec![2, 2, 2, 2, 3]);

    for chord in dual.chords() {
        assert!(!dual.is_blind_chord(chord).unwrap());
        let c = dual.chord(chord).unwrap();
        assert_eq!(dual.chord_vertices(chord).unwrap().len(), c.edges.len() + 1);
        for (i, &edge) in c.edges.iter().enumerate() {
            let e = dual.edge(edge).unwrap();
            assert_eq!(e.chord, Some(chord));
            assert!(e.other(c.vertices[i]) == Some(c.vertices[i + 1]));
        }
    }
}

#[test]
fn test_pillowed_cube_dual() {
    let mut mesh = create_pillowed_cube(4.0).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();

    assert_eq!(dual.vertex_count(), 13);
    assert_eq!(dual.edge_count(), 36);
    assert_eq!(dual.face_count(), 32);
    assert_eq!(dual.sheet_count(), 4);
    assert_eq!(dual.chord_count(), 6);
    dual.verify().unwrap();

    let pillows: Vec<SheetId> = dual.sheets().filter(|&s| dual.is_pillow(s).unwrap()).collect();
    assert_eq!(pillows.len(), 1);

    let entities = dual.get_dual_entities(pillows[0]).unwrap();
    assert_eq!(entities.vertices.len(), 6);
    assert_eq!(entities.edges.len(), 12);
    assert_eq!(entities.faces.len(), 8);
    assert!(entities.loop_edges.is_empty());

    let chords = dual.chords_of_sheet(pillows[0]).unwrap();
    assert_eq!(chords.len(), 3);
    for chord in chords {
        assert!(dual.is_blind_chord(chord).unwrap());
        assert_eq!(dual.chord(chord).unwrap().edges.len(), 4);
    }
}

#[test]
fn test_rebuild_invalidates_old_handles() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let mut dual = DualComplex::build(&mut mesh).unwrap();
    let (old, _) = dual.vertices().next().unwrap();

    dual.rebuild(&mut mesh).unwrap();
    assert_eq!(dual.vertex_count(), 12);
    assert!(matches!(dual.vertex(old), Err(MeshError::StaleHandle { .. })));
}

#[test]
fn test_primal_dual_mapping() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();

    for hex in mesh.elements_of_type(ElementType::Hex) {
        let vertex = dual.dual_of(hex).and_then(|r| r.vertex).unwrap();
        assert_eq!(dual.primal_of(DualEntity::Vertex(vertex)).unwrap(), Some(hex));
        assert!(matches!(dual.vertex(vertex).unwrap().kind, DualVertexKind::Hex(h) if h == hex));
    }
    for edge in mesh.elements_of_type(ElementType::Edge) {
        let record = dual.dual_of(edge).unwrap();
        let face = record.face.unwrap();
        assert_eq!(dual.primal_of(DualEntity::Face(face)).unwrap(), Some(edge));
        // Every edge of a 2x1x1 block lies on the skin.
        assert!(record.loop_edge.is_some());
    }
}

#[test]
fn test_sheet_membership() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();

    for (id, vertex) in dual.vertices() {
        let sheets = dual.sheets_of_vertex(id).unwrap();
        match vertex.kind {
            // Each hex sits in the three sheets crossing it.
            DualVertexKind::Hex(_) => assert_eq!(sheets.len(), 3),
            // A boundary quad sits in the two sheets of its edge directions.
            DualVertexKind::BoundaryQuad(_) => assert_eq!(sheets.len(), 2),
            DualVertexKind::Midpoint(_) => unreachable!("block has no parallel dual edges"),
        }
    }
    for (id, edge) in dual.edges() {
        let expected = if edge.is_loop() { 1 } else { 2 };
        assert_eq!(dual.sheets_of_edge(id).unwrap().len(), expected);
    }
}

#[test]
fn test_doublet_splits_parallel_edges() {
    let mut mesh = create_hex_doublet().unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    dual.verify().unwrap();

    let midpoints: Vec<DualVertexId> = dual
        .vertices()
        .filter(|(_, v)| matches!(v.kind, DualVertexKind::Midpoint(_)))
        .map(|(id, _)| id)
        .collect();
    // The two faces shared by the hexes give the only parallel pair.
    assert_eq!(midpoints.len(), 2);
    let hexes = mesh.elements_of_type(ElementType::Hex);
    let ends: Vec<DualVertexId> = hexes
        .iter()
        .map(|&h| dual.dual_of(h).and_then(|r| r.vertex).unwrap())
        .collect();
    for &m in &midpoints {
        assert_eq!(dual.primal_of(DualEntity::Vertex(m)).unwrap(), None);
        let DualVertexKind::Midpoint(edge) = dual.vertex(m).unwrap().kind else {
            panic!("{:?} is not a midpoint", m);
        };
        let edge = dual.edge(edge).unwrap();
        assert_eq!(edge.midpoint, Some(m));
        assert!(ends.contains(&edge.vertices[0]) && ends.contains(&edge.vertices[1]));
    }

    for sheet in dual.sheets() {
        let graph = SheetGraph::build(&dual, sheet).unwrap();
        let mut pairs = std::collections::BTreeSet::new();
        for link in graph.links() {
            assert!(pairs.insert((link.a.min(link.b), link.a.max(link.b))), "{:?}", link);
        }
    }
}

// =============================================================================
// SHEET VIEWS
// =============================================================================

#[test]
fn test_crossing_sheet_entities() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    let sheet = sheets_with_faces(&dual, 4)[0];

    let entities = dual.get_dual_entities(sheet).unwrap();
    // One hex and the four boundary quads around it.
    assert_eq!(entities.vertices.len(), 5);
    assert_eq!(entities.edges.len(), 8);
    assert_eq!(entities.loop_edges.len(), 4);
    assert_eq!(entities.loop_vertices.len(), 4);
    assert!(entities.faces.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_sheet_graph_roles_and_loop_walk() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    let sheet = sheets_with_faces(&dual, 6)[0];
    let graph = SheetGraph::build(&dual, sheet).unwrap();

    assert_eq!(graph.node_count(), 8);
    let interior: Vec<_> = graph.nodes().filter(|(_, r)| *r == NodeRole::Interior).collect();
    assert_eq!(interior.len(), 2);
    for (node, _) in interior {
        assert_eq!(graph.valence(node), 4);
    }

    let loop_nodes = graph.loop_nodes();
    assert_eq!(loop_nodes.len(), 6);
    let start = loop_nodes[0];
    let mut previous = None;
    let mut current = start;
    let mut steps = 0;
    loop {
        let next = graph.next_loop_vertex(previous, current).unwrap();
        steps += 1;
        if next == start {
            break;
        }
        previous = Some(current);
        current = next;
        assert!(steps <= 6);
    }
    assert_eq!(steps, 6);
}

#[test]
fn test_next_loop_vertex_rejects_interior_node() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    let sheet = sheets_with_faces(&dual, 4)[0];
    let graph = SheetGraph::build(&dual, sheet).unwrap();
    let (hex, _) = graph.nodes().find(|(_, r)| *r == NodeRole::Interior).unwrap();

    let err = graph.next_loop_vertex(None, hex).unwrap_err();
    assert!(matches!(err, MeshError::CorruptDualTopology { valence: 0, .. }));
}

#[test]
fn test_pillow_graph_is_octahedron() {
    let mut mesh = create_pillowed_cube(4.0).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    let graph = SheetGraph::build(&dual, pillow_sheet(&dual)).unwrap();

    assert!(!graph.has_loops());
    assert_eq!(graph.node_count(), 6);
    assert_eq!(graph.links().len(), 12);
    for (node, role) in graph.nodes() {
        assert_eq!(role, NodeRole::Interior);
        assert_eq!(graph.valence(node), 4);
    }
    assert_eq!(graph.chords().len(), 3);
    assert!(graph.chords().iter().all(|c| c.blind && c.nodes.len() == 4));
}

#[test]
fn test_sheet_graph_dot() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    let sheet = sheets_with_faces(&dual, 4)[0];
    let dot = SheetGraph::build(&dual, sheet).unwrap().to_dot();

    assert!(dot.starts_with(&format!("graph sheet_{} {{", sheet.0)));
    assert_eq!(dot.matches("style=bold").count(), 4);
    assert_eq!(dot.matches("doublecircle").count(), 4);
    assert!(dot.trim_end().ends_with('}'));
}

#[test]
fn test_unknown_sheet() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    assert!(matches!(
        dual.get_dual_entities(SheetId(99)),
        Err(MeshError::InvalidSheetSeed { .. })
    ));
}

// =============================================================================
// TAGS
// =============================================================================

#[test]
fn test_persist_tags() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    dual.persist_tags(&mut mesh).unwrap();

    for hex in mesh.elements_of_type(ElementType::Hex) {
        let vertex = dual.dual_of(hex).and_then(|r| r.vertex).unwrap();
        assert_eq!(dual.tagged_entity(&mesh, hex).unwrap(), Some(DualEntity::Vertex(vertex)));
    }
    for quad in mesh.elements_of_type(ElementType::Quad) {
        let edge = dual.dual_of(quad).and_then(|r| r.edge).unwrap();
        assert_eq!(dual.tagged_entity(&mesh, quad).unwrap(), Some(DualEntity::Edge(edge)));
        let chord = dual.edge(edge).unwrap().chord.unwrap();
        assert_eq!(
            mesh.tags().element_value(DUAL_CURVE_TAG_NAME, quad),
            Some(i64::from(chord.0))
        );
    }
    for edge in mesh.elements_of_type(ElementType::Edge) {
        let face = dual.dual_of(edge).and_then(|r| r.face).unwrap();
        let sheet = dual.face(face).unwrap().sheet;
        assert_eq!(
            mesh.tags().element_value(DUAL_SURFACE_TAG_NAME, edge),
            Some(i64::from(sheet.0))
        );
    }
}

#[test]
fn test_persist_tags_replaces_previous_values() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let mut dual = DualComplex::build(&mut mesh).unwrap();
    dual.persist_tags(&mut mesh).unwrap();
    let hex = mesh.elements_of_type(ElementType::Hex)[0];

    dual.rebuild(&mut mesh).unwrap();
    assert!(matches!(
        dual.tagged_entity(&mesh, hex),
        Err(MeshError::StaleHandle { .. })
    ));

    dual.persist_tags(&mut mesh).unwrap();
    assert!(dual.tagged_entity(&mesh, hex).unwrap().is_some());
    assert!(mesh.tags().contains(DUAL_ENTITY_TAG_NAME));
}

#[test]
fn test_untagged_element() {
    let mut mesh = create_hex_block([2, 1, 1]).unwrap();
    let dual = DualComplex::build(&mut mesh).unwrap();
    let hex = mesh.elements_of_type(ElementType::Hex)[0];
    assert_eq!(dual.tagged_entity(&mesh, hex).unwrap(), None);
}

// =============================================================================
// CONTEXT
// =============================================================================

struct Untouched;

impl TopologyOperator for Untouched {
    fn name(&self) -> &str {
        "untouched"
    }

    fn apply(&self, _mesh: &mut Mesh, _dual: Option<&DualComplex>) -> MeshResult<Vec<ElementId>> {
        Ok(Vec::new())
    }
}

/// Removes the last hex of the mesh.
struct DropLastHex;

impl TopologyOperator for DropLastHex {
    fn name(&self) -> &str {
        "drop-last-hex"
    }

    fn apply(&self, mesh: &mut Mesh, _dual: Option<&DualComplex>) -> MeshResult<Vec<ElementId>> {
        let Some(&hex) = mesh.elements_of_type(ElementType::Hex).last() else {
            return Ok(Vec::new());
        };
        mesh.remove_element(hex)?;
        Ok(vec![hex])
    }
}

struct Origin;

impl PlanarLayoutEngine for Origin {
    fn name(&self) -> &str {
        "origin"
    }

    fn layout(&self, graph: &SheetGraph) -> MeshResult<SheetLayout> {
        let mut layout = SheetLayout::default();
        for (node, _) in graph.nodes() {
            layout.positions.insert(node, glam::DVec2::ZERO);
        }
        Ok(layout)
    }
}

#[test]
fn test_context_builds_dual_lazily() {
    let mut context = MeshContext::new(create_hex_block([2, 1, 1]).unwrap());
    assert!(!context.has_dual());
    assert_eq!(context.dual().unwrap().sheet_count(), 4);
    assert!(context.has_dual());
}

#[test]
fn test_context_caches_sheet_views() {
    let mut context = MeshContext::new(create_hex_block([2, 1, 1]).unwrap());
    let first = context.sheet_graph(SheetId(0)).unwrap().clone();
    let second = context.sheet_graph(SheetId(0)).unwrap().clone();
    assert_eq!(first, second);

    let entities = context.sheet_entities(SheetId(0)).unwrap().clone();
    assert_eq!(entities.vertices.len(), first.node_count());

    let layout = context.layout(SheetId(0)).unwrap().clone();
    assert_eq!(layout.positions.len(), first.node_count());
    assert_eq!(context.layout(SheetId(0)).unwrap(), &layout);
}

#[test]
fn test_context_keeps_dual_when_nothing_changes() {
    let mut context = MeshContext::new(create_hex_block([2, 1, 1]).unwrap());
    context.dual().unwrap();
    let touched = context.apply(&Untouched).unwrap();
    assert!(touched.is_empty());
    assert!(context.has_dual());
}

#[test]
fn test_context_invalidates_after_topology_change() {
    let mut context = MeshContext::new(create_hex_block([2, 1, 1]).unwrap());
    context.layout(SheetId(0)).unwrap();

    let touched = context.apply(&DropLastHex).unwrap();
    assert_eq!(touched.len(), 1);
    assert!(!context.has_dual());

    let dual = context.dual().unwrap();
    assert_eq!(dual.sheet_count(), 3);
    assert_eq!(dual.chord_count(), 3);
    assert_eq!(dual.vertex_count(), 7);
    assert!(context.sheet_graph(SheetId(3)).is_err());
}

#[test]
fn test_context_unknown_sheet_leaves_no_cache_entry() {
    let mut context = MeshContext::new(create_hex_block([2, 1, 1]).unwrap());
    context.sheet_graph(SheetId(0)).unwrap();
    assert_eq!(context.cached_sheet_count(), 1);

    assert!(context.sheet_entities(SheetId(9)).is_err());
    assert!(context.sheet_graph(SheetId(9)).is_err());
    assert!(context.layout(SheetId(9)).is_err());
    assert_eq!(context.cached_sheet_count(), 1);
}

#[test]
fn test_context_custom_engine() {
    let mut context =
        MeshContext::new(create_hex_block([2, 1, 1]).unwrap()).with_engine(Box::new(Origin));
    assert_eq!(context.engine_name(), "origin");
    let layout = context.layout(SheetId(1)).unwrap();
    assert!(layout.positions.values().all(|p| *p == glam::DVec2::ZERO));
    assert!(layout.fixed.is_empty());
}
