//! Tests for the mesh data structure.

use glam::DVec3;

use super::*;
use crate::error::MeshError;

fn unit_quad(mesh: &mut Mesh) -> (ElementId, [VertexId; 4]) {
    let v = [
        mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0)),
        mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0)),
        mesh.add_vertex(DVec3::new(1.0, 1.0, 0.0)),
        mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0)),
    ];
    let quad = mesh.add_element(ElementType::Quad, &v).unwrap();
    (quad, v)
}

#[test]
fn test_add_element_rejects_wrong_vertex_count() {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(DVec3::ZERO);
    let b = mesh.add_vertex(DVec3::X);
    let result = mesh.add_element(ElementType::Tri, &[a, b]);
    assert!(matches!(result, Err(MeshError::InvalidConnectivity { .. })));
}

#[test]
fn test_add_element_rejects_repeated_vertex() {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(DVec3::ZERO);
    let b = mesh.add_vertex(DVec3::X);
    assert!(mesh.add_element(ElementType::Tri, &[a, b, a]).is_err());
}

#[test]
fn test_add_element_rejects_removed_vertex() {
    let mut mesh = Mesh::new();
    let a = mesh.add_vertex(DVec3::ZERO);
    let b = mesh.add_vertex(DVec3::X);
    let c = mesh.add_vertex(DVec3::Y);
    mesh.remove_vertex(c).unwrap();
    let result = mesh.add_element(ElementType::Tri, &[a, b, c]);
    assert!(matches!(result, Err(MeshError::StaleHandle { .. })));
}

#[test]
fn test_remove_vertex_in_use_fails() {
    let mut mesh = Mesh::new();
    let (_, v) = unit_quad(&mut mesh);
    assert!(mesh.remove_vertex(v[0]).is_err());
    mesh.vertex_adjacency();
    assert!(mesh.remove_vertex(v[0]).is_err());
}

#[test]
fn test_centroid_of_quad() {
    let mut mesh = Mesh::new();
    let (quad, _) = unit_quad(&mut mesh);
    let centroid = mesh.centroid(quad).unwrap();
    assert!((centroid - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
}

#[test]
fn test_bounding_box() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::new(1.0, 2.0, 3.0), [2, 1, 1], DVec3::ONE)
        .unwrap();
    let (min, max) = mesh.bounding_box();
    assert_eq!(min, DVec3::new(1.0, 2.0, 3.0));
    assert_eq!(max, DVec3::new(3.0, 3.0, 4.0));
}

#[test]
fn test_get_adjacencies_downward_creates_edges_once() {
    let mut mesh = Mesh::new();
    let (quad, _) = unit_quad(&mut mesh);
    assert!(mesh.get_adjacencies(&[quad], 1, false).unwrap().is_empty());

    let edges = mesh.get_adjacencies(&[quad], 1, true).unwrap();
    assert_eq!(edges.len(), 4);
    assert_eq!(mesh.element_count(), 5);

    let again = mesh.get_adjacencies(&[quad], 1, true).unwrap();
    assert_eq!(again, edges);
    assert_eq!(mesh.element_count(), 5);
}

#[test]
fn test_get_adjacencies_upward_finds_both_hexes() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, [2, 1, 1], DVec3::ONE).unwrap();
    let hexes = mesh.elements_of_type(ElementType::Hex);
    let quads = mesh.get_adjacencies(&hexes, 2, true).unwrap();
    assert_eq!(quads.len(), 11);

    let shared: Vec<_> = quads
        .iter()
        .copied()
        .filter(|&q| mesh.get_adjacencies(&[q], 3, false).unwrap().len() == 2)
        .collect();
    assert_eq!(shared.len(), 1);
}

#[test]
fn test_get_adjacencies_rejects_vertex_dimension() {
    let mut mesh = Mesh::new();
    let (quad, _) = unit_quad(&mut mesh);
    assert!(mesh.get_adjacencies(&[quad], 0, false).is_err());
}

#[test]
fn test_adjacency_tracks_replace_vertex() {
    let mut mesh = Mesh::new();
    let (quad, v) = unit_quad(&mut mesh);
    let extra = mesh.add_vertex(DVec3::new(2.0, 2.0, 0.0));
    mesh.vertex_adjacency();

    let changed = mesh.replace_vertex(v[2], extra).unwrap();
    assert_eq!(changed, vec![quad]);
    let adjacency = mesh.cached_adjacency().unwrap();
    assert!(adjacency.elements_of(v[2]).is_empty());
    assert_eq!(adjacency.elements_of(extra), &[quad]);
    assert!(mesh.element(quad).unwrap().contains(extra));
}

#[test]
fn test_remove_element_cleans_sets_and_tags() {
    let mut mesh = Mesh::new();
    let (quad, _) = unit_quad(&mut mesh);
    mesh.add_set(SetKind::Neumann, 4, vec![quad]).unwrap();
    mesh.tags_mut().set_element("weight", quad, 3);

    mesh.remove_element(quad).unwrap();
    assert!(mesh.set(SetKind::Neumann, 4).unwrap().elements.is_empty());
    assert_eq!(mesh.tags().element_value("weight", quad), None);
}

#[test]
fn test_unknown_set_is_an_error() {
    let mesh = Mesh::new();
    assert!(matches!(
        mesh.set(SetKind::Material, 9),
        Err(MeshError::UnknownSet { id: 9, .. })
    ));
}

#[test]
fn test_set_elements_unions_without_duplicates() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, [3, 1, 1], DVec3::ONE).unwrap();
    let hexes = mesh.elements_of_type(ElementType::Hex);
    mesh.add_set(SetKind::Material, 1, hexes[..2].to_vec()).unwrap();
    mesh.add_set(SetKind::Material, 2, hexes[1..].to_vec()).unwrap();

    let union = mesh.set_elements(SetKind::Material, &[1, 2]).unwrap();
    assert_eq!(union, hexes);
    assert!(mesh.set_elements(SetKind::Material, &[1, 5]).is_err());
}

#[test]
fn test_tag_default_applies_to_untagged_vertices() {
    let mut mesh = Mesh::new();
    let (_, v) = unit_quad(&mut mesh);
    mesh.tags_mut().create("fixed", Some(0));
    mesh.tags_mut().set_vertex("fixed", v[1], 1);
    assert_eq!(mesh.tags().vertex_value("fixed", v[0]), Some(0));
    assert_eq!(mesh.tags().vertex_value("fixed", v[1]), Some(1));
    assert_eq!(mesh.tags().vertex_value("missing", v[1]), None);
}

#[test]
fn test_extract_copies_only_used_vertices() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, [2, 1, 1], DVec3::ONE).unwrap();
    let hexes = mesh.elements_of_type(ElementType::Hex);
    mesh.add_set(SetKind::Material, 1, hexes.clone()).unwrap();
    let first_vertex = mesh.element(hexes[0]).unwrap().connectivity()[0];
    mesh.tags_mut().set_vertex("fixed", first_vertex, 1);

    let sub = mesh.extract(&hexes[..1]).unwrap();
    assert_eq!(sub.element_count(), 1);
    assert_eq!(sub.vertex_count(), 8);
    assert_eq!(sub.set(SetKind::Material, 1).unwrap().elements.len(), 1);
    let tagged: Vec<_> = sub.tags().get("fixed").unwrap().vertex_values().collect();
    assert_eq!(tagged.len(), 1);
}

#[test]
fn test_structured_block_layout() {
    let mut mesh = Mesh::new();
    let index = mesh.add_structured_block(DVec3::ZERO, [2, 3, 4], DVec3::ONE).unwrap();
    let block = &mesh.structured_blocks()[index];
    assert_eq!(block.vertices().len(), 3 * 4 * 5);
    assert_eq!(block.elements().len(), 24);

    let corner = mesh.position(block.vertex(2, 3, 4)).unwrap();
    assert_eq!(corner, DVec3::new(2.0, 3.0, 4.0));

    let hex = mesh.element(block.element(1, 2, 3)).unwrap();
    assert_eq!(hex.connectivity()[0], block.vertex(1, 2, 3));
    assert_eq!(hex.connectivity()[6], block.vertex(2, 3, 4));
}

#[test]
fn test_structured_boundary_face_count() {
    let mut mesh = Mesh::new();
    let index = mesh.add_structured_block(DVec3::ZERO, [2, 3, 4], DVec3::ONE).unwrap();
    let faces = mesh.structured_blocks()[index].boundary_faces();
    assert_eq!(faces.len(), 2 * (2 * 3 + 3 * 4 + 2 * 4));
}

#[test]
fn test_removing_block_element_forgets_block() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, [2, 1, 1], DVec3::ONE).unwrap();
    let hexes = mesh.elements_of_type(ElementType::Hex);
    mesh.remove_element(hexes[0]).unwrap();
    assert!(mesh.structured_blocks().is_empty());
}

#[test]
fn test_validate_accepts_block() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, [1, 1, 1], DVec3::ONE).unwrap();
    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.max_dimension(), Some(3));
}

#[test]
fn test_register_block_checks_lattice_order() {
    let mut mesh = Mesh::new();
    let index = mesh.add_structured_block(DVec3::ZERO, [2, 1, 1], DVec3::ONE).unwrap();
    let block = mesh.structured_blocks()[index].clone();

    let swapped: Vec<_> = block.elements().iter().rev().copied().collect();
    let shuffled =
        StructuredBlock::from_parts([2, 1, 1], block.vertices().to_vec(), swapped).unwrap();
    assert!(matches!(
        mesh.register_structured_block(shuffled),
        Err(MeshError::InvalidConnectivity { .. })
    ));
    assert_eq!(mesh.structured_blocks().len(), 1);

    let again = StructuredBlock::from_parts(
        [2, 1, 1],
        block.vertices().to_vec(),
        block.elements().to_vec(),
    )
    .unwrap();
    assert_eq!(mesh.register_structured_block(again).unwrap(), 1);
}

#[test]
fn test_replacing_block_vertex_forgets_block() {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, [1, 1, 1], DVec3::ONE).unwrap();
    let block = mesh.structured_blocks()[0].clone();
    let outside = mesh.add_vertex(DVec3::splat(5.0));
    mesh.replace_vertex(block.vertex(1, 1, 1), outside).unwrap();
    assert!(mesh.structured_blocks().is_empty());
}
