//! # Hexahedral Primitives
//!
//! Generates small hex meshes: single boxes, structured blocks, face-sharing
//! pairs and the pillowed cube.

use glam::DVec3;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{ElementId, ElementType, Mesh, VertexId};

fn check_size(size: DVec3) -> MeshResult<()> {
    if size.x <= 0.0 || size.y <= 0.0 || size.z <= 0.0 {
        return Err(MeshError::invalid_argument(format!(
            "Box size must be positive: {:?}",
            size
        )));
    }
    Ok(())
}

/// Adds the 8 corners of an axis-aligned box in hex order.
fn add_box_corners(mesh: &mut Mesh, min: DVec3, max: DVec3) -> [VertexId; 8] {
    [
        mesh.add_vertex(DVec3::new(min.x, min.y, min.z)),
        mesh.add_vertex(DVec3::new(max.x, min.y, min.z)),
        mesh.add_vertex(DVec3::new(max.x, max.y, min.z)),
        mesh.add_vertex(DVec3::new(min.x, max.y, min.z)),
        mesh.add_vertex(DVec3::new(min.x, min.y, max.z)),
        mesh.add_vertex(DVec3::new(max.x, min.y, max.z)),
        mesh.add_vertex(DVec3::new(max.x, max.y, max.z)),
        mesh.add_vertex(DVec3::new(min.x, max.y, max.z)),
    ]
}

/// Adds a hex spanning two quads, `top[i]` sitting over `bottom[i]`.
///
/// The winding is flipped when needed so every face points outward.
pub fn add_hex_between(
    mesh: &mut Mesh,
    bottom: [VertexId; 4],
    top: [VertexId; 4],
) -> MeshResult<ElementId> {
    let b: Vec<DVec3> = bottom.iter().map(|&v| mesh.position(v)).collect::<MeshResult<_>>()?;
    let t: Vec<DVec3> = top.iter().map(|&v| mesh.position(v)).collect::<MeshResult<_>>()?;
    let normal = (b[1] - b[0]).cross(b[3] - b[0]);
    let rise = (t[0] + t[1] + t[2] + t[3] - b[0] - b[1] - b[2] - b[3]) / 4.0;
    let connectivity = if normal.dot(rise) >= 0.0 {
        [bottom[0], bottom[1], bottom[2], bottom[3], top[0], top[1], top[2], top[3]]
    } else {
        [bottom[0], bottom[3], bottom[2], bottom[1], top[0], top[3], top[2], top[1]]
    };
    mesh.add_element(ElementType::Hex, &connectivity)
}

/// Creates a single hexahedron.
///
/// # Example
///
/// ```rust
/// use hexmesh::primitives::create_hex;
/// use glam::DVec3;
///
/// let mesh = create_hex(DVec3::splat(2.0), true).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.element_count(), 1);
/// ```
pub fn create_hex(size: DVec3, center: bool) -> MeshResult<Mesh> {
    check_size(size)?;
    let mut mesh = Mesh::with_capacity(8, 1);
    let (min, max) = if center {
        let half = size / 2.0;
        (-half, half)
    } else {
        (DVec3::ZERO, size)
    };
    let corners = add_box_corners(&mut mesh, min, max);
    mesh.add_element(ElementType::Hex, &corners)?;
    Ok(mesh)
}

/// Creates a structured `ni x nj x nk` block of unit hexes at the origin.
pub fn create_hex_block(dims: [usize; 3]) -> MeshResult<Mesh> {
    let mut mesh = Mesh::new();
    mesh.add_structured_block(DVec3::ZERO, dims, DVec3::ONE)?;
    Ok(mesh)
}

/// Two unit hexes sharing the face at `x = 1`, 12 vertices in total.
///
/// Built element by element, so no structured block is recorded.
pub fn create_hex_pair() -> MeshResult<Mesh> {
    let mut mesh = Mesh::with_capacity(12, 2);
    let mut grid = Vec::with_capacity(12);
    for k in 0..2 {
        for j in 0..2 {
            for i in 0..3 {
                grid.push(mesh.add_vertex(DVec3::new(i as f64, j as f64, k as f64)));
            }
        }
    }
    let v = |i: usize, j: usize, k: usize| grid[i + 3 * j + 6 * k];
    for i in 0..2 {
        let connectivity = [
            v(i, 0, 0),
            v(i + 1, 0, 0),
            v(i + 1, 1, 0),
            v(i, 1, 0),
            v(i, 0, 1),
            v(i + 1, 0, 1),
            v(i + 1, 1, 1),
            v(i, 1, 1),
        ];
        mesh.add_element(ElementType::Hex, &connectivity)?;
    }
    Ok(mesh)
}

/// Two unit hexes touching at `x = 1` with their own copies of the shared
/// corners, 16 vertices in total. Shifting the copies by `gap` along x
/// yields near-coincident vertices.
pub fn create_split_hex_pair(gap: f64) -> MeshResult<Mesh> {
    let mut mesh = Mesh::with_capacity(16, 2);
    let left = add_box_corners(&mut mesh, DVec3::ZERO, DVec3::new(1.0, 1.0, 1.0));
    mesh.add_element(ElementType::Hex, &left)?;
    let right = add_box_corners(
        &mut mesh,
        DVec3::new(1.0 + gap, 0.0, 0.0),
        DVec3::new(2.0, 1.0, 1.0),
    );
    mesh.add_element(ElementType::Hex, &right)?;
    Ok(mesh)
}

/// A unit hex and a second hex wrapped around its edge `(1, 0, z)`,
/// sharing the two faces that meet there: 10 vertices and 2 hexes.
///
/// The two hexes are joined by two dual edges within one sheet. The second
/// hex is concave; only its connectivity matters.
pub fn create_hex_doublet() -> MeshResult<Mesh> {
    let mut mesh = Mesh::with_capacity(10, 2);
    let cube = add_box_corners(&mut mesh, DVec3::ZERO, DVec3::ONE);
    mesh.add_element(ElementType::Hex, &cube)?;
    let low = mesh.add_vertex(DVec3::new(2.0, 1.5, 0.0));
    let high = mesh.add_vertex(DVec3::new(2.0, 1.5, 1.0));
    let wrapped = [cube[0], low, cube[2], cube[1], cube[4], high, cube[6], cube[5]];
    mesh.add_element(ElementType::Hex, &wrapped)?;
    Ok(mesh)
}

/// A cube of edge `size` split into an inner cube of half the edge and six
/// shell hexes, one per outer face: 16 vertices and 7 hexes.
///
/// The sheet between the inner cube and the shell is a closed pillow.
pub fn create_pillowed_cube(size: f64) -> MeshResult<Mesh> {
    check_size(DVec3::splat(size))?;
    let mut mesh = Mesh::with_capacity(16, 7);
    let outer_half = DVec3::splat(size / 2.0);
    let inner_half = DVec3::splat(size / 4.0);
    let outer = add_box_corners(&mut mesh, -outer_half, outer_half);
    let inner = add_box_corners(&mut mesh, -inner_half, inner_half);
    mesh.add_element(ElementType::Hex, &inner)?;

    for face in crate::mesh::topology::HEX_FACES {
        let bottom = [inner[face[0]], inner[face[1]], inner[face[2]], inner[face[3]]];
        let top = [outer[face[0]], outer[face[1]], outer[face[2]], outer[face[3]]];
        add_hex_between(&mut mesh, bottom, top)?;
    }
    Ok(mesh)
}
