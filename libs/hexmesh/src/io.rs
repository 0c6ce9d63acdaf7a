//! # Mesh Files
//!
//! Native JSON mesh format. Handles are written as dense indices in
//! handle order, so a mesh written after deletions loads back compacted.
//!
//! ```json
//! {
//!   "vertices": [[0.0, 0.0, 0.0], ...],
//!   "elements": [{ "type": "hex", "connectivity": [0, 1, 2, 3, 4, 5, 6, 7] }],
//!   "sets": [{ "kind": "material", "id": 1, "elements": [0] }],
//!   "tags": [{ "name": "fixed", "default": 0, "vertices": [[3, 1]] }],
//!   "blocks": [{ "dims": [1, 1, 1], "vertices": [0, 1, ...], "elements": [0] }]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{ElementId, ElementType, Mesh, SetKind, StructuredBlock, VertexId};

/// On-disk representation of a [`Mesh`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDocument {
    pub vertices: Vec<[f64; 3]>,
    #[serde(default)]
    pub elements: Vec<ElementRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<SetRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub connectivity: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRecord {
    pub kind: SetKind,
    pub id: i32,
    pub elements: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sense: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub name: String,
    #[serde(default)]
    pub default: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<(usize, i64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<(usize, i64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub dims: [usize; 3],
    pub vertices: Vec<usize>,
    pub elements: Vec<usize>,
}

fn lookup<T: Copy>(handles: &[T], index: usize, what: &str) -> MeshResult<T> {
    handles.get(index).copied().ok_or_else(|| {
        MeshError::invalid_connectivity(format!(
            "{} index {} out of range ({} defined)",
            what,
            index,
            handles.len()
        ))
    })
}

impl MeshDocument {
    /// Snapshot of a mesh with dense indices.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut vertex_index: HashMap<VertexId, usize> = HashMap::new();
        let mut element_index: HashMap<ElementId, usize> = HashMap::new();

        let vertices = mesh
            .vertices()
            .enumerate()
            .map(|(i, (id, vertex))| {
                vertex_index.insert(id, i);
                vertex.position.to_array()
            })
            .collect();

        let elements = mesh
            .elements()
            .enumerate()
            .map(|(i, (id, element))| {
                element_index.insert(id, i);
                ElementRecord {
                    kind: element.kind(),
                    connectivity: element
                        .connectivity()
                        .iter()
                        .filter_map(|v| vertex_index.get(v).copied())
                        .collect(),
                }
            })
            .collect();

        let sets = mesh
            .sets()
            .iter()
            .map(|set| SetRecord {
                kind: set.kind,
                id: set.id,
                elements: set
                    .elements
                    .iter()
                    .filter_map(|e| element_index.get(e).copied())
                    .collect(),
                sense: set.sense,
            })
            .collect();

        let tags = mesh
            .tags()
            .iter()
            .map(|(name, tag)| TagRecord {
                name: name.to_string(),
                default: tag.default,
                vertices: tag
                    .vertex_values()
                    .filter_map(|(v, value)| vertex_index.get(&v).map(|i| (*i, value)))
                    .collect(),
                elements: tag
                    .element_values()
                    .filter_map(|(e, value)| element_index.get(&e).map(|i| (*i, value)))
                    .collect(),
            })
            .collect();

        let blocks = mesh
            .structured_blocks()
            .iter()
            .map(|block| BlockRecord {
                dims: block.dims(),
                vertices: block
                    .vertices()
                    .iter()
                    .filter_map(|v| vertex_index.get(v).copied())
                    .collect(),
                elements: block
                    .elements()
                    .iter()
                    .filter_map(|e| element_index.get(e).copied())
                    .collect(),
            })
            .collect();

        Self {
            vertices,
            elements,
            sets,
            tags,
            blocks,
        }
    }

    /// Builds a mesh, checking every index.
    pub fn into_mesh(self) -> MeshResult<Mesh> {
        let mut mesh = Mesh::with_capacity(self.vertices.len(), self.elements.len());
        let vertices: Vec<VertexId> = self
            .vertices
            .iter()
            .map(|p| mesh.add_vertex((*p).into()))
            .collect();

        let mut elements = Vec::with_capacity(self.elements.len());
        for record in &self.elements {
            let connectivity = record
                .connectivity
                .iter()
                .map(|&i| lookup(&vertices, i, "vertex"))
                .collect::<MeshResult<Vec<_>>>()?;
            elements.push(mesh.add_element(record.kind, &connectivity)?);
        }

        for record in self.sets {
            let members = record
                .elements
                .iter()
                .map(|&i| lookup(&elements, i, "element"))
                .collect::<MeshResult<Vec<_>>>()?;
            let index = mesh.add_set(record.kind, record.id, members)?;
            mesh.sets_mut()[index].sense = record.sense;
        }

        for record in self.tags {
            mesh.tags_mut().create(&record.name, record.default);
            for (i, value) in record.vertices {
                let vertex = lookup(&vertices, i, "vertex")?;
                mesh.tags_mut().set_vertex(&record.name, vertex, value);
            }
            for (i, value) in record.elements {
                let element = lookup(&elements, i, "element")?;
                mesh.tags_mut().set_element(&record.name, element, value);
            }
        }

        for record in self.blocks {
            let block_vertices = record
                .vertices
                .iter()
                .map(|&i| lookup(&vertices, i, "vertex"))
                .collect::<MeshResult<Vec<_>>>()?;
            let block_elements = record
                .elements
                .iter()
                .map(|&i| lookup(&elements, i, "element"))
                .collect::<MeshResult<Vec<_>>>()?;
            let block = StructuredBlock::from_parts(record.dims, block_vertices, block_elements)?;
            mesh.register_structured_block(block)?;
        }

        Ok(mesh)
    }
}

/// Parses a mesh from a JSON string.
pub fn from_json_str(source: &str) -> MeshResult<Mesh> {
    let document: MeshDocument = serde_json::from_str(source).map_err(|source| MeshError::Parse {
        path: PathBuf::from("<string>"),
        source,
    })?;
    document.into_mesh()
}

/// Serializes a mesh to pretty-printed JSON.
pub fn to_json_string(mesh: &Mesh) -> MeshResult<String> {
    serde_json::to_string_pretty(&MeshDocument::from_mesh(mesh)).map_err(|source| MeshError::Parse {
        path: PathBuf::from("<string>"),
        source,
    })
}

/// Reads a mesh file.
pub fn load_mesh(path: impl AsRef<Path>) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document: MeshDocument = serde_json::from_str(&text).map_err(|source| MeshError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = document.into_mesh()?;
    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        elements = mesh.element_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Writes a mesh file, replacing any existing file.
pub fn write_mesh(mesh: &Mesh, path: impl AsRef<Path>) -> MeshResult<()> {
    let path = path.as_ref();
    let document = MeshDocument::from_mesh(mesh);
    let text = serde_json::to_string_pretty(&document).map_err(|source| MeshError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "wrote mesh");
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let mesh = from_json_str(
            r#"{
                "vertices": [[0,0,0],[1,0,0],[0,1,0]],
                "elements": [{"type": "tri", "connectivity": [0,1,2]}]
            }"#,
        )
        .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.elements_of_type(ElementType::Tri).len(), 1);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let result = from_json_str(
            r#"{"vertices": [[0,0,0]], "elements": [{"type": "edge", "connectivity": [0, 5]}]}"#,
        );
        assert!(matches!(result, Err(MeshError::InvalidConnectivity { .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(from_json_str("{ not json"), Err(MeshError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_mesh("/nonexistent/dir/mesh.json");
        assert!(matches!(result, Err(MeshError::Io { .. })));
    }

    #[test]
    fn test_document_keeps_sets_tags_and_blocks() {
        let mut mesh = Mesh::new();
        mesh.add_structured_block(DVec3::ZERO, [2, 1, 1], DVec3::ONE).unwrap();
        let hexes = mesh.element_ids();
        mesh.add_set(SetKind::Material, 3, hexes.clone()).unwrap();
        mesh.add_reversed_set(SetKind::Neumann, 4, hexes[..1].to_vec()).unwrap();
        mesh.tags_mut().create("fixed", Some(0));
        let first = mesh.vertex_ids()[0];
        mesh.tags_mut().set_vertex("fixed", first, 1);

        let text = to_json_string(&mesh).unwrap();
        let loaded = from_json_str(&text).unwrap();

        assert_eq!(loaded.vertex_count(), 12);
        assert_eq!(loaded.element_count(), 2);
        assert_eq!(loaded.set(SetKind::Material, 3).unwrap().elements.len(), 2);
        assert_eq!(loaded.set(SetKind::Neumann, 4).unwrap().sense, Some(-1));
        let loaded_first = loaded.vertex_ids()[0];
        assert_eq!(loaded.tags().vertex_value("fixed", loaded_first), Some(1));
        assert_eq!(loaded.structured_blocks().len(), 1);
        assert_eq!(loaded.structured_blocks()[0].dims(), [2, 1, 1]);
    }

    #[test]
    fn test_block_out_of_lattice_order_is_rejected() {
        let mesh = crate::primitives::create_hex_block([2, 1, 1]).unwrap();
        let mut document = MeshDocument::from_mesh(&mesh);
        assert_eq!(document.blocks.len(), 1);
        document.blocks[0].elements.reverse();
        assert!(matches!(
            document.into_mesh(),
            Err(MeshError::InvalidConnectivity { .. })
        ));
    }
}
