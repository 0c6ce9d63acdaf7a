//! Dual tags written onto primal elements.
//!
//! | tag              | on              | value                        |
//! |------------------|-----------------|------------------------------|
//! | `__DUAL_ENTITY`  | hex, quad, edge | packed dual vertex/edge/face |
//! | `DUAL_SURFACE`   | edge            | sheet index                  |
//! | `DUAL_CURVE`     | quad            | chord index                  |

use config::constants::{DUAL_CURVE_TAG_NAME, DUAL_ENTITY_TAG_NAME, DUAL_SURFACE_TAG_NAME};
use tracing::debug;

use super::{DualComplex, DualEdgeId, DualEntity, DualFaceId, DualVertexId};
use crate::handle::Handle;
use crate::error::MeshResult;
use crate::mesh::{ElementId, ElementType, Mesh};

impl DualComplex {
    /// Replaces the dual tags of `mesh` with this complex's mapping.
    ///
    /// Hexes map to their dual vertex, quads to their dual edge and edges
    /// to their dual face. Boundary quads keep the edge; their dual vertex
    /// is reachable through [`DualComplex::dual_of`].
    pub fn persist_tags(&self, mesh: &mut Mesh) -> MeshResult<()> {
        let tags = mesh.tags_mut();
        tags.delete(DUAL_ENTITY_TAG_NAME);
        tags.delete(DUAL_SURFACE_TAG_NAME);
        tags.delete(DUAL_CURVE_TAG_NAME);
        tags.create(DUAL_ENTITY_TAG_NAME, None);
        tags.create(DUAL_SURFACE_TAG_NAME, None);
        tags.create(DUAL_CURVE_TAG_NAME, None);

        let mut written = 0;
        for (&primal, record) in &self.records {
            let kind = mesh.element(primal)?.kind();
            let packed = match kind {
                ElementType::Hex => record.vertex.map(|v| v.to_tag()),
                ElementType::Quad => record.edge.map(|e| e.to_tag()),
                ElementType::Edge => record.face.map(|f| f.to_tag()),
                _ => None,
            };
            if let Some(value) = packed {
                mesh.tags_mut().set_element(DUAL_ENTITY_TAG_NAME, primal, value);
                written += 1;
            }
            if let Some(face) = record.face {
                let sheet = self.face(face)?.sheet;
                mesh.tags_mut()
                    .set_element(DUAL_SURFACE_TAG_NAME, primal, i64::from(sheet.0));
            }
            if let Some(edge) = record.edge {
                if let Some(chord) = self.edge(edge)?.chord {
                    mesh.tags_mut()
                        .set_element(DUAL_CURVE_TAG_NAME, primal, i64::from(chord.0));
                }
            }
        }
        debug!(written, "persisted dual tags");
        Ok(())
    }

    /// Decodes the `__DUAL_ENTITY` tag of a primal element.
    ///
    /// Fails with a stale handle error when the tag was written by an
    /// earlier build of the complex.
    pub fn tagged_entity(&self, mesh: &Mesh, primal: ElementId) -> MeshResult<Option<DualEntity>> {
        let Some(value) = mesh.tags().element_value(DUAL_ENTITY_TAG_NAME, primal) else {
            return Ok(None);
        };
        Ok(match mesh.element(primal)?.kind() {
            ElementType::Hex => {
                let id = DualVertexId::from_tag(value);
                self.vertex(id)?;
                Some(DualEntity::Vertex(id))
            }
            ElementType::Quad => {
                let id = DualEdgeId::from_tag(value);
                self.edge(id)?;
                Some(DualEntity::Edge(id))
            }
            ElementType::Edge => {
                let id = DualFaceId::from_tag(value);
                self.face(id)?;
                Some(DualEntity::Face(id))
            }
            _ => None,
        })
    }
}
