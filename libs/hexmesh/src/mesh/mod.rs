//! # Mesh Data Structure
//!
//! Unstructured mesh with versioned slot map vertex and element handles,
//! entity sets (blocks and sidesets), integer tags, and a lazily built
//! vertex-to-element adjacency.

pub mod adjacency;
pub mod structured;
pub mod tags;
pub mod topology;

#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap};

use config::constants::{MATERIAL_SET_TAG_NAME, NEUMANN_SET_TAG_NAME};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::error::{MeshError, MeshResult};
use crate::handle::{lookup, lookup_mut, take, Handle};

pub use adjacency::VertexAdjacency;
pub use structured::StructuredBlock;
pub use tags::{Tag, TagStore};
pub use topology::{ElementType, FacetKey, Sense, Side};

new_key_type! {
    /// Handle of a mesh vertex.
    pub struct VertexId;

    /// Handle of a mesh element.
    pub struct ElementId;
}

impl Handle for VertexId {
    const KIND: &'static str = "vertex";
}

impl Handle for ElementId {
    const KIND: &'static str = "element";
}

/// A mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: DVec3,
}

/// A mesh element: a type and an ordered list of vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    kind: ElementType,
    connectivity: SmallVec<[VertexId; 8]>,
}

impl Element {
    #[inline]
    pub fn kind(&self) -> ElementType {
        self.kind
    }

    #[inline]
    pub fn connectivity(&self) -> &[VertexId] {
        &self.connectivity
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.connectivity.contains(&vertex)
    }

    /// Canonical sides of dimension `dim` with their vertex handles.
    pub fn side_vertices(&self, dim: usize) -> MeshResult<Vec<(Side, SmallVec<[VertexId; 4]>)>> {
        let sides = self.kind.sides(dim, self.connectivity.len())?;
        Ok(sides
            .into_iter()
            .map(|side| {
                let vertices = side.vertices(&self.connectivity);
                (side, vertices)
            })
            .collect())
    }

    /// Returns true if a vertex appears more than once.
    pub fn is_degenerate(&self) -> bool {
        let distinct: BTreeSet<_> = self.connectivity.iter().collect();
        distinct.len() != self.connectivity.len()
    }
}

/// Kind of an entity set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    /// Material set (block).
    Material,
    /// Neumann set (sideset).
    Neumann,
}

impl SetKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Material => "material",
            Self::Neumann => "neumann",
        }
    }

    /// Tag other tools use to recognize this kind of set.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Material => MATERIAL_SET_TAG_NAME,
            Self::Neumann => NEUMANN_SET_TAG_NAME,
        }
    }
}

/// A group of elements identified by kind and integer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySet {
    pub kind: SetKind,
    pub id: i32,
    pub elements: Vec<ElementId>,
    /// Orientation of the set's facets, `Some(-1)` for reversed sidesets.
    pub sense: Option<i32>,
}

/// An unstructured mesh.
///
/// # Example
///
/// ```rust
/// use hexmesh::mesh::{ElementType, Mesh};
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// let a = mesh.add_vertex(DVec3::ZERO);
/// let b = mesh.add_vertex(DVec3::X);
/// let c = mesh.add_vertex(DVec3::Y);
/// mesh.add_element(ElementType::Tri, &[a, b, c]).unwrap();
/// assert_eq!(mesh.element_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: SlotMap<VertexId, Vertex>,
    elements: SlotMap<ElementId, Element>,
    sets: Vec<EntitySet>,
    tags: TagStore,
    blocks: Vec<StructuredBlock>,
    adjacency: Option<VertexAdjacency>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, element_count: usize) -> Self {
        Self {
            vertices: SlotMap::with_capacity_and_key(vertex_count),
            elements: SlotMap::with_capacity_and_key(element_count),
            ..Self::default()
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a vertex and returns its handle.
    pub fn add_vertex(&mut self, position: DVec3) -> VertexId {
        self.vertices.insert(Vertex { position })
    }

    /// Adds an element after checking its connectivity.
    pub fn add_element(
        &mut self,
        kind: ElementType,
        vertices: &[VertexId],
    ) -> MeshResult<ElementId> {
        if !kind.accepts(vertices.len()) {
            return Err(MeshError::invalid_connectivity(format!(
                "{} cannot have {} vertices",
                kind.name(),
                vertices.len()
            )));
        }
        for &vertex in vertices {
            lookup(&self.vertices, vertex)?;
        }
        let element = Element {
            kind,
            connectivity: SmallVec::from_slice(vertices),
        };
        if element.is_degenerate() {
            return Err(MeshError::invalid_connectivity(format!(
                "{} repeats a vertex: {:?}",
                kind.name(),
                vertices
            )));
        }
        let id = self.elements.insert(element);
        if let Some(adjacency) = &mut self.adjacency {
            adjacency.insert(id, vertices);
        }
        Ok(id)
    }

    pub fn vertex(&self, id: VertexId) -> MeshResult<&Vertex> {
        lookup(&self.vertices, id)
    }

    pub fn position(&self, id: VertexId) -> MeshResult<DVec3> {
        Ok(lookup(&self.vertices, id)?.position)
    }

    pub fn element(&self, id: ElementId) -> MeshResult<&Element> {
        lookup(&self.elements, id)
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Live vertices in handle order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Live elements in handle order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.elements.iter()
    }

    pub fn vertex_ids(&self) -> Vec<VertexId> {
        self.vertices.keys().collect()
    }

    pub fn element_ids(&self) -> Vec<ElementId> {
        self.elements.keys().collect()
    }

    pub fn elements_of_dimension(&self, dim: usize) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, element)| element.dimension() == dim)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn elements_of_type(&self, kind: ElementType) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|(_, element)| element.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Highest element dimension present, `None` for a mesh without elements.
    pub fn max_dimension(&self) -> Option<usize> {
        self.elements.iter().map(|(_, e)| e.dimension()).max()
    }

    /// Vertex positions of an element in connectivity order.
    pub fn element_positions(&self, id: ElementId) -> MeshResult<SmallVec<[DVec3; 8]>> {
        self.element(id)?
            .connectivity()
            .iter()
            .map(|&v| self.position(v))
            .collect()
    }

    /// Average of an element's vertex positions.
    pub fn centroid(&self, id: ElementId) -> MeshResult<DVec3> {
        let positions = self.element_positions(id)?;
        let sum: DVec3 = positions.iter().copied().sum();
        Ok(sum / positions.len() as f64)
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let mut positions = self.vertices.iter().map(|(_, v)| v.position);
        let Some(first) = positions.next() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };
        positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)))
    }

    /// Removes an element and every reference to it.
    pub fn remove_element(&mut self, id: ElementId) -> MeshResult<Element> {
        let element = take(&mut self.elements, id)?;
        if let Some(adjacency) = &mut self.adjacency {
            adjacency.remove(id, element.connectivity());
        }
        for set in &mut self.sets {
            set.elements.retain(|e| *e != id);
        }
        self.tags.forget_element(id);
        self.blocks.retain(|block| !block.elements().contains(&id));
        Ok(element)
    }

    /// Removes a vertex no element refers to any more.
    pub fn remove_vertex(&mut self, id: VertexId) -> MeshResult<Vertex> {
        lookup(&self.vertices, id)?;
        let referenced = match &self.adjacency {
            Some(adjacency) => !adjacency.elements_of(id).is_empty(),
            None => self.elements.iter().any(|(_, e)| e.contains(id)),
        };
        if referenced {
            return Err(MeshError::invalid_connectivity(format!(
                "{:?} is still referenced by an element",
                id
            )));
        }
        let vertex = take(&mut self.vertices, id)?;
        if let Some(adjacency) = &mut self.adjacency {
            adjacency.forget(id);
        }
        self.tags.forget_vertex(id);
        self.blocks.retain(|block| !block.vertices().contains(&id));
        Ok(vertex)
    }

    /// Redirects every element referencing `old` to `new`.
    ///
    /// Returns the elements whose connectivity changed.
    pub fn replace_vertex(&mut self, old: VertexId, new: VertexId) -> MeshResult<Vec<ElementId>> {
        lookup(&self.vertices, old)?;
        lookup(&self.vertices, new)?;
        let affected = self.vertex_adjacency().elements_of(old).to_vec();
        for &id in &affected {
            let element = lookup_mut(&mut self.elements, id)?;
            for vertex in element.connectivity.iter_mut() {
                if *vertex == old {
                    *vertex = new;
                }
            }
            if let Some(adjacency) = &mut self.adjacency {
                adjacency.replace(id, old, new);
            }
        }
        if !affected.is_empty() {
            self.blocks.retain(|block| !block.vertices().contains(&old));
        }
        Ok(affected)
    }

    // =========================================================================
    // SETS
    // =========================================================================

    /// Adds an entity set after checking its elements exist.
    pub fn add_set(
        &mut self,
        kind: SetKind,
        id: i32,
        elements: Vec<ElementId>,
    ) -> MeshResult<usize> {
        for &element in &elements {
            lookup(&self.elements, element)?;
        }
        self.sets.push(EntitySet {
            kind,
            id,
            elements,
            sense: None,
        });
        Ok(self.sets.len() - 1)
    }

    /// Adds a sideset whose facets are oriented against their elements.
    pub fn add_reversed_set(
        &mut self,
        kind: SetKind,
        id: i32,
        elements: Vec<ElementId>,
    ) -> MeshResult<usize> {
        let index = self.add_set(kind, id, elements)?;
        self.sets[index].sense = Some(Sense::Reverse.value());
        Ok(index)
    }

    pub fn sets(&self) -> &[EntitySet] {
        &self.sets
    }

    /// First set of the given kind and id.
    pub fn set(&self, kind: SetKind, id: i32) -> MeshResult<&EntitySet> {
        self.sets
            .iter()
            .find(|s| s.kind == kind && s.id == id)
            .ok_or(MeshError::UnknownSet {
                kind: kind.name(),
                id,
            })
    }

    pub(crate) fn sets_mut(&mut self) -> &mut [EntitySet] {
        &mut self.sets
    }

    /// Union of the elements of all sets with the given ids, in first-seen order.
    pub fn set_elements(&self, kind: SetKind, ids: &[i32]) -> MeshResult<Vec<ElementId>> {
        let mut seen = BTreeSet::new();
        let mut elements = Vec::new();
        for &id in ids {
            self.set(kind, id)?;
            for set in self.sets.iter().filter(|s| s.kind == kind && s.id == id) {
                for &element in &set.elements {
                    if seen.insert(element) {
                        elements.push(element);
                    }
                }
            }
        }
        Ok(elements)
    }

    // =========================================================================
    // TAGS
    // =========================================================================

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagStore {
        &mut self.tags
    }

    // =========================================================================
    // SUB-MESH EXTRACTION
    // =========================================================================

    /// Copies the given elements and the vertices they use into a new mesh.
    ///
    /// Sets are restricted to the copied elements and dropped when empty.
    /// Tags follow their vertices and elements.
    pub fn extract(&self, elements: &[ElementId]) -> MeshResult<Mesh> {
        let mut out = Mesh::with_capacity(elements.len() * 4, elements.len());
        let mut vertex_map: HashMap<VertexId, VertexId> = HashMap::new();
        let mut element_map: HashMap<ElementId, ElementId> = HashMap::new();

        for &id in elements {
            if element_map.contains_key(&id) {
                continue;
            }
            let element = self.element(id)?;
            let mut connectivity: SmallVec<[VertexId; 8]> = SmallVec::new();
            for &vertex in element.connectivity() {
                let mapped = match vertex_map.get(&vertex) {
                    Some(mapped) => *mapped,
                    None => {
                        let mapped = out.add_vertex(self.position(vertex)?);
                        vertex_map.insert(vertex, mapped);
                        mapped
                    }
                };
                connectivity.push(mapped);
            }
            let new_id = out.add_element(element.kind(), &connectivity)?;
            element_map.insert(id, new_id);
        }

        for set in &self.sets {
            let members: Vec<ElementId> = set
                .elements
                .iter()
                .filter_map(|e| element_map.get(e).copied())
                .collect();
            if !members.is_empty() {
                out.sets.push(EntitySet {
                    kind: set.kind,
                    id: set.id,
                    elements: members,
                    sense: set.sense,
                });
            }
        }

        for (name, tag) in self.tags.iter() {
            out.tags.create(name, tag.default);
            for (vertex, value) in tag.vertex_values() {
                if let Some(mapped) = vertex_map.get(&vertex) {
                    out.tags.set_vertex(name, *mapped, value);
                }
            }
            for (element, value) in tag.element_values() {
                if let Some(mapped) = element_map.get(&element) {
                    out.tags.set_element(name, *mapped, value);
                }
            }
        }

        Ok(out)
    }

    /// Checks that every element refers to live, distinct vertices.
    pub fn validate(&self) -> MeshResult<()> {
        for (id, element) in self.elements.iter() {
            if !element.kind().accepts(element.connectivity().len()) {
                return Err(MeshError::invalid_connectivity(format!(
                    "{:?} is a {} with {} vertices",
                    id,
                    element.kind().name(),
                    element.connectivity().len()
                )));
            }
            for &vertex in element.connectivity() {
                lookup(&self.vertices, vertex)?;
            }
            if element.is_degenerate() {
                return Err(MeshError::invalid_connectivity(format!(
                    "{:?} repeats a vertex",
                    id
                )));
            }
        }
        Ok(())
    }
}
