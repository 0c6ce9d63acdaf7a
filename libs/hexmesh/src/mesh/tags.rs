//! # Integer Tags
//!
//! Named integer values attached to vertices and elements. Tags are the
//! only data other tools exchange with this crate besides geometry, so
//! iteration order is kept deterministic (`BTreeMap`).

use std::collections::BTreeMap;

use crate::mesh::{ElementId, VertexId};

/// A single named tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tag {
    /// Value reported for entities without an explicit value.
    pub default: Option<i64>,
    vertices: BTreeMap<VertexId, i64>,
    elements: BTreeMap<ElementId, i64>,
}

impl Tag {
    pub fn vertex_values(&self) -> impl Iterator<Item = (VertexId, i64)> + '_ {
        self.vertices.iter().map(|(k, v)| (*k, *v))
    }

    pub fn element_values(&self) -> impl Iterator<Item = (ElementId, i64)> + '_ {
        self.elements.iter().map(|(k, v)| (*k, *v))
    }
}

/// Collection of named tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagStore {
    tags: BTreeMap<String, Tag>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the tag if missing and updates its default value.
    pub fn create(&mut self, name: &str, default: Option<i64>) -> &mut Tag {
        let tag = self.tags.entry(name.to_string()).or_default();
        tag.default = default;
        tag
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// Removes a tag with all its values.
    pub fn delete(&mut self, name: &str) -> Option<Tag> {
        self.tags.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn set_vertex(&mut self, name: &str, vertex: VertexId, value: i64) {
        self.tags
            .entry(name.to_string())
            .or_default()
            .vertices
            .insert(vertex, value);
    }

    pub fn set_element(&mut self, name: &str, element: ElementId, value: i64) {
        self.tags
            .entry(name.to_string())
            .or_default()
            .elements
            .insert(element, value);
    }

    /// Explicit value, falling back to the tag default.
    pub fn vertex_value(&self, name: &str, vertex: VertexId) -> Option<i64> {
        let tag = self.tags.get(name)?;
        tag.vertices.get(&vertex).copied().or(tag.default)
    }

    pub fn element_value(&self, name: &str, element: ElementId) -> Option<i64> {
        let tag = self.tags.get(name)?;
        tag.elements.get(&element).copied().or(tag.default)
    }

    /// Drops every value attached to a deleted vertex.
    pub(crate) fn forget_vertex(&mut self, vertex: VertexId) {
        for tag in self.tags.values_mut() {
            tag.vertices.remove(&vertex);
        }
    }

    pub(crate) fn forget_element(&mut self, element: ElementId) {
        for tag in self.tags.values_mut() {
            tag.elements.remove(&element);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.tags.iter().map(|(name, tag)| (name.as_str(), tag))
    }
}
