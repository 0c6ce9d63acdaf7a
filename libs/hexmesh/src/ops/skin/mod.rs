//! # Skinning
//!
//! Boundary extraction. The skin of a set of `d`-dimensional elements is
//! the set of `(d-1)`-dimensional sides used by exactly one of them. A side
//! used by two elements is interior; a side used by more than two is a
//! non-manifold configuration and is reported as an error.
//!
//! ## Strategies
//!
//! All strategies produce the same facets in the same order (input
//! position of the bounding element, then side index):
//!
//! - [`SkinStrategy::Hashed`]: count sides keyed by their sorted vertices
//! - [`SkinStrategy::Adjacency`]: ask the vertex adjacency for the
//!   neighbors sharing each side
//! - [`SkinStrategy::Structured`]: read the boundary off structured blocks,
//!   falling back to hashing for other selections
//!
//! ## Orientation
//!
//! A facet is written in the winding its element imposes, which points
//! out of the element. When the mesh already holds an element over the
//! same vertices, the facet references it and its sense says whether the
//! stored winding agrees (forward) or not (reverse).

mod adjacency;
mod hashed;
mod structured;


use std::collections::{BTreeSet, HashMap};

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::mesh::topology::{facet_key, relative_sense};
use crate::mesh::{Element, ElementId, ElementType, FacetKey, Mesh, Sense, VertexId};

/// How boundary facets are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinStrategy {
    #[default]
    Hashed,
    Adjacency,
    Structured,
}

/// Parameters for [`find_skin_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkinOptions {
    /// Report facets whose stored winding disagrees with their element
    /// separately instead of with the forward facets.
    pub want_reverse: bool,
    pub strategy: SkinStrategy,
    /// Create mesh elements for facets that do not exist yet.
    pub create_facets: bool,
}

impl SkinOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_reverse(mut self, want_reverse: bool) -> Self {
        self.want_reverse = want_reverse;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: SkinStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_create_facets(mut self, create_facets: bool) -> Self {
        self.create_facets = create_facets;
        self
    }
}

/// One boundary facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryFacet {
    pub kind: ElementType,
    /// Vertices in the winding imposed by `element`.
    pub vertices: SmallVec<[VertexId; 4]>,
    /// The single selected element using this facet.
    pub element: ElementId,
    /// Side index of the facet within `element`.
    pub side: usize,
    /// Orientation of `entity` relative to `element`.
    pub sense: Sense,
    /// Mesh element representing the facet, if one exists.
    pub entity: Option<ElementId>,
}

/// Result of a skinning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Skin {
    /// Dimension of the facets.
    pub dimension: usize,
    pub forward: Vec<BoundaryFacet>,
    pub reverse: Vec<BoundaryFacet>,
}

impl Skin {
    pub fn len(&self) -> usize {
        self.forward.len() + self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.reverse.is_empty()
    }

    /// Forward facets followed by reverse facets.
    pub fn facets(&self) -> impl Iterator<Item = &BoundaryFacet> {
        self.forward.iter().chain(self.reverse.iter())
    }

    /// Distinct skin vertices, sorted by handle.
    pub fn vertices(&self) -> Vec<VertexId> {
        skin_vertices(self.facets())
    }

    /// Mesh elements of the facets that have one.
    pub fn entities(&self, sense: Sense) -> Vec<ElementId> {
        let list = match sense {
            Sense::Forward => &self.forward,
            Sense::Reverse => &self.reverse,
        };
        list.iter().filter_map(|facet| facet.entity).collect()
    }

    /// Creates mesh elements for facets without one.
    ///
    /// Returns the number of elements created.
    pub fn materialize(&mut self, mesh: &mut Mesh) -> MeshResult<usize> {
        let mut created = 0;
        for facet in self.forward.iter_mut().chain(self.reverse.iter_mut()) {
            if facet.entity.is_none() {
                facet.entity = Some(mesh.add_element(facet.kind, &facet.vertices)?);
                created += 1;
            }
        }
        debug!(created, "materialized skin facets");
        Ok(created)
    }
}

/// Distinct vertices of a set of facets, sorted by handle.
pub fn skin_vertices<'a>(facets: impl IntoIterator<Item = &'a BoundaryFacet>) -> Vec<VertexId> {
    let vertices: BTreeSet<VertexId> = facets
        .into_iter()
        .flat_map(|facet| facet.vertices.iter().copied())
        .collect();
    vertices.into_iter().collect()
}

/// A side used by exactly one selected element, before orientation.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub position: usize,
    pub element: ElementId,
    pub side: usize,
    pub kind: ElementType,
    pub vertices: SmallVec<[VertexId; 4]>,
}

/// The selected elements of the working dimension, deduplicated, in input
/// order.
pub(crate) struct Selection<'a> {
    pub dimension: usize,
    pub elements: Vec<(ElementId, &'a Element)>,
}

impl<'a> Selection<'a> {
    fn new(mesh: &'a Mesh, elements: &[ElementId]) -> MeshResult<Option<Self>> {
        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(elements.len());
        for &id in elements {
            let element = mesh.element(id)?;
            if seen.insert(id) {
                resolved.push((id, element));
            }
        }
        let Some(dimension) = resolved.iter().map(|(_, e)| e.dimension()).max() else {
            return Ok(None);
        };
        if dimension < 2 {
            return Err(MeshError::unsupported(format!(
                "cannot skin elements of dimension {}",
                dimension
            )));
        }
        resolved.retain(|(_, e)| e.dimension() == dimension);
        Ok(Some(Self {
            dimension,
            elements: resolved,
        }))
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(|(id, _)| *id)
    }
}

pub(crate) fn non_manifold(key: &FacetKey, count: usize) -> MeshError {
    MeshError::NonManifoldFacet {
        vertices: key.to_vec(),
        count,
    }
}

/// Finds the skin of `elements` with the default strategy.
pub fn find_skin(mesh: &mut Mesh, elements: &[ElementId], want_reverse: bool) -> MeshResult<Skin> {
    find_skin_with(mesh, elements, &SkinOptions::new().with_reverse(want_reverse))
}

/// Finds the skin of `elements`.
///
/// The working dimension is the highest dimension among `elements`; lower
/// dimensional elements in the selection are ignored.
pub fn find_skin_with(
    mesh: &mut Mesh,
    elements: &[ElementId],
    options: &SkinOptions,
) -> MeshResult<Skin> {
    if options.strategy == SkinStrategy::Adjacency {
        mesh.vertex_adjacency();
    }
    let (dimension, candidates) = {
        let Some(selection) = Selection::new(mesh, elements)? else {
            return Ok(Skin::default());
        };
        let candidates = match options.strategy {
            SkinStrategy::Hashed => hashed::boundary(&selection)?,
            SkinStrategy::Adjacency => adjacency::boundary(mesh, &selection)?,
            SkinStrategy::Structured => match structured::boundary(mesh, &selection) {
                Some(candidates) => candidates,
                None => {
                    warn!("selection is not made of whole structured blocks, hashing instead");
                    hashed::boundary(&selection)?
                }
            },
        };
        (selection.dimension, candidates)
    };
    debug!(
        strategy = ?options.strategy,
        candidates = candidates.len(),
        "found boundary sides"
    );
    let skin = orient(mesh, dimension - 1, candidates, options)?;
    info!(
        forward = skin.forward.len(),
        reverse = skin.reverse.len(),
        "skinned {} elements",
        elements.len()
    );
    Ok(skin)
}

/// Resolves existing facet elements and sorts facets by sense.
fn orient(
    mesh: &mut Mesh,
    dimension: usize,
    candidates: Vec<Candidate>,
    options: &SkinOptions,
) -> MeshResult<Skin> {
    let existing: HashMap<FacetKey, ElementId> = mesh
        .elements()
        .filter(|(_, e)| e.dimension() == dimension)
        .map(|(id, e)| (facet_key(e.connectivity()), id))
        .collect();

    let mut skin = Skin {
        dimension,
        ..Skin::default()
    };
    for candidate in candidates {
        let (entity, sense) = match existing.get(&facet_key(&candidate.vertices)) {
            Some(&entity) => {
                let stored = mesh.element(entity)?.connectivity();
                let sense = relative_sense(&candidate.vertices, stored).unwrap_or_else(|| {
                    warn!(
                        ?entity,
                        "facet element winds its vertices differently, assuming forward"
                    );
                    Sense::Forward
                });
                (Some(entity), sense)
            }
            None if options.create_facets => {
                (Some(mesh.add_element(candidate.kind, &candidate.vertices)?), Sense::Forward)
            }
            None => (None, Sense::Forward),
        };
        let facet = BoundaryFacet {
            kind: candidate.kind,
            vertices: candidate.vertices,
            element: candidate.element,
            side: candidate.side,
            sense,
            entity,
        };
        if sense == Sense::Reverse && options.want_reverse {
            skin.reverse.push(facet);
        } else {
            skin.forward.push(facet);
        }
    }
    Ok(skin)
}
