//! # Mesh Context
//!
//! Owns a mesh together with its dual and the per-sheet views derived from
//! it. The dual is built on first use; any topology change applied through
//! [`MeshContext::apply`] drops it along with every cached view.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::{DualComplex, SheetEntities, SheetGraph, SheetId};
use crate::error::MeshResult;
use crate::layout::{LaplacianLayout, PlanarLayoutEngine, SheetLayout};
use crate::mesh::{ElementId, Mesh};

/// A topology edit run against a context's mesh.
///
/// Returns the elements it created, removed or rewired. An empty list means
/// the topology is unchanged.
pub trait TopologyOperator {
    fn name(&self) -> &str;

    fn apply(&self, mesh: &mut Mesh, dual: Option<&DualComplex>) -> MeshResult<Vec<ElementId>>;
}

#[derive(Debug, Clone, Default)]
struct CachedSheet {
    entities: Option<SheetEntities>,
    graph: Option<SheetGraph>,
    layout: Option<SheetLayout>,
}

/// A mesh with its lazily built dual and sheet caches.
pub struct MeshContext {
    mesh: Mesh,
    dual: DualComplex,
    dual_valid: bool,
    cache: BTreeMap<SheetId, CachedSheet>,
    engine: Box<dyn PlanarLayoutEngine>,
}

impl std::fmt::Debug for MeshContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshContext")
            .field("vertices", &self.mesh.vertex_count())
            .field("elements", &self.mesh.element_count())
            .field("dual_valid", &self.dual_valid)
            .field("cached_sheets", &self.cached_sheet_count())
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl MeshContext {
    /// Wraps a mesh, laying sheets out with the default [`LaplacianLayout`].
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            dual: DualComplex::default(),
            dual_valid: false,
            cache: BTreeMap::new(),
            engine: Box::new(LaplacianLayout::default()),
        }
    }

    /// Replaces the layout engine. Cached layouts are dropped.
    #[must_use]
    pub fn with_engine(mut self, engine: Box<dyn PlanarLayoutEngine>) -> Self {
        self.engine = engine;
        for cached in self.cache.values_mut() {
            cached.layout = None;
        }
        self
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Number of sheets with at least one cached view.
    pub fn cached_sheet_count(&self) -> usize {
        self.cache.len()
    }

    /// Whether the dual is built and matches the mesh.
    pub fn has_dual(&self) -> bool {
        self.dual_valid
    }

    /// The dual of the mesh, built on demand.
    pub fn dual(&mut self) -> MeshResult<&DualComplex> {
        self.ensure_dual()?;
        Ok(&self.dual)
    }

    fn ensure_dual(&mut self) -> MeshResult<()> {
        if !self.dual_valid {
            self.dual.rebuild(&mut self.mesh)?;
            self.dual_valid = true;
            self.cache.clear();
        }
        Ok(())
    }

    pub fn sheet_entities(&mut self, sheet: SheetId) -> MeshResult<&SheetEntities> {
        self.ensure_dual()?;
        self.dual.sheet(sheet)?;
        let cached = self.cache.entry(sheet).or_default();
        if cached.entities.is_none() {
            cached.entities = Some(self.dual.get_dual_entities(sheet)?);
        }
        Ok(cached.entities.get_or_insert_with(SheetEntities::default))
    }

    pub fn sheet_graph(&mut self, sheet: SheetId) -> MeshResult<&SheetGraph> {
        self.ensure_dual()?;
        self.dual.sheet(sheet)?;
        let cached = self.cache.entry(sheet).or_default();
        let graph = match cached.graph.take() {
            Some(graph) => graph,
            None => SheetGraph::build(&self.dual, sheet)?,
        };
        Ok(cached.graph.insert(graph))
    }

    /// Planar layout of a sheet, computed once per dual build.
    pub fn layout(&mut self, sheet: SheetId) -> MeshResult<&SheetLayout> {
        self.ensure_dual()?;
        self.dual.sheet(sheet)?;
        let cached = self.cache.entry(sheet).or_default();
        if let Some(layout) = cached.layout.take() {
            return Ok(cached.layout.insert(layout));
        }
        let graph = match cached.graph.take() {
            Some(graph) => graph,
            None => SheetGraph::build(&self.dual, sheet)?,
        };
        let layout = self.engine.layout(&graph)?;
        debug!(sheet = sheet.0, engine = self.engine.name(), "laid out sheet");
        cached.graph = Some(graph);
        Ok(cached.layout.insert(layout))
    }

    /// Runs a topology operator and invalidates what it touched.
    pub fn apply(&mut self, op: &dyn TopologyOperator) -> MeshResult<Vec<ElementId>> {
        let dual = self.dual_valid.then_some(&self.dual);
        let touched = op.apply(&mut self.mesh, dual)?;
        info!(operator = op.name(), touched = touched.len(), "applied topology operator");
        self.invalidate(&touched);
        Ok(touched)
    }

    /// Drops the dual and every cached sheet view when `touched` is not
    /// empty.
    ///
    /// Sheet ids are renumbered by a rebuild, so no cached view survives a
    /// topology change even when its sheet was not touched.
    pub fn invalidate(&mut self, touched: &[ElementId]) {
        if touched.is_empty() {
            return;
        }
        self.dual_valid = false;
        self.dual.clear();
        self.cache.clear();
    }
}
