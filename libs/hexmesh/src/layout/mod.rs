//! # Sheet Layout
//!
//! Planar drawings of dual sheets. The boundary of the drawing is fixed
//! first (loop vertices on circles, or chord anchors for closed sheets),
//! then every other node is relaxed towards the average of its neighbors.
//!
//! ## Example
//!
//! ```rust
//! use hexmesh::dual::{DualComplex, SheetGraph};
//! use hexmesh::layout::{LaplacianLayout, PlanarLayoutEngine};
//! use hexmesh::primitives::create_hex_block;
//!
//! let mut mesh = create_hex_block([2, 1, 1]).unwrap();
//! let dual = DualComplex::build(&mut mesh).unwrap();
//! let sheet = dual.sheets().next().unwrap();
//! let graph = SheetGraph::build(&dual, sheet).unwrap();
//! let layout = LaplacianLayout::default().layout(&graph).unwrap();
//! assert_eq!(layout.positions.len(), graph.node_count());
//! ```

mod fixed;
mod smooth;


use std::collections::{BTreeMap, BTreeSet};

use config::constants::{DEFAULT_LAYOUT_RADIUS, SMOOTHING_ITERATIONS};
use glam::DVec2;
use tracing::debug;

use crate::dual::{DualVertexId, SheetGraph};
use crate::error::{MeshError, MeshResult};

/// Computes 2D positions for the nodes of a sheet graph.
pub trait PlanarLayoutEngine: Send + Sync {
    fn name(&self) -> &str;

    fn layout(&self, graph: &SheetGraph) -> MeshResult<SheetLayout>;
}

/// Planar positions of a sheet's nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetLayout {
    pub positions: BTreeMap<DualVertexId, DVec2>,
    /// Nodes placed before smoothing.
    pub fixed: BTreeSet<DualVertexId>,
}

impl SheetLayout {
    pub fn position(&self, node: DualVertexId) -> Option<DVec2> {
        self.positions.get(&node).copied()
    }

    pub fn is_fixed(&self, node: DualVertexId) -> bool {
        self.fixed.contains(&node)
    }

    fn fix(&mut self, node: DualVertexId, position: DVec2) {
        self.positions.insert(node, position);
        self.fixed.insert(node);
    }
}

/// Neighbor weighting of the smoothing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutWeighting {
    /// Plain average of the neighbors.
    #[default]
    Uniform,
    /// Neighbors weighted by the inverse of their current distance.
    InverseLength,
}

/// Parameters of [`LaplacianLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Radius of the outer loop circle.
    pub radius: f64,
    pub iterations: usize,
    pub weighting: LayoutWeighting,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_LAYOUT_RADIUS,
            iterations: SMOOTHING_ITERATIONS,
            weighting: LayoutWeighting::Uniform,
        }
    }
}

impl LayoutParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_weighting(mut self, weighting: LayoutWeighting) -> Self {
        self.weighting = weighting;
        self
    }
}

/// Fixed boundary plus Jacobi smoothing of the interior.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaplacianLayout {
    pub params: LayoutParams,
}

impl LaplacianLayout {
    pub fn new(params: LayoutParams) -> Self {
        Self { params }
    }
}

impl PlanarLayoutEngine for LaplacianLayout {
    fn name(&self) -> &str {
        "laplacian"
    }

    fn layout(&self, graph: &SheetGraph) -> MeshResult<SheetLayout> {
        if !self.params.radius.is_finite() || self.params.radius <= 0.0 {
            return Err(MeshError::invalid_argument(format!(
                "layout radius must be positive, got {}",
                self.params.radius
            )));
        }
        let mut layout = SheetLayout::default();
        if graph.node_count() == 0 {
            return Ok(layout);
        }

        if graph.has_loops() {
            fixed::place_loops(graph, self.params.radius, &mut layout)?;
        } else {
            fixed::compute_pillow_fixed_points(graph, self.params.radius, &mut layout);
        }
        debug!(
            sheet = graph.sheet().0,
            fixed = layout.fixed.len(),
            nodes = graph.node_count(),
            "placed fixed nodes"
        );

        smooth::smooth(graph, &self.params, &mut layout)?;
        smooth::fixup_degen_bchords(graph, self.params.radius, &mut layout);
        Ok(layout)
    }
}
