//! # Spatial Index for Point Queries
//!
//! Static kd-tree over tagged points, used to find coincident vertices.
//!
//! ## Features
//!
//! - **Median splits** on the widest axis, built in O(n log n)
//! - **Range queries**: all points within a radius (inclusive)
//! - **Nearest neighbor** with branch pruning
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use hexmesh::ops::spatial_index::SpatialIndex;
//!
//! let index = SpatialIndex::build(vec![(DVec3::ZERO, 0), (DVec3::X, 1)]);
//! let hits = index.within(DVec3::new(0.1, 0.0, 0.0), 0.2);
//! assert_eq!(hits.len(), 1);
//! ```

use config::constants::KD_TREE_LEAF_SIZE;
use glam::DVec3;

#[derive(Debug, Clone)]
enum KdNode {
    /// Points `start..end` of the permuted point list.
    Leaf { start: usize, end: usize },
    /// Left subtree holds coordinates `<= value`, right `>= value`.
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// Kd-tree over points carrying a payload.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    points: Vec<(DVec3, T)>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl<T: Copy> SpatialIndex<T> {
    /// Builds the tree. An empty input gives an empty index.
    pub fn build(points: Vec<(DVec3, T)>) -> Self {
        let mut index = Self {
            nodes: Vec::with_capacity(2 * points.len() / KD_TREE_LEAF_SIZE + 1),
            points,
            root: None,
        };
        if !index.points.is_empty() {
            let len = index.points.len();
            index.root = Some(index.build_node(0, len));
        }
        index
    }

    fn build_node(&mut self, start: usize, end: usize) -> usize {
        let slot = self.nodes.len();
        self.nodes.push(KdNode::Leaf { start, end });
        if end - start <= KD_TREE_LEAF_SIZE {
            return slot;
        }

        let (min, max) = self.points[start..end]
            .iter()
            .fold((DVec3::INFINITY, DVec3::NEG_INFINITY), |(min, max), (p, _)| {
                (min.min(*p), max.max(*p))
            });
        let extent = max - min;
        let axis = if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        };
        // All points coincide; splitting would not separate anything.
        if extent[axis] <= 0.0 {
            return slot;
        }

        let mid = start + (end - start) / 2;
        self.points[start..end]
            .select_nth_unstable_by(mid - start, |a, b| a.0[axis].total_cmp(&b.0[axis]));
        let value = self.points[mid].0[axis];
        let left = self.build_node(start, mid);
        let right = self.build_node(mid, end);
        self.nodes[slot] = KdNode::Split {
            axis,
            value,
            left,
            right,
        };
        slot
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Every point whose distance to `point` is at most `radius`, with
    /// that distance.
    pub fn within(&self, point: DVec3, radius: f64) -> Vec<(T, f64)> {
        let mut hits = Vec::new();
        let Some(root) = self.root else {
            return hits;
        };
        let radius_sq = radius * radius;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match self.nodes[node] {
                KdNode::Leaf { start, end } => {
                    for (p, payload) in &self.points[start..end] {
                        let d2 = p.distance_squared(point);
                        if d2 <= radius_sq {
                            hits.push((*payload, d2.sqrt()));
                        }
                    }
                }
                KdNode::Split {
                    axis,
                    value,
                    left,
                    right,
                } => {
                    if point[axis] - radius <= value {
                        stack.push(left);
                    }
                    if point[axis] + radius >= value {
                        stack.push(right);
                    }
                }
            }
        }
        hits
    }

    /// Closest point to `point` with its distance.
    pub fn nearest(&self, point: DVec3) -> Option<(T, f64)> {
        let root = self.root?;
        let mut best: Option<(T, f64)> = None;
        let mut best_sq = f64::INFINITY;
        let mut stack = vec![(root, 0.0_f64)];
        while let Some((node, bound_sq)) = stack.pop() {
            if bound_sq > best_sq {
                continue;
            }
            match self.nodes[node] {
                KdNode::Leaf { start, end } => {
                    for (p, payload) in &self.points[start..end] {
                        let d2 = p.distance_squared(point);
                        if d2 < best_sq {
                            best_sq = d2;
                            best = Some((*payload, d2));
                        }
                    }
                }
                KdNode::Split {
                    axis,
                    value,
                    left,
                    right,
                } => {
                    let delta = point[axis] - value;
                    let (near, far) = if delta <= 0.0 { (left, right) } else { (right, left) };
                    // Far side first so the near side is popped next.
                    stack.push((far, delta * delta));
                    stack.push((near, 0.0));
                }
            }
        }
        best.map(|(payload, d2)| (payload, d2.sqrt()))
    }
}
