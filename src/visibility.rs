//! Pairwise line-of-sight analysis over a placed node set.
//!
//! One ray per unordered node pair, cast from the first node toward the
//! second. Line of sight holds iff no mesh intersection lies strictly
//! between the two endpoints; the verdict is mirrored into both cells of
//! the connectivity matrix, so symmetry holds by construction.

use log::{debug, info};

use crate::error::PlanError;
use crate::geometry::{GeometryKernel, Ray};
use crate::placement::Node;

/// Hits closer than this to either endpoint are treated as the ray grazing
/// its own endpoint and ignored.
const ENDPOINT_TOLERANCE: f64 = 1e-9;

/// Square symmetric boolean matrix indexed by node order.
///
/// The diagonal is unused and stored as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityMatrix {
    node_count: usize,
    cells: Vec<bool>,
}

impl ConnectivityMatrix {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            cells: vec![false; node_count * node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[i * self.node_count + j]
    }

    /// Store one verdict in both (i, j) and (j, i).
    fn set_pair(&mut self, i: usize, j: usize, value: bool) {
        self.cells[i * self.node_count + j] = value;
        self.cells[j * self.node_count + i] = value;
    }

    /// Number of unordered pairs with line of sight.
    pub fn connected_pair_count(&self) -> usize {
        let mut count = 0;
        for i in 0..self.node_count {
            for j in (i + 1)..self.node_count {
                if self.get(i, j) {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Verdict and geometry for one unordered node pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairVisibility {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub line_of_sight: bool,
}

/// Result of a visibility run: the matrix plus per-pair distances, which the
/// link-budget stage consumes without re-measuring.
#[derive(Debug, Clone)]
pub struct VisibilityReport {
    pub matrix: ConnectivityMatrix,
    pub pairs: Vec<PairVisibility>,
}

/// Line-of-sight test between two points.
///
/// Intersections are counted only in the open interval strictly between the
/// endpoints, so a node sitting exactly on a mesh vertex does not occlude
/// itself. Coincident points are an error: the ray direction is undefined.
pub fn line_of_sight<K: GeometryKernel>(kernel: &K, from: glam::DVec3, to: glam::DVec3) -> Result<bool, PlanError> {
    let (ray, distance) = Ray::between(from, to)?;
    let hits = kernel.ray_hit_distances(&ray, Some(distance))?;
    Ok(!hits
        .iter()
        .any(|&t| t > ENDPOINT_TOLERANCE && t < distance - ENDPOINT_TOLERANCE))
}

/// Build the connectivity matrix for `nodes` against the scene geometry.
///
/// O(n²) ray queries; each pair is tested once and mirrored.
pub fn analyze<K: GeometryKernel>(kernel: &K, nodes: &[Node]) -> Result<VisibilityReport, PlanError> {
    let mut matrix = ConnectivityMatrix::new(nodes.len());
    let mut pairs = Vec::with_capacity(nodes.len() * nodes.len().saturating_sub(1) / 2);

    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let from = nodes[i].position;
            let to = nodes[j].position;
            let los = line_of_sight(kernel, from, to)?;
            matrix.set_pair(i, j, los);
            pairs.push(PairVisibility {
                a: i,
                b: j,
                distance: from.distance(to),
                line_of_sight: los,
            });
            debug!("pair ({}, {}): line of sight {}", i, j, if los { "clear" } else { "blocked" });
        }
    }

    info!(
        "visibility analysis: {}/{} pairs connected",
        matrix.connected_pair_count(),
        pairs.len()
    );
    Ok(VisibilityReport { matrix, pairs })
}
