//! Collision-free obstacle generation.
//!
//! Produces non-overlapping box-shaped buildings inside a bounded footprint
//! by rejection sampling: each candidate is tested against already-placed
//! obstacles through a spatial index over footprint centers, and accepted
//! candidates commit both the box and its center to the index. The committed
//! set is triangulated into the scene mesh consumed by the placement and
//! visibility stages.

use glam::DVec3;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};
use serde::Deserialize;

use crate::error::PlanError;
use crate::geometry::TriMesh;

/// Index entry: footprint center keyed to the obstacle's position in the
/// committed list.
type CenterEntry = GeomWithData<[f64; 2], usize>;

/// Axis-aligned box obstacle: footprint origin plus extents.
///
/// Immutable once committed to a [`CityScene`]; the generator owns
/// candidates exclusively until then.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

impl Obstacle {
    /// Center of the 2D footprint, the key stored in the spatial index.
    pub fn center(&self) -> [f64; 2] {
        [self.x + self.width / 2.0, self.y + self.depth / 2.0]
    }

    /// Footprint overlap test. Touching edges count as overlapping, which
    /// keeps committed buildings strictly separated.
    pub fn footprint_overlaps(&self, other: &Obstacle) -> bool {
        !(self.x + self.width < other.x
            || self.x > other.x + other.width
            || self.y + self.depth < other.y
            || self.y > other.y + other.depth)
    }

    /// Triangulate this box into the mesh: four side faces plus top and
    /// bottom, two triangles each, wound counter-clockwise seen from outside.
    pub fn append_to_mesh(&self, mesh: &mut TriMesh) {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width, self.y + self.depth);
        let h = self.height;
        let vertices = [
            DVec3::new(x0, y0, 0.0),
            DVec3::new(x1, y0, 0.0),
            DVec3::new(x1, y1, 0.0),
            DVec3::new(x0, y1, 0.0),
            DVec3::new(x0, y0, h),
            DVec3::new(x1, y0, h),
            DVec3::new(x1, y1, h),
            DVec3::new(x0, y1, h),
        ];
        let triangles = [
            [0, 1, 5], [0, 5, 4], // -y side
            [1, 2, 6], [1, 6, 5], // +x side
            [2, 3, 7], [2, 7, 6], // +y side
            [3, 0, 4], [3, 4, 7], // -x side
            [0, 2, 1], [0, 3, 2], // bottom
            [4, 5, 6], [4, 6, 7], // top
        ];
        mesh.append(&vertices, &triangles);
    }
}

/// Inclusive sampling range for one obstacle dimension.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SizeRange {
    pub min: f64,
    pub max: f64,
}

impl SizeRange {
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        sample_range(rng, self.min, self.max)
    }

    pub fn validate(&self, name: &str) -> Result<(), PlanError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "{} range must be positive and finite, got {}..{}",
                name, self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(PlanError::InvalidParameter(format!(
                "{} range is inverted: {} > {}",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Uniform draw that tolerates an empty range (min == max).
fn sample_range(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    if max > min { rng.gen_range(min..max) } else { min }
}

/// Overlap-check strategy for candidate footprints.
///
/// `Nearest` checks only the obstacle whose center is closest to the
/// candidate's center. Two non-nearest obstacles can in principle still
/// overlap a wide candidate, so `Range` offers the hardened variant: an
/// envelope query over every committed center whose footprint could reach
/// the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapCheck {
    #[default]
    Nearest,
    Range,
}

/// Configuration for one obstacle generation run.
#[derive(Debug, Clone, Deserialize)]
pub struct ObstacleConfig {
    /// Footprint extent along X, in world units.
    pub area_width: f64,
    /// Footprint extent along Y, in world units.
    pub area_depth: f64,
    /// Number of obstacles to place.
    pub count: usize,
    pub width: SizeRange,
    pub depth: SizeRange,
    pub height: SizeRange,
    /// Total candidate budget before the run fails with `CapacityExceeded`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default)]
    pub overlap_check: OverlapCheck,
}

fn default_max_attempts() -> usize {
    10_000
}

impl ObstacleConfig {
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.count == 0 {
            return Err(PlanError::InvalidParameter("obstacle count must be at least 1".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(PlanError::InvalidParameter("obstacle attempt budget must be at least 1".to_string()));
        }
        if self.area_width <= 0.0 || self.area_depth <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "area {} x {} must be positive",
                self.area_width, self.area_depth
            )));
        }
        self.width.validate("obstacle width")?;
        self.depth.validate("obstacle depth")?;
        self.height.validate("obstacle height")?;
        if self.width.max > self.area_width || self.depth.max > self.area_depth {
            return Err(PlanError::InvalidParameter(format!(
                "obstacle footprint up to {} x {} cannot fit area {} x {}",
                self.width.max, self.depth.max, self.area_width, self.area_depth
            )));
        }
        Ok(())
    }
}

/// A generated environment: the committed obstacles and their union mesh.
#[derive(Debug, Clone)]
pub struct CityScene {
    pub obstacles: Vec<Obstacle>,
    pub mesh: TriMesh,
}

/// Generate `config.count` non-overlapping obstacles and assemble the scene
/// mesh.
///
/// Deterministic for a given `seed`; pass `None` to draw a fresh seed from
/// OS entropy. Fails with `CapacityExceeded` once the attempt budget is
/// spent, discarding the partial set.
pub fn generate(config: &ObstacleConfig, seed: Option<u64>) -> Result<CityScene, PlanError> {
    config.validate()?;
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut obstacles: Vec<Obstacle> = Vec::with_capacity(config.count);
    let mut index: RTree<CenterEntry> = RTree::new();
    let mut attempts = 0usize;

    while obstacles.len() < config.count {
        if attempts >= config.max_attempts {
            debug!(
                "obstacle generation gave up after {} attempts with {}/{} placed",
                attempts,
                obstacles.len(),
                config.count
            );
            return Err(PlanError::CapacityExceeded {
                what: "obstacles",
                attempts: config.max_attempts,
            });
        }
        attempts += 1;

        let width = config.width.sample(&mut rng);
        let depth = config.depth.sample(&mut rng);
        let height = config.height.sample(&mut rng);
        let candidate = Obstacle {
            x: sample_range(&mut rng, 0.0, config.area_width - width),
            y: sample_range(&mut rng, 0.0, config.area_depth - depth),
            width,
            depth,
            height,
        };

        if collides(&candidate, &index, &obstacles, config) {
            trace!("rejected obstacle candidate at {:?}", candidate.center());
            continue;
        }

        index.insert(CenterEntry::new(candidate.center(), obstacles.len()));
        obstacles.push(candidate);
    }

    let mut mesh = TriMesh::new();
    for obstacle in &obstacles {
        obstacle.append_to_mesh(&mut mesh);
    }
    info!(
        "generated {} obstacles in {} attempts ({} triangles)",
        obstacles.len(),
        attempts,
        mesh.triangle_count()
    );
    Ok(CityScene { obstacles, mesh })
}

/// Candidate overlap test against the committed set, via the center index.
fn collides(candidate: &Obstacle, index: &RTree<CenterEntry>, obstacles: &[Obstacle], config: &ObstacleConfig) -> bool {
    match config.overlap_check {
        OverlapCheck::Nearest => match index.nearest_neighbor(&candidate.center()) {
            Some(entry) => candidate.footprint_overlaps(&obstacles[entry.data]),
            None => false,
        },
        OverlapCheck::Range => {
            // Any committed footprint that could reach the candidate has its
            // center within half the maximum footprint extent of the
            // candidate's bounds.
            let reach_x = config.width.max / 2.0;
            let reach_y = config.depth.max / 2.0;
            let envelope = AABB::from_corners(
                [candidate.x - reach_x, candidate.y - reach_y],
                [candidate.x + candidate.width + reach_x, candidate.y + candidate.depth + reach_y],
            );
            index
                .locate_in_envelope_intersecting(&envelope)
                .any(|entry| candidate.footprint_overlaps(&obstacles[entry.data]))
        }
    }
}
