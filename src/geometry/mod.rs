//! Geometry kernel boundary: bounds and ray queries over the scene mesh.
//!
//! The planner never looks inside the geometry it tests against; everything
//! goes through the [`GeometryKernel`] trait. The crate ships one kernel,
//! [`TriMesh`], but the placement and visibility stages are written against
//! the trait so a different kernel (BVH-accelerated, externally loaded)
//! can be dropped in without touching them.

mod mesh;
mod ray;

pub use mesh::TriMesh;
pub use ray::Ray;

use glam::DVec3;

use crate::error::PlanError;

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Smallest box enclosing all given points. `None` for an empty set.
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let first = *points.first()?;
        let mut min = first;
        let mut max = first;
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some(Self { min, max })
    }

    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Query interface supplied by the geometry kernel.
///
/// Two ray entry points are deliberately separate: collision probes only
/// need an any-hit answer, while line-of-sight tests need hit distances so
/// the ray's own endpoints can be excluded.
pub trait GeometryKernel {
    /// Axis-aligned bounds of the scene geometry.
    fn bounds(&self) -> Result<Aabb, PlanError>;

    /// True if the ray hits the geometry anywhere within `max_distance`
    /// (unbounded when `None`).
    fn ray_hits_any(&self, ray: &Ray, max_distance: Option<f64>) -> Result<bool, PlanError>;

    /// Distances along the ray of every hit within `max_distance`,
    /// in no particular order.
    fn ray_hit_distances(&self, ray: &Ray, max_distance: Option<f64>) -> Result<Vec<f64>, PlanError>;
}
