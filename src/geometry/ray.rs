//! Ray construction and ray/triangle intersection.

use glam::DVec3;

use crate::error::PlanError;

/// Tolerance below which a candidate ray direction is considered degenerate.
const MIN_DIRECTION_LENGTH: f64 = 1e-9;

/// Determinant cutoff for the ray/triangle test; rays parallel to a
/// triangle's plane within this tolerance report no hit.
const PARALLEL_EPSILON: f64 = 1e-12;

/// A half-line with unit direction, in world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit length, guaranteed by the constructors.
    pub direction: DVec3,
}

impl Ray {
    /// Ray from `origin` along `direction` (normalized here).
    ///
    /// Fails with `InvalidParameter` when the direction is too short to
    /// normalize.
    pub fn new(origin: DVec3, direction: DVec3) -> Result<Self, PlanError> {
        if direction.length() < MIN_DIRECTION_LENGTH {
            return Err(PlanError::InvalidParameter(format!(
                "degenerate ray direction {:?}",
                direction
            )));
        }
        Ok(Self {
            origin,
            direction: direction.normalize(),
        })
    }

    /// Ray from one point toward another, plus the distance between them.
    ///
    /// Coincident points make the direction undefined and are rejected.
    pub fn between(from: DVec3, to: DVec3) -> Result<(Self, f64), PlanError> {
        let delta = to - from;
        let distance = delta.length();
        if distance < MIN_DIRECTION_LENGTH {
            return Err(PlanError::InvalidParameter(format!(
                "coincident points {:?} and {:?} give a zero-length ray",
                from, to
            )));
        }
        Ok((
            Self {
                origin: from,
                direction: delta / distance,
            },
            distance,
        ))
    }

    pub fn point_at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the distance along the ray to the hit point, or `None` when the
/// ray misses, runs parallel to the triangle plane, or the hit lies behind
/// the origin. Edge and vertex hits count as hits; the visibility stage
/// filters endpoint grazes by distance, not here.
pub fn ray_triangle_intersection(ray: &Ray, a: DVec3, b: DVec3, c: DVec3) -> Option<f64> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = edge2.dot(q) * inv_det;
    if t < 0.0 { None } else { Some(t) }
}
