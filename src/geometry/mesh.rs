//! Triangle-mesh geometry kernel.

use glam::DVec3;

use super::ray::ray_triangle_intersection;
use super::{Aabb, GeometryKernel, Ray};
use crate::error::PlanError;

/// Indexed triangle soup.
///
/// The planner's shipped [`GeometryKernel`]: a flat vertex buffer with
/// `u32` index triples. Queries walk every triangle; acceleration beyond
/// that is a kernel concern and callers must not assume any.
#[derive(Debug, Clone, Default)]
pub struct TriMesh {
    vertices: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Append vertices and index triples from another builder step.
    /// Indices are rebased onto the current vertex count.
    pub fn append(&mut self, vertices: &[DVec3], triangles: &[[u32; 3]]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.triangles
            .extend(triangles.iter().map(|[a, b, c]| [a + base, b + base, c + base]));
    }

    /// Resolve one triangle's corner positions, validating its indices.
    fn corners(&self, tri: [u32; 3]) -> Result<(DVec3, DVec3, DVec3), PlanError> {
        let fetch = |i: u32| {
            self.vertices.get(i as usize).copied().ok_or_else(|| {
                PlanError::GeometryQueryFailure(format!(
                    "triangle references vertex {} but mesh has {} vertices",
                    i,
                    self.vertices.len()
                ))
            })
        };
        Ok((fetch(tri[0])?, fetch(tri[1])?, fetch(tri[2])?))
    }
}

impl GeometryKernel for TriMesh {
    fn bounds(&self) -> Result<Aabb, PlanError> {
        Aabb::from_points(&self.vertices)
            .ok_or_else(|| PlanError::GeometryQueryFailure("bounds query on an empty mesh".to_string()))
    }

    fn ray_hits_any(&self, ray: &Ray, max_distance: Option<f64>) -> Result<bool, PlanError> {
        for tri in &self.triangles {
            let (a, b, c) = self.corners(*tri)?;
            if let Some(t) = ray_triangle_intersection(ray, a, b, c) {
                if max_distance.is_none_or(|limit| t <= limit) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn ray_hit_distances(&self, ray: &Ray, max_distance: Option<f64>) -> Result<Vec<f64>, PlanError> {
        let mut hits = Vec::new();
        for tri in &self.triangles {
            let (a, b, c) = self.corners(*tri)?;
            if let Some(t) = ray_triangle_intersection(ray, a, b, c) {
                if max_distance.is_none_or(|limit| t <= limit) {
                    hits.push(t);
                }
            }
        }
        Ok(hits)
    }
}
