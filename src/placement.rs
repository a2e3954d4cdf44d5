//! Node placement: collision-free module and gateway positioning.
//!
//! Two placement paths, both from the same deployment workflow:
//! - free sampling inside the scene bounds, accepting a point only when a
//!   six-directional ray probe misses the scene mesh;
//! - drawing from an externally supplied candidate list (e.g. street-lamp
//!   positions discovered by an external tool), with the gateway chosen
//!   disjoint from the module set.

use glam::DVec3;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::PlanError;
use crate::geometry::{Aabb, GeometryKernel, Ray};

/// Role tag distinguishing ordinary modules from the single gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Module,
    Gateway,
}

/// A placed node: position plus role, immutable once accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub position: DVec3,
    pub role: NodeRole,
}

/// The six axis-aligned probe directions.
const PROBE_DIRECTIONS: [DVec3; 6] = [
    DVec3::new(1.0, 0.0, 0.0),
    DVec3::new(-1.0, 0.0, 0.0),
    DVec3::new(0.0, 1.0, 0.0),
    DVec3::new(0.0, -1.0, 0.0),
    DVec3::new(0.0, 0.0, 1.0),
    DVec3::new(0.0, 0.0, -1.0),
];

/// True if any of the six axis-aligned probe rays from `position` hits the
/// scene geometry. A position inside or axis-aligned with an obstacle is
/// considered colliding.
pub fn probe_collides<K: GeometryKernel>(kernel: &K, position: DVec3) -> Result<bool, PlanError> {
    for direction in PROBE_DIRECTIONS {
        // Directions are unit axis vectors, so construction cannot fail.
        let ray = Ray::new(position, direction)?;
        if kernel.ray_hits_any(&ray, None)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Place `count` module nodes by uniform sampling inside `bounds`.
///
/// Each candidate must pass the six-ray probe against the scene mesh. The
/// scene mesh is never mutated. Fails with `CapacityExceeded` when the
/// attempt budget runs out, discarding the partial set.
pub fn place_modules<K: GeometryKernel>(
    kernel: &K,
    bounds: &Aabb,
    count: usize,
    max_attempts: usize,
    seed: Option<u64>,
) -> Result<Vec<Node>, PlanError> {
    if count == 0 {
        return Err(PlanError::InvalidParameter("module count must be at least 1".to_string()));
    }
    if max_attempts == 0 {
        return Err(PlanError::InvalidParameter("placement attempt budget must be at least 1".to_string()));
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut nodes = Vec::with_capacity(count);
    let mut attempts = 0usize;
    while nodes.len() < count {
        if attempts >= max_attempts {
            debug!(
                "module placement gave up after {} attempts with {}/{} placed",
                attempts,
                nodes.len(),
                count
            );
            return Err(PlanError::CapacityExceeded {
                what: "modules",
                attempts: max_attempts,
            });
        }
        attempts += 1;

        let position = sample_in_bounds(&mut rng, bounds);
        if probe_collides(kernel, position)? {
            continue;
        }
        nodes.push(Node {
            position,
            role: NodeRole::Module,
        });
    }
    info!("placed {} modules in {} attempts", nodes.len(), attempts);
    Ok(nodes)
}

fn sample_in_bounds(rng: &mut StdRng, bounds: &Aabb) -> DVec3 {
    let mut axis = |min: f64, max: f64| if max > min { rng.gen_range(min..max) } else { min };
    DVec3::new(
        axis(bounds.min.x, bounds.max.x),
        axis(bounds.min.y, bounds.max.y),
        axis(bounds.min.z, bounds.max.z),
    )
}

/// Draw `count` module positions from an externally supplied candidate list
/// (without replacement). Fails with `CapacityExceeded` when the list is too
/// short.
pub fn pick_modules(candidates: &[DVec3], count: usize, seed: Option<u64>) -> Result<Vec<Node>, PlanError> {
    if count == 0 {
        return Err(PlanError::InvalidParameter("module count must be at least 1".to_string()));
    }
    if candidates.len() < count {
        return Err(PlanError::CapacityExceeded {
            what: "modules",
            attempts: candidates.len(),
        });
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let picked = candidates
        .choose_multiple(&mut rng, count)
        .map(|position| Node {
            position: *position,
            role: NodeRole::Module,
        })
        .collect();
    Ok(picked)
}

/// Choose the gateway from `candidates`, rejecting positions already used by
/// a module. Fails with `CapacityExceeded` when every candidate coincides
/// with a module.
pub fn pick_gateway(candidates: &[DVec3], modules: &[Node], seed: Option<u64>) -> Result<Node, PlanError> {
    let free: Vec<DVec3> = candidates
        .iter()
        .copied()
        .filter(|c| !modules.iter().any(|m| m.position == *c))
        .collect();
    if free.is_empty() {
        return Err(PlanError::CapacityExceeded {
            what: "gateway",
            attempts: candidates.len(),
        });
    }
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let position = *free.choose(&mut rng).unwrap();
    Ok(Node {
        position,
        role: NodeRole::Gateway,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Obstacle;
    use crate::geometry::TriMesh;

    fn one_box_scene() -> TriMesh {
        let mut mesh = TriMesh::new();
        let o = Obstacle { x: 20.0, y: 20.0, width: 10.0, depth: 10.0, height: 30.0 };
        o.append_to_mesh(&mut mesh);
        mesh
    }

    fn wide_bounds() -> Aabb {
        Aabb {
            min: DVec3::new(0.0, 0.0, 0.0),
            max: DVec3::new(50.0, 50.0, 50.0),
        }
    }

    #[test]
    fn accepted_nodes_pass_the_probe() {
        let mesh = one_box_scene();
        let nodes = place_modules(&mesh, &wide_bounds(), 4, 10_000, Some(11)).unwrap();
        assert_eq!(nodes.len(), 4);
        for node in &nodes {
            assert_eq!(node.role, NodeRole::Module);
            assert!(wide_bounds().contains(node.position));
            assert!(!probe_collides(&mesh, node.position).unwrap());
        }
    }

    #[test]
    fn probe_rejects_points_inside_and_in_line_with_the_box() {
        let mesh = one_box_scene();
        // Inside the box
        assert!(probe_collides(&mesh, DVec3::new(25.0, 25.0, 15.0)).unwrap());
        // Outside, but the +x probe crosses the box
        assert!(probe_collides(&mesh, DVec3::new(5.0, 25.0, 15.0)).unwrap());
        // Above the box height, all probes except -z clear; -z hits the top
        assert!(probe_collides(&mesh, DVec3::new(25.0, 25.0, 40.0)).unwrap());
        // Fully clear of the box in every axis direction
        assert!(!probe_collides(&mesh, DVec3::new(5.0, 5.0, 40.0)).unwrap());
    }

    #[test]
    fn impossible_placement_fails_fast() {
        let mesh = one_box_scene();
        // Bounds collapsed to the inside of the box: nothing can be accepted.
        let inside = Aabb {
            min: DVec3::new(22.0, 22.0, 5.0),
            max: DVec3::new(28.0, 28.0, 25.0),
        };
        let err = place_modules(&mesh, &inside, 1, 200, Some(5)).unwrap_err();
        assert!(matches!(err, PlanError::CapacityExceeded { what: "modules", .. }));
    }

    #[test]
    fn picked_modules_come_from_the_candidate_list() {
        let candidates: Vec<DVec3> = (0..10).map(|i| DVec3::new(i as f64, 0.0, 3.0)).collect();
        let nodes = pick_modules(&candidates, 4, Some(2)).unwrap();
        assert_eq!(nodes.len(), 4);
        for node in &nodes {
            assert!(candidates.contains(&node.position));
        }
        // No duplicates: selection is without replacement.
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                assert_ne!(nodes[i].position, nodes[j].position);
            }
        }
        assert!(matches!(
            pick_modules(&candidates, 11, Some(2)),
            Err(PlanError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn gateway_is_disjoint_from_modules() {
        let candidates: Vec<DVec3> = (0..5).map(|i| DVec3::new(i as f64, 1.0, 3.0)).collect();
        let modules = pick_modules(&candidates, 4, Some(9)).unwrap();
        let gateway = pick_gateway(&candidates, &modules, Some(9)).unwrap();
        assert_eq!(gateway.role, NodeRole::Gateway);
        assert!(!modules.iter().any(|m| m.position == gateway.position));

        // All candidates taken: no gateway position left.
        let all = pick_modules(&candidates, 5, Some(9)).unwrap();
        assert!(matches!(
            pick_gateway(&candidates, &all, Some(9)),
            Err(PlanError::CapacityExceeded { .. })
        ));
    }
}
