//! Deployment planning for wireless communication modules in a procedurally
//! generated urban environment.
//!
//! The pipeline runs in four stages:
//! 1. [`generator`] places collision-free box obstacles and triangulates
//!    them into a scene mesh.
//! 2. [`placement`] samples module (and gateway) positions that a six-ray
//!    probe confirms are clear of the mesh.
//! 3. [`visibility`] casts one ray per node pair against the mesh and
//!    assembles a symmetric connectivity matrix with pair distances.
//! 4. [`link_budget`] turns those distances plus fixed radio parameters into
//!    propagation delay, receiver sensitivity, and link budget per pair.
//!
//! All geometry queries go through the [`geometry::GeometryKernel`] trait;
//! the shipped kernel is a plain triangle mesh.

pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod interchange;
pub mod link_budget;
pub mod placement;
pub mod visibility;

pub use config::PlannerConfig;
pub use error::PlanError;
pub use generator::{CityScene, Obstacle, ObstacleConfig, OverlapCheck, SizeRange};
pub use geometry::{Aabb, GeometryKernel, Ray, TriMesh};
pub use interchange::{DeploymentPlan, PositionRecord};
pub use link_budget::{LinkBudgetModel, LinkMetrics, RadioParameters};
pub use placement::{Node, NodeRole};
pub use visibility::{ConnectivityMatrix, VisibilityReport};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryKernel;

    #[test]
    fn full_pipeline_runs_end_to_end() {
        let obstacle_config = ObstacleConfig {
            area_width: 50.0,
            area_depth: 50.0,
            count: 3,
            width: SizeRange { min: 5.0, max: 10.0 },
            depth: SizeRange { min: 5.0, max: 10.0 },
            height: SizeRange { min: 10.0, max: 20.0 },
            max_attempts: 10_000,
            overlap_check: OverlapCheck::Nearest,
        };
        let scene = generator::generate(&obstacle_config, Some(1234)).unwrap();
        assert_eq!(scene.obstacles.len(), 3);
        assert_eq!(scene.mesh.triangle_count(), 36);

        let bounds = scene.mesh.bounds().unwrap();
        let nodes = placement::place_modules(&scene.mesh, &bounds, 3, 10_000, Some(1234)).unwrap();
        assert_eq!(nodes.len(), 3);

        let report = visibility::analyze(&scene.mesh, &nodes).unwrap();
        assert_eq!(report.pairs.len(), 3);

        let model = LinkBudgetModel::new(RadioParameters {
            spreading_factor: 10,
            bandwidth: 10.0,
            tx_power: 10.0,
            tx_antenna_gain: 10.0,
            rx_antenna_gain: 10.0,
            propagation_speed: 10.0,
        })
        .unwrap();
        let metrics = model.evaluate(&report);
        assert_eq!(metrics.len(), 3);
        for m in &metrics {
            assert!(m.distance > 0.0);
            assert!(m.propagation_delay > 0.0);
            assert!((m.sensitivity - (-149.0)).abs() < 1e-9);
            assert!((m.link_budget - 179.0).abs() < 1e-9);
        }
    }
}
