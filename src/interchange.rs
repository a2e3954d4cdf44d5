//! Position interchange with external callers.
//!
//! Node positions cross the boundary as plain 3D coordinate records; the
//! gateway is a separate singleton record next to the module list, not a
//! tagged union. Candidate positions (e.g. street-lamp points discovered by
//! an external tool) come in through the same records. Coordinates
//! round-trip at serde precision.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::placement::{Node, NodeRole};

/// Error type for interchange file failures.
#[derive(Debug)]
pub enum InterchangeError {
    FileError(String),
    ParseError(String),
}

impl std::fmt::Display for InterchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterchangeError::FileError(msg) => write!(f, "File access failed: {}", msg),
            InterchangeError::ParseError(msg) => write!(f, "Failed to parse JSON: {}", msg),
        }
    }
}

impl std::error::Error for InterchangeError {}

/// One 3D coordinate record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<DVec3> for PositionRecord {
    fn from(p: DVec3) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

impl From<PositionRecord> for DVec3 {
    fn from(r: PositionRecord) -> Self {
        DVec3::new(r.x, r.y, r.z)
    }
}

/// A planned deployment: module positions plus the optional gateway
/// singleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub modules: Vec<PositionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<PositionRecord>,
}

impl DeploymentPlan {
    /// Assemble a plan from placed nodes, splitting the gateway out of the
    /// module list.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let modules = nodes
            .iter()
            .filter(|n| n.role == NodeRole::Module)
            .map(|n| n.position.into())
            .collect();
        let gateway = nodes
            .iter()
            .find(|n| n.role == NodeRole::Gateway)
            .map(|n| n.position.into());
        Self { modules, gateway }
    }

    /// Positions of all nodes, modules first, gateway last when present.
    pub fn positions(&self) -> Vec<DVec3> {
        let mut positions: Vec<DVec3> = self.modules.iter().map(|&r| r.into()).collect();
        if let Some(gateway) = self.gateway {
            positions.push(gateway.into());
        }
        positions
    }

    pub fn save(&self, path: &Path) -> Result<(), InterchangeError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| InterchangeError::ParseError(e.to_string()))?;
        fs::write(path, json).map_err(|e| InterchangeError::FileError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, InterchangeError> {
        let data = fs::read_to_string(path).map_err(|e| InterchangeError::FileError(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| InterchangeError::ParseError(e.to_string()))
    }
}

/// Load a candidate-point list (`[{x, y, z}, ...]`) from JSON.
pub fn load_candidates(path: &Path) -> Result<Vec<DVec3>, InterchangeError> {
    let data = fs::read_to_string(path).map_err(|e| InterchangeError::FileError(e.to_string()))?;
    let records: Vec<PositionRecord> = serde_json::from_str(&data).map_err(|e| InterchangeError::ParseError(e.to_string()))?;
    Ok(records.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_splits_gateway_from_modules() {
        let nodes = vec![
            Node { position: DVec3::new(1.0, 2.0, 3.0), role: NodeRole::Module },
            Node { position: DVec3::new(4.0, 5.0, 6.0), role: NodeRole::Gateway },
            Node { position: DVec3::new(7.0, 8.0, 9.0), role: NodeRole::Module },
        ];
        let plan = DeploymentPlan::from_nodes(&nodes);
        assert_eq!(plan.modules.len(), 2);
        assert_eq!(plan.gateway, Some(PositionRecord { x: 4.0, y: 5.0, z: 6.0 }));
        assert_eq!(plan.positions().len(), 3);
    }

    #[test]
    fn plan_round_trips_through_json() {
        let plan = DeploymentPlan {
            modules: vec![
                PositionRecord { x: 0.5, y: 1.25, z: 2.125 },
                PositionRecord { x: -3.0, y: 0.0, z: 41.0 },
            ],
            gateway: Some(PositionRecord { x: 10.0, y: 20.0, z: 3.5 }),
        };
        let json = serde_json::to_string(&plan).unwrap();
        let back: DeploymentPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }

    #[test]
    fn candidate_list_parses_coordinate_records() {
        let json = r#"[{"x": 1.0, "y": 2.0, "z": 3.0}, {"x": 4.5, "y": 5.5, "z": 6.5}]"#;
        let records: Vec<PositionRecord> = serde_json::from_str(json).unwrap();
        let points: Vec<DVec3> = records.into_iter().map(Into::into).collect();
        assert_eq!(points, vec![DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.5, 5.5, 6.5)]);
    }
}
