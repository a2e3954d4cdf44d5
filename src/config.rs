//! Planner run configuration.
//!
//! Everything the pipeline needs is caller-supplied through one TOML file:
//! scene bounds, obstacle count and size ranges, node count, radio
//! parameters, attempt budgets, and an optional seed. Nothing is a
//! hardcoded constant.

use serde::Deserialize;
use std::path::Path;

use crate::error::PlanError;
use crate::generator::ObstacleConfig;
use crate::link_budget::{RadioParameters, snr_limit};

/// Node placement section of the run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    /// Number of module nodes to place.
    pub modules: usize,
    /// Candidate budget before placement fails with `CapacityExceeded`.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_max_attempts() -> usize {
    10_000
}

/// Full configuration for one planning run.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// RNG seed for reproducible runs; omit for a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
    pub obstacles: ObstacleConfig,
    pub nodes: NodeConfig,
    pub radio: RadioParameters,
}

impl PlannerConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;
        let config: PlannerConfig = toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }

    /// Check every section against its valid domain.
    pub fn validate(&self) -> Result<(), PlanError> {
        self.obstacles.validate()?;
        if self.nodes.modules == 0 {
            return Err(PlanError::InvalidParameter("node count must be at least 1".to_string()));
        }
        if self.nodes.max_attempts == 0 {
            return Err(PlanError::InvalidParameter("node attempt budget must be at least 1".to_string()));
        }
        snr_limit(self.radio.spreading_factor)?;
        if self.radio.bandwidth <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "bandwidth must be positive, got {} kHz",
                self.radio.bandwidth
            )));
        }
        if self.radio.propagation_speed <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "propagation speed must be positive, got {}",
                self.radio.propagation_speed
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        seed = 42

        [obstacles]
        area_width = 50.0
        area_depth = 50.0
        count = 3
        width = { min = 5.0, max = 10.0 }
        depth = { min = 5.0, max = 10.0 }
        height = { min = 10.0, max = 20.0 }

        [nodes]
        modules = 3

        [radio]
        spreading_factor = 10
        bandwidth = 10.0
        tx_power = 10.0
        tx_antenna_gain = 10.0
        rx_antenna_gain = 10.0
        propagation_speed = 10.0
    "#;

    #[test]
    fn parses_a_full_config() {
        let config: PlannerConfig = toml::from_str(VALID).unwrap();
        config.validate().unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.obstacles.count, 3);
        assert_eq!(config.nodes.modules, 3);
        // Defaults fill the attempt budgets
        assert_eq!(config.nodes.max_attempts, 10_000);
        assert_eq!(config.obstacles.max_attempts, 10_000);
        assert_eq!(config.radio.spreading_factor, 10);
    }

    #[test]
    fn rejects_out_of_table_spreading_factor() {
        let mut config: PlannerConfig = toml::from_str(VALID).unwrap();
        config.radio.spreading_factor = 5;
        assert!(matches!(config.validate(), Err(PlanError::InvalidParameter(_))));
    }

    #[test]
    fn rejects_zero_counts() {
        let mut config: PlannerConfig = toml::from_str(VALID).unwrap();
        config.nodes.modules = 0;
        assert!(matches!(config.validate(), Err(PlanError::InvalidParameter(_))));

        let mut config: PlannerConfig = toml::from_str(VALID).unwrap();
        config.obstacles.count = 0;
        assert!(matches!(config.validate(), Err(PlanError::InvalidParameter(_))));
    }

    #[test]
    fn overlap_check_parses_kebab_case() {
        let with_range = VALID.replace("count = 3", "count = 3\noverlap_check = \"range\"");
        let config: PlannerConfig = toml::from_str(&with_range).unwrap();
        assert_eq!(config.obstacles.overlap_check, crate::generator::OverlapCheck::Range);
    }
}
