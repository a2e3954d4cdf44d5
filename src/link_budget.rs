//! Radio link-budget calculations.
//!
//! Pure functions of distance and a fixed parameter set, evaluated once per
//! node pair from the distances the visibility stage already measured.
//!
//! Units:
//! - Power: dBm for transmit power and sensitivity, dBi for antenna gains,
//!   dBW out of the watt conversion
//! - Bandwidth: kilohertz
//! - Distance: world units, interpreted as meters
//! - Delay: seconds, given a propagation speed in world units per second

use serde::Deserialize;

use crate::error::PlanError;
use crate::visibility::VisibilityReport;

/// Required SNR in dB per spreading factor, SF 6 through 12.
///
/// Fixed table shipped with the model; spreading factors outside it are
/// invalid parameters rather than a clamped default.
pub fn snr_limit(spreading_factor: u8) -> Result<f64, PlanError> {
    let snr = match spreading_factor {
        6 => -5.0,
        7 => -7.5,
        8 => -10.0,
        9 => -12.5,
        10 => -15.0,
        11 => -17.5,
        12 => -20.0,
        other => {
            return Err(PlanError::InvalidParameter(format!(
                "spreading factor {} has no SNR entry (valid: 6-12)",
                other
            )));
        }
    };
    Ok(snr)
}

/// Receiver sensitivity in dBm from thermal noise, bandwidth and required
/// SNR.
///
/// ```text
/// S = -174 + 10·log10(1000 · BW_kHz) + SNR
/// ```
/// -174 dBm/Hz is the thermal noise floor at room temperature.
pub fn sensitivity(bandwidth_khz: f64, snr: f64) -> f64 {
    -174.0 + 10.0 * (1000.0 * bandwidth_khz).log10() + snr
}

/// Total tolerable loss between transmitter and receiver in dB.
pub fn link_budget(tx_power: f64, tx_gain: f64, rx_gain: f64, sensitivity: f64) -> f64 {
    tx_power + tx_gain + rx_gain - sensitivity
}

/// Convert power in watts to dBW. Non-positive power has no logarithm and
/// is rejected instead of producing NaN or -inf.
pub fn watts_to_dbw(watts: f64) -> Result<f64, PlanError> {
    if watts <= 0.0 {
        return Err(PlanError::InvalidParameter(format!(
            "power must be greater than zero watts, got {}",
            watts
        )));
    }
    Ok(10.0 * watts.log10())
}

/// Fixed radio parameters for one planning run. Set once, read-only
/// thereafter.
#[derive(Debug, Clone, Deserialize)]
pub struct RadioParameters {
    /// LoRa-style spreading factor, 6-12.
    pub spreading_factor: u8,
    /// Bandwidth in kilohertz.
    pub bandwidth: f64,
    /// Transmit power in dBm.
    pub tx_power: f64,
    /// Transmit antenna gain in dBi.
    pub tx_antenna_gain: f64,
    /// Receive antenna gain in dBi.
    pub rx_antenna_gain: f64,
    /// Signal propagation speed in world units per second. A stand-in for
    /// the speed of light: set 299_792_458.0 for physical delay figures, or
    /// a scaled value for simulation time bases.
    pub propagation_speed: f64,
}

/// Per-pair derived radio metrics. Recomputed on demand; no lifecycle of
/// their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkMetrics {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    pub line_of_sight: bool,
    /// Geometric propagation time plus the airtime term, seconds.
    pub propagation_delay: f64,
    pub sensitivity: f64,
    pub link_budget: f64,
}

/// Link-budget model with the per-configuration values computed once.
///
/// Sensitivity depends only on bandwidth and the SF's required SNR, not on
/// distance, so it is derived at construction and reused for every pair.
#[derive(Debug, Clone)]
pub struct LinkBudgetModel {
    parameters: RadioParameters,
    sensitivity: f64,
    link_budget: f64,
}

impl LinkBudgetModel {
    /// Validate the parameters and memoize the distance-independent values.
    pub fn new(parameters: RadioParameters) -> Result<Self, PlanError> {
        if parameters.bandwidth <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "bandwidth must be positive, got {} kHz",
                parameters.bandwidth
            )));
        }
        if parameters.propagation_speed <= 0.0 {
            return Err(PlanError::InvalidParameter(format!(
                "propagation speed must be positive, got {}",
                parameters.propagation_speed
            )));
        }
        let snr = snr_limit(parameters.spreading_factor)?;
        let sensitivity = sensitivity(parameters.bandwidth, snr);
        let link_budget = link_budget(
            parameters.tx_power,
            parameters.tx_antenna_gain,
            parameters.rx_antenna_gain,
            sensitivity,
        );
        Ok(Self {
            parameters,
            sensitivity,
            link_budget,
        })
    }

    pub fn parameters(&self) -> &RadioParameters {
        &self.parameters
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn link_budget(&self) -> f64 {
        self.link_budget
    }

    /// Total delay over `distance`: geometric propagation time plus a
    /// LoRa-style symbol airtime term.
    ///
    /// ```text
    /// delay = d / v + (SF · BW) / 2^SF
    /// ```
    pub fn propagation_delay(&self, distance: f64) -> f64 {
        let sf = self.parameters.spreading_factor as f64;
        distance / self.parameters.propagation_speed + (sf * self.parameters.bandwidth) / 2f64.powf(sf)
    }

    /// Metrics for one pair at a known distance.
    pub fn metrics_for(&self, a: usize, b: usize, distance: f64, line_of_sight: bool) -> LinkMetrics {
        LinkMetrics {
            a,
            b,
            distance,
            line_of_sight,
            propagation_delay: self.propagation_delay(distance),
            sensitivity: self.sensitivity,
            link_budget: self.link_budget,
        }
    }

    /// Metrics for every pair of a visibility report, keyed off the
    /// distances measured during analysis.
    pub fn evaluate(&self, report: &VisibilityReport) -> Vec<LinkMetrics> {
        report
            .pairs
            .iter()
            .map(|pair| self.metrics_for(pair.a, pair.b, pair.distance, pair.line_of_sight))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn params() -> RadioParameters {
        RadioParameters {
            spreading_factor: 10,
            bandwidth: 10.0,
            tx_power: 10.0,
            tx_antenna_gain: 10.0,
            rx_antenna_gain: 10.0,
            propagation_speed: 10.0,
        }
    }

    #[test]
    fn snr_table_matches_spec() {
        for (sf, expected) in [(6, -5.0), (7, -7.5), (8, -10.0), (9, -12.5), (10, -15.0), (11, -17.5), (12, -20.0)] {
            assert!((snr_limit(sf).unwrap() - expected).abs() < TOLERANCE);
        }
        assert!(matches!(snr_limit(5), Err(PlanError::InvalidParameter(_))));
        assert!(matches!(snr_limit(13), Err(PlanError::InvalidParameter(_))));
    }

    #[test]
    fn sensitivity_at_sf10_bw10() {
        // -174 + 10*log10(10000) - 15 = -149
        let snr = snr_limit(10).unwrap();
        assert!((sensitivity(10.0, snr) - (-149.0)).abs() < TOLERANCE);
    }

    #[test]
    fn link_budget_sums_gains_against_sensitivity() {
        assert!((link_budget(10.0, 10.0, 10.0, -149.0) - 179.0).abs() < TOLERANCE);
    }

    #[test]
    fn watts_to_dbw_domain() {
        assert!(matches!(watts_to_dbw(0.0), Err(PlanError::InvalidParameter(_))));
        assert!(matches!(watts_to_dbw(-5.0), Err(PlanError::InvalidParameter(_))));
        assert!(watts_to_dbw(1.0).unwrap().abs() < TOLERANCE);
        assert!((watts_to_dbw(10.0).unwrap() - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn model_memoizes_sensitivity_and_budget() {
        let model = LinkBudgetModel::new(params()).unwrap();
        assert!((model.sensitivity() - (-149.0)).abs() < TOLERANCE);
        assert!((model.link_budget() - 179.0).abs() < TOLERANCE);

        // delay at d=10, v=10, sf=10, bw=10: 1.0 + 100/1024
        let expected = 1.0 + 100.0 / 1024.0;
        assert!((model.propagation_delay(10.0) - expected).abs() < TOLERANCE);
    }

    #[test]
    fn invalid_model_parameters_are_rejected() {
        let mut p = params();
        p.spreading_factor = 13;
        assert!(matches!(LinkBudgetModel::new(p), Err(PlanError::InvalidParameter(_))));

        let mut p = params();
        p.bandwidth = 0.0;
        assert!(matches!(LinkBudgetModel::new(p), Err(PlanError::InvalidParameter(_))));

        let mut p = params();
        p.propagation_speed = -1.0;
        assert!(matches!(LinkBudgetModel::new(p), Err(PlanError::InvalidParameter(_))));
    }

    #[test]
    fn metrics_carry_pair_identity_and_distance() {
        let model = LinkBudgetModel::new(params()).unwrap();
        let m = model.metrics_for(2, 5, 10.0, true);
        assert_eq!((m.a, m.b), (2, 5));
        assert!(m.line_of_sight);
        assert!((m.distance - 10.0).abs() < TOLERANCE);
        assert!((m.sensitivity - model.sensitivity()).abs() < TOLERANCE);
    }
}
