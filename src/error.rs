//! Error types shared by all planner stages.

/// Error type for planning failures.
///
/// Every error is local to the operation that detected it; rejection
/// sampling retries happen inside the generation loops and are bounded,
/// so no variant here is ever retried by the planner itself.
#[derive(Debug)]
pub enum PlanError {
    /// A rejection-sampling stage exhausted its attempt budget without
    /// satisfying the collision-free constraint. Partial state is discarded.
    CapacityExceeded { what: &'static str, attempts: usize },
    /// A caller-supplied value is outside its valid domain (spreading factor
    /// without an SNR entry, non-positive power, coincident node pair, ...).
    InvalidParameter(String),
    /// The geometry kernel could not evaluate a bounds or ray query,
    /// typically because the mesh is malformed.
    GeometryQueryFailure(String),
}

impl std::fmt::Display for PlanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanError::CapacityExceeded { what, attempts } => {
                write!(f, "Could not place {} within {} attempts", what, attempts)
            }
            PlanError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PlanError::GeometryQueryFailure(msg) => write!(f, "Geometry query failed: {}", msg),
        }
    }
}

impl std::error::Error for PlanError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = PlanError::CapacityExceeded { what: "obstacles", attempts: 500 };
        let msg = err.to_string();
        assert!(msg.contains("obstacles"));
        assert!(msg.contains("500"));
    }
}
