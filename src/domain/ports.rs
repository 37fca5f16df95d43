use async_trait::async_trait;

use crate::domain::errors::PolicyError;
use crate::domain::state::{Observation, RawAction};

// Port for the external inference collaborator that maps an observation to an action.
// Loading and lifecycle of the backend live behind the implementation.
#[async_trait]
pub trait Policy: Send + Sync {
    fn name(&self) -> &str;
    async fn infer(&self, observation: Observation) -> Result<RawAction, PolicyError>;
}

// Stand-in used when no inference backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPolicy;

#[async_trait]
impl Policy for NoPolicy {
    fn name(&self) -> &str {
        "none"
    }

    async fn infer(&self, _observation: Observation) -> Result<RawAction, PolicyError> {
        Err(PolicyError::Unavailable)
    }
}

/// Checks that raw policy output is exactly two finite values.
///
/// Magnitudes are passed through untouched; limits are enforced by the vehicle model.
pub fn parse_raw_action(values: &[f64]) -> Result<RawAction, PolicyError> {
    let &[steer, accel] = values else {
        return Err(PolicyError::Malformed(format!(
            "expected 2 values, got {}",
            values.len()
        )));
    };
    if !steer.is_finite() || !accel.is_finite() {
        return Err(PolicyError::Malformed("non-finite action".to_string()));
    }
    Ok(RawAction { steer, accel })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_output_has_wrong_arity_then_it_is_malformed() {
        assert!(matches!(
            parse_raw_action(&[0.1]),
            Err(PolicyError::Malformed(_))
        ));
        assert!(matches!(
            parse_raw_action(&[0.1, 0.2, 0.3]),
            Err(PolicyError::Malformed(_))
        ));
    }

    #[test]
    fn when_output_is_not_finite_then_it_is_malformed() {
        assert!(matches!(
            parse_raw_action(&[f64::NAN, 0.2]),
            Err(PolicyError::Malformed(_))
        ));
    }

    #[test]
    fn when_output_overshoots_then_it_passes_through_unclipped() {
        let action = parse_raw_action(&[1.7, -3.0]).expect("finite output should pass");

        assert_eq!(action, RawAction { steer: 1.7, accel: -3.0 });
        assert_eq!(action.clipped(), RawAction { steer: 1.0, accel: -1.0 });
    }

    #[tokio::test]
    async fn when_no_policy_is_configured_then_it_is_unavailable() {
        let obs = Observation([0.0; 5]);

        assert_eq!(NoPolicy.infer(obs).await, Err(PolicyError::Unavailable));
    }
}
