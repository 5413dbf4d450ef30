//! Numerical policy shared by every parameterization.
//!
//! [`ParameterizationOptions::default()`] reproduces the behavior existing solver
//! pipelines were tuned against: no input validation, constant Jacobians and `asin`
//! phase recovery for the orthonormal line. Each deviation is opt-in.

use serde::{Deserialize, Serialize};

/// What to do with inputs that sit on a numerical edge case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValidationPolicy {
    /// Never inspect the inputs; every retraction succeeds
    #[default]
    Unchecked,
    /// Detect edge cases, log a warning and return the unchecked result
    Warn,
    /// Detect edge cases and return an error instead of a result
    Strict,
}

/// Which matrix `compute_jacobian` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JacobianModel {
    /// Constant identity-like blocks, independent of the state
    #[default]
    Constant,
    /// Derivative of `plus` with respect to the increment, evaluated at zero
    Analytic,
}

/// How the orthonormal line recovers its phase angle from the 2x2 rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhaseRecovery {
    /// `asin(W[1,0])`; folds angles with `cos(phi) < 0` into `[-pi/2, pi/2]`
    #[default]
    Asin,
    /// `atan2(W[1,0], W[0,0])`; full-circle recovery
    Atan2,
}

/// Options applied by a parameterization to every `plus` and `compute_jacobian` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterizationOptions {
    /// Edge-case handling
    pub validation: ValidationPolicy,
    /// Jacobian model
    pub jacobian: JacobianModel,
    /// Phase extraction for the orthonormal line
    pub phase_recovery: PhaseRecovery,
    /// Allowed `| |q| - 1 |` before a quaternion counts as non-unit
    pub unit_norm_tolerance: f64,
    /// Rotations with `|sin(pitch)| > 1 - singularity_epsilon` count as gimbal locked
    pub singularity_epsilon: f64,
}

impl Default for ParameterizationOptions {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::Unchecked,
            jacobian: JacobianModel::Constant,
            phase_recovery: PhaseRecovery::Asin,
            unit_norm_tolerance: 1e-6,
            singularity_epsilon: 1e-9,
        }
    }
}

impl ParameterizationOptions {
    /// Create options with the legacy defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validation policy.
    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    /// Set the Jacobian model.
    pub fn with_jacobian(mut self, jacobian: JacobianModel) -> Self {
        self.jacobian = jacobian;
        self
    }

    /// Set the phase recovery used by the orthonormal line.
    pub fn with_phase_recovery(mut self, phase_recovery: PhaseRecovery) -> Self {
        self.phase_recovery = phase_recovery;
        self
    }

    /// Set the unit-norm tolerance for quaternion inputs.
    pub fn with_unit_norm_tolerance(mut self, tolerance: f64) -> Self {
        self.unit_norm_tolerance = tolerance;
        self
    }

    /// Set the gimbal-lock threshold.
    pub fn with_singularity_epsilon(mut self, epsilon: f64) -> Self {
        self.singularity_epsilon = epsilon;
        self
    }

    /// Options with validation, analytic Jacobians and `atan2` phase recovery.
    pub fn corrected() -> Self {
        Self::default()
            .with_validation(ValidationPolicy::Strict)
            .with_jacobian(JacobianModel::Analytic)
            .with_phase_recovery(PhaseRecovery::Atan2)
    }

    pub(crate) fn checks_enabled(&self) -> bool {
        self.validation != ValidationPolicy::Unchecked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_legacy() {
        let options = ParameterizationOptions::default();
        assert_eq!(options.validation, ValidationPolicy::Unchecked);
        assert_eq!(options.jacobian, JacobianModel::Constant);
        assert_eq!(options.phase_recovery, PhaseRecovery::Asin);
        assert!(!options.checks_enabled());
    }

    #[test]
    fn test_builder_chain() {
        let options = ParameterizationOptions::new()
            .with_validation(ValidationPolicy::Warn)
            .with_unit_norm_tolerance(1e-3)
            .with_singularity_epsilon(1e-4);
        assert_eq!(options.validation, ValidationPolicy::Warn);
        assert_eq!(options.unit_norm_tolerance, 1e-3);
        assert_eq!(options.singularity_epsilon, 1e-4);
        assert!(options.checks_enabled());
    }

    #[test]
    fn test_corrected_preset() {
        let options = ParameterizationOptions::corrected();
        assert_eq!(options.validation, ValidationPolicy::Strict);
        assert_eq!(options.jacobian, JacobianModel::Analytic);
        assert_eq!(options.phase_recovery, PhaseRecovery::Atan2);
    }

    #[test]
    fn test_serde_roundtrip() -> Result<(), serde_json::Error> {
        let options = ParameterizationOptions::corrected().with_singularity_epsilon(1e-6);
        let json = serde_json::to_string(&options)?;
        let parsed: ParameterizationOptions = serde_json::from_str(&json)?;
        assert_eq!(parsed, options);
        Ok(())
    }
}
