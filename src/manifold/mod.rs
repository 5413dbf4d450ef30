//! Local parameterizations for optimization variables on non-Euclidean spaces.
//!
//! A local parameterization tells a least-squares solver how to update a state that
//! is stored in more coordinates than it has degrees of freedom:
//!
//! Parameterization   | ambient | local | state layout             | increment layout
//! ------------------ | ------- | ----- | ------------------------ | ----------------------
//! Quaternion         | 4       | 3     | [qx, qy, qz, qw]         | [δθx, δθy, δθz]
//! Pose               | 7       | 6     | [px, py, pz, qx, qy, qz, qw] | [δp, δθ]
//! Euler pose         | 6       | 6     | [px, py, pz, roll, pitch, yaw] | [δp, δθ]
//! Orthonormal line   | 4       | 4     | [θ₀, θ₁, θ₂, φ]          | [δθ₀, δθ₁, δθ₂, δφ]
//!
//! Every parameterization provides two operations:
//! - `plus(x, δ)`: the retraction x ⊞ δ, written into a caller-owned buffer
//! - `compute_jacobian(x)`: the row-major `ambient × local` matrix the solver uses to
//!   map ambient-space Jacobians to the tangent space
//!
//! The operators hold nothing but their [`ParameterizationOptions`], so one instance
//! can be shared between threads and called concurrently on disjoint buffers.
//!
//! # Example
//!
//! ```
//! use local_parameterization::manifold::{LocalParameterization, ParameterizationType};
//! use local_parameterization::ParameterizationOptions;
//!
//! let param = ParameterizationType::Pose.build(ParameterizationOptions::default());
//! let x = [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 1.0];
//! let delta = [0.1, 0.0, 0.0, 0.0, 0.0, 0.0];
//! let mut x_plus_delta = [0.0; 7];
//! param.plus(&x, &delta, &mut x_plus_delta).unwrap();
//! assert!((x_plus_delta[0] - 1.1).abs() < 1e-12);
//! ```

use crate::error::{Buffer, ManifoldError, ManifoldResult, check_len};
use crate::options::{ParameterizationOptions, ValidationPolicy};
use nalgebra::{DMatrix, DVector, SMatrix, SVector};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use tracing::{debug, warn};

pub mod euler_pose;
pub mod orthonormal_line;
pub mod pose;
pub mod quaternion;
pub mod rotation;

pub use euler_pose::EulerPoseParameterization;
pub use orthonormal_line::{OrthonormalLine, OrthonormalLineParameterization};
pub use pose::PoseParameterization;
pub use quaternion::QuaternionParameterization;

/// Retraction and Jacobian over flat, caller-owned buffers.
///
/// This is the interface a solver sees. Buffer lengths are always checked; all other
/// validation is governed by the implementor's [`ParameterizationOptions`].
pub trait LocalParameterization: Debug + Send + Sync {
    /// Number of coordinates in the stored state.
    fn ambient_size(&self) -> usize;

    /// Number of degrees of freedom (length of the increment).
    fn local_size(&self) -> usize;

    /// Compute `x_plus_delta = x ⊞ delta`.
    ///
    /// # Arguments
    /// * `x` - Current state, `ambient_size()` values
    /// * `delta` - Tangent increment, `local_size()` values
    /// * `x_plus_delta` - Output buffer, `ambient_size()` values
    fn plus(&self, x: &[f64], delta: &[f64], x_plus_delta: &mut [f64]) -> ManifoldResult<()>;

    /// Write the row-major `ambient_size() × local_size()` Jacobian at `x`.
    fn compute_jacobian(&self, x: &[f64], jacobian: &mut [f64]) -> ManifoldResult<()>;

    /// Convenience wrapper around [`plus`](Self::plus) returning an owned vector.
    fn plus_vec(&self, x: &DVector<f64>, delta: &DVector<f64>) -> ManifoldResult<DVector<f64>> {
        let mut out = DVector::zeros(self.ambient_size());
        self.plus(x.as_slice(), delta.as_slice(), out.as_mut_slice())?;
        Ok(out)
    }

    /// Convenience wrapper around [`compute_jacobian`](Self::compute_jacobian)
    /// returning an owned matrix.
    fn jacobian_matrix(&self, x: &DVector<f64>) -> ManifoldResult<DMatrix<f64>> {
        let (rows, cols) = (self.ambient_size(), self.local_size());
        let mut row_major = vec![0.0; rows * cols];
        self.compute_jacobian(x.as_slice(), &mut row_major)?;
        Ok(DMatrix::from_row_slice(rows, cols, &row_major))
    }
}

/// Geometric type of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterizationType {
    /// Unit quaternion orientation
    Quaternion,
    /// Position + unit quaternion
    Pose,
    /// Position + roll-pitch-yaw
    EulerPose,
    /// Orthonormal 3D line
    OrthonormalLine,
}

impl ParameterizationType {
    /// Length of the stored state.
    pub fn ambient_size(&self) -> usize {
        match self {
            ParameterizationType::Quaternion => 4,
            ParameterizationType::Pose => 7,
            ParameterizationType::EulerPose => 6,
            ParameterizationType::OrthonormalLine => 4,
        }
    }

    /// Length of the tangent increment.
    pub fn local_size(&self) -> usize {
        match self {
            ParameterizationType::Quaternion => 3,
            ParameterizationType::Pose => 6,
            ParameterizationType::EulerPose => 6,
            ParameterizationType::OrthonormalLine => 4,
        }
    }

    /// Build the matching parameterization.
    pub fn build(&self, options: ParameterizationOptions) -> Box<dyn LocalParameterization> {
        match self {
            ParameterizationType::Quaternion => {
                Box::new(QuaternionParameterization::with_options(options))
            }
            ParameterizationType::Pose => Box::new(PoseParameterization::with_options(options)),
            ParameterizationType::EulerPose => {
                Box::new(EulerPoseParameterization::with_options(options))
            }
            ParameterizationType::OrthonormalLine => {
                Box::new(OrthonormalLineParameterization::with_options(options))
            }
        }
    }
}

impl fmt::Display for ParameterizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterizationType::Quaternion => "quaternion",
            ParameterizationType::Pose => "pose",
            ParameterizationType::EulerPose => "euler-pose",
            ParameterizationType::OrthonormalLine => "orthonormal-line",
        };
        f.write_str(name)
    }
}

/// Apply the validation policy to a detected edge case.
///
/// Returns `Ok(())` when the caller should carry on with the unchecked result.
pub(crate) fn report_edge_case(
    options: &ParameterizationOptions,
    kind: ParameterizationType,
    error: ManifoldError,
) -> ManifoldResult<()> {
    match options.validation {
        ValidationPolicy::Unchecked => Ok(()),
        ValidationPolicy::Warn => {
            warn!(parameterization = %kind, "{error}; using unchecked result");
            Ok(())
        }
        ValidationPolicy::Strict => {
            debug!(parameterization = %kind, "rejecting input: {error}");
            Err(error)
        }
    }
}

/// Check a quaternion's norm against the options' tolerance.
pub(crate) fn check_unit_norm(
    options: &ParameterizationOptions,
    kind: ParameterizationType,
    norm: f64,
) -> ManifoldResult<()> {
    if !options.checks_enabled() {
        return Ok(());
    }
    let tolerance = options.unit_norm_tolerance;
    if (norm - 1.0).abs() > tolerance || !norm.is_finite() {
        report_edge_case(
            options,
            kind,
            ManifoldError::NonUnitQuaternion { norm, tolerance },
        )?;
    }
    Ok(())
}

/// Check `sin(pitch)` against the options' gimbal-lock threshold.
pub(crate) fn check_gimbal_lock(
    options: &ParameterizationOptions,
    kind: ParameterizationType,
    sin_pitch: f64,
) -> ManifoldResult<()> {
    if !options.checks_enabled() {
        return Ok(());
    }
    let epsilon = options.singularity_epsilon;
    if sin_pitch.abs() > 1.0 - epsilon {
        report_edge_case(
            options,
            kind,
            ManifoldError::DegenerateRotation { sin_pitch, epsilon },
        )?;
    }
    Ok(())
}

/// Run a fixed-size retraction over flat buffers.
pub(crate) fn plus_slices<const A: usize, const L: usize>(
    x: &[f64],
    delta: &[f64],
    x_plus_delta: &mut [f64],
    retract: impl FnOnce(&SVector<f64, A>, &SVector<f64, L>) -> ManifoldResult<SVector<f64, A>>,
) -> ManifoldResult<()> {
    check_len(Buffer::State, A, x.len())?;
    check_len(Buffer::Delta, L, delta.len())?;
    check_len(Buffer::Output, A, x_plus_delta.len())?;

    let state = SVector::<f64, A>::from_column_slice(x);
    let increment = SVector::<f64, L>::from_column_slice(delta);
    let result = retract(&state, &increment)?;
    x_plus_delta.copy_from_slice(result.as_slice());
    Ok(())
}

/// Run a fixed-size Jacobian over flat buffers, writing it row-major.
pub(crate) fn jacobian_slices<const A: usize, const L: usize>(
    x: &[f64],
    jacobian: &mut [f64],
    compute: impl FnOnce(&SVector<f64, A>) -> ManifoldResult<SMatrix<f64, A, L>>,
) -> ManifoldResult<()> {
    check_len(Buffer::State, A, x.len())?;
    check_len(Buffer::Jacobian, A * L, jacobian.len())?;

    let state = SVector::<f64, A>::from_column_slice(x);
    let matrix = compute(&state)?;
    // nalgebra is column-major; the transpose's storage is the row-major layout.
    jacobian.copy_from_slice(matrix.transpose().as_slice());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::options::ParameterizationOptions;
    use nalgebra::{Matrix2x3, Vector2, Vector3};

    #[test]
    fn test_parameterization_type_sizes() {
        for kind in [
            ParameterizationType::Quaternion,
            ParameterizationType::Pose,
            ParameterizationType::EulerPose,
            ParameterizationType::OrthonormalLine,
        ] {
            let param = kind.build(ParameterizationOptions::default());
            assert_eq!(param.ambient_size(), kind.ambient_size());
            assert_eq!(param.local_size(), kind.local_size());
        }
    }

    #[test]
    fn test_parameterization_type_display() {
        assert_eq!(ParameterizationType::EulerPose.to_string(), "euler-pose");
        assert_eq!(
            ParameterizationType::OrthonormalLine.to_string(),
            "orthonormal-line"
        );
    }

    #[test]
    fn test_plus_slices_checks_lengths() {
        let retract = |x: &Vector2<f64>, d: &Vector3<f64>| -> ManifoldResult<Vector2<f64>> {
            Ok(Vector2::new(x[0] + d[0], x[1] + d[1]))
        };
        let mut out = [0.0; 2];
        assert!(plus_slices(&[1.0, 2.0], &[0.5, 0.5, 0.5], &mut out, retract).is_ok());
        assert_eq!(out, [1.5, 2.5]);

        let err = plus_slices(&[1.0, 2.0], &[0.5, 0.5], &mut out, retract).unwrap_err();
        assert_eq!(
            err,
            ManifoldError::DimensionMismatch {
                buffer: Buffer::Delta,
                expected: 3,
                actual: 2,
            }
        );

        let mut short = [0.0; 1];
        let err = plus_slices(&[1.0, 2.0], &[0.5, 0.5, 0.5], &mut short, retract).unwrap_err();
        assert!(matches!(
            err,
            ManifoldError::DimensionMismatch {
                buffer: Buffer::Output,
                ..
            }
        ));
    }

    #[test]
    fn test_jacobian_slices_row_major() {
        let mut out = [0.0; 6];
        jacobian_slices::<2, 3>(&[0.0, 0.0], &mut out, |_| {
            Ok(Matrix2x3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0))
        })
        .unwrap();
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_report_edge_case_policies() {
        let error = ManifoldError::DegenerateRotation {
            sin_pitch: 1.0,
            epsilon: 1e-9,
        };
        let kind = ParameterizationType::EulerPose;

        let unchecked = ParameterizationOptions::default();
        assert!(report_edge_case(&unchecked, kind, error.clone()).is_ok());

        let warn = unchecked.with_validation(ValidationPolicy::Warn);
        assert!(report_edge_case(&warn, kind, error.clone()).is_ok());

        let strict = unchecked.with_validation(ValidationPolicy::Strict);
        assert_eq!(report_edge_case(&strict, kind, error.clone()), Err(error));
    }

    #[test]
    fn test_check_unit_norm() {
        let kind = ParameterizationType::Quaternion;
        let strict = ParameterizationOptions::default().with_validation(ValidationPolicy::Strict);
        assert!(check_unit_norm(&strict, kind, 1.0 + 1e-9).is_ok());
        assert!(check_unit_norm(&strict, kind, 1.1).is_err());
        assert!(check_unit_norm(&strict, kind, f64::NAN).is_err());
        assert!(check_unit_norm(&ParameterizationOptions::default(), kind, 0.0).is_ok());
    }

    #[test]
    fn test_check_gimbal_lock() {
        let kind = ParameterizationType::EulerPose;
        let strict = ParameterizationOptions::default().with_validation(ValidationPolicy::Strict);
        assert!(check_gimbal_lock(&strict, kind, 0.99).is_ok());
        assert!(check_gimbal_lock(&strict, kind, -1.0).is_err());
        assert!(check_gimbal_lock(&ParameterizationOptions::default(), kind, 1.0).is_ok());
    }
}
