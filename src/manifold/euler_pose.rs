//! Position + roll-pitch-yaw pose.
//!
//! State: `[px, py, pz, θ₀, θ₁, θ₂]` (6), increment: `[δp, δθ]` (6).
//!
//! The orientation is updated by composing on the rotation-matrix level and
//! re-extracting angles:
//!
//! ```text
//! R' = R(θ) · Rx(δθ₀) · Ry(δθ₁) · Rz(δθ₂)
//! θ' = euler(R')
//! ```
//!
//! Extraction breaks down at the gimbal lock (θ₁ = ±π/2). By default that is left
//! unchecked; see [`ValidationPolicy`](crate::options::ValidationPolicy).

use crate::error::ManifoldResult;
use crate::manifold::rotation::{
    euler_rate_from_body_rate, euler_to_rotation, incremental_rotation, rotation_to_euler,
    sin_pitch,
};
use crate::manifold::{
    LocalParameterization, ParameterizationType, check_gimbal_lock, jacobian_slices, plus_slices,
};
use crate::options::{JacobianModel, ParameterizationOptions};
use nalgebra::{Matrix6, Vector3, Vector6};

/// Local parameterization of a position + Euler-angle pose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerPoseParameterization {
    options: ParameterizationOptions,
}

impl EulerPoseParameterization {
    /// Ambient (stored) size.
    pub const AMBIENT_SIZE: usize = 6;
    /// Tangent size.
    pub const LOCAL_SIZE: usize = 6;

    /// Create a parameterization with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parameterization with explicit options.
    pub fn with_options(options: ParameterizationOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> &ParameterizationOptions {
        &self.options
    }

    /// Retraction on fixed-size vectors.
    pub fn retract(&self, x: &Vector6<f64>, delta: &Vector6<f64>) -> ManifoldResult<Vector6<f64>> {
        let angles: Vector3<f64> = x.fixed_rows::<3>(3).into_owned();
        let rotation_delta: Vector3<f64> = delta.fixed_rows::<3>(3).into_owned();

        let rotation = euler_to_rotation(&angles) * incremental_rotation(&rotation_delta);
        check_gimbal_lock(
            &self.options,
            ParameterizationType::EulerPose,
            sin_pitch(&rotation),
        )?;

        let mut out = Vector6::zeros();
        out.fixed_rows_mut::<3>(0)
            .copy_from(&(x.fixed_rows::<3>(0) + delta.fixed_rows::<3>(0)));
        out.fixed_rows_mut::<3>(3)
            .copy_from(&rotation_to_euler(&rotation));
        Ok(out)
    }

    /// Jacobian on fixed-size vectors.
    ///
    /// [`JacobianModel::Constant`] treats the state as a flat vector and returns `I₆`.
    /// [`JacobianModel::Analytic`] returns `diag(I₃, E⁻¹(θ))`, the derivative of the
    /// retraction at zero increment, which diverges at the gimbal lock.
    pub fn jacobian(&self, x: &Vector6<f64>) -> ManifoldResult<Matrix6<f64>> {
        match self.options.jacobian {
            JacobianModel::Constant => Ok(Matrix6::identity()),
            JacobianModel::Analytic => {
                let angles: Vector3<f64> = x.fixed_rows::<3>(3).into_owned();
                check_gimbal_lock(
                    &self.options,
                    ParameterizationType::EulerPose,
                    angles[1].sin(),
                )?;
                let mut j = Matrix6::identity();
                j.fixed_view_mut::<3, 3>(3, 3)
                    .copy_from(&euler_rate_from_body_rate(&angles));
                Ok(j)
            }
        }
    }
}

impl LocalParameterization for EulerPoseParameterization {
    fn ambient_size(&self) -> usize {
        Self::AMBIENT_SIZE
    }

    fn local_size(&self) -> usize {
        Self::LOCAL_SIZE
    }

    fn plus(&self, x: &[f64], delta: &[f64], x_plus_delta: &mut [f64]) -> ManifoldResult<()> {
        plus_slices::<6, 6>(x, delta, x_plus_delta, |x, delta| self.retract(x, delta))
    }

    fn compute_jacobian(&self, x: &[f64], jacobian: &mut [f64]) -> ManifoldResult<()> {
        jacobian_slices::<6, 6>(x, jacobian, |x| self.jacobian(x))
    }
}
