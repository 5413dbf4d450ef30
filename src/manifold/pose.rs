//! Position + unit quaternion pose.
//!
//! State: `[px, py, pz, qx, qy, qz, qw]` (7), increment: `[δp, δθ]` (6).
//!
//! Translation and rotation are updated independently: the position by plain vector
//! addition (not the SE(3) coupled update), the quaternion exactly as
//! [`QuaternionParameterization`](crate::manifold::QuaternionParameterization).

use crate::error::ManifoldResult;
use crate::manifold::rotation::{
    quaternion_from_coeffs, quaternion_plus_jacobian, quaternion_retract,
};
use crate::manifold::{
    LocalParameterization, ParameterizationType, check_unit_norm, jacobian_slices, plus_slices,
};
use crate::options::{JacobianModel, ParameterizationOptions};
use nalgebra::{SMatrix, SVector, Vector3, Vector6};

/// Stored pose vector.
pub type PoseVector = SVector<f64, 7>;
/// 7×6 pose Jacobian.
pub type PoseJacobian = SMatrix<f64, 7, 6>;

/// Local parameterization of a position + quaternion pose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseParameterization {
    options: ParameterizationOptions,
}

impl PoseParameterization {
    /// Ambient (stored) size.
    pub const AMBIENT_SIZE: usize = 7;
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
    ///
    /// # Notes
    /// p' = p + δp
    /// q' = normalize(q ⊗ (1, δθ/2))
    pub fn retract(&self, x: &PoseVector, delta: &Vector6<f64>) -> ManifoldResult<PoseVector> {
        let q = quaternion_from_coeffs(&x.fixed_rows::<4>(3).into_owned());
        check_unit_norm(&self.options, ParameterizationType::Pose, q.norm())?;

        let position = x.fixed_rows::<3>(0) + delta.fixed_rows::<3>(0);
        let rotation_delta: Vector3<f64> = delta.fixed_rows::<3>(3).into_owned();
        let rotation = quaternion_retract(&q, &rotation_delta);

        let mut out = PoseVector::zeros();
        out.fixed_rows_mut::<3>(0).copy_from(&position);
        out.fixed_rows_mut::<4>(3).copy_from(&rotation.coords);
        Ok(out)
    }

    /// Jacobian on fixed-size vectors.
    ///
    /// [`JacobianModel::Constant`]: top 6 rows identity, last row zero.
    /// [`JacobianModel::Analytic`]: `I₃` for the position block and the quaternion
    /// plus-Jacobian for the rotation block.
    pub fn jacobian(&self, x: &PoseVector) -> ManifoldResult<PoseJacobian> {
        let mut j = PoseJacobian::zeros();
        match self.options.jacobian {
            JacobianModel::Constant => {
                j.fixed_view_mut::<6, 6>(0, 0).fill_with_identity();
            }
            JacobianModel::Analytic => {
                let q = quaternion_from_coeffs(&x.fixed_rows::<4>(3).into_owned());
                check_unit_norm(&self.options, ParameterizationType::Pose, q.norm())?;
                j.fixed_view_mut::<3, 3>(0, 0).fill_with_identity();
                j.fixed_view_mut::<4, 3>(3, 3)
                    .copy_from(&quaternion_plus_jacobian(&q));
            }
        }
        Ok(j)
    }
}

impl LocalParameterization for PoseParameterization {
    fn ambient_size(&self) -> usize {
        Self::AMBIENT_SIZE
    }

    fn local_size(&self) -> usize {
        Self::LOCAL_SIZE
    }

    fn plus(&self, x: &[f64], delta: &[f64], x_plus_delta: &mut [f64]) -> ManifoldResult<()> {
        plus_slices::<7, 6>(x, delta, x_plus_delta, |x, delta| self.retract(x, delta))
    }

    fn compute_jacobian(&self, x: &[f64], jacobian: &mut [f64]) -> ManifoldResult<()> {
        jacobian_slices::<7, 6>(x, jacobian, |x| self.jacobian(x))
    }
}
