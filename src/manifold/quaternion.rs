//! Unit quaternion orientation on S³.
//!
//! State: `[x, y, z, w]` (4), increment: small rotation vector `δθ` (3).
//!
//! The retraction uses the first-order increment `dq = (1, δθ/2)` instead of the
//! exponential map and normalizes after composing. This is cheaper than `exp` and
//! agrees with it to second order, so solvers must keep per-iteration steps small.

use crate::error::ManifoldResult;
use crate::manifold::rotation::{
    quaternion_from_coeffs, quaternion_plus_jacobian, quaternion_retract,
};
use crate::manifold::{
    LocalParameterization, ParameterizationType, check_unit_norm, jacobian_slices, plus_slices,
};
use crate::options::{JacobianModel, ParameterizationOptions};
use nalgebra::{Matrix4x3, Vector3, Vector4};

/// Local parameterization of a unit quaternion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuaternionParameterization {
    options: ParameterizationOptions,
}

impl QuaternionParameterization {
    /// Ambient (stored) size.
    pub const AMBIENT_SIZE: usize = 4;
    /// Tangent size.
    pub const LOCAL_SIZE: usize = 3;

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
    /// # Arguments
    /// * `x` - Quaternion coefficients `[x, y, z, w]`
    /// * `delta` - Rotation increment
    ///
    /// # Notes
    /// q' = normalize(q ⊗ (1, δθ/2))
    pub fn retract(&self, x: &Vector4<f64>, delta: &Vector3<f64>) -> ManifoldResult<Vector4<f64>> {
        let q = quaternion_from_coeffs(x);
        check_unit_norm(&self.options, ParameterizationType::Quaternion, q.norm())?;
        Ok(quaternion_retract(&q, delta).coords)
    }

    /// Jacobian on fixed-size vectors.
    ///
    /// With [`JacobianModel::Constant`] this is `[I₃; 0]` for every `x`. With
    /// [`JacobianModel::Analytic`] it is ∂(x ⊞ δ)/∂δ at δ = 0.
    pub fn jacobian(&self, x: &Vector4<f64>) -> ManifoldResult<Matrix4x3<f64>> {
        match self.options.jacobian {
            JacobianModel::Constant => Ok(constant_jacobian()),
            JacobianModel::Analytic => {
                let q = quaternion_from_coeffs(x);
                check_unit_norm(&self.options, ParameterizationType::Quaternion, q.norm())?;
                Ok(quaternion_plus_jacobian(&q))
            }
        }
    }
}

fn constant_jacobian() -> Matrix4x3<f64> {
    let mut j = Matrix4x3::zeros();
    j.fixed_view_mut::<3, 3>(0, 0).fill_with_identity();
    j
}

impl LocalParameterization for QuaternionParameterization {
    fn ambient_size(&self) -> usize {
        Self::AMBIENT_SIZE
    }

    fn local_size(&self) -> usize {
        Self::LOCAL_SIZE
    }

    fn plus(&self, x: &[f64], delta: &[f64], x_plus_delta: &mut [f64]) -> ManifoldResult<()> {
        plus_slices::<4, 3>(x, delta, x_plus_delta, |x, delta| self.retract(x, delta))
    }

    fn compute_jacobian(&self, x: &[f64], jacobian: &mut [f64]) -> ManifoldResult<()> {
        jacobian_slices::<4, 3>(x, jacobian, |x| self.jacobian(x))
    }
}
