//! Orthonormal representation of a 3D line.
//!
//! A line with Plücker coordinates `(n, d)` (moment, direction, `n ⟂ d`) is defined up
//! to scale by four numbers:
//!
//! - `θ = [θ₀, θ₁, θ₂]`: roll-pitch-yaw of `U = [n/‖n‖, d/‖d‖, n×d/‖n×d‖] ∈ SO(3)`
//! - `φ`: angle of `W = [[cos φ, -sin φ], [sin φ, cos φ]] ∈ SO(2)` with
//!   `(cos φ, sin φ) ∝ (‖n‖, ‖d‖)`
//!
//! The retraction updates both rotations on the right and re-extracts the angles:
//!
//! ```text
//! U' = U · Rx(δθ₀) · Ry(δθ₁) · Rz(δθ₂)      θ' = euler(U')
//! W' = W · W(δφ)                            φ' = asin(W'[1,0])  or  atan2(W'[1,0], W'[0,0])
//! ```

use crate::error::{ManifoldError, ManifoldResult};
use crate::manifold::rotation::{
    euler_rate_from_body_rate, euler_to_rotation, incremental_rotation, planar_rotation,
    random_euler_angles, rotation_to_euler, sin_pitch,
};
use crate::manifold::{
    LocalParameterization, ParameterizationType, check_gimbal_lock, jacobian_slices, plus_slices,
};
use crate::options::{JacobianModel, ParameterizationOptions, PhaseRecovery};
use nalgebra::{Matrix2, Matrix3, Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this norm a Plücker moment or direction counts as zero.
const PLUCKER_EPSILON: f64 = 1e-10;
/// Largest accepted `|n̂ · d̂|` for a Plücker pair.
const ORTHOGONALITY_TOLERANCE: f64 = 1e-6;

/// A 3D line in orthonormal form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrthonormalLine {
    /// Roll-pitch-yaw of `U`
    theta: Vector3<f64>,
    /// Angle of `W`
    phi: f64,
}

impl fmt::Display for OrthonormalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OrthonormalLine(theta: [{:.4}, {:.4}, {:.4}], phi: {:.4})",
            self.theta.x, self.theta.y, self.theta.z, self.phi
        )
    }
}

impl OrthonormalLine {
    /// Create a line from its angles.
    pub fn new(theta: Vector3<f64>, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Create a line from the stored `[θ₀, θ₁, θ₂, φ]` vector.
    pub fn from_vector(x: &Vector4<f64>) -> Self {
        Self::new(Vector3::new(x[0], x[1], x[2]), x[3])
    }

    /// Stored `[θ₀, θ₁, θ₂, φ]` vector.
    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.theta.x, self.theta.y, self.theta.z, self.phi)
    }

    /// Angles of `U`.
    pub fn theta(&self) -> Vector3<f64> {
        self.theta
    }

    /// Angle of `W`.
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// The SO(3) factor `U`.
    pub fn u(&self) -> Matrix3<f64> {
        euler_to_rotation(&self.theta)
    }

    /// The SO(2) factor `W`.
    pub fn w(&self) -> Matrix2<f64> {
        planar_rotation(self.phi)
    }

    /// Convert Plücker coordinates to orthonormal form.
    ///
    /// # Arguments
    /// * `moment` - `n = p × d` for any point `p` on the line
    /// * `direction` - Line direction `d`
    ///
    /// # Errors
    /// [`ManifoldError::DegenerateLine`] when either vector vanishes (a line through
    /// the origin, or no direction) or when the pair violates `n ⟂ d`.
    pub fn from_plucker(moment: &Vector3<f64>, direction: &Vector3<f64>) -> ManifoldResult<Self> {
        let n_norm = moment.norm();
        let d_norm = direction.norm();
        if n_norm < PLUCKER_EPSILON {
            return Err(ManifoldError::DegenerateLine(format!(
                "moment norm {n_norm:.3e} is zero; the line passes through the origin"
            )));
        }
        if d_norm < PLUCKER_EPSILON {
            return Err(ManifoldError::DegenerateLine(format!(
                "direction norm {d_norm:.3e} is zero"
            )));
        }

        let u1 = moment / n_norm;
        let u2 = direction / d_norm;
        let cosine = u1.dot(&u2);
        if cosine.abs() > ORTHOGONALITY_TOLERANCE {
            return Err(ManifoldError::DegenerateLine(format!(
                "moment and direction are not orthogonal (cos = {cosine:.3e})"
            )));
        }
        let u3 = u1.cross(&u2);
        let u = Matrix3::from_columns(&[u1, u2, u3]);

        let scale = (n_norm * n_norm + d_norm * d_norm).sqrt();
        let phi = (d_norm / scale).asin();
        Ok(Self::new(rotation_to_euler(&u), phi))
    }

    /// Convert to a Plücker pair `(n, d)` with `‖n‖² + ‖d‖² = 1`.
    pub fn to_plucker(&self) -> (Vector3<f64>, Vector3<f64>) {
        let u = self.u();
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let moment = u.column(0) * cos_phi;
        let direction = u.column(1) * sin_phi;
        (moment, direction)
    }

    /// Random line away from the gimbal lock with `φ ∈ (0, π/2)` (useful for testing).
    pub fn random() -> Self {
        let phi = 0.05 + rand::random::<f64>() * (std::f64::consts::FRAC_PI_2 - 0.1);
        Self::new(random_euler_angles(0.05), phi)
    }
}

/// Local parameterization of an [`OrthonormalLine`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrthonormalLineParameterization {
    options: ParameterizationOptions,
}

impl OrthonormalLineParameterization {
    /// Ambient (stored) size.
    pub const AMBIENT_SIZE: usize = 4;
    /// Tangent size.
    pub const LOCAL_SIZE: usize = 4;

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

    /// Retraction on the line type.
    pub fn retract_line(
        &self,
        line: &OrthonormalLine,
        delta: &Vector4<f64>,
    ) -> ManifoldResult<OrthonormalLine> {
        let rotation_delta = Vector3::new(delta[0], delta[1], delta[2]);
        let u = line.u() * incremental_rotation(&rotation_delta);
        let w = line.w() * planar_rotation(delta[3]);

        check_gimbal_lock(
            &self.options,
            ParameterizationType::OrthonormalLine,
            sin_pitch(&u),
        )?;

        let phi = match self.options.phase_recovery {
            // Loses the sign of W[0,0]: φ with cos φ < 0 comes back as π - φ.
            PhaseRecovery::Asin => w[(1, 0)].asin(),
            PhaseRecovery::Atan2 => w[(1, 0)].atan2(w[(0, 0)]),
        };
        Ok(OrthonormalLine::new(rotation_to_euler(&u), phi))
    }

    /// Retraction on fixed-size vectors.
    pub fn retract(&self, x: &Vector4<f64>, delta: &Vector4<f64>) -> ManifoldResult<Vector4<f64>> {
        Ok(self
            .retract_line(&OrthonormalLine::from_vector(x), delta)?
            .to_vector())
    }

    /// Jacobian on fixed-size vectors.
    ///
    /// [`JacobianModel::Constant`] returns `I₄`. [`JacobianModel::Analytic`] returns
    /// `diag(E⁻¹(θ), ∂φ'/∂δφ)`, where the phase entry is `1` with `atan2` recovery and
    /// `sign(cos φ)` with `asin` recovery.
    pub fn jacobian(&self, x: &Vector4<f64>) -> ManifoldResult<Matrix4<f64>> {
        match self.options.jacobian {
            JacobianModel::Constant => Ok(Matrix4::identity()),
            JacobianModel::Analytic => {
                let line = OrthonormalLine::from_vector(x);
                check_gimbal_lock(
                    &self.options,
                    ParameterizationType::OrthonormalLine,
                    line.theta[1].sin(),
                )?;
                let mut j = Matrix4::zeros();
                j.fixed_view_mut::<3, 3>(0, 0)
                    .copy_from(&euler_rate_from_body_rate(&line.theta));
                j[(3, 3)] = match self.options.phase_recovery {
                    PhaseRecovery::Atan2 => 1.0,
                    PhaseRecovery::Asin => {
                        if line.phi.cos() < 0.0 {
                            -1.0
                        } else {
                            1.0
                        }
                    }
                };
                Ok(j)
            }
        }
    }
}

impl LocalParameterization for OrthonormalLineParameterization {
    fn ambient_size(&self) -> usize {
        Self::AMBIENT_SIZE
    }

    fn local_size(&self) -> usize {
        Self::LOCAL_SIZE
    }

    fn plus(&self, x: &[f64], delta: &[f64], x_plus_delta: &mut [f64]) -> ManifoldResult<()> {
        plus_slices::<4, 4>(x, delta, x_plus_delta, |x, delta| self.retract(x, delta))
    }

    fn compute_jacobian(&self, x: &[f64], jacobian: &mut [f64]) -> ManifoldResult<()> {
        jacobian_slices::<4, 4>(x, jacobian, |x| self.jacobian(x))
    }
}
