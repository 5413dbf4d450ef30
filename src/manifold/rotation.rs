//! Closed-form rotation building blocks.
//!
//! Conventions used throughout the crate:
//!
//! - Quaternions are stored as `[x, y, z, w]`, the same order as nalgebra's
//!   `Quaternion::coords`, and multiplied with the Hamilton product.
//! - Euler angles `[θ₀, θ₁, θ₂]` are roll, pitch, yaw and build
//!   `R = Rz(θ₂) · Ry(θ₁) · Rx(θ₀)`.
//! - Tangent increments are applied on the right: `R' = R · Rx(δ₀) · Ry(δ₁) · Rz(δ₂)`.
//!   The order of the incremental factors is part of the contract; `Rz · Ry · Rx`
//!   gives different results for finite increments.

use nalgebra::{Matrix2, Matrix3, Matrix4x3, Quaternion, Vector3, Vector4};

/// Rotation about the X axis.
pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, c, -s, //
        0.0, s, c,
    )
}

/// Rotation about the Y axis.
pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, s, //
        0.0, 1.0, 0.0, //
        -s, 0.0, c,
    )
}

/// Rotation about the Z axis.
pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, 0.0, //
        s, c, 0.0, //
        0.0, 0.0, 1.0,
    )
}

/// Rotation matrix of roll-pitch-yaw angles, `Rz(θ₂) · Ry(θ₁) · Rx(θ₀)` written out.
pub fn euler_to_rotation(angles: &Vector3<f64>) -> Matrix3<f64> {
    let (s1, c1) = angles[0].sin_cos();
    let (s2, c2) = angles[1].sin_cos();
    let (s3, c3) = angles[2].sin_cos();
    Matrix3::new(
        c2 * c3,
        s1 * s2 * c3 - c1 * s3,
        c1 * s2 * c3 + s1 * s3,
        c2 * s3,
        s1 * s2 * s3 + c1 * c3,
        c1 * s2 * s3 - s1 * c3,
        -s2,
        s1 * c2,
        c1 * c2,
    )
}

/// Incremental rotation `Rx(δ₀) · Ry(δ₁) · Rz(δ₂)`.
pub fn incremental_rotation(delta: &Vector3<f64>) -> Matrix3<f64> {
    rotation_x(delta[0]) * rotation_y(delta[1]) * rotation_z(delta[2])
}

/// Recover roll-pitch-yaw from the columns `u1, u2, u3` of `rotation`:
///
/// ```text
/// θ₀ = atan2(u2.z, u3.z)
/// θ₁ = asin(-u1.z)
/// θ₂ = atan2(u1.y, u1.x)
/// ```
///
/// Only well defined while `|u1.z| < 1`. At the gimbal lock both atan2 arguments
/// vanish and roll and yaw can no longer be separated.
pub fn rotation_to_euler(rotation: &Matrix3<f64>) -> Vector3<f64> {
    let u1 = rotation.column(0);
    let u2 = rotation.column(1);
    let u3 = rotation.column(2);
    Vector3::new(u2[2].atan2(u3[2]), (-u1[2]).asin(), u1[1].atan2(u1[0]))
}

/// `sin(pitch)` of a rotation, i.e. `-u1.z`. Its magnitude reaching 1 marks gimbal lock.
pub fn sin_pitch(rotation: &Matrix3<f64>) -> f64 {
    -rotation[(2, 0)]
}

/// 2D rotation `[[cos φ, -sin φ], [sin φ, cos φ]]`.
pub fn planar_rotation(phi: f64) -> Matrix2<f64> {
    let (s, c) = phi.sin_cos();
    Matrix2::new(c, -s, s, c)
}

/// First-order increment quaternion `(w = 1, v = δ/2)`, deliberately left unnormalized.
pub fn delta_quaternion(delta: &Vector3<f64>) -> Quaternion<f64> {
    let half = delta * 0.5;
    Quaternion::new(1.0, half.x, half.y, half.z)
}

/// Build a quaternion from `[x, y, z, w]` coefficients without normalizing.
pub fn quaternion_from_coeffs(coeffs: &Vector4<f64>) -> Quaternion<f64> {
    Quaternion::from_vector(*coeffs)
}

/// `normalize(q · dq(δ))`, the quaternion retraction.
///
/// The product is formed from the raw coefficients and normalized afterwards, so an
/// input that has drifted off the unit sphere is pulled back onto it.
pub fn quaternion_retract(q: &Quaternion<f64>, delta: &Vector3<f64>) -> Quaternion<f64> {
    (q * delta_quaternion(delta)).normalize()
}

/// Derivative of `normalize(q · dq(δ))` with respect to `δ` at `δ = 0`, for a unit `q`,
/// with rows in `[x, y, z, w]` order.
pub fn quaternion_plus_jacobian(q: &Quaternion<f64>) -> Matrix4x3<f64> {
    let (x, y, z, w) = (q.i, q.j, q.k, q.w);
    Matrix4x3::new(
        w, -z, y, //
        z, w, -x, //
        -y, x, w, //
        -x, -y, -z,
    ) * 0.5
}

/// Map from a right-side angular increment to roll-pitch-yaw rates.
///
/// For `R(θ + dθ) ≈ R(θ) · (I + [ω]×)` this returns `E⁻¹(θ)` with `dθ = E⁻¹(θ) ω`:
///
/// ```text
/// [ 1   sin θ₀ tan θ₁   cos θ₀ tan θ₁ ]
/// [ 0   cos θ₀         -sin θ₀        ]
/// [ 0   sin θ₀ / cos θ₁ cos θ₀ / cos θ₁ ]
/// ```
///
/// Entries diverge as `cos θ₁ → 0`.
pub fn euler_rate_from_body_rate(angles: &Vector3<f64>) -> Matrix3<f64> {
    let (s0, c0) = angles[0].sin_cos();
    let c1 = angles[1].cos();
    let t1 = angles[1].tan();
    Matrix3::new(
        1.0,
        s0 * t1,
        c0 * t1,
        0.0,
        c0,
        -s0,
        0.0,
        s0 / c1,
        c0 / c1,
    )
}

/// Random unit quaternion as `[x, y, z, w]` (useful for testing and benchmarks).
pub fn random_unit_quaternion() -> Vector4<f64> {
    let axis_angle = Vector3::new(
        rand::random::<f64>() * 2.0 - 1.0,
        rand::random::<f64>() * 2.0 - 1.0,
        rand::random::<f64>() * 2.0 - 1.0,
    ) * std::f64::consts::PI;
    nalgebra::UnitQuaternion::from_scaled_axis(axis_angle).into_inner().coords
}

/// Random roll-pitch-yaw angles with pitch kept `margin` away from ±π/2.
pub fn random_euler_angles(margin: f64) -> Vector3<f64> {
    use std::f64::consts::{FRAC_PI_2, PI};
    Vector3::new(
        (rand::random::<f64>() * 2.0 - 1.0) * PI,
        (rand::random::<f64>() * 2.0 - 1.0) * (FRAC_PI_2 - margin),
        (rand::random::<f64>() * 2.0 - 1.0) * PI,
    )
}
