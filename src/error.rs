//! Error types for the local-parameterization library
//!
//! Every retraction and Jacobian entry point returns [`ManifoldResult`]. Under the
//! default options the only reachable failure is a buffer of the wrong length; the
//! numerical conditions are reported only when validation is switched on through
//! [`ValidationPolicy`](crate::options::ValidationPolicy).

use thiserror::Error;

/// Main result type used throughout the library
pub type ManifoldResult<T> = Result<T, ManifoldError>;

/// Names the caller-owned buffer a dimension error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    /// Ambient state `x`
    State,
    /// Tangent increment `delta`
    Delta,
    /// Output state `x_plus_delta`
    Output,
    /// Row-major Jacobian output
    Jacobian,
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Buffer::State => "state",
            Buffer::Delta => "delta",
            Buffer::Output => "output",
            Buffer::Jacobian => "jacobian",
        };
        f.write_str(name)
    }
}

/// Errors produced by the parameterizations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManifoldError {
    /// A caller buffer does not have the length the parameterization expects
    #[error("{buffer} buffer has wrong size: expected {expected}, got {actual}")]
    DimensionMismatch {
        buffer: Buffer,
        expected: usize,
        actual: usize,
    },

    /// Input quaternion is too far from unit norm
    #[error("quaternion norm {norm:.3e} deviates from 1 by more than {tolerance:.1e}")]
    NonUnitQuaternion { norm: f64, tolerance: f64 },

    /// Rotation is at (or numerically near) the Euler-angle gimbal lock
    #[error("degenerate rotation: |sin(pitch)| = {sin_pitch:.12} exceeds 1 - {epsilon:.1e}")]
    DegenerateRotation { sin_pitch: f64, epsilon: f64 },

    /// Plücker coordinates cannot be mapped to an orthonormal line
    #[error("degenerate line: {0}")]
    DegenerateLine(String),
}

/// Check that `actual` equals `expected`, naming the offending buffer.
pub(crate) fn check_len(buffer: Buffer, expected: usize, actual: usize) -> ManifoldResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ManifoldError::DimensionMismatch {
            buffer,
            expected,
            actual,
        })
    }
}
