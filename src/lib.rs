//! Local parameterizations for manifold-valued optimization variables.
//!
//! A nonlinear least-squares backend (bundle adjustment, visual-inertial SLAM) stores
//! orientations, poses and 3D lines in over-parameterized flat buffers. The types in
//! [`manifold`] tell it how to step such a buffer along the manifold (`plus`) and how
//! tangent perturbations map to ambient coordinates (`compute_jacobian`).
//!
//! Numerical edge-case handling is configured through [`ParameterizationOptions`] and
//! reported through [`ManifoldError`]; the default options reproduce the unchecked
//! legacy numerics.

pub mod error;
pub mod logger;
pub mod manifold;
pub mod options;

pub use error::{Buffer, ManifoldError, ManifoldResult};
pub use logger::{init_logger, init_logger_with_level};
pub use manifold::{
    EulerPoseParameterization, LocalParameterization, OrthonormalLine,
    OrthonormalLineParameterization, ParameterizationType, PoseParameterization,
    QuaternionParameterization,
};
pub use options::{JacobianModel, ParameterizationOptions, PhaseRecovery, ValidationPolicy};
