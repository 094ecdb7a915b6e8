//! Local stability of an equilibrium.
//!
//! The membrane is linearised at the equilibrium state (V*, m*, h*, n*). The
//! equilibrium is stable when no eigenvalue of the 4×4 Jacobian has a
//! strictly positive real part. A separate two-point probe checks whether
//! dV/dt is Lipschitz-bounded with constant 1.

mod analyzer;
mod jacobian;
mod lipschitz;

pub use analyzer::{Stability, StabilityAnalyzer, StabilityReport};
pub use jacobian::Jacobian;
pub use lipschitz::{LipschitzCheck, LipschitzProbe};

/// Convergence threshold of the Schur iteration.
pub const SCHUR_EPSILON: f64 = f64::EPSILON;

/// Schur iterations before the decomposition is reported as failed.
pub const SCHUR_MAX_ITERATIONS: usize = 1_000;
