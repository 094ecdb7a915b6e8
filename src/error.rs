//! Error types for the Hodgkin-Huxley equilibrium and stability analysis.
//!
//! This module provides a unified error type [`HhError`] that covers
//! parameter validation, equilibrium search, and eigen-decomposition
//! failures.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`HhError`].
pub type Result<T> = std::result::Result<T, HhError>;

/// Why an equilibrium search stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonConvergence {
    /// A voltage, residual, or learning rate became NaN or infinite.
    NonFinite,
    /// The iteration cap was reached before the stopping predicate held.
    IterationLimit,
    /// The search stopped moving while dV/dt was still away from zero.
    Stalled,
}

impl fmt::Display for NonConvergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonConvergence::NonFinite => write!(f, "non-finite intermediate value"),
            NonConvergence::IterationLimit => write!(f, "iteration limit reached"),
            NonConvergence::Stalled => write!(f, "stalled with dV/dt away from zero"),
        }
    }
}

/// Unified error type for all analysis operations.
#[derive(Error, Debug)]
pub enum HhError {
    // ============ Configuration Errors ============
    /// Invalid model or solver parameter
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // ============ Solver Errors ============
    /// Equilibrium search stopped without satisfying the stopping predicate
    #[error("No equilibrium after {iterations} iterations at V = {voltage:.4} mV ({reason})")]
    ConvergenceFailure {
        iterations: usize,
        voltage: f64,
        reason: NonConvergence,
    },

    // ============ Stability Errors ============
    /// The Jacobian has a NaN or infinite entry; no decomposition is attempted
    #[error("Jacobian entry ({row}, {col}) is not finite")]
    NonFiniteJacobian { row: usize, col: usize },

    /// The Schur iteration did not converge
    #[error("Eigen-decomposition of the Jacobian failed after {iterations} iterations")]
    DecompositionFailure { iterations: usize },

    // ============ I/O Errors ============
    /// Error reading a parameter file
    #[error("Failed to read parameter file '{path}': {source}")]
    ParamsReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a parameter file
    #[error("Failed to parse parameter file '{path}': {message}")]
    ParamsParseError { path: String, message: String },
}

impl HhError {
    /// Create an invalid parameter error
    pub fn invalid_param(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a convergence failure error
    pub fn convergence_failure(iterations: usize, voltage: f64, reason: NonConvergence) -> Self {
        Self::ConvergenceFailure {
            iterations,
            voltage,
            reason,
        }
    }

    /// The non-convergence reason, if this is a convergence failure.
    pub fn non_convergence(&self) -> Option<NonConvergence> {
        match self {
            Self::ConvergenceFailure { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_failure_message() {
        let err = HhError::convergence_failure(12, -55.0, NonConvergence::NonFinite);
        let msg = err.to_string();
        assert!(msg.contains("12 iterations"));
        assert!(msg.contains("-55.0000"));
        assert!(msg.contains("non-finite"));
        assert_eq!(err.non_convergence(), Some(NonConvergence::NonFinite));
    }

    #[test]
    fn test_stalled_message() {
        let err = HhError::convergence_failure(1, -54.387, NonConvergence::Stalled);
        assert!(err.to_string().contains("stalled"));
        assert_eq!(err.non_convergence(), Some(NonConvergence::Stalled));
    }

    #[test]
    fn test_non_finite_jacobian_message() {
        let err = HhError::NonFiniteJacobian { row: 1, col: 0 };
        assert_eq!(err.to_string(), "Jacobian entry (1, 0) is not finite");
        assert!(err.non_convergence().is_none());
    }

    #[test]
    fn test_invalid_param_has_no_reason() {
        let err = HhError::invalid_param("c_m", "must be positive");
        assert_eq!(err.to_string(), "Invalid parameter 'c_m': must be positive");
        assert!(err.non_convergence().is_none());
    }
}
