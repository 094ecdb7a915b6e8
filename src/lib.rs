//! # hh_stability
//!
//! Equilibrium and local stability analysis for the Hodgkin-Huxley
//! single-compartment membrane.
//!
//! This library provides:
//! - The HH gate kinetics and membrane current balance
//! - An adaptive-step descent that finds the resting voltage
//! - A Jacobian/eigenvalue stability verdict at that rest state
//! - A two-point Lipschitz probe of dV/dt
//!
//! ## Architecture
//!
//! The library is organized into several modules, each depending only on
//! the ones before it:
//!
//! - [`model`] - Gate rates, dV/dt, d²V/dt² and the 4-D vector field
//! - [`solver`] - Equilibrium search
//! - [`stability`] - Jacobian, eigenvalues and the Lipschitz probe
//! - [`error`] - Error type shared by all of the above
//!
//! ## Usage
//!
//! ```no_run
//! use hh_stability::{EquilibriumSolver, MembraneParams, StabilityAnalyzer};
//!
//! let params = MembraneParams::default();
//! let point = EquilibriumSolver::new(params).find_equilibrium()?;
//! let report = StabilityAnalyzer::new(params).analyze(&point)?;
//! println!("V* = {:.4} mV, {}", point.v, report.stability);
//! # Ok::<(), hh_stability::HhError>(())
//! ```
//!
//! ### CLI
//!
//! ```bash
//! hh-stability --g-k 24 --verbose
//! ```

pub mod error;
pub mod model;
pub mod solver;
pub mod stability;

// Re-export main types for convenience
pub use error::{HhError, NonConvergence, Result};
pub use model::{Gate, Membrane, MembraneParams, MembraneState, StateDerivative};
pub use solver::{EquilibriumPoint, EquilibriumSolver, SolverConfig};
pub use stability::{LipschitzProbe, Stability, StabilityAnalyzer, StabilityReport};
