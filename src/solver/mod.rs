//! Equilibrium search.
//!
//! With the gates held at steady state, the membrane is at rest where the
//! scalar residual dV/dt vanishes. The search relaxes the voltage along
//! dV/dt with a step size that is re-derived every iteration from a secant
//! of the objective gradient:
//!
//! ```text
//! V'  = V + η dV/dt(V)
//! η'  = |V' - V| / |g(V') - g(V)|,   g(V) = d²V/dt²(V) · dV/dt(V)
//! ```
//!
//! The search stops when consecutive residuals differ by no more than the
//! tolerance. The stop only counts as an equilibrium when |dV/dt| is also
//! within [`SolverConfig::residual_bound`]. A non-finite value, a step that
//! leaves V unchanged, or an exhausted iteration budget is reported as a
//! convergence failure.

mod equilibrium;

pub use equilibrium::{
    objective, objective_gradient, EquilibriumPoint, EquilibriumSolver, Search, SearchState,
    SolverConfig,
};

/// Default stopping tolerance on the change of dV/dt between iterations.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default cap on descent iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Step size used for the first iteration.
pub const DEFAULT_LEARNING_RATE: f64 = 0.01;

/// Fraction of the membrane current scale accepted as a residual at rest.
pub const RESIDUAL_SCALE_FRACTION: f64 = 1e-9;
