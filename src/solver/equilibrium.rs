//! Adaptive-step descent for the resting state.

use log::{debug, trace, warn};

use crate::error::{HhError, NonConvergence, Result};
use crate::model::{GateSet, Membrane, MembraneParams, MembraneState};

use super::{
    DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE, RESIDUAL_SCALE_FRACTION,
};

/// Auxiliary objective 0.5 (dV/dt)².
pub fn objective(membrane: &Membrane, v: f64) -> f64 {
    0.5 * membrane.dv_dt(v).powi(2)
}

/// Gradient proxy of the objective, d²V/dt² · dV/dt.
pub fn objective_gradient(membrane: &Membrane, v: f64) -> f64 {
    membrane.d2v_dt2(v) * membrane.dv_dt(v)
}

/// Configuration for the equilibrium search.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Step size of the first iteration.
    pub initial_learning_rate: f64,
    /// Stopping tolerance on |ΔdV/dt| between iterations.
    pub tolerance: f64,
    /// Maximum descent iterations.
    pub max_iterations: usize,
    /// Starting voltage. `None` starts at the leak reversal potential Er.
    pub seed: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            initial_learning_rate: DEFAULT_LEARNING_RATE,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: None,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the stopping tolerance (mV/ms).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the step size of the first iteration.
    pub fn with_initial_learning_rate(mut self, rate: f64) -> Self {
        self.initial_learning_rate = rate;
        self
    }

    /// Start the search at `v` instead of Er.
    pub fn with_seed(mut self, v: f64) -> Self {
        self.seed = Some(v);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(HhError::invalid_param("tolerance", "must be finite and non-negative"));
        }
        if !(self.initial_learning_rate.is_finite() && self.initial_learning_rate > 0.0) {
            return Err(HhError::invalid_param(
                "initial_learning_rate",
                "must be finite and positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(HhError::invalid_param("max_iterations", "must be at least 1"));
        }
        Ok(())
    }

    /// Largest |dV/dt| accepted at a converged voltage.
    ///
    /// The larger of √tolerance and a small fraction of the membrane's
    /// current scale.
    pub fn residual_bound(&self, params: &MembraneParams) -> f64 {
        self.tolerance
            .sqrt()
            .max(RESIDUAL_SCALE_FRACTION * params.current_scale())
    }
}

/// One step of the search state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchState {
    /// Still descending; `voltage` is the next iterate.
    Searching {
        iteration: usize,
        voltage: f64,
        residual: f64,
        learning_rate: f64,
    },
    /// Consecutive residuals agree to within the tolerance.
    Converged {
        iteration: usize,
        voltage: f64,
        residual: f64,
    },
    /// A voltage, residual or learning rate became NaN or infinite.
    Diverged { iteration: usize, voltage: f64 },
    /// The step left the voltage unchanged while dV/dt was non-zero.
    Stalled {
        iteration: usize,
        voltage: f64,
        residual: f64,
    },
    /// The iteration budget ran out.
    IterationLimitExceeded {
        iteration: usize,
        voltage: f64,
        residual: f64,
    },
}

impl SearchState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SearchState::Searching { .. })
    }

    pub fn iteration(&self) -> usize {
        match *self {
            SearchState::Searching { iteration, .. }
            | SearchState::Converged { iteration, .. }
            | SearchState::Diverged { iteration, .. }
            | SearchState::Stalled { iteration, .. }
            | SearchState::IterationLimitExceeded { iteration, .. } => iteration,
        }
    }

    pub fn voltage(&self) -> f64 {
        match *self {
            SearchState::Searching { voltage, .. }
            | SearchState::Converged { voltage, .. }
            | SearchState::Diverged { voltage, .. }
            | SearchState::Stalled { voltage, .. }
            | SearchState::IterationLimitExceeded { voltage, .. } => voltage,
        }
    }
}

/// Iterator over the states of one search. Ends after the first terminal state.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    membrane: &'a Membrane,
    voltage: f64,
    learning_rate: f64,
    iteration: usize,
    tolerance: f64,
    max_iterations: usize,
    finished: bool,
}

impl<'a> Search<'a> {
    fn new(membrane: &'a Membrane, config: &SolverConfig) -> Self {
        Self {
            membrane,
            voltage: config.seed.unwrap_or(membrane.params().e_r),
            learning_rate: config.initial_learning_rate,
            iteration: 0,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            finished: false,
        }
    }

    fn step(&mut self) -> SearchState {
        if self.iteration >= self.max_iterations {
            return SearchState::IterationLimitExceeded {
                iteration: self.iteration,
                voltage: self.voltage,
                residual: self.membrane.dv_dt(self.voltage),
            };
        }

        let v = self.voltage;
        let cost = self.membrane.dv_dt(v);
        let v_next = v + self.learning_rate * cost;
        let cost_next = self.membrane.dv_dt(v_next);

        let gradient_change = (objective_gradient(self.membrane, v_next)
            - objective_gradient(self.membrane, v))
        .abs();
        let learning_rate = (v_next - v).abs() / gradient_change;
        self.iteration += 1;

        trace!(
            "iteration {}: V = {:.10} mV, dV/dt = {:.3e}, rate = {:.3e}",
            self.iteration,
            v_next,
            cost_next,
            learning_rate
        );

        let finite = cost.is_finite() && v_next.is_finite() && cost_next.is_finite();
        if finite && v_next == v && cost != 0.0 {
            return SearchState::Stalled {
                iteration: self.iteration,
                voltage: v,
                residual: cost,
            };
        }
        if finite && (cost_next - cost).abs() <= self.tolerance {
            return SearchState::Converged {
                iteration: self.iteration,
                voltage: v_next,
                residual: cost_next,
            };
        }
        if !finite || !learning_rate.is_finite() {
            return SearchState::Diverged {
                iteration: self.iteration,
                voltage: v_next,
            };
        }

        self.voltage = v_next;
        self.learning_rate = learning_rate;
        SearchState::Searching {
            iteration: self.iteration,
            voltage: v_next,
            residual: cost_next,
            learning_rate,
        }
    }
}

impl Iterator for Search<'_> {
    type Item = SearchState;

    fn next(&mut self) -> Option<SearchState> {
        if self.finished {
            return None;
        }
        let state = self.step();
        self.finished = state.is_terminal();
        Some(state)
    }
}

/// Converged resting state of the membrane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibriumPoint {
    /// Membrane voltage V* (mV)
    pub v: f64,
    /// Sodium activation m*
    pub m: f64,
    /// Sodium inactivation h*
    pub h: f64,
    /// Potassium activation n*
    pub n: f64,
    /// dV/dt at V*
    pub residual: f64,
    /// Descent iterations used
    pub iterations: usize,
}

impl EquilibriumPoint {
    /// The equilibrium as a point in state space.
    pub fn state(&self) -> MembraneState {
        MembraneState {
            v: self.v,
            m: self.m,
            h: self.h,
            n: self.n,
        }
    }
}

/// Finds the voltage where dV/dt vanishes.
#[derive(Debug, Clone)]
pub struct EquilibriumSolver {
    membrane: Membrane,
    config: SolverConfig,
}

impl EquilibriumSolver {
    /// Create a solver with the default configuration.
    pub fn new(params: MembraneParams) -> Self {
        Self::with_config(params, SolverConfig::default())
    }

    /// Create a solver with a custom configuration.
    pub fn with_config(params: MembraneParams, config: SolverConfig) -> Self {
        Self {
            membrane: Membrane::new(params),
            config,
        }
    }

    pub fn membrane(&self) -> &Membrane {
        &self.membrane
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Step through the search one state at a time.
    pub fn search(&self) -> Search<'_> {
        Search::new(&self.membrane, &self.config)
    }

    /// Run the search to completion.
    ///
    /// Gate values of the result are recomputed at V*. A stop whose
    /// |dV/dt| exceeds [`SolverConfig::residual_bound`] is a
    /// [`NonConvergence::Stalled`] failure, not an equilibrium.
    pub fn find_equilibrium(&self) -> Result<EquilibriumPoint> {
        self.membrane.params().validate()?;
        self.config.validate()?;

        let seed = self.config.seed.unwrap_or(self.membrane.params().e_r);
        debug!(
            "Searching for equilibrium from V = {} mV (max {} iterations)",
            seed, self.config.max_iterations
        );

        let last = self.search().last();
        match last {
            Some(SearchState::Converged {
                iteration,
                voltage,
                residual,
            }) => {
                let bound = self.config.residual_bound(self.membrane.params());
                if residual.abs() > bound {
                    warn!(
                        "Search stopped at V = {} mV with dV/dt = {:.3e} above {:.3e}",
                        voltage, residual, bound
                    );
                    return Err(HhError::convergence_failure(
                        iteration,
                        voltage,
                        NonConvergence::Stalled,
                    ));
                }
                let gates = GateSet::at(voltage);
                if !gates.is_finite() {
                    warn!("Gate values are not finite at V = {} mV", voltage);
                    return Err(HhError::convergence_failure(
                        iteration,
                        voltage,
                        NonConvergence::NonFinite,
                    ));
                }
                debug!(
                    "Converged after {} iterations: V* = {:.6} mV, dV/dt = {:.3e}",
                    iteration, voltage, residual
                );
                Ok(EquilibriumPoint {
                    v: voltage,
                    m: gates.m.value,
                    h: gates.h.value,
                    n: gates.n.value,
                    residual,
                    iterations: iteration,
                })
            }
            Some(SearchState::Diverged { iteration, voltage }) => {
                warn!("Equilibrium search diverged at iteration {}", iteration);
                Err(HhError::convergence_failure(
                    iteration,
                    voltage,
                    NonConvergence::NonFinite,
                ))
            }
            Some(SearchState::Stalled {
                iteration,
                voltage,
                residual,
            }) => {
                warn!(
                    "Equilibrium search stalled at V = {} mV with dV/dt = {:.3e}",
                    voltage, residual
                );
                Err(HhError::convergence_failure(
                    iteration,
                    voltage,
                    NonConvergence::Stalled,
                ))
            }
            Some(SearchState::IterationLimitExceeded {
                iteration, voltage, ..
            }) => {
                warn!("Equilibrium search hit the limit of {} iterations", iteration);
                Err(HhError::convergence_failure(
                    iteration,
                    voltage,
                    NonConvergence::IterationLimit,
                ))
            }
            // A search always ends on a terminal state
            Some(SearchState::Searching {
                iteration, voltage, ..
            }) => Err(HhError::convergence_failure(
                iteration,
                voltage,
                NonConvergence::IterationLimit,
            )),
            None => Err(HhError::convergence_failure(0, seed, NonConvergence::IterationLimit)),
        }
    }
}
