//! Gate kinetics.
//!
//! Each gating particle opens at rate alpha(V) and closes at rate beta(V):
//!
//! ```text
//! alpha_n(V) = -(0.01V + 0.55) / (exp(-V/10 - 5.5) - 1)
//! alpha_m(V) =  0.1(V + 40) / (1 - exp(-(V + 40)/10))
//! alpha_h(V) =  0.07 exp(-(V + 65)/20)
//! beta_n(V)  =  0.125 exp(-(V + 65)/80)
//! beta_m(V)  =  4 exp(-(V + 65)/18)
//! beta_h(V)  =  1 / (1 + exp(-(V + 35)/10))
//! ```
//!
//! alpha_n is 0/0 at V = -55 and alpha_m at V = -40. The formulas are
//! evaluated as written there and return NaN; callers decide what a
//! non-finite rate means.

use std::fmt;

/// Gating variables of the HH sodium and potassium channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    /// Sodium activation
    M,
    /// Sodium inactivation
    H,
    /// Potassium activation
    N,
}

impl Gate {
    /// All gates, in state-vector order (m, h, n).
    pub const ALL: [Gate; 3] = [Gate::M, Gate::H, Gate::N];

    fn laws(self) -> &'static RateLaws {
        match self {
            Gate::M => &M_LAWS,
            Gate::H => &H_LAWS,
            Gate::N => &N_LAWS,
        }
    }

    /// Opening rate at voltage `v` (1/ms).
    pub fn alpha(self, v: f64) -> f64 {
        (self.laws().alpha)(v)
    }

    /// Closing rate at voltage `v` (1/ms).
    pub fn beta(self, v: f64) -> f64 {
        (self.laws().beta)(v)
    }

    /// dα/dV at voltage `v`.
    pub fn alpha_slope(self, v: f64) -> f64 {
        (self.laws().alpha_slope)(v)
    }

    /// dβ/dV at voltage `v`.
    pub fn beta_slope(self, v: f64) -> f64 {
        (self.laws().beta_slope)(v)
    }

    /// Steady-state open fraction at voltage `v`.
    pub fn steady_state(self, v: f64) -> f64 {
        gate_value(self.alpha(v), self.beta(v))
    }

    /// First-order gate kinetics dx/dt = alpha(1 - x) - beta x.
    ///
    /// This is the gate equation of the 4-D HH system and vanishes when
    /// `value` is the steady state at `v`.
    pub fn relaxation(self, value: f64, v: f64) -> f64 {
        self.alpha(v) * (1.0 - value) - self.beta(v) * value
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::M => write!(f, "m"),
            Gate::H => write!(f, "h"),
            Gate::N => write!(f, "n"),
        }
    }
}

/// Rate formulas for one gate.
struct RateLaws {
    alpha: fn(f64) -> f64,
    beta: fn(f64) -> f64,
    alpha_slope: fn(f64) -> f64,
    beta_slope: fn(f64) -> f64,
}

const N_LAWS: RateLaws = RateLaws {
    alpha: alpha_n,
    beta: beta_n,
    alpha_slope: alpha_n_slope,
    beta_slope: beta_n_slope,
};

const M_LAWS: RateLaws = RateLaws {
    alpha: alpha_m,
    beta: beta_m,
    alpha_slope: alpha_m_slope,
    beta_slope: beta_m_slope,
};

const H_LAWS: RateLaws = RateLaws {
    alpha: alpha_h,
    beta: beta_h,
    alpha_slope: alpha_h_slope,
    beta_slope: beta_h_slope,
};

fn alpha_n(v: f64) -> f64 {
    -(0.01 * v + 0.55) / ((-v / 10.0 - 5.5).exp() - 1.0)
}

fn alpha_n_slope(v: f64) -> f64 {
    let e = (-v / 10.0 - 5.5).exp();
    -(0.01 * (e - 1.0) + (0.01 * v + 0.55) * e / 10.0) / (e - 1.0).powi(2)
}

fn beta_n(v: f64) -> f64 {
    0.125 * (-(v + 65.0) / 80.0).exp()
}

fn beta_n_slope(v: f64) -> f64 {
    -beta_n(v) / 80.0
}

fn alpha_m(v: f64) -> f64 {
    0.1 * (v + 40.0) / (1.0 - (-(v + 40.0) / 10.0).exp())
}

fn alpha_m_slope(v: f64) -> f64 {
    let e = (-(v + 40.0) / 10.0).exp();
    (0.1 * (1.0 - e) - 0.01 * (v + 40.0) * e) / (1.0 - e).powi(2)
}

fn beta_m(v: f64) -> f64 {
    4.0 * (-(v + 65.0) / 18.0).exp()
}

fn beta_m_slope(v: f64) -> f64 {
    -beta_m(v) / 18.0
}

fn alpha_h(v: f64) -> f64 {
    0.07 * (-(v + 65.0) / 20.0).exp()
}

fn alpha_h_slope(v: f64) -> f64 {
    -alpha_h(v) / 20.0
}

fn beta_h(v: f64) -> f64 {
    1.0 / (1.0 + (-(v + 35.0) / 10.0).exp())
}

fn beta_h_slope(v: f64) -> f64 {
    let e = (-(v + 35.0) / 10.0).exp();
    e / 10.0 / (1.0 + e).powi(2)
}

/// Probability that a gate is open, alpha / (alpha + beta).
pub fn gate_value(alpha: f64, beta: f64) -> f64 {
    alpha / (alpha + beta)
}

/// Rate term alpha(1 - x) + beta x used by the second voltage derivative.
pub fn gate_rate(value: f64, alpha: f64, beta: f64) -> f64 {
    alpha * (1.0 - value) + beta * value
}

/// Rates, value and rate of change of one gate at one voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateState {
    pub gate: Gate,
    pub alpha: f64,
    pub beta: f64,
    pub value: f64,
    pub rate: f64,
}

impl GateState {
    /// Evaluate `gate` at voltage `v`.
    pub fn at(gate: Gate, v: f64) -> Self {
        let alpha = gate.alpha(v);
        let beta = gate.beta(v);
        let value = gate_value(alpha, beta);
        Self {
            gate,
            alpha,
            beta,
            value,
            rate: gate_rate(value, alpha, beta),
        }
    }

    /// Whether every field is finite.
    pub fn is_finite(&self) -> bool {
        self.alpha.is_finite()
            && self.beta.is_finite()
            && self.value.is_finite()
            && self.rate.is_finite()
    }
}

/// The three gates evaluated at the same voltage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSet {
    pub m: GateState,
    pub h: GateState,
    pub n: GateState,
}

impl GateSet {
    /// Evaluate all gates at voltage `v`.
    pub fn at(v: f64) -> Self {
        Self {
            m: GateState::at(Gate::M, v),
            h: GateState::at(Gate::H, v),
            n: GateState::at(Gate::N, v),
        }
    }

    /// Look up one gate.
    pub fn get(&self, gate: Gate) -> &GateState {
        match gate {
            Gate::M => &self.m,
            Gate::H => &self.h,
            Gate::N => &self.n,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.m.is_finite() && self.h.is_finite() && self.n.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Voltages where a rate formula is 0/0.
    const SINGULAR: [f64; 2] = [-55.0, -40.0];

    #[test]
    fn test_rates_at_rest() {
        // Textbook values at V = -65 mV
        assert_relative_eq!(Gate::M.beta(-65.0), 4.0);
        assert_relative_eq!(Gate::H.alpha(-65.0), 0.07);
        assert_relative_eq!(Gate::N.beta(-65.0), 0.125);
        assert_relative_eq!(Gate::M.steady_state(-65.0), 0.0529325, epsilon = 1e-6);
        assert_relative_eq!(Gate::H.steady_state(-65.0), 0.5961208, epsilon = 1e-6);
        assert_relative_eq!(Gate::N.steady_state(-65.0), 0.3176769, epsilon = 1e-6);
    }

    #[test]
    fn test_singular_points_are_nan() {
        assert!(Gate::N.alpha(-55.0).is_nan());
        assert!(Gate::M.alpha(-40.0).is_nan());
        assert!(!GateSet::at(-55.0).is_finite());
        // Both formulas have a finite limit next to the singularity
        assert_relative_eq!(Gate::N.alpha(-55.0 + 1e-6), 0.1, epsilon = 1e-6);
        assert_relative_eq!(Gate::M.alpha(-40.0 + 1e-6), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gate_set_lookup() {
        let set = GateSet::at(-65.0);
        for gate in Gate::ALL {
            let state = set.get(gate);
            assert_eq!(state.gate, gate);
            assert_eq!(*state, GateState::at(gate, -65.0));
        }
    }

    #[test]
    fn test_gate_value_and_rate() {
        assert_relative_eq!(gate_value(1.0, 3.0), 0.25);
        assert_relative_eq!(gate_rate(0.25, 1.0, 3.0), 1.5);
        assert!(gate_value(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_relaxation_vanishes_at_steady_state() {
        for v in [-90.0, -65.0, -30.0, 10.0] {
            for gate in Gate::ALL {
                let x = gate.steady_state(v);
                assert!(gate.relaxation(x, v).abs() < 1e-12, "{} at {}", gate, v);
            }
        }
    }

    #[test]
    fn test_slopes_match_finite_differences() {
        let h = 1e-6;
        for v in [-80.0, -65.0, -50.0, -20.0, 15.0] {
            for gate in Gate::ALL {
                let fd_alpha = (gate.alpha(v + h) - gate.alpha(v - h)) / (2.0 * h);
                let fd_beta = (gate.beta(v + h) - gate.beta(v - h)) / (2.0 * h);
                assert_relative_eq!(
                    gate.alpha_slope(v),
                    fd_alpha,
                    epsilon = 1e-7,
                    max_relative = 1e-5
                );
                assert_relative_eq!(
                    gate.beta_slope(v),
                    fd_beta,
                    epsilon = 1e-7,
                    max_relative = 1e-5
                );
            }
        }
    }

    #[test]
    fn test_gate_values_in_unit_interval_sweep() {
        let mut v = -150.0;
        while v <= 100.0 {
            if SINGULAR.iter().all(|s| (v - s).abs() > 1e-6) {
                for gate in Gate::ALL {
                    let state = GateState::at(gate, v);
                    assert!(state.alpha >= 0.0 && state.beta > 0.0);
                    assert!(
                        (0.0..=1.0).contains(&state.value),
                        "{} = {} at {}",
                        gate,
                        state.value,
                        v
                    );
                }
            }
            v += 0.01;
        }
    }

    proptest! {
        #[test]
        fn prop_gate_value_in_unit_interval(v in -150.0f64..100.0) {
            prop_assume!(SINGULAR.iter().all(|s| (v - s).abs() > 1e-6));
            for gate in Gate::ALL {
                let (a, b) = (gate.alpha(v), gate.beta(v));
                prop_assert!(a + b > 0.0);
                let x = gate_value(a, b);
                prop_assert!((0.0..=1.0).contains(&x));
            }
        }
    }
}
