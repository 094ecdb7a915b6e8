//! Membrane current balance.
//!
//! The HH membrane equation is:
//!
//! ```text
//! Cm dV/dt = -gNa m³ h (V - ENa) - gK n⁴ (V - EK) - gl (V - Er)
//! ```
//!
//! For the equilibrium search the gates are held at their steady-state
//! values for the current voltage, which makes dV/dt a scalar function of V.
//! [`Membrane::vector_field`] gives the full 4-D system at an arbitrary state.

use super::gates::{Gate, GateSet};
use super::params::MembraneParams;

/// A point (V, m, h, n) in the HH state space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembraneState {
    pub v: f64,
    pub m: f64,
    pub h: f64,
    pub n: f64,
}

impl MembraneState {
    /// State with every gate at its steady-state value for `v`.
    pub fn steady(v: f64) -> Self {
        let gates = GateSet::at(v);
        Self {
            v,
            m: gates.m.value,
            h: gates.h.value,
            n: gates.n.value,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.v, self.m, self.h, self.n]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }

    /// Value of one gate variable.
    pub fn gate(&self, gate: Gate) -> f64 {
        match gate {
            Gate::M => self.m,
            Gate::H => self.h,
            Gate::N => self.n,
        }
    }
}

/// Time derivatives (dV/dt, dm/dt, dh/dt, dn/dt).
///
/// This is a rate vector, not a state. It is never fed back in place of
/// (V, m, h, n).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateDerivative {
    pub dv: f64,
    pub dm: f64,
    pub dh: f64,
    pub dn: f64,
}

impl StateDerivative {
    pub fn to_array(&self) -> [f64; 4] {
        [self.dv, self.dm, self.dh, self.dn]
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|x| x.is_finite())
    }

    /// Largest absolute component.
    pub fn max_abs(&self) -> f64 {
        self.to_array().iter().fold(0.0f64, |acc, x| acc.max(x.abs()))
    }
}

/// The HH membrane equations for one parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Membrane {
    params: MembraneParams,
}

impl Membrane {
    pub fn new(params: MembraneParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MembraneParams {
        &self.params
    }

    /// Right-hand side of the current balance for explicit gate values.
    fn current_balance(&self, v: f64, m: f64, h: f64, n: f64) -> f64 {
        let p = &self.params;
        let sodium = -p.g_na * m.powi(3) * h * (v - p.e_na);
        let potassium = -p.g_k * n.powi(4) * (v - p.e_k);
        let leak = -p.g_l * (v - p.e_r);
        (sodium + potassium + leak) / p.c_m
    }

    /// dV/dt at voltage `v` with gates at steady state.
    pub fn dv_dt(&self, v: f64) -> f64 {
        let gates = GateSet::at(v);
        self.current_balance(v, gates.m.value, gates.h.value, gates.n.value)
    }

    /// d²V/dt², the total time derivative of dV/dt.
    ///
    /// Differentiates the current balance with the product rule through m,
    /// h and n, taking each gate's rate from [`gate_rate`](super::gate_rate).
    pub fn d2v_dt2(&self, v: f64) -> f64 {
        let p = &self.params;
        let gates = GateSet::at(v);
        let (m, h, n) = (gates.m.value, gates.h.value, gates.n.value);
        let (dm, dh, dn) = (gates.m.rate, gates.h.rate, gates.n.rate);
        let dv = self.current_balance(v, m, h, n);

        let sodium = -3.0 * m.powi(2) * dm * h * (v - p.e_na)
            - m.powi(3) * dh * (v - p.e_na)
            - m.powi(3) * h * dv;
        let potassium = -4.0 * n.powi(3) * dn * (v - p.e_k) - n.powi(4) * dv;
        let leak = -dv;

        (sodium * p.g_na + potassium * p.g_k + leak * p.g_l) / p.c_m
    }

    /// (dV/dt, dm/dt, dh/dt, dn/dt) evaluated at voltage `v`.
    ///
    /// The gate entries are the gate rates at `v`.
    pub fn state_derivative(&self, v: f64) -> StateDerivative {
        let gates = GateSet::at(v);
        StateDerivative {
            dv: self.current_balance(v, gates.m.value, gates.h.value, gates.n.value),
            dm: gates.m.rate,
            dh: gates.h.rate,
            dn: gates.n.rate,
        }
    }

    /// Full 4-D HH right-hand side at an arbitrary state.
    pub fn vector_field(&self, state: &MembraneState) -> StateDerivative {
        let MembraneState { v, m, h, n } = *state;
        StateDerivative {
            dv: self.current_balance(v, m, h, n),
            dm: Gate::M.relaxation(m, v),
            dh: Gate::H.relaxation(h, v),
            dn: Gate::N.relaxation(n, v),
        }
    }

    /// State at voltage `v` with gates at steady state.
    pub fn steady_state(&self, v: f64) -> MembraneState {
        MembraneState::steady(v)
    }
}

impl Default for Membrane {
    fn default() -> Self {
        Self::new(MembraneParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_dv_dt_near_textbook_rest() {
        let membrane = Membrane::default();
        assert_abs_diff_eq!(membrane.dv_dt(-65.0), 0.0042237, epsilon = 1e-6);
        // Depolarised membrane is pulled back down
        assert!(membrane.dv_dt(-60.0) < 0.0);
        // Hyperpolarised membrane is pushed back up
        assert!(membrane.dv_dt(-70.0) > 0.0);
    }

    #[test]
    fn test_dv_dt_at_leak_reversal_is_small() {
        let membrane = Membrane::default();
        let params = membrane.params();
        let residual = membrane.dv_dt(params.e_r);
        assert_abs_diff_eq!(residual, -30.43362, epsilon = 1e-4);
        assert!(residual.abs() < 0.01 * params.current_scale());
    }

    #[test]
    fn test_d2v_dt2_reference_value() {
        let membrane = Membrane::default();
        assert_abs_diff_eq!(membrane.d2v_dt2(-65.0), 24.99450, epsilon = 1e-4);
    }

    #[test]
    fn test_capacitance_scales_dv_dt() {
        let base = Membrane::default();
        let doubled = Membrane::new(MembraneParams::default().with_c_m(2.0));
        assert_abs_diff_eq!(doubled.dv_dt(-58.0), base.dv_dt(-58.0) / 2.0, epsilon = 1e-12);
        assert!(doubled.d2v_dt2(-58.0).is_finite());
    }

    #[test]
    fn test_state_derivative_uses_gate_rates() {
        let membrane = Membrane::default();
        let gates = GateSet::at(-65.0);
        let d = membrane.state_derivative(-65.0);
        assert_eq!(d.dv, membrane.dv_dt(-65.0));
        assert_eq!(d.dm, gates.m.rate);
        assert_eq!(d.dh, gates.h.rate);
        assert_eq!(d.dn, gates.n.rate);
    }

    #[test]
    fn test_vector_field_gates_vanish_at_steady_state() {
        let membrane = Membrane::default();
        for v in [-80.0, -65.0, -50.0] {
            let state = membrane.steady_state(v);
            let field = membrane.vector_field(&state);
            assert_abs_diff_eq!(field.dv, membrane.dv_dt(v), epsilon = 1e-12);
            assert!(field.dm.abs() < 1e-12);
            assert!(field.dh.abs() < 1e-12);
            assert!(field.dn.abs() < 1e-12);
        }
    }

    #[test]
    fn test_singular_voltage_is_non_finite() {
        let membrane = Membrane::default();
        assert!(membrane.dv_dt(-55.0).is_nan());
        assert!(!membrane.state_derivative(-55.0).is_finite());
        assert!(!membrane.steady_state(-40.0).is_finite());
    }
}
