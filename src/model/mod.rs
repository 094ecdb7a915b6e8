//! The Hodgkin-Huxley membrane model.
//!
//! This module provides the pure numeric building blocks:
//! - [`MembraneParams`]: reversal potentials, capacitance and conductances
//! - [`Gate`]: opening/closing rates of the m, h and n gates
//! - [`Membrane`]: dV/dt, d²V/dt² and the full 4-D vector field
//!
//! Nothing here caches state. Every call recomputes the gates from the
//! voltage it is given.

mod gates;
mod membrane;
mod params;

pub use gates::{gate_rate, gate_value, Gate, GateSet, GateState};
pub use membrane::{Membrane, MembraneState, StateDerivative};
pub use params::MembraneParams;
