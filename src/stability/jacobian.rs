//! Jacobian of the 4-D HH system.
//!
//! Rows are d(dV/dt), d(dm/dt), d(dh/dt), d(dn/dt); columns are ∂/∂V, ∂/∂m,
//! ∂/∂h, ∂/∂n. With x one of the gates:
//!
//! ```text
//! ∂V̇/∂V = -(gNa m³h + gK n⁴ + gl) / Cm
//! ∂V̇/∂m = -3 gNa m²h (V - ENa) / Cm
//! ∂V̇/∂h = -gNa m³ (V - ENa) / Cm
//! ∂V̇/∂n = -4 gK n³ (V - EK) / Cm
//! ∂ẋ/∂V = α'(V)(1 - x) - β'(V) x
//! ∂ẋ/∂x = -(α(V) + β(V))
//! ```
//!
//! Every other entry is zero. The partials are taken at a state
//! (V, m, h, n), never at a derivative vector.

use nalgebra::linalg::Schur;
use nalgebra::Matrix4;
use num_complex::Complex;

use crate::error::{HhError, Result};
use crate::model::{Gate, GateSet, Membrane, MembraneState};

use super::{SCHUR_EPSILON, SCHUR_MAX_ITERATIONS};

/// 4×4 linearisation of the membrane at one operating point.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian {
    matrix: Matrix4<f64>,
}

impl Jacobian {
    /// Evaluate the closed-form partials at `state`.
    pub fn at(membrane: &Membrane, state: &MembraneState) -> Self {
        let p = membrane.params();
        let MembraneState { v, m, h, n } = *state;

        let mut entries = [0.0; 16];
        entries[0] = -(p.g_na * m.powi(3) * h + p.g_k * n.powi(4) + p.g_l) / p.c_m;
        entries[1] = -3.0 * p.g_na * m.powi(2) * h * (v - p.e_na) / p.c_m;
        entries[2] = -p.g_na * m.powi(3) * (v - p.e_na) / p.c_m;
        entries[3] = -4.0 * p.g_k * n.powi(3) * (v - p.e_k) / p.c_m;

        let rates = GateSet::at(v);
        for (i, gate) in Gate::ALL.into_iter().enumerate() {
            let row = (i + 1) * 4;
            let x = state.gate(gate);
            let rate = rates.get(gate);
            entries[row] = gate.alpha_slope(v) * (1.0 - x) - gate.beta_slope(v) * x;
            entries[row + i + 1] = -(rate.alpha + rate.beta);
        }

        Self::from_row_slice(&entries)
    }

    /// Build from 16 entries in row-major order.
    pub fn from_row_slice(entries: &[f64; 16]) -> Self {
        Self {
            matrix: Matrix4::from_row_slice(entries),
        }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn entry(&self, row: usize, col: usize) -> f64 {
        self.matrix[(row, col)]
    }

    /// Entries in row-major order.
    pub fn to_row_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = self.matrix[(row, col)];
            }
        }
        out
    }

    pub fn is_finite(&self) -> bool {
        self.matrix.iter().all(|x| x.is_finite())
    }

    /// Row and column of the first non-finite entry, in row-major order.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.to_row_major()
            .iter()
            .position(|x| !x.is_finite())
            .map(|i| (i / 4, i % 4))
    }

    /// Eigenvalues via a real Schur decomposition.
    ///
    /// A non-finite matrix is rejected before the decomposition runs.
    pub fn eigenvalues(&self) -> Result<Vec<Complex<f64>>> {
        if let Some((row, col)) = self.first_non_finite() {
            return Err(HhError::NonFiniteJacobian { row, col });
        }
        let schur = Schur::try_new(self.matrix, SCHUR_EPSILON, SCHUR_MAX_ITERATIONS).ok_or(
            HhError::DecompositionFailure {
                iterations: SCHUR_MAX_ITERATIONS,
            },
        )?;
        Ok(schur.complex_eigenvalues().iter().copied().collect())
    }
}
