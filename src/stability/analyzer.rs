//! Local stability verdict at an equilibrium.

use std::fmt;

use log::{debug, warn};
use num_complex::Complex;

use crate::error::Result;
use crate::model::{Membrane, MembraneParams, MembraneState};
use crate::solver::EquilibriumPoint;

use super::jacobian::Jacobian;
use super::lipschitz::{LipschitzCheck, LipschitzProbe};

/// Eigenvalue verdict for one operating point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stability {
    /// No eigenvalue has a positive real part.
    Stable,
    /// `eigenvalue` is the one with the largest positive real part.
    Unstable { eigenvalue: Complex<f64> },
}

impl Stability {
    /// Classify a spectrum.
    pub fn classify(eigenvalues: &[Complex<f64>]) -> Self {
        let leading = eigenvalues
            .iter()
            .copied()
            .filter(|z| z.re > 0.0)
            .max_by(|a, b| a.re.total_cmp(&b.re));
        match leading {
            Some(eigenvalue) => Stability::Unstable { eigenvalue },
            None => Stability::Stable,
        }
    }

    pub fn is_stable(&self) -> bool {
        matches!(self, Stability::Stable)
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stability::Stable => write!(f, "stable"),
            Stability::Unstable { eigenvalue } => {
                write!(f, "unstable (eigenvalue {:.6} {:+.6}i)", eigenvalue.re, eigenvalue.im)
            }
        }
    }
}

/// Everything the analyzer learned about one equilibrium.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityReport {
    pub state: MembraneState,
    pub jacobian: Jacobian,
    pub eigenvalues: Vec<Complex<f64>>,
    pub stability: Stability,
    pub lipschitz: LipschitzCheck,
}

impl StabilityReport {
    /// Stable and Lipschitz-bounded.
    pub fn is_accepted(&self) -> bool {
        self.stability.is_stable() && self.lipschitz.bounded
    }

    /// Largest real part in the spectrum.
    pub fn spectral_abscissa(&self) -> f64 {
        self.eigenvalues
            .iter()
            .map(|z| z.re)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Linear stability analysis for one membrane.
#[derive(Debug, Clone)]
pub struct StabilityAnalyzer {
    membrane: Membrane,
    probe: LipschitzProbe,
}

impl StabilityAnalyzer {
    /// Create an analyzer probing the pair (0, ENa).
    pub fn new(params: MembraneParams) -> Self {
        let probe = LipschitzProbe::reversal(&params);
        Self::with_probe(params, probe)
    }

    pub fn with_probe(params: MembraneParams, probe: LipschitzProbe) -> Self {
        Self {
            membrane: Membrane::new(params),
            probe,
        }
    }

    pub fn membrane(&self) -> &Membrane {
        &self.membrane
    }

    pub fn probe(&self) -> LipschitzProbe {
        self.probe
    }

    pub fn jacobian(&self, state: &MembraneState) -> Jacobian {
        Jacobian::at(&self.membrane, state)
    }

    /// Verdict at an arbitrary state.
    pub fn stability_at(&self, state: &MembraneState) -> Result<Stability> {
        let eigenvalues = self.jacobian(state).eigenvalues()?;
        Ok(Stability::classify(&eigenvalues))
    }

    /// Verdict at a solved equilibrium.
    pub fn stability(&self, point: &EquilibriumPoint) -> Result<Stability> {
        self.stability_at(&point.state())
    }

    /// Whether the state at voltage `v`, gates at steady state, is stable.
    pub fn is_stable(&self, v: f64) -> Result<bool> {
        let stability = self.stability_at(&self.membrane.steady_state(v))?;
        Ok(stability.is_stable())
    }

    /// Run the configured Lipschitz probe.
    pub fn lipschitz(&self) -> LipschitzCheck {
        self.probe.check(&self.membrane)
    }

    /// Jacobian, spectrum, verdict and Lipschitz probe for `point`.
    pub fn analyze(&self, point: &EquilibriumPoint) -> Result<StabilityReport> {
        let state = point.state();
        let jacobian = self.jacobian(&state);
        let eigenvalues = jacobian.eigenvalues()?;
        let stability = Stability::classify(&eigenvalues);
        let lipschitz = self.lipschitz();

        debug!("Eigenvalues at V = {:.6} mV: {:?}", state.v, eigenvalues);
        if let Stability::Unstable { eigenvalue } = stability {
            warn!(
                "Equilibrium at V = {:.6} mV is unstable (Re λ = {:.6})",
                state.v, eigenvalue.re
            );
        }
        if !lipschitz.bounded {
            debug!(
                "Lipschitz probe ({}, {}) exceeds the bound: ratio {:.4}",
                lipschitz.probe.v1, lipschitz.probe.v2, lipschitz.ratio
            );
        }

        Ok(StabilityReport {
            state,
            jacobian,
            eigenvalues,
            stability,
            lipschitz,
        })
    }
}
