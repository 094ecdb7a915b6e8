//! Two-point Lipschitz probe of dV/dt.
//!
//! Checks |dV/dt(v1) - dV/dt(v2)| <= |v1 - v2|, i.e. a Lipschitz bound with
//! constant 1 between two voltages. A single pair proves nothing about the
//! whole neighbourhood; the default pair (0, ENa) is far from rest and only
//! gives a coarse diagnostic. Use [`LipschitzProbe::around`] to probe near an
//! operating point.

use crate::model::{Membrane, MembraneParams};

/// A pair of probe voltages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LipschitzProbe {
    pub v1: f64,
    pub v2: f64,
}

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LipschitzCheck {
    pub probe: LipschitzProbe,
    /// |Δ dV/dt| / |ΔV|; NaN when v1 == v2.
    pub ratio: f64,
    /// Whether the bound with constant 1 holds.
    pub bounded: bool,
}

impl LipschitzProbe {
    pub fn new(v1: f64, v2: f64) -> Self {
        Self { v1, v2 }
    }

    /// The fixed pair (0, ENa).
    pub fn reversal(params: &MembraneParams) -> Self {
        Self::new(0.0, params.e_na)
    }

    /// Symmetric pair (v - half_width, v + half_width).
    pub fn around(v: f64, half_width: f64) -> Self {
        Self::new(v - half_width, v + half_width)
    }

    /// Whether |dV/dt(v1) - dV/dt(v2)| <= |v1 - v2|.
    pub fn is_bounded(&self, membrane: &Membrane) -> bool {
        let (d1, d2) = (membrane.dv_dt(self.v1), membrane.dv_dt(self.v2));
        (d1 - d2).abs() <= (self.v1 - self.v2).abs()
    }

    /// Difference quotient of dV/dt across the pair.
    pub fn ratio(&self, membrane: &Membrane) -> f64 {
        let (d1, d2) = (membrane.dv_dt(self.v1), membrane.dv_dt(self.v2));
        (d1 - d2).abs() / (self.v1 - self.v2).abs()
    }

    pub fn check(&self, membrane: &Membrane) -> LipschitzCheck {
        LipschitzCheck {
            probe: *self,
            ratio: self.ratio(membrane),
            bounded: self.is_bounded(membrane),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reversal_probe_is_not_bounded() {
        let membrane = Membrane::default();
        let probe = LipschitzProbe::reversal(membrane.params());
        assert_eq!(probe, LipschitzProbe::new(0.0, 50.0));

        let check = probe.check(&membrane);
        assert!(!check.bounded);
        assert_abs_diff_eq!(check.ratio, 44.59315, epsilon = 1e-3);
    }

    #[test]
    fn test_probe_near_rest() {
        let membrane = Membrane::default();
        // Slope of dV/dt at rest is about -1.17, just over the bound
        let check = LipschitzProbe::around(-64.996379, 0.5).check(&membrane);
        assert!(!check.bounded);
        assert_abs_diff_eq!(check.ratio, 1.168154, epsilon = 1e-4);

        // Hyperpolarised membrane is much flatter
        let check = LipschitzProbe::around(-80.0, 0.25).check(&membrane);
        assert!(check.bounded);
        assert_abs_diff_eq!(check.ratio, 0.298662, epsilon = 1e-4);
    }

    #[test]
    fn test_degenerate_pair() {
        let membrane = Membrane::default();
        let probe = LipschitzProbe::new(-70.0, -70.0);
        assert!(probe.is_bounded(&membrane));
        assert!(probe.ratio(&membrane).is_nan());
    }

    #[test]
    fn test_order_does_not_matter() {
        let membrane = Membrane::default();
        let a = LipschitzProbe::new(-75.0, -60.0).check(&membrane);
        let b = LipschitzProbe::new(-60.0, -75.0).check(&membrane);
        assert_eq!(a.bounded, b.bounded);
        assert_abs_diff_eq!(a.ratio, b.ratio, epsilon = 1e-12);
    }
}
