//! Physical constants of the membrane.

use crate::error::{HhError, Result};

/// Physical constants for one Hodgkin-Huxley membrane.
///
/// Voltages are in mV, capacitance in µF/cm² and conductances in mS/cm².
/// The type is `Copy`; `Membrane`, `EquilibriumSolver` and
/// `StabilityAnalyzer` each hold their own value. Nothing reads global
/// constants, so several membranes with different channel densities can be
/// analysed side by side.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MembraneParams {
    /// Leak reversal potential, Er
    pub e_r: f64,
    /// Sodium reversal potential, ENa
    pub e_na: f64,
    /// Potassium reversal potential, EK
    pub e_k: f64,
    /// Membrane capacitance, Cm
    pub c_m: f64,
    /// Leak conductance, gl
    pub g_l: f64,
    /// Peak sodium conductance, gNa
    pub g_na: f64,
    /// Peak potassium conductance, gK
    pub g_k: f64,
}

impl Default for MembraneParams {
    /// The classic squid giant axon constants.
    fn default() -> Self {
        Self {
            e_r: -54.387,
            e_na: 50.0,
            e_k: -77.0,
            c_m: 1.0,
            g_l: 0.3,
            g_na: 120.0,
            g_k: 36.0,
        }
    }
}

impl MembraneParams {
    /// Create parameters with the canonical constants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leak reversal potential (mV).
    pub fn with_e_r(mut self, e_r: f64) -> Self {
        self.e_r = e_r;
        self
    }

    /// Set the sodium reversal potential (mV).
    pub fn with_e_na(mut self, e_na: f64) -> Self {
        self.e_na = e_na;
        self
    }

    /// Set the potassium reversal potential (mV).
    pub fn with_e_k(mut self, e_k: f64) -> Self {
        self.e_k = e_k;
        self
    }

    /// Set the membrane capacitance (µF/cm²).
    pub fn with_c_m(mut self, c_m: f64) -> Self {
        self.c_m = c_m;
        self
    }

    /// Set the leak conductance (mS/cm²).
    pub fn with_g_l(mut self, g_l: f64) -> Self {
        self.g_l = g_l;
        self
    }

    /// Set the peak sodium conductance (mS/cm²).
    pub fn with_g_na(mut self, g_na: f64) -> Self {
        self.g_na = g_na;
        self
    }

    /// Set the peak potassium conductance (mS/cm²).
    pub fn with_g_k(mut self, g_k: f64) -> Self {
        self.g_k = g_k;
        self
    }

    /// Check that every constant is usable.
    ///
    /// All values must be finite, the capacitance strictly positive and the
    /// conductances non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("e_r", self.e_r),
            ("e_na", self.e_na),
            ("e_k", self.e_k),
            ("c_m", self.c_m),
            ("g_l", self.g_l),
            ("g_na", self.g_na),
            ("g_k", self.g_k),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(HhError::invalid_param(name, format!("must be finite, got {}", value)));
            }
        }

        if self.c_m <= 0.0 {
            return Err(HhError::invalid_param("c_m", "membrane capacitance must be positive"));
        }

        for (name, value) in [("g_l", self.g_l), ("g_na", self.g_na), ("g_k", self.g_k)] {
            if value < 0.0 {
                return Err(HhError::invalid_param(name, "conductance cannot be negative"));
            }
        }

        Ok(())
    }

    /// Scale of the ionic currents, gNa * (ENa - EK).
    ///
    /// Used to judge whether a residual dV/dt is small.
    pub fn current_scale(&self) -> f64 {
        (self.g_na * (self.e_na - self.e_k)).abs() / self.c_m
    }
}

#[cfg(feature = "cli")]
impl MembraneParams {
    /// Parse parameters from a TOML document.
    ///
    /// Keys that are missing keep their canonical values.
    pub fn from_toml_str(source: &str, path: &str) -> Result<Self> {
        let params: Self = toml::from_str(source).map_err(|e| HhError::ParamsParseError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a TOML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|e| HhError::ParamsReadError {
            path: display.clone(),
            source: e,
        })?;
        Self::from_toml_str(&source, &display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = MembraneParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.e_r, -54.387);
        assert_eq!(params.g_na, 120.0);
    }

    #[test]
    fn test_builder_overrides_one_field() {
        let params = MembraneParams::new().with_g_k(24.0).with_e_k(-72.0);
        assert_eq!(params.g_k, 24.0);
        assert_eq!(params.e_k, -72.0);
        assert_eq!(params.g_na, MembraneParams::default().g_na);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MembraneParams::new().with_c_m(0.0).validate().is_err());
        assert!(MembraneParams::new().with_g_l(-0.1).validate().is_err());
        assert!(MembraneParams::new().with_e_na(f64::NAN).validate().is_err());
        assert!(MembraneParams::new().with_e_k(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_current_scale() {
        let params = MembraneParams::default();
        assert!((params.current_scale() - 120.0 * 127.0).abs() < 1e-9);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_partial_toml_keeps_defaults() {
        let params = MembraneParams::from_toml_str("g_k = 30.0\ne_r = -60.0\n", "inline").unwrap();
        assert_eq!(params.g_k, 30.0);
        assert_eq!(params.e_r, -60.0);
        assert_eq!(params.e_na, 50.0);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_toml_rejects_invalid_capacitance() {
        let err = MembraneParams::from_toml_str("c_m = -1.0\n", "inline").unwrap_err();
        assert!(matches!(err, HhError::InvalidParameter { .. }));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_toml_syntax_error() {
        let err = MembraneParams::from_toml_str("g_k = = 3", "bad.toml").unwrap_err();
        assert!(matches!(err, HhError::ParamsParseError { ref path, .. } if path == "bad.toml"));
    }
}
