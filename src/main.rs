//! hh-stability - Hodgkin-Huxley equilibrium and stability report
//!
//! Finds the resting state of the membrane and reports whether it is
//! locally stable.
//!
//! # Usage
//!
//! ```bash
//! hh-stability --params squid.toml --g-k 24 --probe -66 -64
//! ```

use std::path::PathBuf;

use clap::Parser;
use hh_stability::{
    error::Result,
    solver::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE},
    EquilibriumSolver, LipschitzProbe, MembraneParams, SolverConfig, StabilityAnalyzer,
};
use log::info;

/// Hodgkin-Huxley equilibrium and stability analysis
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file with membrane constants (missing keys keep canonical values)
    #[arg(short, long, value_name = "FILE")]
    params: Option<PathBuf>,

    /// Leak reversal potential Er (mV)
    #[arg(long, allow_negative_numbers = true)]
    e_r: Option<f64>,

    /// Sodium reversal potential ENa (mV)
    #[arg(long, allow_negative_numbers = true)]
    e_na: Option<f64>,

    /// Potassium reversal potential EK (mV)
    #[arg(long, allow_negative_numbers = true)]
    e_k: Option<f64>,

    /// Membrane capacitance Cm (µF/cm²)
    #[arg(long)]
    c_m: Option<f64>,

    /// Leak conductance gl (mS/cm²)
    #[arg(long)]
    g_l: Option<f64>,

    /// Peak sodium conductance gNa (mS/cm²)
    #[arg(long)]
    g_na: Option<f64>,

    /// Peak potassium conductance gK (mS/cm²)
    #[arg(long)]
    g_k: Option<f64>,

    /// Starting voltage of the search (defaults to Er)
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<f64>,

    /// Maximum descent iterations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Stopping tolerance on the change of dV/dt
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Lipschitz probe voltages (defaults to 0 and ENa)
    #[arg(long, num_args = 2, value_names = ["V1", "V2"], allow_negative_numbers = true)]
    probe: Option<Vec<f64>>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    fn membrane_params(&self) -> Result<MembraneParams> {
        let mut params = match &self.params {
            Some(path) => MembraneParams::from_file(path)?,
            None => MembraneParams::default(),
        };
        if let Some(v) = self.e_r {
            params = params.with_e_r(v);
        }
        if let Some(v) = self.e_na {
            params = params.with_e_na(v);
        }
        if let Some(v) = self.e_k {
            params = params.with_e_k(v);
        }
        if let Some(v) = self.c_m {
            params = params.with_c_m(v);
        }
        if let Some(v) = self.g_l {
            params = params.with_g_l(v);
        }
        if let Some(v) = self.g_na {
            params = params.with_g_na(v);
        }
        if let Some(v) = self.g_k {
            params = params.with_g_k(v);
        }
        params.validate()?;
        Ok(params)
    }

    fn solver_config(&self) -> SolverConfig {
        let mut config = SolverConfig::new()
            .with_max_iterations(self.max_iterations)
            .with_tolerance(self.tolerance);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }

    fn lipschitz_probe(&self, params: &MembraneParams) -> LipschitzProbe {
        match self.probe.as_deref() {
            Some([v1, v2]) => LipschitzProbe::new(*v1, *v2),
            _ => LipschitzProbe::reversal(params),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let params = args.membrane_params()?;
    info!("Membrane constants: {:?}", params);

    // Find the resting state
    let solver = EquilibriumSolver::with_config(params, args.solver_config());
    let point = solver.find_equilibrium()?;

    // Linearise there
    let analyzer = StabilityAnalyzer::with_probe(params, args.lipschitz_probe(&params));
    let report = analyzer.analyze(&point)?;

    println!("Equilibrium ({} iterations)", point.iterations);
    println!("  V*     = {:.6} mV", point.v);
    println!("  m*     = {:.6}", point.m);
    println!("  h*     = {:.6}", point.h);
    println!("  n*     = {:.6}", point.n);
    println!("  dV/dt  = {:.3e} mV/ms", point.residual);
    println!();
    println!("Jacobian eigenvalues");
    for z in &report.eigenvalues {
        println!("  {:>12.6} {:+.6}i", z.re, z.im);
    }
    println!("Stability: {}", report.stability);
    println!(
        "Lipschitz probe ({}, {}): ratio {:.4}, {}",
        report.lipschitz.probe.v1,
        report.lipschitz.probe.v2,
        report.lipschitz.ratio,
        if report.lipschitz.bounded { "bounded" } else { "not bounded" }
    );
    println!("Accepted: {}", report.is_accepted());

    Ok(())
}
