//! Run configuration.
//!
//! Sources, highest precedence first:
//! 1. Environment variables (`ARVAK_ADAPT_*`)
//! 2. YAML configuration file
//! 3. Default values
//!
//! ```yaml
//! threshold: 1.0e-5
//! delta: 0.1
//! max_iterations: 20
//! gradient: finite_difference
//! optimizer:
//!   kind: bfgs
//!   max_iterations: 500
//! problem:
//!   mapping: parity
//!   two_qubit_reduction: true
//! ```

use std::path::Path;
use std::str::FromStr;

use arvak_chem::MappingScheme;
use serde::{Deserialize, Serialize};

use crate::error::{AdaptError, AdaptResult};
use crate::gradient::GradientMethod;
use crate::optimizer::OptimizerKind;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ARVAK_ADAPT_";

/// Complete configuration of one adaptive run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptConfig {
    /// Stop once the largest gradient magnitude falls below this.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Finite-difference step for candidate gradients.
    #[serde(default = "default_delta")]
    pub delta: f64,

    /// Upper bound on growth iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// How candidate gradients are estimated.
    #[serde(default)]
    pub gradient: GradientMethod,

    /// Skip operators already in the ansatz when ranking candidates.
    #[serde(default)]
    pub exclude_selected: bool,

    /// Stop with `cycle` when the selection sequence starts repeating.
    #[serde(default)]
    pub detect_cycles: bool,

    /// Worker threads for the gradient fan-out (capped by the backend).
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Seed for stochastic optimizers and shot sampling.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Classical optimizer settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,

    /// Expectation-value backend settings.
    #[serde(default)]
    pub backend: BackendSettings,

    /// Hamiltonian preparation settings.
    #[serde(default)]
    pub problem: ProblemConfig,
}

/// Classical optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Which optimizer.
    #[serde(default)]
    pub kind: OptimizerKind,

    /// Iteration budget per re-optimization.
    #[serde(default = "default_optimizer_iterations")]
    pub max_iterations: usize,

    /// Convergence tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// Which backend evaluates expectation values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Exact statevector expectation.
    #[default]
    Statevector,
    /// Statevector with sampled Pauli measurements.
    Shots,
}

impl FromStr for BackendKind {
    type Err = AdaptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statevector" => Ok(Self::Statevector),
            "shots" => Ok(Self::Shots),
            other => Err(AdaptError::Config(format!("unknown backend '{other}'"))),
        }
    }
}

/// Expectation-value backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Backend type.
    #[serde(default)]
    pub kind: BackendKind,

    /// Shots per Pauli term for [`BackendKind::Shots`].
    #[serde(default = "default_shots")]
    pub shots: u32,
}

/// Hamiltonian preparation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemConfig {
    /// Fermion-to-qubit mapping.
    #[serde(default = "default_mapping")]
    pub mapping: MappingScheme,

    /// Remove the two particle-number qubits (Parity mapping only).
    #[serde(default = "default_true")]
    pub two_qubit_reduction: bool,

    /// Search for and taper all Z2 symmetries.
    #[serde(default)]
    pub z2_tapering: bool,
}

fn default_threshold() -> f64 {
    1e-5
}

fn default_delta() -> f64 {
    0.1
}

fn default_max_iterations() -> usize {
    50
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

fn default_seed() -> u64 {
    42
}

fn default_optimizer_iterations() -> usize {
    1000
}

fn default_tolerance() -> f64 {
    1e-9
}

fn default_shots() -> u32 {
    8192
}

fn default_mapping() -> MappingScheme {
    MappingScheme::Parity
}

fn default_true() -> bool {
    true
}

impl Default for AdaptConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            delta: default_delta(),
            max_iterations: default_max_iterations(),
            gradient: GradientMethod::default(),
            exclude_selected: false,
            detect_cycles: false,
            workers: default_workers(),
            seed: default_seed(),
            optimizer: OptimizerConfig::default(),
            backend: BackendSettings::default(),
            problem: ProblemConfig::default(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            kind: OptimizerKind::default(),
            max_iterations: default_optimizer_iterations(),
            tolerance: default_tolerance(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            shots: default_shots(),
        }
    }
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            mapping: default_mapping(),
            two_qubit_reduction: true,
            z2_tapering: false,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> AdaptResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AdaptError::Config(format!("{ENV_PREFIX}{key}='{value}': {e}")))
}

impl AdaptConfig {
    /// Load and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AdaptResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(contents: &str) -> AdaptResult<Self> {
        let config: Self = serde_yaml_ng::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> AdaptResult<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ARVAK_ADAPT_*` overrides read through `lookup`, then validate.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> AdaptResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

        if let Some(v) = get("THRESHOLD") {
            self.threshold = parse_env("THRESHOLD", &v)?;
        }
        if let Some(v) = get("DELTA") {
            self.delta = parse_env("DELTA", &v)?;
        }
        if let Some(v) = get("MAX_ITERATIONS") {
            self.max_iterations = parse_env("MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = get("GRADIENT") {
            self.gradient = parse_env("GRADIENT", &v)?;
        }
        if let Some(v) = get("EXCLUDE_SELECTED") {
            self.exclude_selected = parse_env("EXCLUDE_SELECTED", &v)?;
        }
        if let Some(v) = get("DETECT_CYCLES") {
            self.detect_cycles = parse_env("DETECT_CYCLES", &v)?;
        }
        if let Some(v) = get("WORKERS") {
            self.workers = parse_env("WORKERS", &v)?;
        }
        if let Some(v) = get("SEED") {
            self.seed = parse_env("SEED", &v)?;
        }
        if let Some(v) = get("OPTIMIZER") {
            self.optimizer.kind = parse_env("OPTIMIZER", &v)?;
        }
        if let Some(v) = get("BACKEND") {
            self.backend.kind = parse_env("BACKEND", &v)?;
        }
        if let Some(v) = get("SHOTS") {
            self.backend.shots = parse_env("SHOTS", &v)?;
        }
        if let Some(v) = get("MAPPING") {
            self.problem.mapping = parse_env("MAPPING", &v)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check value ranges.
    pub fn validate(&self) -> AdaptResult<()> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(AdaptError::Config(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(AdaptError::Config(format!(
                "delta must be positive, got {}",
                self.delta
            )));
        }
        if self.max_iterations == 0 {
            return Err(AdaptError::Config("max_iterations must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(AdaptError::Config("workers must be at least 1".into()));
        }
        if self.optimizer.max_iterations == 0 {
            return Err(AdaptError::Config(
                "optimizer.max_iterations must be at least 1".into(),
            ));
        }
        if !(self.optimizer.tolerance.is_finite() && self.optimizer.tolerance > 0.0) {
            return Err(AdaptError::Config(format!(
                "optimizer.tolerance must be positive, got {}",
                self.optimizer.tolerance
            )));
        }
        if self.backend.kind == BackendKind::Shots && self.backend.shots == 0 {
            return Err(AdaptError::Config("backend.shots must be at least 1".into()));
        }
        if self.problem.two_qubit_reduction && self.problem.z2_tapering {
            return Err(AdaptError::Config(
                "two_qubit_reduction and z2_tapering are mutually exclusive".into(),
            ));
        }
        Ok(())
    }

    /// Builder-style threshold override.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder-style delta override.
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Builder-style iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder-style gradient method.
    #[must_use]
    pub fn with_gradient(mut self, gradient: GradientMethod) -> Self {
        self.gradient = gradient;
        self
    }

    /// Builder-style worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}
