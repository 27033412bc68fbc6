//! Error types for the adaptive eigensolver.

use arvak_chem::ChemError;
use thiserror::Error;

/// Errors produced by an adaptive VQE run or its collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdaptError {
    /// Operator construction, mapping or tapering failed.
    #[error("chemistry error: {0}")]
    Chem(#[from] ChemError),

    /// The quantum backend could not evaluate an expectation value.
    #[error("backend '{backend}' failed: {reason}")]
    Backend {
        /// Backend name.
        backend: String,
        /// What went wrong.
        reason: String,
    },

    /// The optimizer produced a non-finite objective or parameter.
    #[error("optimizer '{optimizer}' diverged after {evaluations} evaluations: {reason}")]
    OptimizerDivergence {
        /// Optimizer name.
        optimizer: String,
        /// Objective evaluations before divergence.
        evaluations: usize,
        /// What went wrong.
        reason: String,
    },

    /// Parameter vector does not fit the ansatz.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Hamiltonian, pool and reference disagree on the register.
    #[error("qubit count mismatch: {0}")]
    QubitMismatch(String),

    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML for [`AdaptConfig`](crate::config::AdaptConfig).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

/// Result type for adaptive VQE operations.
pub type AdaptResult<T> = Result<T, AdaptError>;
