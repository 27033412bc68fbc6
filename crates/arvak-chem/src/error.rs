//! Error types for the chem crate.

use thiserror::Error;

/// Errors produced while building, mapping or reducing molecular operators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChemError {
    /// Integral tensor shapes disagree with each other or with the orbital count.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Mapping scheme name is not known.
    #[error("unsupported mapping scheme '{0}' (expected jordan_wigner, parity or bravyi_kitaev)")]
    UnsupportedMappingScheme(String),

    /// Z2 tapering could not be carried out as requested.
    #[error("symmetry reduction failed: {0}")]
    SymmetryReductionFailure(String),

    /// Two operators (or an operator and a register) disagree on width.
    #[error("operator acts on {found} qubits, expected {expected}")]
    QubitCountMismatch {
        /// Width required by the caller.
        expected: u32,
        /// Width actually found.
        found: u32,
    },

    /// Pauli strings are stored as 64-bit masks.
    #[error("{0} qubits requested, at most 64 are supported")]
    TooManyQubits(u32),

    /// Dense matrices are only built for small registers.
    #[error("dense representation of {num_qubits} qubits exceeds the limit of {max}")]
    DenseTooLarge {
        /// Requested register width.
        num_qubits: u32,
        /// Largest width accepted.
        max: u32,
    },

    /// Ladder operator index outside the mode register.
    #[error("mode {mode} out of range for {num_modes} modes")]
    ModeOutOfRange {
        /// Offending mode index.
        mode: u32,
        /// Number of spin orbitals.
        num_modes: u32,
    },

    /// Particle counts that do not fit the orbital space.
    #[error("invalid particle number: {0}")]
    InvalidParticleNumber(String),

    /// Label contains a character other than I, X, Y or Z.
    #[error("invalid Pauli label '{0}'")]
    InvalidPauliLabel(String),

    /// A hopping generator must be anti-Hermitian to produce a unitary.
    #[error("operator is not anti-Hermitian (largest real coefficient {0:e})")]
    NotAntiHermitian(f64),

    /// Amplitude vector length does not match `2^num_qubits`.
    #[error("state has {found} amplitudes, expected {expected}")]
    StateDimension {
        /// Expected amplitude count.
        expected: usize,
        /// Supplied amplitude count.
        found: usize,
    },

    /// Chemistry driver could not produce integrals.
    #[error("chemistry driver failed: {0}")]
    Driver(String),

    /// Reading integrals from disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Integral file is not valid JSON for the expected layout.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for chem operations.
pub type ChemResult<T> = Result<T, ChemError>;
