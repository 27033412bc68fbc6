//! Molecular integral container and the chemistry-driver interface.
//!
//! Integrals are over *spatial* molecular orbitals. The two-body tensor is in
//! chemists' notation:
//!
//! ```text
//! (pq|rs) = ∫∫ φ_p(1) φ_q(1) 1/r₁₂ φ_r(2) φ_s(2)
//! ```

use std::path::{Path, PathBuf};

use ndarray::{Array2, Array4};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChemError, ChemResult};

/// One- and two-body integrals plus particle counts for one molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectronicIntegrals {
    one_body: Array2<f64>,
    two_body: Array4<f64>,
    num_alpha: usize,
    num_beta: usize,
    #[serde(default)]
    nuclear_repulsion: f64,
}

impl ElectronicIntegrals {
    /// Construct and validate.
    pub fn new(
        one_body: Array2<f64>,
        two_body: Array4<f64>,
        num_alpha: usize,
        num_beta: usize,
    ) -> ChemResult<Self> {
        let out = Self {
            one_body,
            two_body,
            num_alpha,
            num_beta,
            nuclear_repulsion: 0.0,
        };
        out.validate()?;
        Ok(out)
    }

    /// Fixture constructor for shapes known to be consistent.
    pub(crate) fn from_parts(
        one_body: Array2<f64>,
        two_body: Array4<f64>,
        num_alpha: usize,
        num_beta: usize,
    ) -> Self {
        Self {
            one_body,
            two_body,
            num_alpha,
            num_beta,
            nuclear_repulsion: 0.0,
        }
    }

    /// Set the nuclear repulsion energy.
    #[must_use]
    pub fn with_nuclear_repulsion(mut self, energy: f64) -> Self {
        self.nuclear_repulsion = energy;
        self
    }

    /// Check tensor shapes and particle counts.
    pub fn validate(&self) -> ChemResult<()> {
        let (rows, cols) = self.one_body.dim();
        if rows != cols {
            return Err(ChemError::DimensionMismatch(format!(
                "one-body integrals must be square, got {rows}x{cols}"
            )));
        }
        let n = rows;
        if self.two_body.dim() != (n, n, n, n) {
            return Err(ChemError::DimensionMismatch(format!(
                "two-body integrals have shape {:?}, expected ({n}, {n}, {n}, {n})",
                self.two_body.dim()
            )));
        }
        if 2 * n > crate::pauli::MAX_QUBITS as usize {
            return Err(ChemError::TooManyQubits(2 * n as u32));
        }
        if self.num_alpha > n || self.num_beta > n {
            return Err(ChemError::InvalidParticleNumber(format!(
                "({}, {}) particles do not fit {n} spatial orbitals",
                self.num_alpha, self.num_beta
            )));
        }
        Ok(())
    }

    /// Number of spatial orbitals.
    pub fn num_orbitals(&self) -> usize {
        self.one_body.nrows()
    }

    /// Number of spin orbitals (`2 · num_orbitals`).
    pub fn num_spin_orbitals(&self) -> usize {
        2 * self.num_orbitals()
    }

    /// α electrons.
    pub fn num_alpha(&self) -> usize {
        self.num_alpha
    }

    /// β electrons.
    pub fn num_beta(&self) -> usize {
        self.num_beta
    }

    /// `(num_alpha, num_beta)`.
    pub fn num_particles(&self) -> (usize, usize) {
        (self.num_alpha, self.num_beta)
    }

    /// `h_pq`.
    pub fn one_body(&self) -> &Array2<f64> {
        &self.one_body
    }

    /// `(pq|rs)`.
    pub fn two_body(&self) -> &Array4<f64> {
        &self.two_body
    }

    /// Nuclear repulsion energy (constant energy shift).
    pub fn nuclear_repulsion(&self) -> f64 {
        self.nuclear_repulsion
    }

    /// Parse from JSON and validate.
    pub fn from_json_str(json: &str) -> ChemResult<Self> {
        let out: Self = serde_json::from_str(json)?;
        out.validate()?;
        Ok(out)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> ChemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Source of molecular integrals (classical chemistry package, file, fixture).
pub trait ChemistryDriver {
    /// Produce the integrals for one molecule.
    fn run(&self) -> ChemResult<ElectronicIntegrals>;
}

/// Reads integrals previously written with [`ElectronicIntegrals::to_json_string`].
#[derive(Debug, Clone)]
pub struct JsonDriver {
    path: PathBuf,
}

impl JsonDriver {
    /// Driver for the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ChemistryDriver for JsonDriver {
    fn run(&self) -> ChemResult<ElectronicIntegrals> {
        debug!(path = %self.path.display(), "loading integrals");
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            ChemError::Driver(format!("cannot read {}: {e}", self.path.display()))
        })?;
        ElectronicIntegrals::from_json_str(&text)
    }
}
