//! Fermion-to-qubit mappings.
//!
//! Every scheme implemented here is linear in the Majorana operators: for
//! each mode `j` it supplies a pair of Pauli strings `(A_j, B_j)` with
//!
//! ```text
//! a†_j = ½ (A_j − i B_j)        a_j = ½ (A_j + i B_j)
//! ```
//!
//! and mapping a fermionic operator is the expansion of each ladder product
//! in those strings. The schemes only differ in the table and in how an
//! occupation-number state is encoded (see [`QubitMapper::update_set`]).
//!
//! | Scheme          | Qubit `k` stores            |
//! |-----------------|-----------------------------|
//! | Jordan-Wigner   | occupation of mode `k`      |
//! | Parity          | parity of modes `0..=k`     |
//! | Bravyi-Kitaev   | Fenwick-tree partial parity |

pub mod bravyi_kitaev;
pub mod jordan_wigner;
pub mod parity;

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChemError, ChemResult};
use crate::fermion::{FermionicOperator, LadderOp};
use crate::operator::{QubitOperator, TermAccumulator, ZERO_TOLERANCE};
use crate::pauli::{MAX_QUBITS, PauliString, phase_factor};

pub use bravyi_kitaev::BravyiKitaevMapper;
pub use jordan_wigner::JordanWignerMapper;
pub use parity::ParityMapper;

/// Majorana pair `(A_j, B_j)` for one mode.
pub type MajoranaPair = (PauliString, PauliString);

/// A fermion-to-qubit encoding.
pub trait QubitMapper: Send + Sync + fmt::Debug {
    /// Which scheme this is.
    fn scheme(&self) -> MappingScheme;

    /// `(A_j, B_j)` for every mode of an `num_modes`-mode register.
    fn pauli_table(&self, num_modes: u32) -> ChemResult<Vec<MajoranaPair>>;

    /// Qubits whose value flips when mode `mode` becomes occupied.
    fn update_set(&self, mode: u32, num_modes: u32) -> Vec<u32>;

    /// True if the particle-number parities sit on single qubits.
    fn allows_two_qubit_reduction(&self) -> bool {
        false
    }

    /// Map a fermionic operator; its energy shift is not included.
    fn map(&self, op: &FermionicOperator) -> ChemResult<QubitOperator> {
        let table = self.pauli_table(op.num_modes())?;
        let mapped = map_with_table(op, &table)?;
        debug!(
            scheme = %self.scheme(),
            fermion_terms = op.num_terms(),
            qubit_terms = mapped.num_terms(),
            "mapped fermionic operator"
        );
        Ok(mapped)
    }

    /// Computational basis index encoding the given occupied modes.
    fn encode_occupation(&self, occupied: &[u32], num_modes: u32) -> ChemResult<u64> {
        check_width(num_modes)?;
        let mut bits = 0u64;
        for &mode in occupied {
            if mode >= num_modes {
                return Err(ChemError::ModeOutOfRange { mode, num_modes });
            }
            for q in self.update_set(mode, num_modes) {
                bits ^= 1u64 << q;
            }
        }
        Ok(bits)
    }
}

pub(crate) fn check_width(num_modes: u32) -> ChemResult<()> {
    if num_modes > MAX_QUBITS {
        return Err(ChemError::TooManyQubits(num_modes));
    }
    Ok(())
}

/// Expand every ladder product in the Majorana table.
pub fn map_with_table(op: &FermionicOperator, table: &[MajoranaPair]) -> ChemResult<QubitOperator> {
    let n = op.num_modes();
    if table.len() != n as usize {
        return Err(ChemError::DimensionMismatch(format!(
            "mapping table covers {} modes, operator has {n}",
            table.len()
        )));
    }
    let identity = PauliString::identity(n)?;
    let half = Complex64::new(0.5, 0.0);
    let mut total = TermAccumulator::default();

    for term in op.terms() {
        let mut partial = vec![(identity, term.coeff)];
        for ladder in &term.ops {
            let (a, b) = &table[ladder.mode() as usize];
            let b_coeff = match ladder {
                LadderOp::Create(_) => Complex64::new(0.0, -0.5),
                LadderOp::Annihilate(_) => Complex64::new(0.0, 0.5),
            };
            let mut next = TermAccumulator::with_capacity(2 * partial.len());
            for (p, c) in &partial {
                let (pa, ka) = p.compose(a);
                next.add(pa, c * half * phase_factor(ka));
                let (pb, kb) = p.compose(b);
                next.add(pb, c * b_coeff * phase_factor(kb));
            }
            partial = next
                .into_terms(0.0)
                .into_iter()
                .map(|t| (t.pauli, t.coeff))
                .collect();
        }
        for (p, c) in partial {
            total.add(p, c);
        }
    }
    Ok(QubitOperator::from_accumulator(n, total).chop(ZERO_TOLERANCE))
}

/// Mapping scheme selector, parsed from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingScheme {
    /// Jordan-Wigner.
    JordanWigner,
    /// Parity.
    Parity,
    /// Bravyi-Kitaev.
    BravyiKitaev,
}

impl MappingScheme {
    /// Instantiate the mapper for this scheme.
    pub fn mapper(self) -> Box<dyn QubitMapper> {
        match self {
            Self::JordanWigner => Box::new(JordanWignerMapper),
            Self::Parity => Box::new(ParityMapper),
            Self::BravyiKitaev => Box::new(BravyiKitaevMapper),
        }
    }

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::JordanWigner => "jordan_wigner",
            Self::Parity => "parity",
            Self::BravyiKitaev => "bravyi_kitaev",
        }
    }
}

impl fmt::Display for MappingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingScheme {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "jordan_wigner" | "jw" => Ok(Self::JordanWigner),
            "parity" => Ok(Self::Parity),
            "bravyi_kitaev" | "bk" => Ok(Self::BravyiKitaev),
            _ => Err(ChemError::UnsupportedMappingScheme(s.to_string())),
        }
    }
}

/// Build a mapper from a configuration name.
pub fn mapper_from_name(name: &str) -> ChemResult<Box<dyn QubitMapper>> {
    Ok(name.parse::<MappingScheme>()?.mapper())
}
