//! Excitation operators and the operator pool for adaptive ansätze.
//!
//! An excitation moves electrons from occupied to virtual spin orbitals of
//! the Hartree-Fock reference. Its generator is the anti-Hermitian hopping
//! operator `T = E − E†`, so `exp(θ T)` is unitary for real `θ`.
//!
//! Pool order is fixed: α singles, β singles, αα doubles, ββ doubles, then
//! αβ doubles, each in lexicographic (occupied, virtual) order.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ChemError, ChemResult};
use crate::fermion::{FermionicOperator, LadderOp};
use crate::mapping::QubitMapper;
use crate::operator::QubitOperator;
use crate::reference::HartreeFock;
use crate::symmetry::Z2Symmetries;

/// Real coefficients of a mapped hopping operator must vanish to this level.
const ANTI_HERMITIAN_TOLERANCE: f64 = 1e-10;

/// A particle-number and spin conserving excitation on spin-orbital indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Excitation {
    /// `i → a`
    Single {
        /// Occupied mode.
        from: u32,
        /// Virtual mode.
        to: u32,
    },
    /// `(i, j) → (a, b)`
    Double {
        /// Occupied modes, `from[0] < from[1]` for same-spin pairs.
        from: [u32; 2],
        /// Virtual modes, `to[0] < to[1]` for same-spin pairs.
        to: [u32; 2],
    },
}

impl Excitation {
    /// 1 for singles, 2 for doubles.
    pub fn rank(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Double { .. } => 2,
        }
    }

    /// `E`: `a†_a a_i` or `a†_a a†_b a_j a_i`.
    pub fn excitation_operator(&self, num_modes: u32) -> ChemResult<FermionicOperator> {
        let ops = match *self {
            Self::Single { from, to } => vec![LadderOp::Create(to), LadderOp::Annihilate(from)],
            Self::Double { from, to } => vec![
                LadderOp::Create(to[0]),
                LadderOp::Create(to[1]),
                LadderOp::Annihilate(from[1]),
                LadderOp::Annihilate(from[0]),
            ],
        };
        let mut op = FermionicOperator::new(num_modes);
        op.add_term(Complex64::new(1.0, 0.0), ops)?;
        Ok(op)
    }

    /// `T = E − E†`.
    pub fn hopping_operator(&self, num_modes: u32) -> ChemResult<FermionicOperator> {
        let e = self.excitation_operator(num_modes)?;
        e.sub(&e.adjoint())
    }
}

impl fmt::Display for Excitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single { from, to } => write!(f, "{from}->{to}"),
            Self::Double { from, to } => {
                write!(f, "{},{}->{},{}", from[0], from[1], to[0], to[1])
            }
        }
    }
}

/// Which excitation ranks to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcitationRanks {
    /// Include single excitations.
    pub singles: bool,
    /// Include double excitations.
    pub doubles: bool,
}

impl Default for ExcitationRanks {
    fn default() -> Self {
        Self {
            singles: true,
            doubles: true,
        }
    }
}

fn pairs(modes: &[u32]) -> Vec<[u32; 2]> {
    let mut out = Vec::new();
    for (k, &a) in modes.iter().enumerate() {
        for &b in &modes[k + 1..] {
            out.push([a, b]);
        }
    }
    out
}

/// Spin-conserving singles and doubles out of the reference, in pool order.
pub fn enumerate_excitations(reference: &HartreeFock, ranks: ExcitationRanks) -> Vec<Excitation> {
    let n = reference.num_orbitals();
    let (num_alpha, num_beta) = reference.num_particles();
    let occ_a: Vec<u32> = (0..num_alpha as u32).collect();
    let vir_a: Vec<u32> = (num_alpha as u32..n).collect();
    let occ_b: Vec<u32> = (n..n + num_beta as u32).collect();
    let vir_b: Vec<u32> = (n + num_beta as u32..2 * n).collect();

    let mut out = Vec::new();
    if ranks.singles {
        for (occ, vir) in [(&occ_a, &vir_a), (&occ_b, &vir_b)] {
            for &from in occ {
                for &to in vir {
                    out.push(Excitation::Single { from, to });
                }
            }
        }
    }
    if ranks.doubles {
        for (occ, vir) in [(&occ_a, &vir_a), (&occ_b, &vir_b)] {
            for from in pairs(occ) {
                for to in pairs(vir) {
                    out.push(Excitation::Double { from, to });
                }
            }
        }
        for &i in &occ_a {
            for &j in &occ_b {
                for &a in &vir_a {
                    for &b in &vir_b {
                        out.push(Excitation::Double {
                            from: [i, j],
                            to: [a, b],
                        });
                    }
                }
            }
        }
    }
    out
}

/// One pool entry: the excitation, its fermionic generator, and the mapped
/// (and possibly tapered) qubit generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoppingOperator {
    excitation: Excitation,
    fermionic: FermionicOperator,
    qubit: QubitOperator,
}

impl HoppingOperator {
    /// The excitation this generator implements.
    pub fn excitation(&self) -> Excitation {
        self.excitation
    }

    /// `E − E†` on spin orbitals.
    pub fn fermionic(&self) -> &FermionicOperator {
        &self.fermionic
    }

    /// Qubit form used by the ansatz.
    pub fn qubit_operator(&self) -> &QubitOperator {
        &self.qubit
    }

    /// Identifier used in results.
    pub fn label(&self) -> String {
        self.excitation.to_string()
    }
}

/// Immutable, ordered set of candidate generators.
#[derive(Debug, Clone)]
pub struct OperatorPool {
    num_qubits: u32,
    operators: Vec<Arc<HoppingOperator>>,
}

impl OperatorPool {
    /// Register width of every generator.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// True if no candidate survived construction.
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Candidate at `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<HoppingOperator>> {
        self.operators.get(index)
    }

    /// All candidates, in pool order.
    pub fn operators(&self) -> &[Arc<HoppingOperator>] {
        &self.operators
    }

    /// Iterate in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<HoppingOperator>> {
        self.operators.iter()
    }
}

/// Builds an [`OperatorPool`] for one problem instance.
///
/// ```rust
/// use arvak_chem::excitation::PoolBuilder;
/// use arvak_chem::mapping::ParityMapper;
/// use arvak_chem::reference::HartreeFock;
/// use arvak_chem::symmetry::Z2Symmetries;
///
/// let hf = HartreeFock::new(2, 1, 1).unwrap();
/// let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
/// let pool = PoolBuilder::new(&hf, &ParityMapper)
///     .with_symmetries(&z2)
///     .build(2)
///     .unwrap();
/// assert_eq!(pool.len(), 3);
/// ```
pub struct PoolBuilder<'a> {
    reference: &'a HartreeFock,
    mapper: &'a dyn QubitMapper,
    symmetries: Option<&'a Z2Symmetries>,
    ranks: ExcitationRanks,
}

impl<'a> PoolBuilder<'a> {
    /// Pool of singles and doubles out of `reference`, mapped with `mapper`.
    pub fn new(reference: &'a HartreeFock, mapper: &'a dyn QubitMapper) -> Self {
        Self {
            reference,
            mapper,
            symmetries: None,
            ranks: ExcitationRanks::default(),
        }
    }

    /// Taper every generator with the Hamiltonian's symmetries.
    #[must_use]
    pub fn with_symmetries(mut self, symmetries: &'a Z2Symmetries) -> Self {
        self.symmetries = Some(symmetries);
        self
    }

    /// Restrict the excitation ranks.
    #[must_use]
    pub fn with_ranks(mut self, ranks: ExcitationRanks) -> Self {
        self.ranks = ranks;
        self
    }

    /// Enumerate, map and taper. `num_qubits` must equal the final width.
    pub fn build(self, num_qubits: u32) -> ChemResult<OperatorPool> {
        let num_modes = self.reference.num_spin_orbitals();
        let expected = match self.symmetries {
            Some(z2) => {
                if z2.num_qubits() != num_modes {
                    return Err(ChemError::QubitCountMismatch {
                        expected: num_modes,
                        found: z2.num_qubits(),
                    });
                }
                z2.reduced_num_qubits()
            }
            None => num_modes,
        };
        if num_qubits != expected {
            return Err(ChemError::QubitCountMismatch {
                expected,
                found: num_qubits,
            });
        }

        let excitations = enumerate_excitations(self.reference, self.ranks);
        let mut operators = Vec::with_capacity(excitations.len());
        for excitation in excitations {
            let fermionic = excitation.hopping_operator(num_modes)?;
            debug_assert!(fermionic.conserves_spin_particle_number());

            let mut qubit = self.mapper.map(&fermionic)?;
            if let Some(z2) = self.symmetries {
                if !z2.commutes_with(&qubit) {
                    debug!(%excitation, "excluded: breaks a tapering symmetry");
                    continue;
                }
                qubit = z2.taper(&qubit)?;
            }
            if qubit.is_zero() {
                debug!(%excitation, "excluded: vanishes after mapping");
                continue;
            }
            if !qubit.is_anti_hermitian(ANTI_HERMITIAN_TOLERANCE) {
                return Err(ChemError::NotAntiHermitian(qubit.max_real_part()));
            }
            operators.push(Arc::new(HoppingOperator {
                excitation,
                fermionic,
                qubit,
            }));
        }

        info!(
            num_qubits,
            scheme = %self.mapper.scheme(),
            pool_size = operators.len(),
            "built excitation pool"
        );
        Ok(OperatorPool {
            num_qubits,
            operators,
        })
    }
}
