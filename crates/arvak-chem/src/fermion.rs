//! Second-quantized fermionic operators.
//!
//! Spin orbitals use block ordering: for `n` spatial orbitals, modes
//! `0..n` are the α spin orbitals and modes `n..2n` the β spin orbitals, so
//! spatial orbital `p` with spin `σ` is mode `p + σ·n`.
//!
//! The electronic Hamiltonian built from integrals is
//!
//! ```text
//! H = Σ_{pq} h_pq a†_p a_q  +  ½ Σ_{pqrs} (pq|rs) a†_p a†_r a_s a_q
//! ```
//!
//! with `(pq|rs)` in chemists' notation and both index pairs spin-conserving.

use ndarray::{Array2, Array4};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};
use crate::integrals::ElectronicIntegrals;
use crate::mapping::QubitMapper;
use crate::operator::QubitOperator;

/// Integral magnitudes at or below this are not emitted as terms.
const INTEGRAL_TOLERANCE: f64 = 1e-12;

/// A creation or annihilation operator on one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LadderOp {
    /// `a†_j`
    Create(u32),
    /// `a_j`
    Annihilate(u32),
}

impl LadderOp {
    /// Mode index.
    pub fn mode(self) -> u32 {
        match self {
            Self::Create(j) | Self::Annihilate(j) => j,
        }
    }

    /// True for `a†`.
    pub fn is_creation(self) -> bool {
        matches!(self, Self::Create(_))
    }

    /// Hermitian conjugate.
    #[must_use]
    pub fn dagger(self) -> Self {
        match self {
            Self::Create(j) => Self::Annihilate(j),
            Self::Annihilate(j) => Self::Create(j),
        }
    }
}

/// `coeff · op₀ op₁ … op_k` (leftmost operator applied last).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FermionTerm {
    /// Ladder operators in product order.
    pub ops: Vec<LadderOp>,
    /// Complex coefficient.
    pub coeff: Complex64,
}

impl FermionTerm {
    /// Net change in particle count for α modes and β modes.
    pub fn spin_particle_change(&self, num_orbitals: u32) -> (i32, i32) {
        let mut alpha = 0;
        let mut beta = 0;
        for op in &self.ops {
            let delta = if op.is_creation() { 1 } else { -1 };
            if op.mode() < num_orbitals {
                alpha += delta;
            } else {
                beta += delta;
            }
        }
        (alpha, beta)
    }
}

/// A sum of ladder-operator products over a fixed number of modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FermionicOperator {
    num_modes: u32,
    terms: Vec<FermionTerm>,
    /// Scalar offset kept apart from the mapped terms (nuclear repulsion).
    energy_shift: f64,
}

impl FermionicOperator {
    /// The zero operator on `num_modes` spin orbitals.
    pub fn new(num_modes: u32) -> Self {
        Self {
            num_modes,
            terms: Vec::new(),
            energy_shift: 0.0,
        }
    }

    /// Append `coeff · ops`.
    pub fn add_term(&mut self, coeff: Complex64, ops: Vec<LadderOp>) -> ChemResult<()> {
        if let Some(bad) = ops.iter().find(|op| op.mode() >= self.num_modes) {
            return Err(ChemError::ModeOutOfRange {
                mode: bad.mode(),
                num_modes: self.num_modes,
            });
        }
        self.terms.push(FermionTerm { ops, coeff });
        Ok(())
    }

    /// Electronic Hamiltonian from spatial-orbital integrals.
    ///
    /// The nuclear repulsion becomes the operator's energy shift.
    pub fn from_integrals(integrals: &ElectronicIntegrals) -> ChemResult<Self> {
        integrals.validate()?;
        let n = integrals.num_orbitals();
        let h1 = integrals.one_body();
        let h2 = integrals.two_body();
        let num_orbitals = n as u32;
        let mut op = Self::new(2 * num_orbitals);

        for spin in 0..2u32 {
            let off = spin * num_orbitals;
            for p in 0..n {
                for q in 0..n {
                    let v = h1[[p, q]];
                    if v.abs() > INTEGRAL_TOLERANCE {
                        op.add_term(
                            Complex64::new(v, 0.0),
                            vec![
                                LadderOp::Create(p as u32 + off),
                                LadderOp::Annihilate(q as u32 + off),
                            ],
                        )?;
                    }
                }
            }
        }

        for s1 in 0..2u32 {
            for s2 in 0..2u32 {
                let o1 = s1 * num_orbitals;
                let o2 = s2 * num_orbitals;
                for p in 0..n {
                    for q in 0..n {
                        for r in 0..n {
                            for s in 0..n {
                                let v = h2[[p, q, r, s]];
                                if v.abs() <= INTEGRAL_TOLERANCE {
                                    continue;
                                }
                                let (cp, cr) = (p as u32 + o1, r as u32 + o2);
                                let (aq, as_) = (q as u32 + o1, s as u32 + o2);
                                // a†a† or aa on the same mode vanishes
                                if cp == cr || aq == as_ {
                                    continue;
                                }
                                op.add_term(
                                    Complex64::new(0.5 * v, 0.0),
                                    vec![
                                        LadderOp::Create(cp),
                                        LadderOp::Create(cr),
                                        LadderOp::Annihilate(as_),
                                        LadderOp::Annihilate(aq),
                                    ],
                                )?;
                            }
                        }
                    }
                }
            }
        }

        op.energy_shift = integrals.nuclear_repulsion();
        Ok(op)
    }

    /// Hamiltonian from spin-orbital tensors
    /// `Σ h_pq a†_p a_q + ½ Σ g_pqrs a†_p a†_r a_s a_q`.
    pub fn from_spin_orbital_tensors(h1: &Array2<f64>, h2: &Array4<f64>) -> ChemResult<Self> {
        let (rows, cols) = h1.dim();
        if rows != cols {
            return Err(ChemError::DimensionMismatch(format!(
                "one-body tensor must be square, got {rows}x{cols}"
            )));
        }
        let n = rows;
        if h2.dim() != (n, n, n, n) {
            return Err(ChemError::DimensionMismatch(format!(
                "two-body tensor has shape {:?}, expected ({n}, {n}, {n}, {n})",
                h2.dim()
            )));
        }
        let mut op = Self::new(n as u32);
        for ((p, q), &v) in h1.indexed_iter() {
            if v.abs() > INTEGRAL_TOLERANCE {
                op.add_term(
                    Complex64::new(v, 0.0),
                    vec![LadderOp::Create(p as u32), LadderOp::Annihilate(q as u32)],
                )?;
            }
        }
        for ((p, q, r, s), &v) in h2.indexed_iter() {
            if v.abs() <= INTEGRAL_TOLERANCE || p == r || q == s {
                continue;
            }
            op.add_term(
                Complex64::new(0.5 * v, 0.0),
                vec![
                    LadderOp::Create(p as u32),
                    LadderOp::Create(r as u32),
                    LadderOp::Annihilate(s as u32),
                    LadderOp::Annihilate(q as u32),
                ],
            )?;
        }
        Ok(op)
    }

    /// Number of spin orbitals.
    pub fn num_modes(&self) -> u32 {
        self.num_modes
    }

    /// All terms.
    pub fn terms(&self) -> &[FermionTerm] {
        &self.terms
    }

    /// Number of ladder-operator products.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Scalar offset not carried by the terms.
    pub fn energy_shift(&self) -> f64 {
        self.energy_shift
    }

    /// Replace the scalar offset.
    #[must_use]
    pub fn with_energy_shift(mut self, shift: f64) -> Self {
        self.energy_shift = shift;
        self
    }

    /// Hermitian conjugate (the energy shift is real and kept).
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self {
            num_modes: self.num_modes,
            terms: self
                .terms
                .iter()
                .map(|t| FermionTerm {
                    ops: t.ops.iter().rev().map(|op| op.dagger()).collect(),
                    coeff: t.coeff.conj(),
                })
                .collect(),
            energy_shift: self.energy_shift,
        }
    }

    /// `self − other` as a concatenation of terms.
    pub fn sub(&self, other: &Self) -> ChemResult<Self> {
        if self.num_modes != other.num_modes {
            return Err(ChemError::DimensionMismatch(format!(
                "cannot combine operators on {} and {} modes",
                self.num_modes, other.num_modes
            )));
        }
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().map(|t| FermionTerm {
            ops: t.ops.clone(),
            coeff: -t.coeff,
        }));
        Ok(Self {
            num_modes: self.num_modes,
            terms,
            energy_shift: self.energy_shift - other.energy_shift,
        })
    }

    /// True if every term leaves the α and β particle counts unchanged.
    pub fn conserves_spin_particle_number(&self) -> bool {
        let half = self.num_modes / 2;
        self.terms
            .iter()
            .all(|t| t.spin_particle_change(half) == (0, 0))
    }

    /// Map to a qubit operator; the energy shift is not included.
    pub fn map(&self, mapper: &dyn QubitMapper) -> ChemResult<QubitOperator> {
        mapper.map(self)
    }

    /// Map to a qubit operator with the energy shift folded into the identity term.
    pub fn map_with_shift(&self, mapper: &dyn QubitMapper) -> ChemResult<QubitOperator> {
        let mapped = mapper.map(self)?;
        mapped.add(&QubitOperator::identity(mapped.num_qubits(), self.energy_shift)?)
    }
}
