//! Qubit operators: weighted sums of Pauli strings.
//!
//! ```text
//! O = Σ_k  c_k · P_k      c_k ∈ ℂ
//! ```
//!
//! Every constructor merges identical strings and drops coefficients below
//! [`ZERO_TOLERANCE`], so a `QubitOperator` never holds the same string twice.
//! Terms keep the order in which their string first appeared.

use std::fmt;

use num_complex::Complex64;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};
use crate::pauli::{PauliString, phase_factor};

/// Coefficients with a smaller magnitude are treated as exact zeros.
pub const ZERO_TOLERANCE: f64 = 1e-12;

/// A single weighted Pauli string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// The Pauli string.
    pub pauli: PauliString,
    /// Complex coefficient.
    pub coeff: Complex64,
}

/// Order-preserving accumulator that merges identical strings.
#[derive(Debug, Default)]
pub(crate) struct TermAccumulator {
    index: FxHashMap<PauliString, usize>,
    terms: Vec<PauliTerm>,
}

impl TermAccumulator {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(n, Default::default()),
            terms: Vec::with_capacity(n),
        }
    }

    pub(crate) fn add(&mut self, pauli: PauliString, coeff: Complex64) {
        match self.index.get(&pauli) {
            Some(&i) => self.terms[i].coeff += coeff,
            None => {
                self.index.insert(pauli, self.terms.len());
                self.terms.push(PauliTerm { pauli, coeff });
            }
        }
    }

    pub(crate) fn into_terms(self, tol: f64) -> Vec<PauliTerm> {
        self.terms
            .into_iter()
            .filter(|t| t.coeff.norm() > tol)
            .collect()
    }
}

/// A weighted sum of Pauli strings on a fixed-width register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QubitOperator {
    num_qubits: u32,
    terms: Vec<PauliTerm>,
}

impl QubitOperator {
    /// The zero operator.
    pub fn zero(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    /// `coeff · I`.
    pub fn identity(num_qubits: u32, coeff: f64) -> ChemResult<Self> {
        Self::from_terms(
            num_qubits,
            [(PauliString::identity(num_qubits)?, Complex64::new(coeff, 0.0))],
        )
    }

    /// Build from `(string, coefficient)` pairs, merging duplicates.
    pub fn from_terms(
        num_qubits: u32,
        terms: impl IntoIterator<Item = (PauliString, Complex64)>,
    ) -> ChemResult<Self> {
        let mut acc = TermAccumulator::default();
        for (pauli, coeff) in terms {
            if pauli.num_qubits() != num_qubits {
                return Err(ChemError::QubitCountMismatch {
                    expected: num_qubits,
                    found: pauli.num_qubits(),
                });
            }
            acc.add(pauli, coeff);
        }
        Ok(Self {
            num_qubits,
            terms: acc.into_terms(ZERO_TOLERANCE),
        })
    }

    /// Build from `(label, coefficient)` pairs such as `("IXZY", 0.5)`.
    pub fn from_labels<'a, C>(terms: impl IntoIterator<Item = (&'a str, C)>) -> ChemResult<Self>
    where
        C: Into<Complex64>,
    {
        let mut width = None;
        let mut parsed = Vec::new();
        for (label, coeff) in terms {
            let pauli = PauliString::from_label(label)?;
            let n = *width.get_or_insert(pauli.num_qubits());
            if pauli.num_qubits() != n {
                return Err(ChemError::QubitCountMismatch {
                    expected: n,
                    found: pauli.num_qubits(),
                });
            }
            parsed.push((pauli, coeff.into()));
        }
        Self::from_terms(width.unwrap_or(0), parsed)
    }

    pub(crate) fn from_accumulator(num_qubits: u32, acc: TermAccumulator) -> Self {
        Self {
            num_qubits,
            terms: acc.into_terms(ZERO_TOLERANCE),
        }
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of distinct Pauli strings.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// All terms, in first-appearance order.
    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    /// True if no term survived merging.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient of `pauli` (zero when absent).
    pub fn coefficient(&self, pauli: &PauliString) -> Complex64 {
        self.terms
            .iter()
            .find(|t| t.pauli == *pauli)
            .map_or(Complex64::new(0.0, 0.0), |t| t.coeff)
    }

    /// Σ |c_k|.
    pub fn one_norm(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.norm()).sum()
    }

    fn check_width(&self, other: &Self) -> ChemResult<()> {
        if self.num_qubits != other.num_qubits {
            return Err(ChemError::QubitCountMismatch {
                expected: self.num_qubits,
                found: other.num_qubits,
            });
        }
        Ok(())
    }

    /// `self + other`.
    pub fn add(&self, other: &Self) -> ChemResult<Self> {
        self.check_width(other)?;
        let mut acc = TermAccumulator::with_capacity(self.terms.len() + other.terms.len());
        for t in self.terms.iter().chain(&other.terms) {
            acc.add(t.pauli, t.coeff);
        }
        Ok(Self::from_accumulator(self.num_qubits, acc))
    }

    /// `self - other`.
    pub fn sub(&self, other: &Self) -> ChemResult<Self> {
        self.add(&other.scale(Complex64::new(-1.0, 0.0)))
    }

    /// `c · self`.
    #[must_use]
    pub fn scale(&self, c: Complex64) -> Self {
        let mut acc = TermAccumulator::with_capacity(self.terms.len());
        for t in &self.terms {
            acc.add(t.pauli, t.coeff * c);
        }
        Self::from_accumulator(self.num_qubits, acc)
    }

    /// Operator product `self · other`.
    pub fn compose(&self, other: &Self) -> ChemResult<Self> {
        self.check_width(other)?;
        let mut acc = TermAccumulator::with_capacity(self.terms.len() * other.terms.len());
        for a in &self.terms {
            for b in &other.terms {
                let (p, k) = a.pauli.compose(&b.pauli);
                acc.add(p, a.coeff * b.coeff * phase_factor(k));
            }
        }
        Ok(Self::from_accumulator(self.num_qubits, acc))
    }

    /// Commutator `[self, other] = self·other − other·self`.
    ///
    /// Only anticommuting pairs of strings contribute, each with twice
    /// their product.
    pub fn commutator(&self, other: &Self) -> ChemResult<Self> {
        self.check_width(other)?;
        let mut acc = TermAccumulator::default();
        for a in &self.terms {
            for b in &other.terms {
                if a.pauli.commutes_with(&b.pauli) {
                    continue;
                }
                let (p, k) = a.pauli.compose(&b.pauli);
                acc.add(p, 2.0 * a.coeff * b.coeff * phase_factor(k));
            }
        }
        Ok(Self::from_accumulator(self.num_qubits, acc))
    }

    /// Hermitian conjugate.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self {
            num_qubits: self.num_qubits,
            terms: self
                .terms
                .iter()
                .map(|t| PauliTerm {
                    pauli: t.pauli,
                    coeff: t.coeff.conj(),
                })
                .collect(),
        }
    }

    /// Drop terms with `|c| ≤ tol`.
    #[must_use]
    pub fn chop(&self, tol: f64) -> Self {
        Self {
            num_qubits: self.num_qubits,
            terms: self
                .terms
                .iter()
                .filter(|t| t.coeff.norm() > tol)
                .copied()
                .collect(),
        }
    }

    /// All coefficients real within `tol`.
    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.terms.iter().all(|t| t.coeff.im.abs() <= tol)
    }

    /// All coefficients imaginary within `tol`.
    pub fn is_anti_hermitian(&self, tol: f64) -> bool {
        self.terms.iter().all(|t| t.coeff.re.abs() <= tol)
    }

    /// Largest real part among the coefficients.
    pub fn max_real_part(&self) -> f64 {
        self.terms.iter().map(|t| t.coeff.re.abs()).fold(0.0, f64::max)
    }

    /// True if `pauli` commutes with every term.
    pub fn commutes_with_pauli(&self, pauli: &PauliString) -> bool {
        self.terms.iter().all(|t| t.pauli.commutes_with(pauli))
    }

    /// Equal up to term order, coefficient-wise within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        if self.num_qubits != other.num_qubits {
            return false;
        }
        match self.sub(other) {
            Ok(diff) => diff.terms.iter().all(|t| t.coeff.norm() <= tol),
            Err(_) => false,
        }
    }

    fn check_state(&self, len: usize) -> ChemResult<()> {
        let expected = 1usize
            .checked_shl(self.num_qubits)
            .filter(|&dim| dim <= isize::MAX as usize)
            .ok_or(ChemError::DenseTooLarge {
                num_qubits: self.num_qubits,
                max: usize::BITS - 2,
            })?;
        if len != expected {
            return Err(ChemError::StateDimension {
                expected,
                found: len,
            });
        }
        Ok(())
    }

    /// `O|ψ⟩` for a dense amplitude vector.
    pub fn apply(&self, state: &[Complex64]) -> ChemResult<Vec<Complex64>> {
        self.check_state(state.len())?;
        let mut out = vec![Complex64::new(0.0, 0.0); state.len()];
        for t in &self.terms {
            for (b, amp) in state.iter().enumerate() {
                if amp.norm_sqr() == 0.0 {
                    continue;
                }
                let (target, phase) = t.pauli.apply_to_basis(b as u64);
                out[target as usize] += t.coeff * phase * amp;
            }
        }
        Ok(out)
    }

    /// `⟨ψ|O|ψ⟩` (complex in general, real for Hermitian `O`).
    pub fn expectation_complex(&self, state: &[Complex64]) -> ChemResult<Complex64> {
        self.check_state(state.len())?;
        let mut total = Complex64::new(0.0, 0.0);
        for t in &self.terms {
            let mut partial = Complex64::new(0.0, 0.0);
            for (b, amp) in state.iter().enumerate() {
                let (target, phase) = t.pauli.apply_to_basis(b as u64);
                partial += state[target as usize].conj() * phase * amp;
            }
            total += t.coeff * partial;
        }
        Ok(total)
    }

    /// Real part of `⟨ψ|O|ψ⟩`.
    pub fn expectation(&self, state: &[Complex64]) -> ChemResult<f64> {
        Ok(self.expectation_complex(state)?.re)
    }

    /// `⟨b|O|b⟩` for a computational basis state.
    pub fn basis_expectation(&self, index: u64) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.pauli.is_diagonal())
            .map(|t| t.coeff.re * f64::from(t.pauli.basis_eigenvalue(index)))
            .sum()
    }
}

impl fmt::Display for QubitOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if t.coeff.im == 0.0 {
                write!(f, "{:+.12} * {}", t.coeff.re, t.pauli)?;
            } else {
                write!(f, "({:+.12}{:+.12}i) * {}", t.coeff.re, t.coeff.im, t.pauli)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_duplicates_merged() {
        let op = QubitOperator::from_labels([("XZ", 0.5), ("IZ", 1.0), ("XZ", 0.25)]).unwrap();
        assert_eq!(op.num_terms(), 2);
        let xz = PauliString::from_label("XZ").unwrap();
        assert!((op.coefficient(&xz).re - 0.75).abs() < 1e-15);
        assert_eq!(op.terms()[0].pauli, xz);
    }

    #[test]
    fn test_cancellation_drops_term() {
        let op = QubitOperator::from_labels([("XX", 1.0), ("XX", -1.0), ("ZZ", 2.0)]).unwrap();
        assert_eq!(op.num_terms(), 1);
    }

    #[test]
    fn test_width_mismatch() {
        let a = QubitOperator::from_labels([("XX", 1.0)]).unwrap();
        let b = QubitOperator::from_labels([("XXX", 1.0)]).unwrap();
        assert!(matches!(
            a.add(&b),
            Err(ChemError::QubitCountMismatch { expected: 2, found: 3 })
        ));
        assert!(QubitOperator::from_labels([("X", 1.0), ("XX", 1.0)]).is_err());
    }

    #[test]
    fn test_compose_pauli_algebra() {
        let x = QubitOperator::from_labels([("X", 1.0)]).unwrap();
        let y = QubitOperator::from_labels([("Y", 1.0)]).unwrap();
        let xy = x.compose(&y).unwrap();
        let expected = QubitOperator::from_labels([("Z", c(0.0, 1.0))]).unwrap();
        assert!(xy.approx_eq(&expected, 1e-14));
    }

    #[test]
    fn test_commutator_matches_products() {
        let a = QubitOperator::from_labels([("XI", 0.3), ("ZZ", -0.7), ("IY", 1.1)]).unwrap();
        let b = QubitOperator::from_labels([("YX", c(0.0, 0.5)), ("XY", c(0.0, -0.5))]).unwrap();
        let direct = a.compose(&b).unwrap().sub(&b.compose(&a).unwrap()).unwrap();
        assert!(a.commutator(&b).unwrap().approx_eq(&direct, 1e-12));
    }

    #[test]
    fn test_hermiticity() {
        let h = QubitOperator::from_labels([("XX", 0.5), ("ZI", -0.2)]).unwrap();
        assert!(h.is_hermitian(1e-12));
        let t = h.scale(c(0.0, 1.0));
        assert!(t.is_anti_hermitian(1e-12));
        assert!(!t.is_hermitian(1e-12));
        assert!(t.adjoint().approx_eq(&t.scale(c(-1.0, 0.0)), 1e-14));
    }

    #[test]
    fn test_expectation_on_basis_and_dense() {
        let h = QubitOperator::from_labels([("ZI", 0.5), ("IZ", 0.25), ("XX", 1.0)]).unwrap();
        // |01⟩: q0 = 1, q1 = 0
        assert!((h.basis_expectation(0b01) - (0.5 - 0.25)).abs() < 1e-15);

        let mut state = vec![c(0.0, 0.0); 4];
        state[0b01] = c(1.0, 0.0);
        assert!((h.expectation(&state).unwrap() - 0.25).abs() < 1e-15);

        // (|01⟩ + |10⟩)/√2 picks up ⟨XX⟩ = 1
        let s = std::f64::consts::FRAC_1_SQRT_2;
        state[0b01] = c(s, 0.0);
        state[0b10] = c(s, 0.0);
        assert!((h.expectation(&state).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_state_dimension_checked() {
        let h = QubitOperator::from_labels([("ZZ", 1.0)]).unwrap();
        assert!(matches!(
            h.expectation(&[c(1.0, 0.0), c(0.0, 0.0)]),
            Err(ChemError::StateDimension { expected: 4, found: 2 })
        ));
    }

    #[test]
    fn test_dense_state_width_bounded() {
        let wide = QubitOperator::zero(64);
        let state = [c(1.0, 0.0)];
        assert!(matches!(
            wide.expectation(&state),
            Err(ChemError::DenseTooLarge { num_qubits: 64, .. })
        ));
        assert!(matches!(
            wide.apply(&state),
            Err(ChemError::DenseTooLarge { num_qubits: 64, .. })
        ));
    }
}
