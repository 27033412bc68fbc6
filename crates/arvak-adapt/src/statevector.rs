//! Dense statevector used by the exact backends.

use arvak_chem::{ChemError, PauliString, QubitOperator};
use num_complex::Complex64;

use crate::error::{AdaptError, AdaptResult};

/// Largest register the dense simulator accepts.
pub const MAX_STATEVECTOR_QUBITS: u32 = 24;

/// Real parts of generator coefficients above this make it non-anti-Hermitian.
const ANTI_HERMITIAN_TOLERANCE: f64 = 1e-10;

/// Amplitudes over the computational basis, qubit 0 the least significant bit.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: u32,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// `|index⟩` on `num_qubits` qubits.
    pub fn basis_state(num_qubits: u32, index: u64) -> AdaptResult<Self> {
        if num_qubits > MAX_STATEVECTOR_QUBITS {
            return Err(AdaptError::QubitMismatch(format!(
                "{num_qubits} qubits exceed the statevector limit of {MAX_STATEVECTOR_QUBITS}"
            )));
        }
        let dim = 1usize << num_qubits;
        if index as usize >= dim {
            return Err(AdaptError::QubitMismatch(format!(
                "basis index {index:#b} does not fit {num_qubits} qubits"
            )));
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); dim];
        amplitudes[index as usize] = Complex64::new(1.0, 0.0);
        Ok(Self {
            num_qubits,
            amplitudes,
        })
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// `⟨ψ|ψ⟩`.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(Complex64::norm_sqr).sum()
    }

    /// `|ψ⟩ ← exp(iφP)|ψ⟩ = cos φ |ψ⟩ + i sin φ P|ψ⟩`.
    pub fn apply_pauli_rotation(&mut self, pauli: &PauliString, angle: f64) {
        if pauli.is_identity() {
            let phase = Complex64::from_polar(1.0, angle);
            self.amplitudes.iter_mut().for_each(|a| *a *= phase);
            return;
        }
        let (sin, cos) = angle.sin_cos();
        let i_sin = Complex64::new(0.0, sin);
        let mut out: Vec<Complex64> = self.amplitudes.iter().map(|a| a * cos).collect();
        for (b, amp) in self.amplitudes.iter().enumerate() {
            if amp.norm_sqr() == 0.0 {
                continue;
            }
            let (target, phase) = pauli.apply_to_basis(b as u64);
            out[target as usize] += i_sin * phase * amp;
        }
        self.amplitudes = out;
    }

    /// `|ψ⟩ ← exp(θT)|ψ⟩` for anti-Hermitian `T = Σ_k i·w_k·P_k`.
    ///
    /// Applied as the ordered product `Π_k exp(iθ w_k P_k)`, which is exact
    /// when the strings of `T` commute (as they do for single and double
    /// excitation generators).
    pub fn apply_exponential(&mut self, generator: &QubitOperator, theta: f64) -> AdaptResult<()> {
        self.check_width(generator.num_qubits())?;
        for term in generator.terms() {
            if term.coeff.re.abs() > ANTI_HERMITIAN_TOLERANCE {
                return Err(ChemError::NotAntiHermitian(term.coeff.re).into());
            }
            self.apply_pauli_rotation(&term.pauli, theta * term.coeff.im);
        }
        Ok(())
    }

    /// `⟨ψ|O|ψ⟩` (real part).
    pub fn expectation(&self, observable: &QubitOperator) -> AdaptResult<f64> {
        self.check_width(observable.num_qubits())?;
        Ok(observable.expectation(&self.amplitudes)?)
    }

    /// `⟨ψ|P|ψ⟩` for a single Hermitian string.
    pub fn pauli_expectation(&self, pauli: &PauliString) -> f64 {
        let mut total = Complex64::new(0.0, 0.0);
        for (b, amp) in self.amplitudes.iter().enumerate() {
            if amp.norm_sqr() == 0.0 {
                continue;
            }
            let (target, phase) = pauli.apply_to_basis(b as u64);
            total += self.amplitudes[target as usize].conj() * phase * amp;
        }
        total.re
    }

    fn check_width(&self, num_qubits: u32) -> AdaptResult<()> {
        if num_qubits != self.num_qubits {
            return Err(AdaptError::QubitMismatch(format!(
                "operator acts on {num_qubits} qubits, state has {}",
                self.num_qubits
            )));
        }
        Ok(())
    }
}
