//! Dense exact diagonalization for small registers.
//!
//! Used as the numerical reference for mappings, tapering and the variational
//! energy. Matrices are `2^n × 2^n`, so the register is capped at
//! [`MAX_DENSE_QUBITS`].

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{ChemError, ChemResult};
use crate::fermion::{FermionicOperator, LadderOp};
use crate::operator::QubitOperator;

/// Largest register turned into a dense matrix.
pub const MAX_DENSE_QUBITS: u32 = 12;

fn check_dense(num_qubits: u32) -> ChemResult<usize> {
    if num_qubits > MAX_DENSE_QUBITS {
        return Err(ChemError::DenseTooLarge {
            num_qubits,
            max: MAX_DENSE_QUBITS,
        });
    }
    Ok(1usize << num_qubits)
}

/// Dense matrix of a qubit operator in the computational basis.
pub fn qubit_matrix(op: &QubitOperator) -> ChemResult<DMatrix<Complex64>> {
    let dim = check_dense(op.num_qubits())?;
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for term in op.terms() {
        for col in 0..dim {
            let (row, phase) = term.pauli.apply_to_basis(col as u64);
            m[(row as usize, col)] += term.coeff * phase;
        }
    }
    Ok(m)
}

/// Dense matrix of a fermionic operator in the occupation-number basis.
///
/// Basis state `b` has mode `j` occupied when bit `j` is set; ladder
/// operators pick up `(−1)^{#occupied modes below j}`.
pub fn fock_matrix(op: &FermionicOperator) -> ChemResult<DMatrix<Complex64>> {
    let dim = check_dense(op.num_modes())?;
    let mut m = DMatrix::<Complex64>::zeros(dim, dim);
    for term in op.terms() {
        'basis: for col in 0..dim {
            let mut state = col as u64;
            let mut sign = 1.0;
            for ladder in term.ops.iter().rev() {
                let bit = 1u64 << ladder.mode();
                let occupied = state & bit != 0;
                match ladder {
                    LadderOp::Create(_) if occupied => continue 'basis,
                    LadderOp::Annihilate(_) if !occupied => continue 'basis,
                    _ => {}
                }
                if (state & (bit - 1)).count_ones() % 2 == 1 {
                    sign = -sign;
                }
                state ^= bit;
            }
            m[(state as usize, col)] += term.coeff * sign;
        }
    }
    Ok(m)
}

/// Ascending eigenvalues of a Hermitian matrix.
pub fn hermitian_eigenvalues(m: DMatrix<Complex64>) -> Vec<f64> {
    let mut values: Vec<f64> = m.symmetric_eigenvalues().iter().copied().collect();
    values.sort_by(f64::total_cmp);
    values
}

/// Ascending spectrum of a qubit operator (must be Hermitian).
pub fn spectrum(op: &QubitOperator) -> ChemResult<Vec<f64>> {
    Ok(hermitian_eigenvalues(qubit_matrix(op)?))
}

/// Ascending spectrum of a fermionic operator (must be Hermitian).
pub fn fock_spectrum(op: &FermionicOperator) -> ChemResult<Vec<f64>> {
    Ok(hermitian_eigenvalues(fock_matrix(op)?))
}

/// Smallest eigenvalue of a Hermitian qubit operator.
pub fn min_eigenvalue(op: &QubitOperator) -> ChemResult<f64> {
    let values = spectrum(op)?;
    Ok(values.first().copied().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pauli_spectrum() {
        let op = QubitOperator::from_labels([("XX", 1.0), ("ZZ", 1.0)]).unwrap();
        let values = spectrum(&op).unwrap();
        let expected = [-2.0, 0.0, 0.0, 2.0];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-12, "{values:?}");
        }
    }

    #[test]
    fn test_number_operator_in_fock_space() {
        let mut op = FermionicOperator::new(3);
        for j in 0..3 {
            op.add_term(
                Complex64::new(1.0, 0.0),
                vec![LadderOp::Create(j), LadderOp::Annihilate(j)],
            )
            .unwrap();
        }
        let m = fock_matrix(&op).unwrap();
        for b in 0..8usize {
            assert!((m[(b, b)].re - f64::from((b as u32).count_ones())).abs() < 1e-15);
        }
    }

    #[test]
    fn test_hopping_sign() {
        // a†_2 a_0 on |011⟩ (modes 0, 1 occupied) passes mode 1 once
        let mut op = FermionicOperator::new(3);
        op.add_term(
            Complex64::new(1.0, 0.0),
            vec![LadderOp::Create(2), LadderOp::Annihilate(0)],
        )
        .unwrap();
        let m = fock_matrix(&op).unwrap();
        assert!((m[(0b110, 0b011)].re + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_dense_limit() {
        let op = QubitOperator::zero(MAX_DENSE_QUBITS + 1);
        assert!(matches!(
            qubit_matrix(&op),
            Err(ChemError::DenseTooLarge { .. })
        ));
    }
}
