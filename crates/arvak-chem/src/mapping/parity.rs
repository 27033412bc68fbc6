//! Parity mapping.
//!
//! Qubit `k` stores the parity of modes `0..=k`, so
//! `a†_j ↦ ½ (Z_{j−1} X_j − i Y_j) X_{j+1} … X_{N−1}`.
//!
//! With block spin ordering, qubit `N/2 − 1` holds the α-particle parity and
//! qubit `N − 1` the total parity. Both are conserved by a molecular
//! Hamiltonian, which is what makes the two-qubit reduction possible
//! (see [`Z2Symmetries::two_qubit_reduction`](crate::symmetry::Z2Symmetries::two_qubit_reduction)).

use crate::error::ChemResult;
use crate::mapping::{MajoranaPair, MappingScheme, QubitMapper, check_width};
use crate::pauli::{PauliString, full_mask};

/// Parity encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParityMapper;

impl QubitMapper for ParityMapper {
    fn scheme(&self) -> MappingScheme {
        MappingScheme::Parity
    }

    fn pauli_table(&self, num_modes: u32) -> ChemResult<Vec<MajoranaPair>> {
        check_width(num_modes)?;
        let all = full_mask(num_modes);
        (0..num_modes)
            .map(|j| {
                let bit = 1u64 << j;
                let upper = all & !(bit - 1);
                let previous = if j > 0 { 1u64 << (j - 1) } else { 0 };
                Ok((
                    PauliString::from_masks(num_modes, upper, previous)?,
                    PauliString::from_masks(num_modes, upper, bit)?,
                ))
            })
            .collect()
    }

    fn update_set(&self, mode: u32, num_modes: u32) -> Vec<u32> {
        (mode..num_modes).collect()
    }

    fn allows_two_qubit_reduction(&self) -> bool {
        true
    }
}
