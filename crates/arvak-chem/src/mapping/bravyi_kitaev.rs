//! Bravyi-Kitaev mapping (Fenwick-tree construction).
//!
//! Qubit `k` stores the parity of a contiguous block of modes ending at `k`,
//! chosen by the binary-indexed-tree layout. Three index sets per mode drive
//! the encoding:
//!
//! - update set `U(j)`: qubits whose stored sum includes mode `j`
//! - parity set `P(j)`: qubits whose sums add up to the parity of modes `0..=j`
//! - occupation set `O(j)`: qubits whose sums add up to the occupation of `j`
//!
//! Majorana pair for mode `j`:
//!
//! ```text
//! A_j = X_{U(j)} Z_{P(j−1)}
//! B_j = X_{U(j) ∖ {j}} Y_j Z_{(P(j−1) ⊕ O(j)) ∖ {j}}
//! ```
//!
//! Operator weight grows as `O(log N)` instead of `O(N)`.

use crate::error::ChemResult;
use crate::mapping::{MajoranaPair, MappingScheme, QubitMapper, check_width};
use crate::pauli::PauliString;

/// Bravyi-Kitaev encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BravyiKitaevMapper;

/// Qubits whose partial sum includes mode `j` (including `j` itself).
fn update_mask(j: u32, n: u32) -> u64 {
    let mut mask = 0u64;
    let mut i = j + 1;
    while i <= n {
        mask |= 1u64 << (i - 1);
        i += i & i.wrapping_neg();
    }
    mask
}

/// Qubits whose partial sums give the parity of modes `0..=j`.
fn parity_mask(j: u32) -> u64 {
    let mut mask = 0u64;
    let mut i = j + 1;
    while i > 0 {
        mask |= 1u64 << (i - 1);
        i &= i - 1;
    }
    mask
}

/// Qubits whose partial sums give the occupation of mode `j`.
fn occupation_mask(j: u32) -> u64 {
    let mut i = j + 1;
    let mut mask = 1u64 << (i - 1);
    let parent = i & (i - 1);
    i -= 1;
    while i != parent {
        mask |= 1u64 << (i - 1);
        i &= i - 1;
    }
    mask
}

fn mask_to_qubits(mask: u64) -> Vec<u32> {
    (0..64).filter(|&q| mask & (1u64 << q) != 0).collect()
}

impl QubitMapper for BravyiKitaevMapper {
    fn scheme(&self) -> MappingScheme {
        MappingScheme::BravyiKitaev
    }

    fn pauli_table(&self, num_modes: u32) -> ChemResult<Vec<MajoranaPair>> {
        check_width(num_modes)?;
        (0..num_modes)
            .map(|j| {
                let update = update_mask(j, num_modes);
                let prefix = if j > 0 { parity_mask(j - 1) } else { 0 };
                let remainder = prefix ^ occupation_mask(j);
                Ok((
                    PauliString::from_masks(num_modes, update, prefix)?,
                    PauliString::from_masks(num_modes, update, remainder)?,
                ))
            })
            .collect()
    }

    fn update_set(&self, mode: u32, num_modes: u32) -> Vec<u32> {
        mask_to_qubits(update_mask(mode, num_modes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenwick_sets() {
        // 8 modes: qubit 3 stores modes 0..=3, qubit 7 stores 0..=7
        assert_eq!(mask_to_qubits(update_mask(0, 8)), vec![0, 1, 3, 7]);
        assert_eq!(mask_to_qubits(update_mask(4, 8)), vec![4, 5, 7]);
        assert_eq!(mask_to_qubits(update_mask(6, 8)), vec![6, 7]);
        assert_eq!(mask_to_qubits(parity_mask(5)), vec![3, 5]);
        assert_eq!(mask_to_qubits(parity_mask(6)), vec![3, 5, 6]);
        assert_eq!(mask_to_qubits(occupation_mask(3)), vec![1, 2, 3]);
        assert_eq!(mask_to_qubits(occupation_mask(0)), vec![0]);
    }

    #[test]
    fn test_update_set_truncated_by_register() {
        // with 6 modes the parent qubit 7 does not exist
        assert_eq!(BravyiKitaevMapper.update_set(4, 6), vec![4, 5]);
    }

    #[test]
    fn test_occupation_encoding() {
        assert_eq!(BravyiKitaevMapper.encode_occupation(&[0, 2], 4).unwrap(), 0b0111);
    }

    #[test]
    fn test_majorana_strings_anticommute() {
        let table = BravyiKitaevMapper.pauli_table(8).unwrap();
        for (j, (a, b)) in table.iter().enumerate() {
            assert!(!a.commutes_with(b), "mode {j}");
            for (k, (c, d)) in table.iter().enumerate() {
                if j != k {
                    assert!(!a.commutes_with(c), "A{j} A{k}");
                    assert!(!b.commutes_with(d), "B{j} B{k}");
                }
            }
        }
    }
}
