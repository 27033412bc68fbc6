//! Jordan-Wigner mapping.
//!
//! `a†_j ↦ ½ (X_j − i Y_j) Z_{j−1} … Z_0`: qubit `j` holds the occupation of
//! mode `j`, and the Z string carries the fermionic sign.

use crate::error::ChemResult;
use crate::mapping::{MajoranaPair, MappingScheme, QubitMapper, check_width};
use crate::pauli::PauliString;

/// Jordan-Wigner encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JordanWignerMapper;

impl QubitMapper for JordanWignerMapper {
    fn scheme(&self) -> MappingScheme {
        MappingScheme::JordanWigner
    }

    fn pauli_table(&self, num_modes: u32) -> ChemResult<Vec<MajoranaPair>> {
        check_width(num_modes)?;
        (0..num_modes)
            .map(|j| {
                let bit = 1u64 << j;
                let below = bit - 1;
                Ok((
                    PauliString::from_masks(num_modes, bit, below)?,
                    PauliString::from_masks(num_modes, bit, below | bit)?,
                ))
            })
            .collect()
    }

    fn update_set(&self, mode: u32, _num_modes: u32) -> Vec<u32> {
        vec![mode]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_labels() {
        let table = JordanWignerMapper.pauli_table(3).unwrap();
        let labels: Vec<(String, String)> = table
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("IIX".to_string(), "IIY".to_string()),
                ("IXZ".to_string(), "IYZ".to_string()),
                ("XZZ".to_string(), "YZZ".to_string()),
            ]
        );
    }

    #[test]
    fn test_occupation_encoding() {
        assert_eq!(JordanWignerMapper.encode_occupation(&[0, 2], 4).unwrap(), 0b0101);
    }
}
