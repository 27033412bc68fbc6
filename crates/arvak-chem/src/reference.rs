//! Hartree-Fock reference state.
//!
//! The lowest `N_α` α orbitals and the lowest `N_β` β orbitals are occupied.
//! The state is a single computational basis state in every mapping handled
//! here; its index depends on the mapper's update sets.

use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};
use crate::integrals::ElectronicIntegrals;
use crate::mapping::QubitMapper;
use crate::symmetry::Z2Symmetries;

/// Occupation pattern of the Hartree-Fock determinant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HartreeFock {
    num_orbitals: u32,
    num_alpha: usize,
    num_beta: usize,
}

impl HartreeFock {
    /// Reference for `num_orbitals` spatial orbitals.
    pub fn new(num_orbitals: u32, num_alpha: usize, num_beta: usize) -> ChemResult<Self> {
        let n = num_orbitals as usize;
        if num_alpha > n || num_beta > n {
            return Err(ChemError::InvalidParticleNumber(format!(
                "({num_alpha}, {num_beta}) particles do not fit {n} spatial orbitals"
            )));
        }
        Ok(Self {
            num_orbitals,
            num_alpha,
            num_beta,
        })
    }

    /// Reference matching the orbital and particle counts of `integrals`.
    pub fn from_integrals(integrals: &ElectronicIntegrals) -> ChemResult<Self> {
        Self::new(
            integrals.num_orbitals() as u32,
            integrals.num_alpha(),
            integrals.num_beta(),
        )
    }

    /// Spatial orbitals.
    pub fn num_orbitals(&self) -> u32 {
        self.num_orbitals
    }

    /// Spin orbitals (modes).
    pub fn num_spin_orbitals(&self) -> u32 {
        2 * self.num_orbitals
    }

    /// `(N_α, N_β)`.
    pub fn num_particles(&self) -> (usize, usize) {
        (self.num_alpha, self.num_beta)
    }

    /// Occupied α modes followed by occupied β modes.
    pub fn occupied_modes(&self) -> Vec<u32> {
        let alpha = 0..self.num_alpha as u32;
        let beta = self.num_orbitals..self.num_orbitals + self.num_beta as u32;
        alpha.chain(beta).collect()
    }

    /// Unoccupied α modes followed by unoccupied β modes.
    pub fn virtual_modes(&self) -> Vec<u32> {
        let n = self.num_orbitals;
        let alpha = self.num_alpha as u32..n;
        let beta = n + self.num_beta as u32..2 * n;
        alpha.chain(beta).collect()
    }

    /// Basis index of the reference on the full (untapered) register.
    pub fn bitstring(&self, mapper: &dyn QubitMapper) -> ChemResult<u64> {
        mapper.encode_occupation(&self.occupied_modes(), self.num_spin_orbitals())
    }

    /// Basis index on the register left after tapering (if any).
    pub fn reduced_bitstring(
        &self,
        mapper: &dyn QubitMapper,
        symmetries: Option<&Z2Symmetries>,
    ) -> ChemResult<u64> {
        let bits = self.bitstring(mapper)?;
        match symmetries {
            Some(z2) if !z2.is_empty() => z2.taper_reference(bits),
            _ => Ok(bits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{BravyiKitaevMapper, JordanWignerMapper, ParityMapper};

    #[test]
    fn test_h2_occupations() {
        let hf = HartreeFock::new(2, 1, 1).unwrap();
        assert_eq!(hf.occupied_modes(), vec![0, 2]);
        assert_eq!(hf.virtual_modes(), vec![1, 3]);
    }

    #[test]
    fn test_h2_bitstrings_per_mapping() {
        let hf = HartreeFock::new(2, 1, 1).unwrap();
        assert_eq!(hf.bitstring(&JordanWignerMapper).unwrap(), 0b0101);
        assert_eq!(hf.bitstring(&ParityMapper).unwrap(), 0b0011);
        assert_eq!(hf.bitstring(&BravyiKitaevMapper).unwrap(), 0b0111);
    }

    #[test]
    fn test_open_shell() {
        let hf = HartreeFock::new(3, 2, 1).unwrap();
        assert_eq!(hf.occupied_modes(), vec![0, 1, 3]);
        assert_eq!(hf.virtual_modes(), vec![2, 4, 5]);
    }

    #[test]
    fn test_too_many_particles() {
        assert!(matches!(
            HartreeFock::new(2, 3, 0),
            Err(ChemError::InvalidParticleNumber(_))
        ));
    }
}
