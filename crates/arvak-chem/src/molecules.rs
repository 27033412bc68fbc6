//! Reference molecules with precomputed integrals.
//!
//! These fixtures stand in for a classical chemistry package so the whole
//! pipeline can run without one.

use ndarray::{Array4, arr2};

use crate::error::ChemResult;
use crate::integrals::{ChemistryDriver, ElectronicIntegrals};

/// H–H distance used for [`h2_sto3g`], in Ångström.
pub const H2_BOND_LENGTH: f64 = 0.735;

/// Nuclear repulsion of H2 at [`H2_BOND_LENGTH`], in Hartree.
pub const H2_NUCLEAR_REPULSION: f64 = 0.719_968_994_448_979_7;

/// Exact electronic ground-state energy of H2 / STO-3G at [`H2_BOND_LENGTH`].
pub const H2_ELECTRONIC_GROUND_ENERGY: f64 = -1.857_275_027_031_587;

/// Hartree-Fock electronic energy of H2 / STO-3G at [`H2_BOND_LENGTH`].
pub const H2_HARTREE_FOCK_ENERGY: f64 = -1.836_967_987_892_076_6;

/// H2 in the minimal STO-3G basis at 0.735 Å (RHF molecular orbitals).
///
/// Two spatial orbitals, one α and one β electron.
pub fn h2_sto3g() -> ElectronicIntegrals {
    let h1 = arr2(&[
        [-1.256_339_071_038_965_4, 0.0],
        [0.0, -0.471_896_009_350_294_3],
    ]);

    let mut h2 = Array4::<f64>::zeros((2, 2, 2, 2));
    h2[[0, 0, 0, 0]] = 0.675_710_154_185_854_9;
    h2[[1, 1, 1, 1]] = 0.698_573_722_134_239_2;
    h2[[0, 0, 1, 1]] = 0.664_581_729_691_277;
    h2[[1, 1, 0, 0]] = 0.664_581_729_691_277;
    // Exchange integral K = (01|01) and its permutations
    let k = 0.180_931_199_964_710_04;
    h2[[0, 1, 0, 1]] = k;
    h2[[0, 1, 1, 0]] = k;
    h2[[1, 0, 0, 1]] = k;
    h2[[1, 0, 1, 0]] = k;

    ElectronicIntegrals::from_parts(h1, h2, 1, 1).with_nuclear_repulsion(H2_NUCLEAR_REPULSION)
}

/// Driver returning [`h2_sto3g`].
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Sto3gDriver;

impl ChemistryDriver for H2Sto3gDriver {
    fn run(&self) -> ChemResult<ElectronicIntegrals> {
        Ok(h2_sto3g())
    }
}
