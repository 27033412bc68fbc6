//! Tests for Z2 symmetry search and tapering.

use approx::assert_abs_diff_eq;
use arvak_chem::exact::min_eigenvalue;
use arvak_chem::fermion::FermionicOperator;
use arvak_chem::mapping::{BravyiKitaevMapper, JordanWignerMapper, ParityMapper, QubitMapper};
use arvak_chem::molecules::{H2_ELECTRONIC_GROUND_ENERGY, H2_HARTREE_FOCK_ENERGY, h2_sto3g};
use arvak_chem::operator::QubitOperator;
use arvak_chem::reference::HartreeFock;
use arvak_chem::symmetry::Z2Symmetries;
use arvak_chem::{ChemError, PauliString};

fn mapped_h2(mapper: &dyn QubitMapper) -> QubitOperator {
    let fermionic = FermionicOperator::from_integrals(&h2_sto3g()).unwrap();
    mapper.map(&fermionic).unwrap()
}

// ---------------------------------------------------------------------------
// Parity two-qubit reduction
// ---------------------------------------------------------------------------

#[test]
fn two_qubit_reduction_literal_terms() {
    let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
    let tapered = z2.taper(&mapped_h2(&ParityMapper)).unwrap();

    let expected = QubitOperator::from_labels([
        ("II", -1.052_373_246_463_598),
        ("IZ", 0.397_937_422_831_431_4),
        ("ZI", -0.397_937_422_831_431_46),
        ("ZZ", -0.011_280_104_234_384_997),
        ("XX", 0.180_931_199_964_71),
    ])
    .unwrap();
    assert_eq!(tapered.num_qubits(), 2);
    assert!(tapered.approx_eq(&expected, 1e-10), "{tapered}");
}

#[test]
fn two_qubit_reduction_keeps_ground_energy() {
    let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
    let tapered = z2.taper(&mapped_h2(&ParityMapper)).unwrap();
    assert_abs_diff_eq!(
        min_eigenvalue(&tapered).unwrap(),
        H2_ELECTRONIC_GROUND_ENERGY,
        epsilon = 1e-6
    );
}

#[test]
fn tapered_reference_keeps_hartree_fock_energy() {
    let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
    let tapered = z2.taper(&mapped_h2(&ParityMapper)).unwrap();
    let hf = HartreeFock::new(2, 1, 1).unwrap();
    let bits = hf.reduced_bitstring(&ParityMapper, Some(&z2)).unwrap();
    assert_eq!(bits, 0b01);
    assert_abs_diff_eq!(tapered.basis_expectation(bits), H2_HARTREE_FOCK_ENERGY, epsilon = 1e-10);
}

// ---------------------------------------------------------------------------
// General symmetry search
// ---------------------------------------------------------------------------

#[test]
fn jordan_wigner_h2_has_three_symmetries() {
    let op = mapped_h2(&JordanWignerMapper);
    let z2 = Z2Symmetries::find(&op).unwrap().ensure_at_least(3).unwrap();
    assert_eq!(z2.len(), 3);
    for tau in z2.symmetries() {
        assert!(tau.is_diagonal());
        assert!(op.commutes_with_pauli(tau));
    }
    assert_eq!(z2.tapered_qubits(), &[0, 1, 2]);
}

#[test]
fn jordan_wigner_h2_tapers_to_one_qubit() {
    let op = mapped_h2(&JordanWignerMapper);
    let hf = HartreeFock::new(2, 1, 1).unwrap();
    let bits = hf.bitstring(&JordanWignerMapper).unwrap();
    let z2 = Z2Symmetries::find(&op)
        .unwrap()
        .with_reference_sector(bits)
        .unwrap();
    assert_eq!(z2.sector(), Some(&[-1i8, 1, -1][..]));

    let tapered = z2.taper(&op).unwrap();
    assert_eq!(tapered.num_qubits(), 1);
    assert!(tapered.is_hermitian(1e-12));
    assert_abs_diff_eq!(
        min_eigenvalue(&tapered).unwrap(),
        H2_ELECTRONIC_GROUND_ENERGY,
        epsilon = 1e-6
    );
    let reduced = z2.taper_reference(bits).unwrap();
    assert_abs_diff_eq!(
        tapered.basis_expectation(reduced),
        H2_HARTREE_FOCK_ENERGY,
        epsilon = 1e-10
    );
}

#[test]
fn bravyi_kitaev_search_keeps_ground_energy() {
    let op = mapped_h2(&BravyiKitaevMapper);
    let hf = HartreeFock::new(2, 1, 1).unwrap();
    let bits = hf.bitstring(&BravyiKitaevMapper).unwrap();
    let z2 = Z2Symmetries::find(&op)
        .unwrap()
        .with_reference_sector(bits)
        .unwrap();
    let tapered = z2.taper(&op).unwrap();
    assert_abs_diff_eq!(
        min_eigenvalue(&tapered).unwrap(),
        H2_ELECTRONIC_GROUND_ENERGY,
        epsilon = 1e-6
    );
}

#[test]
fn asking_for_more_symmetries_than_exist_fails() {
    let op = QubitOperator::from_labels([("XI", 1.0), ("ZI", 1.0), ("IX", 1.0), ("IZ", 1.0)])
        .unwrap();
    let z2 = Z2Symmetries::find(&op).unwrap();
    assert!(z2.is_empty());
    assert!(matches!(
        z2.ensure_at_least(1),
        Err(ChemError::SymmetryReductionFailure(_))
    ));
}

#[test]
fn explicit_sector_validation() {
    let z2 = Z2Symmetries::new(2, vec![PauliString::from_label("ZZ").unwrap()]).unwrap();
    assert!(z2.clone().with_sector(vec![1, 1]).is_err());
    assert!(z2.clone().with_sector(vec![0]).is_err());
    assert!(z2.with_sector(vec![-1]).is_ok());
}

#[test]
fn taper_leaves_input_untouched() {
    let op = mapped_h2(&ParityMapper);
    let before = op.clone();
    let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
    let _ = z2.taper(&op).unwrap();
    assert_eq!(op, before);
}

#[test]
fn search_keeps_generators_sharing_a_pivot_qubit() {
    let op = QubitOperator::from_labels([
        ("XXI", 1.0),
        ("ZZI", 1.0),
        ("IIX", 0.5),
        ("IIZ", 0.5),
    ])
    .unwrap();
    let z2 = Z2Symmetries::find(&op).unwrap();
    assert_eq!(z2.len(), 2);
    let mut qubits = z2.tapered_qubits().to_vec();
    qubits.sort_unstable();
    assert_eq!(qubits, vec![1, 2]);

    let tapered = z2.with_sector(vec![-1, -1]).unwrap().taper(&op).unwrap();
    assert_eq!(tapered.num_qubits(), 1);
    assert_abs_diff_eq!(
        min_eigenvalue(&tapered).unwrap(),
        min_eigenvalue(&op).unwrap(),
        epsilon = 1e-10
    );
}
