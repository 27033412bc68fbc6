//! Tests for fermion-to-qubit mappings on H2 / STO-3G.

use approx::assert_abs_diff_eq;
use arvak_chem::exact::{fock_matrix, fock_spectrum, qubit_matrix, spectrum};
use arvak_chem::fermion::FermionicOperator;
use arvak_chem::mapping::{
    BravyiKitaevMapper, JordanWignerMapper, MappingScheme, ParityMapper, QubitMapper,
};
use arvak_chem::molecules::{H2_ELECTRONIC_GROUND_ENERGY, H2_HARTREE_FOCK_ENERGY, h2_sto3g};
use arvak_chem::operator::QubitOperator;
use arvak_chem::reference::HartreeFock;

fn h2_fermionic() -> FermionicOperator {
    FermionicOperator::from_integrals(&h2_sto3g()).unwrap()
}

/// Parity-mapped H2 at 0.735 Å (qubit 0 rightmost).
fn reference_parity_h2() -> QubitOperator {
    QubitOperator::from_labels([
        ("IIII", -0.810_547_981_600_314_3),
        ("ZZII", -0.225_753_490_712_873_65),
        ("IIZI", 0.120_912_632_431_641_74),
        ("ZIZI", 0.120_912_632_431_641_74),
        ("IZZI", 0.172_183_932_118_557_87),
        ("IIIZ", 0.172_183_932_118_558_18),
        ("IZIZ", 0.166_145_432_422_819_26),
        ("ZZIZ", 0.166_145_432_422_819_26),
        ("IIZZ", -0.225_753_490_712_873_62),
        ("IZZZ", 0.168_927_538_546_463_72),
        ("ZZZZ", 0.174_643_430_533_559_8),
        ("IXIX", 0.045_232_799_991_177_51),
        ("ZXIX", 0.045_232_799_991_177_51),
        ("IXZX", -0.045_232_799_991_177_51),
        ("ZXZX", -0.045_232_799_991_177_51),
    ])
    .unwrap()
}

// ---------------------------------------------------------------------------
// Literal decompositions
// ---------------------------------------------------------------------------

#[test]
fn parity_h2_matches_reference_terms() {
    let mapped = ParityMapper.map(&h2_fermionic()).unwrap();
    assert_eq!(mapped.num_qubits(), 4);
    assert_eq!(mapped.num_terms(), 15);
    assert!(mapped.approx_eq(&reference_parity_h2(), 1e-10), "{mapped}");
}

#[test]
fn every_scheme_gives_fifteen_hermitian_terms() {
    for mapper in [
        &JordanWignerMapper as &dyn QubitMapper,
        &ParityMapper,
        &BravyiKitaevMapper,
    ] {
        let mapped = mapper.map(&h2_fermionic()).unwrap();
        assert_eq!(mapped.num_terms(), 15, "{:?}", mapper.scheme());
        assert!(mapped.is_hermitian(1e-12));
    }
}

#[test]
fn jordan_wigner_identity_coefficient() {
    let mapped = JordanWignerMapper.map(&h2_fermionic()).unwrap();
    let identity = arvak_chem::PauliString::identity(4).unwrap();
    assert_abs_diff_eq!(
        mapped.coefficient(&identity).re,
        -0.810_547_981_600_314_3,
        epsilon = 1e-10
    );
}

// ---------------------------------------------------------------------------
// Spectral equivalence
// ---------------------------------------------------------------------------

#[test]
fn jordan_wigner_matrix_equals_fock_matrix() {
    let fermionic = h2_fermionic();
    let fock = fock_matrix(&fermionic).unwrap();
    let qubit = qubit_matrix(&JordanWignerMapper.map(&fermionic).unwrap()).unwrap();
    assert_abs_diff_eq!((fock - qubit).norm(), 0.0, epsilon = 1e-10);
}

#[test]
fn all_schemes_preserve_spectrum() {
    let fermionic = h2_fermionic();
    let reference = fock_spectrum(&fermionic).unwrap();
    assert_abs_diff_eq!(reference[0], H2_ELECTRONIC_GROUND_ENERGY, epsilon = 1e-6);

    for scheme in [
        MappingScheme::JordanWigner,
        MappingScheme::Parity,
        MappingScheme::BravyiKitaev,
    ] {
        let values = spectrum(&scheme.mapper().map(&fermionic).unwrap()).unwrap();
        assert_eq!(values.len(), reference.len());
        for (a, b) in values.iter().zip(&reference) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }
}

#[test]
fn hartree_fock_energy_is_mapping_independent() {
    let fermionic = h2_fermionic();
    let hf = HartreeFock::from_integrals(&h2_sto3g()).unwrap();
    for scheme in [
        MappingScheme::JordanWigner,
        MappingScheme::Parity,
        MappingScheme::BravyiKitaev,
    ] {
        let mapper = scheme.mapper();
        let op = mapper.map(&fermionic).unwrap();
        let bits = hf.bitstring(mapper.as_ref()).unwrap();
        assert_abs_diff_eq!(op.basis_expectation(bits), H2_HARTREE_FOCK_ENERGY, epsilon = 1e-10);
    }
}

#[test]
fn energy_shift_only_with_explicit_request() {
    let fermionic = h2_fermionic();
    let plain = fermionic.map(&ParityMapper).unwrap();
    let shifted = fermionic.map_with_shift(&ParityMapper).unwrap();
    let identity = arvak_chem::PauliString::identity(4).unwrap();
    assert_abs_diff_eq!(
        shifted.coefficient(&identity).re - plain.coefficient(&identity).re,
        fermionic.energy_shift(),
        epsilon = 1e-12
    );
}

// ---------------------------------------------------------------------------
// Idempotence
// ---------------------------------------------------------------------------

#[test]
fn mapping_is_deterministic() {
    let fermionic = h2_fermionic();
    for scheme in [
        MappingScheme::JordanWigner,
        MappingScheme::Parity,
        MappingScheme::BravyiKitaev,
    ] {
        let mapper = scheme.mapper();
        let first = mapper.map(&fermionic).unwrap();
        let second = mapper.map(&fermionic).unwrap();
        assert_eq!(first, second);
    }
}
