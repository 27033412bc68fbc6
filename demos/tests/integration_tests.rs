//! Integration tests for the demo pipeline.
//!
//! These tests drive the same integrals → Hamiltonian → pool → ADAPT chain
//! the binaries use, for every configured mapping.

use approx::assert_abs_diff_eq;
use arvak_adapt::{AdaptConfig, AdaptVqe, AnyBackend, AnyOptimizer, ProblemConfig};
use arvak_chem::exact::min_eigenvalue;
use arvak_chem::molecules::{
    H2_ELECTRONIC_GROUND_ENERGY, H2_NUCLEAR_REPULSION, H2Sto3gDriver, h2_sto3g,
};
use arvak_chem::{ChemistryDriver, JsonDriver, MappingScheme};
use arvak_demos::problem::prepare;

fn problem(mapping: MappingScheme, two_qubit_reduction: bool, z2_tapering: bool) -> ProblemConfig {
    ProblemConfig {
        mapping,
        two_qubit_reduction,
        z2_tapering,
    }
}

/// Parity with the two-qubit reduction is the default problem.
#[test]
fn test_default_problem_is_reduced_parity() {
    let prepared = prepare(&h2_sto3g(), &ProblemConfig::default()).unwrap();
    assert_eq!(prepared.mapping, MappingScheme::Parity);
    assert_eq!(prepared.full_num_qubits, 4);
    assert_eq!(prepared.hamiltonian.num_qubits(), 2);
    assert_eq!(prepared.hamiltonian.num_terms(), 5);
    assert_eq!(prepared.reference, 0b01);
    assert_eq!(prepared.pool.len(), 3);
    assert_abs_diff_eq!(prepared.energy_shift, H2_NUCLEAR_REPULSION);
}

/// The two-qubit reduction is skipped for mappings that lack it.
#[test]
fn test_reduction_skipped_for_jordan_wigner() {
    let prepared = prepare(
        &h2_sto3g(),
        &problem(MappingScheme::JordanWigner, true, false),
    )
    .unwrap();
    assert!(prepared.symmetries.is_none());
    assert_eq!(prepared.hamiltonian.num_qubits(), 4);
    assert_eq!(prepared.reference, 0b0101);
}

/// Full Z2 tapering keeps the ground energy for every mapping.
#[test]
fn test_z2_tapering_every_mapping() {
    for mapping in [
        MappingScheme::JordanWigner,
        MappingScheme::Parity,
        MappingScheme::BravyiKitaev,
    ] {
        let prepared = prepare(&h2_sto3g(), &problem(mapping, false, true)).unwrap();
        assert!(prepared.symmetries.is_some(), "{mapping}");
        assert!(prepared.hamiltonian.num_qubits() < 4, "{mapping}");
        assert_abs_diff_eq!(
            min_eigenvalue(&prepared.hamiltonian).unwrap(),
            H2_ELECTRONIC_GROUND_ENERGY,
            epsilon = 1e-6
        );
    }
}

/// End-to-end run over every mapping with configured components.
#[test]
fn test_adapt_every_mapping() {
    for mapping in [
        MappingScheme::JordanWigner,
        MappingScheme::Parity,
        MappingScheme::BravyiKitaev,
    ] {
        let mut config = AdaptConfig::default().with_workers(2);
        config.problem = problem(mapping, mapping == MappingScheme::Parity, false);
        let prepared = prepare(&h2_sto3g(), &config.problem).unwrap();

        let backend = AnyBackend::from_settings(&config.backend, config.seed).unwrap();
        let optimizer = AnyOptimizer::from_config(&config.optimizer, config.seed);
        let adapt = AdaptVqe::new(backend, optimizer, config).unwrap();
        let result = adapt
            .run(&prepared.hamiltonian, &prepared.pool, prepared.reference)
            .unwrap();

        assert_abs_diff_eq!(result.energy, H2_ELECTRONIC_GROUND_ENERGY, epsilon = 1e-6);
        assert_abs_diff_eq!(
            result.energy + prepared.energy_shift,
            H2_ELECTRONIC_GROUND_ENERGY + H2_NUCLEAR_REPULSION,
            epsilon = 1e-6
        );
    }
}

/// Integrals written to JSON load back through the file driver.
#[test]
fn test_json_driver_matches_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h2.json");
    std::fs::write(&path, h2_sto3g().to_json_string().unwrap()).unwrap();

    let from_file = JsonDriver::new(&path).run().unwrap();
    let builtin = H2Sto3gDriver.run().unwrap();
    assert_eq!(from_file, builtin);
}

/// Results serialize with snake_case criteria.
#[test]
fn test_result_json_shape() {
    let prepared = prepare(&h2_sto3g(), &ProblemConfig::default()).unwrap();
    let config = AdaptConfig::default().with_workers(1);
    let adapt = AdaptVqe::new(
        AnyBackend::from_settings(&config.backend, config.seed).unwrap(),
        AnyOptimizer::from_config(&config.optimizer, config.seed),
        config,
    )
    .unwrap();
    let result = adapt
        .run(&prepared.hamiltonian, &prepared.pool, prepared.reference)
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["finishing_criterion"], "threshold");
    assert_eq!(json["operator_list"][0], "0,2->1,3");
    assert!(json["final_max_grad"].as_f64().unwrap() < 1e-5);
}
