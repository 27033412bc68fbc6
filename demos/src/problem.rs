//! Integrals → qubit Hamiltonian, reference and pool, as configured.

use arvak_adapt::{AdaptResult, ProblemConfig};
use arvak_chem::{
    ElectronicIntegrals, FermionicOperator, HartreeFock, MappingScheme, OperatorPool,
    PoolBuilder, QubitOperator, Z2Symmetries,
};
use tracing::{info, warn};

/// Everything an adaptive run needs.
#[derive(Debug)]
pub struct PreparedProblem {
    /// Mapping used.
    pub mapping: MappingScheme,
    /// Qubit Hamiltonian (electronic part, tapered if requested).
    pub hamiltonian: QubitOperator,
    /// Width before tapering.
    pub full_num_qubits: u32,
    /// Hartree-Fock basis index on the (tapered) register.
    pub reference: u64,
    /// Excitation pool on the (tapered) register.
    pub pool: OperatorPool,
    /// Symmetries removed, if any.
    pub symmetries: Option<Z2Symmetries>,
    /// Constant added to reported energies (nuclear repulsion).
    pub energy_shift: f64,
}

/// Map, optionally taper, and build the matching pool.
pub fn prepare(
    integrals: &ElectronicIntegrals,
    problem: &ProblemConfig,
) -> AdaptResult<PreparedProblem> {
    let mapper = problem.mapping.mapper();
    let hf = HartreeFock::from_integrals(integrals)?;
    let fermionic = FermionicOperator::from_integrals(integrals)?;
    let num_modes = fermionic.num_modes();
    let mapped = fermionic.map(mapper.as_ref())?;

    let symmetries = if problem.z2_tapering {
        let reference = hf.bitstring(mapper.as_ref())?;
        Some(Z2Symmetries::find(&mapped)?.with_reference_sector(reference)?)
    } else if problem.two_qubit_reduction {
        if mapper.allows_two_qubit_reduction() {
            Some(Z2Symmetries::two_qubit_reduction(
                mapper.as_ref(),
                num_modes,
                hf.num_particles(),
            )?)
        } else {
            warn!(
                mapping = %problem.mapping,
                "two-qubit reduction only applies to the parity mapping, skipped"
            );
            None
        }
    } else {
        None
    };

    let (hamiltonian, width) = match &symmetries {
        Some(z2) => (z2.taper(&mapped)?, z2.reduced_num_qubits()),
        None => (mapped, num_modes),
    };
    let reference = hf.reduced_bitstring(mapper.as_ref(), symmetries.as_ref())?;

    let mut builder = PoolBuilder::new(&hf, mapper.as_ref());
    if let Some(z2) = &symmetries {
        builder = builder.with_symmetries(z2);
    }
    let pool = builder.build(width)?;

    info!(
        mapping = %problem.mapping,
        qubits = width,
        terms = hamiltonian.num_terms(),
        pool = pool.len(),
        "problem prepared"
    );

    Ok(PreparedProblem {
        mapping: problem.mapping,
        hamiltonian,
        full_num_qubits: num_modes,
        reference,
        pool,
        symmetries,
        energy_shift: integrals.nuclear_repulsion(),
    })
}
