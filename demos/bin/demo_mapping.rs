//! Qubit Mapping Demo
//!
//! Maps a molecular Hamiltonian with every supported encoding, tapers it and
//! checks that the spectrum survives.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::Parser;

use arvak_chem::exact::{fock_spectrum, min_eigenvalue};
use arvak_chem::molecules::H2Sto3gDriver;
use arvak_chem::{
    ChemistryDriver, FermionicOperator, HartreeFock, JsonDriver, MappingScheme, Z2Symmetries,
};
use arvak_demos::{
    init_logging, print_header, print_info, print_result, print_section, print_success,
    print_warning,
};

#[derive(Parser, Debug)]
#[command(name = "demo-mapping")]
#[command(about = "Compare fermion-to-qubit mappings and Z2 tapering")]
struct Args {
    /// Integrals as JSON; defaults to built-in H2 / STO-3G at 0.735 Å
    #[arg(short, long)]
    integrals: Option<PathBuf>,

    /// Print every Pauli term
    #[arg(short, long)]
    terms: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const SCHEMES: [MappingScheme; 3] = [
    MappingScheme::JordanWigner,
    MappingScheme::Parity,
    MappingScheme::BravyiKitaev,
];

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    print_header("Fermion-to-Qubit Mappings");

    let integrals = match &args.integrals {
        Some(path) => JsonDriver::new(path).run()?,
        None => H2Sto3gDriver.run()?,
    };
    let fermionic = FermionicOperator::from_integrals(&integrals)?;
    let hf = HartreeFock::from_integrals(&integrals)?;

    print_section("Fermionic Hamiltonian");
    print_result("Modes", fermionic.num_modes());
    print_result("Terms", fermionic.num_terms());
    print_result("Occupied modes", format!("{:?}", hf.occupied_modes()));
    let fermionic_ground = fock_spectrum(&fermionic)?
        .first()
        .copied()
        .unwrap_or(f64::NAN);
    print_result("Fock-space ground energy", format!("{fermionic_ground:.10} Ha"));

    for scheme in SCHEMES {
        let mapper = scheme.mapper();
        let qubit_op = fermionic.map(mapper.as_ref())?;
        let reference = hf.bitstring(mapper.as_ref())?;

        print_section(&format!("{scheme} mapping"));
        print_result("Qubits", qubit_op.num_qubits());
        print_result("Pauli terms", qubit_op.num_terms());
        print_result("Hartree-Fock state", format!("{reference:#06b}"));
        print_result(
            "Hartree-Fock energy",
            format!("{:.10} Ha", qubit_op.basis_expectation(reference)),
        );
        let ground = min_eigenvalue(&qubit_op)?;
        print_result("Ground energy", format!("{ground:.10} Ha"));
        if args.terms {
            println!("{qubit_op}");
        }

        let found = Z2Symmetries::find(&qubit_op)?.with_reference_sector(reference)?;
        let tapered = found.taper(&qubit_op)?;
        let tapered_ground = min_eigenvalue(&tapered)?;
        print_result(
            "Z2 symmetries",
            found
                .symmetries()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        );
        print_result(
            "Tapered",
            format!(
                "{} qubits, {} terms, ground {tapered_ground:.10} Ha",
                tapered.num_qubits(),
                tapered.num_terms()
            ),
        );

        if mapper.allows_two_qubit_reduction() {
            let z2 = Z2Symmetries::two_qubit_reduction(
                mapper.as_ref(),
                fermionic.num_modes(),
                hf.num_particles(),
            )?;
            let reduced = z2.taper(&qubit_op)?;
            print_result(
                "Two-qubit reduction",
                format!(
                    "{} qubits, {} terms, ground {:.10} Ha",
                    reduced.num_qubits(),
                    reduced.num_terms(),
                    min_eigenvalue(&reduced)?
                ),
            );
            if args.terms {
                println!("{reduced}");
            }
        }

        if (tapered_ground - fermionic_ground).abs() < 1e-6 {
            print_success("Tapered spectrum keeps the ground state");
        } else {
            print_warning("Tapered sector excludes the overall ground state");
        }
    }

    print_section("Summary");
    print_info(&format!(
        "Add {:.10} Ha nuclear repulsion for total energies",
        integrals.nuclear_repulsion()
    ));

    Ok(())
}
