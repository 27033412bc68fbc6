//! ADAPT-VQE Demo
//!
//! Grows a molecular ansatz one excitation at a time and compares the result
//! against exact diagonalization.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use arvak_adapt::{
    AdaptConfig, AdaptVqe, AnyBackend, AnyOptimizer, FinishingCriterion, GradientMethod,
};
use arvak_chem::exact::{MAX_DENSE_QUBITS, min_eigenvalue};
use arvak_chem::molecules::H2Sto3gDriver;
use arvak_chem::{ChemistryDriver, JsonDriver, MappingScheme};
use arvak_demos::problem::prepare;
use arvak_demos::{
    create_progress_bar, init_logging, print_header, print_info, print_result, print_section,
    print_success, print_warning,
};

#[derive(Parser, Debug)]
#[command(name = "demo-adapt-vqe")]
#[command(about = "Adaptive VQE ground-state search for molecular Hamiltonians")]
struct Args {
    /// YAML configuration file (ARVAK_ADAPT_* variables override it)
    #[arg(short, long, env = "ARVAK_ADAPT_CONFIG")]
    config: Option<PathBuf>,

    /// Integrals as JSON; defaults to built-in H2 / STO-3G at 0.735 Å
    #[arg(short, long)]
    integrals: Option<PathBuf>,

    /// Fermion-to-qubit mapping (jordan_wigner, parity, bravyi_kitaev)
    #[arg(short, long)]
    mapping: Option<MappingScheme>,

    /// Gradient threshold
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Maximum number of operators to add
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Gradient estimator (finite_difference, commutator)
    #[arg(short, long)]
    gradient: Option<GradientMethod>,

    /// Taper every Z2 symmetry found instead of the parity two-qubit reduction
    #[arg(long)]
    z2: bool,

    /// Write the result as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_config(args: &Args) -> anyhow::Result<AdaptConfig> {
    let base = match &args.config {
        Some(path) => AdaptConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AdaptConfig::default(),
    };
    let mut config = base.with_env_overrides(|key| std::env::var(key).ok())?;

    if let Some(mapping) = args.mapping {
        config.problem.mapping = mapping;
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(gradient) = args.gradient {
        config.gradient = gradient;
    }
    if args.z2 {
        config.problem.z2_tapering = true;
        config.problem.two_qubit_reduction = false;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let config = load_config(&args)?;

    print_header("ADAPT-VQE Molecular Ground State");

    let integrals = match &args.integrals {
        Some(path) => JsonDriver::new(path).run()?,
        None => H2Sto3gDriver.run()?,
    };
    let prepared = prepare(&integrals, &config.problem)?;

    print_section("Problem Setup");
    print_result(
        "Molecule",
        args.integrals
            .as_ref()
            .map_or_else(|| "H₂ / STO-3G".to_string(), |p| p.display().to_string()),
    );
    print_result("Spatial orbitals", integrals.num_orbitals());
    print_result(
        "Electrons (α, β)",
        format!("({}, {})", integrals.num_alpha(), integrals.num_beta()),
    );
    print_result("Mapping", prepared.mapping);
    match &prepared.symmetries {
        Some(z2) => print_result(
            "Qubits",
            format!(
                "{} → {} (tapered {:?}, sector {:?})",
                prepared.full_num_qubits,
                prepared.hamiltonian.num_qubits(),
                z2.tapered_qubits(),
                z2.sector().unwrap_or_default()
            ),
        ),
        None => print_result("Qubits", prepared.hamiltonian.num_qubits()),
    }
    print_result("Hamiltonian terms", prepared.hamiltonian.num_terms());
    print_result("Pool size", prepared.pool.len());
    print_result("Reference", format!("{:#b}", prepared.reference));

    print_section("Configuration");
    print_result("Threshold", config.threshold);
    print_result("Gradient", config.gradient);
    print_result("Optimizer", format!("{:?}", config.optimizer.kind));
    print_result("Backend", format!("{:?}", config.backend.kind));
    print_result("Max iterations", config.max_iterations);

    let backend = AnyBackend::from_settings(&config.backend, config.seed)?;
    let optimizer = AnyOptimizer::from_config(&config.optimizer, config.seed);
    let max_iterations = config.max_iterations;
    let adapt = AdaptVqe::new(backend, optimizer, config)?;

    print_section("Growing the Ansatz");
    let pb = create_progress_bar(max_iterations as u64, "selecting...");
    let mut state = adapt.start(&prepared.hamiltonian, &prepared.pool, prepared.reference)?;
    while adapt
        .step(&mut state, &prepared.hamiltonian, &prepared.pool)?
        .is_none()
    {
        pb.set_position(state.iteration() as u64);
        pb.set_message(format!("E = {:.8}", state.energy()));
    }
    pb.finish_with_message("done");
    let result = adapt.finish(state);

    print_section("Results");
    let total = result.energy + prepared.energy_shift;
    print_result("Electronic energy", format!("{:.8} Ha", result.energy));
    print_result("Nuclear repulsion", format!("{:.8} Ha", prepared.energy_shift));
    print_result("Total energy", format!("{total:.8} Ha"));
    print_result("Iterations", result.num_iterations);
    print_result("Final max gradient", format!("{:.3e}", result.final_max_grad));
    print_result("Operators", result.operator_list.join(", "));
    print_result(
        "Parameters",
        result
            .parameters
            .iter()
            .map(|p| format!("{p:.6}"))
            .collect::<Vec<_>>()
            .join(", "),
    );

    if prepared.hamiltonian.num_qubits() <= MAX_DENSE_QUBITS {
        let exact = min_eigenvalue(&prepared.hamiltonian)?;
        print_result("Exact (diagonalization)", format!("{exact:.8} Ha"));
        print_result("Error", format!("{:.3e} Ha", (result.energy - exact).abs()));
    } else {
        print_info("Register too wide for exact diagonalization");
    }

    match result.finishing_criterion {
        FinishingCriterion::Threshold => print_success("Converged: gradient below threshold"),
        FinishingCriterion::MaxIterations => {
            print_warning("Stopped at the iteration cap; the pool may be insufficient")
        }
        FinishingCriterion::Cycle => print_warning("Stopped: operator selection started cycling"),
        FinishingCriterion::Stopped => print_warning("Stopped before convergence"),
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        print_info(&format!("Result written to {}", path.display()));
    }

    Ok(())
}
