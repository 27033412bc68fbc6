//! Arvak ADAPT-VQE demos
//!
//! Command-line walkthroughs of the chemistry pipeline:
//!
//! - **demo-mapping**: molecular integrals under Jordan-Wigner, Parity and
//!   Bravyi-Kitaev, with Z2 tapering and exact spectra
//! - **demo-adapt-vqe**: the full adaptive eigensolver, configured from YAML,
//!   environment and flags
//!
//! ```rust
//! use arvak_adapt::ProblemConfig;
//! use arvak_chem::molecules::h2_sto3g;
//! use arvak_demos::problem::prepare;
//!
//! let prepared = prepare(&h2_sto3g(), &ProblemConfig::default()).unwrap();
//! assert_eq!(prepared.hamiltonian.num_qubits(), 2);
//! assert_eq!(prepared.pool.len(), 3);
//! ```

pub mod problem;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(template) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(template.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Install a `tracing` subscriber: `RUST_LOG` wins, else `-v` count.
pub fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
