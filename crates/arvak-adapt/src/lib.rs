//! Adaptive variational eigensolver (ADAPT-VQE).
//!
//! Grows an ansatz one excitation at a time from an [`OperatorPool`]: every
//! round ranks the pool by energy gradient, appends the steepest operator and
//! re-optimizes all parameters, until the largest gradient drops below a
//! threshold or an iteration cap is hit.
//!
//! # Example
//!
//! ```rust
//! use arvak_adapt::{AdaptConfig, AdaptVqe, Bfgs, FinishingCriterion, StatevectorBackend};
//! use arvak_chem::fermion::FermionicOperator;
//! use arvak_chem::mapping::{ParityMapper, QubitMapper};
//! use arvak_chem::molecules::h2_sto3g;
//! use arvak_chem::{HartreeFock, PoolBuilder, Z2Symmetries};
//!
//! let integrals = h2_sto3g();
//! let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
//! let fermionic = FermionicOperator::from_integrals(&integrals).unwrap();
//! let hamiltonian = z2.taper(&ParityMapper.map(&fermionic).unwrap()).unwrap();
//!
//! let hf = HartreeFock::from_integrals(&integrals).unwrap();
//! let reference = hf.reduced_bitstring(&ParityMapper, Some(&z2)).unwrap();
//! let pool = PoolBuilder::new(&hf, &ParityMapper)
//!     .with_symmetries(&z2)
//!     .build(2)
//!     .unwrap();
//!
//! let config = AdaptConfig::default().with_workers(1);
//! let adapt = AdaptVqe::new(StatevectorBackend, Bfgs::new(), config).unwrap();
//! let result = adapt.run(&hamiltonian, &pool, reference).unwrap();
//!
//! assert_eq!(result.finishing_criterion, FinishingCriterion::Threshold);
//! assert!((result.energy - (-1.857_275_03)).abs() < 1e-6);
//! ```
//!
//! [`OperatorPool`]: arvak_chem::OperatorPool

pub mod ansatz;
pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod gradient;
pub mod optimizer;
pub mod statevector;

pub use ansatz::AnsatzCircuit;
pub use backend::{AnyBackend, Backend, ShotBackend, StatevectorBackend};
pub use config::{AdaptConfig, BackendKind, BackendSettings, OptimizerConfig, ProblemConfig};
pub use controller::{AdaptVqe, AdaptVqeResult, AnsatzState, FinishingCriterion};
pub use error::{AdaptError, AdaptResult};
pub use gradient::{CommutatorGradient, FiniteDifference, GradientMethod, GradientStrategy};
pub use optimizer::{
    AnyOptimizer, Bfgs, NelderMead, OptimizationResult, Optimizer, OptimizerKind, Spsa,
};
pub use statevector::Statevector;
