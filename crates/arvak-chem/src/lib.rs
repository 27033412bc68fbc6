//! Molecular Hamiltonians on qubits.
//!
//! Turns one- and two-body molecular integrals into qubit operators ready
//! for a variational algorithm:
//!
//! - **Fermionic operators** built from integrals in block spin ordering
//! - **Qubit mappings**: Jordan-Wigner, Parity and Bravyi-Kitaev
//! - **Z2 tapering**: symmetry search, the Parity two-qubit reduction, and
//!   sector selection from the Hartree-Fock reference
//! - **Excitation pools** of anti-Hermitian hopping generators, mapped and
//!   tapered consistently with the Hamiltonian
//!
//! # Quick start
//!
//! ```rust
//! use arvak_chem::fermion::FermionicOperator;
//! use arvak_chem::mapping::{ParityMapper, QubitMapper};
//! use arvak_chem::molecules::h2_sto3g;
//! use arvak_chem::symmetry::Z2Symmetries;
//!
//! let integrals = h2_sto3g();
//! let hamiltonian = FermionicOperator::from_integrals(&integrals).unwrap();
//! let qubit_op = ParityMapper.map(&hamiltonian).unwrap();
//! assert_eq!(qubit_op.num_qubits(), 4);
//!
//! let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
//! let reduced = z2.taper(&qubit_op).unwrap();
//! assert_eq!(reduced.num_qubits(), 2);
//! assert_eq!(reduced.num_terms(), 5);
//! ```

pub mod error;
pub mod exact;
pub mod excitation;
pub mod fermion;
pub mod integrals;
pub mod mapping;
pub mod molecules;
pub mod operator;
pub mod pauli;
pub mod reference;
pub mod symmetry;

pub use error::{ChemError, ChemResult};
pub use excitation::{Excitation, HoppingOperator, OperatorPool, PoolBuilder};
pub use fermion::{FermionicOperator, LadderOp};
pub use integrals::{ChemistryDriver, ElectronicIntegrals, JsonDriver};
pub use mapping::{
    BravyiKitaevMapper, JordanWignerMapper, MappingScheme, ParityMapper, QubitMapper,
};
pub use operator::{PauliTerm, QubitOperator};
pub use pauli::{Pauli, PauliString};
pub use reference::HartreeFock;
pub use symmetry::Z2Symmetries;
