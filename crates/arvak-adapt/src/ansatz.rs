//! Growing product-of-exponentials ansatz.
//!
//! ```text
//! |ψ(θ)⟩ = exp(θ_k T_k) ··· exp(θ_1 T_1) |ref⟩
//! ```
//!
//! Blocks share their generators with the operator pool through `Arc`, so
//! appending a block never copies or alters a pool entry.

use std::sync::Arc;

use arvak_chem::HoppingOperator;

use crate::error::{AdaptError, AdaptResult};
use crate::statevector::Statevector;

/// Parameterized ansatz on a fixed reference state.
#[derive(Debug, Clone)]
pub struct AnsatzCircuit {
    num_qubits: u32,
    reference: u64,
    blocks: Vec<Arc<HoppingOperator>>,
}

impl AnsatzCircuit {
    /// Empty ansatz preparing `|reference⟩`.
    pub fn new(num_qubits: u32, reference: u64) -> Self {
        Self {
            num_qubits,
            reference,
            blocks: Vec::new(),
        }
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Reference basis index.
    pub fn reference(&self) -> u64 {
        self.reference
    }

    /// One parameter per block.
    pub fn num_parameters(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks in application order.
    pub fn blocks(&self) -> &[Arc<HoppingOperator>] {
        &self.blocks
    }

    /// Append a block (applied last).
    pub fn push(&mut self, block: Arc<HoppingOperator>) -> AdaptResult<()> {
        let width = block.qubit_operator().num_qubits();
        if width != self.num_qubits {
            return Err(AdaptError::QubitMismatch(format!(
                "generator '{}' acts on {width} qubits, ansatz has {}",
                block.label(),
                self.num_qubits
            )));
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Copy of `self` with `block` appended.
    pub fn with_block(&self, block: Arc<HoppingOperator>) -> AdaptResult<Self> {
        let mut extended = self.clone();
        extended.push(block)?;
        Ok(extended)
    }

    /// Statevector for `params`.
    pub fn prepare(&self, params: &[f64]) -> AdaptResult<Statevector> {
        if params.len() != self.blocks.len() {
            return Err(AdaptError::InvalidParameters(format!(
                "ansatz has {} parameters, got {}",
                self.blocks.len(),
                params.len()
            )));
        }
        if let Some(bad) = params.iter().find(|p| !p.is_finite()) {
            return Err(AdaptError::InvalidParameters(format!(
                "non-finite parameter {bad}"
            )));
        }
        let mut state = Statevector::basis_state(self.num_qubits, self.reference)?;
        for (block, &theta) in self.blocks.iter().zip(params) {
            state.apply_exponential(block.qubit_operator(), theta)?;
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arvak_chem::mapping::ParityMapper;
    use arvak_chem::molecules::h2_sto3g;
    use arvak_chem::{HartreeFock, PoolBuilder, Z2Symmetries};

    fn h2_pool() -> (u64, arvak_chem::OperatorPool) {
        let hf = HartreeFock::from_integrals(&h2_sto3g()).unwrap();
        let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
        let reference = hf.reduced_bitstring(&ParityMapper, Some(&z2)).unwrap();
        let pool = PoolBuilder::new(&hf, &ParityMapper)
            .with_symmetries(&z2)
            .build(2)
            .unwrap();
        (reference, pool)
    }

    #[test]
    fn test_empty_ansatz_is_reference() {
        let (reference, _) = h2_pool();
        let ansatz = AnsatzCircuit::new(2, reference);
        let psi = ansatz.prepare(&[]).unwrap();
        assert_eq!(psi.amplitudes()[reference as usize].re, 1.0);
    }

    #[test]
    fn test_parameter_count_checked() {
        let (reference, pool) = h2_pool();
        let mut ansatz = AnsatzCircuit::new(2, reference);
        ansatz.push(Arc::clone(&pool.operators()[2])).unwrap();
        assert_eq!(ansatz.num_parameters(), 1);
        assert!(matches!(
            ansatz.prepare(&[0.1, 0.2]),
            Err(AdaptError::InvalidParameters(_))
        ));
        assert!(matches!(
            ansatz.prepare(&[f64::NAN]),
            Err(AdaptError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_with_block_leaves_original() {
        let (reference, pool) = h2_pool();
        let ansatz = AnsatzCircuit::new(2, reference);
        let extended = ansatz.with_block(Arc::clone(&pool.operators()[0])).unwrap();
        assert_eq!(ansatz.num_parameters(), 0);
        assert_eq!(extended.num_parameters(), 1);
        assert!(Arc::ptr_eq(&extended.blocks()[0], &pool.operators()[0]));
    }

    #[test]
    fn test_width_mismatch() {
        let (_, pool) = h2_pool();
        let mut ansatz = AnsatzCircuit::new(3, 0);
        assert!(matches!(
            ansatz.push(Arc::clone(&pool.operators()[0])),
            Err(AdaptError::QubitMismatch(_))
        ));
    }
}
