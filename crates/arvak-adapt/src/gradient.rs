//! Candidate gradient estimators.
//!
//! For a candidate generator `T` appended to the current ansatz with a new
//! parameter `θ = 0`, both estimators approximate
//!
//! ```text
//! ∂E/∂θ |_{θ=0} = ⟨ψ| [H, T] |ψ⟩
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arvak_chem::{HoppingOperator, QubitOperator};
use serde::{Deserialize, Serialize};

use crate::ansatz::AnsatzCircuit;
use crate::backend::Backend;
use crate::error::{AdaptError, AdaptResult};

/// Which estimator to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientMethod {
    /// Central difference `(E(+δ) − E(−δ)) / 2δ` on the extended ansatz.
    #[default]
    FiniteDifference,
    /// Expectation of the commutator `[H, T]` on the current state.
    Commutator,
}

impl GradientMethod {
    /// Build the estimator; `delta` only matters for finite differences.
    pub fn strategy(self, delta: f64) -> Box<dyn GradientStrategy> {
        match self {
            Self::FiniteDifference => Box::new(FiniteDifference::new(delta)),
            Self::Commutator => Box::new(CommutatorGradient),
        }
    }

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FiniteDifference => "finite_difference",
            Self::Commutator => "commutator",
        }
    }
}

impl fmt::Display for GradientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientMethod {
    type Err = AdaptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "finite_difference" | "fd" => Ok(Self::FiniteDifference),
            "commutator" => Ok(Self::Commutator),
            other => Err(AdaptError::Config(format!(
                "unknown gradient method '{other}'"
            ))),
        }
    }
}

/// Estimates the energy gradient of one candidate.
pub trait GradientStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Gradient of `⟨H⟩` with respect to a new parameter on `candidate`.
    fn gradient(
        &self,
        backend: &dyn Backend,
        hamiltonian: &QubitOperator,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        candidate: &Arc<HoppingOperator>,
    ) -> AdaptResult<f64>;
}

/// Central finite difference on the extended ansatz.
#[derive(Debug, Clone, Copy)]
pub struct FiniteDifference {
    delta: f64,
}

impl FiniteDifference {
    /// Estimator with step `delta`.
    pub fn new(delta: f64) -> Self {
        Self { delta }
    }

    /// Step size.
    pub fn delta(&self) -> f64 {
        self.delta
    }
}

impl GradientStrategy for FiniteDifference {
    fn name(&self) -> &str {
        "finite_difference"
    }

    fn gradient(
        &self,
        backend: &dyn Backend,
        hamiltonian: &QubitOperator,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        candidate: &Arc<HoppingOperator>,
    ) -> AdaptResult<f64> {
        let extended = ansatz.with_block(Arc::clone(candidate))?;
        let mut shifted = Vec::with_capacity(params.len() + 1);
        shifted.extend_from_slice(params);
        shifted.push(self.delta);
        let plus = backend.evaluate(&extended, &shifted, hamiltonian)?;
        if let Some(last) = shifted.last_mut() {
            *last = -self.delta;
        }
        let minus = backend.evaluate(&extended, &shifted, hamiltonian)?;
        Ok((plus - minus) / (2.0 * self.delta))
    }
}

/// `⟨ψ|[H, T]|ψ⟩` evaluated on the current ansatz.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommutatorGradient;

impl GradientStrategy for CommutatorGradient {
    fn name(&self) -> &str {
        "commutator"
    }

    fn gradient(
        &self,
        backend: &dyn Backend,
        hamiltonian: &QubitOperator,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        candidate: &Arc<HoppingOperator>,
    ) -> AdaptResult<f64> {
        let observable = hamiltonian.commutator(candidate.qubit_operator())?;
        if observable.is_zero() {
            return Ok(0.0);
        }
        backend.evaluate(ansatz, params, &observable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::StatevectorBackend;
    use arvak_chem::fermion::FermionicOperator;
    use arvak_chem::mapping::ParityMapper;
    use arvak_chem::molecules::h2_sto3g;
    use arvak_chem::{HartreeFock, PoolBuilder, QubitMapper, Z2Symmetries};

    fn h2_problem() -> (QubitOperator, AnsatzCircuit, arvak_chem::OperatorPool) {
        let integrals = h2_sto3g();
        let hf = HartreeFock::from_integrals(&integrals).unwrap();
        let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
        let fermionic = FermionicOperator::from_integrals(&integrals).unwrap();
        let hamiltonian = z2.taper(&ParityMapper.map(&fermionic).unwrap()).unwrap();
        let reference = hf.reduced_bitstring(&ParityMapper, Some(&z2)).unwrap();
        let pool = PoolBuilder::new(&hf, &ParityMapper)
            .with_symmetries(&z2)
            .build(2)
            .unwrap();
        (hamiltonian, AnsatzCircuit::new(2, reference), pool)
    }

    #[test]
    fn test_singles_vanish_at_reference() {
        let (h, ansatz, pool) = h2_problem();
        let fd = FiniteDifference::new(0.1);
        for op in &pool.operators()[..2] {
            let g = fd.gradient(&StatevectorBackend, &h, &ansatz, &[], op).unwrap();
            assert!(g.abs() < 1e-10, "single gradient {g}");
        }
    }

    #[test]
    fn test_commutator_matches_small_step_difference() {
        let (h, ansatz, pool) = h2_problem();
        let double = &pool.operators()[2];
        let exact = CommutatorGradient
            .gradient(&StatevectorBackend, &h, &ansatz, &[], double)
            .unwrap();
        let fd = FiniteDifference::new(1e-4)
            .gradient(&StatevectorBackend, &h, &ansatz, &[], double)
            .unwrap();
        assert!(exact.abs() > 0.3);
        assert!((exact - fd).abs() < 1e-6);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "finite-difference".parse::<GradientMethod>().unwrap(),
            GradientMethod::FiniteDifference
        );
        assert_eq!(GradientMethod::Commutator.to_string(), "commutator");
        assert!(matches!(
            "adjoint".parse::<GradientMethod>(),
            Err(AdaptError::Config(_))
        ));
    }
}
