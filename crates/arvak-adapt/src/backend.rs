//! Expectation-value backends.

use std::hash::{Hash, Hasher};

use arvak_chem::QubitOperator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHasher;
use tracing::trace;

use crate::ansatz::AnsatzCircuit;
use crate::config::{BackendKind, BackendSettings};
use crate::error::{AdaptError, AdaptResult};

/// Trait for anything that can estimate `⟨ψ(θ)|O|ψ(θ)⟩`.
///
/// # Contract
///
/// - `evaluate()` MUST be callable concurrently from several threads.
/// - `evaluate()` MUST be deterministic for identical inputs, including
///   sampling backends (seed from the inputs, not from shared state).
/// - `max_concurrency()` bounds how many evaluations the caller runs at once.
pub trait Backend: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Estimate the expectation of `observable` on `ansatz` at `params`.
    fn evaluate(
        &self,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        observable: &QubitOperator,
    ) -> AdaptResult<f64>;

    /// Maximum number of concurrent `evaluate()` calls.
    fn max_concurrency(&self) -> usize {
        usize::MAX
    }
}

/// Exact expectation values from a dense statevector.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatevectorBackend;

impl StatevectorBackend {
    /// Create a new statevector backend.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for StatevectorBackend {
    fn name(&self) -> &str {
        "statevector"
    }

    fn evaluate(
        &self,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        observable: &QubitOperator,
    ) -> AdaptResult<f64> {
        let state = ansatz.prepare(params)?;
        state.expectation(observable)
    }
}

/// Statevector simulation with per-term measurement sampling.
///
/// Each non-identity string is measured `shots` times; its estimate is the
/// mean of `±1` outcomes drawn with `p(+1) = (1 + ⟨P⟩) / 2`.
#[derive(Debug, Clone)]
pub struct ShotBackend {
    shots: u32,
    seed: u64,
}

impl ShotBackend {
    /// Create a sampling backend.
    pub fn new(shots: u32, seed: u64) -> AdaptResult<Self> {
        if shots == 0 {
            return Err(AdaptError::Config("shot count must be at least 1".into()));
        }
        Ok(Self { shots, seed })
    }

    /// Shots per Pauli string.
    pub fn shots(&self) -> u32 {
        self.shots
    }

    fn rng_for(&self, params: &[f64], observable: &QubitOperator) -> StdRng {
        let mut hasher = FxHasher::default();
        self.seed.hash(&mut hasher);
        for p in params {
            p.to_bits().hash(&mut hasher);
        }
        for t in observable.terms() {
            t.pauli.hash(&mut hasher);
        }
        StdRng::seed_from_u64(hasher.finish())
    }
}

impl Backend for ShotBackend {
    fn name(&self) -> &str {
        "shots"
    }

    fn evaluate(
        &self,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        observable: &QubitOperator,
    ) -> AdaptResult<f64> {
        let state = ansatz.prepare(params)?;
        if observable.num_qubits() != state.num_qubits() {
            return Err(AdaptError::QubitMismatch(format!(
                "observable acts on {} qubits, state has {}",
                observable.num_qubits(),
                state.num_qubits()
            )));
        }
        let mut rng = self.rng_for(params, observable);
        let mut estimate = 0.0;
        for term in observable.terms() {
            if term.pauli.is_identity() {
                estimate += term.coeff.re;
                continue;
            }
            let exact = state.pauli_expectation(&term.pauli).clamp(-1.0, 1.0);
            let p_plus = 0.5 * (1.0 + exact);
            let plus = (0..self.shots).filter(|_| rng.gen_bool(p_plus)).count() as f64;
            let mean = (2.0 * plus - f64::from(self.shots)) / f64::from(self.shots);
            estimate += term.coeff.re * mean;
        }
        trace!(shots = self.shots, estimate, "sampled expectation");
        Ok(estimate)
    }
}

/// Backend selected from configuration.
#[derive(Debug, Clone)]
pub enum AnyBackend {
    /// Exact statevector.
    Statevector(StatevectorBackend),
    /// Sampled measurements.
    Shots(ShotBackend),
}

impl AnyBackend {
    /// Build from the `backend` configuration section.
    pub fn from_settings(settings: &BackendSettings, seed: u64) -> AdaptResult<Self> {
        match settings.kind {
            BackendKind::Statevector => Ok(Self::Statevector(StatevectorBackend)),
            BackendKind::Shots => Ok(Self::Shots(ShotBackend::new(settings.shots, seed)?)),
        }
    }
}

impl Backend for AnyBackend {
    fn name(&self) -> &str {
        match self {
            Self::Statevector(b) => b.name(),
            Self::Shots(b) => b.name(),
        }
    }

    fn evaluate(
        &self,
        ansatz: &AnsatzCircuit,
        params: &[f64],
        observable: &QubitOperator,
    ) -> AdaptResult<f64> {
        match self {
            Self::Statevector(b) => b.evaluate(ansatz, params, observable),
            Self::Shots(b) => b.evaluate(ansatz, params, observable),
        }
    }

    fn max_concurrency(&self) -> usize {
        match self {
            Self::Statevector(b) => b.max_concurrency(),
            Self::Shots(b) => b.max_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn observable() -> QubitOperator {
        QubitOperator::from_labels([("II", -1.0), ("ZI", 0.5), ("IZ", 0.25)]).unwrap()
    }

    #[test]
    fn test_statevector_reference_energy() {
        let ansatz = AnsatzCircuit::new(2, 0b01);
        let e = StatevectorBackend
            .evaluate(&ansatz, &[], &observable())
            .unwrap();
        // ZI on |01⟩: qubit 1 is 0 → +1; IZ: qubit 0 is 1 → -1
        assert_abs_diff_eq!(e, -1.0 + 0.5 - 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_shots_exact_on_basis_state() {
        let ansatz = AnsatzCircuit::new(2, 0b01);
        let backend = ShotBackend::new(100, 7).unwrap();
        let e = backend.evaluate(&ansatz, &[], &observable()).unwrap();
        assert_abs_diff_eq!(e, -0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_shots_deterministic() {
        let ansatz = AnsatzCircuit::new(1, 0);
        let x = QubitOperator::from_labels([("X", 1.0)]).unwrap();
        let backend = ShotBackend::new(64, 3).unwrap();
        let a = backend.evaluate(&ansatz, &[], &x).unwrap();
        let b = backend.evaluate(&ansatz, &[], &x).unwrap();
        assert_eq!(a, b);
        assert!(a.abs() <= 1.0);
    }

    #[test]
    fn test_zero_shots_rejected() {
        assert!(matches!(ShotBackend::new(0, 1), Err(AdaptError::Config(_))));
    }

    #[test]
    fn test_any_backend_from_settings() {
        let settings = BackendSettings::default();
        let backend = AnyBackend::from_settings(&settings, 1).unwrap();
        assert_eq!(backend.name(), "statevector");
    }
}
