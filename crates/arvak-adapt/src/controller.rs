//! The adaptive loop.
//!
//! ```text
//! start ──► step ──► step ──► … ──► finish
//!            │
//!            ├─ gradients of every candidate (parallel, merged by pool index)
//!            ├─ argmax |g|  (first in pool order on ties)
//!            ├─ |g| < threshold          → threshold
//!            ├─ append, re-optimize all parameters
//!            └─ iteration == max          → max_iterations
//! ```
//!
//! Finishing a state before either criterion holds reports `stopped`.
//!
//! The pool is only read. Each run owns one [`AnsatzState`], passed by `&mut`
//! into [`AdaptVqe::step`], so callers can stop between iterations.

use std::fmt;
use std::sync::Arc;

use arvak_chem::{OperatorPool, QubitOperator};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ansatz::AnsatzCircuit;
use crate::backend::Backend;
use crate::config::AdaptConfig;
use crate::error::{AdaptError, AdaptResult};
use crate::gradient::GradientStrategy;
use crate::optimizer::Optimizer;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishingCriterion {
    /// Largest gradient fell below the threshold.
    Threshold,
    /// Iteration cap reached; the pool may be insufficient.
    MaxIterations,
    /// Selection started repeating (only with cycle detection enabled).
    Cycle,
    /// The caller finished the run before any criterion held.
    Stopped,
}

impl FinishingCriterion {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::MaxIterations => "max_iterations",
            Self::Cycle => "cycle",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for FinishingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable state of one run.
#[derive(Debug, Clone)]
pub struct AnsatzState {
    ansatz: AnsatzCircuit,
    selected: Vec<usize>,
    parameters: Vec<f64>,
    iteration: usize,
    energy: f64,
    max_gradient: f64,
    last_gradients: Vec<f64>,
    gradient_history: Vec<f64>,
    energy_history: Vec<f64>,
    evaluations: usize,
    finished: Option<FinishingCriterion>,
}

impl AnsatzState {
    /// Current ansatz.
    pub fn ansatz(&self) -> &AnsatzCircuit {
        &self.ansatz
    }

    /// Pool indices selected so far.
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    /// Optimized parameters, one per selected operator.
    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    /// Completed growth iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Energy of the current ansatz at its parameters.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Largest gradient magnitude of the latest selection round.
    pub fn max_gradient(&self) -> f64 {
        self.max_gradient
    }

    /// Gradients of the latest selection round, in pool order.
    pub fn last_gradients(&self) -> &[f64] {
        &self.last_gradients
    }

    /// Terminal criterion, once reached.
    pub fn finishing_criterion(&self) -> Option<FinishingCriterion> {
        self.finished
    }

    /// Whether the run has stopped.
    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }
}

/// Terminal snapshot of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptVqeResult {
    /// Final energy (expectation of the supplied operator).
    pub energy: f64,
    /// Growth iterations performed.
    pub num_iterations: usize,
    /// Largest gradient magnitude of the last selection round.
    pub final_max_grad: f64,
    /// Why the loop stopped.
    pub finishing_criterion: FinishingCriterion,
    /// Labels of the selected excitations, in ansatz order.
    pub operator_list: Vec<String>,
    /// Pool indices of the selected excitations.
    pub operator_indices: Vec<usize>,
    /// Optimized parameters, same length as `operator_list`.
    pub parameters: Vec<f64>,
    /// Largest gradient magnitude per selection round.
    pub gradient_history: Vec<f64>,
    /// Energy at start and after every iteration.
    pub energy_history: Vec<f64>,
    /// Objective evaluations spent in the optimizer.
    pub optimizer_evaluations: usize,
}

/// Adaptive VQE driver over a backend and an optimizer.
pub struct AdaptVqe<B: Backend, O: Optimizer> {
    backend: B,
    optimizer: O,
    config: AdaptConfig,
    gradient: Box<dyn GradientStrategy>,
    workers: ThreadPool,
}

impl<B: Backend, O: Optimizer> fmt::Debug for AdaptVqe<B, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptVqe")
            .field("backend", &self.backend.name())
            .field("optimizer", &self.optimizer.name())
            .field("gradient", &self.gradient.name())
            .field("workers", &self.workers.current_num_threads())
            .field("config", &self.config)
            .finish()
    }
}

impl<B: Backend, O: Optimizer> AdaptVqe<B, O> {
    /// Validate `config` and size the gradient worker pool.
    pub fn new(backend: B, optimizer: O, config: AdaptConfig) -> AdaptResult<Self> {
        config.validate()?;
        let threads = config.workers.min(backend.max_concurrency()).max(1);
        let workers = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("adapt-gradient-{i}"))
            .build()
            .map_err(|e| AdaptError::Config(format!("gradient worker pool: {e}")))?;
        let gradient = config.gradient.strategy(config.delta);
        Ok(Self {
            backend,
            optimizer,
            config,
            gradient,
            workers,
        })
    }

    /// Replace the gradient estimator.
    #[must_use]
    pub fn with_gradient_strategy(mut self, gradient: Box<dyn GradientStrategy>) -> Self {
        self.gradient = gradient;
        self
    }

    /// Run configuration.
    pub fn config(&self) -> &AdaptConfig {
        &self.config
    }

    /// Backend in use.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Evaluate the reference state and open a run.
    pub fn start(
        &self,
        hamiltonian: &QubitOperator,
        pool: &OperatorPool,
        reference: u64,
    ) -> AdaptResult<AnsatzState> {
        if hamiltonian.num_qubits() != pool.num_qubits() {
            return Err(AdaptError::QubitMismatch(format!(
                "Hamiltonian acts on {} qubits, pool on {}",
                hamiltonian.num_qubits(),
                pool.num_qubits()
            )));
        }
        let ansatz = AnsatzCircuit::new(hamiltonian.num_qubits(), reference);
        let energy = self.backend.evaluate(&ansatz, &[], hamiltonian)?;
        info!(
            backend = self.backend.name(),
            optimizer = self.optimizer.name(),
            gradient = self.gradient.name(),
            pool_size = pool.len(),
            num_qubits = hamiltonian.num_qubits(),
            energy,
            "adaptive run started"
        );
        Ok(AnsatzState {
            ansatz,
            selected: Vec::new(),
            parameters: Vec::new(),
            iteration: 0,
            energy,
            max_gradient: 0.0,
            last_gradients: Vec::new(),
            gradient_history: Vec::new(),
            energy_history: vec![energy],
            evaluations: 0,
            finished: None,
        })
    }

    /// One select-and-optimize round. Returns the criterion once the run stops.
    pub fn step(
        &self,
        state: &mut AnsatzState,
        hamiltonian: &QubitOperator,
        pool: &OperatorPool,
    ) -> AdaptResult<Option<FinishingCriterion>> {
        if let Some(done) = state.finished {
            return Ok(Some(done));
        }

        let gradients = self.gradients(state, hamiltonian, pool)?;
        let best = select(&gradients, |i| {
            self.config.exclude_selected && state.selected.contains(&i)
        });
        state.last_gradients = gradients;

        let Some((index, gradient)) = best else {
            state.max_gradient = 0.0;
            return Ok(Some(self.stop(state, FinishingCriterion::Threshold)));
        };
        state.max_gradient = gradient.abs();
        state.gradient_history.push(state.max_gradient);

        if state.max_gradient < self.config.threshold {
            return Ok(Some(self.stop(state, FinishingCriterion::Threshold)));
        }

        if self.config.detect_cycles {
            let mut candidate = state.selected.clone();
            candidate.push(index);
            if ends_in_cycle(&candidate) {
                return Ok(Some(self.stop(state, FinishingCriterion::Cycle)));
            }
        }

        let Some(operator) = pool.get(index) else {
            return Err(AdaptError::QubitMismatch(format!(
                "selected index {index} outside pool of {}",
                pool.len()
            )));
        };
        let extended = state.ansatz.with_block(Arc::clone(operator))?;
        let mut initial = state.parameters.clone();
        initial.push(0.0);

        let result = self.optimizer.minimize(
            |params: &[f64]| self.backend.evaluate(&extended, params, hamiltonian),
            initial,
        )?;

        state.ansatz = extended;
        state.selected.push(index);
        state.parameters = result.optimal_params;
        state.energy = result.optimal_value;
        state.energy_history.push(state.energy);
        state.evaluations += result.num_evaluations;
        state.iteration += 1;

        info!(
            iteration = state.iteration,
            operator = %operator.label(),
            max_gradient = state.max_gradient,
            energy = state.energy,
            evaluations = result.num_evaluations,
            converged = result.converged,
            "operator appended"
        );

        if state.iteration >= self.config.max_iterations {
            return Ok(Some(self.stop(state, FinishingCriterion::MaxIterations)));
        }
        Ok(None)
    }

    /// Snapshot a state as a result. A state no criterion has finished yet
    /// is reported as [`FinishingCriterion::Stopped`].
    pub fn finish(&self, state: AnsatzState) -> AdaptVqeResult {
        let operator_list = state
            .ansatz
            .blocks()
            .iter()
            .map(|b| b.label())
            .collect();
        AdaptVqeResult {
            energy: state.energy,
            num_iterations: state.iteration,
            final_max_grad: state.max_gradient,
            finishing_criterion: state.finished.unwrap_or(FinishingCriterion::Stopped),
            operator_list,
            operator_indices: state.selected,
            parameters: state.parameters,
            gradient_history: state.gradient_history,
            energy_history: state.energy_history,
            optimizer_evaluations: state.evaluations,
        }
    }

    /// Grow the ansatz from `|reference⟩` until a finishing criterion holds.
    pub fn run(
        &self,
        hamiltonian: &QubitOperator,
        pool: &OperatorPool,
        reference: u64,
    ) -> AdaptResult<AdaptVqeResult> {
        let mut state = self.start(hamiltonian, pool, reference)?;
        while self.step(&mut state, hamiltonian, pool)?.is_none() {}
        Ok(self.finish(state))
    }

    fn gradients(
        &self,
        state: &AnsatzState,
        hamiltonian: &QubitOperator,
        pool: &OperatorPool,
    ) -> AdaptResult<Vec<f64>> {
        let backend: &dyn Backend = &self.backend;
        let strategy = self.gradient.as_ref();
        let results: Vec<AdaptResult<f64>> = self.workers.install(|| {
            pool.operators()
                .par_iter()
                .map(|op| {
                    strategy.gradient(backend, hamiltonian, &state.ansatz, &state.parameters, op)
                })
                .collect()
        });
        let gradients = results.into_iter().collect::<AdaptResult<Vec<f64>>>()?;
        debug!(iteration = state.iteration, ?gradients, "candidate gradients");
        Ok(gradients)
    }

    fn stop(&self, state: &mut AnsatzState, criterion: FinishingCriterion) -> FinishingCriterion {
        state.finished = Some(criterion);
        info!(
            criterion = %criterion,
            iterations = state.iteration,
            energy = state.energy,
            max_gradient = state.max_gradient,
            "adaptive run finished"
        );
        criterion
    }
}

/// Largest `|g|` among non-excluded entries; the first one wins on ties.
fn select(gradients: &[f64], excluded: impl Fn(usize) -> bool) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &g) in gradients.iter().enumerate() {
        if excluded(i) {
            continue;
        }
        match best {
            Some((_, b)) if g.abs() <= b.abs() => {}
            _ => best = Some((i, g)),
        }
    }
    best
}

/// True when `sequence` ends in a block of length ≥ 2 repeated at least twice.
fn ends_in_cycle(sequence: &[usize]) -> bool {
    let n = sequence.len();
    (2..=n / 2).any(|k| sequence[n - k..] == sequence[n - 2 * k..n - k])
}
