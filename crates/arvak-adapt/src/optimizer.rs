//! Classical optimizers for the inner parameter fit.
//!
//! Objectives are fallible: a backend error aborts the minimization and is
//! returned unchanged. A non-finite objective value or parameter is reported
//! as [`AdaptError::OptimizerDivergence`].

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::error::{AdaptError, AdaptResult};

/// Result of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Optimal parameter values.
    pub optimal_params: Vec<f64>,
    /// Optimal objective value.
    pub optimal_value: f64,
    /// Number of function evaluations.
    pub num_evaluations: usize,
    /// Number of iterations.
    pub num_iterations: usize,
    /// History of objective values.
    pub history: Vec<f64>,
    /// Whether the optimization converged.
    pub converged: bool,
}

/// Trait for local minimizers.
pub trait Optimizer: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Minimize `objective` starting from `initial_params`.
    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> AdaptResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>;
}

/// Which optimizer to build from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Derivative-free simplex search.
    NelderMead,
    /// Quasi-Newton with finite-difference gradients.
    #[default]
    Bfgs,
    /// Simultaneous perturbation stochastic approximation.
    Spsa,
}

impl FromStr for OptimizerKind {
    type Err = AdaptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "nelder_mead" | "simplex" => Ok(Self::NelderMead),
            "bfgs" => Ok(Self::Bfgs),
            "spsa" => Ok(Self::Spsa),
            other => Err(AdaptError::Config(format!("unknown optimizer '{other}'"))),
        }
    }
}

/// Counts evaluations and rejects non-finite values.
struct Tracked<'a, F> {
    f: F,
    optimizer: &'a str,
    evaluations: usize,
}

impl<'a, F> Tracked<'a, F>
where
    F: FnMut(&[f64]) -> AdaptResult<f64>,
{
    fn new(f: F, optimizer: &'a str) -> Self {
        Self {
            f,
            optimizer,
            evaluations: 0,
        }
    }

    fn eval(&mut self, x: &[f64]) -> AdaptResult<f64> {
        if let Some(bad) = x.iter().find(|v| !v.is_finite()) {
            return Err(self.diverged(format!("parameter became {bad}")));
        }
        let value = (self.f)(x)?;
        self.evaluations += 1;
        if !value.is_finite() {
            return Err(self.diverged(format!("objective returned {value}")));
        }
        Ok(value)
    }

    fn diverged(&self, reason: String) -> AdaptError {
        AdaptError::OptimizerDivergence {
            optimizer: self.optimizer.to_string(),
            evaluations: self.evaluations,
            reason,
        }
    }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map_or(0, |(i, _)| i)
}

fn trivial_result<F>(mut objective: Tracked<'_, F>) -> AdaptResult<OptimizationResult>
where
    F: FnMut(&[f64]) -> AdaptResult<f64>,
{
    let value = objective.eval(&[])?;
    Ok(OptimizationResult {
        optimal_params: Vec::new(),
        optimal_value: value,
        num_evaluations: objective.evaluations,
        num_iterations: 0,
        history: vec![value],
        converged: true,
    })
}

// ---------------------------------------------------------------------------
// Nelder-Mead
// ---------------------------------------------------------------------------

/// Simplex search with a bounded step radius.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Convergence tolerance on the simplex value spread.
    pub tol: f64,
    /// Initial step radius.
    pub rhobeg: f64,
    /// Final step radius.
    pub rhoend: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            tol: 1e-9,
            rhobeg: 0.1,
            rhoend: 1e-6,
        }
    }
}

impl NelderMead {
    /// Create a new simplex optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the step radius schedule.
    pub fn with_step_radius(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }

    fn simplex_around<F>(
        objective: &mut Tracked<'_, F>,
        base: &[f64],
        f_base: f64,
        rho: f64,
    ) -> AdaptResult<(Vec<Vec<f64>>, Vec<f64>)>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>,
    {
        let mut simplex = vec![base.to_vec()];
        let mut values = vec![f_base];
        for i in 0..base.len() {
            let mut point = base.to_vec();
            point[i] += rho;
            values.push(objective.eval(&point)?);
            simplex.push(point);
        }
        Ok((simplex, values))
    }
}

impl Optimizer for NelderMead {
    fn name(&self) -> &str {
        "nelder_mead"
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> AdaptResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>,
    {
        let mut objective = Tracked::new(objective, self.name());
        let n = initial_params.len();
        if n == 0 {
            return trivial_result(objective);
        }

        let f0 = objective.eval(&initial_params)?;
        let mut best_value = f0;
        let mut history = vec![f0];
        let (mut simplex, mut values) =
            Self::simplex_around(&mut objective, &initial_params, f0, self.rhobeg)?;

        let mut rho = self.rhobeg;
        let mut converged = false;
        let mut iterations = 0;

        for _ in 0..self.maxiter {
            iterations += 1;
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let best = order[0];
            let second_worst = order[n - 1];
            let worst = order[n];

            let spread = values[worst] - values[best];
            if spread < self.tol && rho <= self.rhoend {
                converged = true;
                break;
            }

            if spread < self.tol {
                rho = (rho * 0.5).max(self.rhoend);
                let base = simplex[best].clone();
                let f_base = values[best];
                (simplex, values) = Self::simplex_around(&mut objective, &base, f_base, rho)?;
                continue;
            }

            let mut centroid = vec![0.0; n];
            for &idx in &order[..n] {
                for (c, v) in centroid.iter_mut().zip(&simplex[idx]) {
                    *c += v;
                }
            }
            centroid.iter_mut().for_each(|c| *c /= n as f64);

            let mut reflected: Vec<f64> = centroid
                .iter()
                .zip(&simplex[worst])
                .map(|(c, w)| 2.0 * c - w)
                .collect();
            for (r, c) in reflected.iter_mut().zip(&centroid) {
                let diff = *r - c;
                if diff.abs() > rho {
                    *r = c + rho * diff.signum();
                }
            }
            let f_reflected = objective.eval(&reflected)?;

            if f_reflected < values[best] {
                let expanded: Vec<f64> = centroid
                    .iter()
                    .zip(&reflected)
                    .map(|(c, r)| c + 2.0 * (r - c))
                    .collect();
                let f_expanded = objective.eval(&expanded)?;
                if f_expanded < f_reflected {
                    simplex[worst] = expanded;
                    values[worst] = f_expanded;
                } else {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                }
            } else if f_reflected < values[second_worst] {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            } else {
                let contracted: Vec<f64> = centroid
                    .iter()
                    .zip(&simplex[worst])
                    .map(|(c, w)| 0.5 * (c + w))
                    .collect();
                let f_contracted = objective.eval(&contracted)?;
                if f_contracted < values[worst] {
                    simplex[worst] = contracted;
                    values[worst] = f_contracted;
                } else {
                    let anchor = simplex[best].clone();
                    for i in (0..=n).filter(|&i| i != best) {
                        for (x, a) in simplex[i].iter_mut().zip(&anchor) {
                            *x = 0.5 * (a + *x);
                        }
                        values[i] = objective.eval(&simplex[i])?;
                    }
                }
            }

            let current = values[argmin(&values)];
            if current < best_value {
                best_value = current;
                history.push(current);
            }
        }

        let best = argmin(&values);
        debug!(
            optimizer = self.name(),
            evaluations = objective.evaluations,
            value = values[best],
            converged,
            "minimization finished"
        );
        Ok(OptimizationResult {
            optimal_params: simplex[best].clone(),
            optimal_value: values[best],
            num_evaluations: objective.evaluations,
            num_iterations: iterations,
            history,
            converged,
        })
    }
}

// ---------------------------------------------------------------------------
// BFGS
// ---------------------------------------------------------------------------

/// Quasi-Newton minimizer with central-difference gradients and a
/// backtracking Armijo line search.
#[derive(Debug, Clone)]
pub struct Bfgs {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Gradient-norm tolerance.
    pub tol: f64,
    /// Finite-difference step.
    pub eps: f64,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            maxiter: 1000,
            tol: 1e-9,
            eps: 1e-6,
        }
    }
}

impl Bfgs {
    /// Create a new BFGS optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    fn gradient<F>(&self, objective: &mut Tracked<'_, F>, x: &[f64]) -> AdaptResult<Vec<f64>>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>,
    {
        let mut probe = x.to_vec();
        let mut grad = Vec::with_capacity(x.len());
        for i in 0..x.len() {
            probe[i] = x[i] + self.eps;
            let plus = objective.eval(&probe)?;
            probe[i] = x[i] - self.eps;
            let minus = objective.eval(&probe)?;
            probe[i] = x[i];
            grad.push((plus - minus) / (2.0 * self.eps));
        }
        Ok(grad)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn identity(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

impl Optimizer for Bfgs {
    fn name(&self) -> &str {
        "bfgs"
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> AdaptResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>,
    {
        let mut objective = Tracked::new(objective, self.name());
        let n = initial_params.len();
        if n == 0 {
            return trivial_result(objective);
        }

        let mut x = initial_params;
        let mut f_x = objective.eval(&x)?;
        let mut g = self.gradient(&mut objective, &x)?;
        let mut h_inv = identity(n);
        let mut history = vec![f_x];
        let mut converged = false;
        let mut iterations = 0;

        for _ in 0..self.maxiter {
            if dot(&g, &g).sqrt() < self.tol {
                converged = true;
                break;
            }
            iterations += 1;

            let mut direction: Vec<f64> = mat_vec(&h_inv, &g).iter().map(|v| -v).collect();
            let mut slope = dot(&g, &direction);
            if slope >= 0.0 {
                h_inv = identity(n);
                direction = g.iter().map(|v| -v).collect();
                slope = -dot(&g, &g);
            }

            let mut alpha = 1.0;
            let mut accepted = None;
            while alpha > 1e-12 {
                let trial: Vec<f64> = x
                    .iter()
                    .zip(&direction)
                    .map(|(xi, di)| xi + alpha * di)
                    .collect();
                let f_trial = objective.eval(&trial)?;
                if f_trial <= f_x + 1e-4 * alpha * slope {
                    accepted = Some((trial, f_trial));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                // No descent along the search direction at working precision.
                converged = dot(&g, &g).sqrt() < self.tol.sqrt();
                break;
            };

            let g_new = self.gradient(&mut objective, &x_new)?;
            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = g_new.iter().zip(&g).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > 1e-12 {
                let hy = mat_vec(&h_inv, &y);
                let yhy = dot(&y, &hy);
                for i in 0..n {
                    for j in 0..n {
                        h_inv[i][j] += (sy + yhy) * s[i] * s[j] / (sy * sy)
                            - (hy[i] * s[j] + s[i] * hy[j]) / sy;
                    }
                }
            }

            let improvement = f_x - f_new;
            x = x_new;
            f_x = f_new;
            g = g_new;
            history.push(f_x);
            if improvement.abs() < self.tol * 1e-3 && dot(&g, &g).sqrt() < self.tol.sqrt() {
                converged = true;
                break;
            }
        }

        debug!(
            optimizer = self.name(),
            evaluations = objective.evaluations,
            value = f_x,
            converged,
            "minimization finished"
        );
        Ok(OptimizationResult {
            optimal_params: x,
            optimal_value: f_x,
            num_evaluations: objective.evaluations,
            num_iterations: iterations,
            history,
            converged,
        })
    }
}

// ---------------------------------------------------------------------------
// SPSA
// ---------------------------------------------------------------------------

/// Simultaneous Perturbation Stochastic Approximation.
///
/// Estimates the full gradient from two evaluations along a random `±1`
/// direction. Suited to noisy (sampled) objectives.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Initial step size.
    pub a: f64,
    /// Perturbation size.
    pub c: f64,
    /// Learning rate decay parameter.
    pub alpha: f64,
    /// Perturbation decay parameter.
    pub gamma: f64,
    /// Seed for the perturbation directions.
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            maxiter: 200,
            a: 0.2,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            seed: 42,
        }
    }
}

impl Spsa {
    /// Create a new SPSA optimizer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum iterations.
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    /// Set the perturbation seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Optimizer for Spsa {
    fn name(&self) -> &str {
        "spsa"
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> AdaptResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>,
    {
        let mut objective = Tracked::new(objective, self.name());
        let n = initial_params.len();
        if n == 0 {
            return trivial_result(objective);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut x = initial_params;
        let mut f_x = objective.eval(&x)?;
        let mut best = (x.clone(), f_x);
        let mut history = vec![f_x];

        for k in 0..self.maxiter {
            let a_k = self.a / ((k + 1) as f64).powf(self.alpha);
            let c_k = self.c / ((k + 1) as f64).powf(self.gamma);
            let delta: Vec<f64> = (0..n)
                .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
                .collect();

            let x_plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi + c_k * di).collect();
            let x_minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, di)| xi - c_k * di).collect();
            let diff = objective.eval(&x_plus)? - objective.eval(&x_minus)?;

            for (xi, di) in x.iter_mut().zip(&delta) {
                *xi -= a_k * diff / (2.0 * c_k * di);
            }
            f_x = objective.eval(&x)?;
            history.push(f_x);
            if f_x < best.1 {
                best = (x.clone(), f_x);
            }
        }

        debug!(
            optimizer = self.name(),
            evaluations = objective.evaluations,
            value = best.1,
            "minimization finished"
        );
        Ok(OptimizationResult {
            optimal_params: best.0,
            optimal_value: best.1,
            num_evaluations: objective.evaluations,
            num_iterations: self.maxiter,
            history,
            converged: true,
        })
    }
}

// ---------------------------------------------------------------------------
// Configured dispatch
// ---------------------------------------------------------------------------

/// Optimizer selected from configuration.
#[derive(Debug, Clone)]
pub enum AnyOptimizer {
    /// Simplex search.
    NelderMead(NelderMead),
    /// Quasi-Newton.
    Bfgs(Bfgs),
    /// Stochastic approximation.
    Spsa(Spsa),
}

impl AnyOptimizer {
    /// Build from the `optimizer` configuration section.
    pub fn from_config(config: &OptimizerConfig, seed: u64) -> Self {
        match config.kind {
            OptimizerKind::NelderMead => Self::NelderMead(
                NelderMead::new()
                    .with_maxiter(config.max_iterations)
                    .with_tol(config.tolerance),
            ),
            OptimizerKind::Bfgs => Self::Bfgs(
                Bfgs::new()
                    .with_maxiter(config.max_iterations)
                    .with_tol(config.tolerance),
            ),
            OptimizerKind::Spsa => Self::Spsa(
                Spsa::new()
                    .with_maxiter(config.max_iterations)
                    .with_seed(seed),
            ),
        }
    }
}

impl Optimizer for AnyOptimizer {
    fn name(&self) -> &str {
        match self {
            Self::NelderMead(o) => o.name(),
            Self::Bfgs(o) => o.name(),
            Self::Spsa(o) => o.name(),
        }
    }

    fn minimize<F>(&self, objective: F, initial_params: Vec<f64>) -> AdaptResult<OptimizationResult>
    where
        F: FnMut(&[f64]) -> AdaptResult<f64>,
    {
        match self {
            Self::NelderMead(o) => o.minimize(objective, initial_params),
            Self::Bfgs(o) => o.minimize(objective, initial_params),
            Self::Spsa(o) => o.minimize(objective, initial_params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(params: &[f64]) -> AdaptResult<f64> {
        Ok((params[0] - 1.0).powi(2) + (params[1] - 2.0).powi(2))
    }

    fn rosenbrock(params: &[f64]) -> AdaptResult<f64> {
        let (x, y) = (params[0], params[1]);
        Ok((1.0 - x).powi(2) + 100.0 * (y - x.powi(2)).powi(2))
    }

    #[test]
    fn test_nelder_mead_simple() {
        let result = NelderMead::new()
            .with_step_radius(0.5, 1e-6)
            .minimize(quadratic, vec![0.0, 0.0])
            .unwrap();
        assert!(result.optimal_value < 1e-6);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-2);
        assert!((result.optimal_params[1] - 2.0).abs() < 1e-2);
    }

    #[test]
    fn test_bfgs_quadratic() {
        let result = Bfgs::new().minimize(quadratic, vec![0.0, 0.0]).unwrap();
        assert!(result.converged);
        assert!((result.optimal_params[0] - 1.0).abs() < 1e-5);
        assert!((result.optimal_params[1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_bfgs_rosenbrock() {
        let result = Bfgs::new().minimize(rosenbrock, vec![-1.2, 1.0]).unwrap();
        assert!(result.optimal_value < 1e-6);
    }

    #[test]
    fn test_bfgs_one_dimensional_cosine() {
        let result = Bfgs::new()
            .minimize(|p: &[f64]| Ok(p[0].cos()), vec![2.0])
            .unwrap();
        assert!((result.optimal_params[0] - std::f64::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_spsa_improves() {
        let result = Spsa::new()
            .with_maxiter(300)
            .minimize(quadratic, vec![0.0, 0.0])
            .unwrap();
        assert!(result.optimal_value < 5.0);
        assert_eq!(result.history.len(), 301);
    }

    #[test]
    fn test_spsa_reproducible() {
        let a = Spsa::new().with_seed(9).minimize(quadratic, vec![0.0, 0.0]).unwrap();
        let b = Spsa::new().with_seed(9).minimize(quadratic, vec![0.0, 0.0]).unwrap();
        assert_eq!(a.optimal_params, b.optimal_params);
    }

    #[test]
    fn test_non_finite_objective_diverges() {
        let err = Bfgs::new()
            .minimize(|_: &[f64]| Ok(f64::NAN), vec![0.0])
            .unwrap_err();
        assert!(matches!(
            err,
            AdaptError::OptimizerDivergence { ref optimizer, .. } if optimizer == "bfgs"
        ));
    }

    #[test]
    fn test_objective_error_propagates() {
        let err = NelderMead::new()
            .minimize(
                |_: &[f64]| {
                    Err(AdaptError::Backend {
                        backend: "mock".into(),
                        reason: "offline".into(),
                    })
                },
                vec![0.0],
            )
            .unwrap_err();
        assert!(matches!(err, AdaptError::Backend { .. }));
    }

    #[test]
    fn test_empty_parameters() {
        let result = Bfgs::new().minimize(|_: &[f64]| Ok(-1.5), Vec::new()).unwrap();
        assert_eq!(result.optimal_value, -1.5);
        assert!(result.optimal_params.is_empty());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("nelder-mead".parse::<OptimizerKind>().unwrap(), OptimizerKind::NelderMead);
        assert_eq!("BFGS".parse::<OptimizerKind>().unwrap(), OptimizerKind::Bfgs);
        assert!(matches!("adam".parse::<OptimizerKind>(), Err(AdaptError::Config(_))));
    }
}
