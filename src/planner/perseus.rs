use std::path::PathBuf;
use std::time::Instant;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPool;

use super::backup::belief_backup;
use super::config::{InitializeWith, PerseusConfig};
use super::gao::Gao;
use super::statistics::{IterationStatistics, PlanningStatistics, Termination};
use crate::bayesian_game::solvers::BgSolver;
use crate::belief::{Belief, BeliefSampler, BeliefSet, JointBelief};
use crate::error::{PlannerError, Result};
use crate::model::DecPomdpModel;
use crate::value_function::{AlphaVector, QFunctions};

/// Perseus point-based value iteration with Bayesian-game backups.
///
/// Every iteration backs up beliefs from the fixed belief set until each of
/// them has a value at least as high as before, so the value at every belief
/// in the set never decreases. With a finite `horizon` the planner instead
/// computes exactly `horizon` stages, backing up every belief each stage.
pub struct Perseus<'a, M: DecPomdpModel + ?Sized> {
    model: &'a M,
    config: PerseusConfig,
    beliefs: Option<BeliefSet>,
    q: Option<QFunctions>,
    statistics: PlanningStatistics,
}

impl<'a, M: DecPomdpModel + ?Sized> Perseus<'a, M> {
    pub fn new(model: &'a M, config: PerseusConfig) -> Result<Self> {
        config.validate()?;
        if config.horizon.is_none() && model.discount() >= 1.0 {
            return Err(PlannerError::invalid_parameter(
                "horizon".to_string(),
                format!(
                    "discount {} needs a finite horizon; value iteration would not converge",
                    model.discount()
                ),
            ));
        }
        Ok(Perseus {
            model,
            config,
            beliefs: None,
            q: None,
            statistics: PlanningStatistics::new(),
        })
    }

    /// Plan over `beliefs` instead of sampling a belief set
    pub fn with_belief_set(mut self, beliefs: BeliefSet) -> Result<Self> {
        let nr_states = self.model.nr_states();
        if let Some(b) = beliefs.iter().find(|b| b.nr_states() != nr_states) {
            return Err(PlannerError::dimension_mismatch(
                format!("beliefs over {} states", nr_states),
                format!("a belief over {} states", b.nr_states()),
            ));
        }
        self.beliefs = Some(beliefs);
        Ok(self)
    }

    /// Start an infinite-horizon run from `q` instead of `initialize_with`
    pub fn with_initial_q_functions(mut self, q: QFunctions) -> Result<Self> {
        if q.nr_states() != self.model.nr_states() || q.nr_joint_actions() != self.model.nr_joint_actions() {
            return Err(PlannerError::dimension_mismatch(
                format!(
                    "Q-functions over {} states and {} joint actions",
                    self.model.nr_states(),
                    self.model.nr_joint_actions()
                ),
                format!("{} states and {} joint actions", q.nr_states(), q.nr_joint_actions()),
            ));
        }
        self.q = Some(q);
        Ok(self)
    }

    pub fn config(&self) -> &PerseusConfig {
        &self.config
    }

    /// Belief set of the last run, or the one supplied up front
    pub fn belief_set(&self) -> Option<&BeliefSet> {
        self.beliefs.as_ref()
    }

    /// Q-functions of the last run
    pub fn q_functions(&self) -> Option<&QFunctions> {
        self.q.as_ref()
    }

    pub fn statistics(&self) -> &PlanningStatistics {
        &self.statistics
    }

    /// Run the planner.
    ///
    /// Any model or dimension error aborts the run; no partial result is kept.
    pub fn plan(&mut self) -> Result<&QFunctions> {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| PlannerError::invalid_parameter("threads".to_string(), e.to_string()))?;

        // inputs stay in place until the run succeeds
        let beliefs = match &self.beliefs {
            Some(beliefs) => beliefs.clone(),
            None => BeliefSampler::new(self.config.nr_beliefs)
                .policy(self.config.belief_sampling)
                .exploration_probability(self.config.exploration_probability)
                .rollout_length(self.config.rollout_length)
                .qmdp_horizon(self.config.horizon)
                .sample(self.model, &mut StdRng::seed_from_u64(self.config.random_seed))?,
        };
        if beliefs.is_empty() {
            return Err(PlannerError::invalid_parameter("beliefs", "the belief set is empty"));
        }
        for belief in beliefs.iter() {
            belief.sanity_check(self.config.tolerance)?;
        }
        let b0 = self.model.initial_belief();
        b0.sanity_check(self.config.tolerance)?;

        let solver = self.config.bg_solver.solver(self.config.backup_type.needs_candidates());
        log::info!(
            "planning with {} beliefs, {} solver, {:?} backups, {} thread(s)",
            beliefs.len(),
            solver.name(),
            self.config.backup_type,
            self.config.threads
        );

        let output_dir = self.output_dir();
        if let Some(dir) = &output_dir {
            std::fs::create_dir_all(dir)?;
        }

        let sweep = Sweep {
            model: self.model,
            config: &self.config,
            beliefs: &beliefs,
            solver: solver.as_ref(),
            pool: &pool,
        };
        let mut statistics = PlanningStatistics::new();
        let mut q = match self.config.horizon {
            Some(_) => QFunctions::zero(self.model.nr_states(), self.model.nr_joint_actions()),
            None => match &self.q {
                Some(q) => q.clone(),
                None => initial_q_functions(self.model, self.config.initialize_with),
            },
        };

        let mut value = q.value(&b0);
        let mut calm_iterations = 0;
        let last_iteration = self.config.horizon.unwrap_or(self.config.max_iterations);
        let mut termination = match self.config.horizon {
            Some(_) => Termination::HorizonReached,
            None => Termination::MaxIterations,
        };

        for iteration in 1..=last_iteration {
            let (next, backed_up) = sweep.iterate(&q, iteration)?;
            let next_value = next.value(&b0);
            let delta = (next_value - value).abs();
            q = next;
            value = next_value;

            let stats = IterationStatistics {
                iteration,
                nr_vectors: q.nr_vectors(),
                value_at_initial_belief: value,
                nr_backed_up_beliefs: backed_up,
                elapsed_secs: start.elapsed().as_secs_f64(),
            };
            log::info!(
                "iteration {}: {} vectors, V(b0) = {:.6}, {} beliefs backed up, {:.2}s",
                iteration,
                stats.nr_vectors,
                value,
                backed_up,
                stats.elapsed_secs
            );
            statistics.record(stats);
            if let Some(dir) = &output_dir {
                q.save_text(dir.join(format!("value_function_{:04}.txt", iteration)))?;
            }

            if self.config.horizon.is_some() {
                continue;
            }
            if delta < self.config.convergence_threshold {
                calm_iterations += 1;
            } else {
                calm_iterations = 0;
            }
            if iteration >= self.config.min_iterations && calm_iterations >= self.config.convergence_patience {
                termination = Termination::Converged;
                break;
            }
            if let Some(limit) = self.config.time_limit_secs {
                if start.elapsed().as_secs_f64() > limit {
                    log::warn!("time limit of {}s exceeded after iteration {}", limit, iteration);
                    termination = Termination::TimeLimit;
                    break;
                }
            }
        }
        statistics.termination = Some(termination);
        log::info!(
            "planning stopped ({:?}) after {} iterations with V(b0) = {:.6}",
            termination,
            statistics.nr_iterations(),
            value
        );

        if let Some(dir) = &output_dir {
            q.save_text(dir.join("value_function.txt"))?;
            q.save(dir.join("q_functions.bin"))?;
            beliefs.save_text(dir.join("beliefs.txt"))?;
            statistics.save(dir.join("statistics.json"))?;
            self.config.save(dir.join("config.json"))?;
            log::info!("results written to {}", dir.display());
        }

        self.statistics = statistics;
        self.beliefs = Some(beliefs);
        Ok(self.q.insert(q))
    }

    fn output_dir(&self) -> Option<PathBuf> {
        if self.config.dryrun {
            None
        } else {
            self.config.output_dir.clone()
        }
    }
}

/// The starting value function selected by `init`
pub fn initial_q_functions<M: DecPomdpModel + ?Sized>(model: &M, init: InitializeWith) -> QFunctions {
    let nr_s = model.nr_states();
    let nr_ja = model.nr_joint_actions();
    match init {
        InitializeWith::Zero => QFunctions::zero(nr_s, nr_ja),
        InitializeWith::ImmediateReward => QFunctions::immediate_reward(model),
        InitializeWith::LowerBound => {
            let min_reward = (0..nr_ja)
                .flat_map(|a| model.reward_vector(a).to_vec())
                .fold(f64::INFINITY, f64::min);
            let bound = min_reward / (1.0 - model.discount());
            let mut q = QFunctions::new(nr_s, nr_ja);
            for a in 0..nr_ja {
                q.insert_unique(AlphaVector::from_values(Array1::from_elem(nr_s, bound), a));
            }
            q
        }
    }
}

/// Seed of the generator used by one backup task
fn task_seed(seed: u64, iteration: usize, belief: usize, action: usize) -> u64 {
    [iteration as u64, belief as u64, action as u64]
        .iter()
        .fold(splitmix64(seed), |h, &x| splitmix64(h ^ x))
}

fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Read-only state shared by the backups of one run
struct Sweep<'s, M: DecPomdpModel + ?Sized> {
    model: &'s M,
    config: &'s PerseusConfig,
    beliefs: &'s BeliefSet,
    solver: &'s dyn BgSolver,
    pool: &'s ThreadPool,
}

impl<'s, M: DecPomdpModel + ?Sized> Sweep<'s, M> {
    /// One Perseus iteration (or finite-horizon stage) on top of `q`.
    ///
    /// Returns the new Q-functions and the number of beliefs backed up.
    fn iterate(&self, q: &QFunctions, iteration: usize) -> Result<(QFunctions, usize)> {
        let nr_ja = self.model.nr_joint_actions();
        let n = self.beliefs.len();
        let gao = self.pool.install(|| Gao::new(self.model, q))?;

        // [k][a] = Q(S[k], a) on the frozen value function
        let qb: Vec<Vec<f64>> = self.pool.install(|| {
            self.beliefs
                .beliefs()
                .par_iter()
                .map(|b| (0..nr_ja).map(|a| q.q_value(b, a)).collect())
                .collect()
        });
        let vb: Vec<f64> = qb
            .iter()
            .map(|row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();

        let mut next = QFunctions::new(self.model.nr_states(), nr_ja);
        if self.config.horizon.is_some() || self.config.compute_vector_for_each_belief {
            let tasks: Vec<(usize, usize)> = (0..n).flat_map(|k| (0..nr_ja).map(move |a| (k, a))).collect();
            let results = self.backup_all(&gao, &tasks, iteration)?;
            for (&(k, a), vectors) in tasks.iter().zip(results) {
                self.accept(&mut next, q, &qb, k, a, vectors);
            }
            return Ok((next, n));
        }

        let mut improved = vec![false; n];
        let mut rng = StdRng::seed_from_u64(task_seed(self.config.random_seed, iteration, n, nr_ja));
        let mut backed_up = 0;
        loop {
            let open: Vec<usize> = (0..n).filter(|&j| !improved[j]).collect();
            if open.is_empty() {
                break;
            }
            let k = open[rng.gen_range(0..open.len())];
            let tasks: Vec<(usize, usize)> = (0..nr_ja).map(|a| (k, a)).collect();
            let results = self.backup_all(&gao, &tasks, iteration)?;
            for (&(k, a), vectors) in tasks.iter().zip(results) {
                self.accept(&mut next, q, &qb, k, a, vectors);
            }
            backed_up += 1;
            improved[k] = true;
            for j in open {
                if !improved[j] && next.value(self.beliefs.get(j)) >= vb[j] {
                    improved[j] = true;
                }
            }
        }
        log::debug!("iteration {}: backed up {} of {} beliefs", iteration, backed_up, n);
        Ok((next, backed_up))
    }

    /// Back up every `(belief, action)` task, in parallel, results in task order
    fn backup_all(&self, gao: &Gao, tasks: &[(usize, usize)], iteration: usize) -> Result<Vec<Vec<AlphaVector>>> {
        self.pool.install(|| {
            tasks
                .par_iter()
                .map(|&(k, a)| {
                    let mut rng = StdRng::seed_from_u64(task_seed(self.config.random_seed, iteration, k, a));
                    belief_backup(
                        self.model,
                        self.beliefs.get(k),
                        a,
                        gao,
                        self.config.backup_type,
                        self.solver,
                        self.config.tolerance,
                        &mut rng,
                    )
                })
                .collect()
        })
    }

    /// Add backed-up vectors to `next`. Outside finite-horizon mode a vector
    /// worse at its belief than the old Q-value is replaced by the old
    /// maximizing vector.
    fn accept(
        &self,
        next: &mut QFunctions,
        q: &QFunctions,
        qb: &[Vec<f64>],
        k: usize,
        a: usize,
        vectors: Vec<AlphaVector>,
    ) {
        let belief: &Belief = self.beliefs.get(k);
        for alpha in vectors {
            let alpha = match q.maximizing_vector(belief, a) {
                Some(old) if self.config.horizon.is_none() && alpha.inner_product(belief) < qb[k][a] => old.clone(),
                _ => alpha,
            };
            next.insert_unique(alpha);
        }
    }
}
