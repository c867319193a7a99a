//! Point-based backup of a single (belief, joint action) pair through a
//! Bayesian game.
//!
//! The agents' next individual observations are their types. The game's
//! utility for joint observation `o` and next joint action `a'` is the best
//! normalized value reachable with the vectors of `a'`; its solution tells
//! every agent which continuation to pick for each observation it may receive.

use ndarray::Array1;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::gao::Gao;
use crate::bayesian_game::solvers::BgSolver;
use crate::bayesian_game::{BayesianGameIdenticalPayoff, JointPolicy};
use crate::belief::{JointBelief, PROBABILITY_EPSILON};
use crate::error::Result;
use crate::model::DecPomdpModel;
use crate::value_function::AlphaVector;

/// Which solved policies turn into new vectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupType {
    /// Only the best policy
    OnlyKeepMax,
    /// Every candidate policy the solver reports, de-duplicated
    StoreAll,
}

impl BackupType {
    /// Whether the solver must report its candidates
    pub fn needs_candidates(&self) -> bool {
        matches!(self, BackupType::StoreAll)
    }
}

/// Bayesian game of `(belief, a)` together with the per-observation
/// projections needed to assemble backed-up vectors.
pub struct BackupGame {
    pub game: BayesianGameIdenticalPayoff,
    /// `[o]` → `b·g_{a,o}^k` for every flattened vector `k`
    projections: Vec<Array1<f64>>,
}

impl BackupGame {
    /// Index of the vector of `a_next` with the largest projection for `o`,
    /// the first one on ties.
    fn best_vector(&self, gao: &Gao, o: usize, a_next: usize) -> usize {
        let projection = &self.projections[o];
        let mut best = (usize::MAX, f64::NEG_INFINITY);
        for k in gao.range(a_next) {
            if best.0 == usize::MAX || projection[k] > best.1 {
                best = (k, projection[k]);
            }
        }
        best.0
    }
}

/// Build the Bayesian game for backing up `belief` under joint action `a`.
pub fn backup_game<M, B>(model: &M, belief: &B, a: usize, gao: &Gao) -> Result<BackupGame>
where
    M: DecPomdpModel + ?Sized,
    B: JointBelief,
{
    let mut game = BayesianGameIdenticalPayoff::new(model.nr_actions().to_vec(), model.nr_observations().to_vec())?;
    let observation_probabilities = belief.project(gao.observation_weights(a));
    let mut projections = Vec::with_capacity(model.nr_joint_observations());

    for o in 0..model.nr_joint_observations() {
        let p_o = observation_probabilities[o];
        let projection = belief.project(gao.vectors(a, o));
        game.set_probability(o, p_o)?;
        if p_o >= PROBABILITY_EPSILON {
            for a_next in 0..model.nr_joint_actions() {
                let best = gao
                    .range(a_next)
                    .map(|k| projection[k])
                    .fold(f64::NEG_INFINITY, f64::max);
                game.set_utility(o, a_next, best / p_o)?;
            }
        }
        projections.push(projection);
    }
    Ok(BackupGame { game, projections })
}

/// The vector `R(·,a) + γ Σ_o g_{a,o}^{k*(o)}` induced by `policy`.
pub fn policy_vector<M: DecPomdpModel + ?Sized>(
    model: &M,
    a: usize,
    gao: &Gao,
    backup: &BackupGame,
    policy: &JointPolicy,
) -> AlphaVector {
    let mut future = Array1::<f64>::zeros(model.nr_states());
    for o in 0..model.nr_joint_observations() {
        let types = backup.game.joint_to_individual_types(o);
        let a_next = policy.joint_action(&types, backup.game.action_steps());
        let k = backup.best_vector(gao, o, a_next);
        future += &gao.vector(a, o, k);
    }
    let values = model.reward_vector(a) + future * model.discount();
    AlphaVector::from_values(values, a)
}

/// Back up `belief` for joint action `a` against the frozen Q-functions
/// behind `gao`.
///
/// Returns a single vector for [`BackupType::OnlyKeepMax`] and one distinct
/// vector per candidate policy for [`BackupType::StoreAll`]; the vector of the
/// best policy always comes first.
#[allow(clippy::too_many_arguments)]
pub fn belief_backup<M, B>(
    model: &M,
    belief: &B,
    a: usize,
    gao: &Gao,
    backup_type: BackupType,
    solver: &dyn BgSolver,
    tolerance: f64,
    rng: &mut dyn RngCore,
) -> Result<Vec<AlphaVector>>
where
    M: DecPomdpModel + ?Sized,
    B: JointBelief,
{
    let backup = backup_game(model, belief, a, gao)?;
    backup.game.sanity_check(tolerance)?;
    let solution = solver.solve(&backup.game, rng)?;

    let policies = match backup_type {
        BackupType::OnlyKeepMax => vec![&solution.policy],
        BackupType::StoreAll => solution.distinct_policies(),
    };
    let mut vectors: Vec<AlphaVector> = Vec::with_capacity(policies.len());
    for policy in policies {
        let alpha = policy_vector(model, a, gao, &backup, policy);
        if !vectors.contains(&alpha) {
            vectors.push(alpha);
        }
    }
    Ok(vectors)
}
