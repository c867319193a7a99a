use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bayesian_game::solvers::{BgSolver, BgSolverType};
use crate::bayesian_game::JointPolicy;
use crate::belief::Belief;
use crate::error::{PlannerError, Result};
use crate::model::discrete::DEFAULT_TOLERANCE;
use crate::model::DecPomdpModel;
use crate::planner::backup::backup_game;
use crate::planner::Gao;
use crate::value_function::QFunctions;

/// Seed every agent uses when solving the shared Bayesian game
const COORDINATION_SEED: u64 = 0;

/// Decentralized execution of planned Q-functions under one-step delayed
/// sharing.
///
/// The previous joint belief and joint action are common knowledge, so every
/// agent builds the same Bayesian game and, solving it with the same seeded
/// generator, obtains the same joint policy. Each agent then only applies its
/// own component to its private observation.
pub struct BgPolicyAgent<'a, M: DecPomdpModel + ?Sized> {
    model: &'a M,
    q: &'a QFunctions,
    gao: Gao,
    solver: Box<dyn BgSolver>,
    tolerance: f64,
}

impl<'a, M: DecPomdpModel + ?Sized> BgPolicyAgent<'a, M> {
    pub fn new(model: &'a M, q: &'a QFunctions, solver: BgSolverType) -> Result<Self> {
        Ok(BgPolicyAgent {
            model,
            q,
            gao: Gao::new(model, q)?,
            solver: solver.solver(false),
            tolerance: DEFAULT_TOLERANCE,
        })
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Joint action at the first stage, where nothing has been observed yet
    pub fn first_action(&self, initial_belief: &Belief) -> usize {
        self.q.greedy_action(initial_belief).0
    }

    /// Joint policy of the game for `(belief, previous_action)`
    pub fn coordination_policy(&self, belief: &Belief, previous_action: usize) -> Result<JointPolicy> {
        let backup = backup_game(self.model, belief, previous_action, &self.gao)?;
        backup.game.sanity_check(self.tolerance)?;
        let mut rng = StdRng::seed_from_u64(COORDINATION_SEED);
        Ok(self.solver.solve(&backup.game, &mut rng)?.policy)
    }

    /// Action of `agent` after it privately received `observation`
    pub fn individual_action(
        &self,
        agent: usize,
        belief: &Belief,
        previous_action: usize,
        observation: usize,
    ) -> Result<usize> {
        let policy = self.coordination_policy(belief, previous_action)?;
        if agent >= policy.nr_agents() || observation >= policy.agent(agent).len() {
            return Err(PlannerError::dimension_mismatch(
                format!("agent < {} with a valid observation", policy.nr_agents()),
                format!("agent {} observation {}", agent, observation),
            ));
        }
        Ok(policy.action(agent, observation))
    }

    /// Joint action formed by every agent's individual choice
    pub fn next_action(&self, belief: &Belief, previous_action: usize, observations: &[usize]) -> Result<usize> {
        let policy = self.coordination_policy(belief, previous_action)?;
        crate::indexing::check_individual(observations, self.model.nr_observations(), "observation")?;
        let actions: Vec<usize> = observations
            .iter()
            .enumerate()
            .map(|(agent, &o)| policy.action(agent, o))
            .collect();
        Ok(self.model.individual_to_joint_action(&actions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::belief::BeliefSet;
    use crate::model::problems;
    use crate::planner::{Perseus, PerseusConfig};
    use ndarray::array;

    #[test]
    fn test_agents_match_observed_state() {
        let model = problems::state_matching(1.0).unwrap();
        let beliefs = BeliefSet::from_beliefs(vec![
            Belief::uniform(2),
            Belief::from_probabilities(array![1.0, 0.0]),
            Belief::from_probabilities(array![0.0, 1.0]),
        ])
        .unwrap();
        let config = PerseusConfig::builder().horizon(2).dryrun(true).build().unwrap();
        let mut planner = Perseus::new(&model, config).unwrap().with_belief_set(beliefs).unwrap();
        let q = planner.plan().unwrap().clone();

        let agent = BgPolicyAgent::new(&model, &q, BgSolverType::Exhaustive).unwrap();
        let b0 = Belief::uniform(2);
        let a0 = agent.first_action(&b0);
        // having seen state 1, both agents pick action 1
        let next = agent.next_action(&b0, a0, &[1, 1]).unwrap();
        assert_eq!(next, model.individual_to_joint_action(&[1, 1]));
        assert_eq!(agent.individual_action(0, &b0, a0, 0).unwrap(), 0);
    }
}
