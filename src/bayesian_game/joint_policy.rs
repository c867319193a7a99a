use rand::Rng;
use serde::{Deserialize, Serialize};

/// Pure joint policy of a Bayesian game: one type → action map per agent
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointPolicy {
    actions: Vec<Vec<usize>>,
}

impl JointPolicy {
    pub fn new(actions: Vec<Vec<usize>>) -> Self {
        JointPolicy { actions }
    }

    /// Every type of every agent mapped to action 0
    pub fn zeros(nr_types: &[usize]) -> Self {
        JointPolicy {
            actions: nr_types.iter().map(|&n| vec![0; n]).collect(),
        }
    }

    /// Uniformly random individual policies
    pub fn random<R: Rng + ?Sized>(nr_types: &[usize], nr_actions: &[usize], rng: &mut R) -> Self {
        JointPolicy {
            actions: nr_types
                .iter()
                .zip(nr_actions)
                .map(|(&types, &actions)| (0..types).map(|_| rng.gen_range(0..actions)).collect())
                .collect(),
        }
    }

    pub fn nr_agents(&self) -> usize {
        self.actions.len()
    }

    /// Individual policy of `agent`, indexed by type
    pub fn agent(&self, agent: usize) -> &[usize] {
        &self.actions[agent]
    }

    pub fn set_agent(&mut self, agent: usize, policy: Vec<usize>) {
        self.actions[agent] = policy;
    }

    pub fn action(&self, agent: usize, agent_type: usize) -> usize {
        self.actions[agent][agent_type]
    }

    pub fn set(&mut self, agent: usize, agent_type: usize, action: usize) {
        self.actions[agent][agent_type] = action;
    }

    /// Joint action prescribed for the individual `types`
    pub fn joint_action(&self, types: &[usize], action_steps: &[usize]) -> usize {
        types
            .iter()
            .enumerate()
            .map(|(agent, &t)| self.actions[agent][t] * action_steps[agent])
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_joint_action() {
        let policy = JointPolicy::new(vec![vec![1, 0], vec![2, 1]]);
        // agent 0 has 2 actions, agent 1 has 3: steps [3, 1]
        assert_eq!(policy.joint_action(&[0, 0], &[3, 1]), 5);
        assert_eq!(policy.joint_action(&[1, 1], &[3, 1]), 1);
    }

    #[test]
    fn test_random_respects_sizes() {
        let mut rng = StdRng::seed_from_u64(4);
        let policy = JointPolicy::random(&[3, 2], &[2, 5], &mut rng);
        assert_eq!(policy.agent(0).len(), 3);
        assert!(policy.agent(0).iter().all(|&a| a < 2));
        assert!(policy.agent(1).iter().all(|&a| a < 5));
    }
}
