//! QMDP heuristic: Q-values of the underlying fully observable MDP.
//!
//! Used to guide belief sampling towards the part of the belief space a good
//! policy actually visits.

use ndarray::{Array1, Array2, Axis, Zip};

use crate::belief::JointBelief;
use crate::error::{PlannerError, Result};
use crate::model::DecPomdpModel;

/// Value iteration stops once no Q-value moves by more than this
pub const QMDP_EPSILON: f64 = 1e-9;

/// Upper bound on value iteration sweeps for discounted problems
pub const QMDP_MAX_SWEEPS: usize = 100_000;

#[derive(Clone, Debug)]
pub struct Qmdp {
    /// `[s, ja]`
    q: Array2<f64>,
}

impl Qmdp {
    /// Run value iteration on the underlying MDP.
    ///
    /// With `horizon = Some(h)` exactly h sweeps are made (finite-horizon
    /// Q-values); otherwise value iteration runs to convergence, which needs a
    /// discount below one.
    pub fn compute<M: DecPomdpModel + ?Sized>(model: &M, horizon: Option<usize>) -> Result<Self> {
        let gamma = model.discount();
        if horizon.is_none() && gamma >= 1.0 {
            return Err(PlannerError::invalid_parameter(
                "horizon",
                "an undiscounted problem needs a finite horizon for QMDP",
            ));
        }
        let nr_s = model.nr_states();
        let nr_a = model.nr_joint_actions();
        let transitions: Vec<Array2<f64>> = (0..nr_a).map(|a| model.transition_matrix(a)).collect();
        let rewards: Vec<Array1<f64>> = (0..nr_a).map(|a| model.reward_vector(a)).collect();

        let mut q = Array2::<f64>::zeros((nr_s, nr_a));
        let sweeps = horizon.unwrap_or(QMDP_MAX_SWEEPS);
        for sweep in 0..sweeps {
            let v = max_over_actions(&q);
            let mut next = Array2::<f64>::zeros((nr_s, nr_a));
            for a in 0..nr_a {
                let column = &rewards[a] + &(transitions[a].dot(&v) * gamma);
                next.column_mut(a).assign(&column);
            }
            let mut delta = 0.0f64;
            Zip::from(&next).and(&q).for_each(|&n, &o| delta = delta.max((n - o).abs()));
            q = next;
            if horizon.is_none() && delta < QMDP_EPSILON {
                log::debug!("QMDP converged after {} sweeps", sweep + 1);
                break;
            }
        }
        Ok(Qmdp { q })
    }

    pub fn q_table(&self) -> &Array2<f64> {
        &self.q
    }

    /// `Σ_s b(s) Q(s, ja)`
    pub fn q_value<B: JointBelief>(&self, belief: &B, ja: usize) -> f64 {
        belief.inner_product(self.q.column(ja))
    }

    /// Joint action maximizing the QMDP value at `belief`, lowest index on ties
    pub fn greedy_action<B: JointBelief>(&self, belief: &B) -> usize {
        let values = belief.project(self.q.t());
        let mut best = 0;
        for (a, &v) in values.iter().enumerate() {
            if v > values[best] {
                best = a;
            }
        }
        best
    }
}

fn max_over_actions(q: &Array2<f64>) -> Array1<f64> {
    q.map_axis(Axis(1), |row| row.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}
