//! Drawing states and observations from a model.

use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use super::DecPomdpModel;
use crate::error::{PlannerError, Result};

fn draw<R: Rng + ?Sized>(weights: impl Iterator<Item = f64>, what: &str, rng: &mut R) -> Result<usize> {
    let dist = WeightedIndex::new(weights).map_err(|e| {
        PlannerError::invalid_parameter(what.to_string(), format!("cannot sample: {}", e))
    })?;
    Ok(dist.sample(rng))
}

/// Sample a state from the initial state distribution
pub fn sample_initial_state<M, R>(model: &M, rng: &mut R) -> Result<usize>
where
    M: DecPomdpModel + ?Sized,
    R: Rng + ?Sized,
{
    draw(
        (0..model.nr_states()).map(|s| model.initial_state_probability(s)),
        "initial state distribution",
        rng,
    )
}

/// Sample `s' ~ T(s, ja, ·)`
pub fn sample_successor<M, R>(model: &M, s: usize, ja: usize, rng: &mut R) -> Result<usize>
where
    M: DecPomdpModel + ?Sized,
    R: Rng + ?Sized,
{
    draw(
        (0..model.nr_states()).map(|s_next| model.transition_probability(s, ja, s_next)),
        "transition row",
        rng,
    )
}

/// Sample `jo ~ O(ja, s', ·)`
pub fn sample_observation<M, R>(model: &M, ja: usize, s_next: usize, rng: &mut R) -> Result<usize>
where
    M: DecPomdpModel + ?Sized,
    R: Rng + ?Sized,
{
    draw(
        (0..model.nr_joint_observations()).map(|jo| model.observation_probability(ja, s_next, jo)),
        "observation row",
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::problems;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_samples_stay_in_range() {
        let model = problems::dec_tiger().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let s = sample_initial_state(&model, &mut rng).unwrap();
            let s_next = sample_successor(&model, s, 0, &mut rng).unwrap();
            let jo = sample_observation(&model, 0, s_next, &mut rng).unwrap();
            assert!(s < 2 && s_next < 2 && jo < 4);
            // listening never moves the tiger
            assert_eq!(s, s_next);
        }
    }
}
