//! Benchmark problems.

use ndarray::{Array1, Array2, Array3, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{DecPomdp, DecPomdpBuilder};
use crate::error::Result;

const LISTEN: usize = 0;
const OPEN_LEFT: usize = 1;
const OPEN_RIGHT: usize = 2;
const TIGER_LEFT: usize = 0;

/// Accuracy of a single agent's hearing after both agents listened
const HEAR_CORRECTLY: f64 = 0.85;

fn tiger_reward(state: usize, a1: usize, a2: usize) -> f64 {
    let tiger_door = if state == TIGER_LEFT { OPEN_LEFT } else { OPEN_RIGHT };
    let opens = |a: usize| a != LISTEN;
    let tiger = |a: usize| a == tiger_door;
    match (opens(a1), opens(a2)) {
        (false, false) => -2.0,
        (true, false) | (false, true) => {
            let opener = if opens(a1) { a1 } else { a2 };
            if tiger(opener) {
                -101.0
            } else {
                9.0
            }
        }
        (true, true) => match (tiger(a1), tiger(a2)) {
            (true, true) => -50.0,
            (false, false) => 20.0,
            _ => -100.0,
        },
    }
}

/// The two-agent tiger problem.
///
/// States: tiger-left, tiger-right. Actions: listen, open-left, open-right.
/// Observations: hear-left, hear-right. When both listen the tiger stays put
/// and each agent independently hears the correct side with probability 0.85;
/// any door opening resets the problem uniformly with uninformative
/// observations. Discount 0.95.
pub fn dec_tiger() -> Result<DecPomdp> {
    let mut builder = DecPomdpBuilder::new(2, vec![3, 3], vec![2, 2])
        .name("dec-tiger")
        .discount(0.95);
    for a1 in 0..3 {
        for a2 in 0..3 {
            let ja = builder.joint_action(&[a1, a2])?;
            let both_listen = a1 == LISTEN && a2 == LISTEN;
            for s in 0..2 {
                builder = builder.reward(s, ja, tiger_reward(s, a1, a2));
                for s_next in 0..2 {
                    let p = match (both_listen, s == s_next) {
                        (true, true) => 1.0,
                        (true, false) => 0.0,
                        (false, _) => 0.5,
                    };
                    builder = builder.transition(s, ja, s_next, p);
                }
            }
            for s_next in 0..2 {
                for o1 in 0..2 {
                    for o2 in 0..2 {
                        let jo = builder.joint_observation(&[o1, o2])?;
                        let hear = |o: usize| if o == s_next { HEAR_CORRECTLY } else { 1.0 - HEAR_CORRECTLY };
                        let p = if both_listen { hear(o1) * hear(o2) } else { 0.25 };
                        builder = builder.observation(ja, s_next, jo, p);
                    }
                }
            }
        }
    }
    builder.build()
}

/// Two agents that must both play the action matching a static hidden state.
///
/// Two states that never change, uniform initial distribution, two actions and
/// two observations per agent; every agent observes the state exactly. Joint
/// action `(a0, a0)` earns 1 in state 0 and `(a1, a1)` earns 1 in state 1,
/// everything else earns 0.
pub fn state_matching(discount: f64) -> Result<DecPomdp> {
    let mut builder = DecPomdpBuilder::new(2, vec![2, 2], vec![2, 2])
        .name("state-matching")
        .discount(discount);
    for ja in 0..builder.nr_joint_actions() {
        for s in 0..2 {
            builder = builder.transition(s, ja, s, 1.0);
            let jo = builder.joint_observation(&[s, s])?;
            builder = builder.observation(ja, s, jo, 1.0);
        }
    }
    let a00 = builder.joint_action(&[0, 0])?;
    let a11 = builder.joint_action(&[1, 1])?;
    builder.reward(0, a00, 1.0).reward(1, a11, 1.0).build()
}

const WAIT: usize = 0;
const SEND: usize = 1;

/// Chance that a message arrives in an empty buffer, per agent
const ARRIVAL: [f64; 2] = [0.9, 0.1];

/// The two-agent broadcast channel.
///
/// Each agent owns a one-message buffer; state `2·b0 + b1` holds both buffer
/// flags. Agents either wait or send. A message gets through when exactly one
/// agent with a full buffer sends, earning 1; two full senders collide and
/// keep their messages. An empty buffer refills with probability 0.9 for
/// agent 0 and 0.1 for agent 1. Each agent observes its own buffer after the
/// step (0 empty, 1 full). Both buffers start full. Discount 0.9.
pub fn broadcast_channel() -> Result<DecPomdp> {
    let mut builder = DecPomdpBuilder::new(4, vec![2, 2], vec![2, 2])
        .name("broadcast-channel")
        .discount(0.9)
        .initial_state_distribution(vec![0.0, 0.0, 0.0, 1.0]);
    for a0 in [WAIT, SEND] {
        for a1 in [WAIT, SEND] {
            let ja = builder.joint_action(&[a0, a1])?;
            for s in 0..4 {
                let full = [s / 2 == 1, s % 2 == 1];
                let sends = [a0 == SEND && full[0], a1 == SEND && full[1]];
                let delivered = [sends[0] && !sends[1], sends[1] && !sends[0]];
                let reward = if delivered[0] || delivered[1] { 1.0 } else { 0.0 };
                builder = builder.reward(s, ja, reward);

                // P(buffer i full after the step)
                let stays_full = |i: usize| if full[i] && !delivered[i] { 1.0 } else { ARRIVAL[i] };
                for s_next in 0..4 {
                    let next = [s_next / 2 == 1, s_next % 2 == 1];
                    let p = (0..2)
                        .map(|i| if next[i] { stays_full(i) } else { 1.0 - stays_full(i) })
                        .product();
                    builder = builder.transition(s, ja, s_next, p);
                }
            }
            for s_next in 0..4 {
                let jo = builder.joint_observation(&[s_next / 2, s_next % 2])?;
                builder = builder.observation(ja, s_next, jo, 1.0);
            }
        }
    }
    builder.build()
}

fn normalize_rows(mut table: Array3<f64>) -> Array3<f64> {
    for mut row in table.lanes_mut(Axis(2)) {
        let sum = row.sum();
        row.mapv_inplace(|p| p / sum);
    }
    table
}

/// Random model with the given sizes, reproducible from `seed`.
///
/// Probability rows are uniform draws normalized to one, rewards are uniform
/// in `[-1, 1]`.
pub fn random(
    nr_states: usize,
    nr_actions: Vec<usize>,
    nr_observations: Vec<usize>,
    discount: f64,
    seed: u64,
) -> Result<DecPomdp> {
    let mut rng = StdRng::seed_from_u64(seed);
    let builder = DecPomdpBuilder::new(nr_states, nr_actions, nr_observations)
        .name("random")
        .discount(discount);
    let nr_ja = builder.nr_joint_actions();
    let nr_jo = builder.nr_joint_observations();

    // strictly positive entries keep every row normalizable
    let weights = || Uniform::new(0.05, 1.0);
    let transitions = normalize_rows(Array3::random_using((nr_states, nr_ja, nr_states), weights(), &mut rng));
    let observations = normalize_rows(Array3::random_using((nr_ja, nr_states, nr_jo), weights(), &mut rng));
    let rewards = Array2::random_using((nr_states, nr_ja), Uniform::new(-1.0, 1.0), &mut rng);
    let isd: Array1<f64> = Array1::random_using(nr_states, weights(), &mut rng);
    let isd = &isd / isd.sum();

    builder
        .transitions(transitions)
        .observations(observations)
        .rewards(rewards)
        .initial_state_distribution(isd.to_vec())
        .build()
}
