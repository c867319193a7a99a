//! # Bayesian Games with Identical Payoffs
//!
//! A one-shot cooperative game of incomplete information: every agent privately
//! receives a type, picks an action from its own type alone, and the whole team
//! earns a shared utility `U(joint type, joint action)`. The planner builds one
//! such game per (belief, joint action) pair, with the agents' next observations
//! as their types.
//!
//! ## Core Concepts
//!
//! - **Joint type**: one type per agent, flattened with agent 0 most significant
//! - **Joint policy**: for every agent a map from own type to own action
//! - **Expected payoff**: `Σ_jt P(jt)·U(jt, δ(jt))`
//!
//! ## Available Components
//!
//! - `BayesianGameIdenticalPayoff`: the game itself, with dense or sparse tables
//! - `JointPolicy`: pure joint policy
//! - `solvers`: exhaustive enumeration and alternating maximization
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use perseus_bg::bayesian_game::BayesianGameIdenticalPayoff;
//! use perseus_bg::bayesian_game::solvers::{BgSolver, ExhaustiveSolver};
//! use rand::SeedableRng;
//!
//! let mut bg = BayesianGameIdenticalPayoff::new(vec![2, 2], vec![1, 1])?;
//! bg.set_probability(0, 1.0)?;
//! bg.set_utility(0, 3, 1.0)?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let solution = ExhaustiveSolver::new().solve(&bg, &mut rng)?;
//! assert_eq!(solution.value, 1.0);
//! # Ok::<(), perseus_bg::error::PlannerError>(())
//! ```

pub mod identical_payoff;
pub mod joint_policy;
pub mod solvers;
pub mod tables;

pub use identical_payoff::{BayesianGameIdenticalPayoff, JointTypeEntry, SPARSE_JOINT_TYPE_THRESHOLD};
pub use joint_policy::JointPolicy;
