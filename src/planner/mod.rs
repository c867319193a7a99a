//! # Perseus Planning with Bayesian-Game Backups
//!
//! Centralized planning for decentralized execution: the planner reasons about
//! joint beliefs, but each backup only produces vectors the agents can realize
//! without communication, by solving a Bayesian game over their next
//! individual observations.
//!
//! ## Core Concepts
//!
//! - **Gao cache**: back-projected vectors `g_{a,o}^k`, computed once per
//!   iteration from the frozen value function
//! - **Belief backup**: one Bayesian game per (belief, joint action), solved to
//!   obtain a new alpha vector
//! - **Perseus iteration**: random backups until every belief in the set is
//!   at least as good as before
//!
//! ## Available Components
//!
//! - `Perseus`: the planner driver
//! - `PerseusConfig` / `PerseusConfigBuilder`: run parameters, JSON persistence
//! - `backup`: the Bayesian-game belief backup
//! - `Qmdp`: MDP heuristic used to guide belief sampling
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use perseus_bg::model::problems;
//! use perseus_bg::planner::{Perseus, PerseusConfig};
//!
//! let model = problems::dec_tiger()?;
//! let config = PerseusConfig::builder()
//!     .nr_beliefs(200)
//!     .am_restarts(5)
//!     .threads(4)
//!     .dryrun(true)
//!     .build()?;
//! let mut planner = Perseus::new(&model, config)?;
//! let q = planner.plan()?;
//! println!("V(b0) = {}", q.value(&perseus_bg::model::DecPomdpModel::initial_belief(&model)));
//! # Ok::<(), perseus_bg::error::PlannerError>(())
//! ```

pub mod backup;
pub mod config;
pub mod gao;
pub mod perseus;
pub mod qmdp;
pub mod statistics;

pub use backup::{belief_backup, BackupType};
pub use config::{InitializeWith, PerseusConfig, PerseusConfigBuilder};
pub use gao::Gao;
pub use perseus::{initial_q_functions, Perseus};
pub use qmdp::Qmdp;
pub use statistics::{IterationStatistics, PlanningStatistics, Termination};
