//! # perseus-bg - Point-Based Planning for Dec-POMDPs
//!
//! perseus-bg computes value functions for decentralized partially observable
//! Markov decision processes. It runs Perseus-style point-based value
//! iteration over a sampled set of joint beliefs, but replaces the usual
//! POMDP backup with the solution of a cooperative Bayesian game, so that the
//! resulting vectors describe behaviour agents can follow using only their
//! own observations.
//!
//! ## Key Features
//!
//! - **Models**: a capability trait for discrete Dec-POMDPs plus a dense
//!   tabular implementation and standard benchmarks
//! - **Beliefs**: dense and sparse joint beliefs, belief-set sampling
//! - **Bayesian games**: identical-payoff games with dense or sparse tables,
//!   exhaustive and alternating-maximization solvers
//! - **Planning**: Perseus iterations with a parallel, reproducible backup sweep
//! - **Evaluation**: decentralized simulation and `.POMDP` export
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use perseus_bg::model::{problems, DecPomdpModel};
//! use perseus_bg::planner::{Perseus, PerseusConfig};
//!
//! let model = problems::dec_tiger()?;
//! let config = PerseusConfig::builder().nr_beliefs(100).dryrun(true).build()?;
//! let mut planner = Perseus::new(&model, config)?;
//! let q = planner.plan()?;
//! println!("V(b0) = {:.3}", q.value(&model.initial_belief()));
//! # Ok::<(), perseus_bg::error::PlannerError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`bayesian_game`] - Identical-payoff Bayesian games and their solvers
//! - [`belief`] - Joint beliefs and belief sets
//! - [`error`] - Error types and result handling
//! - [`export`] - Model export (`.POMDP`)
//! - [`indexing`] - Joint / individual index conversion
//! - [`model`] - Dec-POMDP models
//! - [`planner`] - Perseus planner, backups and configuration
//! - [`simulation`] - Decentralized execution and evaluation
//! - [`value_function`] - Alpha vectors, value functions and Q-functions

pub mod bayesian_game;
pub mod belief;
pub mod error;
pub mod export;
pub mod indexing;
pub mod model;
pub mod planner;
pub mod simulation;
pub mod value_function;

#[cfg(test)]
mod tests;
