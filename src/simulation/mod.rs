//! # Simulation
//!
//! Evaluates planned Q-functions by running them decentrally: each agent acts
//! on its own observations, with the joint observation shared one step late.
//!
//! ## Available Components
//!
//! - `BgPolicyAgent`: turns Q-functions into individual actions
//! - `Simulator`: seeded Monte-Carlo episodes, discounted and undiscounted
//!   return statistics

pub mod agent;
pub mod simulator;

pub use agent::BgPolicyAgent;
pub use simulator::{ReturnStatistics, SimulationResult, Simulator};
