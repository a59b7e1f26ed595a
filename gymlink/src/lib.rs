//! On-policy experience collection against vectorized Gym environments served over TCP.
//!
//! This crate bundles the following crates:
//!
//! * [`gymlink_core`] provides the traits of environments, policies and
//!   learners, the rollout storage, the episode tracker and the trainer.
//!   It does not depend on the way environments are run.
//! * [`gymlink_remote_env`] implements [`gymlink_core::Env`] with a client of a
//!   Gym server process, talking to it over a single TCP connection.
//!
//! [`ExperimentConfig`] gathers the configurations of both crates into one YAML
//! file. `examples/random_lunarlander.rs` trains a uniform random policy on
//! `LunarLander-v2` with it.
pub use gymlink_core;
pub use gymlink_remote_env;

mod config;
pub use config::ExperimentConfig;
