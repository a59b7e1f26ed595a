#![warn(missing_docs)]
//! Core of on-policy training against vectorized environments.
//!
//! This crate is independent of the way environments are run. An environment
//! implements [`Env`], which steps all of its instances at once. A [`Policy`]
//! samples actions and a [`Learner`] updates the policy from a
//! [`RolloutStorage`] filled by the [`Trainer`].
pub mod error;
pub mod record;
pub mod rollout;

mod base;
pub use base::{ActBatch, Env, Learner, LearnerHyperParams, Policy, PolicyOutput, Step};

mod space;
pub use space::{Space, SpaceKind};

mod trainer;
pub use rollout::{EpisodeTracker, RolloutStorage};
pub use trainer::{Sampler, TrainStats, Trainer, TrainerConfig};
