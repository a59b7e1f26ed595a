//! Environment.
use super::{ActBatch, Step};
use crate::Space;
use anyhow::Result;
use ndarray::Array2;

/// A vectorized environment stepping `num_envs` instances in lockstep.
///
/// Instances reset themselves when their episode ends; [`Env::reset`] is only
/// needed once, before the first step.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds the environment.
    ///
    /// For a remote environment this opens the connection, so dropping the
    /// returned object must release it.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Number of environment instances.
    fn num_envs(&self) -> usize;

    /// Observation space of a single instance.
    fn observation_space(&self) -> &Space;

    /// Action space of a single instance.
    fn action_space(&self) -> &Space;

    /// Resets all instances, returning observations of shape `[num_envs, obs_size]`.
    fn reset(&mut self) -> Result<Array2<f32>>;

    /// Applies one action per instance.
    fn step(&mut self, act: &ActBatch) -> Result<Step>;
}
