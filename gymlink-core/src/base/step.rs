//! Environment step.
use ndarray::{Array1, Array2};

/// Everything a vectorized environment returns for one batched step.
///
/// Every field is indexed by environment first.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Observations after the step, `[num_envs, obs_size]`.
    ///
    /// The server resets finished environments itself, so for an environment
    /// with `is_done[i] == true` this is the first observation of its next episode.
    pub obs: Array2<f32>,

    /// Rewards used for training, possibly normalized by the server.
    pub reward: Vec<f32>,

    /// Unshaped rewards, used for reporting episode returns.
    pub real_reward: Vec<f32>,

    /// Flags denoting if the episode of each environment ended on this step.
    pub is_done: Vec<bool>,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: Array2<f32>, reward: Vec<f32>, real_reward: Vec<f32>, is_done: Vec<bool>) -> Self {
        Self {
            obs,
            reward,
            real_reward,
            is_done,
        }
    }

    /// Number of environments in the step.
    pub fn num_envs(&self) -> usize {
        self.is_done.len()
    }

    /// Masks for the rollout storage: `0.0` where the episode ended, `1.0` otherwise.
    pub fn masks(&self) -> Array1<f32> {
        self.is_done
            .iter()
            .map(|&done| if done { 0.0 } else { 1.0 })
            .collect()
    }
}
