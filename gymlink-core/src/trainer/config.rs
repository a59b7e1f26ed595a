//! Configuration of [`Trainer`](super::Trainer).
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of updates, i.e., rollouts, to run.
    pub max_updates: usize,

    /// Length of a rollout in environment steps.
    pub batch_size: usize,

    /// Discount factor.
    pub discount_factor: f32,

    /// Lambda of generalized advantage estimation.
    pub gae_lambda: f32,

    /// If `true`, advantages are computed with GAE.
    pub use_gae: bool,

    /// Size of the recurrent state of the policy.
    pub hidden_size: usize,

    /// Number of finished episodes averaged for the reported reward.
    pub reward_average_window: usize,

    /// Interval of logging training statistics in updates.
    pub log_interval: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_updates: 100_000,
            batch_size: 5,
            discount_factor: 0.99,
            gae_lambda: 0.9,
            use_gae: true,
            hidden_size: 64,
            reward_average_window: 10,
            log_interval: 10,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of updates.
    pub fn max_updates(mut self, v: usize) -> Self {
        self.max_updates = v;
        self
    }

    /// Sets the rollout length.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount_factor(mut self, v: f32) -> Self {
        self.discount_factor = v;
        self
    }

    /// Sets lambda of GAE.
    pub fn gae_lambda(mut self, v: f32) -> Self {
        self.gae_lambda = v;
        self
    }

    /// Enables or disables GAE.
    pub fn use_gae(mut self, v: bool) -> Self {
        self.use_gae = v;
        self
    }

    /// Sets the size of the recurrent state.
    pub fn hidden_size(mut self, v: usize) -> Self {
        self.hidden_size = v;
        self
    }

    /// Sets the window of the reward average.
    pub fn reward_average_window(mut self, v: usize) -> Self {
        self.reward_average_window = v;
        self
    }

    /// Sets the logging interval in updates.
    pub fn log_interval(mut self, v: usize) -> Self {
        self.log_interval = v;
        self
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size >= 1, "batch_size must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&self.discount_factor),
            "discount_factor must be in [0, 1], got {}",
            self.discount_factor
        );
        ensure!(
            (0.0..=1.0).contains(&self.gae_lambda),
            "gae_lambda must be in [0, 1], got {}",
            self.gae_lambda
        );
        ensure!(
            self.reward_average_window >= 1,
            "reward_average_window must be at least 1"
        );
        ensure!(self.log_interval >= 1, "log_interval must be at least 1");
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
