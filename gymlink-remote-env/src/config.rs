//! Configuration of [`GymEnv`](crate::GymEnv).
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
    time::Duration,
};

/// Configuration of [`GymEnv`](crate::GymEnv).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GymEnvConfig {
    /// Address of the environment server.
    pub address: String,

    /// Name of the environment, e.g. `LunarLander-v2`.
    pub env_name: String,

    /// Number of parallel instances.
    pub num_envs: usize,

    /// Discount factor of the reward normalization on the server, `-1` disables it.
    pub env_gamma: f32,

    /// Passed with every step.
    pub render: bool,

    /// Deadline of connecting and of every response in milliseconds.
    pub timeout_ms: u64,
}

impl Default for GymEnvConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:10201".to_string(),
            env_name: "LunarLander-v2".to_string(),
            num_envs: 8,
            env_gamma: 0.99,
            render: false,
            timeout_ms: 60_000,
        }
    }
}

impl GymEnvConfig {
    /// Sets the address of the server.
    pub fn address(mut self, v: impl Into<String>) -> Self {
        self.address = v.into();
        self
    }

    /// Sets the name of the environment.
    pub fn env_name(mut self, v: impl Into<String>) -> Self {
        self.env_name = v.into();
        self
    }

    /// Sets the number of parallel instances.
    pub fn num_envs(mut self, v: usize) -> Self {
        self.num_envs = v;
        self
    }

    /// Sets the discount factor of the server-side reward normalization.
    pub fn env_gamma(mut self, v: f32) -> Self {
        self.env_gamma = v;
        self
    }

    /// Sets the render flag.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Sets the timeout in milliseconds.
    pub fn timeout_ms(mut self, v: u64) -> Self {
        self.timeout_ms = v;
        self
    }

    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks the values of the configuration.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.env_name.is_empty(), "env_name must not be empty");
        ensure!(self.num_envs >= 1, "num_envs must be at least 1");
        ensure!(self.timeout_ms >= 1, "timeout_ms must be at least 1");
        ensure!(
            self.env_gamma == -1.0 || (0.0..=1.0).contains(&self.env_gamma),
            "env_gamma must be -1 or in [0, 1], got {}",
            self.env_gamma
        );
        Ok(())
    }

    /// Constructs [`GymEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GymEnvConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
