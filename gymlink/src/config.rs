//! Configuration of an experiment.
use anyhow::Result;
use gymlink_core::{LearnerHyperParams, TrainerConfig};
use gymlink_remote_env::GymEnvConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configurations of the environment, the trainer and the learner.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExperimentConfig {
    /// Configuration of the remote environment.
    pub env: GymEnvConfig,

    /// Configuration of the trainer.
    pub trainer: TrainerConfig,

    /// Hyperparameters of the learner.
    pub learner: LearnerHyperParams,
}

impl ExperimentConfig {
    /// Sets the configuration of the environment.
    pub fn env(mut self, v: GymEnvConfig) -> Self {
        self.env = v;
        self
    }

    /// Sets the configuration of the trainer.
    pub fn trainer(mut self, v: TrainerConfig) -> Self {
        self.trainer = v;
        self
    }

    /// Sets the hyperparameters of the learner.
    pub fn learner(mut self, v: LearnerHyperParams) -> Self {
        self.learner = v;
        self
    }

    /// Checks the configurations of the environment and the trainer.
    pub fn validate(&self) -> Result<()> {
        self.env.validate()?;
        self.trainer.validate()
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
