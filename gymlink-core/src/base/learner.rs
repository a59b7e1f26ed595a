//! Learner.
use crate::{record::Record, RolloutStorage};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Updates policy parameters from a filled rollout.
pub trait Learner {
    /// Performs an update and returns diagnostics such as losses.
    ///
    /// `storage` is full and its returns are computed. The borrow ends with the
    /// call; implementations must copy whatever they need to keep.
    fn update(&mut self, storage: &RolloutStorage) -> Result<Record>;
}

/// Hyperparameters of actor-critic learners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerHyperParams {
    /// Weight of the value loss.
    pub value_loss_coef: f32,

    /// Weight of the entropy bonus.
    pub entropy_coef: f32,

    /// Learning rate of the optimizer.
    pub learning_rate: f64,
}

impl Default for LearnerHyperParams {
    fn default() -> Self {
        Self {
            value_loss_coef: 0.5,
            entropy_coef: 1e-3,
            learning_rate: 1e-3,
        }
    }
}

impl LearnerHyperParams {
    /// Sets the weight of the value loss.
    pub fn value_loss_coef(mut self, v: f32) -> Self {
        self.value_loss_coef = v;
        self
    }

    /// Sets the weight of the entropy bonus.
    pub fn entropy_coef(mut self, v: f32) -> Self {
        self.entropy_coef = v;
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.learning_rate = v;
        self
    }
}
