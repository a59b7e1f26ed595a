//! Policy.
use super::ActBatch;
use anyhow::Result;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Output of [`Policy::act`].
#[derive(Debug, Clone)]
pub struct PolicyOutput {
    /// Value estimates, one per environment.
    pub value: Array1<f32>,

    /// Sampled actions.
    pub act: ActBatch,

    /// Log-probabilities of the sampled actions, one per environment.
    pub log_prob: Array1<f32>,

    /// Recurrent state after acting, `[num_envs, hidden_size]`.
    /// Feed-forward policies return zeros.
    pub hidden_state: Array2<f32>,
}

/// A stochastic policy with a value head.
///
/// Both methods are called for data collection only; implementations must not
/// track gradients in them. Parameter updates belong to a [`Learner`].
///
/// [`Learner`]: super::Learner
pub trait Policy {
    /// Samples actions for observations `[num_envs, obs_size]`.
    fn act(
        &mut self,
        obs: ArrayView2<f32>,
        hidden_state: ArrayView2<f32>,
        masks: ArrayView1<f32>,
    ) -> Result<PolicyOutput>;

    /// Value estimates for observations `[num_envs, obs_size]`.
    fn value(
        &mut self,
        obs: ArrayView2<f32>,
        hidden_state: ArrayView2<f32>,
        masks: ArrayView1<f32>,
    ) -> Result<Array1<f32>>;
}
