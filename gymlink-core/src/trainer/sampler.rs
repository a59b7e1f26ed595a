//! Collection of transitions from a vectorized environment.
use crate::{
    error::GymlinkError,
    rollout::{EpisodeTracker, RolloutStorage},
    Env, Policy, PolicyOutput,
};
use anyhow::{Context, Result};
use log::{debug, trace};
use ndarray::Array1;

/// Drives an environment with a policy and writes the transitions into a
/// [`RolloutStorage`].
///
/// The sampler owns the environment. For a remote environment, dropping the
/// sampler closes the connection.
pub struct Sampler<E: Env> {
    env: E,
    tracker: EpisodeTracker,
    env_steps: usize,
}

impl<E: Env> Sampler<E> {
    /// Creates a sampler averaging episode returns over `reward_average_window` episodes.
    pub fn new(env: E, reward_average_window: usize) -> Self {
        let tracker = EpisodeTracker::new(env.num_envs(), reward_average_window);
        Self {
            env,
            tracker,
            env_steps: 0,
        }
    }

    /// Resets the environment and writes the initial observations into slot 0 of `storage`.
    pub fn reset(&mut self, storage: &mut RolloutStorage) -> Result<()> {
        let obs = self.env.reset().context("'reset' failed")?;
        check_shape("reset observations", &[storage.num_envs(), storage.obs_size()], obs.shape())?;
        storage.set_first_observation(obs.view());
        debug!("Environments have been reset");
        Ok(())
    }

    /// Performs one batched environment step and inserts the transition into `storage`.
    ///
    /// The policy acts on the slot preceding the cursor of `storage`.
    pub fn sample_and_insert<P: Policy>(
        &mut self,
        policy: &mut P,
        storage: &mut RolloutStorage,
    ) -> Result<()> {
        let num_envs = storage.num_envs();
        let out = policy
            .act(
                storage.current_observation(),
                storage.current_hidden_state(),
                storage.current_mask(),
            )
            .context("policy failed to act")?;
        check_policy_output(&out, num_envs, storage.hidden_size())?;
        out.act.check(self.env.action_space(), num_envs)?;

        let step = self.env.step(&out.act).context("'step' failed")?;
        check_shape("step observations", &[num_envs, storage.obs_size()], step.obs.shape())?;
        check_shape("rewards", &[num_envs], &[step.reward.len()])?;
        check_shape("real rewards", &[num_envs], &[step.real_reward.len()])?;
        check_shape("done flags", &[num_envs], &[step.is_done.len()])?;

        let finished = self.tracker.observe(&step.real_reward, &step.is_done);
        if finished > 0 {
            trace!("{} episode(s) finished at env step {}", finished, self.env_steps);
        }

        let masks = step.masks();
        let reward = Array1::from(step.reward);
        storage.insert(
            step.obs.view(),
            out.hidden_state.view(),
            out.act,
            out.log_prob.view(),
            out.value.view(),
            reward.view(),
            masks.view(),
        );
        self.env_steps += 1;

        Ok(())
    }

    /// Episode statistics.
    pub fn tracker(&self) -> &EpisodeTracker {
        &self.tracker
    }

    /// Number of batched environment steps taken so far.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }
}

pub(super) fn check_shape(what: &str, expected: &[usize], actual: &[usize]) -> Result<(), GymlinkError> {
    if expected == actual {
        Ok(())
    } else {
        Err(GymlinkError::ShapeMismatch {
            what: what.to_string(),
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}

fn check_policy_output(
    out: &PolicyOutput,
    num_envs: usize,
    hidden_size: usize,
) -> Result<(), GymlinkError> {
    check_shape("policy values", &[num_envs], out.value.shape())?;
    check_shape("policy log-probabilities", &[num_envs], out.log_prob.shape())?;
    check_shape(
        "policy hidden states",
        &[num_envs, hidden_size],
        out.hidden_state.shape(),
    )
}
