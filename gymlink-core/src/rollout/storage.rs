//! Fixed-horizon storage of vectorized transitions.
use crate::ActBatch;
use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2, ArrayView3, Axis};

/// Rollout storage for on-policy algorithms.
///
/// Holds `batch_size` environment steps of `num_envs` environments. Slots are
/// indexed by time first and environment second.
///
/// # Layout
///
/// Observations, hidden states and masks have `batch_size + 1` slots. Slot 0
/// is the state the first action of the rollout is taken from; it is carried
/// over from the last slot of the previous rollout by
/// [`RolloutStorage::after_update`]. Actions, log-probabilities, value
/// estimates and rewards have `batch_size` slots, slot `t` describing the
/// transition from slot `t` to slot `t + 1`.
///
/// Returns and advantages have `batch_size + 1` slots, the last one holding the
/// bootstrap value (returns) or zero (advantages).
///
/// # Cycle
///
/// 1. [`RolloutStorage::insert`] is called `batch_size` times, advancing the
///    cursor from 1 to `batch_size + 1`.
/// 2. [`RolloutStorage::compute_returns`] closes the rollout.
/// 3. The learner reads the storage.
/// 4. [`RolloutStorage::after_update`] starts the next rollout.
///
/// Calling these out of order is a bug in the caller and panics.
#[derive(Debug, Clone)]
pub struct RolloutStorage {
    batch_size: usize,
    num_envs: usize,
    obs_size: usize,
    hidden_size: usize,

    /// Write cursor into the `batch_size + 1` slots.
    step: usize,

    observations: Array3<f32>,
    hidden_states: Array3<f32>,
    masks: Array2<f32>,
    actions: Vec<ActBatch>,
    action_log_probs: Array2<f32>,
    value_preds: Array2<f32>,
    rewards: Array2<f32>,
    returns: Array2<f32>,
    advantages: Option<Array2<f32>>,
    returns_computed: bool,
}

impl RolloutStorage {
    /// Constructs an empty storage.
    ///
    /// Masks of slot 0 are set to 1, that is, every environment starts inside an episode.
    pub fn new(batch_size: usize, num_envs: usize, obs_size: usize, hidden_size: usize) -> Self {
        assert!(batch_size >= 1, "batch_size must be at least 1");
        assert!(num_envs >= 1, "num_envs must be at least 1");

        Self {
            batch_size,
            num_envs,
            obs_size,
            hidden_size,
            step: 1,
            observations: Array3::zeros((batch_size + 1, num_envs, obs_size)),
            hidden_states: Array3::zeros((batch_size + 1, num_envs, hidden_size)),
            masks: Array2::ones((batch_size + 1, num_envs)),
            actions: Vec::with_capacity(batch_size),
            action_log_probs: Array2::zeros((batch_size, num_envs)),
            value_preds: Array2::zeros((batch_size, num_envs)),
            rewards: Array2::zeros((batch_size, num_envs)),
            returns: Array2::zeros((batch_size + 1, num_envs)),
            advantages: None,
            returns_computed: false,
        }
    }

    /// Sets the observation of slot 0, typically the one returned by a reset.
    pub fn set_first_observation(&mut self, obs: ArrayView2<f32>) {
        assert_eq!(
            obs.shape(),
            &[self.num_envs, self.obs_size],
            "shape of the first observation"
        );
        self.observations.index_axis_mut(Axis(0), 0).assign(&obs);
    }

    /// Stores a transition at the cursor and advances it.
    ///
    /// `obs`, `hidden_state` and `mask` describe the state reached by the
    /// transition, `act`, `action_log_prob`, `value` and `reward` the
    /// transition itself. `mask[i]` is 0 if the episode of environment `i`
    /// ended on this transition and 1 otherwise.
    ///
    /// # Panics
    ///
    /// If the storage is already full, or if a shape does not match.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &mut self,
        obs: ArrayView2<f32>,
        hidden_state: ArrayView2<f32>,
        act: ActBatch,
        action_log_prob: ArrayView1<f32>,
        value: ArrayView1<f32>,
        reward: ArrayView1<f32>,
        mask: ArrayView1<f32>,
    ) {
        assert!(
            self.step <= self.batch_size,
            "insert() called on a full rollout storage (cursor {}, batch_size {})",
            self.step,
            self.batch_size
        );
        assert_eq!(obs.shape(), &[self.num_envs, self.obs_size], "shape of obs");
        assert_eq!(
            hidden_state.shape(),
            &[self.num_envs, self.hidden_size],
            "shape of hidden_state"
        );
        assert_eq!(act.len(), self.num_envs, "number of actions");
        assert_eq!(action_log_prob.len(), self.num_envs, "length of action_log_prob");
        assert_eq!(value.len(), self.num_envs, "length of value");
        assert_eq!(reward.len(), self.num_envs, "length of reward");
        assert_eq!(mask.len(), self.num_envs, "length of mask");
        debug_assert!(
            mask.iter().all(|&m| m == 0.0 || m == 1.0),
            "masks must be exactly 0 or 1"
        );

        let t = self.step;
        self.observations.index_axis_mut(Axis(0), t).assign(&obs);
        self.hidden_states.index_axis_mut(Axis(0), t).assign(&hidden_state);
        self.masks.row_mut(t).assign(&mask);
        self.actions.push(act);
        self.action_log_probs.row_mut(t - 1).assign(&action_log_prob);
        self.value_preds.row_mut(t - 1).assign(&value);
        self.rewards.row_mut(t - 1).assign(&reward);

        self.step += 1;
    }

    /// Computes returns, and advantages if `use_gae` is `true`.
    ///
    /// `bootstrap_value` is the value estimate of the last slot, one per environment.
    ///
    /// Without GAE, `returns[t] = rewards[t] + gamma * masks[t + 1] * returns[t + 1]`
    /// with `returns[batch_size] = bootstrap_value`.
    ///
    /// With GAE,
    /// `delta[t] = rewards[t] + gamma * masks[t + 1] * values[t + 1] - values[t]`,
    /// `advantages[t] = delta[t] + gamma * gae_lambda * masks[t + 1] * advantages[t + 1]`
    /// and `returns[t] = advantages[t] + values[t]`, where
    /// `values[batch_size] = bootstrap_value` and `advantages[batch_size] = 0`.
    ///
    /// # Panics
    ///
    /// If the storage is not full, or if `discount_factor` or `gae_lambda` is out of `[0, 1]`.
    pub fn compute_returns(
        &mut self,
        bootstrap_value: ArrayView1<f32>,
        use_gae: bool,
        discount_factor: f32,
        gae_lambda: f32,
    ) {
        assert!(
            self.is_full(),
            "compute_returns() called after {} of {} steps",
            self.step - 1,
            self.batch_size
        );
        assert_eq!(bootstrap_value.len(), self.num_envs, "length of bootstrap_value");
        assert!(
            (0.0..=1.0).contains(&discount_factor),
            "discount_factor must be in [0, 1]"
        );
        assert!((0.0..=1.0).contains(&gae_lambda), "gae_lambda must be in [0, 1]");

        let n = self.batch_size;
        self.returns.row_mut(n).assign(&bootstrap_value);

        if use_gae {
            let mut advantages = Array2::zeros((n + 1, self.num_envs));
            for t in (0..n).rev() {
                for e in 0..self.num_envs {
                    let next_value = if t + 1 == n {
                        bootstrap_value[e]
                    } else {
                        self.value_preds[[t + 1, e]]
                    };
                    let mask = self.masks[[t + 1, e]];
                    let delta = self.rewards[[t, e]] + discount_factor * mask * next_value
                        - self.value_preds[[t, e]];
                    advantages[[t, e]] =
                        delta + discount_factor * gae_lambda * mask * advantages[[t + 1, e]];
                    self.returns[[t, e]] = advantages[[t, e]] + self.value_preds[[t, e]];
                }
            }
            self.advantages = Some(advantages);
        } else {
            for t in (0..n).rev() {
                for e in 0..self.num_envs {
                    self.returns[[t, e]] = self.returns[[t + 1, e]]
                        * discount_factor
                        * self.masks[[t + 1, e]]
                        + self.rewards[[t, e]];
                }
            }
            self.advantages = None;
        }

        self.returns_computed = true;
    }

    /// Starts the next rollout.
    ///
    /// Copies the observation, hidden state and mask of the last slot into slot 0,
    /// resets the cursor to 1 and clears per-transition data of the finished rollout.
    pub fn after_update(&mut self) {
        let n = self.batch_size;

        let last = self.observations.index_axis(Axis(0), n).to_owned();
        self.observations.index_axis_mut(Axis(0), 0).assign(&last);
        let last = self.hidden_states.index_axis(Axis(0), n).to_owned();
        self.hidden_states.index_axis_mut(Axis(0), 0).assign(&last);
        let last = self.masks.row(n).to_owned();
        self.masks.row_mut(0).assign(&last);

        self.actions.clear();
        self.action_log_probs.fill(0.0);
        self.value_preds.fill(0.0);
        self.rewards.fill(0.0);
        self.returns.fill(0.0);
        self.advantages = None;
        self.returns_computed = false;
        self.step = 1;
    }

    /// Number of steps in a rollout.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of environments.
    pub fn num_envs(&self) -> usize {
        self.num_envs
    }

    /// Size of a flattened observation.
    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    /// Size of the recurrent state.
    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// The write cursor, in `1..=batch_size + 1`.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Returns `true` if all `batch_size` transitions have been inserted.
    pub fn is_full(&self) -> bool {
        self.step == self.batch_size + 1
    }

    /// Returns `true` once [`RolloutStorage::compute_returns`] has closed the rollout.
    pub fn returns_computed(&self) -> bool {
        self.returns_computed
    }

    /// Observation of slot `t`.
    pub fn observation(&self, t: usize) -> ArrayView2<f32> {
        self.observations.index_axis(Axis(0), t)
    }

    /// Hidden state of slot `t`.
    pub fn hidden_state(&self, t: usize) -> ArrayView2<f32> {
        self.hidden_states.index_axis(Axis(0), t)
    }

    /// Mask of slot `t`.
    pub fn mask(&self, t: usize) -> ArrayView1<f32> {
        self.masks.row(t)
    }

    /// Observation of the slot the next action is taken from.
    pub fn current_observation(&self) -> ArrayView2<f32> {
        self.observation(self.step - 1)
    }

    /// Hidden state of the slot the next action is taken from.
    pub fn current_hidden_state(&self) -> ArrayView2<f32> {
        self.hidden_state(self.step - 1)
    }

    /// Mask of the slot the next action is taken from.
    pub fn current_mask(&self) -> ArrayView1<f32> {
        self.mask(self.step - 1)
    }

    /// Observations, `[batch_size + 1, num_envs, obs_size]`.
    pub fn observations(&self) -> ArrayView3<f32> {
        self.observations.view()
    }

    /// Hidden states, `[batch_size + 1, num_envs, hidden_size]`.
    pub fn hidden_states(&self) -> ArrayView3<f32> {
        self.hidden_states.view()
    }

    /// Masks, `[batch_size + 1, num_envs]`.
    pub fn masks(&self) -> ArrayView2<f32> {
        self.masks.view()
    }

    /// Actions inserted so far in this rollout.
    pub fn actions(&self) -> &[ActBatch] {
        &self.actions
    }

    /// Log-probabilities of the actions, `[batch_size, num_envs]`.
    pub fn action_log_probs(&self) -> ArrayView2<f32> {
        self.action_log_probs.view()
    }

    /// Value estimates, `[batch_size, num_envs]`.
    pub fn value_preds(&self) -> ArrayView2<f32> {
        self.value_preds.view()
    }

    /// Rewards, `[batch_size, num_envs]`.
    pub fn rewards(&self) -> ArrayView2<f32> {
        self.rewards.view()
    }

    /// Returns, `[batch_size + 1, num_envs]`.
    pub fn returns(&self) -> ArrayView2<f32> {
        self.returns.view()
    }

    /// Advantages, `[batch_size + 1, num_envs]`, if computed with GAE.
    pub fn advantages(&self) -> Option<ArrayView2<f32>> {
        self.advantages.as_ref().map(|a| a.view())
    }

    /// Advantages of the `batch_size` transitions.
    ///
    /// Uses the GAE advantages if available and `returns - values` otherwise.
    pub fn advantages_or_td(&self) -> Array2<f32> {
        match &self.advantages {
            Some(adv) => adv.slice(s![..self.batch_size, ..]).to_owned(),
            None => &self.returns.slice(s![..self.batch_size, ..]) - &self.value_preds,
        }
    }

    /// Mean reward per environment step in the rollout.
    pub fn mean_reward(&self) -> f32 {
        self.rewards.mean().unwrap_or(0.0)
    }
}
