//! Train a policy with on-policy rollouts.
mod config;
mod sampler;
use crate::{
    record::{Record, RecordValue, Recorder},
    Env, Learner, Policy, RolloutStorage,
};
use anyhow::{Context, Result};
use chrono::Local;
pub use config::TrainerConfig;
use log::info;
use sampler::check_shape;
pub use sampler::Sampler;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// Added to the elapsed time when computing environment steps per second,
/// so that an elapsed time rounded down to zero seconds does not divide by zero.
const FPS_EPSILON: f64 = 1e-9;

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainStats {
    /// Number of updates performed.
    pub updates: usize,

    /// Number of batched environment steps.
    pub env_steps: usize,

    /// Number of finished episodes over all environments.
    pub episodes: usize,

    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// 1. Build the environment from its configuration and reset it. The first
///    observations go into slot 0 of a [`RolloutStorage`].
/// 2. For each of `max_updates` updates:
///     1. Run `batch_size` batched environment steps. At each step the policy
///        acts on the latest slot of the storage, the actions are applied to
///        the environment and the resulting transition is inserted.
///     2. Compute the value of the last slot with [`Policy::value`] and call
///        [`RolloutStorage::compute_returns`].
///     3. Call [`Learner::update`] with the storage.
///     4. Call [`RolloutStorage::after_update`].
///     5. If `update % log_interval == 0`, log steps per second and the mean
///        return of recent episodes, and write a [`Record`] to the recorder.
///
/// The stop flag from [`Trainer::stop_handle`] is checked before each update.
/// Any error ends the run; the environment is dropped on the way out, which
/// releases its connection.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Policy]-->|ActBatch|B[Env]
///     B -->|Step|C[Sampler]
///     C -->|transition|D[RolloutStorage]
///     D -->|observation|A
///     D -->|rollout|E[Learner]
/// ```
pub struct Trainer<E: Env> {
    config: TrainerConfig,
    env_config: E::Config,
    stop: Arc<AtomicBool>,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, env_config: E::Config) -> Self {
        Self {
            config,
            env_config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The configuration of the trainer.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Returns a flag that stops training before the next update when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Collects one rollout, computes returns, updates the learner and
    /// prepares the storage for the next rollout.
    ///
    /// Returns the record produced by the learner.
    pub fn train_update<P, L>(
        &self,
        sampler: &mut Sampler<E>,
        policy: &mut P,
        learner: &mut L,
        storage: &mut RolloutStorage,
    ) -> Result<Record>
    where
        P: Policy,
        L: Learner,
    {
        for _ in 0..self.config.batch_size {
            sampler.sample_and_insert(policy, storage)?;
        }

        let n = storage.batch_size();
        let bootstrap_value = policy
            .value(
                storage.observation(n),
                storage.hidden_state(n),
                storage.mask(n),
            )
            .context("policy failed to compute the bootstrap value")?;
        check_shape("bootstrap values", &[storage.num_envs()], bootstrap_value.shape())?;
        storage.compute_returns(
            bootstrap_value.view(),
            self.config.use_gae,
            self.config.discount_factor,
            self.config.gae_lambda,
        );

        let record = learner.update(storage).context("learner update failed")?;
        storage.after_update();

        Ok(record)
    }

    /// Train the policy.
    pub fn train<P, L>(
        &mut self,
        policy: &mut P,
        learner: &mut L,
        recorder: &mut dyn Recorder,
    ) -> Result<TrainStats>
    where
        P: Policy,
        L: Learner,
    {
        self.config.validate()?;

        let env = E::build(&self.env_config).context("failed to build the environment")?;
        let num_envs = env.num_envs();
        let mut storage = RolloutStorage::new(
            self.config.batch_size,
            num_envs,
            env.observation_space().flat_size(),
            self.config.hidden_size,
        );
        let mut sampler = Sampler::new(env, self.config.reward_average_window);
        sampler.reset(&mut storage)?;

        let timer = Instant::now();
        let mut updates = 0;

        for update in 0..self.config.max_updates {
            if self.stop.load(Ordering::SeqCst) {
                info!("Stop requested, finishing after {} updates", updates);
                break;
            }

            let record = self
                .train_update(&mut sampler, policy, learner, &mut storage)
                .with_context(|| format!("update {} failed", update))?;
            updates += 1;

            if update % self.config.log_interval == 0 {
                let total_steps = (update + 1) * self.config.batch_size * num_envs;
                let fps = steps_per_sec(total_steps, timer.elapsed());
                let reward_mean = sampler.tracker().average();

                info!("---");
                info!("Update: {}", update);
                info!("FPS: {:.1}", fps);
                for (name, value) in record.scalars() {
                    info!("{}: {}", name, value);
                }
                match reward_mean {
                    Some(r) => info!("Reward: {}", r),
                    None => info!("Reward: n/a"),
                }

                let mut record = record;
                record.merge_inplace(Record::from_slice(&[
                    ("update", RecordValue::Scalar(update as f32)),
                    ("fps", RecordValue::Scalar(fps as f32)),
                    (
                        "episodes",
                        RecordValue::Scalar(sampler.tracker().episode_count() as f32),
                    ),
                    ("datetime", RecordValue::DateTime(Local::now())),
                ]));
                if let Some(r) = reward_mean {
                    record.insert("reward_mean", RecordValue::Scalar(r));
                }
                recorder.write(record);
                recorder.flush(update as i64);
            }
        }

        Ok(TrainStats {
            updates,
            env_steps: sampler.env_steps(),
            episodes: sampler.tracker().episode_count(),
            elapsed: timer.elapsed(),
        })
    }
}

/// Environment steps per second since the start of training.
///
/// The elapsed time is truncated to whole seconds.
fn steps_per_sec(total_steps: usize, elapsed: Duration) -> f64 {
    total_steps as f64 / (elapsed.as_secs() as f64 + FPS_EPSILON)
}
