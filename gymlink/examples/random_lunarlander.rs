//! Collects rollouts of a uniform random policy on `LunarLander-v2`.
//!
//! Requires a Gym server listening on `--address` (default `127.0.0.1:10201`).
use anyhow::Result;
use clap::Parser;
use gymlink::ExperimentConfig;
use gymlink_core::{
    record::{NullRecorder, Record, RecordValue},
    ActBatch, Learner, LearnerHyperParams, Policy, PolicyOutput, RolloutStorage, Trainer,
};
use gymlink_remote_env::GymEnv;
use log::{error, info};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Number of discrete actions of `LunarLander-v2`.
const NUM_ACTIONS: usize = 4;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file of the experiment configuration
    #[arg(short, long)]
    config: Option<String>,

    /// Address of the gym server, overrides the configuration
    #[arg(short, long)]
    address: Option<String>,

    /// Number of updates, overrides the configuration
    #[arg(short, long)]
    max_updates: Option<usize>,

    /// Seed of the random policy
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

/// Samples actions uniformly and predicts zero values.
struct RandomPolicy {
    rng: fastrand::Rng,
    num_actions: usize,
}

impl RandomPolicy {
    fn new(num_actions: usize, seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            num_actions,
        }
    }
}

impl Policy for RandomPolicy {
    fn act(
        &mut self,
        obs: ArrayView2<f32>,
        hidden_state: ArrayView2<f32>,
        _masks: ArrayView1<f32>,
    ) -> Result<PolicyOutput> {
        let n = obs.nrows();
        let act = (0..n)
            .map(|_| self.rng.usize(..self.num_actions) as i64)
            .collect::<Array1<i64>>();
        Ok(PolicyOutput {
            value: Array1::zeros(n),
            act: ActBatch::Discrete(act),
            log_prob: Array1::from_elem(n, -(self.num_actions as f32).ln()),
            hidden_state: hidden_state.to_owned(),
        })
    }

    fn value(
        &mut self,
        obs: ArrayView2<f32>,
        _hidden_state: ArrayView2<f32>,
        _masks: ArrayView1<f32>,
    ) -> Result<Array1<f32>> {
        Ok(Array1::zeros(obs.nrows()))
    }
}

/// Reports rollout statistics without changing the policy.
struct StatsLearner {
    hyper_params: LearnerHyperParams,
}

impl Learner for StatsLearner {
    fn update(&mut self, storage: &RolloutStorage) -> Result<Record> {
        let adv = storage.advantages_or_td();
        let value_loss = adv.mapv(|a| a * a).mean().unwrap_or(0.0);
        Ok(Record::from_slice(&[
            (
                "value_loss",
                RecordValue::Scalar(value_loss * self.hyper_params.value_loss_coef),
            ),
            ("rollout_reward", RecordValue::Scalar(storage.mean_reward())),
        ]))
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };
    if let Some(address) = &args.address {
        config.env.address = address.clone();
    }
    if let Some(max_updates) = args.max_updates {
        config.trainer.max_updates = max_updates;
    }
    config.validate()?;
    info!("{:?}", config);

    let mut policy = RandomPolicy::new(NUM_ACTIONS, args.seed);
    let mut learner = StatsLearner {
        hyper_params: config.learner.clone(),
    };
    let mut recorder = NullRecorder::new();
    let mut trainer = Trainer::<GymEnv>::build(config.trainer.clone(), config.env.clone());
    let stats = trainer.train(&mut policy, &mut learner, &mut recorder)?;

    info!(
        "Finished {} updates, {} episodes in {:.1}s",
        stats.updates,
        stats.episodes,
        stats.elapsed.as_secs_f64()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
