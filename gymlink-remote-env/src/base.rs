//! Vectorized environment served by a remote gym server.
use crate::{CommError, Communicator, EnvSession, GymEnvConfig};
use anyhow::{Context, Result};
use gymlink_core::{ActBatch, Env, Space, Step};
use log::info;
use ndarray::Array2;

/// A vectorized environment on a gym server.
///
/// Building the environment connects to the server and runs the `make` and
/// `info` handshake. The connection is owned by the environment and closed
/// when it is dropped.
#[derive(Debug)]
pub struct GymEnv {
    comm: Communicator,
    num_envs: usize,
    render: bool,
    action_space: Space,
    observation_space: Space,
}

impl GymEnv {
    /// A session on the connection of the environment.
    pub fn session(&mut self) -> EnvSession<'_> {
        EnvSession::new(&mut self.comm)
    }

    /// Closes the connection.
    pub fn close(&mut self) {
        self.comm.close();
    }

    fn check_obs(&self, obs: &Array2<f32>) -> Result<(), CommError> {
        let expected = [self.num_envs, self.observation_space.flat_size()];
        if obs.shape() == &expected[..] {
            Ok(())
        } else {
            Err(CommError::malformed(format!(
                "observations of shape {:?}, expected {:?}",
                obs.shape(),
                expected
            )))
        }
    }
}

impl Env for GymEnv {
    type Config = GymEnvConfig;

    fn build(config: &Self::Config) -> Result<Self> {
        config.validate()?;

        info!("Connecting to gym server at {}", config.address);
        let mut comm = Communicator::connect(&config.address, config.timeout())?;
        let mut session = EnvSession::new(&mut comm);

        info!("Creating environment {}", config.env_name);
        let status = session
            .make(&config.env_name, config.num_envs, config.env_gamma)
            .context("'make' failed")?;
        info!("{}", status);

        let (action_space, observation_space) = session.info().context("'info' failed")?;
        info!("Action space: {}", action_space);
        info!("Observation space: {}", observation_space);

        Ok(Self {
            comm,
            num_envs: config.num_envs,
            render: config.render,
            action_space,
            observation_space,
        })
    }

    fn num_envs(&self) -> usize {
        self.num_envs
    }

    fn observation_space(&self) -> &Space {
        &self.observation_space
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }

    fn reset(&mut self) -> Result<Array2<f32>> {
        info!("Resetting environment");
        let obs = self.session().reset()?;
        self.check_obs(&obs)?;
        Ok(obs)
    }

    fn step(&mut self, act: &ActBatch) -> Result<Step> {
        let render = self.render;
        let step = self.session().step(act, render)?;
        self.check_obs(&step.obs)?;
        Ok(step)
    }
}
