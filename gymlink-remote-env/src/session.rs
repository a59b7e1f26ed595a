//! Typed commands of an environment server.
use crate::{
    message::{
        InfoParam, InfoResult, MakeParam, MakeResult, ResetParam, ResetResult, StepParam,
        StepResult,
    },
    CommError, Communicator,
};
use gymlink_core::{ActBatch, Space, Step};
use ndarray::Array2;

/// The four commands of an environment server, run through a borrowed [`Communicator`].
///
/// Failures of the communicator are returned unchanged. Nothing is retried.
pub struct EnvSession<'a> {
    comm: &'a mut Communicator,
}

impl<'a> EnvSession<'a> {
    /// Creates a session on `comm`.
    pub fn new(comm: &'a mut Communicator) -> Self {
        Self { comm }
    }

    /// Creates `num_envs` instances of `env_name` and returns the status message of the server.
    ///
    /// `gamma` is the discount factor of the reward normalization on the
    /// server, `-1` disables it.
    pub fn make(&mut self, env_name: &str, num_envs: usize, gamma: f32) -> Result<String, CommError> {
        let res: MakeResult = self.comm.request(MakeParam {
            env_name: env_name.to_string(),
            num_envs,
            gamma,
        })?;
        Ok(res.result)
    }

    /// Returns the action space and the observation space.
    pub fn info(&mut self) -> Result<(Space, Space), CommError> {
        let res: InfoResult = self.comm.request(InfoParam {})?;
        Ok((res.action_space()?, res.observation_space()?))
    }

    /// Resets all instances and returns the observations, `[num_envs, obs_size]`.
    pub fn reset(&mut self) -> Result<Array2<f32>, CommError> {
        let res: ResetResult = self.comm.request(ResetParam {})?;
        res.into_observation()
    }

    /// Steps all instances with `act`.
    pub fn step(&mut self, act: &ActBatch, render: bool) -> Result<Step, CommError> {
        let res: StepResult = self.comm.request(StepParam::from_act(act, render))?;
        res.into_step()
    }
}
