//! Typed parameters and results of the four commands.
//!
//! Each parameter type is bound to the command it is sent with, and each
//! result type to the command it answers. [`codec`](crate::codec) uses these
//! bindings to tag requests and to reject responses of another command.
use crate::CommError;
use gymlink_core::{ActBatch, Space, SpaceKind, Step};
use ndarray::Array2;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Parameter of a request.
pub trait CommandParam: Serialize + DeserializeOwned {
    /// Command tag of the request.
    const COMMAND: &'static str;
}

/// Result carried by a response.
pub trait CommandResult: Serialize + DeserializeOwned {
    /// Command tag the response must echo.
    const COMMAND: &'static str;

    /// Checks the shape of the fields after deserialization.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Creates the vectorized environment on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeParam {
    /// Registered name of the environment, e.g. `LunarLander-v2`.
    pub env_name: String,

    /// Number of parallel environment instances.
    pub num_envs: usize,

    /// Discount factor of the server-side reward normalization, `-1` disables it.
    pub gamma: f32,
}

impl CommandParam for MakeParam {
    const COMMAND: &'static str = "make";
}

/// Queries the spaces of the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoParam {}

impl CommandParam for InfoParam {
    const COMMAND: &'static str = "info";
}

/// Resets all environment instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetParam {}

impl CommandParam for ResetParam {
    const COMMAND: &'static str = "reset";
}

/// A single number of an action on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    /// Index of a discrete action.
    Index(i64),

    /// Component of a continuous action.
    Real(f32),
}

/// Steps all environment instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepParam {
    /// Actions, `[num_envs][action_dims]`.
    pub actions: Vec<Vec<ActionValue>>,

    /// Passed to the server as is.
    pub render: bool,
}

impl StepParam {
    /// Converts batched actions into their wire form.
    ///
    /// A discrete action becomes a row with a single index.
    pub fn from_act(act: &ActBatch, render: bool) -> Self {
        let actions = match act {
            ActBatch::Discrete(a) => a.iter().map(|&ix| vec![ActionValue::Index(ix)]).collect(),
            ActBatch::Continuous(a) => a
                .outer_iter()
                .map(|row| row.iter().map(|&x| ActionValue::Real(x)).collect())
                .collect(),
        };
        Self { actions, render }
    }
}

impl CommandParam for StepParam {
    const COMMAND: &'static str = "step";
}

/// Status of `make`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakeResult {
    /// Human readable status message.
    pub result: String,
}

impl CommandResult for MakeResult {
    const COMMAND: &'static str = "make";
}

/// Spaces of the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoResult {
    /// `Discrete` or `Box`.
    pub action_space_type: String,

    /// `[n]` for a discrete space, the box shape otherwise.
    pub action_space_shape: Vec<usize>,

    /// `Discrete` or `Box`.
    pub observation_space_type: String,

    /// Shape of a single observation.
    pub observation_space_shape: Vec<usize>,
}

impl InfoResult {
    /// The action space.
    pub fn action_space(&self) -> Result<Space, CommError> {
        to_space(&self.action_space_type, &self.action_space_shape)
    }

    /// The observation space.
    pub fn observation_space(&self) -> Result<Space, CommError> {
        to_space(&self.observation_space_type, &self.observation_space_shape)
    }
}

impl CommandResult for InfoResult {
    const COMMAND: &'static str = "info";

    fn validate(&self) -> Result<(), String> {
        self.action_space().map_err(|e| e.to_string())?;
        self.observation_space().map_err(|e| e.to_string())?;
        Ok(())
    }
}

fn to_space(name: &str, shape: &[usize]) -> Result<Space, CommError> {
    let kind = SpaceKind::from_gym_name(name)
        .ok_or_else(|| CommError::malformed(format!("unknown space type '{}'", name)))?;
    Space::new(kind, shape.to_vec()).map_err(CommError::malformed)
}

/// Initial observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetResult {
    /// Observations, `[num_envs][obs_size]`.
    pub observation: Vec<Vec<f32>>,
}

impl ResetResult {
    /// Converts the observations into a `[num_envs, obs_size]` array.
    pub fn into_observation(self) -> Result<Array2<f32>, CommError> {
        to_array2(self.observation).map_err(CommError::malformed)
    }
}

impl CommandResult for ResetResult {
    const COMMAND: &'static str = "reset";

    fn validate(&self) -> Result<(), String> {
        row_width("observation", &self.observation).map(|_| ())
    }
}

/// Outcome of a batched step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Observations, `[num_envs][obs_size]`.
    pub observation: Vec<Vec<f32>>,

    /// Rewards used for learning, `[num_envs][1]`.
    pub reward: Vec<Vec<f32>>,

    /// Unnormalized rewards, `[num_envs][1]`.
    pub real_reward: Vec<Vec<f32>>,

    /// Episode termination flags, `[num_envs][1]`.
    pub done: Vec<Vec<bool>>,
}

impl StepResult {
    /// Converts the result into a [`Step`].
    pub fn into_step(self) -> Result<Step, CommError> {
        self.validate().map_err(CommError::malformed)?;
        let obs = to_array2(self.observation).map_err(CommError::malformed)?;
        Ok(Step::new(
            obs,
            flatten(self.reward),
            flatten(self.real_reward),
            flatten(self.done),
        ))
    }
}

impl CommandResult for StepResult {
    const COMMAND: &'static str = "step";

    fn validate(&self) -> Result<(), String> {
        row_width("observation", &self.observation)?;
        let n = self.observation.len();
        check_column("reward", &self.reward, n)?;
        check_column("real_reward", &self.real_reward, n)?;
        check_column("done", &self.done, n)
    }
}

/// Returns the common length of the rows.
fn row_width<T>(what: &str, rows: &[Vec<T>]) -> Result<usize, String> {
    let width = rows.first().map_or(0, |r| r.len());
    match rows.iter().position(|r| r.len() != width) {
        Some(i) => Err(format!(
            "'{}' is ragged: row {} has {} elements, row 0 has {}",
            what,
            i,
            rows[i].len(),
            width
        )),
        None => Ok(width),
    }
}

fn check_column<T>(what: &str, rows: &[Vec<T>], num_envs: usize) -> Result<(), String> {
    if rows.len() != num_envs {
        return Err(format!(
            "'{}' has {} rows, expected {}",
            what,
            rows.len(),
            num_envs
        ));
    }
    match row_width(what, rows)? {
        1 => Ok(()),
        _ if rows.is_empty() => Ok(()),
        w => Err(format!("'{}' rows have {} elements, expected 1", what, w)),
    }
}

fn to_array2(rows: Vec<Vec<f32>>) -> Result<Array2<f32>, String> {
    let width = row_width("observation", &rows)?;
    let n = rows.len();
    let flat = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n, width), flat).map_err(|e| e.to_string())
}

fn flatten<T>(rows: Vec<Vec<T>>) -> Vec<T> {
    rows.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_step_param_from_act() {
        let p = StepParam::from_act(&ActBatch::Discrete(arr1(&[2, 0])), false);
        assert_eq!(
            p.actions,
            vec![vec![ActionValue::Index(2)], vec![ActionValue::Index(0)]]
        );

        let p = StepParam::from_act(&ActBatch::Continuous(arr2(&[[0.5, -1.0]])), true);
        assert_eq!(
            p.actions,
            vec![vec![ActionValue::Real(0.5), ActionValue::Real(-1.0)]]
        );
        assert!(p.render);
    }

    #[test]
    fn test_info_spaces() {
        let info = InfoResult {
            action_space_type: "Discrete".to_string(),
            action_space_shape: vec![4],
            observation_space_type: "Box".to_string(),
            observation_space_shape: vec![8],
        };
        assert!(info.validate().is_ok());
        assert_eq!(info.action_space().unwrap().action_dims(), 1);
        assert_eq!(info.observation_space().unwrap().flat_size(), 8);

        let info = InfoResult {
            action_space_type: "MultiBinary".to_string(),
            ..info
        };
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_step_result_into_step() {
        let res = StepResult {
            observation: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            reward: vec![vec![0.5], vec![-0.5]],
            real_reward: vec![vec![1.0], vec![-1.0]],
            done: vec![vec![false], vec![true]],
        };
        let step = res.into_step().unwrap();
        assert_eq!(step.obs, arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        assert_eq!(step.reward, vec![0.5, -0.5]);
        assert_eq!(step.real_reward, vec![1.0, -1.0]);
        assert_eq!(step.is_done, vec![false, true]);
    }

    #[test]
    fn test_step_result_shapes() {
        let ragged = StepResult {
            observation: vec![vec![1.0, 2.0], vec![3.0]],
            reward: vec![vec![0.0], vec![0.0]],
            real_reward: vec![vec![0.0], vec![0.0]],
            done: vec![vec![false], vec![false]],
        };
        assert!(ragged.validate().unwrap_err().contains("ragged"));

        let short = StepResult {
            observation: vec![vec![1.0], vec![3.0]],
            reward: vec![vec![0.0]],
            real_reward: vec![vec![0.0], vec![0.0]],
            done: vec![vec![false], vec![false]],
        };
        assert!(short.validate().unwrap_err().contains("'reward' has 1 rows"));

        let wide = StepResult {
            observation: vec![vec![1.0]],
            reward: vec![vec![0.0]],
            real_reward: vec![vec![0.0]],
            done: vec![vec![false, true]],
        };
        assert!(matches!(
            wide.into_step(),
            Err(CommError::MalformedMessage(_))
        ));
    }
}
