//! Batched actions.
use crate::{error::GymlinkError, Space, SpaceKind};
use ndarray::{Array1, Array2};

/// Actions for all environments of a vectorized environment.
///
/// The first axis is the environment index.
#[derive(Debug, Clone, PartialEq)]
pub enum ActBatch {
    /// One action index per environment.
    Discrete(Array1<i64>),

    /// One action vector per environment, `[num_envs, action_dims]`.
    Continuous(Array2<f32>),
}

impl ActBatch {
    /// Returns the number of environments the batch covers.
    pub fn len(&self) -> usize {
        match self {
            Self::Discrete(a) => a.len(),
            Self::Continuous(a) => a.nrows(),
        }
    }

    /// Returns `true` if the batch has no actions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks that the batch covers `num_envs` environments and lies in `space`.
    pub fn check(&self, space: &Space, num_envs: usize) -> Result<(), GymlinkError> {
        if self.len() != num_envs {
            return Err(GymlinkError::ShapeMismatch {
                what: "actions".to_string(),
                expected: vec![num_envs],
                actual: vec![self.len()],
            });
        }

        match (self, space.kind()) {
            (Self::Discrete(a), SpaceKind::Discrete) => {
                let n = space.shape()[0] as i64;
                match a.iter().find(|&&ix| ix < 0 || ix >= n) {
                    Some(ix) => Err(GymlinkError::InvalidAction(format!(
                        "index {} out of range 0..{}",
                        ix, n
                    ))),
                    None => Ok(()),
                }
            }
            (Self::Continuous(a), SpaceKind::Box) => {
                if a.ncols() != space.action_dims() {
                    Err(GymlinkError::ShapeMismatch {
                        what: "continuous actions".to_string(),
                        expected: vec![num_envs, space.action_dims()],
                        actual: a.shape().to_vec(),
                    })
                } else {
                    Ok(())
                }
            }
            (_, kind) => Err(GymlinkError::InvalidAction(format!(
                "action kind does not match {} space",
                kind.gym_name()
            ))),
        }
    }
}
