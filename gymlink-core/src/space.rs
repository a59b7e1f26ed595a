//! Descriptors of observation and action spaces.
use crate::error::GymlinkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a space, following the names used by Gym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceKind {
    /// A finite set of actions `0..n`.
    Discrete,

    /// A box of real numbers.
    Box,
}

impl SpaceKind {
    /// Parses the Gym class name of a space.
    pub fn from_gym_name(name: &str) -> Option<Self> {
        match name {
            "Discrete" => Some(Self::Discrete),
            "Box" => Some(Self::Box),
            _ => None,
        }
    }

    /// Returns the Gym class name of the space.
    pub fn gym_name(&self) -> &'static str {
        match self {
            Self::Discrete => "Discrete",
            Self::Box => "Box",
        }
    }
}

/// Shape and kind of an observation or action space.
///
/// The shape is never empty and every dimension is positive. For a discrete
/// space the shape is `[n]`, `n` being the number of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    kind: SpaceKind,
    shape: Vec<usize>,
}

impl Space {
    /// Constructs a space, checking the shape.
    pub fn new(kind: SpaceKind, shape: Vec<usize>) -> Result<Self, GymlinkError> {
        if shape.is_empty() {
            return Err(GymlinkError::InvalidSpace(format!(
                "{} space with empty shape",
                kind.gym_name()
            )));
        }
        if shape.iter().any(|&d| d == 0) {
            return Err(GymlinkError::InvalidSpace(format!(
                "{} space with zero-sized dimension {:?}",
                kind.gym_name(),
                shape
            )));
        }
        Ok(Self { kind, shape })
    }

    /// Discrete space of `n` actions.
    pub fn discrete(n: usize) -> Result<Self, GymlinkError> {
        Self::new(SpaceKind::Discrete, vec![n])
    }

    /// Box space of the given shape.
    pub fn continuous(shape: Vec<usize>) -> Result<Self, GymlinkError> {
        Self::new(SpaceKind::Box, shape)
    }

    /// Kind of the space.
    pub fn kind(&self) -> SpaceKind {
        self.kind
    }

    /// Shape of the space.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of scalars in one element of the space, flattened.
    pub fn flat_size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Width of one action on the wire.
    ///
    /// A discrete action is a single index; a continuous action carries every
    /// element of the box.
    pub fn action_dims(&self) -> usize {
        match self.kind {
            SpaceKind::Discrete => 1,
            SpaceKind::Box => self.flat_size(),
        }
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {:?}", self.kind.gym_name(), self.shape)
    }
}
