//! Base implementation of records.
//!
//! A [`Record`] maps names to values. Learners return one per update and the
//! trainer adds its own statistics before handing it to a [`Recorder`].
//!
//! [`Recorder`]: super::Recorder
use crate::error::GymlinkError;
use chrono::prelude::{DateTime, Local};
use std::collections::HashMap;

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics like loss.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),
}

/// A container for storing key-value pairs of various data types.
///
/// # Examples
///
/// ```rust
/// use gymlink_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("value_loss", 0.5);
/// record.insert("fps", RecordValue::Scalar(1200.0));
///
/// assert_eq!(record.get_scalar("value_loss").unwrap(), 0.5);
/// assert_eq!(record.scalars(), vec![("fps", 1200.0), ("value_loss", 0.5)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Merges another record into this one in place.
    ///
    /// Values of `record` overwrite values of `self` with the same key.
    pub fn merge_inplace(&mut self, record: Record) {
        self.0.extend(record.0);
    }

    /// Gets a scalar value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a scalar.
    pub fn get_scalar(&self, k: &str) -> Result<f32, GymlinkError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(GymlinkError::RecordValueTypeError("Scalar".to_string())),
            None => Err(GymlinkError::RecordKeyError(k.to_string())),
        }
    }

    /// Scalar entries sorted by key.
    pub fn scalars(&self) -> Vec<(&str, f32)> {
        let mut scalars: Vec<_> = self
            .0
            .iter()
            .filter_map(|(k, v)| match v {
                RecordValue::Scalar(v) => Some((k.as_str(), *v)),
                _ => None,
            })
            .collect();
        scalars.sort_by(|a, b| a.0.cmp(b.0));
        scalars
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
