//! Storage of on-policy rollouts.
//!
//! [`RolloutStorage`] keeps the transitions collected between two learner
//! updates. [`EpisodeTracker`] keeps the returns of finished episodes for
//! reporting.
mod episode_tracker;
mod storage;
pub use episode_tracker::EpisodeTracker;
pub use storage::RolloutStorage;
