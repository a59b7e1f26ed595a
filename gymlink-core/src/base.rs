//! Core abstractions shared by environments, policies and learners.
mod act;
mod env;
mod learner;
mod policy;
mod step;
pub use act::ActBatch;
pub use env::Env;
pub use learner::{Learner, LearnerHyperParams};
pub use policy::{Policy, PolicyOutput};
pub use step::Step;
