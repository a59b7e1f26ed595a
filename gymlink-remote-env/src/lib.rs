//! Client of vectorized [Gym](https://github.com/openai/gym) environments served over TCP.
//!
//! The environments run in a separate server process. This crate talks to it
//! with four commands:
//!
//! * `make` creates `num_envs` instances of an environment,
//! * `info` returns its action and observation spaces,
//! * `reset` resets all instances,
//! * `step` steps all instances with one action each.
//!
//! Every message is a JSON document in a frame prefixed by its big-endian `u32`
//! length. A request is `{"command": ..., "parameter": {...}}` and the server
//! answers with `{"command": ..., "result": {...}}`, echoing the command.
//!
//! [`Communicator`] owns the connection and enforces the strict alternation of
//! requests and responses. [`EnvSession`] runs the typed commands on it, and
//! [`GymEnv`] implements [`gymlink_core::Env`] on top of both.
//!
//! ```no_run
//! use gymlink_core::Env;
//! use gymlink_remote_env::{GymEnv, GymEnvConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = GymEnvConfig::default()
//!     .address("127.0.0.1:10201")
//!     .env_name("LunarLander-v2")
//!     .num_envs(8);
//! let mut env = GymEnv::build(&config)?;
//! let obs = env.reset()?;
//! assert_eq!(obs.nrows(), 8);
//! # Ok(())
//! # }
//! ```
pub mod codec;
pub mod frame;
pub mod message;

mod base;
mod communicator;
mod config;
mod error;
mod session;
pub use base::GymEnv;
pub use communicator::Communicator;
pub use config::GymEnvConfig;
pub use error::CommError;
pub use session::EnvSession;
