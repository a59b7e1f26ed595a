//! Errors in the communication with an environment server.
use std::{io, time::Duration};
use thiserror::Error;

/// Failure of a request/response exchange.
///
/// All kinds are fatal to the connection: there is no reconnection or retry.
#[derive(Error, Debug)]
pub enum CommError {
    /// The peer is unreachable or the channel closed.
    #[error("Connection error while {op}: {source}")]
    Connection {
        /// The operation that failed, e.g. `connecting to 127.0.0.1:10201`.
        op: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The response declares another command than the one requested.
    #[error("Protocol mismatch: expected a '{expected}' response, got '{actual}'")]
    ProtocolMismatch {
        /// Command of the pending request.
        expected: String,
        /// Command declared by the response.
        actual: String,
    },

    /// The message is not a valid envelope or its fields are absent or misshaped.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// No complete response arrived within the deadline.
    #[error("Timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    /// The communicator was used after it had been closed or had failed.
    #[error("Connection is closed")]
    Closed,
}

impl CommError {
    pub(crate) fn connection(op: impl Into<String>, source: io::Error) -> Self {
        Self::Connection {
            op: op.into(),
            source,
        }
    }

    pub(crate) fn malformed(msg: impl ToString) -> Self {
        Self::MalformedMessage(msg.to_string())
    }
}
