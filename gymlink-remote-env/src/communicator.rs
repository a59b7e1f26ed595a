//! Blocking request/response channel to an environment server.
use crate::{
    codec::{self, Request},
    frame::{self, DeadlineReader},
    message::{CommandParam, CommandResult},
    CommError,
};
use log::{debug, warn};
use std::{
    io,
    net::{Shutdown, TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingRequest,
    AwaitingResponse(&'static str),
    Closed,
}

/// Owns the connection to an environment server.
///
/// Requests and responses strictly alternate: every [`send_request`](Self::send_request)
/// must be followed by exactly one [`get_response`](Self::get_response) before the
/// next request. Breaking the alternation is a programming error and panics.
///
/// Any failure closes the communicator, after which every call returns
/// [`CommError::Closed`]. The socket is shut down when the communicator is
/// dropped.
#[derive(Debug)]
pub struct Communicator {
    stream: TcpStream,
    peer: String,
    timeout: Duration,
    state: State,
}

impl Communicator {
    /// Connects to `address`, e.g. `127.0.0.1:10201`.
    ///
    /// `timeout` bounds the connection attempt, every write, and the arrival
    /// of each whole response. It must be non-zero.
    pub fn connect(address: &str, timeout: Duration) -> Result<Self, CommError> {
        assert!(!timeout.is_zero(), "timeout must be non-zero");
        let op = format!("connecting to {}", address);
        let addrs = address
            .to_socket_addrs()
            .map_err(|e| CommError::connection(&op, e))?;

        let mut last_err = io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            "address resolved to nothing",
        );
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(timeout))
                        .and_then(|_| stream.set_write_timeout(Some(timeout)))
                        .and_then(|_| stream.set_nodelay(true))
                        .map_err(|e| CommError::connection(&op, e))?;
                    debug!("Connected to {}", addr);
                    return Ok(Self {
                        stream,
                        peer: address.to_string(),
                        timeout,
                        state: State::AwaitingRequest,
                    });
                }
                Err(e) => {
                    debug!("Failed to connect to {}: {}", addr, e);
                    last_err = e;
                }
            }
        }
        Err(CommError::connection(op, last_err))
    }

    /// Encodes and sends a request.
    ///
    /// # Panics
    ///
    /// If the response to the previous request has not been received.
    pub fn send_request<P: CommandParam>(&mut self, request: &Request<P>) -> Result<(), CommError> {
        match self.state {
            State::AwaitingRequest => {}
            State::AwaitingResponse(pending) => panic!(
                "send_request('{}') while the response to '{}' is pending",
                request.command(),
                pending
            ),
            State::Closed => return Err(CommError::Closed),
        }

        let message = codec::encode(request)?;
        debug!("-> {} ({} bytes)", request.command(), message.len());
        if let Err(e) = frame::write_frame(&mut self.stream, &message) {
            let op = format!("sending '{}' to {}", request.command(), self.peer);
            return Err(self.fail(CommError::connection(op, e)));
        }
        self.state = State::AwaitingResponse(P::COMMAND);
        Ok(())
    }

    /// Blocks until the response to the pending request arrives and decodes it as `R`.
    ///
    /// The whole response must arrive within the timeout given to
    /// [`connect`](Self::connect), otherwise [`CommError::Timeout`] is returned.
    ///
    /// # Panics
    ///
    /// If no request is pending.
    pub fn get_response<R: CommandResult>(&mut self) -> Result<R, CommError> {
        match self.state {
            State::AwaitingResponse(_) => {}
            State::AwaitingRequest => panic!("get_response() without a pending request"),
            State::Closed => return Err(CommError::Closed),
        }

        let deadline = Instant::now() + self.timeout;
        let received = frame::read_frame(&mut DeadlineReader::new(&self.stream, deadline));
        let message = match received {
            Ok(message) => message,
            Err(e) => {
                let op = format!("receiving '{}' from {}", R::COMMAND, self.peer);
                let err = receive_error(op, e, self.timeout);
                return Err(self.fail(err));
            }
        };
        debug!("<- {} ({} bytes)", R::COMMAND, message.len());

        match codec::decode::<R>(&message) {
            Ok(result) => {
                self.state = State::AwaitingRequest;
                Ok(result)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Sends a request and waits for its response.
    pub fn request<P: CommandParam, R: CommandResult>(&mut self, param: P) -> Result<R, CommError> {
        self.send_request(&Request::new(param))?;
        self.get_response()
    }

    /// Address of the server.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Returns `true` if the communicator can no longer be used.
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Shuts the connection down.
    pub fn close(&mut self) {
        if !self.is_closed() {
            debug!("Closing connection to {}", self.peer);
            self.shutdown();
        }
    }

    fn fail(&mut self, err: CommError) -> CommError {
        self.shutdown();
        err
    }

    fn shutdown(&mut self) {
        self.state = State::Closed;
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            if e.kind() != io::ErrorKind::NotConnected {
                warn!("Failed to shut down the connection to {}: {}", self.peer, e);
            }
        }
    }
}

/// Classifies a failure to read a response frame.
fn receive_error(op: String, e: io::Error, timeout: Duration) -> CommError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => CommError::Timeout(timeout),
        // an impossible frame header
        io::ErrorKind::InvalidData => CommError::malformed(e),
        _ => CommError::connection(op, e),
    }
}

impl Drop for Communicator {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn classify(kind: io::ErrorKind) -> CommError {
        receive_error("receiving 'step'".to_string(), io::Error::new(kind, "test"), TIMEOUT)
    }

    #[test]
    fn test_receive_error_kinds() {
        assert!(matches!(classify(io::ErrorKind::TimedOut), CommError::Timeout(t) if t == TIMEOUT));
        assert!(matches!(classify(io::ErrorKind::WouldBlock), CommError::Timeout(_)));
        assert!(matches!(classify(io::ErrorKind::InvalidData), CommError::MalformedMessage(_)));
        assert!(matches!(
            classify(io::ErrorKind::UnexpectedEof),
            CommError::Connection { .. }
        ));
    }
}
