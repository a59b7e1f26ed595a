//! Scripted environment server for tests.
#![allow(dead_code)]
use gymlink_remote_env::{
    codec, frame,
    message::{CommandParam, CommandResult, InfoResult},
};
use std::{
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

/// Runs `script` on the first connection accepted on a local port.
///
/// Returns the address of the server and the handle of its thread. Joining
/// the handle surfaces assertions that failed in the script.
pub fn spawn_server<F>(script: F) -> (String, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        script(stream);
    });
    (address, handle)
}

/// Reads a request and returns its parameter, panicking on another command.
pub fn expect<P: CommandParam>(stream: &mut TcpStream) -> P {
    let message = frame::read_frame(stream).unwrap();
    codec::decode_request::<P>(&message).unwrap().into_param()
}

/// Sends a response.
pub fn reply<R: CommandResult>(stream: &mut TcpStream, result: &R) {
    let message = codec::encode_response(result).unwrap();
    frame::write_frame(stream, &message).unwrap();
}

/// Spaces with `n` discrete actions and observations of `obs_size` reals.
pub fn discrete_info(n: usize, obs_size: usize) -> InfoResult {
    InfoResult {
        action_space_type: "Discrete".to_string(),
        action_space_shape: vec![n],
        observation_space_type: "Box".to_string(),
        observation_space_shape: vec![obs_size],
    }
}
