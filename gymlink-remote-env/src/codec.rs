//! Encoding of requests and decoding of responses.
//!
//! A request is the JSON document `{"command": ..., "parameter": {...}}` and a
//! response is `{"command": ..., "result": {...}}`, where the response echoes
//! the command of the request it answers. The functions here are pure; framing
//! is done by [`frame`](crate::frame).
//!
//! The `*_request` and `encode_response` functions implement the server side
//! and are used by scripted servers in tests.
use crate::{
    message::{CommandParam, CommandResult},
    CommError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command with its parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<P: CommandParam> {
    param: P,
}

impl<P: CommandParam> Request<P> {
    /// Creates a request tagged with the command of `P`.
    pub fn new(param: P) -> Self {
        Self { param }
    }

    /// The command tag.
    pub fn command(&self) -> &'static str {
        P::COMMAND
    }

    /// The parameter.
    pub fn param(&self) -> &P {
        &self.param
    }

    /// Returns the parameter.
    pub fn into_param(self) -> P {
        self.param
    }
}

#[derive(Serialize)]
struct OutgoingRequest<'a, P> {
    command: &'a str,
    parameter: &'a P,
}

#[derive(Deserialize)]
struct IncomingRequest {
    command: String,
    parameter: Value,
}

#[derive(Serialize)]
struct OutgoingResponse<'a, R> {
    command: &'a str,
    result: &'a R,
}

#[derive(Deserialize)]
struct IncomingResponse {
    command: String,
    result: Value,
}

/// Encodes a request.
pub fn encode<P: CommandParam>(request: &Request<P>) -> Result<Vec<u8>, CommError> {
    serde_json::to_vec(&OutgoingRequest {
        command: request.command(),
        parameter: request.param(),
    })
    .map_err(CommError::malformed)
}

/// Decodes the response to a request of `R::COMMAND`.
///
/// Fails with [`CommError::ProtocolMismatch`] if the response declares another
/// command, and with [`CommError::MalformedMessage`] if the result does not
/// have the fields and shapes of `R`.
pub fn decode<R: CommandResult>(message: &[u8]) -> Result<R, CommError> {
    let response: IncomingResponse =
        serde_json::from_slice(message).map_err(CommError::malformed)?;
    check_command(R::COMMAND, &response.command)?;
    let result: R = serde_json::from_value(response.result)
        .map_err(|e| CommError::malformed(format!("'{}' result: {}", R::COMMAND, e)))?;
    result
        .validate()
        .map_err(|e| CommError::malformed(format!("'{}' result: {}", R::COMMAND, e)))?;
    Ok(result)
}

/// Returns the command tag of a request without decoding its parameter.
pub fn peek_command(message: &[u8]) -> Result<String, CommError> {
    let request: IncomingRequest = serde_json::from_slice(message).map_err(CommError::malformed)?;
    Ok(request.command)
}

/// Decodes a request of `P::COMMAND`.
pub fn decode_request<P: CommandParam>(message: &[u8]) -> Result<Request<P>, CommError> {
    let request: IncomingRequest = serde_json::from_slice(message).map_err(CommError::malformed)?;
    check_command(P::COMMAND, &request.command)?;
    let param = serde_json::from_value(request.parameter)
        .map_err(|e| CommError::malformed(format!("'{}' parameter: {}", P::COMMAND, e)))?;
    Ok(Request::new(param))
}

/// Encodes the response carrying `result`.
pub fn encode_response<R: CommandResult>(result: &R) -> Result<Vec<u8>, CommError> {
    serde_json::to_vec(&OutgoingResponse {
        command: R::COMMAND,
        result,
    })
    .map_err(CommError::malformed)
}

fn check_command(expected: &str, actual: &str) -> Result<(), CommError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CommError::ProtocolMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        ActionValue, InfoParam, InfoResult, MakeParam, MakeResult, ResetParam, ResetResult,
        StepParam, StepResult,
    };
    use serde_json::json;

    fn request_round_trip<P: CommandParam + PartialEq + std::fmt::Debug>(param: P) {
        let request = Request::new(param);
        let message = encode(&request).unwrap();
        assert_eq!(peek_command(&message).unwrap(), P::COMMAND);
        assert_eq!(decode_request::<P>(&message).unwrap(), request);
    }

    fn response_round_trip<R: CommandResult + PartialEq + std::fmt::Debug>(result: R) {
        let message = encode_response(&result).unwrap();
        assert_eq!(decode::<R>(&message).unwrap(), result);
    }

    #[test]
    fn test_encode_make() {
        let message = encode(&Request::new(MakeParam {
            env_name: "LunarLander-v2".to_string(),
            num_envs: 8,
            gamma: -1.0,
        }))
        .unwrap();
        let value: Value = serde_json::from_slice(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "command": "make",
                "parameter": {"env_name": "LunarLander-v2", "num_envs": 8, "gamma": -1.0}
            })
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let request = Request::new(StepParam {
            actions: vec![vec![ActionValue::Real(0.25)]],
            render: false,
        });
        assert_eq!(encode(&request).unwrap(), encode(&request).unwrap());
    }

    #[test]
    fn test_round_trip_all_commands() {
        request_round_trip(MakeParam {
            env_name: "CartPole-v1".to_string(),
            num_envs: 2,
            gamma: 0.99,
        });
        request_round_trip(InfoParam {});
        request_round_trip(ResetParam {});
        request_round_trip(StepParam {
            actions: vec![vec![ActionValue::Index(3)], vec![ActionValue::Index(0)]],
            render: true,
        });
        request_round_trip(StepParam {
            actions: vec![vec![ActionValue::Real(0.5), ActionValue::Real(-2.0)]],
            render: false,
        });

        response_round_trip(MakeResult {
            result: "Created 2 environments".to_string(),
        });
        response_round_trip(InfoResult {
            action_space_type: "Box".to_string(),
            action_space_shape: vec![2],
            observation_space_type: "Box".to_string(),
            observation_space_shape: vec![8],
        });
        response_round_trip(ResetResult {
            observation: vec![vec![0.0, 1.5], vec![-1.0, 2.0]],
        });
        response_round_trip(StepResult {
            observation: vec![vec![0.1], vec![0.2]],
            reward: vec![vec![1.0], vec![0.0]],
            real_reward: vec![vec![10.0], vec![0.0]],
            done: vec![vec![true], vec![false]],
        });
    }

    #[test]
    fn test_decode_protocol_mismatch() {
        let message = encode_response(&InfoResult {
            action_space_type: "Discrete".to_string(),
            action_space_shape: vec![4],
            observation_space_type: "Box".to_string(),
            observation_space_shape: vec![8],
        })
        .unwrap();
        match decode::<StepResult>(&message) {
            Err(CommError::ProtocolMismatch { expected, actual }) => {
                assert_eq!(expected, "step");
                assert_eq!(actual, "info");
            }
            r => panic!("unexpected: {:?}", r),
        }
    }

    #[test]
    fn test_decode_malformed() {
        let not_json = b"\x00\x01";
        assert!(matches!(
            decode::<MakeResult>(not_json),
            Err(CommError::MalformedMessage(_))
        ));

        let missing = json!({"command": "reset", "result": {}}).to_string();
        assert!(matches!(
            decode::<ResetResult>(missing.as_bytes()),
            Err(CommError::MalformedMessage(_))
        ));

        let ragged = json!({"command": "reset", "result": {"observation": [[1.0, 2.0], [3.0]]}})
            .to_string();
        assert!(matches!(
            decode::<ResetResult>(ragged.as_bytes()),
            Err(CommError::MalformedMessage(_))
        ));

        let wrong_type = json!({
            "command": "step",
            "result": {
                "observation": [[0.0]],
                "reward": [[0.0]],
                "real_reward": [[0.0]],
                "done": [[1]]
            }
        })
        .to_string();
        assert!(matches!(
            decode::<StepResult>(wrong_type.as_bytes()),
            Err(CommError::MalformedMessage(_))
        ));
    }

    #[test]
    fn test_decode_request_mismatch() {
        let message = encode(&Request::new(ResetParam {})).unwrap();
        assert!(matches!(
            decode_request::<InfoParam>(&message),
            Err(CommError::ProtocolMismatch { .. })
        ));
    }
}
