mod common;
use common::{discrete_info, expect, reply, spawn_server};
use gymlink_core::ActBatch;
use gymlink_remote_env::{
    codec::{self, Request},
    frame,
    message::{
        ActionValue, InfoParam, InfoResult, MakeParam, MakeResult, ResetParam, ResetResult,
        StepParam, StepResult,
    },
    CommError, Communicator, EnvSession,
};
use ndarray::{arr1, arr2};
use std::{
    io,
    io::Write,
    net::TcpListener,
    thread,
    time::{Duration, Instant},
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test_log::test]
fn test_session_commands() {
    let (address, server) = spawn_server(|mut stream| {
        let make: MakeParam = expect(&mut stream);
        assert_eq!(make.env_name, "LunarLander-v2");
        assert_eq!(make.num_envs, 2);
        assert_eq!(make.gamma, 0.99);
        reply(
            &mut stream,
            &MakeResult {
                result: "Made 2 environments".to_string(),
            },
        );

        let _: InfoParam = expect(&mut stream);
        reply(&mut stream, &discrete_info(4, 2));

        let _: ResetParam = expect(&mut stream);
        reply(
            &mut stream,
            &ResetResult {
                observation: vec![vec![0.0, 0.5], vec![1.0, 1.5]],
            },
        );

        let step: StepParam = expect(&mut stream);
        assert_eq!(
            step.actions,
            vec![vec![ActionValue::Index(1)], vec![ActionValue::Index(3)]]
        );
        assert!(!step.render);
        reply(
            &mut stream,
            &StepResult {
                observation: vec![vec![2.0, 2.5], vec![3.0, 3.5]],
                reward: vec![vec![0.1], vec![0.2]],
                real_reward: vec![vec![1.0], vec![2.0]],
                done: vec![vec![false], vec![true]],
            },
        );
    });

    let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
    let mut session = EnvSession::new(&mut comm);

    assert_eq!(
        session.make("LunarLander-v2", 2, 0.99).unwrap(),
        "Made 2 environments"
    );

    let (action_space, observation_space) = session.info().unwrap();
    assert_eq!(action_space.shape(), &[4]);
    assert_eq!(action_space.action_dims(), 1);
    assert_eq!(observation_space.flat_size(), 2);

    assert_eq!(session.reset().unwrap(), arr2(&[[0.0, 0.5], [1.0, 1.5]]));

    let step = session
        .step(&ActBatch::Discrete(arr1(&[1, 3])), false)
        .unwrap();
    assert_eq!(step.obs, arr2(&[[2.0, 2.5], [3.0, 3.5]]));
    assert_eq!(step.reward, vec![0.1, 0.2]);
    assert_eq!(step.real_reward, vec![1.0, 2.0]);
    assert_eq!(step.is_done, vec![false, true]);

    server.join().unwrap();
}

#[test]
fn test_response_of_another_command() {
    let (address, server) = spawn_server(|mut stream| {
        let _: StepParam = expect(&mut stream);
        reply(&mut stream, &discrete_info(4, 8));
    });

    let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
    comm.send_request(&Request::new(StepParam {
        actions: vec![vec![ActionValue::Index(0)]],
        render: false,
    }))
    .unwrap();

    match comm.get_response::<StepResult>() {
        Err(CommError::ProtocolMismatch { expected, actual }) => {
            assert_eq!(expected, "step");
            assert_eq!(actual, "info");
        }
        r => panic!("unexpected: {:?}", r),
    }
    assert!(comm.is_closed());
    assert!(matches!(
        comm.request::<InfoParam, InfoResult>(InfoParam {}),
        Err(CommError::Closed)
    ));

    server.join().unwrap();
}

#[test]
fn test_timeout() {
    let (address, server) = spawn_server(|mut stream| {
        let _: ResetParam = expect(&mut stream);
        thread::sleep(Duration::from_millis(1000));
    });

    let timeout = Duration::from_millis(200);
    let mut comm = Communicator::connect(&address, timeout).unwrap();
    match comm.request::<ResetParam, ResetResult>(ResetParam {}) {
        Err(CommError::Timeout(t)) => assert_eq!(t, timeout),
        r => panic!("unexpected: {:?}", r),
    }
    assert!(comm.is_closed());

    server.join().unwrap();
}

#[test]
fn test_timeout_on_slow_response() {
    let (address, server) = spawn_server(|mut stream| {
        let _: ResetParam = expect(&mut stream);
        let mut message = Vec::new();
        let result = ResetResult {
            observation: vec![vec![0.0]],
        };
        let payload = codec::encode_response(&result).unwrap();
        frame::write_frame(&mut message, &payload).unwrap();
        // One byte at a time, each well within the timeout.
        for b in message {
            if stream.write_all(&[b]).is_err() {
                break;
            }
            thread::sleep(Duration::from_millis(60));
        }
    });

    let timeout = Duration::from_millis(200);
    let mut comm = Communicator::connect(&address, timeout).unwrap();
    let start = Instant::now();
    match comm.request::<ResetParam, ResetResult>(ResetParam {}) {
        Err(CommError::Timeout(t)) => assert_eq!(t, timeout),
        r => panic!("unexpected: {:?}", r),
    }
    assert!(start.elapsed() < Duration::from_secs(1));
    assert!(comm.is_closed());

    drop(comm);
    server.join().unwrap();
}

#[test]
fn test_oversized_frame_header() {
    let (address, server) = spawn_server(|mut stream| {
        let _: ResetParam = expect(&mut stream);
        stream.write_all(&u32::MAX.to_be_bytes()).unwrap();
    });

    let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
    assert!(matches!(
        comm.request::<ResetParam, ResetResult>(ResetParam {}),
        Err(CommError::MalformedMessage(_))
    ));
    assert!(comm.is_closed());

    server.join().unwrap();
}

#[test]
fn test_blocked_send_is_a_connection_error() {
    // The server never reads, so the socket buffers fill up.
    let (address, _server) = spawn_server(|stream| {
        thread::sleep(Duration::from_secs(3));
        drop(stream);
    });

    let mut comm = Communicator::connect(&address, Duration::from_millis(200)).unwrap();
    let request = Request::new(StepParam {
        actions: vec![vec![ActionValue::Index(0)]; 4_000_000],
        render: false,
    });
    match comm.send_request(&request) {
        Err(CommError::Connection { source, .. }) => assert!(matches!(
            source.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        )),
        r => panic!("unexpected: {:?}", r),
    }
    assert!(comm.is_closed());
}

#[test]
fn test_connection_closed_mid_read() {
    let (address, server) = spawn_server(|mut stream| {
        let _: ResetParam = expect(&mut stream);
        // Announces 100 bytes and sends 3.
        stream.write_all(&100u32.to_be_bytes()).unwrap();
        stream.write_all(b"{\"c").unwrap();
    });

    let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
    match comm.request::<ResetParam, ResetResult>(ResetParam {}) {
        Err(CommError::Connection { source, .. }) => {
            assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof)
        }
        r => panic!("unexpected: {:?}", r),
    }

    server.join().unwrap();
}

#[test]
fn test_unreachable_peer() {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().to_string()
    };
    assert!(matches!(
        Communicator::connect(&address, TIMEOUT),
        Err(CommError::Connection { .. })
    ));
}

#[test]
fn test_close_on_drop() {
    let (address, server) = spawn_server(|mut stream| {
        let _: InfoParam = expect(&mut stream);
        reply(&mut stream, &discrete_info(2, 1));
        let err = frame::read_frame(&mut stream).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    });

    {
        let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
        let _: InfoResult = comm.request(InfoParam {}).unwrap();
    }

    server.join().unwrap();
}

#[test]
#[should_panic(expected = "while the response to 'reset' is pending")]
fn test_send_while_pending() {
    let (address, _server) = spawn_server(|mut stream| {
        let _ = frame::read_frame(&mut stream);
    });

    let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
    comm.send_request(&Request::new(ResetParam {})).unwrap();
    let _ = comm.send_request(&Request::new(ResetParam {}));
}

#[test]
#[should_panic(expected = "without a pending request")]
fn test_response_without_request() {
    let (address, _server) = spawn_server(|_stream| {});

    let mut comm = Communicator::connect(&address, TIMEOUT).unwrap();
    let _ = comm.get_response::<MakeResult>();
}
