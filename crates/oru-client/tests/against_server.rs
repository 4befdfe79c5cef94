//! The client role talking to a real server role over a temp socket.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nix::sys::signal::Signal;
use oru_client::ClientRole;
use oru_config::ClientRequest;
use oru_daemon::{DaemonError, ReturnCode, ShutdownState, Supervisor};
use oru_server::ServerRole;
use oru_test_utils::{TestConfigBuilder, TestEnv};
use oru_wire::{Message, MessageKind, STATUS_PROCESSING};
use pretty_assertions::assert_eq;

fn spawn_server(env: &TestEnv) -> (Arc<ShutdownState>, JoinHandle<Result<(), DaemonError>>) {
    let mut sup = Supervisor::new("Server", &env.config, ServerRole::new(&env.config.transport));
    let shutdown = Arc::clone(sup.shutdown());
    let handle = thread::spawn(move || sup.run_loop());

    let deadline = Instant::now() + Duration::from_secs(5);
    while !env.socket_path().exists() {
        assert!(Instant::now() < deadline, "server socket never appeared");
        thread::sleep(Duration::from_millis(5));
    }
    // bind() creates the file just before listen().
    thread::sleep(Duration::from_millis(20));
    (shutdown, handle)
}

#[test_log::test]
fn test_pings_are_answered_in_sequence() {
    let env = TestEnv::new();
    let (server_stop, server) = spawn_server(&env);

    let mut client = ClientRole::new(&env.config);
    for expected_seq in 0..3 {
        let reply = client.exchange().unwrap().unwrap();
        assert_eq!(reply.kind(), Some(MessageKind::Pong));
        assert_eq!(reply.seq_num(), expected_seq);
    }

    server_stop.request_stop(Signal::SIGTERM);
    server.join().unwrap().unwrap();
}

#[test]
fn test_status_poll_reports_processing() {
    oru_test_utils::init_test_tracing();
    let mut env = TestEnv::new();
    env.config = TestConfigBuilder::new()
        .runtime_dir(env.path())
        .socket_path(env.path().join("status.sock"))
        .accept_timeout_ms(50)
        .poll_interval_secs(0)
        .request(ClientRequest::Status)
        .build();
    let (server_stop, server) = spawn_server(&env);

    let mut client = ClientRole::new(&env.config);
    let reply = client.exchange().unwrap().unwrap();
    assert_eq!(
        reply,
        Message::resp_status(Message::req_status(0).header(), STATUS_PROCESSING)
    );

    server_stop.request_stop(Signal::SIGTERM);
    server.join().unwrap().unwrap();
}

#[test]
fn test_client_loop_runs_until_stopped() {
    let env = TestEnv::new();
    let (server_stop, server) = spawn_server(&env);

    let mut client = Supervisor::new("Client", &env.config, ClientRole::new(&env.config));
    let client_stop = Arc::clone(client.shutdown());
    let handle = thread::spawn(move || client.run_loop());

    thread::sleep(Duration::from_millis(100));
    client_stop.request_stop(Signal::SIGINT);
    handle.join().unwrap().unwrap();

    server_stop.request_stop(Signal::SIGTERM);
    server.join().unwrap().unwrap();
}

#[test]
fn test_client_loop_ends_when_server_is_absent() {
    let env = TestEnv::new();
    let mut client = Supervisor::new("Client", &env.config, ClientRole::new(&env.config));

    let err = client.run_loop().unwrap_err();
    assert_eq!(err.return_code(), ReturnCode::Failed);
}
