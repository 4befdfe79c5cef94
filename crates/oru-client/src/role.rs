use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use oru_config::{AppConfig, ClientRequest};
use oru_daemon::{DaemonError, Role, ShutdownState};
use oru_wire::{MAX_MESSAGE_LEN, Message, STATUS_IDLE, STATUS_PROCESSING};
use tracing::{debug, info, warn};

/// Longest single sleep while pausing, so a stop is noticed promptly.
const PAUSE_SLICE: Duration = Duration::from_millis(50);

/// Polls the server: one request and one reply per `core` call.
pub struct ClientRole {
    socket_path: PathBuf,
    request: ClientRequest,
    poll_interval: Duration,
    io_timeout: Option<Duration>,
    next_seq: u8,
}

impl ClientRole {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            socket_path: PathBuf::from(&config.transport.socket_path),
            request: config.client.request,
            poll_interval: config.client.poll_interval(),
            io_timeout: config.transport.io_timeout(),
            next_seq: 0,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Build the next request, advancing the sequence number (wrapping).
    pub fn next_request(&mut self) -> Message {
        let seq = self.next_seq;
        self.next_seq = seq.wrapping_add(1);
        match self.request {
            ClientRequest::Ping => Message::ping(seq),
            ClientRequest::Status => Message::req_status(seq),
        }
    }

    /// Connect, send one request and read one reply.
    ///
    /// Connect and send failures are errors. A missing, short or
    /// undecodable reply is logged and yields `None`.
    pub fn exchange(&mut self) -> Result<Option<Message>, DaemonError> {
        let mut stream = UnixStream::connect(&self.socket_path).map_err(|e| {
            info!(error = %e, "Failed to create connection to Server");
            DaemonError::io(format!("connect to {}", self.socket_path.display()), e)
        })?;
        stream
            .set_read_timeout(self.io_timeout)
            .and_then(|()| stream.set_write_timeout(self.io_timeout))
            .map_err(|e| DaemonError::io("set socket timeouts", e))?;

        let request = self.next_request();
        stream.write_all(&request.encode()).map_err(|e| {
            info!(error = %e, "Failed to send message to Server");
            DaemonError::io("send request", e)
        })?;
        debug!(kind = ?request.kind(), seq = request.seq_num(), "Sent request");

        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let received = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Failed to read reply");
                return Ok(None);
            }
        };
        info!("Received {received} bytes");
        if received == 0 {
            return Ok(None);
        }

        match Message::decode(&buf[..received]) {
            Ok(reply) => {
                log_reply(&reply);
                Ok(Some(reply))
            }
            Err(e) => {
                warn!(bytes = received, error = %e, "Dropping malformed reply");
                Ok(None)
            }
        }
    }

    /// Sleep for the poll interval, returning early once a stop is requested.
    /// An interval too long to represent as a deadline waits for the stop.
    fn pause(&self, shutdown: &ShutdownState) {
        let deadline = Instant::now().checked_add(self.poll_interval);
        while shutdown.is_running() {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        break;
                    }
                    (deadline - now).min(PAUSE_SLICE)
                }
                None => PAUSE_SLICE,
            };
            thread::sleep(slice);
        }
    }
}

fn log_reply(reply: &Message) {
    let header = reply.header();
    info!(
        version = header.version,
        seq = header.seq_num,
        msg_type = header.msg_type,
        size = header.size,
        status = header.status,
        "Receive message"
    );
    match reply {
        Message::Pong(_) => info!("Receive PONG message"),
        Message::RespStatus { status, .. } => {
            info!(status, state = status_label(*status), "Receive RESP_STATUS message")
        }
        Message::Error(_) => info!("Receive ERROR message"),
        _ => info!("Receive unsupported message"),
    }
}

fn status_label(status: u8) -> &'static str {
    match status {
        STATUS_IDLE => "idle",
        STATUS_PROCESSING => "processing",
        _ => "unknown",
    }
}

impl Role for ClientRole {
    fn create_communication_services(&mut self) -> Result<(), DaemonError> {
        Ok(())
    }

    fn destroy_communication_services(&mut self) {}

    fn core(&mut self, shutdown: &ShutdownState) -> Result<(), DaemonError> {
        self.exchange()?;
        self.pause(shutdown);
        Ok(())
    }
}
