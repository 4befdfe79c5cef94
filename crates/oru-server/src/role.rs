use std::io::{ErrorKind, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::socket::{
    AddressFamily, Backlog, SockFlag, SockType, UnixAddr, bind, listen, socket,
};
use oru_config::TransportConfig;
use oru_daemon::{DaemonError, Role, ShutdownState};
use oru_wire::MAX_MESSAGE_LEN;
use tracing::{debug, info, warn};

use crate::dispatch;

/// How often a waiting accept re-checks the clock and the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Serves one connection per `core` call on a Unix stream socket.
pub struct ServerRole {
    socket_path: PathBuf,
    backlog: i32,
    accept_timeout: Option<Duration>,
    io_timeout: Option<Duration>,
    listener: Option<UnixListener>,
}

impl ServerRole {
    pub fn new(transport: &TransportConfig) -> Self {
        Self {
            socket_path: PathBuf::from(&transport.socket_path),
            backlog: transport.backlog,
            accept_timeout: transport.accept_timeout(),
            io_timeout: transport.io_timeout(),
            listener: None,
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Wait for a connection until one arrives, the accept timeout passes,
    /// or a stop is requested.
    fn accept(
        &self,
        listener: &UnixListener,
        shutdown: &ShutdownState,
    ) -> std::io::Result<Option<UnixStream>> {
        let deadline = self.accept_timeout.and_then(|t| Instant::now().checked_add(t));
        loop {
            match listener.accept() {
                Ok((stream, _)) => return Ok(Some(stream)),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
                Err(e) => return Err(e),
            }
            if !shutdown.is_running() || deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(None);
            }
            thread::sleep(ACCEPT_POLL_INTERVAL);
        }
    }

    /// Read one request, answer it, and let the stream close on drop.
    fn serve_connection(&self, mut stream: UnixStream) {
        if let Err(e) = self.prepare_stream(&stream) {
            warn!(error = %e, "Failed to configure connection");
            return;
        }

        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let received = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "Failed to read request");
                return;
            }
        };
        info!("Received {received} bytes");

        let reply = match dispatch::respond(&buf[..received]) {
            Ok(Some(reply)) => reply,
            Ok(None) => return,
            Err(e) => {
                warn!(bytes = received, error = %e, "Dropping malformed request");
                return;
            }
        };

        let bytes = reply.encode();
        match stream.write_all(&bytes) {
            Ok(()) => debug!(kind = ?reply.kind(), seq = reply.seq_num(), "Sent reply"),
            Err(e) => warn!(bytes = bytes.len(), error = %e, "Failed to send reply"),
        }
    }

    fn prepare_stream(&self, stream: &UnixStream) -> std::io::Result<()> {
        // Some platforms hand out accepted sockets with the listener's
        // non-blocking flag.
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(self.io_timeout)?;
        stream.set_write_timeout(self.io_timeout)
    }
}

impl Role for ServerRole {
    fn create_communication_services(&mut self) -> Result<(), DaemonError> {
        remove_socket_file(&self.socket_path)?;
        let listener = bind_listener(&self.socket_path, self.backlog)?;
        listener
            .set_nonblocking(true)
            .map_err(|e| DaemonError::io("set listener non-blocking", e))?;
        info!(
            path = %self.socket_path.display(),
            backlog = self.backlog,
            "Listening"
        );
        self.listener = Some(listener);
        Ok(())
    }

    fn destroy_communication_services(&mut self) {
        if self.listener.take().is_some() {
            if let Err(e) = remove_socket_file(&self.socket_path) {
                warn!(error = %e, "Failed to remove socket file");
            }
            debug!(path = %self.socket_path.display(), "Listener closed");
        }
    }

    fn core(&mut self, shutdown: &ShutdownState) -> Result<(), DaemonError> {
        let Some(listener) = self.listener.as_ref() else {
            return Err(DaemonError::io(
                "accept",
                std::io::Error::new(ErrorKind::NotConnected, "listener not created"),
            ));
        };

        match self.accept(listener, shutdown) {
            Ok(Some(stream)) => {
                self.serve_connection(stream);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                info!(error = %e, "Failed to accept connection");
                Err(DaemonError::io("accept", e))
            }
        }
    }
}

/// Create, bind and listen on a Unix stream socket at `path`.
fn bind_listener(path: &Path, backlog: i32) -> Result<UnixListener, DaemonError> {
    let fd = socket(
        AddressFamily::Unix,
        SockType::Stream,
        SockFlag::empty(),
        None,
    )
    .map_err(|e| DaemonError::errno("socket", e))?;
    let addr = UnixAddr::new(path).map_err(|e| DaemonError::errno("socket address", e))?;
    bind(fd.as_raw_fd(), &addr).map_err(|e| DaemonError::errno("bind", e))?;
    let backlog = Backlog::new(backlog).map_err(|e| DaemonError::errno("listen backlog", e))?;
    listen(&fd, backlog).map_err(|e| DaemonError::errno("listen", e))?;
    Ok(UnixListener::from(fd))
}

fn remove_socket_file(path: &Path) -> Result<(), DaemonError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DaemonError::io(
            format!("remove socket file {}", path.display()),
            e,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oru_wire::{Message, MessageKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn transport(tmp: &TempDir) -> TransportConfig {
        TransportConfig {
            socket_path: tmp.path().join("server.sock").display().to_string(),
            accept_timeout_ms: 50,
            io_timeout_ms: 1000,
            ..TransportConfig::default()
        }
    }

    fn running() -> ShutdownState {
        let state = ShutdownState::new();
        state.begin();
        state
    }

    #[test]
    fn test_create_replaces_stale_socket_file() {
        let tmp = TempDir::new().unwrap();
        let config = transport(&tmp);
        std::fs::write(&config.socket_path, b"stale").unwrap();

        let mut role = ServerRole::new(&config);
        role.create_communication_services().unwrap();
        assert!(role.is_listening());

        role.destroy_communication_services();
        assert!(!role.is_listening());
        assert!(!role.socket_path().exists());
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let config = TransportConfig {
            socket_path: "/nonexistent-dir/oru/server.sock".to_string(),
            ..TransportConfig::default()
        };
        let mut role = ServerRole::new(&config);
        assert!(role.create_communication_services().is_err());
        assert!(!role.is_listening());
    }

    #[test]
    fn test_core_without_listener_fails() {
        let tmp = TempDir::new().unwrap();
        let mut role = ServerRole::new(&transport(&tmp));
        assert!(role.core(&running()).is_err());
    }

    #[test]
    fn test_core_times_out_without_client() {
        let tmp = TempDir::new().unwrap();
        let mut role = ServerRole::new(&transport(&tmp));
        role.create_communication_services().unwrap();

        let started = Instant::now();
        role.core(&running()).unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));

        role.destroy_communication_services();
    }

    #[test]
    fn test_core_returns_at_once_when_stopped() {
        let tmp = TempDir::new().unwrap();
        let config = TransportConfig {
            accept_timeout_ms: 0,
            ..transport(&tmp)
        };
        let mut role = ServerRole::new(&config);
        role.create_communication_services().unwrap();

        // Not begun: the flag reads as stopped.
        role.core(&ShutdownState::new()).unwrap();

        role.destroy_communication_services();
    }

    #[test]
    fn test_ping_round_trip() {
        let tmp = TempDir::new().unwrap();
        let config = TransportConfig {
            accept_timeout_ms: 5000,
            ..transport(&tmp)
        };
        let mut role = ServerRole::new(&config);
        role.create_communication_services().unwrap();

        let path = role.socket_path().to_path_buf();
        let client = thread::spawn(move || {
            let mut stream = UnixStream::connect(path).unwrap();
            stream.write_all(&Message::ping(12).encode()).unwrap();
            let mut reply = Vec::new();
            stream.read_to_end(&mut reply).unwrap();
            reply
        });

        role.core(&running()).unwrap();
        let reply = Message::decode(&client.join().unwrap()).unwrap();
        assert_eq!(reply.kind(), Some(MessageKind::Pong));
        assert_eq!(reply.seq_num(), 12);

        role.destroy_communication_services();
    }
}
