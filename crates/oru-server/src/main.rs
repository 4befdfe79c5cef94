#![deny(unsafe_code)]

//! `oru-serverd`: the ORU server daemon.

use std::process::ExitCode;

use oru_server::ServerRole;

fn main() -> ExitCode {
    let code = oru_daemon::launch(oru_server::DAEMON_NAME, std::env::args_os(), |config| {
        ServerRole::new(&config.transport)
    });
    code.into()
}
