#![deny(unsafe_code)]

//! `oru-clientd`: the ORU polling client daemon.

use std::process::ExitCode;

use oru_client::ClientRole;

fn main() -> ExitCode {
    oru_daemon::launch(oru_client::DAEMON_NAME, std::env::args_os(), ClientRole::new).into()
}
