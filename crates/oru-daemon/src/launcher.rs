//! Entry point shared by the daemon binaries.

use std::ffi::OsString;

use oru_config::AppConfig;
use tracing::{error, info_span};

use crate::args::{DaemonArgs, StartMode, usage};
use crate::{DaemonError, ReturnCode, Role, Supervisor, logging};

/// Parse `args`, load configuration, set up logging and run the daemon
/// called `name` with the role built by `make_role`.
///
/// `args` includes the program name. The role is only constructed once the
/// arguments and configuration are known to be valid.
pub fn launch<I, T, R, F>(name: &str, args: I, make_role: F) -> ReturnCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    R: Role,
    F: FnOnce(&AppConfig) -> R,
{
    let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
    if argv.is_empty() {
        println!("incorrect incoming parameters");
        return ReturnCode::BadArguments;
    }

    let parsed = DaemonArgs::parse_from_args(argv).unwrap_or_default();
    let mode = parsed.start_mode();
    if mode == StartMode::Unknown {
        println!("{}", usage(name));
        return ReturnCode::BadArguments;
    }

    let config = match AppConfig::load_or_default(parsed.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            let e = DaemonError::from(e);
            eprintln!("{name}: {e}");
            return e.return_code();
        }
    };

    if let Err(e) = logging::init(&config.logging, parsed.verbose) {
        eprintln!("{name}: {e}");
        return e.return_code();
    }

    let span = info_span!("daemon", name);
    let _enter = span.enter();

    let mut supervisor = Supervisor::new(name, &config, make_role(&config));
    let code = supervisor.start(mode);
    if !code.is_ok() {
        error!(code = %code, mode = %mode, "Daemon exited");
    }
    code
}
