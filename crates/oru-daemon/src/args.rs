//! Command-line surface shared by every ORU daemon binary.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::DaemonError;

/// How the process was asked to start. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    /// Help requested, no mode given, or unparseable arguments.
    #[default]
    Unknown,
    /// Detach into the background.
    Normal,
    /// Stay attached to the terminal.
    Foreground,
    /// Stop the running instance.
    Quit,
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Normal => "normal",
            Self::Foreground => "foreground",
            Self::Quit => "quit",
        })
    }
}

/// Daemon options. Mode flags override each other; the last one wins.
#[derive(Debug, Clone, Default, Parser)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct DaemonArgs {
    /// Run in the foreground.
    #[arg(short = 'f', long = "fore", overrides_with_all = ["normal", "quit"])]
    pub fore: bool,

    /// Detach and run in the background.
    #[arg(short = 'n', long, overrides_with_all = ["fore", "quit"])]
    pub normal: bool,

    /// Stop the running instance.
    #[arg(short = 'q', long, overrides_with_all = ["fore", "normal"])]
    pub quit: bool,

    /// Show this usage text.
    #[arg(short = 'h', long)]
    pub help: bool,

    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl DaemonArgs {
    /// Parse an argument vector whose first element is the program name.
    pub fn parse_from_args<I, T>(args: I) -> Result<Self, DaemonError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| {
            let rendered = e.to_string();
            DaemonError::BadArguments(rendered.lines().next().unwrap_or_default().to_string())
        })
    }

    pub fn start_mode(&self) -> StartMode {
        if self.help {
            StartMode::Unknown
        } else if self.fore {
            StartMode::Foreground
        } else if self.normal {
            StartMode::Normal
        } else if self.quit {
            StartMode::Quit
        } else {
            StartMode::Unknown
        }
    }
}

/// Usage text printed on bad or missing arguments.
pub fn usage(name: &str) -> String {
    DaemonArgs::command()
        .bin_name(name.to_string())
        .override_usage(format!("{name} [-fnqh] [-c PATH] [-v]"))
        .render_help()
        .to_string()
}
