//! Fuzz target for the TOML configuration parser.
//!
//! Run with: cargo +nightly fuzz run fuzz_config_parser
//!
//! Feeds arbitrary text to `AppConfig::parse()` to find panics or hangs in
//! TOML parsing and validation, including the socket path length checks.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = oru_config::AppConfig::parse(s) {
            // Anything that parses must also pass validation on its own.
            assert!(config.validate().is_ok());
            let _ = config.daemon.pid_file_path("Server");
        }
    }
});
