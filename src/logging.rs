//! Tracing initialization for the binary.
//!
//! Diagnostics go to stderr so they never mix with the summary on stdout.
//! `RUST_LOG` wins when set; otherwise the `-v` count picks the level.

use chrono::Local;
use std::fmt as stdfmt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;

impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global subscriber. Safe to call once per process.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("solovideos={}", level_for(verbosity))));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalHumanTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
