//! A minimal stderr backend for the `log` facade.
//!
//! The level is read from the `GSDISAS_LOG` environment variable (`off`, `error`, `warn`,
//! `info`, `debug`, `trace`). Without it the level is `warn`, or `trace` when the crate is
//! built with the `trace_decoding` feature.

use std::env;
use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

pub const LOG_ENV_VAR: &str = "GSDISAS_LOG";

#[cfg(feature = "trace_decoding")]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Trace;
#[cfg(not(feature = "trace_decoding"))]
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

struct StderrLogger;

impl Log for StderrLogger {
  fn enabled(&self, metadata: &Metadata<'_>) -> bool {
    metadata.level() <= log::max_level()
  }

  fn log(&self, record: &Record<'_>) {
    if !self.enabled(record.metadata()) {
      return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    // Nowhere left to report a failed write to stderr.
    let _ = writeln!(handle, "{:<5} {}", record.level(), record.args());
  }

  fn flush(&self) {
    let _ = std::io::stderr().flush();
  }
}

static LOGGER: StderrLogger = StderrLogger;

/// Parses a level name, falling back to the default for anything unrecognised.
pub fn parse_level(text: Option<&str>) -> LevelFilter {
  text.and_then(|t| t.trim().parse::<LevelFilter>().ok())
      .unwrap_or(DEFAULT_LEVEL)
}

/// Installs the logger. Fails if another logger was installed first.
pub fn init() -> Result<(), SetLoggerError> {
  log::set_logger(&LOGGER)?;
  let level = parse_level(env::var(LOG_ENV_VAR).ok().as_deref());
  log::set_max_level(level);
  Ok(())
}
