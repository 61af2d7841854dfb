//! Stderr logger for runs driven from a terminal.
//!
//! Each record becomes one line, `[elapsed LEVEL crate] message`. Warnings
//! and errors also carry the `file:line` they were raised from.
//!
//! Install once at startup with [`init_with_level`], or with
//! [`init_from_env`] to let `SCENE_SYNTH_LOG=debug` override the default.
//! Library code only talks to the `log` facade.

use std::io::Write;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable read by [`init_from_env`].
pub const LOG_ENV: &str = "SCENE_SYNTH_LOG";

struct RunLogger {
    level: LevelFilter,
    started: Instant,
}

impl RunLogger {
    fn format(&self, record: &Record) -> String {
        let elapsed = self.started.elapsed().as_secs_f64();
        let krate = record.target().split("::").next().unwrap_or("");
        let mut line = format!(
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            krate,
            record.args()
        );
        if record.level() <= Level::Warn {
            if let (Some(file), Some(n)) = (record.file(), record.line()) {
                line.push_str(&format!(" ({file}:{n})"));
            }
        }
        line
    }
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format(record);
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<RunLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Only the first call installs anything; later calls return `Ok(())`.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| RunLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Level named by `raw` (`"warn"`, `"DEBUG"`, `"off"`, ...), or `default`
/// when unset or unparsable.
pub fn parse_level(raw: Option<&str>, default: LevelFilter) -> LevelFilter {
    raw.map(str::trim)
        .and_then(|s| LevelFilter::from_str(s).ok())
        .unwrap_or(default)
}

/// Install the stderr logger at the level in `SCENE_SYNTH_LOG`, falling
/// back to `default`. Returns the level in effect.
pub fn init_from_env(default: LevelFilter) -> Result<LevelFilter, log::SetLoggerError> {
    let raw = std::env::var(LOG_ENV).ok();
    let level = parse_level(raw.as_deref(), default);
    init_with_level(level)?;
    Ok(level)
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
