//! Tracing setup for the CLI and the hooks.
//!
//! The CLI logs to stderr only when `RUST_LOG` asks for it. Hooks always log
//! to an append-only file, because their stdout/stderr belong to Taskwarrior.
//! A log file that cannot be opened is reported once on stderr and otherwise
//! ignored.

use std::path::Path;

use anyhow::Context as _;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` filter, or `default` if unset or unusable.
fn env_filter(default: &str) -> EnvFilter {
    // Keep startup robust: ignore invalid/huge filters.
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new(default))
}

/// Opt-in stderr logging for the `need` CLI.
pub fn init_cli() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter("off"))
        .try_init();
}

/// Timestamped file logging for a hook, e.g. `<log dir>/on-add.log`.
pub fn init_hook(log_dir: &Path, file_name: &str) {
    let writer = match hook_appender(log_dir, file_name) {
        Ok(appender) => BoxMakeWriter::new(appender),
        Err(err) => {
            eprintln!("LOG ERROR: {err:#}");
            BoxMakeWriter::new(std::io::sink)
        }
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer),
        )
        .with(env_filter("info"))
        .try_init();
}

/// Append-only, never-rotated log file. Writes are synchronous since hooks
/// end with `process::exit`, which skips destructors.
pub fn hook_appender(log_dir: &Path, file_name: &str) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating {}", log_dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(log_dir)
        .with_context(|| format!("opening {}", log_dir.join(file_name).display()))
}
