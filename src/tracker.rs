//! Taskwarrior command adapter.
//!
//! Everything this crate learns about tasks comes from running `task` as a
//! subprocess. Nested invocations always pass `rc.hooks=off` so a hook never
//! re-triggers itself, and every invocation is bounded by a timeout so a
//! wedged tracker cannot hang the user's `task add`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wait_timeout::ChildExt;

use crate::error::{Error, Result};
use crate::priority::{PendingCounts, Priority};
use crate::task::{self, Task};

/// Default bound on a single tracker invocation
pub const DEFAULT_TRACKER_TIMEOUT_MS: u64 = 10_000;

/// Operations this crate needs from the tracker.
pub trait Tracker {
    /// Number of pending tasks at exactly `level`.
    fn count_pending(&self, level: Priority) -> Result<u64>;

    /// All pending tasks.
    fn export_pending(&self) -> Result<Vec<Task>>;

    /// Set one task's priority.
    fn modify_priority(&self, uuid: &str, level: Priority) -> Result<()>;

    /// Create or replace a named context.
    fn define_context(&self, name: &str, filter: &str) -> Result<()>;

    /// Remove a named context.
    fn delete_context(&self, name: &str) -> Result<()>;

    /// Resolved configuration value (`task _get <reference>`), `None` if
    /// empty.
    fn get(&self, reference: &str) -> Result<Option<String>>;
}

/// Pending counts for every level. A failed query counts as zero.
pub fn pending_counts(tracker: &dyn Tracker) -> PendingCounts {
    let mut counts = PendingCounts::default();
    for level in Priority::ALL {
        counts.set(level, count_or_zero(tracker, level));
    }
    counts
}

/// Most urgent level with pending work, querying only as far as needed.
///
/// Same result as [`crate::priority::lowest_pending_level`] over the full
/// counts, but stops at the first non-empty level.
pub fn lowest_pending(tracker: &dyn Tracker, simulated_addition: Option<Priority>) -> Option<Priority> {
    Priority::ALL.into_iter().find(|&level| {
        simulated_addition == Some(level) || count_or_zero(tracker, level) > 0
    })
}

fn count_or_zero(tracker: &dyn Tracker, level: Priority) -> u64 {
    tracker.count_pending(level).unwrap_or_else(|err| {
        tracing::warn!(%err, level = level.level(), "count query failed; treating as 0");
        0
    })
}

/// [`Tracker`] backed by the `task` binary.
#[derive(Debug, Clone)]
pub struct TaskCli {
    program: PathBuf,
    timeout: Duration,
}

struct CommandOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl TaskCli {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            timeout: Duration::from_millis(DEFAULT_TRACKER_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(program = %self.program.display(), ?args, "running tracker");

        let mut child = Command::new(&self.program)
            .arg("rc.hooks=off")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                Error::TrackerUnavailable(format!("cannot run {}: {err}", self.program.display()))
            })?;

        // Drain both pipes while waiting so a chatty child cannot block on a
        // full pipe.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(?args, "tracker timed out");
                return Err(Error::TrackerTimeout(
                    u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                ));
            }
        };

        Ok(CommandOutput {
            status,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        })
    }

    /// Run and require a zero exit status.
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(Error::TrackerFailed(format!(
                "task {} exited with {}: {}",
                args.join(" "),
                output.status,
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn join_reader(handle: JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl Tracker for TaskCli {
    fn count_pending(&self, level: Priority) -> Result<u64> {
        let filter = format!("priority:{level}");
        let stdout = self.run_checked(&[&filter, "status:pending", "count"])?;
        parse_count(&stdout)
    }

    fn export_pending(&self) -> Result<Vec<Task>> {
        let stdout = self.run_checked(&["status:pending", "export"])?;
        task::parse_export(&stdout)
    }

    fn modify_priority(&self, uuid: &str, level: Priority) -> Result<()> {
        let assignment = format!("priority:{level}");
        self.run_checked(&[uuid, "modify", &assignment])?;
        Ok(())
    }

    fn define_context(&self, name: &str, filter: &str) -> Result<()> {
        self.run_checked(&["rc.confirmation=off", "context", "define", name, filter])?;
        Ok(())
    }

    fn delete_context(&self, name: &str) -> Result<()> {
        self.run_checked(&["rc.confirmation=off", "context", "delete", name])?;
        Ok(())
    }

    fn get(&self, reference: &str) -> Result<Option<String>> {
        let stdout = self.run_checked(&["_get", reference])?;
        let value = stdout.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }
}

/// Parse `task ... count` output. Empty output counts as zero.
pub fn parse_count(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse()
        .map_err(|_| Error::TrackerFailed(format!("unparsable count output: {trimmed}")))
}
