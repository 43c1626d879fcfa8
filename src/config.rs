//! Configuration store for `need.rc`
//!
//! The file is a flat list of `key=value` lines with no sections or escaping.
//! Reads take the first matching line. Writes replace the first matching line
//! in place or append a new one, leaving every other line untouched.
//! Duplicate keys are tolerated (later ones are simply shadowed).

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::filter;
use crate::lock::{self, FileLock, DEFAULT_LOCK_TIMEOUT_MS};

/// Recognized keys
pub mod keys {
    pub const SPAN: &str = "priority.span";
    pub const LOOKAHEAD: &str = "priority.lookahead";
    pub const LOOKBACK: &str = "priority.lookback";
    pub const CONTEXT_READ: &str = "context.need.read";
}

pub const DEFAULT_SPAN: u8 = 2;
pub const DEFAULT_LOOKAHEAD: &str = "2d";
pub const DEFAULT_LOOKBACK: &str = "1w";

/// Environment overrides for file locations
pub const CONFIG_ENV: &str = "NEED_RC";
pub const LOG_DIR_ENV: &str = "NEED_LOG_DIR";
pub const TASK_BIN_ENV: &str = "NEED_TASK_BIN";

/// In-memory view of `need.rc`, loaded once per invocation.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    lines: Vec<String>,
    exists: bool,
}

impl ConfigStore {
    /// Load the store from disk. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut store = Self::from_content(path, &content);
                store.exists = true;
                Ok(store)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self {
                path: path.to_path_buf(),
                lines: Vec::new(),
                exists: false,
            }),
            Err(err) => Err(Error::Io(err)),
        }
    }

    /// Build a store from raw file content (not backed by disk).
    pub fn from_content(path: impl AsRef<Path>, content: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines: content.lines().map(str::to_string).collect(),
            exists: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the store was read from an existing file.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Value of the first line for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .find_map(|line| value_for(line, key))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// All `key=value` pairs in file order, duplicates included.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            trimmed.split_once('=')
        })
    }

    /// Replace the first line for `key`, or append one.
    ///
    /// Returns `true` if the file content changed.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let new_line = format!("{key}={value}");
        match self
            .lines
            .iter()
            .position(|line| value_for(line, key).is_some())
        {
            Some(idx) => {
                if self.lines[idx] == new_line {
                    return false;
                }
                self.lines[idx] = new_line;
            }
            None => self.lines.push(new_line),
        }
        true
    }

    /// Serialized file content.
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Write the store back atomically. Callers coordinating with other
    /// processes should go through [`ConfigStore::update_locked`].
    pub fn save(&self) -> Result<()> {
        lock::write_atomic_str(&self.path, &self.render())
    }

    /// Read-modify-write under an exclusive lock on `<path>.lock`.
    ///
    /// The file is re-read after the lock is taken so concurrent hook runs
    /// cannot lose each other's updates. The file must already exist.
    pub fn update_locked<R>(
        path: impl AsRef<Path>,
        update: impl FnOnce(&mut ConfigStore) -> R,
    ) -> Result<R> {
        let path = path.as_ref();
        let _lock = FileLock::acquire(lock::lock_path_for(path), DEFAULT_LOCK_TIMEOUT_MS)?;

        let mut store = Self::load(path)?;
        if !store.exists {
            return Err(Error::ConfigNotFound(path.to_path_buf()));
        }

        let result = update(&mut store);
        store.save()?;
        Ok(result)
    }

    /// Locked single-key update.
    pub fn set_locked(path: impl AsRef<Path>, key: &str, value: &str) -> Result<bool> {
        Self::update_locked(path, |store| store.set(key, value))
    }
}

fn value_for<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.trim()
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix('='))
}

/// Typed view of the window settings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Settings {
    pub span: u8,
    pub lookahead: String,
    pub lookback: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            span: DEFAULT_SPAN,
            lookahead: DEFAULT_LOOKAHEAD.to_string(),
            lookback: DEFAULT_LOOKBACK.to_string(),
        }
    }
}

impl Settings {
    /// Read settings, degrading invalid values to their defaults.
    pub fn from_store(store: &ConfigStore) -> Self {
        let span = match store.get(keys::SPAN) {
            None => DEFAULT_SPAN,
            Some(raw) => parse_span(raw).unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring {}", keys::SPAN);
                DEFAULT_SPAN
            }),
        };

        Self {
            span,
            lookahead: offset_or_default(store, keys::LOOKAHEAD, DEFAULT_LOOKAHEAD),
            lookback: offset_or_default(store, keys::LOOKBACK, DEFAULT_LOOKBACK),
        }
    }
}

fn offset_or_default(store: &ConfigStore, key: &str, default: &str) -> String {
    match store.get(key) {
        None => default.to_string(),
        Some(raw) => filter::normalize_offset(raw).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring {key}");
            default.to_string()
        }),
    }
}

/// Parse a span value, which must be within 1..=6.
pub fn parse_span(raw: &str) -> Result<u8> {
    let raw = raw.trim();
    match raw.parse::<u8>() {
        Ok(span) if (1..=6).contains(&span) => Ok(span),
        _ => Err(Error::InvalidArgument(format!(
            "Invalid span value: {raw} (expected 1-6)"
        ))),
    }
}

/// File locations used by the CLI and hooks.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub log_dir: PathBuf,
    pub task_bin: PathBuf,
}

impl Paths {
    /// Resolve locations from the environment, falling back to `~/.task`.
    pub fn resolve() -> Result<Self> {
        let task_dir = || -> Result<PathBuf> {
            directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join(".task"))
                .ok_or_else(|| {
                    Error::InvalidConfig("cannot determine home directory".to_string())
                })
        };

        let config = match env_path(CONFIG_ENV) {
            Some(path) => path,
            None => task_dir()?.join("config").join("need.rc"),
        };
        let log_dir = match env_path(LOG_DIR_ENV) {
            Some(path) => path,
            None => task_dir()?.join("logs").join("need-priority"),
        };
        let task_bin = env_path(TASK_BIN_ENV).unwrap_or_else(|| PathBuf::from("task"));

        Ok(Self {
            config,
            log_dir,
            task_bin,
        })
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
