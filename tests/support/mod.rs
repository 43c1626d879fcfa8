#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Scratch home for one test: a need.rc, a log dir and a fake `task`.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("need.rc")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    pub fn write_config(&self, contents: &str) {
        fs::write(self.config_path(), contents).expect("write need.rc");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("read need.rc")
    }

    fn calls_path(&self) -> PathBuf {
        self.dir.path().join("task-calls.log")
    }

    /// Every argument list the fake `task` was run with, one per line.
    pub fn calls(&self) -> String {
        fs::read_to_string(self.calls_path()).unwrap_or_default()
    }

    /// Install a fake `task` that reports `counts` pending tasks per level
    /// and `export` as the pending export.
    #[cfg(unix)]
    pub fn install_task(&self, counts: [u64; 6], export: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let export_path = self.dir.path().join("export.json");
        fs::write(&export_path, export).expect("write export");

        let mut script = String::from("#!/bin/sh\n");
        script.push_str(&format!("echo \"$*\" >> '{}'\n", self.calls_path().display()));
        script.push_str("case \"$*\" in\n");
        for (idx, count) in counts.iter().enumerate() {
            script.push_str(&format!(
                "  \"rc.hooks=off priority:{} status:pending count\") echo {count} ;;\n",
                idx + 1
            ));
        }
        script.push_str(&format!(
            "  \"rc.hooks=off status:pending export\") cat '{}' ;;\n",
            export_path.display()
        ));
        script.push_str("esac\nexit 0\n");

        let path = self.dir.path().join("task");
        fs::write(&path, script).expect("write fake task");
        let mut perms = fs::metadata(&path).expect("stat").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    /// A command for one of the crate's binaries wired to this workspace.
    pub fn command(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).expect("binary");
        cmd.env("NEED_RC", self.config_path())
            .env("NEED_LOG_DIR", self.log_dir())
            .env("NEED_TASK_BIN", self.dir.path().join("task"))
            .env_remove("RUST_LOG")
            .current_dir(self.dir.path());
        cmd
    }
}
