//! `need span <N>`

use serde::Serialize;

use crate::config::{self, keys, ConfigStore, Paths};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct SpanOptions {
    pub value: Option<String>,
    pub paths: Paths,
    pub output: OutputOptions,
}

#[derive(Serialize)]
struct SpanReport {
    span: u8,
    changed: bool,
    config: String,
}

pub fn run(options: SpanOptions) -> Result<()> {
    let raw = options
        .value
        .ok_or_else(|| Error::InvalidArgument("Usage: need span <N>".to_string()))?;
    // Validate before touching the file so a bad value has no effect.
    let span = config::parse_span(&raw)?;

    let changed = ConfigStore::set_locked(&options.paths.config, keys::SPAN, &span.to_string())?;
    tracing::debug!(span, changed, "span updated");

    let report = SpanReport {
        span,
        changed,
        config: options.paths.config.display().to_string(),
    };
    let mut human = HumanOutput::new(format!("Priority span set to {span}"));
    human.push_next_step("Run 'need auto' to apply changes");

    emit_success(options.output, "span", &report, Some(&human))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn options(config: PathBuf, value: Option<&str>) -> SpanOptions {
        SpanOptions {
            value: value.map(str::to_string),
            paths: Paths {
                config,
                log_dir: PathBuf::from("/nonexistent"),
                task_bin: PathBuf::from("task"),
            },
            output: OutputOptions {
                json: false,
                quiet: true,
            },
        }
    }

    #[test]
    fn sets_span() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("need.rc");
        fs::write(&config, "priority.span=2\npriority.1.auto=+urgent\n").unwrap();

        run(options(config.clone(), Some("3"))).expect("span");
        assert_eq!(
            fs::read_to_string(&config).unwrap(),
            "priority.span=3\npriority.1.auto=+urgent\n"
        );
    }

    #[test]
    fn out_of_range_leaves_config_alone() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("need.rc");
        fs::write(&config, "priority.span=2\n").unwrap();

        for bad in ["7", "0", "x"] {
            let err = run(options(config.clone(), Some(bad))).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{bad}");
        }
        assert!(matches!(
            run(options(config.clone(), None)).unwrap_err(),
            Error::InvalidArgument(_)
        ));
        assert_eq!(fs::read_to_string(&config).unwrap(), "priority.span=2\n");
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(options(dir.path().join("need.rc"), Some("3"))).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
