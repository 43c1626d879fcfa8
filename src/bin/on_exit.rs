//! Taskwarrior on-exit hook: refreshes the stored context filter.
//!
//! Install as `~/.task/hooks/on-exit-need-priority`.

use std::io::{self, Read};

use need::config::Paths;
use need::error::exit_codes;
use need::hooks;
use need::tracker::TaskCli;

fn main() {
    let mut input = String::new();
    let read = io::stdin().read_to_string(&mut input);

    let paths = match Paths::resolve() {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("on-exit-need-priority: {err}");
            std::process::exit(exit_codes::FAILURE);
        }
    };

    need::logging::init_hook(&paths.log_dir, "on-exit.log");
    hooks::install_panic_logger();

    if let Err(err) = read {
        tracing::warn!("reading stdin: {err}");
    }

    let tracker = TaskCli::new(&paths.task_bin);
    std::process::exit(hooks::run_on_exit(&input, &paths.config, &tracker));
}
