//! Taskwarrior on-add hook: assigns a need level to new tasks.
//!
//! Install as `~/.task/hooks/on-add-need-priority`.

use std::io::{self, BufRead, Write};

use need::config::Paths;
use need::error::exit_codes;
use need::hooks;
use need::tracker::TaskCli;

/// Echo the task unchanged. A non-zero status would make Taskwarrior
/// reject the add, so only a failed echo exits 1.
fn pass_through(input: &str) -> ! {
    let mut stdout = io::stdout().lock();
    let code = match stdout.write_all(input.as_bytes()).and_then(|()| stdout.flush()) {
        Ok(()) => exit_codes::SUCCESS,
        Err(_) => exit_codes::FAILURE,
    };
    std::process::exit(code);
}

fn main() {
    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input);

    let paths = match Paths::resolve() {
        Ok(paths) => paths,
        Err(err) => {
            // Without paths there is nothing to do but pass the task through.
            eprintln!("on-add-need-priority: {err}");
            pass_through(&input);
        }
    };

    need::logging::init_hook(&paths.log_dir, "on-add.log");
    hooks::install_panic_logger();

    if let Err(err) = read {
        tracing::error!("FATAL ERROR: reading stdin: {err}");
        pass_through(&input);
    }

    let tracker = TaskCli::new(&paths.task_bin);
    let mut stdout = io::stdout().lock();
    let code = hooks::run_on_add(&input, &paths.config, &tracker, &mut stdout);
    std::process::exit(code);
}
