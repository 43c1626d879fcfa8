//! need - priority-tier context for Taskwarrior
//!
//! Reports pending work per need level and defines the `need` context.

use clap::Parser;
use need::cli::Cli;
use need::error::exit_codes;
use need::output::{emit_error, infer_command_name_from_args};

fn main() {
    need::logging::init_cli();

    let command = infer_command_name_from_args();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(exit_codes::FAILURE);
        }
        Err(err) => err.exit(),
    };

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
