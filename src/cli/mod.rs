//! Command-line interface layer: argument definitions, command dispatch and
//! report rendering.

pub mod args;
pub mod exit_status;
pub mod report;
mod run;

use anyhow::Result;

pub use args::{Arguments, Command, OutputFormat};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}
