// eventscrub/src/main.rs
//! eventscrub entry point.
//!
//! Parses arguments, sets up logging, and dispatches to the command modules.

use anyhow::Result;
use clap::Parser;
use is_terminal::IsTerminal;
use std::io;
use std::process::ExitCode;

use eventscrub::cli::{Cli, Commands};
use eventscrub::commands::{rules, scrub};
use eventscrub::logger;
use eventscrub::ui::output_format;

fn run(args: &Cli) -> Result<ExitCode> {
    match &args.command {
        Commands::Scrub(cmd) => {
            let report = scrub::run_scrub(cmd, args.quiet)?;
            if scrub::should_fail(cmd, &report) {
                return Ok(ExitCode::from(scrub::FAILURE_EXIT_CODE as u8));
            }
        }
        Commands::Rules(cmd) => {
            let stdout = io::stdout();
            rules::run_rules(cmd, &mut stdout.lock())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = Cli::parse();
    logger::init_logger(logger::level_for_flags(args.quiet, args.debug));

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            let mut stderr = io::stderr();
            let colors = stderr.is_terminal();
            let _ = output_format::print_error_message(&mut stderr, &format!("{:#}", e), colors);
            ExitCode::FAILURE
        }
    }
}
