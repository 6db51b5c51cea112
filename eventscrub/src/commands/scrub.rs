// eventscrub/src/commands/scrub.rs
//! `eventscrub scrub`: read an event, scrub it, write it out.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Read, Write};

use eventscrub_core::{headless_scrub_with_report, OutputStyle, ScrubReport};

use crate::cli::ScrubCommand;
use crate::commands::load_config;
use crate::ui::output_format;

/// Exit code used by `--fail-on-error` when a rule failed.
pub const FAILURE_EXIT_CODE: i32 = 2;

/// Runs the command and returns the report so the caller can pick an exit code.
pub fn run_scrub(cmd: &ScrubCommand, quiet: bool) -> Result<ScrubReport> {
    info!("Starting scrub operation.");
    let config = load_config(&cmd.rules)?;

    let input = read_input(cmd)?;
    let style = if cmd.pretty { OutputStyle::Pretty } else { OutputStyle::Compact };
    let report = headless_scrub_with_report(&config, &input, style)?;
    debug!(
        "Event scrubbed with {} rule(s). Input length: {}, output length: {}",
        report.rules_applied,
        input.len(),
        report.output.len()
    );

    write_output(cmd, &report.output)?;

    if !quiet {
        print_summary(&report)?;
    }

    info!("Scrub operation completed.");
    Ok(report)
}

/// Whether the run should end with [`FAILURE_EXIT_CODE`].
pub fn should_fail(cmd: &ScrubCommand, report: &ScrubReport) -> bool {
    cmd.fail_on_error && report.failures.total() > 0
}

fn read_input(cmd: &ScrubCommand) -> Result<String> {
    match &cmd.input_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(cmd: &ScrubCommand, output: &str) -> Result<()> {
    match &cmd.output {
        Some(path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            writeln!(file, "{}", output)?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            writeln!(writer, "{}", output)?;
        }
    }
    Ok(())
}

fn print_summary(report: &ScrubReport) -> Result<()> {
    let mut stderr = io::stderr();
    let colors = stderr.is_terminal();
    let failures = report.failures;

    if failures.total() == 0 {
        output_format::print_info_message(
            &mut stderr,
            &format!("Applied {} rule(s) with no failures.", report.rules_applied),
            colors,
        )?;
    } else {
        output_format::print_warn_message(
            &mut stderr,
            &format!(
                "Applied {} rule(s): {} redactor failure(s), {} traversal failure(s). Search the log for SCRUBBER_ERROR.",
                report.rules_applied, failures.redactor_errors, failures.traversal_errors
            ),
            colors,
        )?;
    }
    Ok(())
}
