// eventscrub/src/cli.rs
//! This file defines the command-line interface (CLI) for the eventscrub
//! application, including all available commands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "eventscrub",
    version = env!("CARGO_PKG_VERSION"),
    about = "Scrub sensitive fields out of error-report events",
    long_about = "eventscrub applies dotted-path scrub rules to a JSON error-report event (for example a crash report about to be sent to an error-tracking service) and writes the redacted event back out. Built-in rules blank out `username` and `password` stack-frame variables; more can be added from a YAML rule file.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress informational output and logging.
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `eventscrub` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrubs a JSON event read from a file or stdin.
    #[command(about = "Scrubs a JSON event read from a file or stdin.")]
    Scrub(ScrubCommand),

    /// Lists the rules that would be applied, in order.
    #[command(about = "Lists the active scrub rules, in evaluation order.")]
    Rules(RulesCommand),
}

/// Where rules come from. Shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct RuleSourceArgs {
    /// Path to a YAML rule file. Defaults to `<config dir>/eventscrub/rules.yaml` when present.
    #[arg(long = "config", value_name = "FILE", env = "EVENTSCRUB_CONFIG", help = "Path to a YAML scrub rule file.")]
    pub config: Option<PathBuf>,

    /// Skip the built-in rules.
    #[arg(long = "no-defaults", help = "Do not load the built-in rules.")]
    pub no_defaults: bool,

    /// Disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Disable these rule names (comma-separated).")]
    pub disable: Vec<String>,
}

/// Arguments for the `scrub` command.
#[derive(Parser, Debug)]
pub struct ScrubCommand {
    /// Path to an input file (reads from stdin if not provided).
    #[arg(long, short = 'i', value_name = "FILE", help = "Read the event from a file instead of stdin.")]
    pub input_file: Option<PathBuf>,

    /// Write the scrubbed event to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write output to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Indent the output JSON.
    #[arg(long, short = 'p', help = "Pretty-print the scrubbed event.")]
    pub pretty: bool,

    /// Exit with a non-zero code if any rule failed while scrubbing.
    #[arg(long = "fail-on-error", help = "Exit with code 2 if any redactor or traversal failure occurred.")]
    pub fail_on_error: bool,

    #[command(flatten)]
    pub rules: RuleSourceArgs,
}

/// Arguments for the `rules` command.
#[derive(Parser, Debug)]
pub struct RulesCommand {
    /// Print the rules as JSON instead of a table.
    #[arg(long = "json", help = "Print the active rules as JSON.")]
    pub json: bool,

    #[command(flatten)]
    pub rules: RuleSourceArgs,
}
