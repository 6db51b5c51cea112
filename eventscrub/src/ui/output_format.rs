// eventscrub/src/ui/output_format.rs
//! Formats status messages written to stderr.
//!
//! Colors are applied only when the caller says the stream supports them.

use std::io::{self, Write};

use owo_colors::OwoColorize;

pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, enable_colors: bool) -> io::Result<()> {
    if enable_colors {
        writeln!(writer, "{} {}", "info:".cyan().bold(), msg)
    } else {
        writeln!(writer, "info: {}", msg)
    }
}

pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, enable_colors: bool) -> io::Result<()> {
    if enable_colors {
        writeln!(writer, "{} {}", "warning:".yellow().bold(), msg)
    } else {
        writeln!(writer, "warning: {}", msg)
    }
}

pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, enable_colors: bool) -> io::Result<()> {
    if enable_colors {
        writeln!(writer, "{} {}", "error:".red().bold(), msg)
    } else {
        writeln!(writer, "error: {}", msg)
    }
}
