// eventscrub/src/lib.rs
//! # eventscrub CLI
//!
//! Command-line front end for `eventscrub-core`: scrub a JSON error-report
//! event with the built-in rules plus an optional YAML rule file, or list the
//! rules that would apply.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
