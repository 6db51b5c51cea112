// eventscrub/src/logger.rs
//! Logging setup for the `eventscrub` binary.
//!
//! Everything goes through the `log` facade and is printed by `env_logger` on
//! stderr, keeping stdout free for the scrubbed event.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter when neither `RUST_LOG` nor a flag says otherwise. Scrubber
/// failures are logged at `error`, so they stay visible.
pub const DEFAULT_FILTER: &str = "warn";

/// Initializes `env_logger`.
///
/// `level_override` wins over `RUST_LOG`. Calling this twice is harmless; the
/// second call is ignored.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(Target::Stderr);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized; keeping existing configuration.");
    }
}

/// Maps the CLI flags to a level override.
pub fn level_for_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
