// File: eventscrub-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for one-shot scrubbing of serialized events.
//!
//! These take a JSON document as text, run it through a scrubber built from a
//! `ScrubConfig`, and hand back the serialized result. Used by the CLI and
//! handy in tests.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::ScrubConfig;
use crate::telemetry::MetricsSnapshot;

/// Output layout for headless scrubbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Compact,
    Pretty,
}

/// Result of a headless run: the scrubbed document plus what went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrubReport {
    pub output: String,
    pub rules_applied: usize,
    pub failures: MetricsSnapshot,
}

/// Scrubs a JSON event and reports failures seen during the run.
///
/// # Arguments
///
/// * `config` - The merged `ScrubConfig` (defaults + optional user rules).
/// * `input` - The event, serialized as JSON.
/// * `style` - Compact or pretty output.
pub fn headless_scrub_with_report(config: &ScrubConfig, input: &str, style: OutputStyle) -> Result<ScrubReport> {
    let scrubber = config.build_scrubber().context("Failed to compile scrub rules")?;
    let mut event: Value = serde_json::from_str(input).context("Input is not valid JSON")?;

    let before = scrubber.metrics().snapshot();
    scrubber.scrub_event(&mut event);
    let failures = scrubber.metrics().snapshot().since(&before);

    let output = match style {
        OutputStyle::Compact => serde_json::to_string(&event),
        OutputStyle::Pretty => serde_json::to_string_pretty(&event),
    }
    .context("Failed to serialize scrubbed event")?;

    Ok(ScrubReport {
        output,
        rules_applied: scrubber.rules().len(),
        failures,
    })
}

/// Scrubs a JSON event and returns it compactly serialized.
pub fn headless_scrub_str(config: &ScrubConfig, input: &str) -> Result<String> {
    Ok(headless_scrub_with_report(config, input, OutputStyle::Compact)?.output)
}

/// Like [`headless_scrub_str`], with indented output.
pub fn headless_scrub_str_pretty(config: &ScrubConfig, input: &str) -> Result<String> {
    Ok(headless_scrub_with_report(config, input, OutputStyle::Pretty)?.output)
}
