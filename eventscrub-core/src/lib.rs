// eventscrub-core/src/lib.rs
//! # eventscrub Core Library
//!
//! `eventscrub-core` redacts sensitive fields from error-report events before
//! they are handed to an error-tracking service. Events are `serde_json::Value`
//! trees whose shape varies from report to report; rules name locations in
//! them with dotted key paths and say how to mask what they find.
//!
//! ## Modules
//!
//! * `path`: `KeyPath` parsing and the resolver that finds target containers.
//! * `redactor`: the `Redactor` trait every masking function implements.
//! * `maskers`: built-in redactors (`Scrub`, cookie and query-string masking).
//! * `scrubber`: the `Scrubber` pipeline and its failure boundaries.
//! * `telemetry`: failure counters and the greppable log marker.
//! * `config`: YAML rule sets, defaults, merging, validation.
//! * `headless`: one-shot scrubbing of serialized events.
//! * `errors`: error types.
//!
//! ## Usage Example
//!
//! ```rust
//! use eventscrub_core::{merge_rules, ScrubConfig};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let user = ScrubConfig::from_yaml_str(
//!         "rules:\n  - path: request.cookies\n    action: scrub_cookies\n    keys: [sessionid]\n",
//!     )?;
//!     let config = merge_rules(ScrubConfig::load_default_rules()?, Some(user));
//!     let scrubber = config.build_scrubber()?;
//!
//!     let event = scrubber.scrub(json!({
//!         "request": {"cookies": "sessionid=abc; lang=en"}
//!     }));
//!     assert_eq!(event["request"]["cookies"], "sessionid=[Scrubbed]; lang=en");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Building a scrubber can fail (`ScrubError`, or `anyhow::Error` when loading
//! files). Scrubbing cannot: redactor and traversal failures are counted in
//! `ScrubMetrics`, logged with the `SCRUBBER_ERROR` marker, and the event is
//! always returned.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod errors;
pub mod headless;
pub mod maskers;
pub mod path;
pub mod redactor;
pub mod scrubber;
pub mod telemetry;

/// Re-exports the rule configuration types and helpers.
pub use config::{merge_rules, parse_rule_path, RuleAction, RuleSpec, ScrubConfig, ScrubSettings};

/// Re-exports the error types.
pub use errors::{RedactError, ScrubError, TraversalError};

/// Re-exports the key path types and resolver entry points.
pub use path::{target_containers, visit_target_containers_mut, KeyPath, Segment, TargetContainers, ARRAY_WILDCARD};

/// Re-exports the redactor contract.
pub use redactor::{redactor_fn, FnRedactor, Redactor, SharedRedactor};

/// Re-exports the built-in redactors.
pub use maskers::{scrub, CookieScrubber, KeySelection, QueryStringScrubber, Scrub, MASK_TEXT};

/// Re-exports the pipeline.
pub use scrubber::{default_rules, Rule, Scrubber, DEFAULT_SCRUB_PATHS, ERROR_MARKER};

/// Re-exports telemetry types.
pub use telemetry::{MetricsSnapshot, ScrubMetrics, LOG_MARKER};

/// Re-exports the one-shot helpers.
pub use headless::{headless_scrub_str, headless_scrub_str_pretty, headless_scrub_with_report, OutputStyle, ScrubReport};
