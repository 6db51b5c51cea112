// eventscrub-core/src/scrubber.rs
//! The scrubber pipeline.
//!
//! A [`Scrubber`] holds an ordered list of [`Rule`]s. Scrubbing an event runs
//! every rule in turn: the rule's path is resolved against the event and the
//! rule's redactor replaces the value under the final key of each container
//! found.
//!
//! The pipeline does not fail. Two boundaries keep one bad rule from costing
//! the whole report:
//!
//! * around each redactor call: an error or panic replaces the value with
//!   [`ERROR_MARKER`] and bumps the redactor-failure counter;
//! * around each rule's walk: a traversal error or panic abandons the rest of
//!   that rule, bumps the traversal-failure counter, and moves on.
//!
//! Either way the event is handed back, partially redacted if need be.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use crate::errors::{panic_message, RedactError, TraversalError};
use crate::maskers::Scrub;
use crate::path::{visit_target_containers_mut, KeyPath};
use crate::redactor::SharedRedactor;
use crate::telemetry::ScrubMetrics;

/// Written in place of a value whose redactor failed.
pub const ERROR_MARKER: &str = "ERROR WHEN SCRUBBING";

/// Paths blanked out by [`default_rules`]: local variables in stack frames.
pub const DEFAULT_SCRUB_PATHS: [&str; 2] = [
    "exception.values.[].stacktrace.frames.[].vars.username",
    "exception.values.[].stacktrace.frames.[].vars.password",
];

/// A path paired with the redactor applied to whatever it points at.
#[derive(Clone)]
pub struct Rule {
    name: Option<String>,
    path: KeyPath,
    redactor: SharedRedactor,
}

impl Rule {
    pub fn new(path: KeyPath, redactor: SharedRedactor) -> Self {
        Self { name: None, path, redactor }
    }

    /// Builds a rule from a dotted path such as `request.cookies`.
    pub fn parse(dotted: &str, redactor: SharedRedactor) -> Self {
        Self::new(KeyPath::parse(dotted), redactor)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn redactor(&self) -> &SharedRedactor {
        &self.redactor
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("path", &self.path.to_string())
            .field("redactor", &self.redactor.name())
            .finish()
    }
}

/// The built-in rule set: blank out `username` and `password` frame variables.
pub fn default_rules() -> Vec<Rule> {
    DEFAULT_SCRUB_PATHS
        .iter()
        .map(|dotted| Rule::parse(dotted, Arc::new(Scrub)))
        .collect()
}

/// Ordered rule pipeline for outbound error-report events.
#[derive(Debug, Clone)]
pub struct Scrubber {
    rules: Vec<Rule>,
    metrics: Arc<ScrubMetrics>,
    max_targets: Option<usize>,
}

impl Default for Scrubber {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Scrubber {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            metrics: Arc::new(ScrubMetrics::new()),
            max_targets: None,
        }
    }

    /// Builds a scrubber from `(dotted_path, redactor)` pairs, in order.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, SharedRedactor)>,
        S: AsRef<str>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(dotted, redactor)| Rule::parse(dotted.as_ref(), redactor))
                .collect(),
        )
    }

    /// Shares failure counters with other scrubbers or with the caller.
    pub fn with_metrics(mut self, metrics: Arc<ScrubMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Caps the containers one rule may touch per event. Unlimited unless set.
    pub fn with_max_targets(mut self, max_targets: usize) -> Self {
        self.max_targets = Some(max_targets);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn metrics(&self) -> &Arc<ScrubMetrics> {
        &self.metrics
    }

    pub fn max_targets(&self) -> Option<usize> {
        self.max_targets
    }

    /// Runs every rule against `event` in place and returns it.
    pub fn scrub_event<'e>(&self, event: &'e mut Value) -> &'e mut Value {
        for rule in &self.rules {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.apply_rule(&mut *event, rule)));
            let path = rule.path.to_string();

            match outcome {
                Ok(Ok(touched)) => {
                    debug!("Rule '{}' touched {} container(s).", path, touched);
                }
                Ok(Err(err)) => self.metrics.record_traversal_error(&path, &err),
                Err(payload) => {
                    let err = TraversalError::Panicked(panic_message(payload.as_ref()));
                    self.metrics.record_traversal_error(&path, &err);
                }
            }
        }
        event
    }

    /// Owning form of [`Scrubber::scrub_event`].
    pub fn scrub(&self, mut event: Value) -> Value {
        self.scrub_event(&mut event);
        event
    }

    /// Pre-send hook for error-report SDKs: `(event, hint) -> Option<event>`.
    ///
    /// Always `Some`; `None` would tell the SDK to drop the report.
    pub fn before_send<H: ?Sized>(&self, event: Value, _hint: &H) -> Option<Value> {
        Some(self.scrub(event))
    }

    /// Turns the scrubber into a callback suitable for SDK registration.
    pub fn into_before_send<H: ?Sized>(self) -> impl Fn(Value, &H) -> Option<Value> + Send + Sync {
        move |event: Value, hint: &H| self.before_send(event, hint)
    }

    fn apply_rule(&self, event: &mut Value, rule: &Rule) -> Result<usize, TraversalError> {
        let Some(final_key) = rule.path.final_key() else {
            return Ok(0);
        };
        let mut touched = 0usize;

        visit_target_containers_mut(event, &rule.path, &mut |container: &mut Map<String, Value>| {
            if let Some(limit) = self.max_targets.filter(|&limit| touched == limit) {
                return Err(TraversalError::TargetLimitExceeded { limit });
            }
            touched += 1;

            if let Some(slot) = container.get_mut(final_key) {
                *slot = self.redact_value(rule, slot);
            }
            Ok(())
        })?;

        Ok(touched)
    }

    fn redact_value(&self, rule: &Rule, value: &Value) -> Value {
        let redactor = rule.redactor.as_ref();
        let result = panic::catch_unwind(AssertUnwindSafe(|| redactor.redact(value)))
            .unwrap_or_else(|payload| Err(RedactError::Panicked(panic_message(payload.as_ref()))));

        match result {
            Ok(redacted) => redacted,
            Err(err) => {
                self.metrics
                    .record_redactor_error(redactor.name(), &rule.path.to_string(), &err);
                Value::String(ERROR_MARKER.to_string())
            }
        }
    }
}
