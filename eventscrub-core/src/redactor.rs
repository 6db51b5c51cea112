// eventscrub-core/src/redactor.rs
//! Defines the `Redactor` trait, the value-to-value contract every scrub rule
//! plugs into.
//!
//! A redactor receives the current value found under a rule's final key and
//! returns its replacement. Redactors should be pure. They are allowed to
//! fail: the scrubber swaps the value for an error marker and keeps going.
//!
//! License: MIT OR APACHE 2.0

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::RedactError;

/// A value-to-value masking function with a stable name.
///
/// The name is what shows up in failure logs, so it should identify the
/// redactor well enough to find the rule that uses it.
pub trait Redactor: Send + Sync {
    fn name(&self) -> &str;

    fn redact(&self, value: &Value) -> Result<Value, RedactError>;
}

/// Shared handle to a redactor, as stored in rules.
pub type SharedRedactor = Arc<dyn Redactor>;

/// Adapts a closure into a [`Redactor`].
pub struct FnRedactor<F> {
    name: String,
    func: F,
}

impl<F> FnRedactor<F>
where
    F: Fn(&Value) -> Result<Value, RedactError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self { name: name.into(), func }
    }
}

impl<F> Redactor for FnRedactor<F>
where
    F: Fn(&Value) -> Result<Value, RedactError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn redact(&self, value: &Value) -> Result<Value, RedactError> {
        (self.func)(value)
    }
}

impl<F> fmt::Debug for FnRedactor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRedactor").field("name", &self.name).finish()
    }
}

/// Wraps a closure into a shared redactor in one step.
pub fn redactor_fn<F>(name: impl Into<String>, func: F) -> SharedRedactor
where
    F: Fn(&Value) -> Result<Value, RedactError> + Send + Sync + 'static,
{
    Arc::new(FnRedactor::new(name, func))
}
