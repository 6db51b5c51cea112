//! errors.rs - Custom error types for the eventscrub-core library.
//!
//! Three families live here: configuration errors raised while building a
//! scrubber, failures reported by individual redactors, and failures raised
//! while walking a rule's path through an event. Only the first ever reaches
//! a caller; the other two are absorbed by the scrubber and turned into
//! telemetry.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// Errors raised while loading, validating or compiling scrub rules.
///
/// `#[non_exhaustive]` so new configuration checks can be added without a
/// breaking change.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScrubError {
    #[error("Invalid key path '{0}': {1}")]
    InvalidPath(String, String),

    #[error("Rule '{0}' needs a non-empty `keys` list or `all_keys: true`")]
    MissingKeys(String),

    #[error("Rule validation failed:\n{0}")]
    Validation(String),

    #[error("Failed to parse rule configuration: {0}")]
    Yaml(#[from] serde_yml::Error),
}

/// A redactor could not produce a replacement for a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedactError {
    /// The value's JSON type is not one the redactor knows how to mask.
    #[error("cannot mask a value of type {0}")]
    UnsupportedShape(&'static str),

    /// A `[name, value]` pair was expected but something else was found.
    #[error("element {0} is not a [name, value] pair")]
    MalformedPair(usize),

    /// A cookie string held a piece without `=`.
    #[error("cookie segment '{0}' has no '='")]
    MalformedCookie(String),

    /// The redactor panicked; the payload message is kept when it is a string.
    #[error("redactor panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Custom(String),
}

/// A rule's walk through an event was abandoned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("rule touched more than {limit} containers")]
    TargetLimitExceeded { limit: usize },

    #[error("walk panicked: {0}")]
    Panicked(String),
}

/// Extracts a printable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_display_messages() {
        let err = ScrubError::MissingKeys("cookies".to_string());
        assert_eq!(
            err.to_string(),
            "Rule 'cookies' needs a non-empty `keys` list or `all_keys: true`"
        );
        assert_eq!(
            TraversalError::TargetLimitExceeded { limit: 3 }.to_string(),
            "rule touched more than 3 containers"
        );
    }
}
