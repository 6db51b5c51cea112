//! Configuration management for `eventscrub-core`.
//!
//! This module defines the serializable description of scrub rules, loads it
//! from YAML (the embedded defaults or a user file), merges and validates rule
//! sets, and compiles them into a ready-to-use [`Scrubber`].
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::errors::ScrubError;
use crate::maskers::{CookieScrubber, KeySelection, QueryStringScrubber, Scrub};
use crate::path::{KeyPath, Segment};
use crate::redactor::SharedRedactor;
use crate::scrubber::{Rule, Scrubber};

static DEFAULT_CONFIG: OnceCell<ScrubConfig> = OnceCell::new();

/// Which built-in redactor a rule uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    /// Replace the value with the mask token.
    #[default]
    Scrub,
    /// Mask selected cookies.
    ScrubCookies,
    /// Mask selected query-string parameters.
    ScrubQueryString,
}

impl RuleAction {
    fn needs_keys(self) -> bool {
        matches!(self, RuleAction::ScrubCookies | RuleAction::ScrubQueryString)
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleAction::Scrub => "scrub",
            RuleAction::ScrubCookies => "scrub_cookies",
            RuleAction::ScrubQueryString => "scrub_query_string",
        };
        f.write_str(s)
    }
}

/// A single scrub rule as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleSpec {
    /// Optional identifier, used to disable the rule by name.
    pub name: Option<String>,
    pub description: Option<String>,
    /// Dotted key path; `[]` fans out over arrays.
    pub path: String,
    pub action: RuleAction,
    /// Entries to mask for cookie and query-string actions.
    pub keys: Vec<String>,
    /// Mask every entry for cookie and query-string actions.
    pub all_keys: bool,
}

impl RuleSpec {
    pub fn new(path: impl Into<String>, action: RuleAction) -> Self {
        Self {
            path: path.into(),
            action,
            ..Self::default()
        }
    }

    /// The rule's name, or its path when unnamed.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }

    fn key_selection(&self) -> KeySelection {
        if self.all_keys {
            KeySelection::All
        } else {
            KeySelection::only(self.keys.iter().cloned())
        }
    }

    /// Compiles the spec into a [`Rule`].
    pub fn to_rule(&self) -> Result<Rule, ScrubError> {
        let path = parse_rule_path(&self.path)?;
        if self.action.needs_keys() && !self.all_keys && self.keys.is_empty() {
            return Err(ScrubError::MissingKeys(self.label().to_string()));
        }

        let redactor: SharedRedactor = match self.action {
            RuleAction::Scrub => Arc::new(Scrub),
            RuleAction::ScrubCookies => Arc::new(CookieScrubber::new(self.key_selection())),
            RuleAction::ScrubQueryString => Arc::new(QueryStringScrubber::new(self.key_selection())),
        };

        let rule = Rule::new(path, redactor);
        Ok(match &self.name {
            Some(name) => rule.with_name(name.clone()),
            None => rule,
        })
    }
}

/// Pipeline-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrubSettings {
    /// Upper bound on containers one rule may touch per event. Unset means
    /// no limit.
    pub max_targets_per_rule: Option<usize>,
}

/// Top-level rule file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ScrubConfig {
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub settings: ScrubSettings,
}

impl ScrubConfig {
    /// Loads rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading scrub rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;

        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());
        Ok(config)
    }

    /// Parses and validates rules from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: ScrubConfig = serde_yml::from_str(text).map_err(ScrubError::from)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Loads the built-in rules embedded in the crate. Parsed once per process.
    pub fn load_default_rules() -> Result<Self> {
        let config = DEFAULT_CONFIG.get_or_try_init(|| {
            debug!("Loading default scrub rules from embedded string...");
            let default_yaml = include_str!("../config/default_rules.yaml");
            Self::from_yaml_str(default_yaml).context("Failed to parse default scrub rules")
        })?;

        debug!("Loaded {} default scrub rules.", config.rules.len());
        Ok(config.clone())
    }

    /// Drops the named rules, warning about names that match nothing.
    pub fn set_active_rules(&mut self, disable_rules: &[String]) {
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();
        let known: HashSet<&str> = self.rules.iter().filter_map(|r| r.name.as_deref()).collect();

        for name in disable_set.difference(&known) {
            warn!("Rule '{}' in `disable` list does not exist.", name);
        }

        let before = self.rules.len();
        self.rules
            .retain(|rule| !rule.name.as_deref().is_some_and(|name| disable_set.contains(name)));
        debug!("Active rules after filtering: {} (was {}).", self.rules.len(), before);
    }

    /// Compiles every rule, in order, into a [`Scrubber`].
    pub fn build_scrubber(&self) -> Result<Scrubber, ScrubError> {
        let rules = self
            .rules
            .iter()
            .map(RuleSpec::to_rule)
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Compiled {} scrub rules.", rules.len());

        let scrubber = Scrubber::new(rules);
        Ok(match self.settings.max_targets_per_rule {
            Some(limit) => {
                debug!("Limiting each rule to {} targets.", limit);
                scrubber.with_max_targets(limit)
            }
            None => scrubber,
        })
    }
}

/// Appends user rules after the defaults. User settings win when present.
pub fn merge_rules(default_config: ScrubConfig, user_config: Option<ScrubConfig>) -> ScrubConfig {
    debug!("merge_rules called. Default rules count: {}", default_config.rules.len());

    let mut rules = default_config.rules;
    let mut settings = default_config.settings;

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Appending {} user rules.", user_cfg.rules.len());
        rules.extend(user_cfg.rules);

        if let Some(limit) = user_cfg.settings.max_targets_per_rule {
            debug!("Overriding max_targets_per_rule with user value: {}", limit);
            settings.max_targets_per_rule = Some(limit);
        }
    }

    debug!("Final total rules after merge: {}", rules.len());
    ScrubConfig { rules, settings }
}

/// Parses a dotted path, rejecting shapes that can never match.
pub fn parse_rule_path(dotted: &str) -> Result<KeyPath, ScrubError> {
    let invalid = |reason: &str| ScrubError::InvalidPath(dotted.to_string(), reason.to_string());

    if dotted.is_empty() {
        return Err(invalid("path is empty"));
    }
    let path = KeyPath::parse(dotted);
    if path.segments().iter().any(|s| s.as_str().is_empty()) {
        return Err(invalid("path has an empty segment"));
    }
    if path.segments().last() == Some(&Segment::EachElement) {
        return Err(invalid("path cannot end with `[]`"));
    }
    Ok(path)
}

fn validate_config(config: &ScrubConfig) -> Result<(), ScrubError> {
    let mut names = HashSet::new();
    let mut errors = Vec::new();

    for rule in &config.rules {
        if let Some(name) = &rule.name {
            if name.is_empty() {
                errors.push(format!("Rule at '{}' has an empty `name` field.", rule.path));
            } else if !names.insert(name.as_str()) {
                errors.push(format!("Duplicate rule name found: '{}'.", name));
            }
        }

        if let Err(e) = rule.to_rule() {
            errors.push(e.to_string());
        }

        if !rule.action.needs_keys() && (rule.all_keys || !rule.keys.is_empty()) {
            warn!("Rule '{}': `keys`/`all_keys` are ignored for action '{}'.", rule.label(), rule.action);
        }
    }

    if config.settings.max_targets_per_rule == Some(0) {
        errors.push("`settings.max_targets_per_rule` must be greater than 0.".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ScrubError::Validation(errors.join("\n")))
    }
}
