// eventscrub/src/commands/mod.rs
//! Command implementations and the rule loading they share.

pub mod rules;
pub mod scrub;

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

use eventscrub_core::{merge_rules, ScrubConfig};

use crate::cli::RuleSourceArgs;

/// File name looked up under the user's config directory.
pub const USER_RULES_FILE: &str = "rules.yaml";

/// `<config dir>/eventscrub/rules.yaml`, if the platform has a config dir.
pub fn default_user_rules_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eventscrub").join(USER_RULES_FILE))
}

/// Builds the effective rule set: built-ins (unless disabled), then the user
/// file, minus any rules named in `--disable`.
pub fn load_config(source: &RuleSourceArgs) -> Result<ScrubConfig> {
    let defaults = if source.no_defaults {
        debug!("Built-in rules skipped (--no-defaults).");
        ScrubConfig::default()
    } else {
        ScrubConfig::load_default_rules()?
    };

    let user_path = source
        .config
        .clone()
        .or_else(|| default_user_rules_path().filter(|p| p.is_file()));

    let user = match user_path {
        Some(path) => Some(ScrubConfig::load_from_file(&path)?),
        None => {
            info!("No user rule file found; using built-in rules only.");
            None
        }
    };

    let mut config = merge_rules(defaults, user);
    config.set_active_rules(&source.disable);
    Ok(config)
}
