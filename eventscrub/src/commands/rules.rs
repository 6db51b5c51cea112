// eventscrub/src/commands/rules.rs
//! `eventscrub rules`: show the effective rule list.

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use std::io::Write;

use eventscrub_core::{RuleAction, RuleSpec, ScrubConfig};

use crate::cli::RulesCommand;
use crate::commands::load_config;

pub fn run_rules<W: Write>(cmd: &RulesCommand, writer: &mut W) -> Result<()> {
    let config = load_config(&cmd.rules)?;
    // Compile once so broken rules surface here rather than at scrub time.
    config.build_scrubber()?;

    if cmd.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&config.rules)?)?;
    } else {
        writeln!(writer, "{}", rules_table(&config))?;
    }
    Ok(())
}

fn keys_column(spec: &RuleSpec) -> String {
    match spec.action {
        RuleAction::Scrub => "-".to_string(),
        _ if spec.all_keys => "(all)".to_string(),
        _ => spec.keys.join(", "),
    }
}

/// Renders the rules in evaluation order.
pub fn rules_table(config: &ScrubConfig) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "Name", "Path", "Action", "Keys"]);

    for (i, spec) in config.rules.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            spec.name.clone().unwrap_or_else(|| "-".to_string()),
            spec.path.clone(),
            spec.action.to_string(),
            keys_column(spec),
        ]);
    }
    table
}
