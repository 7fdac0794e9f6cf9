//! Rule-pack file loading (spec §6): YAML or JSON, dispatched by extension,
//! mirroring `gat_scenarios::spec::load_spec_from_path`.

use crate::fileio::parse_file;
use anyhow::{bail, Result};
use loto_graph::rule_pack::RulePack;
use std::path::Path;

pub fn load_rule_pack(path: &Path) -> Result<RulePack> {
    let pack: RulePack = parse_file(path)?;
    validate_rule_pack(&pack)?;
    Ok(pack)
}

/// Structural sanity check beyond what serde already enforces: rule ids
/// must be non-empty and unique within their own list (spec §4.9 — the
/// planner refuses to run on a malformed rule pack rather than silently
/// proceeding with ambiguous rules).
fn validate_rule_pack(pack: &RulePack) -> Result<()> {
    check_unique_ids("domain_rules", pack.domain_rules.iter().map(|r| r.id.as_str()))?;
    check_unique_ids(
        "verification_rules",
        pack.verification_rules.iter().map(|r| r.id.as_str()),
    )?;
    Ok(())
}

fn check_unique_ids<'a>(list_name: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if id.is_empty() {
            bail!("{list_name} contains a rule with an empty id");
        }
        if !seen.insert(id) {
            bail!("{list_name} contains duplicate rule id '{id}'");
        }
    }
    Ok(())
}
