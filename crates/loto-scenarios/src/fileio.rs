//! Shared extension-dispatched YAML/JSON parsing helper.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Parses any YAML/JSON file into `T` by extension. Exposed beyond this
/// crate so `loto-cli` can load ad hoc side-car files (e.g. impact engine
/// unit data) without each caller re-implementing extension dispatch.
pub fn parse_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).with_context(|| format!("parsing YAML in {}", path.display()))
        }
        Some("json") => {
            serde_json::from_str(&contents).with_context(|| format!("parsing JSON in {}", path.display()))
        }
        other => bail!("unsupported file extension {:?} on {}", other, path.display()),
    }
}
