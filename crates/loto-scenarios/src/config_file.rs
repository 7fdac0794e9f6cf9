//! Optional planner config file loading (`loto-cli plan --config`).

use crate::fileio::parse_file;
use anyhow::Result;
use loto_graph::plan::PlannerConfig;
use std::path::Path;

pub fn load_planner_config(path: &Path) -> Result<PlannerConfig> {
    parse_file(path)
}
