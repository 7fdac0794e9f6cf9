//! Impact engine value types: unit/asset data and the derived impact result.

use crate::units::Megawatts;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Redundancy scheme governing how a unit's derate is computed from its
/// unavailable assets (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedundancyScheme {
    /// Single Point of Failure: any unavailable asset derates the full unit.
    #[serde(rename = "SPOF")]
    Spof,
    /// N+1: tolerates one asset outage; derate scales with offline count.
    #[serde(rename = "N+1")]
    NPlus1,
}

/// Static rating/redundancy data for a production unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitData {
    pub rated_mw: f64,
    pub scheme: RedundancyScheme,
    /// Redundancy count for N+1 units; ignored for SPOF.
    #[serde(default = "default_nplus")]
    pub nplus: u32,
}

fn default_nplus() -> u32 {
    1
}

/// Output of an `evaluate` call: the set of assets made unavailable by the
/// applied isolation, and the MW derates rolled up to units and areas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub unavailable_assets: Vec<String>,
    pub unit_mw_delta: HashMap<String, Megawatts>,
    pub area_mw_delta: HashMap<String, Megawatts>,
}

impl ImpactResult {
    pub fn new(unavailable: HashSet<String>) -> Self {
        let mut unavailable_assets: Vec<String> = unavailable.into_iter().collect();
        unavailable_assets.sort();
        Self {
            unavailable_assets,
            unit_mw_delta: HashMap::new(),
            area_mw_delta: HashMap::new(),
        }
    }
}
