//! Simulation report value types and the fixed stimulus vocabulary (spec §4.6).

use serde::{Deserialize, Serialize};

/// Named stimuli the simulation engine understands. Unknown stimulus names
/// are dropped silently by callers (spec §4.9) rather than producing a
/// variant here, so the set is deliberately closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimulusName {
    #[serde(rename = "REMOTE_OPEN")]
    RemoteOpen,
    #[serde(rename = "LOCAL_OPEN")]
    LocalOpen,
    #[serde(rename = "AIR_RETURN")]
    AirReturn,
    #[serde(rename = "ESD_RESET")]
    EsdReset,
    #[serde(rename = "PUMP_START")]
    PumpStart,
}

impl StimulusName {
    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusName::RemoteOpen => "REMOTE_OPEN",
            StimulusName::LocalOpen => "LOCAL_OPEN",
            StimulusName::AirReturn => "AIR_RETURN",
            StimulusName::EsdReset => "ESD_RESET",
            StimulusName::PumpStart => "PUMP_START",
        }
    }

    /// Parses a stimulus name, case-sensitively (spec §6). Unknown names
    /// return `None` so callers can drop them silently.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REMOTE_OPEN" => Some(Self::RemoteOpen),
            "LOCAL_OPEN" => Some(Self::LocalOpen),
            "AIR_RETURN" => Some(Self::AirReturn),
            "ESD_RESET" => Some(Self::EsdReset),
            "PUMP_START" => Some(Self::PumpStart),
            _ => None,
        }
    }
}

/// Outcome of applying a single stimulus during a `run_stimuli` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimResultItem {
    pub stimulus: String,
    pub success: bool,
    pub impact: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl SimResultItem {
    pub fn success(stimulus: StimulusName) -> Self {
        Self {
            stimulus: stimulus.as_str().to_string(),
            success: true,
            impact: 0.0,
            domain: None,
            paths: Vec::new(),
            hint: None,
        }
    }

    pub fn bypass(stimulus: StimulusName, domain: impl Into<String>, paths: Vec<Vec<String>>) -> Self {
        Self {
            stimulus: stimulus.as_str().to_string(),
            success: false,
            impact: 1.0,
            domain: Some(domain.into()),
            paths,
            hint: Some("extra isolation required".to_string()),
        }
    }
}

/// Full output of a `run_stimuli` call: per-stimulus results, cumulative
/// simulated time, and the echoed seed (spec §3, §4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub results: Vec<SimResultItem>,
    pub total_time_s: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SimReport {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            results: Vec::new(),
            total_time_s: 0.0,
            seed,
        }
    }
}
