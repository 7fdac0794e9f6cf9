//! Isolation plan value types and planner configuration.

use serde::{Deserialize, Serialize};

/// A single cut-edge action: isolate the device on `component_id` by
/// `method` (e.g. `"lock"`), optionally scoped to `duration_s`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationAction {
    pub component_id: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
}

impl IsolationAction {
    pub fn lock(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            method: "lock".to_string(),
            duration_s: None,
        }
    }
}

/// The planner's output: an ordered set of isolation actions plus the
/// verifications, hazards and controls derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationPlan {
    pub plan_id: String,
    #[serde(default)]
    pub actions: Vec<IsolationAction>,
    #[serde(default)]
    pub verifications: Vec<String>,
    #[serde(default)]
    pub hazards: Vec<String>,
    #[serde(default)]
    pub controls: Vec<String>,
}

impl IsolationPlan {
    pub fn empty(plan_id: impl Into<String>) -> Self {
        Self {
            plan_id: plan_id.into(),
            actions: Vec::new(),
            verifications: Vec::new(),
            hazards: Vec::new(),
            controls: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Planner weighting coefficients and feature toggles (spec §4.2, §6). Passed
/// explicitly per call; never global state (spec §9 "feature flags ... must
/// not leak across calls").
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub node_split: bool,
    pub cbt: f64,
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    pub epsilon: f64,
    pub zeta: f64,
    pub cb_scale: f64,
    pub cb_max: f64,
    pub rst_scale: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            node_split: true,
            cbt: 0.0,
            alpha: 1.0,
            beta: 5.0,
            gamma: 0.5,
            delta: 1.0,
            epsilon: 2.0,
            zeta: 0.5,
            cb_scale: 30.0,
            cb_max: 120.0,
            rst_scale: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan_has_no_actions() {
        let plan = IsolationPlan::empty("p1");
        assert!(plan.is_empty());
        assert!(plan.verifications.is_empty());
    }

    #[test]
    fn test_planner_config_defaults_match_spec() {
        let cfg = PlannerConfig::default();
        assert_eq!(cfg.alpha, 1.0);
        assert_eq!(cfg.beta, 5.0);
        assert_eq!(cfg.cb_scale, 30.0);
        assert_eq!(cfg.cb_max, 120.0);
        assert_eq!(cfg.rst_scale, 30.0);
        assert!(cfg.node_split);
    }

    #[test]
    fn test_plan_serde_roundtrip() {
        let mut plan = IsolationPlan::empty("p1");
        plan.actions.push(IsolationAction::lock("steam:S->V"));
        plan.verifications.push("steam:S-V PT=0".to_string());
        let json = serde_json::to_string(&plan).unwrap();
        let back: IsolationPlan = serde_json::from_str(&json).unwrap();
        assert_eq!(plan, back);
    }
}
