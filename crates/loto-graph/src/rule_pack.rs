//! Rule packs: versioned domain/verification rule sets plus risk policies,
//! content-addressable via SHA-256 over a canonical JSON serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// A single domain-specific planning rule (opaque payload; the planner's
/// behavior is governed by the weighting coefficients in
/// [`crate::plan::PlannerConfig`], not by inspecting rule bodies directly —
/// rule packs are the provenance/governance record, not executable code).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRule {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A verification requirement a branch's certificates must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Risk-policy knobs (e.g. compliance failure posture). Kept opaque at this
/// layer; callers interpret the fields relevant to their policy engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskPolicies {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Domain and verification rule sets plus risk policies. Content-hashable
/// via [`RulePack::content_hash`] for audit provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulePack {
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub policy: Map<String, Value>,
    #[serde(default)]
    pub governance: Map<String, Value>,
    #[serde(default)]
    pub datasets: Map<String, Value>,
    pub domain_rules: Vec<DomainRule>,
    pub verification_rules: Vec<VerificationRule>,
    #[serde(default)]
    pub risk_policies: Option<RiskPolicies>,
}

impl RulePack {
    /// SHA-256 of a canonical JSON serialization: keys sorted lexically,
    /// null fields omitted, floats in their shortest round-trip form (the
    /// properties `serde_json` already guarantees), matching the reference
    /// planner's `json.dumps(..., sort_keys=True)` hashing (spec §6, §9).
    pub fn content_hash(&self) -> crate::LotoResult<String> {
        let value = serde_json::to_value(self)?;
        let canonical = canonicalize(&value);
        let bytes = serde_json::to_vec(&canonical)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Drops null-valued object entries recursively. `serde_json::Map` is a
/// `BTreeMap` by default (the `preserve_order` feature is not enabled), so
/// keys already come out lexically sorted — canonicalization only needs to
/// strip nulls to match the reference hasher's `sort_keys=True` output.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                if v.is_null() {
                    continue;
                }
                out.insert(k.clone(), canonicalize(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
