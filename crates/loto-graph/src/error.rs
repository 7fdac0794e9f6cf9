//! Unified error type for the LOTO planning core.
//!
//! Mirrors the planner's documented failure taxonomy (graph, plan, rules)
//! so every crate in the workspace surfaces errors the same way.

use thiserror::Error;

/// Unified error type for all LOTO core operations.
#[derive(Error, Debug)]
pub enum LotoError {
    /// Malformed graph detected at ingest time (duplicate ids, missing
    /// referenced nodes). Non-fatal validation issues use
    /// [`crate::diagnostics::Diagnostics`] instead of this variant.
    #[error("graph error: {0}")]
    Graph(String),

    /// Min-cut solver failure (e.g. numerical overflow). The planner
    /// recovers by returning an empty plan; this variant exists for callers
    /// that want to distinguish the failure from a legitimately empty plan.
    #[error("plan error: {0}")]
    Plan(String),

    /// Rule-pack parse/validation failure (unknown required keys). The
    /// planner refuses to run when this occurs.
    #[error("rules error: {0}")]
    Rules(String),

    /// I/O errors reading graph or rule-pack files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors (YAML/JSON).
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience alias for Results using [`LotoError`].
pub type LotoResult<T> = Result<T, LotoError>;

impl From<serde_json::Error> for LotoError {
    fn from(err: serde_json::Error) -> Self {
        LotoError::Parse(err.to_string())
    }
}

impl From<String> for LotoError {
    fn from(s: String) -> Self {
        LotoError::Rules(s)
    }
}

impl From<&str> for LotoError {
    fn from(s: &str) -> Self {
        LotoError::Rules(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LotoError::Plan("min-cut overflow".into());
        assert!(err.to_string().contains("plan error"));
        assert!(err.to_string().contains("min-cut overflow"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let loto_err: LotoError = io_err.into();
        assert!(matches!(loto_err, LotoError::Io(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn example_fn() -> LotoResult<i32> {
            Ok(42)
        }
        assert_eq!(example_fn().unwrap(), 42);
    }
}
