//! Dual-Approval Gate (C9): a `Pending -> Ready` state machine requiring
//! approvals from at least two distinct identifiers before re-energization
//! may proceed (spec §4.8).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Pending,
    Ready,
}

/// Tracks distinct approvers for a single isolation plan. Ready is terminal:
/// once reached, further approvals are no-ops. Serializable so a CLI can
/// persist it to a file across separate `approve` invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalGate {
    approvers: HashSet<String>,
}

const REQUIRED_APPROVALS: usize = 2;

impl ApprovalGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an approval. The same user approving twice is a no-op.
    pub fn approve(&mut self, user: impl Into<String>) {
        self.approvers.insert(user.into());
    }

    pub fn is_ready(&self) -> bool {
        self.approvers.len() >= REQUIRED_APPROVALS
    }

    pub fn state(&self) -> GateState {
        if self.is_ready() {
            GateState::Ready
        } else {
            GateState::Pending
        }
    }

    pub fn approver_count(&self) -> usize {
        self.approvers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_pending() {
        let gate = ApprovalGate::new();
        assert_eq!(gate.state(), GateState::Pending);
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_single_approval_stays_pending() {
        let mut gate = ApprovalGate::new();
        gate.approve("alice");
        assert_eq!(gate.state(), GateState::Pending);
    }

    #[test]
    fn test_two_distinct_approvals_become_ready() {
        let mut gate = ApprovalGate::new();
        gate.approve("alice");
        gate.approve("bob");
        assert_eq!(gate.state(), GateState::Ready);
        assert!(gate.is_ready());
    }

    #[test]
    fn test_same_user_approving_twice_is_idempotent() {
        let mut gate = ApprovalGate::new();
        gate.approve("alice");
        gate.approve("alice");
        assert_eq!(gate.approver_count(), 1);
        assert!(!gate.is_ready());
    }

    #[test]
    fn test_ready_is_terminal() {
        let mut gate = ApprovalGate::new();
        gate.approve("alice");
        gate.approve("bob");
        assert!(gate.is_ready());
        gate.approve("carol");
        assert!(gate.is_ready());
    }
}
