//! Action-related types and enums.

use std::fmt;

/// Identifier of an action goal, unique per action server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalId(pub [u8; 16]);

impl From<[u8; 16]> for GoalId {
    fn from(id: [u8; 16]) -> Self {
        GoalId(id)
    }
}

impl From<u128> for GoalId {
    fn from(id: u128) -> Self {
        GoalId(id.to_be_bytes())
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Status of an action goal.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum GoalStatus {
    /// Goal was received but not yet accepted or rejected.
    #[default]
    Pending,

    /// Goal has been accepted by the action server.
    Accepted,

    /// Goal completed successfully.
    Succeeded,

    /// Goal was canceled.
    Canceled,

    /// Goal was aborted by the action server.
    Aborted,

    /// Goal was rejected.
    Rejected,
}

impl GoalStatus {
    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GoalStatus::Succeeded | GoalStatus::Canceled | GoalStatus::Aborted | GoalStatus::Rejected
        )
    }

    /// Applies `event`, returning the next status or `None` if the
    /// transition is not allowed from the current status.
    ///
    /// A reject is allowed from `Accepted` as well as `Pending`: the
    /// controller may refuse a trajectory after the goal was accepted.
    pub fn apply(self, event: GoalEvent) -> Option<GoalStatus> {
        use GoalEvent::*;
        use GoalStatus::*;
        match (self, event) {
            (Pending, Accept) => Some(Accepted),
            (Pending | Accepted, Reject) => Some(Rejected),
            (Accepted, Succeed) => Some(Succeeded),
            (Accepted, Cancel) => Some(Canceled),
            (Accepted, Abort) => Some(Aborted),
            _ => None,
        }
    }
}

/// Events that can occur during action goal processing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GoalEvent {
    /// Accept the goal.
    Accept,

    /// Reject the goal.
    Reject,

    /// Goal succeeded.
    Succeed,

    /// Goal was canceled.
    Cancel,

    /// Goal was aborted.
    Abort,
}
