//! Error types for dynjta-core.

use crate::{
    action::{GoalEvent, GoalId, GoalStatus},
    group::GroupId,
};
use thiserror::Error;

/// Result type for dynjta-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building the group registry or talking to collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Two groups were configured with the same id
    #[error("Duplicate motion group id {0}")]
    DuplicateGroupId(GroupId),

    /// A group id does not fit in the wire `group_number` field
    #[error("Motion group id {0} is out of range")]
    GroupIdOutOfRange(GroupId),

    /// A group has no joints
    #[error("Motion group {0} has no joints")]
    EmptyGroup(GroupId),

    /// A group has more joints than the wire format can carry
    #[error("Motion group {group} has too many joints ({count})")]
    TooManyJoints {
        /// The offending group
        group: GroupId,
        /// Number of configured joints
        count: usize,
    },

    /// A joint name appears twice, within one group or across groups
    #[error("Joint '{joint}' is listed in group {first} and group {second}")]
    DuplicateJoint {
        /// The repeated joint name
        joint: String,
        /// Group of the first occurrence
        first: GroupId,
        /// Group of the second occurrence
        second: GroupId,
    },

    /// The registry was built without any group
    #[error("No motion group configured")]
    NoGroups,

    /// Lookup of an id that is not registered
    #[error("Unknown motion group {0}")]
    UnknownGroup(GroupId),

    /// A goal handle refused a state transition
    #[error("Goal {id}: transition {event:?} not allowed from {status:?}")]
    InvalidTransition {
        /// Goal being updated
        id: GoalId,
        /// Status at the time of the request
        status: GoalStatus,
        /// Requested transition
        event: GoalEvent,
    },

    /// Failure reported by the transport
    #[error("Transport error: {0}")]
    Transport(String),
}
