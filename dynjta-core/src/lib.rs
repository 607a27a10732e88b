//! Core traits and types for the multi-group joint trajectory action server.
//!
//! This crate provides the message types, the motion group registry and the
//! abstract collaborator interfaces without depending on any specific
//! transport. The server logic lives in the `dynjta` crate.

pub mod action;
pub mod api;
pub mod error;
pub mod group;
pub mod msg;
pub mod time;

// Re-export commonly used error types
pub use error::{Error, Result};

// Re-export API traits
pub use api::{
    ActionCallbacks, ActionServer, GoalCallback, GoalHandle, MessageCallback, Node, Publisher,
};

pub use action::{GoalEvent, GoalId, GoalStatus};
pub use group::{GroupId, GroupRegistry, MotionGroup, is_similar, topics};
pub use msg::{
    DynamicJointPoint, DynamicJointTrajectory, DynamicJointsGroup, FollowJointTrajectoryFeedback,
    FollowJointTrajectoryGoal, FollowJointTrajectoryResult, Header, JointTolerance,
    JointTrajectory, JointTrajectoryPoint, Message, MotionReplyCode, MotionReplyResult,
    RobotMode, RobotStatus, TriState,
};
pub use time::{Duration, Time};
