//! Message types exchanged with the action client and the robot controller.
//!
//! Field layout follows the ROS message definitions (`trajectory_msgs`,
//! `control_msgs`, `industrial_msgs`, `motoman_msgs`) so that a transport
//! can map them one-to-one onto the wire.

use crate::time::{Duration, Time};
use std::fmt;

/// Marker for types that can be delivered by an inbound subscription.
pub trait Message: Clone + Send + 'static {}

/// Standard metadata for timestamped data.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub stamp: Time,
    pub frame_id: String,
}

// ============================================================================
// trajectory_msgs
// ============================================================================

/// One waypoint of a [`JointTrajectory`].
///
/// Each channel is either empty or has one entry per trajectory joint.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointTrajectoryPoint {
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
    pub effort: Vec<f64>,
    pub time_from_start: Duration,
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointTrajectory {
    pub header: Header,
    pub joint_names: Vec<String>,
    pub points: Vec<JointTrajectoryPoint>,
}

// ============================================================================
// control_msgs
// ============================================================================

/// Per-joint tolerance as found in `FollowJointTrajectory` goals.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointTolerance {
    pub name: String,
    pub position: f64,
    pub velocity: f64,
    pub acceleration: f64,
}

/// Goal of the `FollowJointTrajectory` action.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowJointTrajectoryGoal {
    pub trajectory: JointTrajectory,
    pub path_tolerance: Vec<JointTolerance>,
    pub goal_tolerance: Vec<JointTolerance>,
    pub goal_time_tolerance: Duration,
}

/// Result of the `FollowJointTrajectory` action.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowJointTrajectoryResult {
    pub error_code: i32,
    pub error_string: String,
}

impl FollowJointTrajectoryResult {
    pub const SUCCESSFUL: i32 = 0;
    pub const INVALID_GOAL: i32 = -1;
    pub const INVALID_JOINTS: i32 = -2;
    pub const OLD_HEADER_TIMESTAMP: i32 = -3;
    pub const PATH_TOLERANCE_VIOLATED: i32 = -4;
    pub const GOAL_TOLERANCE_VIOLATED: i32 = -5;

    pub fn new(error_code: i32, error_string: impl Into<String>) -> Self {
        Self {
            error_code,
            error_string: error_string.into(),
        }
    }

    pub fn successful() -> Self {
        Self::default()
    }
}

/// Controller state published while a trajectory executes.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FollowJointTrajectoryFeedback {
    pub header: Header,
    pub joint_names: Vec<String>,
    pub desired: JointTrajectoryPoint,
    pub actual: JointTrajectoryPoint,
    pub error: JointTrajectoryPoint,
}

impl Message for FollowJointTrajectoryFeedback {}

// ============================================================================
// industrial_msgs
// ============================================================================

/// Tri-state value reported by the robot controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriState {
    #[default]
    Unknown,
    False,
    True,
}

impl TriState {
    pub const UNKNOWN: i8 = -1;
    pub const FALSE: i8 = 0;
    pub const TRUE: i8 = 1;
}

impl From<i8> for TriState {
    fn from(val: i8) -> Self {
        match val {
            TriState::FALSE => TriState::False,
            TriState::TRUE => TriState::True,
            _ => TriState::Unknown,
        }
    }
}

impl From<TriState> for i8 {
    fn from(state: TriState) -> Self {
        match state {
            TriState::Unknown => TriState::UNKNOWN,
            TriState::False => TriState::FALSE,
            TriState::True => TriState::TRUE,
        }
    }
}

/// Operating mode of the robot controller.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RobotMode {
    #[default]
    Unknown,
    Manual,
    Auto,
}

/// Overall robot status as published on `robot_status`.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotStatus {
    pub header: Header,
    pub mode: RobotMode,
    pub e_stopped: TriState,
    pub drives_powered: TriState,
    pub motion_possible: TriState,
    pub in_motion: TriState,
    pub in_error: TriState,
    pub error_code: i32,
}

impl Message for RobotStatus {}

// ============================================================================
// motoman_msgs
// ============================================================================

/// Reply sent by the controller after a trajectory command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionReplyResult {
    pub val: i32,
}

impl MotionReplyResult {
    pub const SUCCESS: i32 = 0;
    pub const TRUE: i32 = 0;
    pub const BUSY: i32 = 1;
    pub const FAILURE: i32 = 2;
    pub const FALSE: i32 = 2;
    pub const INVALID: i32 = 3;
    pub const ALARM: i32 = 4;
    pub const NOT_READY: i32 = 5;
    pub const MP_FAILURE: i32 = 6;

    pub const fn new(val: i32) -> Self {
        Self { val }
    }

    pub fn code(&self) -> MotionReplyCode {
        self.val.into()
    }
}

impl Message for MotionReplyResult {}

/// Typed view of [`MotionReplyResult::val`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionReplyCode {
    Success,
    Busy,
    Failure,
    Invalid,
    Alarm,
    NotReady,
    MpFailure,
    Other(i32),
}

impl MotionReplyCode {
    /// Replies that mean the controller refused the trajectory outright.
    pub fn is_refusal(&self) -> bool {
        matches!(self, MotionReplyCode::Invalid | MotionReplyCode::NotReady)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionReplyCode::Success => "SUCCESS/TRUE",
            MotionReplyCode::Busy => "BUSY",
            MotionReplyCode::Failure => "FAILURE/FALSE",
            MotionReplyCode::Invalid => "INVALID",
            MotionReplyCode::Alarm => "ALARM",
            MotionReplyCode::NotReady => "NOT_READY",
            MotionReplyCode::MpFailure => "MP_FAILURE",
            MotionReplyCode::Other(_) => "UNKNOWN_REPLY_VAL",
        }
    }
}

impl From<i32> for MotionReplyCode {
    fn from(val: i32) -> Self {
        match val {
            MotionReplyResult::SUCCESS => MotionReplyCode::Success,
            MotionReplyResult::BUSY => MotionReplyCode::Busy,
            MotionReplyResult::FAILURE => MotionReplyCode::Failure,
            MotionReplyResult::INVALID => MotionReplyCode::Invalid,
            MotionReplyResult::ALARM => MotionReplyCode::Alarm,
            MotionReplyResult::NOT_READY => MotionReplyCode::NotReady,
            MotionReplyResult::MP_FAILURE => MotionReplyCode::MpFailure,
            other => MotionReplyCode::Other(other),
        }
    }
}

impl fmt::Display for MotionReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-group slice of a [`DynamicJointPoint`].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicJointsGroup {
    pub group_number: i16,
    pub num_joints: i16,
    pub valid_fields: i16,
    pub positions: Vec<f64>,
    pub velocities: Vec<f64>,
    pub accelerations: Vec<f64>,
    pub effort: Vec<f64>,
    pub time_from_start: Duration,
}

#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicJointPoint {
    pub num_groups: i16,
    pub groups: Vec<DynamicJointsGroup>,
}

/// Trajectory command understood by the controller.
///
/// A message without points is a stop command.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicJointTrajectory {
    pub header: Header,
    pub joint_names: Vec<String>,
    pub points: Vec<DynamicJointPoint>,
}

impl DynamicJointTrajectory {
    /// Stop command; `joint_names` may be left empty.
    pub fn stop(joint_names: Vec<String>) -> Self {
        Self {
            joint_names,
            ..Default::default()
        }
    }

    pub fn is_stop(&self) -> bool {
        self.points.is_empty()
    }
}
