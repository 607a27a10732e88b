//! Top-level multi-group goal path.
//!
//! Fan-out goals may address any subset of the configured groups in one
//! trajectory. They are translated and published on the shared command
//! topic. No completion tracking happens on this path: a published goal
//! is succeeded right away.

use crate::translator::{channel_length_mismatch, first_joint_index, translate_fan_out};
use dynjta_core::{
    DynamicJointTrajectory, FollowJointTrajectoryResult, GoalHandle, GroupRegistry,
    JointTrajectory, MotionReplyCode, MotionReplyResult, Publisher, Time,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why a fan-out trajectory cannot be mapped onto the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanOutMismatch {
    /// A joint belongs to no configured group.
    UnknownJoint(String),
    /// A referenced group's joints are not listed contiguously in group order.
    SplitGroup(String),
    /// A non-empty channel does not have one value per joint.
    ChannelLength { point: usize, len: usize },
}

/// Checks that `trajectory` can be sliced group by group.
pub fn check_fan_out(trajectory: &JointTrajectory, registry: &GroupRegistry) -> Result<(), FanOutMismatch> {
    if let Some(joint) = trajectory
        .joint_names
        .iter()
        .find(|joint| registry.group_of(joint).is_none())
    {
        return Err(FanOutMismatch::UnknownJoint(joint.clone()));
    }

    for group in registry.groups() {
        let Some(k) = first_joint_index(trajectory, group) else {
            if group
                .joint_names()
                .iter()
                .any(|joint| trajectory.joint_names.contains(joint))
            {
                return Err(FanOutMismatch::SplitGroup(group.name().to_string()));
            }
            continue;
        };
        if trajectory.joint_names.get(k..k + group.num_joints()) != Some(group.joint_names()) {
            return Err(FanOutMismatch::SplitGroup(group.name().to_string()));
        }
    }

    if let Some((point, len)) = channel_length_mismatch(trajectory) {
        return Err(FanOutMismatch::ChannelLength { point, len });
    }
    Ok(())
}

/// Fan-out goal handler publishing on the top-level command topic.
pub struct FanOut<P> {
    registry: Arc<GroupRegistry>,
    publisher: P,
}

impl<P: Publisher<DynamicJointTrajectory>> FanOut<P> {
    pub fn new(registry: Arc<GroupRegistry>, publisher: P) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// Validates, publishes and finishes a fan-out goal.
    pub fn on_goal<G: GoalHandle>(&self, gh: G) {
        info!(goal = %gh.id(), "Received new multi-group goal");
        let trajectory = &gh.goal().trajectory;

        if trajectory.points.is_empty() {
            error!("Joint trajectory action failed on empty trajectory");
            let result = FollowJointTrajectoryResult::new(
                FollowJointTrajectoryResult::INVALID_GOAL,
                "Empty trajectory",
            );
            report(gh.reject(result, "Empty trajectory"));
            return;
        }

        if let Err(mismatch) = check_fan_out(trajectory, &self.registry) {
            error!(?mismatch, "Joint trajectory action failing on invalid joints");
            let result = FollowJointTrajectoryResult::new(
                FollowJointTrajectoryResult::INVALID_JOINTS,
                "Joint names do not match",
            );
            report(gh.reject(result, "Joint names do not match"));
            return;
        }

        if let Err(e) = gh.accept() {
            warn!(goal = %gh.id(), "Failed to accept goal: {e}");
            return;
        }

        let command = translate_fan_out(trajectory, &self.registry, Time::now());
        info!(
            points = command.points.len(),
            groups = self.registry.len(),
            "Publishing trajectory"
        );
        if let Err(e) = self.publisher.send(&command) {
            warn!(topic = self.publisher.topic_name(), "Failed to publish trajectory: {e}");
        }
        report(gh.succeed(FollowJointTrajectoryResult::successful()));
    }

    /// Fan-out goals finish immediately, so there is nothing to cancel.
    pub fn on_cancel<G: GoalHandle>(&self, gh: G) {
        debug!(goal = %gh.id(), "Multi-group goals are not tracked, ignoring cancel request");
    }

    /// Logs a reply on the shared motion reply topic.
    pub fn on_motion_reply(&self, msg: MotionReplyResult) {
        let code = msg.code();
        match code {
            MotionReplyCode::Success => {
                debug!(val = msg.val, reply = %code, "Received motion reply command")
            }
            _ => info!(val = msg.val, reply = %code, "Received motion reply command"),
        }
    }
}

fn report(result: dynjta_core::Result<()>) {
    if let Err(e) = result {
        warn!("Goal handle refused transition: {e}");
    }
}
