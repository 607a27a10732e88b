//! Goal completion check against controller feedback.

use dynjta_core::{FollowJointTrajectoryFeedback, JointTrajectory, MotionGroup};
use tracing::warn;

/// Returns true when every joint of `group` is within `goal_threshold` of
/// the trajectory's final waypoint, according to `feedback.actual`.
///
/// Joints are matched by name on both sides, so neither the feedback nor
/// the trajectory has to list them in group order. A joint missing from
/// either side, or a short position array, fails the check.
pub fn within_goal_constraints(
    feedback: &FollowJointTrajectoryFeedback,
    trajectory: &JointTrajectory,
    group: &MotionGroup,
    goal_threshold: f64,
) -> bool {
    let Some(last) = trajectory.points.last() else {
        warn!(
            group = group.id(),
            "Empty joint trajectory passed to check goal constraints, return false"
        );
        return false;
    };

    group.joint_names().iter().all(|joint| {
        let actual = index_of(&feedback.joint_names, joint)
            .and_then(|i| feedback.actual.positions.get(i));
        let target = index_of(&trajectory.joint_names, joint).and_then(|j| last.positions.get(j));
        match (actual, target) {
            (Some(actual), Some(target)) => (actual - target).abs() <= goal_threshold,
            _ => false,
        }
    })
}

fn index_of(names: &[String], joint: &str) -> Option<usize> {
    names.iter().position(|name| name == joint)
}
