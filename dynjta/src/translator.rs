//! Conversion of client trajectories into controller trajectory commands.
//!
//! Two modes exist: [`translate_group`] for goals addressed to a single
//! motion group, and [`translate_fan_out`] for goals that may reference
//! joints of several groups at once.

use dynjta_core::{
    DynamicJointPoint, DynamicJointTrajectory, DynamicJointsGroup, GroupRegistry, JointTrajectory,
    JointTrajectoryPoint, MotionGroup, Time,
};
use std::ops::Range;

/// Translates a per-group goal trajectory.
///
/// The caller guarantees that `trajectory.joint_names` matches the group's
/// joints as a set. Each point becomes a single-group dynamic point; empty
/// channels are replaced by zero vectors. Header and joint names are echoed.
pub fn translate_group(trajectory: &JointTrajectory, group: &MotionGroup) -> DynamicJointTrajectory {
    let num_joints = group.num_joints();
    let points = trajectory
        .points
        .iter()
        .map(|point| DynamicJointPoint {
            num_groups: 1,
            groups: vec![DynamicJointsGroup {
                group_number: wire_group_number(group),
                num_joints: wire_len(num_joints),
                valid_fields: 0,
                positions: pass_through(&point.positions, num_joints),
                velocities: pass_through(&point.velocities, num_joints),
                accelerations: pass_through(&point.accelerations, num_joints),
                effort: pass_through(&point.effort, num_joints),
                time_from_start: point.time_from_start,
            }],
        })
        .collect();

    DynamicJointTrajectory {
        header: trajectory.header.clone(),
        joint_names: trajectory.joint_names.clone(),
        points,
    }
}

/// Translates a trajectory addressing any subset of the registered groups.
///
/// Every output point carries one group entry per registered group, in
/// registry order. A group is located by the index of its first joint in
/// `trajectory.joint_names`; groups that are not referenced get zero
/// vectors ("idle fill"). The header stamp is replaced by `stamp` and the
/// joint names by the registry's concatenated joint list.
///
/// Slices that fall outside a channel are zero filled rather than
/// panicking; rejecting such goals is the caller's job.
pub fn translate_fan_out(
    trajectory: &JointTrajectory,
    registry: &GroupRegistry,
    stamp: Time,
) -> DynamicJointTrajectory {
    let offsets: Vec<Option<usize>> = registry
        .groups()
        .iter()
        .map(|group| first_joint_index(trajectory, group))
        .collect();

    let points = trajectory
        .points
        .iter()
        .map(|point| {
            let groups: Vec<DynamicJointsGroup> = registry
                .groups()
                .iter()
                .zip(&offsets)
                .map(|(group, offset)| fan_out_group(point, group, *offset))
                .collect();
            DynamicJointPoint {
                num_groups: wire_len(groups.len()),
                groups,
            }
        })
        .collect();

    let mut header = trajectory.header.clone();
    header.stamp = stamp;

    DynamicJointTrajectory {
        header,
        joint_names: registry.all_joint_names().to_vec(),
        points,
    }
}

/// Index of the group's first joint in the trajectory, if referenced.
pub(crate) fn first_joint_index(trajectory: &JointTrajectory, group: &MotionGroup) -> Option<usize> {
    let first = group.joint_names().first()?;
    trajectory.joint_names.iter().position(|name| name == first)
}

/// First non-empty channel whose length differs from the number of
/// joint names, as `(point index, channel length)`.
pub(crate) fn channel_length_mismatch(trajectory: &JointTrajectory) -> Option<(usize, usize)> {
    let expected = trajectory.joint_names.len();
    trajectory.points.iter().enumerate().find_map(|(i, point)| {
        [&point.positions, &point.velocities, &point.accelerations, &point.effort]
            .into_iter()
            .find(|channel| !channel.is_empty() && channel.len() != expected)
            .map(|channel| (i, channel.len()))
    })
}

fn fan_out_group(
    point: &JointTrajectoryPoint,
    group: &MotionGroup,
    offset: Option<usize>,
) -> DynamicJointsGroup {
    let num_joints = group.num_joints();
    let (positions, velocities, accelerations, effort) = match offset {
        Some(k) => {
            let range = k..k + num_joints;
            (
                slice(&point.positions, range.clone()),
                slice(&point.velocities, range.clone()),
                slice(&point.accelerations, range.clone()),
                slice(&point.effort, range),
            )
        }
        None => (
            zeros(num_joints),
            zeros(num_joints),
            zeros(num_joints),
            zeros(num_joints),
        ),
    };

    DynamicJointsGroup {
        group_number: wire_group_number(group),
        num_joints: wire_len(num_joints),
        valid_fields: 0,
        positions,
        velocities,
        accelerations,
        effort,
        time_from_start: point.time_from_start,
    }
}

fn pass_through(values: &[f64], num_joints: usize) -> Vec<f64> {
    if values.is_empty() {
        zeros(num_joints)
    } else {
        values.to_vec()
    }
}

fn slice(values: &[f64], range: Range<usize>) -> Vec<f64> {
    let len = range.len();
    match values.get(range) {
        Some(values) => values.to_vec(),
        None => zeros(len),
    }
}

fn zeros(len: usize) -> Vec<f64> {
    vec![0.0; len]
}

// Registry construction bounds ids and joint counts to the i16 wire range.
fn wire_group_number(group: &MotionGroup) -> i16 {
    i16::try_from(group.id()).unwrap_or(i16::MAX)
}

fn wire_len(len: usize) -> i16 {
    i16::try_from(len).unwrap_or(i16::MAX)
}
