//! Motion groups and the immutable registry built from configuration.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Identifier of a motion group, stable for the process lifetime.
pub type GroupId = u16;

/// Topic and action names, relative to a group prefix.
pub mod topics {
    /// Action server accepting `FollowJointTrajectory` goals.
    pub const ACTION: &str = "joint_trajectory_action";
    /// Outbound trajectory commands.
    pub const COMMAND: &str = "joint_path_command";
    /// Inbound controller feedback.
    pub const FEEDBACK: &str = "feedback_states";
    /// Inbound motion replies.
    pub const MOTION_REPLY: &str = "joint_path_motion_reply";
    /// Shared robot status.
    pub const ROBOT_STATUS: &str = "robot_status";
}

/// A logically independent set of joints commanded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionGroup {
    id: GroupId,
    name: String,
    namespace: String,
    joint_names: Vec<String>,
}

impl MotionGroup {
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        namespace: impl Into<String>,
        joint_names: Vec<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            namespace: namespace.into(),
            joint_names,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn joint_names(&self) -> &[String] {
        &self.joint_names
    }

    pub fn num_joints(&self) -> usize {
        self.joint_names.len()
    }

    /// Name of `suffix` under this group, e.g. `ns/name/feedback_states`.
    ///
    /// Empty parts are skipped, so a group without namespace and name
    /// resolves to the bare suffix.
    pub fn topic(&self, suffix: &str) -> String {
        [self.namespace.as_str(), self.name.as_str(), suffix]
            .iter()
            .map(|s| s.trim_matches('/'))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Immutable lookup of the configured motion groups, ordered by id.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<MotionGroup>,
    index: BTreeMap<GroupId, usize>,
    all_joint_names: Vec<String>,
    synthetic: bool,
}

impl GroupRegistry {
    /// Builds a registry from configured groups.
    ///
    /// # Errors
    ///
    /// Fails if no group is given, if ids collide or exceed the wire range,
    /// if a group has no joints, or if a joint name appears twice anywhere.
    pub fn new(groups: Vec<MotionGroup>) -> Result<Self> {
        Self::build(groups, false)
    }

    /// Builds the degenerate single-group registry used when no group
    /// configuration exists.
    pub fn single(joint_names: Vec<String>) -> Result<Self> {
        Self::build(vec![MotionGroup::new(0, "", "", joint_names)], true)
    }

    fn build(mut groups: Vec<MotionGroup>, synthetic: bool) -> Result<Self> {
        if groups.is_empty() {
            return Err(Error::NoGroups);
        }
        groups.sort_by_key(MotionGroup::id);

        let mut index = BTreeMap::new();
        let mut owner: BTreeMap<&str, GroupId> = BTreeMap::new();
        for (i, group) in groups.iter().enumerate() {
            if i16::try_from(group.id).is_err() {
                return Err(Error::GroupIdOutOfRange(group.id));
            }
            if index.insert(group.id, i).is_some() {
                return Err(Error::DuplicateGroupId(group.id));
            }
            if group.joint_names.is_empty() {
                return Err(Error::EmptyGroup(group.id));
            }
            if i16::try_from(group.num_joints()).is_err() {
                return Err(Error::TooManyJoints {
                    group: group.id,
                    count: group.num_joints(),
                });
            }
            for joint in &group.joint_names {
                if let Some(first) = owner.insert(joint.as_str(), group.id) {
                    return Err(Error::DuplicateJoint {
                        joint: joint.clone(),
                        first,
                        second: group.id,
                    });
                }
            }
        }

        let all_joint_names = groups
            .iter()
            .flat_map(|g| g.joint_names.iter().cloned())
            .collect();

        Ok(Self {
            groups,
            index,
            all_joint_names,
            synthetic,
        })
    }

    /// Groups in registry order (ascending id).
    pub fn groups(&self) -> &[MotionGroup] {
        &self.groups
    }

    pub fn by_id(&self, id: GroupId) -> Option<&MotionGroup> {
        self.index.get(&id).map(|&i| &self.groups[i])
    }

    /// Like [`GroupRegistry::by_id`], but an unknown id is an error.
    pub fn get(&self, id: GroupId) -> Result<&MotionGroup> {
        self.by_id(id).ok_or(Error::UnknownGroup(id))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Concatenation of every group's joint names, in registry order.
    pub fn all_joint_names(&self) -> &[String] {
        &self.all_joint_names
    }

    /// True for the registry built by [`GroupRegistry::single`].
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    /// Group owning `joint`, if any.
    pub fn group_of(&self, joint: &str) -> Option<&MotionGroup> {
        self.groups
            .iter()
            .find(|g| g.joint_names.iter().any(|j| j == joint))
    }
}

/// Order-insensitive comparison of two joint name lists (same multiset).
pub fn is_similar(lhs: &[String], rhs: &[String]) -> bool {
    if lhs.len() != rhs.len() {
        return false;
    }
    let mut lhs: Vec<&str> = lhs.iter().map(String::as_str).collect();
    let mut rhs: Vec<&str> = rhs.iter().map(String::as_str).collect();
    lhs.sort_unstable();
    rhs.sort_unstable();
    lhs == rhs
}
