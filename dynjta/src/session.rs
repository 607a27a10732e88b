//! Per-group goal lifecycle.
//!
//! A [`GoalSession`] holds at most one in-flight goal for its motion group.
//! It is driven by inbound events (goals, cancels, controller feedback,
//! motion replies and watchdog ticks) and reports outcomes through the
//! goal handle. Handlers never fail: collaborator errors are logged.

use crate::{
    status::StatusCache,
    tolerance::within_goal_constraints,
    translator::{channel_length_mismatch, translate_group},
};
use dynjta_core::{
    DynamicJointTrajectory, FollowJointTrajectoryFeedback, FollowJointTrajectoryGoal,
    FollowJointTrajectoryResult, GoalHandle, GroupId, JointTrajectory, MotionGroup,
    MotionReplyCode, MotionReplyResult, Publisher, TriState, is_similar,
};
use parking_lot::Mutex;
use std::{mem, sync::Arc};
use tracing::{debug, error, info, warn};

/// Session shared between the transport callbacks and the watchdog.
pub type SharedSession<G, P> = Arc<Mutex<GoalSession<G, P>>>;

/// The accepted goal of an active session.
pub struct ActiveGoal<G> {
    pub handle: G,
    /// Copy of the accepted trajectory, used for completion checks.
    pub trajectory: JointTrajectory,
}

pub enum SessionState<G> {
    Idle,
    Active(ActiveGoal<G>),
}

/// Goal state machine of one motion group.
pub struct GoalSession<G, P> {
    group: MotionGroup,
    publisher: P,
    robot_status: StatusCache,
    goal_threshold: f64,
    state: SessionState<G>,
    last_feedback: Option<FollowJointTrajectoryFeedback>,
    feedback_seen: bool,
}

impl<G, P> GoalSession<G, P>
where
    G: GoalHandle,
    P: Publisher<DynamicJointTrajectory>,
{
    /// Creates an idle session publishing commands through `publisher`.
    pub fn new(group: MotionGroup, publisher: P, robot_status: StatusCache, goal_threshold: f64) -> Self {
        Self {
            group,
            publisher,
            robot_status,
            goal_threshold,
            state: SessionState::Idle,
            last_feedback: None,
            feedback_seen: false,
        }
    }

    /// Wraps the session for sharing with callbacks and the watchdog.
    pub fn into_shared(self) -> SharedSession<G, P> {
        Arc::new(Mutex::new(self))
    }

    pub fn group(&self) -> &MotionGroup {
        &self.group
    }

    pub fn state(&self) -> &SessionState<G> {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active(_))
    }

    /// Handle of the active goal, if any.
    pub fn active_goal(&self) -> Option<&G> {
        match &self.state {
            SessionState::Active(active) => Some(&active.handle),
            SessionState::Idle => None,
        }
    }

    /// Latest controller feedback, `None` until the first message.
    pub fn last_feedback(&self) -> Option<&FollowJointTrajectoryFeedback> {
        self.last_feedback.as_ref()
    }

    /// Whether feedback arrived since the last watchdog tick.
    pub fn feedback_seen(&self) -> bool {
        self.feedback_seen
    }

    pub(crate) fn reset_feedback_seen(&mut self) {
        self.feedback_seen = false;
    }

    fn id(&self) -> GroupId {
        self.group.id()
    }

    // ========================================================================
    // Goals and cancels
    // ========================================================================

    /// Handles a new goal for this group.
    ///
    /// Invalid goals are rejected without touching the current goal. A valid
    /// goal preempts the active one, which is aborted, and is then either
    /// finished at once, when the robot already sits at its final waypoint,
    /// or accepted and published.
    pub fn on_goal(&mut self, gh: G) {
        let group = self.id();
        info!(group, goal = %gh.id(), "Received new goal");
        let unsupported = UnsupportedOptions::of(gh.goal());

        let trajectory = &gh.goal().trajectory;
        if trajectory.points.is_empty() {
            error!(group, "Joint trajectory action failed on empty trajectory");
            reject(group, &gh, FollowJointTrajectoryResult::INVALID_GOAL, "Empty trajectory");
        } else if !is_similar(self.group.joint_names(), &trajectory.joint_names) {
            error!(group, "Joint trajectory action failing on invalid joints");
            reject(
                group,
                &gh,
                FollowJointTrajectoryResult::INVALID_JOINTS,
                "Joint names do not match",
            );
        } else {
            if let Some((point, len)) = channel_length_mismatch(trajectory) {
                warn!(
                    group,
                    point,
                    len,
                    joints = trajectory.joint_names.len(),
                    "Trajectory channel length does not match joint count, publishing as given"
                );
            }
            if self.is_active() {
                warn!(group, "Received new goal, canceling current goal");
                self.abort_active();
            }
            self.start(gh);
        }

        unsupported.warn(group, self.goal_threshold);
    }

    fn start(&mut self, gh: G) {
        let group = self.id();
        let done = self.last_feedback.as_ref().is_some_and(|feedback| {
            within_goal_constraints(feedback, &gh.goal().trajectory, &self.group, self.goal_threshold)
        });

        if let Err(e) = gh.accept() {
            warn!(group, goal = %gh.id(), "Failed to accept goal: {e}");
            return;
        }

        if done {
            info!(group, "Already within goal constraints, setting goal succeeded");
            log_refused(group, gh.succeed(FollowJointTrajectoryResult::successful()));
            return;
        }

        let trajectory = gh.goal().trajectory.clone();
        let command = translate_group(&trajectory, &self.group);
        info!(group, points = command.points.len(), "Publishing trajectory");
        self.state = SessionState::Active(ActiveGoal {
            handle: gh,
            trajectory,
        });
        self.publish(&command);
    }

    /// Handles a cancel request. Only the active goal can be canceled.
    pub fn on_cancel(&mut self, gh: G) {
        let group = self.id();
        let matches = self
            .active_goal()
            .is_some_and(|active| active.id() == gh.id());
        if !matches {
            if self.is_active() {
                warn!(group, "Active goal and goal cancel do not match, ignoring cancel request");
            } else {
                debug!(group, goal = %gh.id(), "No active goal, ignoring cancel request");
            }
            return;
        }

        if let Some(active) = self.take_active() {
            info!(group, goal = %gh.id(), "Canceling active goal");
            self.publish(&DynamicJointTrajectory::stop(self.group.joint_names().to_vec()));
            log_refused(group, active.handle.cancel(FollowJointTrajectoryResult::successful()));
        }
    }

    // ========================================================================
    // Controller events
    // ========================================================================

    /// Handles controller feedback.
    ///
    /// Feedback is cached and marks the watchdog window whatever the state.
    /// With an active goal, it finishes the goal once the robot is within
    /// the goal threshold and not reported as moving.
    pub fn on_feedback(&mut self, msg: FollowJointTrajectoryFeedback) {
        let group = self.group.id();
        self.feedback_seen = true;
        let feedback = self.last_feedback.insert(msg);

        let SessionState::Active(active) = &self.state else {
            debug!(group, "No active goal, ignoring feedback");
            return;
        };

        if !is_similar(self.group.joint_names(), &feedback.joint_names) {
            error!(group, "Joint names from the controller don't match our joint names.");
            return;
        }

        if !within_goal_constraints(feedback, &active.trajectory, &self.group, self.goal_threshold) {
            return;
        }

        match self.robot_status.in_motion() {
            Some(TriState::True) => {
                debug!(group, "Within goal constraints but robot is still moving");
                return;
            }
            Some(TriState::False) => {
                info!(group, "Inside goal constraints, stopped moving, return success for action");
            }
            Some(TriState::Unknown) => {
                info!(group, "Inside goal constraints, return success for action");
                warn!(
                    group,
                    "Robot status in motion unknown, the robot driver node and controller code should be updated"
                );
            }
            None => {
                info!(group, "Inside goal constraints, return success for action");
                warn!(
                    group,
                    "Robot status is not being published the robot driver node and controller code should be updated"
                );
            }
        }

        if let Some(active) = self.take_active() {
            log_refused(group, active.handle.succeed(FollowJointTrajectoryResult::successful()));
        }
    }

    /// Handles the controller's reply to a published trajectory.
    ///
    /// INVALID and NOT_READY reject the active goal, any other failure
    /// aborts it, SUCCESS keeps it running.
    pub fn on_motion_reply(&mut self, msg: MotionReplyResult) {
        let group = self.id();
        let code = msg.code();
        if !self.is_active() {
            debug!(group, val = msg.val, reply = %code, "No active goal, ignoring motion reply");
            return;
        }

        match code {
            MotionReplyCode::Success => {
                debug!(group, reply = %code, "Received motion reply command");
            }
            code if code.is_refusal() => {
                info!(group, val = msg.val, reply = %code, "Received motion reply command, preempting goal");
                if let Some(active) = self.take_active() {
                    log_refused(
                        group,
                        active
                            .handle
                            .reject(FollowJointTrajectoryResult::default(), code.as_str()),
                    );
                }
            }
            code => {
                info!(group, val = msg.val, reply = %code, "Received motion reply command, aborting goal");
                self.abort_active();
            }
        }
    }

    /// Aborts the active goal, if any, and sends a stop command.
    pub fn abort_active(&mut self) {
        let Some(active) = self.take_active() else {
            return;
        };
        let group = self.id();
        warn!(group, goal = %active.handle.id(), "Aborting goal");
        self.publish(&DynamicJointTrajectory::stop(Vec::new()));
        log_refused(group, active.handle.abort(FollowJointTrajectoryResult::default()));
    }

    fn take_active(&mut self) -> Option<ActiveGoal<G>> {
        match mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Active(active) => Some(active),
            SessionState::Idle => None,
        }
    }

    fn publish(&self, msg: &DynamicJointTrajectory) {
        if let Err(e) = self.publisher.send(msg) {
            warn!(
                group = self.id(),
                topic = self.publisher.topic_name(),
                "Failed to publish trajectory: {e}"
            );
        }
    }
}

fn reject<G: GoalHandle>(group: GroupId, gh: &G, code: i32, text: &str) {
    let result = FollowJointTrajectoryResult::new(code, text);
    log_refused(group, gh.reject(result, text));
}

fn log_refused(group: GroupId, result: dynjta_core::Result<()>) {
    if let Err(e) = result {
        warn!(group, "Goal handle refused transition: {e}");
    }
}

/// Goal fields that are accepted but not enforced.
#[derive(Debug, Clone, Copy)]
struct UnsupportedOptions {
    goal_time_tolerance: bool,
    goal_tolerance: bool,
    path_tolerance: bool,
}

impl UnsupportedOptions {
    fn of(goal: &FollowJointTrajectoryGoal) -> Self {
        Self {
            goal_time_tolerance: !goal.goal_time_tolerance.is_zero(),
            goal_tolerance: !goal.goal_tolerance.is_empty(),
            path_tolerance: !goal.path_tolerance.is_empty(),
        }
    }

    fn warn(self, group: GroupId, goal_threshold: f64) {
        if self.goal_time_tolerance {
            warn!(
                group,
                "Ignoring goal time tolerance in action goal, may be supported in the future"
            );
        }
        if self.goal_tolerance {
            warn!(
                group,
                "Ignoring goal tolerance in action, using paramater tolerance of {goal_threshold} instead"
            );
        }
        if self.path_tolerance {
            warn!(
                group,
                "Ignoring goal path tolerance, option not supported by ROS-Industrial drivers"
            );
        }
    }
}
