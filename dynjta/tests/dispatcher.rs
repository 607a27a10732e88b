//! End-to-end routing through a mock transport.

mod common;

use common::*;
use dynjta::{ActionConfig, Dispatcher, Error};
use dynjta_core::{
    Duration as MsgDuration, FollowJointTrajectoryResult, GoalEvent, GoalStatus, MotionReplyResult,
    TriState,
};
use std::time::Duration;
use tokio::time::sleep;

const R1_ACTION: &str = "sda10f/r1/joint_trajectory_action";
const R2_ACTION: &str = "sda10f/r2/joint_trajectory_action";

fn start(node: &MockNode, config: &ActionConfig) -> Dispatcher<MockNode> {
    Dispatcher::new(node, config).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_startup_wiring() {
    let node = MockNode::new();
    let dispatcher = start(&node, &two_group_config());

    assert_eq!(dispatcher.registry().len(), 2);
    assert!(dispatcher.has_fan_out());
    assert!(dispatcher.session(0).is_some());
    assert!(dispatcher.session(1).is_some());
    assert!(dispatcher.session(2).is_none());
    assert_eq!(dispatcher.watchdog_period(), Duration::from_secs(1));

    assert_eq!(
        node.action_servers(),
        names(&["joint_trajectory_action", R1_ACTION, R2_ACTION])
    );
    assert_eq!(
        node.publisher_topics(),
        names(&[
            "joint_path_command",
            "sda10f/r1/joint_path_command",
            "sda10f/r2/joint_path_command",
        ])
    );
    assert_eq!(node.subscriptions("robot_status"), 1);
    assert_eq!(node.subscriptions("sda10f/r1/feedback_states"), 1);
    assert_eq!(node.subscriptions("sda10f/r2/joint_path_motion_reply"), 1);
    assert_eq!(node.subscriptions("joint_path_motion_reply"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_routes_events_by_group() {
    let node = MockNode::new();
    let dispatcher = start(&node, &two_group_config());

    let gh = node.send_goal(R1_ACTION, 1, happy_goal());
    assert_eq!(gh.status(), GoalStatus::Accepted);
    assert_eq!(node.published("sda10f/r1/joint_path_command").len(), 1);
    assert!(node.published("sda10f/r2/joint_path_command").is_empty());

    node.deliver("robot_status", robot_status(TriState::False));
    assert_eq!(
        dispatcher.robot_status().in_motion(),
        Some(TriState::False)
    );

    // Feedback for the other group does not finish the goal.
    node.deliver("sda10f/r2/feedback_states", feedback(&["k1"], vec![0.0]));
    assert_eq!(gh.status(), GoalStatus::Accepted);

    node.deliver(
        "sda10f/r1/feedback_states",
        feedback(&["j1", "j2"], vec![1.0, 2.0]),
    );
    assert_eq!(gh.status(), GoalStatus::Succeeded);
    assert!(!dispatcher.session(0).unwrap().lock().is_active());
}

#[tokio::test(start_paused = true)]
async fn test_goal_for_wrong_group_rejected() {
    let node = MockNode::new();
    let _dispatcher = start(&node, &two_group_config());

    let gh = node.send_goal(R2_ACTION, 1, happy_goal());
    assert_eq!(gh.status(), GoalStatus::Rejected);
    assert_eq!(
        gh.result().map(|r| r.error_code),
        Some(FollowJointTrajectoryResult::INVALID_JOINTS)
    );
}

#[tokio::test(start_paused = true)]
async fn test_motion_reply_routed() {
    let node = MockNode::new();
    let _dispatcher = start(&node, &two_group_config());

    let gh = node.send_goal(R1_ACTION, 1, happy_goal());
    let other = node.send_goal(R2_ACTION, 2, goal(&["k1"], vec![point(vec![1.0], 1)]));

    node.deliver(
        "sda10f/r1/joint_path_motion_reply",
        MotionReplyResult::new(MotionReplyResult::NOT_READY),
    );
    assert_eq!(gh.status(), GoalStatus::Rejected);
    assert_eq!(other.status(), GoalStatus::Accepted);

    // The shared reply topic only logs.
    node.deliver(
        "joint_path_motion_reply",
        MotionReplyResult::new(MotionReplyResult::ALARM),
    );
    assert_eq!(other.status(), GoalStatus::Accepted);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_routed() {
    let node = MockNode::new();
    let _dispatcher = start(&node, &two_group_config());

    let gh = node.send_goal(R1_ACTION, 1, happy_goal());
    node.cancel_goal(R2_ACTION, &gh);
    assert_eq!(gh.status(), GoalStatus::Accepted);

    node.cancel_goal(R1_ACTION, &gh);
    assert_eq!(gh.status(), GoalStatus::Canceled);
    let stop = node.published("sda10f/r1/joint_path_command").pop().unwrap();
    assert!(stop.is_stop());
    assert_eq!(stop.joint_names, names(&["j1", "j2"]));
}

#[tokio::test(start_paused = true)]
async fn test_session_released_after_callbacks() {
    let node = MockNode::new();
    let dispatcher = start(&node, &two_group_config());
    let session = dispatcher.session(0).unwrap();

    let gh = node.send_goal(R1_ACTION, 1, happy_goal());
    assert!(session.try_lock().is_some());

    node.deliver("sda10f/r1/feedback_states", feedback(&["j1", "j2"], vec![0.0, 0.0]));
    assert!(session.try_lock().is_some());

    node.cancel_goal(R1_ACTION, &gh);
    assert!(session.try_lock().is_some());
    assert_eq!(gh.status(), GoalStatus::Canceled);
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_with_missing_group() {
    let node = MockNode::new();
    let _dispatcher = start(&node, &two_group_config());

    let gh = node.send_goal(
        "joint_trajectory_action",
        1,
        goal(&["j1", "j2"], vec![point(vec![0.5, 0.6], 1)]),
    );
    assert_eq!(gh.events(), vec![GoalEvent::Accept, GoalEvent::Succeed]);

    let sent = node.published("joint_path_command");
    assert_eq!(sent.len(), 1);
    let command = &sent[0];
    assert_eq!(command.joint_names, names(&["j1", "j2", "k1"]));
    assert!(!command.header.stamp.is_zero());
    assert_eq!(command.points.len(), 1);

    let groups = &command.points[0].groups;
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].positions, vec![0.5, 0.6]);
    assert_eq!(groups[0].velocities, vec![0.0, 0.0]);
    assert_eq!(groups[0].accelerations, vec![0.0, 0.0]);
    assert_eq!(groups[0].effort, vec![0.0, 0.0]);
    assert_eq!(groups[1].group_number, 1);
    assert_eq!(groups[1].positions, vec![0.0]);
    assert_eq!(groups[1].velocities, vec![0.0]);
    assert_eq!(groups[1].time_from_start, MsgDuration::from_secs(1));

    // Per-group sessions are not involved.
    assert!(node.published("sda10f/r1/joint_path_command").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fan_out_rejections() {
    let node = MockNode::new();
    let _dispatcher = start(&node, &two_group_config());

    let empty = node.send_goal("joint_trajectory_action", 1, goal(&["j1", "j2"], vec![]));
    assert_eq!(empty.status(), GoalStatus::Rejected);
    assert_eq!(
        empty.result().map(|r| r.error_code),
        Some(FollowJointTrajectoryResult::INVALID_GOAL)
    );

    let unknown = node.send_goal(
        "joint_trajectory_action",
        2,
        goal(&["j1", "j2", "x"], vec![point(vec![0.0; 3], 1)]),
    );
    assert_eq!(unknown.status(), GoalStatus::Rejected);
    assert_eq!(unknown.text(), "Joint names do not match");

    let split = node.send_goal(
        "joint_trajectory_action",
        3,
        goal(&["j1", "k1", "j2"], vec![point(vec![0.0; 3], 1)]),
    );
    assert_eq!(split.status(), GoalStatus::Rejected);
    assert!(node.published("joint_path_command").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_single_group_mode() {
    let node = MockNode::new();
    let dispatcher = start(&node, &single_group_config());

    assert!(dispatcher.registry().is_synthetic());
    assert!(!dispatcher.has_fan_out());
    assert_eq!(node.action_servers(), names(&["joint_trajectory_action"]));
    assert_eq!(node.subscriptions("joint_path_motion_reply"), 1);

    let gh = node.send_goal("joint_trajectory_action", 1, happy_goal());
    assert_eq!(gh.status(), GoalStatus::Accepted);
    assert_eq!(node.published("joint_path_command").len(), 1);

    node.deliver(
        "feedback_states",
        feedback(&["j2", "j1"], vec![2.0, 1.0]),
    );
    assert_eq!(gh.status(), GoalStatus::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_aborts_silent_group() {
    let node = MockNode::new();
    let _dispatcher = start(&node, &two_group_config());

    let gh = node.send_goal(R2_ACTION, 1, goal(&["k1"], vec![point(vec![1.0], 1)]));
    sleep(Duration::from_millis(1500)).await;

    assert_eq!(gh.status(), GoalStatus::Aborted);
    let sent = node.published("sda10f/r2/joint_path_command");
    assert_eq!(sent.len(), 2);
    assert!(sent[1].is_stop());
}

#[tokio::test(start_paused = true)]
async fn test_drop_releases_everything() {
    let node = MockNode::new();
    let dispatcher = start(&node, &two_group_config());
    let gh = node.send_goal(R1_ACTION, 1, happy_goal());
    let session = dispatcher.session(0).unwrap().clone();

    drop(dispatcher);
    assert!(node.action_servers().is_empty());
    assert_eq!(node.subscriptions("robot_status"), 0);
    assert_eq!(node.subscriptions("sda10f/r1/feedback_states"), 0);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(gh.status(), GoalStatus::Accepted);
    assert!(session.lock().is_active());
}

#[tokio::test]
async fn test_config_errors() {
    let node = MockNode::new();
    let result = Dispatcher::new(&node, &ActionConfig::default());
    assert!(matches!(result, Err(Error::NoGroupConfig)));
    assert!(node.action_servers().is_empty());
}

#[tokio::test]
async fn test_zero_watchdog_period() {
    let node = MockNode::new();
    let config = ActionConfig {
        watchdog_period: Duration::ZERO,
        ..two_group_config()
    };
    let result = Dispatcher::new(&node, &config);
    assert!(matches!(result, Err(Error::ZeroWatchdogPeriod)));
    assert!(node.action_servers().is_empty());
}

#[test]
fn test_requires_runtime() {
    let node = MockNode::new();
    let result = Dispatcher::new(&node, &two_group_config());
    assert!(matches!(result, Err(Error::NoRuntime)));
    assert!(node.action_servers().is_empty());
}
