#![allow(dead_code)]

//! In-memory transport recording everything the action server does.

use dynjta::{ActionConfig, GoalSession, GroupConfig, StatusCache};
use dynjta_core::{
    ActionCallbacks, ActionServer, DynamicJointTrajectory, Duration, Error, FollowJointTrajectoryFeedback,
    FollowJointTrajectoryGoal, FollowJointTrajectoryResult, GoalEvent, GoalHandle, GoalId, GoalStatus,
    JointTrajectory, JointTrajectoryPoint, Message, MessageCallback, MotionGroup, Node, Publisher,
    Result, RobotStatus, TriState,
};
use parking_lot::Mutex;
use std::{
    any::Any,
    collections::BTreeMap,
    sync::{Arc, Weak},
};

// ============================================================================
// Goal handle
// ============================================================================

/// What happened to one goal.
#[derive(Debug, Default, Clone)]
pub struct GoalRecord {
    pub status: GoalStatus,
    pub events: Vec<GoalEvent>,
    pub result: Option<FollowJointTrajectoryResult>,
    pub text: String,
    pub refuse_accept: bool,
}

#[derive(Clone)]
pub struct MockGoal {
    id: GoalId,
    goal: Arc<FollowJointTrajectoryGoal>,
    record: Arc<Mutex<GoalRecord>>,
}

impl MockGoal {
    pub fn new(id: u128, goal: FollowJointTrajectoryGoal) -> Self {
        Self {
            id: GoalId::from(id),
            goal: Arc::new(goal),
            record: Arc::new(Mutex::new(GoalRecord::default())),
        }
    }

    /// A goal whose `accept` fails.
    pub fn refusing_accept(self) -> Self {
        self.record.lock().refuse_accept = true;
        self
    }

    pub fn status(&self) -> GoalStatus {
        self.record.lock().status
    }

    pub fn events(&self) -> Vec<GoalEvent> {
        self.record.lock().events.clone()
    }

    pub fn result(&self) -> Option<FollowJointTrajectoryResult> {
        self.record.lock().result.clone()
    }

    pub fn text(&self) -> String {
        self.record.lock().text.clone()
    }

    /// Number of terminal transitions the goal went through.
    pub fn terminal_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| !matches!(e, GoalEvent::Accept))
            .count()
    }

    fn apply(
        &self,
        event: GoalEvent,
        result: Option<FollowJointTrajectoryResult>,
        text: &str,
    ) -> Result<()> {
        let mut record = self.record.lock();
        if event == GoalEvent::Accept && record.refuse_accept {
            return Err(Error::Transport("accept refused".to_string()));
        }
        let status = record.status;
        let next = status.apply(event).ok_or(Error::InvalidTransition {
            id: self.id,
            status,
            event,
        })?;
        record.status = next;
        record.events.push(event);
        if result.is_some() {
            record.result = result;
            record.text = text.to_string();
        }
        Ok(())
    }
}

impl GoalHandle for MockGoal {
    fn id(&self) -> GoalId {
        self.id
    }

    fn goal(&self) -> &FollowJointTrajectoryGoal {
        &self.goal
    }

    fn accept(&self) -> Result<()> {
        self.apply(GoalEvent::Accept, None, "")
    }

    fn reject(&self, result: FollowJointTrajectoryResult, text: &str) -> Result<()> {
        self.apply(GoalEvent::Reject, Some(result), text)
    }

    fn succeed(&self, result: FollowJointTrajectoryResult) -> Result<()> {
        self.apply(GoalEvent::Succeed, Some(result), "")
    }

    fn cancel(&self, result: FollowJointTrajectoryResult) -> Result<()> {
        self.apply(GoalEvent::Cancel, Some(result), "")
    }

    fn abort(&self, result: FollowJointTrajectoryResult) -> Result<()> {
        self.apply(GoalEvent::Abort, Some(result), "")
    }
}

// ============================================================================
// Publisher
// ============================================================================

#[derive(Clone)]
pub struct MockPublisher {
    topic: String,
    sent: Arc<Mutex<Vec<DynamicJointTrajectory>>>,
}

impl MockPublisher {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            sent: Arc::default(),
        }
    }

    pub fn sent(&self) -> Vec<DynamicJointTrajectory> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn stops(&self) -> usize {
        self.sent.lock().iter().filter(|m| m.is_stop()).count()
    }
}

impl Publisher<DynamicJointTrajectory> for MockPublisher {
    fn topic_name(&self) -> &str {
        &self.topic
    }

    fn send(&self, msg: &DynamicJointTrajectory) -> Result<()> {
        self.sent.lock().push(msg.clone());
        Ok(())
    }
}

// ============================================================================
// Node
// ============================================================================

type Slot = Arc<Mutex<Box<dyn Any + Send>>>;
type Callbacks = Arc<Mutex<ActionCallbacks<MockGoal>>>;

#[derive(Default)]
struct Registry {
    publishers: BTreeMap<String, MockPublisher>,
    subscriptions: BTreeMap<String, Vec<(u64, Slot)>>,
    action_servers: BTreeMap<String, (Callbacks, bool)>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct MockNode {
    inner: Arc<Mutex<Registry>>,
}

pub struct MockSubscription {
    topic: String,
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for MockSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock();
            if let Some(slots) = registry.subscriptions.get_mut(&self.topic) {
                slots.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

pub struct MockActionServer {
    name: String,
    registry: Weak<Mutex<Registry>>,
}

impl ActionServer for MockActionServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> Result<()> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| Error::Transport("node is gone".to_string()))?;
        if let Some(entry) = registry.lock().action_servers.get_mut(&self.name) {
            entry.1 = true;
        }
        Ok(())
    }
}

impl Drop for MockActionServer {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().action_servers.remove(&self.name);
        }
    }
}

impl Node for MockNode {
    type GoalHandle = MockGoal;
    type Publisher = MockPublisher;
    type Subscription = MockSubscription;
    type ActionServer = MockActionServer;

    fn create_publisher(&self, topic_name: &str) -> Result<MockPublisher> {
        let mut registry = self.inner.lock();
        let publisher = registry
            .publishers
            .entry(topic_name.to_string())
            .or_insert_with(|| MockPublisher::new(topic_name));
        Ok(publisher.clone())
    }

    fn create_subscription<T: Message>(
        &self,
        topic_name: &str,
        callback: MessageCallback<T>,
    ) -> Result<MockSubscription> {
        let mut registry = self.inner.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        let callback: Box<dyn Any + Send> = Box::new(callback);
        let slot: Slot = Arc::new(Mutex::new(callback));
        registry
            .subscriptions
            .entry(topic_name.to_string())
            .or_default()
            .push((id, slot));
        Ok(MockSubscription {
            topic: topic_name.to_string(),
            id,
            registry: Arc::downgrade(&self.inner),
        })
    }

    fn create_action_server(
        &self,
        action_name: &str,
        callbacks: ActionCallbacks<MockGoal>,
    ) -> Result<MockActionServer> {
        let mut registry = self.inner.lock();
        if registry.action_servers.contains_key(action_name) {
            return Err(Error::Transport(format!("action '{action_name}' already exists")));
        }
        registry
            .action_servers
            .insert(action_name.to_string(), (Arc::new(Mutex::new(callbacks)), false));
        Ok(MockActionServer {
            name: action_name.to_string(),
            registry: Arc::downgrade(&self.inner),
        })
    }
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `msg` to every subscription on `topic`; returns how many got it.
    pub fn deliver<T: Message>(&self, topic: &str, msg: T) -> usize {
        let slots: Vec<Slot> = self
            .inner
            .lock()
            .subscriptions
            .get(topic)
            .map(|slots| slots.iter().map(|(_, slot)| slot.clone()).collect())
            .unwrap_or_default();

        let mut delivered = 0;
        for slot in slots {
            let mut guard = slot.lock();
            let any: &mut (dyn Any + Send) = &mut **guard;
            if let Some(callback) = any.downcast_mut::<MessageCallback<T>>() {
                callback(msg.clone());
                delivered += 1;
            }
        }
        delivered
    }

    /// Submits a goal to a started action server.
    pub fn send_goal(&self, action: &str, id: u128, goal: FollowJointTrajectoryGoal) -> MockGoal {
        let gh = MockGoal::new(id, goal);
        let callbacks = self.started_server(action);
        let mut callbacks = callbacks.lock();
        (callbacks.on_goal)(gh.clone());
        gh
    }

    /// Requests cancellation of `gh` on `action`.
    pub fn cancel_goal(&self, action: &str, gh: &MockGoal) {
        let callbacks = self.started_server(action);
        let mut callbacks = callbacks.lock();
        (callbacks.on_cancel)(gh.clone());
    }

    fn started_server(&self, action: &str) -> Callbacks {
        let registry = self.inner.lock();
        let (callbacks, started) = registry
            .action_servers
            .get(action)
            .unwrap_or_else(|| panic!("no action server '{action}'"));
        assert!(*started, "action server '{action}' not started");
        callbacks.clone()
    }

    pub fn action_servers(&self) -> Vec<String> {
        self.inner.lock().action_servers.keys().cloned().collect()
    }

    pub fn subscriptions(&self, topic: &str) -> usize {
        self.inner
            .lock()
            .subscriptions
            .get(topic)
            .map_or(0, Vec::len)
    }

    pub fn publisher_topics(&self) -> Vec<String> {
        self.inner.lock().publishers.keys().cloned().collect()
    }

    /// Messages published on `topic` so far.
    pub fn published(&self, topic: &str) -> Vec<DynamicJointTrajectory> {
        self.inner
            .lock()
            .publishers
            .get(topic)
            .map(MockPublisher::sent)
            .unwrap_or_default()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

pub fn point(positions: Vec<f64>, secs: i32) -> JointTrajectoryPoint {
    JointTrajectoryPoint {
        positions,
        time_from_start: Duration::from_secs(secs),
        ..Default::default()
    }
}

pub fn goal(joints: &[&str], points: Vec<JointTrajectoryPoint>) -> FollowJointTrajectoryGoal {
    FollowJointTrajectoryGoal {
        trajectory: JointTrajectory {
            joint_names: names(joints),
            points,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Two points ending at `[1.0, 2.0]` for joints `[j1, j2]`.
pub fn happy_goal() -> FollowJointTrajectoryGoal {
    goal(
        &["j1", "j2"],
        vec![point(vec![0.0, 0.0], 0), point(vec![1.0, 2.0], 2)],
    )
}

pub fn feedback(joints: &[&str], actual: Vec<f64>) -> FollowJointTrajectoryFeedback {
    FollowJointTrajectoryFeedback {
        joint_names: names(joints),
        actual: JointTrajectoryPoint {
            positions: actual,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn robot_status(in_motion: TriState) -> RobotStatus {
    RobotStatus {
        in_motion,
        ..Default::default()
    }
}

pub fn group0() -> MotionGroup {
    MotionGroup::new(0, "r1", "", names(&["j1", "j2"]))
}

pub type TestSession = GoalSession<MockGoal, MockPublisher>;

/// Idle session of `group0` with threshold 0.01.
pub fn session() -> (TestSession, MockPublisher, StatusCache) {
    let publisher = MockPublisher::new("r1/joint_path_command");
    let status = StatusCache::new();
    let session = GoalSession::new(group0(), publisher.clone(), status.clone(), 0.01);
    (session, publisher, status)
}

/// Groups `sda10f/r1 = [j1, j2]` (id 0) and `sda10f/r2 = [k1]` (id 1).
pub fn two_group_config() -> ActionConfig {
    ActionConfig {
        topic_list: Some(vec![
            GroupConfig {
                name: "r1".into(),
                ns: "sda10f".into(),
                group: 0,
                joints: names(&["j1", "j2"]),
            },
            GroupConfig {
                name: "r2".into(),
                ns: "sda10f".into(),
                group: 1,
                joints: names(&["k1"]),
            },
        ]),
        ..Default::default()
    }
}

pub fn single_group_config() -> ActionConfig {
    ActionConfig {
        controller_joint_names: names(&["j1", "j2"]),
        ..Default::default()
    }
}
