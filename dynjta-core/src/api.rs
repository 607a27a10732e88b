//! Abstract interfaces of the collaborators the action server is wired to.
//!
//! The transport (publish/subscribe and the action protocol) is external.
//! A transport implements [`Node`] and hands out publishers, subscriptions
//! and action servers; the server core only talks to these traits.
//!
//! # Traits
//!
//! - [`Node`] - Creates publishers, subscriptions and action servers
//! - [`Publisher`] - Publishes messages to a topic
//! - [`GoalHandle`] - One `FollowJointTrajectory` goal as seen by the server
//! - [`ActionServer`] - A started action server
//!
//! # Example
//!
//! ```ignore
//! use dynjta_core::api::*;
//!
//! fn setup<N: Node>(node: &N) -> dynjta_core::Result<()> {
//!     let publisher = node.create_publisher("joint_path_command")?;
//!     publisher.send(&DynamicJointTrajectory::default())?;
//!     Ok(())
//! }
//! ```

use crate::{
    action::GoalId,
    error::Result,
    msg::{DynamicJointTrajectory, FollowJointTrajectoryGoal, FollowJointTrajectoryResult, Message},
};

// ============================================================================
// Publisher Trait
// ============================================================================

/// A publisher that can send messages to a topic.
///
/// Publishing is fire-and-forget: delivery is the transport's concern.
/// `send` is called with the owning group's session locked, so it must
/// not synchronously invoke any callback registered with the same node.
pub trait Publisher<T>: Send + Sync {
    /// Get the topic name.
    fn topic_name(&self) -> &str;

    /// Publish a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot hand the message over.
    fn send(&self, msg: &T) -> Result<()>;
}

// ============================================================================
// Goal Handle Trait
// ============================================================================

/// Server-side handle of one action goal, owned by the action framework.
///
/// Transitions take `&self` and may be refused by the framework
/// (e.g. a terminal transition on a goal that already finished).
///
/// # Reentrancy
///
/// Goal and cancel callbacks run with the owning group's session locked,
/// and the transitions below are called under that lock. Implementations
/// must not invoke [`ActionCallbacks`] or subscription callbacks
/// synchronously from inside a transition; a cancel delivered from
/// `accept` would deadlock on the session lock. Queue such requests and
/// deliver them after the transition returns.
pub trait GoalHandle: Send + 'static {
    /// Identifier used to match cancel requests to the active goal.
    fn id(&self) -> GoalId;

    /// The submitted goal.
    fn goal(&self) -> &FollowJointTrajectoryGoal;

    /// Mark the goal accepted.
    fn accept(&self) -> Result<()>;

    /// Reject the goal with a result and a reason.
    fn reject(&self, result: FollowJointTrajectoryResult, text: &str) -> Result<()>;

    /// Mark the goal succeeded.
    fn succeed(&self, result: FollowJointTrajectoryResult) -> Result<()>;

    /// Mark the goal canceled.
    fn cancel(&self, result: FollowJointTrajectoryResult) -> Result<()>;

    /// Mark the goal aborted.
    fn abort(&self, result: FollowJointTrajectoryResult) -> Result<()>;
}

// ============================================================================
// Action Server Trait
// ============================================================================

/// Callback invoked with an inbound goal or cancel request.
pub type GoalCallback<G> = Box<dyn FnMut(G) + Send>;

/// Callback invoked with an inbound message.
pub type MessageCallback<T> = Box<dyn FnMut(T) + Send>;

/// Callbacks registered with an action server.
///
/// Neither callback is reentrant; see [`GoalHandle`].
pub struct ActionCallbacks<G> {
    /// Called for every new goal.
    pub on_goal: GoalCallback<G>,

    /// Called for every cancel request; the handle identifies the goal.
    pub on_cancel: GoalCallback<G>,
}

/// An action server created by a [`Node`].
pub trait ActionServer: Send {
    /// Get the action name.
    fn name(&self) -> &str;

    /// Start accepting goals. Goals are not delivered before this call.
    fn start(&mut self) -> Result<()>;
}

// ============================================================================
// Node Trait
// ============================================================================

/// Factory for all transport resources used by the dispatcher.
///
/// Every resource returned lives until it is dropped; dropping it releases
/// the underlying transport entity.
pub trait Node: Send + Sync {
    /// Goal handle type delivered by this node's action servers.
    type GoalHandle: GoalHandle;

    /// Publisher type for outbound trajectories.
    type Publisher: Publisher<DynamicJointTrajectory> + 'static;

    /// Subscription guard; the callback stays registered while it is alive.
    type Subscription: Send + 'static;

    /// Action server type.
    type ActionServer: ActionServer + 'static;

    /// Create a trajectory publisher.
    ///
    /// # Arguments
    ///
    /// * `topic_name` - Topic name (can be relative or absolute)
    fn create_publisher(&self, topic_name: &str) -> Result<Self::Publisher>;

    /// Create a subscription that invokes `callback` for every message.
    ///
    /// # Arguments
    ///
    /// * `topic_name` - Topic name (can be relative or absolute)
    /// * `callback` - Called once per received message
    fn create_subscription<T: Message>(
        &self,
        topic_name: &str,
        callback: MessageCallback<T>,
    ) -> Result<Self::Subscription>;

    /// Create a `FollowJointTrajectory` action server. It must be started
    /// with [`ActionServer::start`] before goals are delivered.
    fn create_action_server(
        &self,
        action_name: &str,
        callbacks: ActionCallbacks<Self::GoalHandle>,
    ) -> Result<Self::ActionServer>;
}
