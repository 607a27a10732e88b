//! Wiring of sessions, watchdogs and transport resources.
//!
//! The [`Dispatcher`] owns everything created at startup: one session,
//! watchdog, publisher, pair of subscriptions and action server per motion
//! group, the shared robot status subscription, and the top-level fan-out
//! action server. Dropping it releases all of them.

use crate::{
    config::ActionConfig,
    error::{Error, Result},
    fanout::FanOut,
    session::{GoalSession, SharedSession},
    status::StatusCache,
    watchdog::Watchdog,
};
use dynjta_core::{
    ActionCallbacks, ActionServer, FollowJointTrajectoryFeedback, GroupId, GroupRegistry,
    MotionGroup, MotionReplyResult, Node, RobotStatus, topics,
};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tokio::runtime::Handle;
use tracing::{debug, info};

type Session<N> = SharedSession<<N as Node>::GoalHandle, <N as Node>::Publisher>;

/// Resources of one motion group. Fields drop in declaration order, so the
/// action server goes first and the session last.
struct GroupChannels<N: Node> {
    _action_server: N::ActionServer,
    _feedback: N::Subscription,
    _motion_reply: N::Subscription,
    _watchdog: Watchdog,
    session: Session<N>,
}

struct FanOutChannels<N: Node> {
    _action_server: N::ActionServer,
    _motion_reply: N::Subscription,
}

/// Top-level component routing transport events to per-group sessions.
pub struct Dispatcher<N: Node> {
    groups: BTreeMap<GroupId, GroupChannels<N>>,
    fan_out: Option<FanOutChannels<N>>,
    _robot_status_subscription: N::Subscription,
    robot_status: StatusCache,
    registry: Arc<GroupRegistry>,
    watchdog_period: Duration,
}

impl<N: Node> Dispatcher<N> {
    /// Creates and starts all resources described by `config`.
    ///
    /// Must be called from within a tokio runtime, which drives the
    /// watchdog timers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRuntime`] outside a tokio runtime, a configuration
    /// error if the registry cannot be built, or the transport error of the
    /// first resource that could not be created.
    pub fn new(node: &N, config: &ActionConfig) -> Result<Self> {
        Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let registry = Arc::new(config.registry()?);
        let robot_status = StatusCache::new();

        let robot_status_subscription = {
            let cache = robot_status.clone();
            node.create_subscription::<RobotStatus>(
                topics::ROBOT_STATUS,
                Box::new(move |msg| cache.store(msg)),
            )?
        };

        let mut groups = BTreeMap::new();
        for group in registry.groups() {
            let channels = Self::start_group(node, group, &robot_status, config)?;
            groups.insert(group.id(), channels);
        }

        let fan_out = if registry.is_synthetic() {
            debug!("Single group mode, no multi-group action server");
            None
        } else {
            Some(Self::start_fan_out(node, &registry)?)
        };

        info!(
            groups = registry.len(),
            goal_threshold = config.goal_threshold,
            watchdog_period = config.watchdog_period.as_secs_f64(),
            "Joint trajectory action started"
        );

        Ok(Self {
            groups,
            fan_out,
            _robot_status_subscription: robot_status_subscription,
            robot_status,
            registry,
            watchdog_period: config.watchdog_period,
        })
    }

    fn start_group(
        node: &N,
        group: &MotionGroup,
        robot_status: &StatusCache,
        config: &ActionConfig,
    ) -> Result<GroupChannels<N>> {
        let id = group.id();
        let publisher = node.create_publisher(&group.topic(topics::COMMAND))?;
        let session = GoalSession::new(
            group.clone(),
            publisher,
            robot_status.clone(),
            config.goal_threshold,
        )
        .into_shared();

        let feedback = {
            let session = session.clone();
            node.create_subscription::<FollowJointTrajectoryFeedback>(
                &group.topic(topics::FEEDBACK),
                Box::new(move |msg| session.lock().on_feedback(msg)),
            )?
        };

        let motion_reply = {
            let session = session.clone();
            node.create_subscription::<MotionReplyResult>(
                &group.topic(topics::MOTION_REPLY),
                Box::new(move |msg| session.lock().on_motion_reply(msg)),
            )?
        };

        let watchdog = Watchdog::spawn(session.clone(), config.watchdog_period)?;

        let callbacks = {
            let on_goal = session.clone();
            let on_cancel = session.clone();
            ActionCallbacks {
                on_goal: Box::new(move |gh| on_goal.lock().on_goal(gh)),
                on_cancel: Box::new(move |gh| on_cancel.lock().on_cancel(gh)),
            }
        };
        let mut action_server = node.create_action_server(&group.topic(topics::ACTION), callbacks)?;
        action_server.start()?;
        info!(group = id, action = action_server.name(), "Action server started");

        Ok(GroupChannels {
            _action_server: action_server,
            _feedback: feedback,
            _motion_reply: motion_reply,
            _watchdog: watchdog,
            session,
        })
    }

    fn start_fan_out(node: &N, registry: &Arc<GroupRegistry>) -> Result<FanOutChannels<N>> {
        let publisher = node.create_publisher(topics::COMMAND)?;
        let fan_out = Arc::new(FanOut::new(registry.clone(), publisher));

        let motion_reply = {
            let fan_out = fan_out.clone();
            node.create_subscription::<MotionReplyResult>(
                topics::MOTION_REPLY,
                Box::new(move |msg| fan_out.on_motion_reply(msg)),
            )?
        };

        let callbacks = {
            let on_goal = fan_out.clone();
            let on_cancel = fan_out;
            ActionCallbacks {
                on_goal: Box::new(move |gh| on_goal.on_goal(gh)),
                on_cancel: Box::new(move |gh| on_cancel.on_cancel(gh)),
            }
        };
        let mut action_server = node.create_action_server(topics::ACTION, callbacks)?;
        action_server.start()?;
        info!(action = action_server.name(), "Multi-group action server started");

        Ok(FanOutChannels {
            _action_server: action_server,
            _motion_reply: motion_reply,
        })
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Session of group `id`.
    pub fn session(&self, id: GroupId) -> Option<&Session<N>> {
        self.groups.get(&id).map(|channels| &channels.session)
    }

    /// Latest robot status shared by all sessions.
    pub fn robot_status(&self) -> &StatusCache {
        &self.robot_status
    }

    /// Whether the top-level multi-group action server exists.
    pub fn has_fan_out(&self) -> bool {
        self.fan_out.is_some()
    }

    pub fn watchdog_period(&self) -> Duration {
        self.watchdog_period
    }
}
