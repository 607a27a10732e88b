//! Feedback watchdog.
//!
//! Each motion group gets a periodic timer. When a tick finds an active
//! goal and no controller feedback since the previous tick, the goal is
//! aborted.

use crate::{
    error::{Error, Result},
    session::{GoalSession, SharedSession},
};
use dynjta_core::{DynamicJointTrajectory, GoalHandle, GroupId, Publisher};
use std::time::Duration;
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

impl<G, P> GoalSession<G, P>
where
    G: GoalHandle,
    P: Publisher<DynamicJointTrajectory>,
{
    /// One watchdog tick. The feedback window is reset afterwards.
    pub fn on_watchdog(&mut self, period: Duration) {
        let group = self.group().id();
        if self.is_active() && !self.feedback_seen() {
            if self.last_feedback().is_none() {
                warn!(group, "Aborting goal because we have never heard a controller state message.");
            } else {
                warn!(
                    group,
                    "Aborting goal because we haven't heard from the controller in {} seconds",
                    period.as_secs_f64()
                );
            }
            self.abort_active();
        }
        self.reset_feedback_seen();
    }
}

/// Periodic task ticking one session. Dropping it stops the task.
#[derive(Debug)]
pub struct Watchdog {
    group: GroupId,
    period: Duration,
    task: JoinHandle<()>,
}

impl Watchdog {
    /// Spawns the watchdog of `session` on the current tokio runtime.
    ///
    /// The first tick fires one `period` after spawning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroWatchdogPeriod`] for a zero `period` and
    /// [`Error::NoRuntime`] when called outside a tokio runtime.
    pub fn spawn<G, P>(session: SharedSession<G, P>, period: Duration) -> Result<Self>
    where
        G: GoalHandle,
        P: Publisher<DynamicJointTrajectory> + 'static,
    {
        if period.is_zero() {
            return Err(Error::ZeroWatchdogPeriod);
        }
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let group = session.lock().group().id();

        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                session.lock().on_watchdog(period);
            }
        });
        debug!(group, period = period.as_secs_f64(), "Watchdog started");

        Ok(Self { group, period, task })
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.task.abort();
        debug!(group = self.group, "Watchdog stopped");
    }
}
