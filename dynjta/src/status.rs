//! Process-wide cache of the latest robot status.

use dynjta_core::{RobotStatus, TriState};
use parking_lot::RwLock;
use std::sync::Arc;

/// Latest [`RobotStatus`] received on the shared status topic.
///
/// Cloning shares the same cache. Writes replace the whole message, so
/// readers always see a consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct StatusCache {
    inner: Arc<RwLock<Option<RobotStatus>>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self, status: RobotStatus) {
        *self.inner.write() = Some(status);
    }

    /// Snapshot of the last status, `None` until one was received.
    pub fn load(&self) -> Option<RobotStatus> {
        self.inner.read().clone()
    }

    /// The `in_motion` flag of the last status, `None` until one was received.
    pub fn in_motion(&self) -> Option<TriState> {
        self.inner.read().as_ref().map(|status| status.in_motion)
    }
}
