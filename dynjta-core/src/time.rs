//! Time-related types carried in message headers and trajectory points.

use std::time::{Duration as StdDuration, SystemTime};

/// A timestamp as carried on the wire.
///
/// `sec` is an `i32`, so conversions from [`SystemTime`] saturate at
/// `i32::MAX` seconds instead of wrapping.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    /// Seconds since UNIX epoch.
    pub sec: i32,

    /// Nanoseconds component.
    pub nanosec: u32,
}

impl Time {
    /// Creates a new Time instance.
    pub const fn new(sec: i32, nanosec: u32) -> Self {
        Self { sec, nanosec }
    }

    /// Creates a Time representing the UNIX epoch (0 seconds).
    pub const fn zero() -> Self {
        Self { sec: 0, nanosec: 0 }
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    pub fn is_zero(&self) -> bool {
        self.sec == 0 && self.nanosec == 0
    }
}

/// A signed-seconds duration as carried on the wire (`time_from_start`,
/// `goal_time_tolerance`).
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Duration {
    /// Seconds component.
    pub sec: i32,

    /// Nanoseconds component.
    pub nanosec: u32,
}

impl Duration {
    /// Creates a new Duration instance.
    pub const fn new(sec: i32, nanosec: u32) -> Self {
        Self { sec, nanosec }
    }

    /// Creates a zero duration.
    pub const fn zero() -> Self {
        Self { sec: 0, nanosec: 0 }
    }

    /// Creates a duration of whole seconds.
    pub const fn from_secs(sec: i32) -> Self {
        Self { sec, nanosec: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.sec == 0 && self.nanosec == 0
    }

    /// Duration in seconds as a float; negative durations stay negative.
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

fn saturating_sec(sec: u64) -> i32 {
    i32::try_from(sec).unwrap_or(i32::MAX)
}

impl From<&SystemTime> for Time {
    fn from(t: &SystemTime) -> Self {
        match t.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(dur) => Time {
                sec: saturating_sec(dur.as_secs()),
                nanosec: dur.subsec_nanos(),
            },
            Err(_) => Time::zero(),
        }
    }
}

impl From<SystemTime> for Time {
    fn from(t: SystemTime) -> Self {
        (&t).into()
    }
}

impl From<&Time> for SystemTime {
    fn from(t: &Time) -> Self {
        let secs = StdDuration::from_secs(t.sec.max(0) as u64);
        SystemTime::UNIX_EPOCH + secs + StdDuration::from_nanos(t.nanosec as u64)
    }
}

impl From<Time> for SystemTime {
    fn from(t: Time) -> Self {
        (&t).into()
    }
}

impl From<&StdDuration> for Duration {
    fn from(t: &StdDuration) -> Self {
        Duration {
            sec: saturating_sec(t.as_secs()),
            nanosec: t.subsec_nanos(),
        }
    }
}

impl From<StdDuration> for Duration {
    fn from(t: StdDuration) -> Self {
        (&t).into()
    }
}
