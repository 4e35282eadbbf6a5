//! Windows FILETIME timestamps, as stored in the date columns.

use std::fmt;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// FILETIME of 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_TICKS: u64 = 116_444_736_000_000_000;

/// FILETIME resolution is 100 ns.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// 100-nanosecond intervals since 1601-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filetime(pub u64);

impl Filetime {
    /// Convert a Unix timestamp. Returns `None` before 1601.
    pub fn from_unix(secs: i64, nanos: u32) -> Option<Self> {
        let ticks = i128::from(secs) * i128::from(TICKS_PER_SECOND)
            + i128::from(nanos / 100)
            + i128::from(UNIX_EPOCH_TICKS);
        u64::try_from(ticks).ok().map(Self)
    }

    /// Convert a UTC date-time.
    pub fn from_datetime(dt: &DateTime<Utc>) -> Option<Self> {
        Self::from_unix(dt.timestamp(), dt.timestamp_subsec_nanos())
    }

    /// Convert a system time.
    pub fn from_system_time(time: SystemTime) -> Option<Self> {
        Self::from_datetime(&DateTime::<Utc>::from(time))
    }

    /// The current time.
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now()).unwrap_or_default()
    }

    /// Convert back to a UTC date-time.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let since_unix = i128::from(self.0) - i128::from(UNIX_EPOCH_TICKS);
        let per_second = i128::from(TICKS_PER_SECOND);
        let secs = i64::try_from(since_unix.div_euclid(per_second)).ok()?;
        let nanos = u32::try_from(since_unix.rem_euclid(per_second) * 100).ok()?;
        DateTime::from_timestamp(secs, nanos)
    }

    /// Raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Filetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Filetime> for u64 {
    fn from(ft: Filetime) -> Self {
        ft.0
    }
}
