//! Hours during which scheduled passes may touch the API.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

pub const DEFAULT_START_HOUR: u32 = 6;
pub const DEFAULT_END_HOUR: u32 = 22;
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Inclusive local-hour window, enforced only in production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingWindow {
    pub start_hour: u32,
    pub end_hour: u32,
    pub timezone: Tz,
    pub enforce: bool,
}

impl Default for OperatingWindow {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            timezone: DEFAULT_TIMEZONE,
            enforce: false,
        }
    }
}

impl OperatingWindow {
    /// Window that is enforced only when `environment` is `production`.
    pub fn for_environment(environment: &str) -> Self {
        Self {
            enforce: environment.eq_ignore_ascii_case("production"),
            ..Self::default()
        }
    }

    /// A window that never blocks.
    pub fn always_open() -> Self {
        Self::default()
    }

    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.timezone).hour()
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        if !self.enforce {
            return true;
        }
        let hour = self.local_hour(now);
        (self.start_hour..=self.end_hour).contains(&hour)
    }
}
