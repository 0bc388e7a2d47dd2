//! Observation window for evidence gathering.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minimum lookback in hours.
pub const MIN_WINDOW_HOURS: u32 = 1;

/// Maximum lookback in hours (7 days).
pub const MAX_WINDOW_HOURS: u32 = 168;

/// Default lookback in hours.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// How far back a provider should look for observations.
///
/// Windows are clamped to `[1h, 168h]` at construction, so a provider never
/// has to defend against a zero or unbounded lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceWindow {
    hours: u32,
}

impl EvidenceWindow {
    /// A window covering the given number of hours, clamped to `[1, 168]`.
    #[must_use]
    pub fn hours(hours: u32) -> Self {
        Self {
            hours: hours.clamp(MIN_WINDOW_HOURS, MAX_WINDOW_HOURS),
        }
    }

    /// A window covering the given number of days, clamped to `[1h, 168h]`.
    #[must_use]
    pub fn days(days: u32) -> Self {
        Self::hours(days.saturating_mul(24))
    }

    /// The lookback length in hours.
    #[must_use]
    pub fn as_hours(self) -> u32 {
        self.hours
    }

    /// The lookback as a chrono duration.
    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::hours(i64::from(self.hours))
    }

    /// The start of the window relative to `now`.
    #[must_use]
    pub fn start_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.as_duration()
    }
}

impl Default for EvidenceWindow {
    fn default() -> Self {
        Self::hours(DEFAULT_WINDOW_HOURS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(24, 24)]
    #[case(200, 168)]
    fn hours_are_clamped(#[case] raw: u32, #[case] expected: u32) {
        assert_eq!(EvidenceWindow::hours(raw).as_hours(), expected);
    }

    #[test]
    fn days_convert_and_clamp() {
        assert_eq!(EvidenceWindow::days(2).as_hours(), 48);
        assert_eq!(EvidenceWindow::days(30).as_hours(), MAX_WINDOW_HOURS);
    }

    #[test]
    fn default_is_24_hours() {
        assert_eq!(EvidenceWindow::default().as_hours(), 24);
    }

    #[test]
    fn start_is_window_before_now() {
        let now = Utc::now();
        let window = EvidenceWindow::hours(6);
        assert_eq!(now - window.start_from(now), Duration::hours(6));
    }
}
