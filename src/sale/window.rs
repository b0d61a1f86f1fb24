//! Sale-window state machine. The `upcoming | active | ended` state is
//! always recomputed from the wall clock; it is never cached, so there
//! is no clock-skew invariant to maintain.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleState {
    Upcoming,
    Active,
    Ended,
}

/// Closed interval `[start_time, end_time]`: both bounds inclusive.
pub fn derive_state(now: DateTime<Utc>, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> SaleState {
    if now < start_time {
        SaleState::Upcoming
    } else if now > end_time {
        SaleState::Ended
    } else {
        SaleState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now - Duration::seconds(60), now + Duration::seconds(60))
    }

    #[test]
    fn before_start_is_upcoming() {
        let (start, end) = window();
        assert_eq!(derive_state(start - Duration::seconds(1), start, end), SaleState::Upcoming);
    }

    #[test]
    fn at_start_is_active_inclusive() {
        let (start, end) = window();
        assert_eq!(derive_state(start, start, end), SaleState::Active);
    }

    #[test]
    fn at_end_is_active_inclusive() {
        let (start, end) = window();
        assert_eq!(derive_state(end, start, end), SaleState::Active);
    }

    #[test]
    fn after_end_is_ended() {
        let (start, end) = window();
        assert_eq!(derive_state(end + Duration::seconds(1), start, end), SaleState::Ended);
    }
}
