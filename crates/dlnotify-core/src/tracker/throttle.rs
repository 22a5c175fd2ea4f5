//! Global notification throttle: at most one attempt per interval.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval_ms: i64,
    last_notification_at: Option<i64>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: i64::try_from(interval.as_millis()).unwrap_or(i64::MAX),
            last_notification_at: None,
        }
    }

    /// Time of the last approved attempt, in ms since the Unix epoch.
    pub fn last_notification_at(&self) -> Option<i64> {
        self.last_notification_at
    }

    pub(super) fn restore(&mut self, last_notification_at: Option<i64>) {
        self.last_notification_at = last_notification_at;
    }

    /// Consume the gate at `now_ms`. An approval moves the gate forward even if
    /// the notification is never shown.
    pub fn try_acquire(&mut self, now_ms: i64) -> bool {
        if let Some(last) = self.last_notification_at {
            if now_ms.saturating_sub(last) < self.interval_ms {
                return false;
            }
        }
        self.last_notification_at = Some(now_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_most_one_approval_per_interval() {
        let mut t = Throttle::new(Duration::from_millis(1000));
        assert!(t.try_acquire(10_000));
        assert!(!t.try_acquire(10_100));
        assert!(!t.try_acquire(10_999));
        assert!(t.try_acquire(11_000));
        assert_eq!(t.last_notification_at(), Some(11_000));
    }

    #[test]
    fn denial_does_not_move_the_gate() {
        let mut t = Throttle::new(Duration::from_millis(1000));
        assert!(t.try_acquire(5_000));
        assert!(!t.try_acquire(5_500));
        assert_eq!(t.last_notification_at(), Some(5_000));
    }

    #[test]
    fn first_attempt_is_always_allowed() {
        let mut t = Throttle::new(Duration::from_millis(1000));
        assert_eq!(t.last_notification_at(), None);
        assert!(t.try_acquire(0));
        assert!(!t.try_acquire(999));
    }
}
