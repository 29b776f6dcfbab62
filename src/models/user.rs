use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User represents a registered chat-platform user.
/// Maps to the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Internal surrogate key; foreign keys reference this, not `chat_user_id`.
    pub id: i64,
    /// Identifier assigned by the chat platform, unique per user.
    pub chat_user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_admin: bool,
    pub subscription_end: Option<NaiveDateTime>,
    pub registration_date: NaiveDateTime,
    pub is_banned: bool,
}

impl User {
    pub fn subscription_window(&self) -> SubscriptionWindow {
        SubscriptionWindow::new(self.subscription_end)
    }
}

/// A user's subscription window: a scalar end-timestamp, extended additively
/// by redeemed promo codes. Activity is always recomputed from the timestamp,
/// never stored as a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWindow {
    end: Option<NaiveDateTime>,
}

impl SubscriptionWindow {
    pub fn new(end: Option<NaiveDateTime>) -> Self {
        Self { end }
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    /// Whether the window covers `now`.
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        matches!(self.end, Some(end) if end > now)
    }

    /// Time left in the window, `None` when expired or never granted.
    pub fn remaining(&self, now: NaiveDateTime) -> Option<Duration> {
        match self.end {
            Some(end) if end > now => Some(end - now),
            _ => None,
        }
    }

    /// Additive extension: an active window grows from its current end, an
    /// expired or absent one restarts from `now`.
    pub fn extended_by(&self, duration: Duration, now: NaiveDateTime) -> NaiveDateTime {
        match self.end {
            Some(end) if end > now => end + duration,
            _ => now + duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_window_activity_is_derived_from_timestamp() {
        let window = SubscriptionWindow::new(Some(at(12)));
        assert!(window.is_active(at(11)));
        assert!(!window.is_active(at(13)));
        assert!(!SubscriptionWindow::new(None).is_active(at(11)));
    }

    #[test]
    fn test_active_window_extends_from_its_end() {
        let window = SubscriptionWindow::new(Some(at(12)));
        let extended = window.extended_by(Duration::hours(2), at(10));
        assert_eq!(extended, at(14));
    }

    #[test]
    fn test_expired_window_restarts_from_now() {
        let window = SubscriptionWindow::new(Some(at(8)));
        let extended = window.extended_by(Duration::hours(2), at(10));
        assert_eq!(extended, at(12));

        let fresh = SubscriptionWindow::new(None);
        assert_eq!(fresh.extended_by(Duration::hours(2), at(10)), at(12));
    }

    #[test]
    fn test_remaining() {
        let window = SubscriptionWindow::new(Some(at(12)));
        assert_eq!(window.remaining(at(10)), Some(Duration::hours(2)));
        assert_eq!(window.remaining(at(13)), None);
    }
}
