//! # Subscription Status
//!
//! Read-side subscription queries: the user's current window summarized for
//! display, and the purchasable plan catalog. All reads go through the
//! cache-aside accessor; writes happen elsewhere (promo redemption, operator
//! tooling).

use crate::accessor::CacheAside;
use crate::error::Result;
use crate::models::SubscriptionPlan;
use chrono::{NaiveDateTime, Utc};

/// A user's subscription state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionStatus {
    Active {
        until: NaiveDateTime,
        days_left: i64,
    },
    Expired {
        since: NaiveDateTime,
    },
    NeverSubscribed,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Active { until, days_left } => format!(
                "Your subscription is active until {} ({} day(s) left).",
                until.format("%Y-%m-%d %H:%M"),
                days_left
            ),
            Self::Expired { since } => format!(
                "Your subscription expired on {}.",
                since.format("%Y-%m-%d %H:%M")
            ),
            Self::NeverSubscribed => {
                "You have no subscription yet. Redeem a code or choose a plan.".to_string()
            }
        }
    }
}

#[derive(Clone)]
pub struct SubscriptionService {
    accessor: CacheAside,
}

impl SubscriptionService {
    pub fn new(accessor: CacheAside) -> Self {
        Self { accessor }
    }

    pub async fn status(&self, chat_user_id: i64) -> Result<SubscriptionStatus> {
        self.status_at(chat_user_id, Utc::now().naive_utc()).await
    }

    /// Status relative to an explicit `now`, for deterministic callers.
    pub async fn status_at(
        &self,
        chat_user_id: i64,
        now: NaiveDateTime,
    ) -> Result<SubscriptionStatus> {
        let window = self.accessor.subscription_window(chat_user_id).await?;
        Ok(match window.end() {
            Some(end) if end > now => SubscriptionStatus::Active {
                until: end,
                days_left: (end - now).num_days(),
            },
            Some(end) => SubscriptionStatus::Expired { since: end },
            None => SubscriptionStatus::NeverSubscribed,
        })
    }

    pub async fn plans(&self) -> Result<Vec<SubscriptionPlan>> {
        self.accessor.subscription_plans().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::CacheConfig;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use std::sync::Arc;

    fn service_with(store: Arc<MemoryStore>) -> SubscriptionService {
        let accessor = CacheAside::new(
            Arc::new(MemoryCache::new()),
            store,
            CacheConfig::default(),
        );
        SubscriptionService::new(accessor)
    }

    #[tokio::test]
    async fn test_active_status_reports_days_left() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now().naive_utc();
        let end = now + Duration::days(10);
        store.seed_user(100, Some(end));
        let service = service_with(store);

        let status = service.status_at(100, now).await.unwrap();
        assert_eq!(
            status,
            SubscriptionStatus::Active {
                until: end,
                days_left: 10,
            }
        );
        assert!(status.is_active());
    }

    #[tokio::test]
    async fn test_expired_and_missing_windows() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now().naive_utc();
        let past = now - Duration::days(3);
        store.seed_user(100, Some(past));
        store.seed_user(200, None);
        let service = service_with(store);

        assert_eq!(
            service.status_at(100, now).await.unwrap(),
            SubscriptionStatus::Expired { since: past }
        );
        assert_eq!(
            service.status_at(200, now).await.unwrap(),
            SubscriptionStatus::NeverSubscribed
        );
        assert!(!service.status_at(200, now).await.unwrap().is_active());
    }

    #[tokio::test]
    async fn test_plans_are_served_through_the_cache() {
        let store = Arc::new(MemoryStore::new());
        store.seed_plan("Monthly", 30, 500);
        let service = service_with(store.clone());

        let first = service.plans().await.unwrap();
        let second = service.plans().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.read_count(), 1);
    }
}
