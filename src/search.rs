//! # Search Toggle
//!
//! Turns job-notification delivery on and off per user. Starting is gated on
//! an active subscription window and at least one configured direction; the
//! on/off flag itself lives in the cache under a TTL that is refreshed on
//! every liveness check, so delivery stops by itself for users who vanish.

use crate::accessor::CacheAside;
use crate::cache::keys;
use crate::error::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Outcome of a start-search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStart {
    Started,
    NoActiveSubscription,
    NoDirections,
}

impl SearchStart {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Started => "Search started, new matching jobs will be sent to you.",
            Self::NoActiveSubscription => {
                "You have no active subscription. Redeem a code or choose a plan first."
            }
            Self::NoDirections => "Add at least one job direction before starting the search.",
        }
    }
}

#[derive(Clone)]
pub struct SearchService {
    accessor: CacheAside,
}

impl SearchService {
    pub fn new(accessor: CacheAside) -> Self {
        Self { accessor }
    }

    /// Start delivery for a user. Both gates are checked before the flag is
    /// written; a rejected start leaves the flag untouched.
    pub async fn start(&self, chat_user_id: i64) -> Result<SearchStart> {
        let window = self.accessor.subscription_window(chat_user_id).await?;
        if !window.is_active(Utc::now().naive_utc()) {
            debug!(chat_user_id, "search start rejected, subscription inactive");
            return Ok(SearchStart::NoActiveSubscription);
        }

        if self.accessor.user_directions(chat_user_id).await?.is_empty() {
            debug!(chat_user_id, "search start rejected, no directions");
            return Ok(SearchStart::NoDirections);
        }

        let key = keys::search_active(chat_user_id);
        if let Err(e) = self
            .accessor
            .cache()
            .set_ex(&key, "1", self.accessor.ttl())
            .await
        {
            warn!(key, error = %e, "search flag write failed");
        }
        info!(chat_user_id, "search started");
        Ok(SearchStart::Started)
    }

    /// Whether delivery is on for a user. A live flag gets its TTL refreshed
    /// with the short interval, keeping active users hot without pinning
    /// abandoned flags forever.
    pub async fn is_active(&self, chat_user_id: i64) -> Result<bool> {
        let key = keys::search_active(chat_user_id);
        let active = match self.accessor.cache().get(&key).await {
            Ok(value) => value.as_deref() == Some("1"),
            Err(e) => {
                warn!(key, error = %e, "search flag read failed, treating as off");
                return Ok(false);
            }
        };

        if active {
            if let Err(e) = self
                .accessor
                .cache()
                .expire(&key, self.accessor.short_ttl())
                .await
            {
                warn!(key, error = %e, "search flag ttl refresh failed");
            }
        }
        Ok(active)
    }

    /// Stop delivery immediately.
    pub async fn stop(&self, chat_user_id: i64) -> Result<()> {
        let key = keys::search_active(chat_user_id);
        if let Err(e) = self.accessor.cache().delete(&key).await {
            warn!(key, error = %e, "search flag delete failed");
        }
        info!(chat_user_id, "search stopped");
        Ok(())
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

    fn service_with(store: Arc<MemoryStore>) -> SearchService {
        let accessor = CacheAside::new(
            Arc::new(MemoryCache::new()),
            store,
            CacheConfig::default(),
        );
        SearchService::new(accessor)
    }

    #[tokio::test]
    async fn test_start_requires_active_subscription() {
        let store = Arc::new(MemoryStore::new());
        store.seed_user(100, None);
        let service = service_with(store);

        let outcome = service.start(100).await.unwrap();
        assert_eq!(outcome, SearchStart::NoActiveSubscription);
        assert!(outcome.message().contains("no active subscription"));
        // Rejection must not flip the flag.
        assert!(!service.is_active(100).await.unwrap());
    }

    #[tokio::test]
    async fn test_start_requires_at_least_one_direction() {
        let store = Arc::new(MemoryStore::new());
        let end = Utc::now().naive_utc() + Duration::days(7);
        store.seed_user(100, Some(end));
        let service = service_with(store);

        let outcome = service.start(100).await.unwrap();
        assert_eq!(outcome, SearchStart::NoDirections);
        assert!(!service.is_active(100).await.unwrap());
    }

    #[tokio::test]
    async fn test_start_and_stop_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let end = Utc::now().naive_utc() + Duration::days(7);
        let user = store.seed_user(100, Some(end));
        let direction = store.seed_direction("Backend", &["go"]);
        store.seed_user_direction(user.id, direction.id, "go");
        let service = service_with(store);

        assert_eq!(service.start(100).await.unwrap(), SearchStart::Started);
        assert!(service.is_active(100).await.unwrap());

        service.stop(100).await.unwrap();
        assert!(!service.is_active(100).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_subscription_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let end = Utc::now().naive_utc() - Duration::days(1);
        store.seed_user(100, Some(end));
        let service = service_with(store);

        assert_eq!(
            service.start(100).await.unwrap(),
            SearchStart::NoActiveSubscription
        );
    }
}
