//! # Cache-Aside Accessor
//!
//! Read-through access to every durable aggregate the bot serves hot: catalog
//! directions, a user's selected directions, per-direction keyword lists, the
//! promo-code projection, usage counters, subscription end dates, plans, and
//! system settings.
//!
//! ## Contract
//!
//! Each aggregate exposes `get-or-load` (cache read, store fallback, cache
//! repopulation with the process-wide TTL) and an explicit `invalidate` that
//! must be called synchronously after any store write touching the aggregate's
//! rows. TTL expiry is a safety net only, never the correctness mechanism.
//!
//! Cache writes are best-effort: a cache failure is logged and the operation
//! proceeds with the authoritative value already in hand.

use crate::cache::{keys, KeyValueCache};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::{
    BotSettings, JobDirection, PromoCode, SubscriptionPlan, SubscriptionWindow, UserDirectionView,
};
use crate::store::RecordStore;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct CacheAside {
    cache: Arc<dyn KeyValueCache>,
    store: Arc<dyn RecordStore>,
    config: CacheConfig,
}

impl CacheAside {
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        store: Arc<dyn RecordStore>,
        config: CacheConfig,
    ) -> Self {
        Self {
            cache,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn KeyValueCache> {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.config.record_interval()
    }

    pub fn short_ttl(&self) -> Duration {
        self.config.short_record_interval()
    }

    // -- best-effort cache primitives ---------------------------------------

    /// Cache read degraded to a miss on failure.
    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Cache write that never fails the surrounding operation.
    async fn cache_set(&self, key: &str, value: &str, ttl: Duration) {
        if let Err(e) = self.cache.set_ex(key, value, ttl).await {
            warn!(key, error = %e, "cache write failed, continuing without cache");
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(key, error = %e, "cache delete failed");
        }
    }

    fn encode<T: serde::Serialize>(value: &T) -> Option<String> {
        serde_json::to_string(value).ok()
    }

    fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
        serde_json::from_str(raw).ok()
    }

    // -- direction catalog --------------------------------------------------

    /// Catalog-wide direction list. An empty catalog is cached as an explicit
    /// empty marker; repeated full-table misses are the expensive case.
    pub async fn job_directions(&self) -> Result<Vec<JobDirection>> {
        let key = keys::job_directions();
        if let Some(raw) = self.cache_get(&key).await {
            if let Some(directions) = Self::decode(&raw) {
                return Ok(directions);
            }
        }

        let directions = self.store.list_job_directions().await?;
        if let Some(encoded) = Self::encode(&directions) {
            self.cache_set(&key, &encoded, self.ttl()).await;
        }
        debug!(count = directions.len(), "direction catalog loaded from store");
        Ok(directions)
    }

    pub async fn invalidate_job_directions(&self) {
        self.cache_delete(&keys::job_directions()).await;
    }

    /// Recommended keywords for one direction. An unknown direction yields an
    /// empty list and is not cached.
    pub async fn direction_keywords(&self, direction_id: i64) -> Result<Vec<String>> {
        let key = keys::direction_keywords(direction_id);
        if let Some(raw) = self.cache_get(&key).await {
            if let Some(keywords) = Self::decode(&raw) {
                return Ok(keywords);
            }
        }

        let Some(direction) = self.store.find_job_direction(direction_id).await? else {
            return Ok(Vec::new());
        };
        let keywords = direction.keywords();
        if let Some(encoded) = Self::encode(&keywords) {
            self.cache_set(&key, &encoded, self.ttl()).await;
        }
        Ok(keywords)
    }

    pub async fn invalidate_direction_keywords(&self, direction_id: i64) {
        self.cache_delete(&keys::direction_keywords(direction_id))
            .await;
    }

    // -- user directions ----------------------------------------------------

    /// A user's selected directions with catalog names. Empty results are not
    /// negative-cached: absence is common and cheap to re-check.
    pub async fn user_directions(&self, chat_user_id: i64) -> Result<Vec<UserDirectionView>> {
        let key = keys::user_directions(chat_user_id);
        if let Some(raw) = self.cache_get(&key).await {
            if let Some(directions) = Self::decode(&raw) {
                debug!(chat_user_id, "user directions served from cache");
                return Ok(directions);
            }
        }

        let Some(user) = self.store.find_user_by_chat_id(chat_user_id).await? else {
            debug!(chat_user_id, "no user row, returning empty direction list");
            return Ok(Vec::new());
        };

        let directions = self.store.list_user_directions(user.id).await?;
        if !directions.is_empty() {
            if let Some(encoded) = Self::encode(&directions) {
                self.cache_set(&key, &encoded, self.ttl()).await;
            }
        }
        Ok(directions)
    }

    pub async fn invalidate_user_directions(&self, chat_user_id: i64) {
        self.cache_delete(&keys::user_directions(chat_user_id)).await;
    }

    // -- promo codes --------------------------------------------------------

    /// Promo-code projection keyed by the literal code text, stored as hash
    /// fields so the attributes live under one logical entity. Resolution
    /// failure is not negative-cached.
    pub async fn promo_code(&self, code: &str) -> Result<Option<PromoCode>> {
        let key = keys::promo_code(code);
        match self.cache.hget_all(&key).await {
            Ok(fields) if !fields.is_empty() => {
                if let Some(promo) = Self::promo_from_fields(&fields) {
                    return Ok(Some(promo));
                }
            }
            Ok(_) => {}
            Err(e) => warn!(key, error = %e, "cache hash read failed, treating as miss"),
        }

        let Some(promo) = self.store.find_promo_code_by_code(code).await? else {
            return Ok(None);
        };

        if let Err(e) = self
            .cache
            .hset_all(&key, Self::promo_to_fields(&promo), self.ttl())
            .await
        {
            warn!(key, error = %e, "cache hash write failed, continuing");
        }
        debug!(code, promo_code_id = promo.id, "promo code loaded from store");
        Ok(Some(promo))
    }

    fn promo_to_fields(promo: &PromoCode) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        fields.insert("id".to_string(), promo.id.to_string());
        fields.insert("code".to_string(), promo.code.clone());
        if let Some(name) = &promo.name {
            fields.insert("name".to_string(), name.clone());
        }
        fields.insert("promo_type".to_string(), promo.promo_type.clone());
        fields.insert("value".to_string(), promo.value.clone());
        fields.insert("max_uses".to_string(), promo.max_uses.to_string());
        fields
    }

    fn promo_from_fields(fields: &HashMap<String, String>) -> Option<PromoCode> {
        Some(PromoCode {
            id: fields.get("id")?.parse().ok()?,
            code: fields.get("code")?.clone(),
            name: fields.get("name").cloned(),
            promo_type: fields.get("promo_type")?.clone(),
            value: fields.get("value")?.clone(),
            max_uses: fields.get("max_uses")?.parse().ok()?,
        })
    }

    /// Current redemption count for a code, counter-cached.
    pub async fn promo_usage_count(&self, promo_code_id: i64) -> Result<i64> {
        let key = keys::promo_usage_count(promo_code_id);
        if let Some(raw) = self.cache_get(&key).await {
            if let Ok(count) = raw.parse() {
                return Ok(count);
            }
        }

        let count = self.store.count_promo_usages(promo_code_id).await?;
        self.cache_set(&key, &count.to_string(), self.ttl()).await;
        Ok(count)
    }

    /// Atomic fast-path counter bump after a committed redemption.
    pub async fn increment_promo_usage(&self, promo_code_id: i64) {
        let key = keys::promo_usage_count(promo_code_id);
        if let Err(e) = self.cache.incr(&key).await {
            warn!(key, error = %e, "usage counter increment failed");
        }
    }

    /// Whether this user already redeemed the code. Caches both outcomes ("1"
    /// and "0") so the confirmation step avoids a second store read.
    pub async fn user_promo_used(
        &self,
        chat_user_id: i64,
        user_id: i64,
        promo_code_id: i64,
    ) -> Result<bool> {
        let key = keys::user_promo_usage(chat_user_id, promo_code_id);
        if let Some(raw) = self.cache_get(&key).await {
            return Ok(raw == "1");
        }

        let used = self
            .store
            .find_promo_usage(user_id, promo_code_id)
            .await?
            .is_some();
        self.cache_set(&key, if used { "1" } else { "0" }, self.ttl())
            .await;
        Ok(used)
    }

    pub async fn mark_user_promo_used(&self, chat_user_id: i64, promo_code_id: i64) {
        let key = keys::user_promo_usage(chat_user_id, promo_code_id);
        self.cache_set(&key, "1", self.ttl()).await;
    }

    // -- subscription window ------------------------------------------------

    /// The user's subscription window from the cached end-timestamp
    /// projection. Absence of an end date is not negative-cached.
    pub async fn subscription_window(&self, chat_user_id: i64) -> Result<SubscriptionWindow> {
        let key = keys::subscription_end(chat_user_id);
        if let Some(raw) = self.cache_get(&key).await {
            if let Some(end) = Self::decode::<NaiveDateTime>(&raw) {
                return Ok(SubscriptionWindow::new(Some(end)));
            }
        }

        let end = self
            .store
            .find_user_by_chat_id(chat_user_id)
            .await?
            .and_then(|user| user.subscription_end);

        if let Some(end) = end {
            if let Some(encoded) = Self::encode(&end) {
                self.cache_set(&key, &encoded, self.ttl()).await;
            }
            debug!(chat_user_id, "subscription end loaded from store and cached");
        }
        Ok(SubscriptionWindow::new(end))
    }

    pub async fn invalidate_subscription_end(&self, chat_user_id: i64) {
        self.cache_delete(&keys::subscription_end(chat_user_id)).await;
    }

    // -- subscription plans -------------------------------------------------

    /// Plan catalog, negative-cached like the direction catalog.
    pub async fn subscription_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let key = keys::subscription_plans();
        if let Some(raw) = self.cache_get(&key).await {
            if let Some(plans) = Self::decode(&raw) {
                return Ok(plans);
            }
        }

        let plans = self.store.list_subscription_plans().await?;
        if let Some(encoded) = Self::encode(&plans) {
            self.cache_set(&key, &encoded, self.ttl()).await;
        }
        Ok(plans)
    }

    pub async fn invalidate_subscription_plans(&self) {
        self.cache_delete(&keys::subscription_plans()).await;
    }

    // -- system settings ----------------------------------------------------

    pub async fn bot_settings(&self) -> Result<Option<BotSettings>> {
        let key = keys::bot_settings();
        if let Some(raw) = self.cache_get(&key).await {
            if let Some(settings) = Self::decode(&raw) {
                return Ok(Some(settings));
            }
        }

        let Some(settings) = self.store.get_bot_settings().await? else {
            return Ok(None);
        };
        if let Some(encoded) = Self::encode(&settings) {
            self.cache_set(&key, &encoded, self.ttl()).await;
        }
        Ok(Some(settings))
    }

    pub async fn invalidate_bot_settings(&self) {
        self.cache_delete(&keys::bot_settings()).await;
    }
}
