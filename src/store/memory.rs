//! In-memory [`RecordStore`] used by unit and integration tests.
//!
//! Holds the same entities as the relational schema in plain collections and
//! counts every read so tests can assert that the cache-aside layer went back
//! to the store after an invalidation.

use super::RecordStore;
use crate::error::Result;
use crate::models::{
    BotSettings, JobDirection, NewPromoCodeUsage, NewUserJobDirection, PromoCode, PromoCodeUsage,
    SubscriptionPlan, User, UserDirectionView, UserJobDirection,
};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    job_directions: Vec<JobDirection>,
    user_directions: Vec<UserJobDirection>,
    promo_codes: Vec<PromoCode>,
    promo_usages: Vec<PromoCodeUsage>,
    plans: Vec<SubscriptionPlan>,
    settings: Option<BotSettings>,
    next_id: i64,
}

impl Inner {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    reads: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read operations served so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with a pool timeout, modeling a
    /// transient database outage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }

    // -- seeding helpers ----------------------------------------------------

    pub fn seed_user(&self, chat_user_id: i64, subscription_end: Option<NaiveDateTime>) -> User {
        let mut inner = self.inner.lock();
        let user = User {
            id: inner.allocate_id(),
            chat_user_id,
            username: None,
            first_name: None,
            last_name: None,
            is_admin: false,
            subscription_end,
            registration_date: Utc::now().naive_utc(),
            is_banned: false,
        };
        inner.users.push(user.clone());
        user
    }

    pub fn seed_direction(&self, name: &str, keywords: &[&str]) -> JobDirection {
        let mut inner = self.inner.lock();
        let direction = JobDirection {
            id: inner.allocate_id(),
            direction_name: name.to_string(),
            recommended_keywords: if keywords.is_empty() {
                None
            } else {
                Some(keywords.join("\n"))
            },
        };
        inner.job_directions.push(direction.clone());
        direction
    }

    /// Replace a catalog direction's recommended keywords (models the catalog
    /// shrinking or growing between wizard sessions).
    pub fn set_direction_keywords(&self, direction_id: i64, keywords: &[&str]) {
        let mut inner = self.inner.lock();
        if let Some(direction) = inner
            .job_directions
            .iter_mut()
            .find(|d| d.id == direction_id)
        {
            direction.recommended_keywords = Some(keywords.join("\n"));
        }
    }

    pub fn seed_promo_code(&self, code: &str, value_seconds: i64, max_uses: i64) -> PromoCode {
        let mut inner = self.inner.lock();
        let promo = PromoCode {
            id: inner.allocate_id(),
            code: code.to_string(),
            name: Some(format!("Promo {code}")),
            promo_type: "subscription".to_string(),
            value: value_seconds.to_string(),
            max_uses,
        };
        inner.promo_codes.push(promo.clone());
        promo
    }

    pub fn seed_plan(&self, name: &str, duration_days: i64, price: i64) -> SubscriptionPlan {
        let mut inner = self.inner.lock();
        let plan = SubscriptionPlan {
            id: inner.allocate_id(),
            name: name.to_string(),
            duration_days,
            price,
        };
        inner.plans.push(plan.clone());
        plan
    }

    pub fn seed_user_direction(
        &self,
        user_id: i64,
        direction_id: i64,
        keywords: &str,
    ) -> UserJobDirection {
        let mut inner = self.inner.lock();
        let row = UserJobDirection {
            id: inner.allocate_id(),
            user_id,
            direction_id,
            selected_keywords: keywords.to_string(),
        };
        inner.user_directions.push(row.clone());
        row
    }

    pub fn seed_settings(&self, settings: BotSettings) {
        self.inner.lock().settings = Some(settings);
    }

    /// Direct row lookup for assertions, bypassing the read counter.
    pub fn user_subscription_end(&self, chat_user_id: i64) -> Option<NaiveDateTime> {
        self.inner
            .lock()
            .users
            .iter()
            .find(|u| u.chat_user_id == chat_user_id)
            .and_then(|u| u.subscription_end)
    }

    /// Direct row lookup for assertions, bypassing the read counter.
    pub fn user_direction_rows(&self, user_id: i64) -> Vec<UserJobDirection> {
        self.inner
            .lock()
            .user_directions
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_user_by_chat_id(&self, chat_user_id: i64) -> Result<Option<User>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .users
            .iter()
            .find(|u| u.chat_user_id == chat_user_id)
            .cloned())
    }

    async fn list_job_directions(&self) -> Result<Vec<JobDirection>> {
        self.record_read();
        Ok(self.inner.lock().job_directions.clone())
    }

    async fn find_job_direction(&self, direction_id: i64) -> Result<Option<JobDirection>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .job_directions
            .iter()
            .find(|d| d.id == direction_id)
            .cloned())
    }

    async fn list_user_directions(&self, user_id: i64) -> Result<Vec<UserDirectionView>> {
        self.record_read();
        let inner = self.inner.lock();
        Ok(inner
            .user_directions
            .iter()
            .filter(|ud| ud.user_id == user_id)
            .filter_map(|ud| {
                inner
                    .job_directions
                    .iter()
                    .find(|d| d.id == ud.direction_id)
                    .map(|d| UserDirectionView {
                        id: ud.id,
                        direction_id: ud.direction_id,
                        selected_keywords: ud.selected_keywords.clone(),
                        direction_name: d.direction_name.clone(),
                    })
            })
            .collect())
    }

    async fn find_user_direction(
        &self,
        user_id: i64,
        direction_id: i64,
    ) -> Result<Option<UserJobDirection>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .user_directions
            .iter()
            .find(|ud| ud.user_id == user_id && ud.direction_id == direction_id)
            .cloned())
    }

    async fn find_user_direction_by_id(&self, id: i64) -> Result<Option<UserJobDirection>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .user_directions
            .iter()
            .find(|ud| ud.id == id)
            .cloned())
    }

    async fn insert_user_direction(
        &self,
        new_direction: NewUserJobDirection,
    ) -> Result<UserJobDirection> {
        self.check_writable()?;
        let mut inner = self.inner.lock();
        let direction = UserJobDirection {
            id: inner.allocate_id(),
            user_id: new_direction.user_id,
            direction_id: new_direction.direction_id,
            selected_keywords: new_direction.selected_keywords,
        };
        inner.user_directions.push(direction.clone());
        Ok(direction)
    }

    async fn update_user_direction_keywords(&self, id: i64, keywords: &str) -> Result<bool> {
        self.check_writable()?;
        let mut inner = self.inner.lock();
        match inner.user_directions.iter_mut().find(|ud| ud.id == id) {
            Some(direction) => {
                direction.selected_keywords = keywords.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user_direction(&self, id: i64) -> Result<bool> {
        self.check_writable()?;
        let mut inner = self.inner.lock();
        let before = inner.user_directions.len();
        inner.user_directions.retain(|ud| ud.id != id);
        Ok(inner.user_directions.len() < before)
    }

    async fn find_promo_code_by_code(&self, code: &str) -> Result<Option<PromoCode>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .promo_codes
            .iter()
            .find(|p| p.code == code)
            .cloned())
    }

    async fn find_promo_code(&self, promo_code_id: i64) -> Result<Option<PromoCode>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .promo_codes
            .iter()
            .find(|p| p.id == promo_code_id)
            .cloned())
    }

    async fn count_promo_usages(&self, promo_code_id: i64) -> Result<i64> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .promo_usages
            .iter()
            .filter(|u| u.promo_code_id == promo_code_id)
            .count() as i64)
    }

    async fn find_promo_usage(
        &self,
        user_id: i64,
        promo_code_id: i64,
    ) -> Result<Option<PromoCodeUsage>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .promo_usages
            .iter()
            .find(|u| u.user_id == user_id && u.promo_code_id == promo_code_id)
            .cloned())
    }

    async fn apply_promo_redemption(
        &self,
        usage: NewPromoCodeUsage,
        new_subscription_end: Option<NaiveDateTime>,
    ) -> Result<PromoCodeUsage> {
        self.check_writable()?;
        let mut inner = self.inner.lock();

        if let Some(subscription_end) = new_subscription_end {
            if let Some(user) = inner.users.iter_mut().find(|u| u.id == usage.user_id) {
                user.subscription_end = Some(subscription_end);
            }
        }

        let recorded = PromoCodeUsage {
            id: inner.allocate_id(),
            user_id: usage.user_id,
            promo_code_id: usage.promo_code_id,
            used_at: Utc::now().naive_utc(),
        };
        inner.promo_usages.push(recorded.clone());
        Ok(recorded)
    }

    async fn list_subscription_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        self.record_read();
        Ok(self.inner.lock().plans.clone())
    }

    async fn find_subscription_plan(&self, plan_id: i64) -> Result<Option<SubscriptionPlan>> {
        self.record_read();
        Ok(self
            .inner
            .lock()
            .plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned())
    }

    async fn get_bot_settings(&self) -> Result<Option<BotSettings>> {
        self.record_read();
        Ok(self.inner.lock().settings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_catalog_and_read_counter() {
        let store = MemoryStore::new();
        store.seed_direction("Backend", &["python", "go"]);
        store.seed_direction("Data", &["sql"]);

        assert_eq!(store.read_count(), 0);
        let directions = store.list_job_directions().await.unwrap();
        assert_eq!(directions.len(), 2);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_user_direction_crud() {
        let store = MemoryStore::new();
        let user = store.seed_user(100, None);
        let direction = store.seed_direction("Backend", &["python", "go"]);

        let inserted = store
            .insert_user_direction(NewUserJobDirection {
                user_id: user.id,
                direction_id: direction.id,
                selected_keywords: "go".to_string(),
            })
            .await
            .unwrap();

        let views = store.list_user_directions(user.id).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].direction_name, "Backend");

        assert!(store
            .update_user_direction_keywords(inserted.id, "go\npython")
            .await
            .unwrap());
        let row = store
            .find_user_direction_by_id(inserted.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.selected_keywords, "go\npython");

        assert!(store.delete_user_direction(inserted.id).await.unwrap());
        assert!(!store.delete_user_direction(inserted.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_redemption_commit_updates_user_and_usage() {
        let store = MemoryStore::new();
        let user = store.seed_user(100, None);
        let promo = store.seed_promo_code("WELCOME", 3600, 5);
        let end = Utc::now().naive_utc();

        store
            .apply_promo_redemption(
                NewPromoCodeUsage {
                    user_id: user.id,
                    promo_code_id: promo.id,
                },
                Some(end),
            )
            .await
            .unwrap();

        assert_eq!(store.user_subscription_end(100), Some(end));
        assert_eq!(store.count_promo_usages(promo.id).await.unwrap(), 1);
    }
}
