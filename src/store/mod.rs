//! # Record Store Boundary
//!
//! The Record Store is the sole owner of durable entities. This module defines
//! the operations the core actually uses (point lookups, filtered scans,
//! inserts, updates, deletes, and two transactional commits) behind a trait so
//! the relational backend stays swappable and testable without a database.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::Result;
use crate::models::{
    BotSettings, JobDirection, NewPromoCodeUsage, NewUserJobDirection, PromoCode, PromoCodeUsage,
    SubscriptionPlan, User, UserDirectionView, UserJobDirection,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Durable storage operations. Every mutation runs inside a short transaction
/// that commits or rolls back as one unit; multi-statement commits are modeled
/// as single methods so backends can hold the transaction boundary.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // -- users --------------------------------------------------------------

    /// Point lookup by the chat-platform user id (unique alternate key).
    async fn find_user_by_chat_id(&self, chat_user_id: i64) -> Result<Option<User>>;

    // -- direction catalog --------------------------------------------------

    /// Ordered scan of the read-only direction catalog.
    async fn list_job_directions(&self) -> Result<Vec<JobDirection>>;

    async fn find_job_direction(&self, direction_id: i64) -> Result<Option<JobDirection>>;

    // -- user directions ----------------------------------------------------

    /// A user's directions joined with their catalog names, ordered by id.
    /// `user_id` is the internal key.
    async fn list_user_directions(&self, user_id: i64) -> Result<Vec<UserDirectionView>>;

    /// Lookup by the (user, direction) pair, backing the add flow's
    /// pre-commit existence check.
    async fn find_user_direction(
        &self,
        user_id: i64,
        direction_id: i64,
    ) -> Result<Option<UserJobDirection>>;

    async fn find_user_direction_by_id(&self, id: i64) -> Result<Option<UserJobDirection>>;

    /// Insert returning the generated row.
    async fn insert_user_direction(
        &self,
        new_direction: NewUserJobDirection,
    ) -> Result<UserJobDirection>;

    /// Update the selected-keyword string. Returns false when the row is gone.
    async fn update_user_direction_keywords(&self, id: i64, keywords: &str) -> Result<bool>;

    /// Delete by id. Returns false when the row is gone.
    async fn delete_user_direction(&self, id: i64) -> Result<bool>;

    // -- promo codes --------------------------------------------------------

    /// Point lookup by the literal code text (unique alternate key).
    async fn find_promo_code_by_code(&self, code: &str) -> Result<Option<PromoCode>>;

    async fn find_promo_code(&self, promo_code_id: i64) -> Result<Option<PromoCode>>;

    /// Total recorded redemptions for one code.
    async fn count_promo_usages(&self, promo_code_id: i64) -> Result<i64>;

    async fn find_promo_usage(
        &self,
        user_id: i64,
        promo_code_id: i64,
    ) -> Result<Option<PromoCodeUsage>>;

    /// Redemption commit: set the user's subscription end (when the code
    /// grants one) and insert the usage row, atomically.
    async fn apply_promo_redemption(
        &self,
        usage: NewPromoCodeUsage,
        new_subscription_end: Option<NaiveDateTime>,
    ) -> Result<PromoCodeUsage>;

    // -- subscription plans -------------------------------------------------

    async fn list_subscription_plans(&self) -> Result<Vec<SubscriptionPlan>>;

    async fn find_subscription_plan(&self, plan_id: i64) -> Result<Option<SubscriptionPlan>>;

    // -- system settings ----------------------------------------------------

    /// The single-row settings aggregate, absent until seeded.
    async fn get_bot_settings(&self) -> Result<Option<BotSettings>>;
}
