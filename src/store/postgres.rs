//! PostgreSQL [`RecordStore`] backend.
//!
//! Runtime-checked SQLx queries against the bot schema. Multi-statement
//! commits run inside one transaction and roll back as a unit.

use super::RecordStore;
use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{
    BotSettings, JobDirection, NewPromoCodeUsage, NewUserJobDirection, PromoCode, PromoCodeUsage,
    SubscriptionPlan, User, UserDirectionView, UserJobDirection,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_user_by_chat_id(&self, chat_user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, chat_user_id, username, first_name, last_name,
                   is_admin, subscription_end, registration_date, is_banned
            FROM users
            WHERE chat_user_id = $1
            "#,
        )
        .bind(chat_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_job_directions(&self) -> Result<Vec<JobDirection>> {
        let directions = sqlx::query_as::<_, JobDirection>(
            r#"
            SELECT id, direction_name, recommended_keywords
            FROM job_directions
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(directions)
    }

    async fn find_job_direction(&self, direction_id: i64) -> Result<Option<JobDirection>> {
        let direction = sqlx::query_as::<_, JobDirection>(
            r#"
            SELECT id, direction_name, recommended_keywords
            FROM job_directions
            WHERE id = $1
            "#,
        )
        .bind(direction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(direction)
    }

    async fn list_user_directions(&self, user_id: i64) -> Result<Vec<UserDirectionView>> {
        let directions = sqlx::query_as::<_, UserDirectionView>(
            r#"
            SELECT ujd.id, ujd.direction_id, ujd.selected_keywords, jd.direction_name
            FROM user_job_directions ujd
            JOIN job_directions jd ON jd.id = ujd.direction_id
            WHERE ujd.user_id = $1
            ORDER BY ujd.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(directions)
    }

    async fn find_user_direction(
        &self,
        user_id: i64,
        direction_id: i64,
    ) -> Result<Option<UserJobDirection>> {
        let direction = sqlx::query_as::<_, UserJobDirection>(
            r#"
            SELECT id, user_id, direction_id, selected_keywords
            FROM user_job_directions
            WHERE user_id = $1 AND direction_id = $2
            "#,
        )
        .bind(user_id)
        .bind(direction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(direction)
    }

    async fn find_user_direction_by_id(&self, id: i64) -> Result<Option<UserJobDirection>> {
        let direction = sqlx::query_as::<_, UserJobDirection>(
            r#"
            SELECT id, user_id, direction_id, selected_keywords
            FROM user_job_directions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(direction)
    }

    async fn insert_user_direction(
        &self,
        new_direction: NewUserJobDirection,
    ) -> Result<UserJobDirection> {
        let direction = sqlx::query_as::<_, UserJobDirection>(
            r#"
            INSERT INTO user_job_directions (user_id, direction_id, selected_keywords)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, direction_id, selected_keywords
            "#,
        )
        .bind(new_direction.user_id)
        .bind(new_direction.direction_id)
        .bind(new_direction.selected_keywords)
        .fetch_one(&self.pool)
        .await?;

        Ok(direction)
    }

    async fn update_user_direction_keywords(&self, id: i64, keywords: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE user_job_directions
            SET selected_keywords = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(keywords)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user_direction(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_job_directions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_promo_code_by_code(&self, code: &str) -> Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, name, promo_type, value, max_uses
            FROM promo_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    async fn find_promo_code(&self, promo_code_id: i64) -> Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            SELECT id, code, name, promo_type, value, max_uses
            FROM promo_codes
            WHERE id = $1
            "#,
        )
        .bind(promo_code_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    async fn count_promo_usages(&self, promo_code_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM promo_code_usage
            WHERE promo_code_id = $1
            "#,
        )
        .bind(promo_code_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn find_promo_usage(
        &self,
        user_id: i64,
        promo_code_id: i64,
    ) -> Result<Option<PromoCodeUsage>> {
        let usage = sqlx::query_as::<_, PromoCodeUsage>(
            r#"
            SELECT id, user_id, promo_code_id, used_at
            FROM promo_code_usage
            WHERE user_id = $1 AND promo_code_id = $2
            "#,
        )
        .bind(user_id)
        .bind(promo_code_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usage)
    }

    async fn apply_promo_redemption(
        &self,
        usage: NewPromoCodeUsage,
        new_subscription_end: Option<NaiveDateTime>,
    ) -> Result<PromoCodeUsage> {
        let mut tx = self.pool.begin().await?;

        if let Some(subscription_end) = new_subscription_end {
            sqlx::query(
                r#"
                UPDATE users
                SET subscription_end = $2
                WHERE id = $1
                "#,
            )
            .bind(usage.user_id)
            .bind(subscription_end)
            .execute(&mut *tx)
            .await?;
        }

        let recorded = sqlx::query_as::<_, PromoCodeUsage>(
            r#"
            INSERT INTO promo_code_usage (user_id, promo_code_id, used_at)
            VALUES ($1, $2, NOW())
            RETURNING id, user_id, promo_code_id, used_at
            "#,
        )
        .bind(usage.user_id)
        .bind(usage.promo_code_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(recorded)
    }

    async fn list_subscription_plans(&self) -> Result<Vec<SubscriptionPlan>> {
        let plans = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT id, name, duration_days, price
            FROM subscription_plans
            ORDER BY duration_days
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    async fn find_subscription_plan(&self, plan_id: i64) -> Result<Option<SubscriptionPlan>> {
        let plan = sqlx::query_as::<_, SubscriptionPlan>(
            r#"
            SELECT id, name, duration_days, price
            FROM subscription_plans
            WHERE id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    async fn get_bot_settings(&self) -> Result<Option<BotSettings>> {
        let settings = sqlx::query_as::<_, BotSettings>(
            r#"
            SELECT id, support_message, new_user_greeting, registered_user_greeting,
                   technical_works, message_send_interval, check_interval
            FROM bot_settings
            ORDER BY id
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }
}
