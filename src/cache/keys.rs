//! Deterministic cache key builders.
//!
//! Every cached aggregate is addressed by a key built from its aggregate name
//! and identifying parameters. Keys are the invalidation contract: a store
//! write that changes an aggregate's rows must delete exactly these keys.

/// Catalog-wide job directions list.
pub fn job_directions() -> String {
    "job_directions".to_string()
}

/// A user's selected directions, keyed by chat-platform user id.
pub fn user_directions(chat_user_id: i64) -> String {
    format!("user:{chat_user_id}:directions")
}

/// Recommended keyword list for one catalog direction.
pub fn direction_keywords(direction_id: i64) -> String {
    format!("job_direction:{direction_id}:keywords")
}

/// Promo-code hash projection keyed by the literal code text.
pub fn promo_code(code: &str) -> String {
    format!("promo_code:{code}")
}

/// Redemption counter for one promo code.
pub fn promo_usage_count(promo_code_id: i64) -> String {
    format!("promo_code:{promo_code_id}:usage_count")
}

/// Per-user redemption flag for one promo code.
pub fn user_promo_usage(chat_user_id: i64, promo_code_id: i64) -> String {
    format!("user:{chat_user_id}:promo_code_usage:{promo_code_id}")
}

/// A user's subscription end timestamp projection.
pub fn subscription_end(chat_user_id: i64) -> String {
    format!("user:{chat_user_id}:subscription_end")
}

/// A user's search-active flag.
pub fn search_active(chat_user_id: i64) -> String {
    format!("user:{chat_user_id}:is_search_active")
}

/// Subscription plan catalog.
pub fn subscription_plans() -> String {
    "subscription_plans".to_string()
}

/// Single-row system settings aggregate.
pub fn bot_settings() -> String {
    "bot_settings".to_string()
}
