use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// SubscriptionPlan is a purchasable subscription duration.
/// Maps to the `subscription_plans` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    /// Plan length in whole days.
    pub duration_days: i64,
    pub price: i64,
}

impl SubscriptionPlan {
    pub fn label(&self) -> String {
        format!("{}: {} for {} days", self.name, self.price, self.duration_days)
    }
}
