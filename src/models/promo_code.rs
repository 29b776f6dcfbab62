use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Promo code type tag. Only subscription extension exists today; the tag is
/// stored as text so new types need no schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromoType {
    /// `value` holds a duration in seconds added to the subscription window.
    Subscription,
}

impl fmt::Display for PromoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

impl FromStr for PromoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subscription" => Ok(Self::Subscription),
            _ => Err(format!("Invalid promo type: {s}")),
        }
    }
}

/// PromoCode is an issued, immutable redemption code.
/// Maps to the `promo_codes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
    pub id: i64,
    /// The literal code text users enter, unique.
    pub code: String,
    pub name: Option<String>,
    pub promo_type: String,
    /// Opaque value interpreted per `promo_type`.
    pub value: String,
    pub max_uses: i64,
}

impl PromoCode {
    pub fn promo_type(&self) -> Result<PromoType, String> {
        self.promo_type.parse()
    }

    /// The subscription extension this code grants, `None` for non-subscription
    /// types or an unparseable value.
    pub fn subscription_extension(&self) -> Option<Duration> {
        if self.promo_type().ok()? != PromoType::Subscription {
            return None;
        }
        self.value.parse::<i64>().ok().map(Duration::seconds)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

/// PromoCodeUsage records one redemption: at most one row per (user, code).
/// Maps to the `promo_code_usage` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PromoCodeUsage {
    pub id: i64,
    pub user_id: i64,
    pub promo_code_id: i64,
    pub used_at: NaiveDateTime,
}

/// New PromoCodeUsage for creation (timestamp assigned by the store).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPromoCodeUsage {
    pub user_id: i64,
    pub promo_code_id: i64,
}
