//! # Data Model Layer
//!
//! Durable entities owned by the Record Store. Structs are plain `FromRow`
//! projections; all queries live behind the [`crate::store::RecordStore`]
//! seam so the relational backend stays swappable.

pub mod bot_settings;
pub mod job_direction;
pub mod promo_code;
pub mod subscription_plan;
pub mod user;
pub mod user_job_direction;

pub use bot_settings::BotSettings;
pub use job_direction::JobDirection;
pub use promo_code::{NewPromoCodeUsage, PromoCode, PromoCodeUsage, PromoType};
pub use subscription_plan::SubscriptionPlan;
pub use user::{SubscriptionWindow, User};
pub use user_job_direction::{NewUserJobDirection, UserDirectionView, UserJobDirection};

/// Split a newline-delimited keyword column into its keyword list, dropping
/// empty segments left by trailing newlines.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join a keyword list back into the newline-delimited storage form.
pub fn join_keywords<I, S>(keywords: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keywords_drops_empty_lines() {
        assert_eq!(
            split_keywords("python\ngo\n\nrust\n"),
            vec!["python", "go", "rust"]
        );
        assert!(split_keywords("").is_empty());
    }

    #[test]
    fn test_join_round_trip() {
        let joined = join_keywords(["go", "rust"]);
        assert_eq!(joined, "go\nrust");
        assert_eq!(split_keywords(&joined), vec!["go", "rust"]);
    }
}
