use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// BotSettings is the single-row system settings aggregate: operator-editable
/// greeting texts and scheduler intervals. Maps to the `bot_settings` table.
///
/// Intervals are stored as text so operators can edit them without migrations;
/// consumers parse what they need.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromRow)]
pub struct BotSettings {
    pub id: i64,
    pub support_message: Option<String>,
    pub new_user_greeting: Option<String>,
    pub registered_user_greeting: Option<String>,
    pub technical_works: Option<String>,
    pub message_send_interval: Option<String>,
    pub check_interval: Option<String>,
}
