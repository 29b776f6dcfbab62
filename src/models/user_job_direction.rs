use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::split_keywords;

/// UserJobDirection is a user's subscription to one catalog direction with a
/// selected subset of its keywords. Maps to the `user_job_directions` table.
///
/// Uniqueness invariant: at most one row per (user, direction) pair, enforced
/// by a pre-commit existence check in the add flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserJobDirection {
    pub id: i64,
    /// References `users.id` (the internal key, not the chat-platform id).
    pub user_id: i64,
    pub direction_id: i64,
    /// Newline-delimited subset of the direction's recommended keywords.
    pub selected_keywords: String,
}

impl UserJobDirection {
    pub fn keywords(&self) -> Vec<String> {
        split_keywords(&self.selected_keywords)
    }
}

/// New UserJobDirection for creation (without the generated id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserJobDirection {
    pub user_id: i64,
    pub direction_id: i64,
    pub selected_keywords: String,
}

/// UserJobDirection joined with its catalog direction's name: the shape the
/// per-user directions-list aggregate caches and the wizard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserDirectionView {
    pub id: i64,
    pub direction_id: i64,
    pub selected_keywords: String,
    pub direction_name: String,
}

impl UserDirectionView {
    pub fn keywords(&self) -> Vec<String> {
        split_keywords(&self.selected_keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_keyword_split() {
        let row = UserJobDirection {
            id: 1,
            user_id: 1,
            direction_id: 2,
            selected_keywords: "go\nrust".to_string(),
        };
        assert_eq!(row.keywords(), vec!["go", "rust"]);
    }
}
