use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::split_keywords;

/// JobDirection is a read-only catalog entry: a job direction with its
/// recommended keyword list. Maps to the `job_directions` table.
///
/// The wizard never mutates the catalog; admin tooling owns writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct JobDirection {
    pub id: i64,
    pub direction_name: String,
    /// Newline-delimited recommended keywords, nullable in the schema.
    pub recommended_keywords: Option<String>,
}

impl JobDirection {
    /// The recommended keyword list, empty when the column is NULL.
    pub fn keywords(&self) -> Vec<String> {
        self.recommended_keywords
            .as_deref()
            .map(split_keywords)
            .unwrap_or_default()
    }
}
