//! FAQ data models and API request/response types.
//!
//! FAQs are an editorially managed list with no behavior beyond ordered
//! retrieve, insert, update, and delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an FAQ entry from the store.
///
/// Maps to the `faqs` table. Entries are displayed in ascending `order`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    /// Ascending display position
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to add an FAQ entry.
#[derive(Debug, Deserialize)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
    /// Display position; defaults to 0 (top)
    #[serde(default)]
    pub order: i32,
}

/// Partial update for an FAQ entry.
///
/// Omitted fields keep their stored value; `updated_at` is bumped on any
/// successful update.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub order: Option<i32>,
}
