//! History record model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tomtat_core::types::{DbId, Timestamp};

use crate::models::status::SummaryKind;

/// A row from the `summaries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub original_text: String,
    pub result: String,
    pub summary_mode: Option<String>,
    pub source: String,
    pub source_url: Option<String>,
    pub source_filename: Option<String>,
    pub word_count: i32,
    pub share_id: Option<String>,
    pub share_expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Summary {
    pub fn is_shared(&self) -> bool {
        self.share_id.is_some()
    }
}

/// DTO for inserting a history record.
#[derive(Debug, Clone)]
pub struct CreateSummary {
    pub user_id: DbId,
    pub kind: SummaryKind,
    pub original_text: String,
    pub result: String,
    pub summary_mode: Option<String>,
    /// Defaults to `text` when omitted.
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub source_filename: Option<String>,
}

/// Body of `POST /api/summaries/history`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSummaryRequest {
    pub original_text: Option<String>,
    pub summary: Option<String>,
    pub summary_mode: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub source_filename: Option<String>,
}

/// The fields of a shared record visible without authentication.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSummary {
    pub id: DbId,
    pub summary: String,
    pub summary_mode: Option<String>,
    pub source: String,
    pub created_at: Timestamp,
}

impl From<Summary> for PublicSummary {
    fn from(s: Summary) -> Self {
        Self {
            id: s.id,
            summary: s.result,
            summary_mode: s.summary_mode,
            source: s.source,
            created_at: s.created_at,
        }
    }
}
