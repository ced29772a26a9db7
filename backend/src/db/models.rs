use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{HistoryEntry, Verdict};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// SHA-256 hexdigest of the password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// One persisted scan. The image key points into the archive bucket and may
/// be absent when archiving failed; the diagnosis itself is never blocked on
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub image_key: Option<String>,
    pub verdict: Verdict,
    pub confidence: f64,
    pub scanned_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(
        user_id: Uuid,
        username: String,
        image_key: Option<String>,
        verdict: Verdict,
        confidence: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            username,
            image_key,
            verdict,
            confidence,
            scanned_at: Utc::now(),
        }
    }
}

impl From<ScanRecord> for HistoryEntry {
    fn from(record: ScanRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            verdict: record.verdict,
            confidence: record.confidence,
            scanned_at: record.scanned_at,
        }
    }
}
