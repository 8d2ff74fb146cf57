use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{RefreshError, RefreshRecord};

#[async_trait::async_trait]
pub trait RefreshStore: Send + Sync {
    async fn insert_initial(&mut self, record: RefreshRecord) -> Result<(), RefreshError>;

    /// Single-use rotation: marks the presented token used/replaced and
    /// inserts its successor, preserving the chain's original lifetime.
    /// Presenting an already-rotated token revokes the whole session.
    async fn rotate(
        &mut self,
        presented_plain: &str,
        new_plain: &str,
        now: DateTime<Utc>,
        hash_key: &[u8; 32],
    ) -> Result<(RefreshRecord, RefreshRecord), RefreshError>;

    async fn revoke_session(&mut self, session_id: Uuid, now: DateTime<Utc>);

    /// Session the presented token belongs to, if it is known and live.
    async fn session_for_token(&self, presented_plain: &str, hash_key: &[u8; 32]) -> Option<Uuid>;

    async fn is_session_revoked(&self, session_id: Uuid) -> bool;
}

pub fn hash_refresh(key32: &[u8; 32], token: &str) -> [u8; 32] {
    let out = blake3::keyed_hash(key32, token.as_bytes());
    *out.as_bytes()
}
