use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Server-side record of one refresh token in a session chain.
///
/// Lifetime of a record: issued, then exactly one of rotated
/// (`replaced_by_hash`/`used_at` set), revoked (`revoked_at` set), or
/// expired (`expires_at` passed). Terminal either way.
#[derive(Clone, Debug)]
pub struct RefreshRecord {
    pub token_hash: [u8; 32],
    pub subject_id: String,
    pub organization_id: String,
    // Carried on the record so rotation can re-issue claims without a
    // directory lookup.
    pub permissions: BTreeSet<String>,
    pub impersonated_by: Option<String>,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub parent_hash: Option<[u8; 32]>,
    pub replaced_by_hash: Option<[u8; 32]>,
    pub used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}
