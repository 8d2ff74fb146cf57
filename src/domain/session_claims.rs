use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Decoded content of a session token.
///
/// Claims are immutable once decoded; issuing a new pair always produces a
/// new value. `impersonated_by` is present iff the session is an
/// impersonation, and must differ from `subject_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub subject_id: String,
    /// Tenant scope; every permission check is local to this organization.
    pub organization_id: String,
    pub permissions: BTreeSet<String>,
    /// Subject id of the admin who initiated impersonation, if any.
    pub impersonated_by: Option<String>,
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Expiry is interpreted by the caller, not the codec.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_impersonation(&self) -> bool {
        self.impersonated_by.is_some()
    }
}
