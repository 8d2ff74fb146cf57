use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{hash_refresh, RefreshError, RefreshRecord, RefreshStore};

#[derive(Default)]
pub struct HashsetRefreshStore {
    // hash -> record
    by_hash: HashMap<[u8; 32], RefreshRecord>,
    // quick check for revoked sessions
    revoked_sessions: HashSet<Uuid>,
}

impl HashsetRefreshStore {
    fn revoke_chain(&mut self, session_id: Uuid, now: DateTime<Utc>) {
        self.revoked_sessions.insert(session_id);
        for r in self.by_hash.values_mut() {
            if r.session_id == session_id && r.revoked_at.is_none() {
                r.revoked_at = Some(now);
            }
        }
    }
}

#[async_trait::async_trait]
impl RefreshStore for HashsetRefreshStore {
    async fn insert_initial(&mut self, record: RefreshRecord) -> Result<(), RefreshError> {
        if self.by_hash.contains_key(&record.token_hash) {
            return Err(RefreshError::Internal);
        }
        self.by_hash.insert(record.token_hash, record);
        Ok(())
    }

    async fn rotate(
        &mut self,
        presented_plain: &str,
        new_plain: &str,
        now: DateTime<Utc>,
        hash_key: &[u8; 32],
    ) -> Result<(RefreshRecord, RefreshRecord), RefreshError> {
        let old_hash = hash_refresh(hash_key, presented_plain);
        let new_hash = hash_refresh(hash_key, new_plain);

        let mut old = match self.by_hash.get(&old_hash) {
            Some(r) => r.clone(),
            None => return Err(RefreshError::NotFoundOrExpired),
        };

        if old.expires_at <= now {
            return Err(RefreshError::NotFoundOrExpired);
        }
        if old.revoked_at.is_some() || self.revoked_sessions.contains(&old.session_id) {
            return Err(RefreshError::Revoked);
        }
        if old.replaced_by_hash.is_some() || old.used_at.is_some() {
            // Reuse: someone presented an already-rotated token.
            self.revoke_chain(old.session_id, now);
            return Err(RefreshError::ReuseDetected);
        }

        old.used_at = Some(now);
        old.replaced_by_hash = Some(new_hash);

        // The chain keeps its original lifetime, so a long-lived pair
        // stays long-lived across rotations.
        let lifetime = old.expires_at - old.created_at;
        let new_record = RefreshRecord {
            token_hash: new_hash,
            subject_id: old.subject_id.clone(),
            organization_id: old.organization_id.clone(),
            permissions: old.permissions.clone(),
            impersonated_by: old.impersonated_by.clone(),
            session_id: old.session_id,
            created_at: now,
            expires_at: now + lifetime,
            parent_hash: Some(old_hash),
            replaced_by_hash: None,
            used_at: None,
            revoked_at: None,
        };

        self.by_hash.insert(old_hash, old.clone());
        self.by_hash.insert(new_hash, new_record.clone());
        Ok((old, new_record))
    }

    async fn revoke_session(&mut self, session_id: Uuid, now: DateTime<Utc>) {
        self.revoke_chain(session_id, now);
    }

    async fn session_for_token(&self, presented_plain: &str, hash_key: &[u8; 32]) -> Option<Uuid> {
        let hash = hash_refresh(hash_key, presented_plain);
        self.by_hash.get(&hash).map(|r| r.session_id)
    }

    async fn is_session_revoked(&self, session_id: Uuid) -> bool {
        self.revoked_sessions.contains(&session_id)
    }
}
