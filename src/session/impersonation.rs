//! Admin impersonation over the session store.
//!
//! State machine: NORMAL -> IMPERSONATING -> NORMAL, one level only.
//! While impersonating, the admin's own pair sits in the store's
//! `original` slot and the active claims carry the admin's subject id in
//! `impersonated_by`, so the original identity stays recoverable until
//! impersonation is explicitly ended.

use std::sync::Arc;

use tracing::info;

use crate::domain::{permissions, SessionClaims};
use crate::errors::{ImpersonationError, SessionError};
use crate::services::TokenCodec;
use crate::utils::consts;

use super::{AuthGateway, SessionStore};

pub struct ImpersonationController {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn AuthGateway>,
    codec: Arc<TokenCodec>,
}

impl ImpersonationController {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateway: Arc<dyn AuthGateway>,
        codec: Arc<TokenCodec>,
    ) -> Self {
        Self {
            store,
            gateway,
            codec,
        }
    }

    /// Assume `target_subject_id`'s session.
    ///
    /// Atomic from the caller's perspective: either the store ends up
    /// with the impersonated pair as `current` and the admin's pair as
    /// `original`, or it is left exactly as it was (the saved original
    /// is rolled back when the token request fails).
    ///
    /// Returns the fresh claims. An identity switch is a fresh session
    /// start: callers must rebuild all identity-derived state rather
    /// than patching it in place.
    pub async fn start(
        &self,
        target_subject_id: &str,
    ) -> Result<SessionClaims, ImpersonationError> {
        let current = self
            .store
            .get_current()
            .ok_or(ImpersonationError::Session(SessionError::Expired))?;
        let claims = self
            .codec
            .decode(&current.access_token)
            .ok_or(ImpersonationError::Session(SessionError::Expired))?;

        if claims.is_impersonation() || self.store.has_original() {
            return Err(ImpersonationError::AlreadyImpersonating);
        }
        if !permissions::evaluate(&claims, consts::IMPERSONATE_PERMISSION) {
            return Err(ImpersonationError::NotPermitted);
        }

        self.store.save_original();
        let pair = match self
            .gateway
            .impersonate(&current.access_token, target_subject_id)
            .await
        {
            Ok(pair) => pair,
            Err(e) => {
                // Roll back so the session is not left "has original but
                // current unchanged".
                self.store.clear_original();
                return Err(e);
            }
        };

        let new_claims = match self.codec.decode(&pair.access_token) {
            Some(new_claims) => new_claims,
            None => {
                self.store.clear_original();
                return Err(ImpersonationError::Session(SessionError::Internal));
            }
        };
        self.store.set_current(pair);

        info!(
            admin = %claims.subject_id,
            target = %target_subject_id,
            "impersonation started"
        );
        Ok(new_claims)
    }

    /// Return to the admin's own session.
    ///
    /// Idempotent: with no active impersonation this is a no-op and
    /// returns `Ok(None)`. Otherwise restores exactly the saved pair,
    /// clears the `original` slot, and returns the restored claims —
    /// again a fresh session start for the caller.
    pub async fn stop(&self) -> Result<Option<SessionClaims>, ImpersonationError> {
        let Some(restored) = self.store.restore_original() else {
            return Ok(None);
        };

        info!("impersonation stopped");
        Ok(self.codec.decode(&restored.access_token))
    }

    /// Claims of the admin behind the active impersonation, for callers
    /// rendering the "return to my account" affordance.
    pub fn impersonator(&self) -> Result<SessionClaims, ImpersonationError> {
        let original = self
            .store
            .get_original()
            .ok_or(ImpersonationError::NoActiveImpersonation)?;
        self.codec
            .decode(&original.access_token)
            .ok_or(ImpersonationError::NoActiveImpersonation)
    }

    pub fn is_impersonating(&self) -> bool {
        self.store.has_original()
    }
}
