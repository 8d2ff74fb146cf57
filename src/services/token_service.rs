/// Token issuance and rotation service.
///
/// This module provides the `TokenService`, which coordinates:
/// - Credential authentication with enumeration resistance
/// - Creation of access (JWT) tokens with tenant-scoped permission claims
/// - Creation and rotation of refresh tokens (single use)
/// - Detection of refresh token reuse (and session revocation on reuse)
/// - Issuance of impersonation sessions for privileged admins
/// - Validation (signature + claims + revocation) of access tokens
/// - Explicit session revocation (logout)
///
/// Security model:
/// 1. Each refresh token rotation produces a new refresh token and marks the
///    previous one as used/replaced.
/// 2. Presenting an already-used / replaced refresh token is treated as a
///    reuse attempt and the entire session is revoked.
/// 3. Access tokens are short-lived (configured TTL) and are invalidated
///    early if their session is revoked.
/// 4. Login verifies a password hash whether or not the email resolves, so
///    the response shape never reveals which accounts exist.
///
/// Errors:
/// - Login maps directory state to `LoginError`; suspended and pending
///   accounts are distinguishable, bad credentials are not.
/// - Refresh workflows map internal inconsistencies to `RefreshError`.
/// - Access token validation distinguishes malformed tokens, expiry, and
///   revoked sessions via `AccessError`.
///
/// Concurrency:
/// - Internal mutable state is hidden behind an async `RwLock<dyn
///   RefreshStore>`. Rotation and revocation take a write lock only for
///   the minimal critical section.
///
/// Extensibility:
/// - Swapping the underlying `RefreshStore` or `AccountStore` is done by
///   providing a different implementation at construction.
use std::collections::BTreeSet;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{
    hash_refresh, permissions, AccountStatus, AccountStore, AccountStoreError, Email,
    IssuedSession, Password, RefreshError, RefreshRecord, RefreshStore, SessionClaims, TokenPair,
};
use crate::errors::{ImpersonationError, LoginError, SessionError};
use crate::services::password::{dummy_hash, verify_password};
use crate::services::TokenCodec;
use crate::utils::{consts, Config};

#[derive(Clone)]
/// Main façade for authenticating credentials and issuing / rotating
/// token pairs.
///
/// Typical lifecycle:
/// 1. `login` -> returns claims + `(access, refresh)` pair
/// 2. Client rotates with `refresh` to obtain a new pair
/// 3. A privileged admin calls `impersonate` to obtain a pair for another
///    subject, marked with the admin's identity
/// 4. On logout or suspected compromise -> `logout`
/// 5. Every protected request -> `validate_access`
pub struct TokenService {
    cfg: Arc<RwLock<Config>>,
    codec: Arc<TokenCodec>,
    accounts: Arc<dyn AccountStore>,
    // State that changes: refresh records and revoked sessions
    state: Arc<RwLock<Box<dyn RefreshStore>>>,
}

#[derive(Debug)]
pub enum AccessError {
    InvalidToken,
    Expired,
    RevokedSession,
}

impl TokenService {
    /// Construct a new `TokenService`.
    ///
    /// Parameters:
    /// - `cfg`: shared configuration (issuer, audience, TTLs, keys)
    /// - `accounts`: directory lookup implementation
    /// - `store`: refresh store implementation
    pub async fn new(
        cfg: Arc<RwLock<Config>>,
        accounts: Arc<dyn AccountStore>,
        store: Box<dyn RefreshStore>,
    ) -> Self {
        let codec = {
            let config = cfg.read().await;
            Arc::new(TokenCodec::from_config(&config))
        };

        let state = Arc::new(RwLock::new(store));
        Self {
            cfg,
            codec,
            accounts,
            state,
        }
    }

    /// Codec handle for callers that decode tokens themselves (session
    /// layer, middleware).
    pub fn codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.codec)
    }

    /// Authenticate credentials and issue the initial session.
    ///
    /// The same `InvalidCredentials` error covers an unknown email and a
    /// wrong password; a hash verification runs in both cases so the two
    /// are indistinguishable by response shape or timing. Suspended and
    /// pending accounts are only reported once the password checks out.
    ///
    /// `remember` selects the long-lived refresh TTL; rotation semantics
    /// are identical either way.
    pub async fn login(
        &self,
        email: &Email,
        password: &Password,
        remember: bool,
    ) -> Result<IssuedSession, LoginError> {
        let account = match self.accounts.find_by_email(email).await {
            Ok(account) => Some(account),
            Err(AccountStoreError::NotFound) => None,
            Err(_) => return Err(LoginError::Internal),
        };

        let hash = account
            .as_ref()
            .map(|a| a.password_hash.clone())
            .unwrap_or_else(dummy_hash);
        let password_ok = verify_password(password.as_ref(), &hash)
            .await
            .map_err(|_| LoginError::Internal)?;

        let account = match account {
            Some(account) if password_ok => account,
            _ => {
                debug!("login rejected: bad credentials");
                return Err(LoginError::InvalidCredentials);
            }
        };

        match account.status {
            AccountStatus::Blocked | AccountStatus::Inactive => Err(LoginError::AccountSuspended),
            AccountStatus::Invited => Err(LoginError::AccountPending),
            AccountStatus::Active => {
                let refresh_ttl = {
                    let config = self.cfg.read().await;
                    if remember {
                        config.remember_refresh_ttl_seconds()
                    } else {
                        config.refresh_ttl_seconds()
                    }
                };
                let issued = self
                    .issue_session(
                        account.subject_id,
                        account.organization_id,
                        account.permissions,
                        None,
                        refresh_ttl,
                    )
                    .await
                    .map_err(|_| LoginError::Internal)?;
                info!(subject = %issued.claims.subject_id, "session issued");
                Ok(issued)
            }
        }
    }

    /// Rotate a refresh token, returning a fresh access + refresh pair.
    ///
    /// Security behavior:
    /// - Marks the presented refresh token as used/replaced.
    /// - If the token was already used/replaced, the session is revoked
    ///   and an error returned.
    ///
    /// Possible errors:
    /// - `NotFoundOrExpired`: token hash not present or expired
    /// - `ReuseDetected`: reuse attempt (session revoked)
    /// - `Revoked`: session already revoked
    /// - `Internal`: underlying store failure
    pub async fn refresh(&self, presented_refresh: &str) -> Result<IssuedSession, RefreshError> {
        let now = now_secs();
        let (hash_key, access_ttl) = {
            let config = self.cfg.read().await;
            (*config.refresh_hash_key(), config.access_ttl_seconds())
        };

        let next_plain = new_refresh_token_plain();

        let rotated = {
            let mut st = self.state.write().await;
            st.rotate(presented_refresh, &next_plain, now, &hash_key)
                .await
        };
        let (_old, new_record) = match rotated {
            Ok(pair) => pair,
            Err(RefreshError::ReuseDetected) => {
                warn!("refresh token reuse detected; session chain revoked");
                return Err(RefreshError::ReuseDetected);
            }
            Err(e) => return Err(e),
        };

        let claims = SessionClaims {
            subject_id: new_record.subject_id.clone(),
            organization_id: new_record.organization_id.clone(),
            permissions: new_record.permissions.clone(),
            impersonated_by: new_record.impersonated_by.clone(),
            session_id: new_record.session_id,
            issued_at: now,
            expires_at: now + Duration::seconds(access_ttl),
        };
        let access = self
            .codec
            .encode(&claims)
            .map_err(|_| RefreshError::Internal)?;

        debug!(session = %new_record.session_id, "refresh token rotated");
        Ok(IssuedSession {
            session_id: new_record.session_id,
            claims,
            pair: TokenPair::new(access, next_plain),
        })
    }

    /// Issue a session for `target_subject_id`, acting on behalf of the
    /// caller identified by `caller` claims.
    ///
    /// Preconditions: the caller holds the impersonation permission, is
    /// not already impersonating, and the target is a different, active
    /// account in the caller's organization. Directory misses and
    /// out-of-tenant targets are reported as `NotPermitted` alike.
    pub async fn impersonate(
        &self,
        caller: &SessionClaims,
        target_subject_id: &str,
    ) -> Result<IssuedSession, ImpersonationError> {
        if !permissions::evaluate(caller, consts::IMPERSONATE_PERMISSION) {
            return Err(ImpersonationError::NotPermitted);
        }
        if caller.is_impersonation() {
            return Err(ImpersonationError::AlreadyImpersonating);
        }
        if caller.subject_id == target_subject_id {
            return Err(ImpersonationError::NotPermitted);
        }

        let target = match self.accounts.find_by_subject(target_subject_id).await {
            Ok(target) => target,
            Err(_) => return Err(ImpersonationError::NotPermitted),
        };
        if target.organization_id != caller.organization_id || !target.status.is_active() {
            return Err(ImpersonationError::NotPermitted);
        }

        let refresh_ttl = {
            let config = self.cfg.read().await;
            config.impersonation_ttl_seconds()
        };
        let issued = self
            .issue_session(
                target.subject_id,
                target.organization_id,
                target.permissions,
                Some(caller.subject_id.clone()),
                refresh_ttl,
            )
            .await
            .map_err(|_| ImpersonationError::Session(SessionError::Internal))?;

        info!(
            admin = %caller.subject_id,
            target = %target_subject_id,
            "impersonation session issued"
        );
        Ok(issued)
    }

    /// Revoke the session chain the presented refresh token belongs to.
    ///
    /// Best-effort: unknown or already-dead tokens are ignored, so client
    /// teardown never depends on this call succeeding.
    pub async fn logout(&self, presented_refresh: &str) {
        let hash_key = {
            let config = self.cfg.read().await;
            *config.refresh_hash_key()
        };
        let session = {
            let st = self.state.read().await;
            st.session_for_token(presented_refresh, &hash_key).await
        };
        if let Some(session_id) = session {
            let mut st = self.state.write().await;
            st.revoke_session(session_id, Utc::now()).await;
            info!(session = %session_id, "session revoked");
        }
    }

    /// Validate an access token: codec decode (signature + structure),
    /// then expiry, then the revoked-session check.
    pub async fn validate_access(&self, token: &str) -> Result<SessionClaims, AccessError> {
        let claims = self.codec.decode(token).ok_or(AccessError::InvalidToken)?;
        if claims.is_expired(Utc::now()) {
            return Err(AccessError::Expired);
        }

        {
            let st = self.state.read().await;
            if st.is_session_revoked(claims.session_id).await {
                return Err(AccessError::RevokedSession);
            }
        }

        Ok(claims)
    }

    // Build claims, sign the access token, and record the refresh chain
    // head. Access claims project the record's identity by construction.
    async fn issue_session(
        &self,
        subject_id: String,
        organization_id: String,
        permissions: BTreeSet<String>,
        impersonated_by: Option<String>,
        refresh_ttl_seconds: i64,
    ) -> Result<IssuedSession, RefreshError> {
        let session_id = Uuid::new_v4();
        let now = now_secs();
        let (access_ttl, hash_key) = {
            let config = self.cfg.read().await;
            (config.access_ttl_seconds(), *config.refresh_hash_key())
        };

        let claims = SessionClaims {
            subject_id: subject_id.clone(),
            organization_id: organization_id.clone(),
            permissions: permissions.clone(),
            impersonated_by: impersonated_by.clone(),
            session_id,
            issued_at: now,
            expires_at: now + Duration::seconds(access_ttl),
        };
        let access = self
            .codec
            .encode(&claims)
            .map_err(|_| RefreshError::Internal)?;

        let refresh_plain = new_refresh_token_plain();
        let record = RefreshRecord {
            token_hash: hash_refresh(&hash_key, &refresh_plain),
            subject_id,
            organization_id,
            permissions,
            impersonated_by,
            session_id,
            created_at: now,
            expires_at: now + Duration::seconds(refresh_ttl_seconds),
            parent_hash: None,
            replaced_by_hash: None,
            used_at: None,
            revoked_at: None,
        };

        {
            let mut st = self.state.write().await;
            st.insert_initial(record).await?;
        }

        Ok(IssuedSession {
            session_id,
            claims,
            pair: TokenPair::new(access, refresh_plain),
        })
    }
}

fn new_refresh_token_plain() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    B64.encode(bytes)
}

// Claims carry second precision; issue on a whole second so the claims a
// caller holds compare equal to what later decodes from the token.
fn now_secs() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(Utc::now().timestamp(), 0).unwrap_or_else(Utc::now)
}
