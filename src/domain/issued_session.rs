use uuid::Uuid;

use super::{SessionClaims, TokenPair};

/// Result of a successful issuance (login, rotation, or impersonation).
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub session_id: Uuid,
    pub claims: SessionClaims,
    pub pair: TokenPair,
}
