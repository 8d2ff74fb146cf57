use serde::{Deserialize, Serialize};

/// Opaque encoded access + refresh token pair.
///
/// The access token's claims are a projection of the refresh record's
/// identity (same subject and organization); that is enforced by
/// construction in the issuance service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}
