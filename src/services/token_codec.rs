//! Signed session-token codec.
//!
//! The codec owns format, not policy: decoding verifies the signature and
//! parses the claim structure, but an expired token still decodes — the
//! caller interprets `expires_at`. Decoding is total over the string
//! domain; malformed input yields `None`, never a panic or an error.
//!
//! Timestamps are carried with second precision; sub-second components
//! are dropped on encode.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode_header, Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{JwtKeyStore, SessionClaims};
use crate::errors::EncodingError;
use crate::utils::Config;

pub struct TokenCodec {
    keys: JwtKeyStore,
    issuer: String,
    audience: String,
}

/// JWT payload shape; converted to `SessionClaims` in the structural
/// phase of decoding.
#[derive(Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    org: String,
    #[serde(default)]
    perms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    act: Option<String>,
    sid: String,
    iss: String,
    aud: String,
    iat: i64,
    exp: i64,
    jti: String,
}

impl TokenCodec {
    pub fn new(keys: JwtKeyStore, issuer: String, audience: String) -> Self {
        Self {
            keys,
            issuer,
            audience,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            JwtKeyStore::from_config(config.jwt_keys(), config.jwt_active_kid()),
            config.jwt_issuer().to_owned(),
            config.jwt_audience().to_owned(),
        )
    }

    /// Sign claims into a compact token. Fails only on malformed claims
    /// or a signing error; no I/O.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String, EncodingError> {
        validate_claims(claims)?;

        let wire = WireClaims {
            sub: claims.subject_id.clone(),
            org: claims.organization_id.clone(),
            perms: claims.permissions.iter().cloned().collect(),
            act: claims.impersonated_by.clone(),
            sid: claims.session_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let (enc_key, kid) = self.keys.encoding_key_and_kid();
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());

        jsonwebtoken::encode(&header, &wire, enc_key).map_err(|_| EncodingError::Signing)
    }

    /// Two-phase decode: (1) signature + issuer/audience verification,
    /// (2) structural claims parse. `None` on any malformation. Expired
    /// tokens decode; expiry is the caller's check.
    pub fn decode(&self, token: &str) -> Option<SessionClaims> {
        let header = decode_header(token).ok()?;
        let key = self.keys.decoding_key_for_kid(header.kid.as_deref())?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = false;

        let data = jsonwebtoken::decode::<WireClaims>(token, key, &validation).ok()?;
        claims_from_wire(data.claims)
    }
}

fn validate_claims(claims: &SessionClaims) -> Result<(), EncodingError> {
    if claims.subject_id.is_empty() {
        return Err(EncodingError::MissingSubject);
    }
    if claims.organization_id.is_empty() {
        return Err(EncodingError::MissingOrganization);
    }
    if claims.expires_at <= claims.issued_at {
        return Err(EncodingError::InvalidExpiry);
    }
    if claims.impersonated_by.as_deref() == Some(claims.subject_id.as_str()) {
        return Err(EncodingError::SelfImpersonation);
    }
    Ok(())
}

fn claims_from_wire(wire: WireClaims) -> Option<SessionClaims> {
    if wire.sub.is_empty() || wire.org.is_empty() {
        return None;
    }
    if wire.act.as_deref() == Some(wire.sub.as_str()) {
        return None;
    }
    let issued_at = DateTime::<Utc>::from_timestamp(wire.iat, 0)?;
    let expires_at = DateTime::<Utc>::from_timestamp(wire.exp, 0)?;
    if expires_at <= issued_at {
        return None;
    }
    let session_id = Uuid::parse_str(&wire.sid).ok()?;

    Some(SessionClaims {
        subject_id: wire.sub,
        organization_id: wire.org,
        permissions: wire.perms.into_iter().collect(),
        impersonated_by: wire.act,
        session_id,
        issued_at,
        expires_at,
    })
}
