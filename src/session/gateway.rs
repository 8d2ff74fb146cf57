//! Boundary to the remote token endpoints.
//!
//! The session layer talks to `/auth/refresh`, `/auth/logout` and
//! `/auth/impersonate` through this trait; `ServiceGateway` adapts an
//! in-process `TokenService`, `HttpAuthGateway` speaks to a remote
//! deployment.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::Serialize;

use crate::domain::{RefreshError, TokenPair};
use crate::errors::{ImpersonationError, SessionError};
use crate::services::{AccessError, TokenService};

#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// One rotation attempt. Terminal failures (expired, rotated,
    /// revoked) come back as `SessionError::Expired`; transient ones as
    /// `Transport`.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError>;

    async fn logout(&self, refresh_token: &str) -> Result<(), SessionError>;

    /// Issue a pair for `target_subject_id` on behalf of the caller
    /// identified by `access_token`.
    async fn impersonate(
        &self,
        access_token: &str,
        target_subject_id: &str,
    ) -> Result<TokenPair, ImpersonationError>;
}

/// In-process adapter over the issuance service.
pub struct ServiceGateway {
    service: Arc<TokenService>,
}

impl ServiceGateway {
    pub fn new(service: Arc<TokenService>) -> Self {
        Self { service }
    }
}

#[async_trait::async_trait]
impl AuthGateway for ServiceGateway {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        self.service
            .refresh(refresh_token)
            .await
            .map(|issued| issued.pair)
            .map_err(|e| match e {
                RefreshError::Internal => SessionError::Internal,
                // Not found, expired, rotated, revoked: re-authenticate.
                _ => SessionError::Expired,
            })
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        self.service.logout(refresh_token).await;
        Ok(())
    }

    async fn impersonate(
        &self,
        access_token: &str,
        target_subject_id: &str,
    ) -> Result<TokenPair, ImpersonationError> {
        let caller = self
            .service
            .validate_access(access_token)
            .await
            .map_err(|e| match e {
                AccessError::Expired => ImpersonationError::Session(SessionError::Expired),
                _ => ImpersonationError::NotPermitted,
            })?;
        self.service
            .impersonate(&caller, target_subject_id)
            .await
            .map(|issued| issued.pair)
    }
}

/// HTTP client for a remote auth deployment.
pub struct HttpAuthGateway {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct RefreshRequestBody<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct ImpersonateRequestBody<'a> {
    #[serde(rename = "targetUserId")]
    target_user_id: &'a str,
}

impl HttpAuthGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait::async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequestBody { refresh_token })
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<TokenPair>()
                .await
                .map_err(|e| SessionError::Transport(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SessionError::Expired),
            status => Err(SessionError::Transport(format!(
                "refresh endpoint returned {status}"
            ))),
        }
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), SessionError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .json(&RefreshRequestBody { refresh_token })
            .send()
            .await
            .map_err(|e| SessionError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SessionError::Transport(format!(
                "logout endpoint returned {}",
                response.status()
            )))
        }
    }

    async fn impersonate(
        &self,
        access_token: &str,
        target_subject_id: &str,
    ) -> Result<TokenPair, ImpersonationError> {
        let response = self
            .client
            .post(self.url("/auth/impersonate"))
            .bearer_auth(access_token)
            .json(&ImpersonateRequestBody {
                target_user_id: target_subject_id,
            })
            .send()
            .await
            .map_err(|e| ImpersonationError::Session(SessionError::Transport(e.to_string())))?;

        match response.status() {
            status if status.is_success() => response
                .json::<TokenPair>()
                .await
                .map_err(|e| ImpersonationError::Session(SessionError::Transport(e.to_string()))),
            StatusCode::UNAUTHORIZED => Err(ImpersonationError::Session(SessionError::Expired)),
            StatusCode::FORBIDDEN => Err(ImpersonationError::NotPermitted),
            StatusCode::CONFLICT => Err(ImpersonationError::AlreadyImpersonating),
            status => Err(ImpersonationError::Session(SessionError::Transport(
                format!("impersonate endpoint returned {status}"),
            ))),
        }
    }
}
