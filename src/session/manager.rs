//! Client session lifecycle: single-flight refresh and teardown.
//!
//! One `SessionManager` exists per client context. The refresh path is
//! the one real concurrency hazard in the crate: a single-use refresh
//! token raced by several callers. The manager resolves it with an
//! in-flight slot plus a FIFO waiter queue — callers arriving while a
//! rotation is in flight subscribe to its outcome instead of issuing
//! their own, so the token is rotated at most once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tracing::{info, warn};

use crate::domain::TokenPair;
use crate::errors::SessionError;
use crate::utils::Config;

use super::{AuthGateway, SessionStore};

type RefreshOutcome = Result<TokenPair, SessionError>;

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn AuthGateway>,
    /// Bound on the remote rotation; when it elapses the whole waiter
    /// queue is rejected rather than left hanging.
    refresh_wait: Duration,
    // None: idle. Some(waiters): a refresh is in flight and these callers
    // are queued on its outcome.
    inflight: Mutex<Option<Vec<oneshot::Sender<RefreshOutcome>>>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateway: Arc<dyn AuthGateway>,
        refresh_wait: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            refresh_wait,
            inflight: Mutex::new(None),
        }
    }

    pub fn from_config(
        store: Arc<dyn SessionStore>,
        gateway: Arc<dyn AuthGateway>,
        config: &Config,
    ) -> Self {
        Self::new(store, gateway, Duration::from_millis(config.refresh_wait_ms()))
    }

    /// Rotate the current refresh token, or join a rotation already in
    /// flight.
    ///
    /// Exactly one rotation reaches the gateway per in-flight window;
    /// every caller in that window sees the same outcome. On
    /// `SessionError::Expired` the stored session is destroyed before
    /// the error is returned — callers must re-authenticate. A
    /// `Transport` failure leaves the session intact; the manager makes
    /// one attempt and leaves retry policy to the caller. An in-flight
    /// refresh is not cancellable: an abandoned caller's rotation still
    /// completes and updates the store.
    pub async fn refresh(&self) -> RefreshOutcome {
        let waiter = {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_mut() {
                Some(waiters) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    Some(rx)
                }
                None => {
                    *inflight = Some(Vec::new());
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            // The leader settles the queue even on timeout; a dropped
            // sender only happens if it panicked.
            return rx.await.unwrap_or(Err(SessionError::Internal));
        }

        let outcome = self.run_refresh().await;

        let waiters = {
            let mut inflight = self.inflight.lock().await;
            inflight.take().unwrap_or_default()
        };
        for tx in waiters {
            let _ = tx.send(outcome.clone());
        }
        outcome
    }

    /// Best-effort logout: the remote call may fail, local clearing
    /// always proceeds.
    pub async fn logout(&self) {
        if let Some(pair) = self.store.get_current() {
            if let Err(e) = self.gateway.logout(&pair.refresh_token).await {
                warn!(error = %e, "remote logout failed; clearing local session anyway");
            }
        }
        self.store.clear_all();
        info!("session cleared");
    }

    async fn run_refresh(&self) -> RefreshOutcome {
        let Some(pair) = self.store.get_current() else {
            return Err(SessionError::Expired);
        };

        let attempt =
            tokio::time::timeout(self.refresh_wait, self.gateway.refresh(&pair.refresh_token))
                .await;

        match attempt {
            Ok(Ok(new_pair)) => {
                self.store.set_current(new_pair.clone());
                Ok(new_pair)
            }
            Ok(Err(SessionError::Transport(reason))) => {
                // Transient: the presented token was not consumed, the
                // caller may retry with backoff.
                Err(SessionError::Transport(reason))
            }
            Ok(Err(e)) => {
                // Terminal: force re-authentication.
                self.store.clear_all();
                Err(e)
            }
            Err(_elapsed) => {
                warn!("refresh did not settle within the wait bound");
                self.store.clear_all();
                Err(SessionError::Expired)
            }
        }
    }
}
