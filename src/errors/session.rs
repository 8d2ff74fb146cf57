use thiserror::Error;

/// Session-layer failures.
///
/// `Expired` is terminal: callers clear the session and force
/// re-authentication, never loop-retry. `Transport` failures may be
/// retried by the caller with backoff; the core makes one attempt.
///
/// Clone is required so a single refresh outcome can be fanned out to
/// every queued waiter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session expired, sign in again")]
    Expired,

    #[error("auth endpoint unreachable: {0}")]
    Transport(String),

    #[error("Something went wrong, please try again later.")]
    Internal,
}
