use thiserror::Error;

use super::SessionError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImpersonationError {
    #[error("impersonation is not permitted")]
    NotPermitted,

    #[error("an impersonation session is already active")]
    AlreadyImpersonating,

    #[error("no impersonation session is active")]
    NoActiveImpersonation,

    #[error(transparent)]
    Session(#[from] SessionError),
}
