use thiserror::Error;

/// Authentication failures. Credential failures are never retried.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoginError {
    // Same message whether the email is unknown or the password is wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("this account has been suspended")]
    AccountSuspended,

    #[error("this account is pending activation")]
    AccountPending,

    #[error("Something went wrong, please try again later.")]
    Internal,
}
