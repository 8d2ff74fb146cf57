use thiserror::Error;

/// Malformed claims rejected at encode time. Decoding never errors; a
/// malformed token decodes to `None`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("missing subject id")]
    MissingSubject,

    #[error("missing organization id")]
    MissingOrganization,

    #[error("expiry must be later than issue time")]
    InvalidExpiry,

    #[error("impersonation marker must differ from the subject")]
    SelfImpersonation,

    #[error("token signing failed")]
    Signing,
}
