use std::collections::BTreeSet;

use super::email::Email;

/// Lifecycle state of a tenant account as reported by the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Active,
    Invited,
    Inactive,
    Blocked,
}

impl AccountStatus {
    pub fn is_active(self) -> bool {
        self == AccountStatus::Active
    }
}

/// Directory payload the issuance service authenticates against.
///
/// `permissions` is what gets baked into issued claims; it is only
/// meaningful for `Active` accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountRecord {
    pub subject_id: String,
    pub organization_id: String,
    pub email: Email,
    pub password_hash: String,
    pub status: AccountStatus,
    pub permissions: BTreeSet<String>,
}
