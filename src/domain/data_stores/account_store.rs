use crate::domain::{AccountRecord, Email};

use super::AccountStoreError;

/// Read-only view of the account directory. Persistence of users, roles
/// and organizations lives outside this crate; the issuance service only
/// needs lookups.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &Email) -> Result<AccountRecord, AccountStoreError>;
    async fn find_by_subject(&self, subject_id: &str) -> Result<AccountRecord, AccountStoreError>;
}
