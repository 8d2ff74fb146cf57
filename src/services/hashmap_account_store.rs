use std::collections::BTreeSet;
use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{AccountRecord, AccountStatus, AccountStore, AccountStoreError, Email};
use crate::services::password::hash_password;
use crate::validation::is_valid_permission;

/// In-memory directory for tests and development.
#[derive(Default)]
pub struct HashmapAccountStore {
    by_email: HashMap<String, AccountRecord>,
}

impl HashmapAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&mut self, record: AccountRecord) -> Result<(), AccountStoreError> {
        if !record.permissions.iter().all(|p| is_valid_permission(p)) {
            return Err(AccountStoreError::InvalidPermission);
        }
        let key = record.email.as_ref().to_string();
        if self.by_email.contains_key(&key) {
            return Err(AccountStoreError::AlreadyExists);
        }
        self.by_email.insert(key, record);
        Ok(())
    }

    /// Hash the password and insert a fresh record; returns the generated
    /// subject id.
    pub async fn register(
        &mut self,
        email: Email,
        password: &str,
        organization_id: &str,
        status: AccountStatus,
        permissions: BTreeSet<String>,
    ) -> Result<String, AccountStoreError> {
        let password_hash = hash_password(password)
            .await
            .map_err(|_| AccountStoreError::Unexpected)?;
        let subject_id = Uuid::new_v4().to_string();
        self.add_account(AccountRecord {
            subject_id: subject_id.clone(),
            organization_id: organization_id.to_string(),
            email,
            password_hash,
            status,
            permissions,
        })?;
        Ok(subject_id)
    }

    pub fn account_count(&self) -> usize {
        self.by_email.len()
    }
}

#[async_trait::async_trait]
impl AccountStore for HashmapAccountStore {
    async fn find_by_email(&self, email: &Email) -> Result<AccountRecord, AccountStoreError> {
        self.by_email
            .get(email.as_ref())
            .cloned()
            .ok_or(AccountStoreError::NotFound)
    }

    async fn find_by_subject(&self, subject_id: &str) -> Result<AccountRecord, AccountStoreError> {
        self.by_email
            .values()
            .find(|r| r.subject_id == subject_id)
            .cloned()
            .ok_or(AccountStoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(s: &str) -> Email {
        Email::parse(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn register_and_find() {
        let mut store = HashmapAccountStore::new();
        let subject = store
            .register(
                email("recruiter@acme.example.com"),
                "Hunter2-valid!",
                "org-1",
                AccountStatus::Active,
                BTreeSet::from(["job:read".to_string()]),
            )
            .await
            .unwrap();
        assert_eq!(store.account_count(), 1);

        let by_email = store
            .find_by_email(&email("recruiter@acme.example.com"))
            .await
            .unwrap();
        assert_eq!(by_email.subject_id, subject);

        let by_subject = store.find_by_subject(&subject).await.unwrap();
        assert_eq!(by_subject.email, email("recruiter@acme.example.com"));
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let mut store = HashmapAccountStore::new();
        store
            .register(
                email("dup@acme.example.com"),
                "Hunter2-valid!",
                "org-1",
                AccountStatus::Active,
                BTreeSet::new(),
            )
            .await
            .unwrap();
        let dup = store
            .register(
                email("dup@acme.example.com"),
                "Other-pass1!",
                "org-1",
                AccountStatus::Active,
                BTreeSet::new(),
            )
            .await;
        assert_eq!(dup, Err(AccountStoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn malformed_permission_strings_are_rejected() {
        let mut store = HashmapAccountStore::new();
        let res = store
            .register(
                email("weird@acme.example.com"),
                "Hunter2-valid!",
                "org-1",
                AccountStatus::Active,
                BTreeSet::from(["Not A Permission".to_string()]),
            )
            .await;
        assert_eq!(res, Err(AccountStoreError::InvalidPermission));
    }

    #[tokio::test]
    async fn unknown_lookups_miss() {
        let store = HashmapAccountStore::new();
        assert_eq!(
            store.find_by_email(&email("nobody@acme.example.com")).await,
            Err(AccountStoreError::NotFound)
        );
        assert_eq!(
            store.find_by_subject("missing").await,
            Err(AccountStoreError::NotFound)
        );
    }
}
