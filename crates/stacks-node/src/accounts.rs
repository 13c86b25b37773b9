//! Account management
//!
//! Every activity event is a read-modify-write: fetch the account, bump a
//! counter (which refreshes score and tier), write it back.

use stacks_core::{eq_ignore_case, generate_account_id, Account, AccountId, AccountStore, Error, Result};
use std::sync::Arc;

pub struct AccountService<S> {
    store: Arc<S>,
}

impl<S: AccountStore> AccountService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Register a new account. Emails must be unique.
    pub fn create_account(&self, username: &str, email: &str) -> Result<Account> {
        if username.trim().is_empty() {
            return Err(Error::validation("username", "username is required"));
        }
        if email.trim().is_empty() {
            return Err(Error::validation("email", "email is required"));
        }
        match self.store.get_account_by_email(email) {
            Ok(_) => return Err(Error::already_exists("account", email)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let account = Account::new(generate_account_id(), username, email);
        self.store.create_account(account.clone())?;
        tracing::info!("Created account {} ({})", account.username, account.id);
        Ok(account)
    }

    pub fn get_account(&self, id: &AccountId) -> Result<Account> {
        self.store.get_account(id)
    }

    pub fn get_account_by_email(&self, email: &str) -> Result<Account> {
        self.store.get_account_by_email(email)
    }

    pub fn get_account_by_username(&self, username: &str) -> Result<Account> {
        self.store
            .list_accounts()?
            .into_iter()
            .find(|a| eq_ignore_case(&a.username, username))
            .ok_or_else(|| Error::not_found("account", username))
    }

    pub fn record_upload(&self, id: &AccountId) -> Result<Account> {
        self.modify(id, Account::record_upload)
    }

    pub fn record_download(&self, id: &AccountId) -> Result<Account> {
        self.modify(id, Account::record_download)
    }

    /// Fold a rating the account received into its average
    pub fn record_rating_received(&self, id: &AccountId, rating: f64) -> Result<Account> {
        self.modify(id, |account| account.record_rating(rating))
    }

    fn modify(&self, id: &AccountId, change: impl FnOnce(&mut Account)) -> Result<Account> {
        let mut account = self.store.get_account(id)?;
        change(&mut account);
        self.store.update_account(&account)?;
        tracing::debug!(
            "Account {} now at score {} ({})",
            account.username,
            account.score,
            account.tier
        );
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacks_core::Tier;
    use stacks_store::MemoryStore;

    fn service() -> AccountService<MemoryStore> {
        AccountService::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_create_and_fetch() {
        let accounts = service();
        let created = accounts.create_account("user", "u@test.com").unwrap();
        assert_eq!(created.tier, Tier::Neutral);

        let fetched = accounts.get_account(&created.id).unwrap();
        assert_eq!(fetched.username, "user");
        assert_eq!(accounts.get_account_by_email("u@test.com").unwrap().id, created.id);
        assert_eq!(accounts.get_account_by_username("USER").unwrap().id, created.id);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let accounts = service();
        accounts.create_account("one", "same@test.com").unwrap();
        let err = accounts.create_account("two", "same@test.com").unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }));
    }

    #[test]
    fn test_empty_fields_rejected() {
        let accounts = service();
        assert!(matches!(
            accounts.create_account("", "a@test.com"),
            Err(Error::Validation { field: "username", .. })
        ));
        assert!(matches!(
            accounts.create_account("a", "  "),
            Err(Error::Validation { field: "email", .. })
        ));
    }

    #[test]
    fn test_record_upload_and_download() {
        let accounts = service();
        let user = accounts.create_account("user", "u@test.com").unwrap();

        for _ in 0..5 {
            accounts.record_upload(&user.id).unwrap();
        }
        let stored = accounts.get_account(&user.id).unwrap();
        assert_eq!(stored.uploads, 5);
        assert_eq!(stored.score, 10);

        for _ in 0..15 {
            accounts.record_download(&user.id).unwrap();
        }
        let stored = accounts.get_account(&user.id).unwrap();
        assert_eq!(stored.downloads, 15);
        assert_eq!(stored.score, -5);
        assert_eq!(stored.tier, Tier::Leecher);
    }

    #[test]
    fn test_record_rating_received() {
        let accounts = service();
        let user = accounts.create_account("user", "u@test.com").unwrap();
        accounts.record_rating_received(&user.id, 3.0).unwrap();
        let updated = accounts.record_rating_received(&user.id, 4.0).unwrap();
        assert!((updated.average_rating - 3.5).abs() < f64::EPSILON);
        assert_eq!(updated.score, 35);
    }

    #[test]
    fn test_unknown_account_is_not_found() {
        let accounts = service();
        let err = accounts.record_upload(&AccountId::new("ghost")).unwrap_err();
        assert!(err.is_not_found());
    }
}
