//! In-memory storage for accounts, resources, and ratings

use stacks_core::{
    Account, AccountId, AccountStore, ContentId, Error, RatingStore, Resource, ResourceRating,
    ResourceStore, Result,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    resources: HashMap<ContentId, Resource>,
    ratings: HashMap<String, ResourceRating>,
}

/// Map-backed store. One lock guards all three tables, so a listing always
/// sees a consistent snapshot: many concurrent readers, one writer.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| Error::LockPoisoned("read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| Error::LockPoisoned("write"))
    }

    /// Number of (resources, accounts, ratings) held
    pub fn counts(&self) -> Result<(usize, usize, usize)> {
        let tables = self.read()?;
        Ok((
            tables.resources.len(),
            tables.accounts.len(),
            tables.ratings.len(),
        ))
    }

    /// Drop everything
    pub fn clear(&self) -> Result<()> {
        let mut tables = self.write()?;
        *tables = Tables::default();
        Ok(())
    }
}

impl AccountStore for MemoryStore {
    fn create_account(&self, account: Account) -> Result<()> {
        let mut tables = self.write()?;
        if tables.accounts.contains_key(&account.id) {
            return Err(Error::already_exists("account", account.id.as_str()));
        }
        tracing::debug!("Storing account {} ({})", account.id, account.username);
        tables.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    fn get_account(&self, id: &AccountId) -> Result<Account> {
        self.read()?
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("account", id.as_str()))
    }

    fn get_account_by_email(&self, email: &str) -> Result<Account> {
        self.read()?
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned()
            .ok_or_else(|| Error::not_found("account", email))
    }

    fn update_account(&self, account: &Account) -> Result<()> {
        let mut tables = self.write()?;
        match tables.accounts.get_mut(&account.id) {
            Some(existing) => {
                *existing = account.clone();
                Ok(())
            }
            None => Err(Error::not_found("account", account.id.as_str())),
        }
    }

    fn delete_account(&self, id: &AccountId) -> Result<()> {
        self.write()?
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("account", id.as_str()))
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.read()?.accounts.values().cloned().collect())
    }
}

impl ResourceStore for MemoryStore {
    fn store_resource(&self, resource: Resource) -> Result<()> {
        let mut tables = self.write()?;
        if tables.resources.contains_key(&resource.id) {
            return Err(Error::already_exists("resource", resource.id.as_str()));
        }
        tracing::debug!("Storing resource {} ({})", resource.id, resource.filename);
        tables.resources.insert(resource.id.clone(), resource);
        Ok(())
    }

    fn get_resource(&self, id: &ContentId) -> Result<Resource> {
        self.read()?
            .resources
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("resource", id.as_str()))
    }

    fn update_resource(&self, resource: &Resource) -> Result<()> {
        let mut tables = self.write()?;
        match tables.resources.get_mut(&resource.id) {
            Some(existing) => {
                *existing = resource.clone();
                Ok(())
            }
            None => Err(Error::not_found("resource", resource.id.as_str())),
        }
    }

    fn delete_resource(&self, id: &ContentId) -> Result<()> {
        self.write()?
            .resources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("resource", id.as_str()))
    }

    fn list_resources(&self) -> Result<Vec<Resource>> {
        Ok(self.read()?.resources.values().cloned().collect())
    }

    fn resources_by_owner(&self, owner: &AccountId) -> Result<Vec<Resource>> {
        Ok(self
            .read()?
            .resources
            .values()
            .filter(|r| &r.owner == owner)
            .cloned()
            .collect())
    }
}

impl RatingStore for MemoryStore {
    fn create_rating(&self, rating: ResourceRating) -> Result<()> {
        let mut tables = self.write()?;
        if tables.ratings.contains_key(&rating.id) {
            return Err(Error::already_exists("rating", rating.id.as_str()));
        }
        tables.ratings.insert(rating.id.clone(), rating);
        Ok(())
    }

    fn get_rating(&self, id: &str) -> Result<ResourceRating> {
        self.read()?
            .ratings
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("rating", id))
    }

    fn ratings_for_resource(&self, resource_id: &ContentId) -> Result<Vec<ResourceRating>> {
        Ok(self
            .read()?
            .ratings
            .values()
            .filter(|r| &r.resource_id == resource_id)
            .cloned()
            .collect())
    }

    fn ratings_by_account(&self, account_id: &AccountId) -> Result<Vec<ResourceRating>> {
        Ok(self
            .read()?
            .ratings
            .values()
            .filter(|r| &r.account_id == account_id)
            .cloned()
            .collect())
    }
}
