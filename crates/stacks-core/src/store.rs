//! Storage contracts
//!
//! The reputation and search components never own state; they read and write
//! through these traits. Getters hand out owned copies, and a caller that
//! wants to change a record mutates its copy and writes it back with the
//! matching `update_*` call.

use crate::error::Result;
use crate::types::{Account, AccountId, ContentId, Resource, ResourceRating};

/// Account persistence
pub trait AccountStore: Send + Sync {
    /// Insert a new account; fails with `AlreadyExists` on id clash
    fn create_account(&self, account: Account) -> Result<()>;

    fn get_account(&self, id: &AccountId) -> Result<Account>;

    fn get_account_by_email(&self, email: &str) -> Result<Account>;

    /// Replace an existing account; fails with `NotFound` if absent
    fn update_account(&self, account: &Account) -> Result<()>;

    fn delete_account(&self, id: &AccountId) -> Result<()>;

    /// All accounts, in no particular order
    fn list_accounts(&self) -> Result<Vec<Account>>;
}

/// Resource persistence
pub trait ResourceStore: Send + Sync {
    fn store_resource(&self, resource: Resource) -> Result<()>;

    fn get_resource(&self, id: &ContentId) -> Result<Resource>;

    fn update_resource(&self, resource: &Resource) -> Result<()>;

    fn delete_resource(&self, id: &ContentId) -> Result<()>;

    /// All resources, in no particular order
    fn list_resources(&self) -> Result<Vec<Resource>>;

    fn resources_by_owner(&self, owner: &AccountId) -> Result<Vec<Resource>>;
}

/// Rating persistence
pub trait RatingStore: Send + Sync {
    fn create_rating(&self, rating: ResourceRating) -> Result<()>;

    fn get_rating(&self, id: &str) -> Result<ResourceRating>;

    fn ratings_for_resource(&self, resource_id: &ContentId) -> Result<Vec<ResourceRating>>;

    fn ratings_by_account(&self, account_id: &AccountId) -> Result<Vec<ResourceRating>>;
}
