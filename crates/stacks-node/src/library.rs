//! Library service: uploads, downloads, ratings, and catalogue views

use crate::accounts::AccountService;
use crate::config::{AccessConfig, LibraryConfig};
use serde::{Deserialize, Serialize};
use stacks_core::{
    is_valid_rating, AccountId, AccountStore, ContentId, Error, RatingStore, Resource,
    ResourceRating, ResourceStore, ResourceType, Result,
};
use stacks_index::ReputationService;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Action label for the download reputation gate
pub const DOWNLOAD_ACTION: &str = "download resource";

/// Aggregate figures over the whole catalogue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryStats {
    pub total_resources: usize,
    pub total_downloads: u64,
    pub total_ratings: u64,
    pub by_subject: BTreeMap<String, usize>,
    pub by_type: BTreeMap<ResourceType, usize>,
}

pub struct LibraryService<S> {
    store: Arc<S>,
    accounts: AccountService<S>,
    reputation: ReputationService<S>,
    rules: LibraryConfig,
    access: AccessConfig,
}

impl<S> LibraryService<S>
where
    S: AccountStore + ResourceStore + RatingStore,
{
    pub fn new(store: Arc<S>, rules: LibraryConfig, access: AccessConfig) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            reputation: ReputationService::new(store.clone()),
            store,
            rules,
            access,
        }
    }

    /// Validate and store a resource, then credit the uploader. A failed
    /// credit is logged and does not undo the upload.
    pub fn upload(&self, resource: Resource) -> Result<Resource> {
        self.validate(&resource)?;
        self.store.store_resource(resource.clone())?;

        if let Err(e) = self.accounts.record_upload(&resource.owner) {
            tracing::warn!("Could not credit upload to {}: {}", resource.owner, e);
        }

        tracing::info!(
            "Uploaded {} ({} bytes) as {}",
            resource.filename,
            resource.size,
            resource.id
        );
        Ok(resource)
    }

    /// Hand out a resource, counting the download against the requester
    pub fn download(&self, resource_id: &ContentId, account_id: &AccountId) -> Result<Resource> {
        if let Some(required) = self.access.download_min_score {
            self.reputation
                .check_access(account_id, required, DOWNLOAD_ACTION)?;
        }

        let mut resource = self.store.get_resource(resource_id)?;
        resource.record_download();
        self.store.update_resource(&resource)?;

        if let Err(e) = self.accounts.record_download(account_id) {
            tracing::warn!("Could not debit download from {}: {}", account_id, e);
        }

        tracing::info!(
            "{} downloaded {} ({} downloads)",
            account_id,
            resource.filename,
            resource.download_count
        );
        Ok(resource)
    }

    /// Rate a resource once per account; the owner's average is updated too
    pub fn rate(
        &self,
        resource_id: &ContentId,
        account_id: &AccountId,
        rating: f64,
        comment: &str,
    ) -> Result<Resource> {
        if !is_valid_rating(rating) {
            return Err(Error::InvalidRating(rating));
        }

        let mut resource = self.store.get_resource(resource_id)?;
        self.store.create_rating(ResourceRating::new(
            resource_id.clone(),
            account_id.clone(),
            rating,
            comment,
        ))?;

        resource.add_rating(rating)?;
        self.store.update_resource(&resource)?;

        if let Err(e) = self.accounts.record_rating_received(&resource.owner, rating) {
            tracing::warn!("Could not credit rating to {}: {}", resource.owner, e);
        }

        tracing::info!(
            "{} rated {} {:.1} (average {:.2})",
            account_id,
            resource.filename,
            rating,
            resource.average_rating
        );
        Ok(resource)
    }

    pub fn get_resource(&self, resource_id: &ContentId) -> Result<Resource> {
        self.store.get_resource(resource_id)
    }

    /// Everything an account has uploaded
    pub fn library_of(&self, owner: &AccountId) -> Result<Vec<Resource>> {
        let mut resources = self.store.resources_by_owner(owner)?;
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resources)
    }

    pub fn ratings_for(&self, resource_id: &ContentId) -> Result<Vec<ResourceRating>> {
        self.store.ratings_for_resource(resource_id)
    }

    /// Most downloaded first
    pub fn popular(&self, limit: usize) -> Result<Vec<Resource>> {
        let mut resources = self.catalogue()?;
        resources.sort_by(|a, b| b.download_count.cmp(&a.download_count));
        resources.truncate(limit);
        Ok(resources)
    }

    /// Newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Resource>> {
        let mut resources = self.catalogue()?;
        resources.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        resources.truncate(limit);
        Ok(resources)
    }

    /// Highest average first, unrated resources left out
    pub fn top_rated(&self, limit: usize) -> Result<Vec<Resource>> {
        let mut rated: Vec<Resource> = self
            .catalogue()?
            .into_iter()
            .filter(|r| r.total_ratings > 0)
            .collect();
        rated.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        rated.truncate(limit);
        Ok(rated)
    }

    pub fn statistics(&self) -> Result<LibraryStats> {
        let resources = self.store.list_resources()?;
        let mut stats = LibraryStats {
            total_resources: resources.len(),
            ..Default::default()
        };

        for resource in &resources {
            stats.total_downloads += resource.download_count;
            stats.total_ratings += resource.total_ratings;
            *stats.by_subject.entry(resource.subject.clone()).or_default() += 1;
            *stats.by_type.entry(resource.resource_type).or_default() += 1;
        }

        Ok(stats)
    }

    fn validate(&self, resource: &Resource) -> Result<()> {
        if resource.filename.trim().is_empty() {
            return Err(Error::validation("filename", "filename is required"));
        }
        if resource.size == 0 {
            return Err(Error::validation("size", "invalid file size"));
        }
        if resource.size > self.rules.max_file_size {
            return Err(Error::FileTooLarge {
                size: resource.size,
                max: self.rules.max_file_size,
            });
        }
        if !self
            .rules
            .allowed_extensions
            .iter()
            .any(|ext| ext == &resource.extension)
        {
            return Err(Error::InvalidFileType(resource.extension.clone()));
        }
        Ok(())
    }

    /// All resources ordered by id, so the stable sorts above break ties
    /// the same way every time
    fn catalogue(&self) -> Result<Vec<Resource>> {
        let mut resources = self.store.list_resources()?;
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacks_core::Tier;
    use stacks_store::MemoryStore;

    struct Fixture {
        library: LibraryService<MemoryStore>,
        accounts: AccountService<MemoryStore>,
    }

    fn fixture(access: AccessConfig) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        Fixture {
            library: LibraryService::new(store.clone(), LibraryConfig::default(), access),
            accounts: AccountService::new(store),
        }
    }

    fn pdf(id: &str, owner: &AccountId, created_at: u64) -> Resource {
        let mut r = Resource::with_id(ContentId::new(id), format!("{}.pdf", id), 1024, owner.clone(), created_at);
        r.title = format!("Title {}", id);
        r.subject = "Physics".to_string();
        r
    }

    #[test]
    fn test_upload_credits_owner() {
        let f = fixture(AccessConfig::default());
        let owner = f.accounts.create_account("uploader", "up@test.com").unwrap();

        let mut resource = Resource::new("test.pdf", 1024 * 1024, owner.id.clone());
        resource.title = "Test Document".to_string();
        let uploaded = f.library.upload(resource).unwrap();

        let stored = f.library.get_resource(&uploaded.id).unwrap();
        assert_eq!(stored.title, "Test Document");
        assert_eq!(f.accounts.get_account(&owner.id).unwrap().uploads, 1);
        assert_eq!(f.library.library_of(&owner.id).unwrap().len(), 1);
    }

    #[test]
    fn test_upload_validation() {
        let f = fixture(AccessConfig::default());
        let owner = AccountId::new("o");

        let empty = Resource::with_id(ContentId::new("a"), "", 10, owner.clone(), 0);
        assert!(matches!(f.library.upload(empty), Err(Error::Validation { field: "filename", .. })));

        let zero = Resource::with_id(ContentId::new("b"), "a.pdf", 0, owner.clone(), 0);
        assert!(matches!(f.library.upload(zero), Err(Error::Validation { field: "size", .. })));

        let huge = Resource::with_id(ContentId::new("c"), "a.pdf", (100 << 20) + 1, owner.clone(), 0);
        assert!(matches!(f.library.upload(huge), Err(Error::FileTooLarge { .. })));

        let exe = Resource::with_id(ContentId::new("d"), "a.exe", 10, owner, 0);
        assert_eq!(f.library.upload(exe), Err(Error::InvalidFileType(".exe".to_string())));
    }

    #[test]
    fn test_upload_survives_unknown_owner() {
        let f = fixture(AccessConfig::default());
        let resource = pdf("r1", &AccountId::new("nobody"), 1);
        assert!(f.library.upload(resource).is_ok());
    }

    #[test]
    fn test_download_counts() {
        let f = fixture(AccessConfig::default());
        let uploader = f.accounts.create_account("uploader", "up@test.com").unwrap();
        let downloader = f.accounts.create_account("downloader", "down@test.com").unwrap();
        let resource = f.library.upload(pdf("r1", &uploader.id, 1)).unwrap();

        let downloaded = f.library.download(&resource.id, &downloader.id).unwrap();
        assert_eq!(downloaded.download_count, 1);
        assert_eq!(f.library.get_resource(&resource.id).unwrap().download_count, 1);
        assert_eq!(f.accounts.get_account(&downloader.id).unwrap().downloads, 1);

        let missing = f.library.download(&ContentId::new("nope"), &downloader.id);
        assert!(missing.unwrap_err().is_not_found());
    }

    #[test]
    fn test_download_gate() {
        let f = fixture(AccessConfig {
            download_min_score: Some(0),
        });
        let uploader = f.accounts.create_account("uploader", "up@test.com").unwrap();
        let leech = f.accounts.create_account("leech", "l@test.com").unwrap();
        let resource = f.library.upload(pdf("r1", &uploader.id, 1)).unwrap();

        // Score 0 passes a threshold of 0
        f.library.download(&resource.id, &leech.id).unwrap();

        // Now at -1
        let err = f.library.download(&resource.id, &leech.id).unwrap_err();
        assert!(err.is_insufficient_reputation());
        assert_eq!(f.library.get_resource(&resource.id).unwrap().download_count, 1);
    }

    #[test]
    fn test_rate_updates_resource_and_owner() {
        let f = fixture(AccessConfig::default());
        let owner = f.accounts.create_account("owner", "o@test.com").unwrap();
        let rater = f.accounts.create_account("rater", "r@test.com").unwrap();
        let other = f.accounts.create_account("other", "x@test.com").unwrap();
        let resource = f.library.upload(pdf("r1", &owner.id, 1)).unwrap();

        f.library.rate(&resource.id, &rater.id, 4.0, "solid").unwrap();
        let rated = f.library.rate(&resource.id, &other.id, 5.0, "").unwrap();
        assert_eq!(rated.total_ratings, 2);
        assert!((rated.average_rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(f.library.ratings_for(&resource.id).unwrap().len(), 2);

        let owner = f.accounts.get_account(&owner.id).unwrap();
        // 1 upload + trunc(4.5 * 10)
        assert_eq!(owner.score, 47);
        assert_eq!(owner.tier, Tier::Neutral);

        let again = f.library.rate(&resource.id, &rater.id, 3.0, "");
        assert!(matches!(again, Err(Error::AlreadyExists { kind: "rating", .. })));
        assert_eq!(f.library.get_resource(&resource.id).unwrap().total_ratings, 2);

        assert_eq!(
            f.library.rate(&resource.id, &rater.id, 6.0, ""),
            Err(Error::InvalidRating(6.0))
        );
    }

    #[test]
    fn test_catalogue_views() {
        let f = fixture(AccessConfig::default());
        let owner = f.accounts.create_account("owner", "o@test.com").unwrap();
        let reader = f.accounts.create_account("reader", "r@test.com").unwrap();

        let mut first = pdf("r1", &owner.id, 100);
        first.subject = "Mathematics".to_string();
        f.library.upload(first).unwrap();
        f.library.upload(pdf("r2", &owner.id, 300)).unwrap();
        f.library.upload(pdf("r3", &owner.id, 200)).unwrap();

        for _ in 0..3 {
            f.library.download(&ContentId::new("r3"), &reader.id).unwrap();
        }
        f.library.download(&ContentId::new("r1"), &reader.id).unwrap();
        f.library.rate(&ContentId::new("r1"), &reader.id, 2.0, "").unwrap();
        f.library.rate(&ContentId::new("r2"), &reader.id, 5.0, "").unwrap();

        let ids = |resources: Vec<Resource>| -> Vec<String> {
            resources.into_iter().map(|r| r.id.to_string()).collect()
        };

        assert_eq!(ids(f.library.popular(2).unwrap()), vec!["r3", "r1"]);
        assert_eq!(ids(f.library.recent(10).unwrap()), vec!["r2", "r3", "r1"]);
        assert_eq!(ids(f.library.top_rated(10).unwrap()), vec!["r2", "r1"]);

        let stats = f.library.statistics().unwrap();
        assert_eq!(stats.total_resources, 3);
        assert_eq!(stats.total_downloads, 4);
        assert_eq!(stats.total_ratings, 2);
        assert_eq!(stats.by_subject.get("Physics"), Some(&2));
        assert_eq!(stats.by_subject.get("Mathematics"), Some(&1));
        assert_eq!(stats.by_type.get(&ResourceType::Pdf), Some(&3));
    }
}
