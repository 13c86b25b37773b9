//! Core data types for Stacks

use crate::error::{Error, Result};
use crate::reputation::{self, Tier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest accepted upload: 100 MiB
pub const MAX_FILE_SIZE: u64 = 100 << 20;
/// Lowest valid star rating
pub const MIN_RATING: f64 = 1.0;
/// Highest valid star rating
pub const MAX_RATING: f64 = 5.0;

/// File extensions accepted for upload
pub const ALLOWED_FILE_TYPES: &[&str] = &[".pdf", ".doc", ".docx", ".pptx", ".xlsx", ".txt", ".md"];

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of an account
    AccountId
);
string_id!(
    /// Content identifier of a shared resource
    ContentId
);
string_id!(
    /// Identifier of a (simulated) peer
    PeerId
);

/// Category of an academic resource, inferred from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Pdf,
    Document,
    Presentation,
    Spreadsheet,
    Other,
}

impl ResourceType {
    /// Map a lowercase extension (with leading dot) to a type
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            ".pdf" => ResourceType::Pdf,
            ".doc" | ".docx" => ResourceType::Document,
            ".ppt" | ".pptx" => ResourceType::Presentation,
            ".xls" | ".xlsx" => ResourceType::Spreadsheet,
            _ => ResourceType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Pdf => "pdf",
            ResourceType::Document => "document",
            ResourceType::Presentation => "presentation",
            ResourceType::Spreadsheet => "spreadsheet",
            ResourceType::Other => "other",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ResourceType::Pdf),
            "document" => Ok(ResourceType::Document),
            "presentation" => Ok(ResourceType::Presentation),
            "spreadsheet" => Ok(ResourceType::Spreadsheet),
            "other" => Ok(ResourceType::Other),
            other => Err(Error::validation("type", format!("unknown resource type '{}'", other))),
        }
    }
}

/// A participant in the library network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    /// Resources uploaded
    pub uploads: u64,
    /// Resources downloaded
    pub downloads: u64,
    /// Mean of the ratings received, in [0, 5]
    pub average_rating: f64,
    /// Number of ratings folded into `average_rating`
    pub ratings_received: u64,
    /// Derived from the counters, see [`Account::refresh`]
    pub score: i64,
    /// Always `classify(score)`
    pub tier: Tier,
    /// Unix timestamp of creation
    pub created_at: u64,
    /// Unix timestamp of the last recorded activity
    pub last_active_at: u64,
}

impl Account {
    /// Create an account with zeroed counters
    pub fn new(id: AccountId, username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = unix_now();
        Self {
            id,
            username: username.into(),
            email: email.into(),
            uploads: 0,
            downloads: 0,
            average_rating: 0.0,
            ratings_received: 0,
            score: 0,
            tier: Tier::Neutral,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Recompute score and tier from the counters. Must follow every
    /// counter mutation before the account is written back.
    pub fn refresh(&mut self) {
        self.score = reputation::score(self.uploads, self.downloads, self.average_rating);
        self.tier = reputation::classify(self.score);
    }

    pub fn record_upload(&mut self) {
        self.uploads += 1;
        self.touch();
        self.refresh();
    }

    pub fn record_download(&mut self) {
        self.downloads += 1;
        self.touch();
        self.refresh();
    }

    /// Fold a received rating into the running mean
    pub fn record_rating(&mut self, rating: f64) {
        let sum = self.average_rating * self.ratings_received as f64 + rating;
        self.ratings_received += 1;
        self.average_rating = (sum / self.ratings_received as f64).clamp(0.0, MAX_RATING);
        self.touch();
        self.refresh();
    }

    pub fn is_contributor(&self) -> bool {
        self.tier == Tier::Contributor
    }

    pub fn is_leecher(&self) -> bool {
        self.tier == Tier::Leecher
    }

    pub fn throttle_multiplier(&self) -> f64 {
        reputation::throttle_multiplier(self.tier)
    }

    fn touch(&mut self) {
        self.last_active_at = unix_now();
    }
}

/// An academic file shared in the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ContentId,
    pub filename: String,
    /// Lowercase extension including the dot, e.g. ".pdf"
    pub extension: String,
    /// File size in bytes
    pub size: u64,
    pub resource_type: ResourceType,
    pub title: String,
    pub description: String,
    pub subject: String,
    /// Free-form tags, no duplicates
    pub tags: Vec<String>,
    /// Uploading account
    pub owner: AccountId,
    /// Peers holding a copy, no duplicates
    pub available_on: Vec<PeerId>,
    pub download_count: u64,
    pub total_ratings: u64,
    pub rating_sum: f64,
    /// `rating_sum / total_ratings`, or 0 before the first rating
    pub average_rating: f64,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Resource {
    /// Create a resource with a content id derived from the filename and
    /// the current time.
    pub fn new(filename: impl Into<String>, size: u64, owner: AccountId) -> Self {
        let filename = filename.into();
        let now = unix_now();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let id = content_id_for(&filename, nanos);
        Self::with_id(id, filename, size, owner, now)
    }

    /// Create a resource with an explicit id and creation time
    pub fn with_id(
        id: ContentId,
        filename: impl Into<String>,
        size: u64,
        owner: AccountId,
        created_at: u64,
    ) -> Self {
        let filename = filename.into();
        let extension = extension_of(&filename);
        Self {
            id,
            resource_type: ResourceType::from_extension(&extension),
            extension,
            filename,
            size,
            title: String::new(),
            description: String::new(),
            subject: String::new(),
            tags: Vec::new(),
            owner,
            available_on: Vec::new(),
            download_count: 0,
            total_ratings: 0,
            rating_sum: 0.0,
            average_rating: 0.0,
            created_at,
            updated_at: created_at,
        }
    }

    /// Add a tag unless it is already present
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    /// Case-insensitive tag lookup
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| eq_ignore_case(t, tag))
    }

    /// Add a peer unless it is already listed
    pub fn add_peer(&mut self, peer: PeerId) {
        if !self.available_on.contains(&peer) {
            self.available_on.push(peer);
        }
    }

    pub fn remove_peer(&mut self, peer: &PeerId) {
        self.available_on.retain(|p| p != peer);
    }

    pub fn peer_count(&self) -> usize {
        self.available_on.len()
    }

    /// Fold a star rating into the running mean
    pub fn add_rating(&mut self, rating: f64) -> Result<()> {
        if !is_valid_rating(rating) {
            return Err(Error::InvalidRating(rating));
        }
        self.total_ratings += 1;
        self.rating_sum += rating;
        self.average_rating = self.rating_sum / self.total_ratings as f64;
        self.updated_at = unix_now();
        Ok(())
    }

    pub fn record_download(&mut self) {
        self.download_count += 1;
    }
}

/// A single account's rating of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRating {
    /// `<resource id>-<account id>`: one rating per account per resource
    pub id: String,
    pub resource_id: ContentId,
    pub account_id: AccountId,
    pub rating: f64,
    pub comment: String,
    pub created_at: u64,
}

impl ResourceRating {
    pub fn new(
        resource_id: ContentId,
        account_id: AccountId,
        rating: f64,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: rating_id(&resource_id, &account_id),
            resource_id,
            account_id,
            rating,
            comment: comment.into(),
            created_at: unix_now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_rating(self.rating)
    }
}

/// A resource matched by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub resource: Resource,
    /// Number of peers holding the resource
    pub available_peers: usize,
    /// Relevance score (higher is better)
    pub relevance: f64,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// Matches after filtering, before pagination
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Whether a rating lies in [MIN_RATING, MAX_RATING]
pub fn is_valid_rating(rating: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Case-insensitive equality over full Unicode lowercase mapping
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Lowercase extension of a filename, including the dot
pub fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Derive a content id from a filename and a nonce
pub fn content_id_for(filename: &str, nonce: u128) -> ContentId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(filename.as_bytes());
    hasher.update(&nonce.to_le_bytes());
    let hash = hasher.finalize();
    ContentId(hex::encode(&hash.as_bytes()[..16]))
}

/// Generate a random account id
pub fn generate_account_id() -> AccountId {
    let mut bytes = [0u8; 16];
    // Fall back to a time-derived id if the OS RNG is unavailable
    if getrandom::getrandom(&mut bytes).is_err() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        bytes.copy_from_slice(&blake3::hash(&nanos.to_le_bytes()).as_bytes()[..16]);
    }
    AccountId(hex::encode(bytes))
}

pub fn rating_id(resource_id: &ContentId, account_id: &AccountId) -> String {
    format!("{}-{}", resource_id, account_id)
}

/// Current Unix time in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_is_neutral() {
        let account = Account::new(AccountId::new("a1"), "alice", "alice@uni.edu");
        assert_eq!(account.score, 0);
        assert_eq!(account.tier, Tier::Neutral);
        assert_eq!(account.uploads, 0);
        assert_eq!(account.throttle_multiplier(), 0.7);
    }

    #[test]
    fn test_account_mutations_keep_tier_in_sync() {
        let mut account = Account::new(AccountId::new("a1"), "alice", "alice@uni.edu");
        for _ in 0..26 {
            account.record_upload();
        }
        assert_eq!(account.score, 52);
        assert!(account.is_contributor());

        for _ in 0..60 {
            account.record_download();
        }
        assert_eq!(account.score, -8);
        assert!(account.is_leecher());
        assert_eq!(account.tier, reputation::classify(account.score));
    }

    #[test]
    fn test_account_rating_running_mean() {
        let mut account = Account::new(AccountId::new("a1"), "alice", "alice@uni.edu");
        account.record_rating(4.0);
        account.record_rating(5.0);
        assert_eq!(account.ratings_received, 2);
        assert!((account.average_rating - 4.5).abs() < f64::EPSILON);
        assert_eq!(account.score, 45);
    }

    #[test]
    fn test_resource_type_from_filename() {
        let owner = AccountId::new("owner");
        assert_eq!(Resource::new("notes.PDF", 10, owner.clone()).resource_type, ResourceType::Pdf);
        assert_eq!(Resource::new("essay.docx", 10, owner.clone()).resource_type, ResourceType::Document);
        assert_eq!(Resource::new("deck.pptx", 10, owner.clone()).resource_type, ResourceType::Presentation);
        assert_eq!(Resource::new("grades.xls", 10, owner.clone()).resource_type, ResourceType::Spreadsheet);
        assert_eq!(Resource::new("README", 10, owner).resource_type, ResourceType::Other);
    }

    #[test]
    fn test_tags_and_peers_are_idempotent() {
        let mut resource = Resource::new("a.pdf", 10, AccountId::new("owner"));
        resource.add_tag("math");
        resource.add_tag("math");
        resource.add_tag("calculus");
        assert_eq!(resource.tags, vec!["math", "calculus"]);
        assert!(resource.has_tag("MATH"));

        resource.remove_tag("math");
        assert!(!resource.has_tag("math"));

        resource.add_peer(PeerId::new("p1"));
        resource.add_peer(PeerId::new("p1"));
        assert_eq!(resource.peer_count(), 1);
        resource.remove_peer(&PeerId::new("p1"));
        assert_eq!(resource.peer_count(), 0);
    }

    #[test]
    fn test_case_folding_covers_non_ascii() {
        assert!(eq_ignore_case("Économie", "économie"));
        assert!(eq_ignore_case("ΣΟΦΙΑ", "σοφια"));
        assert!(!eq_ignore_case("Économie", "economie"));

        let mut resource = Resource::new("a.pdf", 10, AccountId::new("owner"));
        resource.add_tag("Éco");
        assert!(resource.has_tag("éco"));
        assert!(resource.has_tag("ÉCO"));
    }

    #[test]
    fn test_resource_rating_mean() {
        let mut resource = Resource::new("a.pdf", 10, AccountId::new("owner"));
        assert_eq!(resource.average_rating, 0.0);
        resource.add_rating(4.0).unwrap();
        resource.add_rating(4.5).unwrap();
        assert_eq!(resource.total_ratings, 2);
        assert!((resource.average_rating - 4.25).abs() < f64::EPSILON);

        assert_eq!(resource.add_rating(0.5), Err(Error::InvalidRating(0.5)));
        assert_eq!(resource.add_rating(5.5), Err(Error::InvalidRating(5.5)));
        assert_eq!(resource.total_ratings, 2);
    }

    #[test]
    fn test_content_id_is_hex() {
        let id = content_id_for("notes.pdf", 42);
        assert_eq!(id.as_str().len(), 32);
        assert_eq!(id, content_id_for("notes.pdf", 42));
        assert_ne!(id, content_id_for("notes.pdf", 43));
    }

    #[test]
    fn test_generated_account_ids_differ() {
        assert_ne!(generate_account_id(), generate_account_id());
    }
}
