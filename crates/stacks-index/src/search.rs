//! Search index over the shared resource catalogue
//!
//! A query runs in four passes: relevance scoring, structured filtering,
//! sorting, and pagination. The reported total counts every filtered match,
//! not just the returned page.

use serde::{Deserialize, Serialize};
use stacks_core::{
    eq_ignore_case, Resource, ResourceStore, ResourceType, Result, SearchResult, SearchResults,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

/// Page size used when a query does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Maximum number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 10;

const TITLE_WEIGHT: f64 = 3.0;
const FILENAME_WEIGHT: f64 = 2.0;
const SUBJECT_WEIGHT: f64 = 1.5;

/// Field results are ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    Rating,
    Downloads,
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    /// Anything other than `rating` or `downloads` sorts by relevance
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "rating" => SortKey::Rating,
            "downloads" => SortKey::Downloads,
            _ => SortKey::Relevance,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Only `desc` reverses the order
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        })
    }
}

/// Structured search options. Every filter is optional and empty values
/// mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Exact, case-insensitive subject
    pub subject: Option<String>,
    pub resource_type: Option<ResourceType>,
    /// Applied only when greater than zero
    pub min_rating: f64,
    /// Every listed tag must be present (case-insensitive)
    pub tags: Vec<String>,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    /// 1-indexed; 0 is treated as 1
    pub page: usize,
    /// 0 selects the index's default page size
    pub page_size: usize,
}

/// Search index backed by a resource store
pub struct SearchIndex<S> {
    store: Arc<S>,
    default_page_size: usize,
    max_suggestions: usize,
}

impl<S: ResourceStore> SearchIndex<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }

    /// Override the page size used when a query leaves it unset
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Search for resources matching a free-text query and filters
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Result<SearchResults> {
        let query = query.trim().to_lowercase();
        let catalogue = self.catalogue()?;

        let mut results: Vec<SearchResult> = catalogue
            .into_iter()
            .filter_map(|resource| {
                let relevance = relevance(&resource, &query);
                if !query.is_empty() && relevance == 0.0 {
                    return None;
                }
                if !matches_filters(&resource, filters) {
                    return None;
                }
                Some(SearchResult {
                    available_peers: resource.peer_count(),
                    resource,
                    relevance,
                })
            })
            .collect();

        sort_results(&mut results, filters.sort_by, filters.sort_order);

        let total_count = results.len();
        let page = filters.page.max(1);
        let page_size = if filters.page_size == 0 {
            self.default_page_size
        } else {
            filters.page_size
        };
        let results = paginate(results, page, page_size);

        tracing::debug!(
            "Query '{}': {} matches, returning {} (page {}, size {})",
            query,
            total_count,
            results.len(),
            page,
            page_size
        );

        Ok(SearchResults {
            query,
            results,
            total_count,
            page,
            page_size,
        })
    }

    /// Resources whose subject equals `subject`, ignoring case
    pub fn search_by_subject(&self, subject: &str) -> Result<Vec<Resource>> {
        Ok(self
            .catalogue()?
            .into_iter()
            .filter(|r| eq_ignore_case(&r.subject, subject))
            .collect())
    }

    /// Resources carrying `tag`, ignoring case
    pub fn search_by_tag(&self, tag: &str) -> Result<Vec<Resource>> {
        Ok(self
            .catalogue()?
            .into_iter()
            .filter(|r| r.has_tag(tag))
            .collect())
    }

    /// Distinct titles and subjects containing `partial`, sorted and capped
    pub fn suggestions(&self, partial: &str) -> Result<Vec<String>> {
        let partial = partial.to_lowercase();
        let mut seen = BTreeSet::new();

        for resource in self.store.list_resources()? {
            if resource.title.to_lowercase().contains(&partial) {
                seen.insert(resource.title.clone());
            }
            if resource.subject.to_lowercase().contains(&partial) {
                seen.insert(resource.subject);
            }
        }

        Ok(seen.into_iter().take(self.max_suggestions).collect())
    }

    /// The full collection in a stable order; the store's own order is
    /// unspecified.
    fn catalogue(&self) -> Result<Vec<Resource>> {
        let mut resources = self.store.list_resources()?;
        resources.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(resources)
    }
}

/// Weighted substring hits of a lowercase query. An empty query matches
/// everything with relevance 1.
pub fn relevance(resource: &Resource, query: &str) -> f64 {
    if query.is_empty() {
        return 1.0;
    }

    let mut score = 0.0;
    if resource.title.to_lowercase().contains(query) {
        score += TITLE_WEIGHT;
    }
    if resource.filename.to_lowercase().contains(query) {
        score += FILENAME_WEIGHT;
    }
    if resource.subject.to_lowercase().contains(query) {
        score += SUBJECT_WEIGHT;
    }
    score
}

/// Whether a resource passes every supplied filter
pub fn matches_filters(resource: &Resource, filters: &SearchFilters) -> bool {
    if let Some(subject) = filters.subject.as_deref().filter(|s| !s.is_empty()) {
        if !eq_ignore_case(&resource.subject, subject) {
            return false;
        }
    }
    if let Some(resource_type) = filters.resource_type {
        if resource.resource_type != resource_type {
            return false;
        }
    }
    if filters.min_rating > 0.0 && resource.average_rating < filters.min_rating {
        return false;
    }
    filters
        .tags
        .iter()
        .filter(|t| !t.is_empty())
        .all(|t| resource.has_tag(t))
}

/// Stable sort; ties keep their incoming order in both directions
pub fn sort_results(results: &mut [SearchResult], key: SortKey, order: SortOrder) {
    let compare = |a: &SearchResult, b: &SearchResult| -> Ordering {
        match key {
            SortKey::Rating => a
                .resource
                .average_rating
                .total_cmp(&b.resource.average_rating),
            SortKey::Downloads => a.resource.download_count.cmp(&b.resource.download_count),
            SortKey::Relevance => a.relevance.total_cmp(&b.relevance),
        }
    };

    match order {
        SortOrder::Asc => results.sort_by(compare),
        SortOrder::Desc => results.sort_by(|a, b| compare(b, a)),
    }
}

/// Slice out a 1-indexed page. Past-the-end pages are empty.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Vec<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let offset = (page - 1).saturating_mul(page_size);
    if offset >= items.len() {
        return Vec::new();
    }
    items.into_iter().skip(offset).take(page_size).collect()
}
