//! A library node: one in-memory store shared by every service

use crate::accounts::AccountService;
use crate::config::Config;
use crate::library::LibraryService;
use stacks_index::{ReputationService, SearchIndex};
use stacks_store::MemoryStore;
use std::sync::Arc;

pub struct Node {
    pub store: Arc<MemoryStore>,
    pub accounts: AccountService<MemoryStore>,
    pub library: LibraryService<MemoryStore>,
    pub reputation: ReputationService<MemoryStore>,
    pub search: SearchIndex<MemoryStore>,
}

impl Node {
    /// Wire up services over a fresh, empty store
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            accounts: AccountService::new(store.clone()),
            library: LibraryService::new(
                store.clone(),
                config.library.clone(),
                config.access.clone(),
            ),
            reputation: ReputationService::new(store.clone()),
            search: SearchIndex::new(store.clone())
                .with_default_page_size(config.search.default_page_size)
                .with_max_suggestions(config.search.max_suggestions),
            store,
        }
    }
}
