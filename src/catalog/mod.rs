//! Catalog core shared by the authors and books modules: the state handed to
//! every handler, the list cache policy, association resolution and input
//! validation.

pub mod association;
pub mod error;
pub mod listing;
pub mod validation;

use std::sync::Arc;

use axum::http::HeaderMap;
use bookshelf_authz::{require_role, Principal};
use bookshelf_cache::TagCache;
use bookshelf_db::{CatalogStore, DynCatalogStore, PageRequest};
use bookshelf_http::error::AppError;
use bookshelf_kernel::settings::{PaginationSettings, Settings};

pub use error::CatalogError;
use listing::{ListPolicy, ListQuery, AUTHORS_LIST, BOOKS_LIST};

/// Handles shared by every catalog request.
#[derive(Clone)]
pub struct Catalog {
    store: DynCatalogStore,
    cache: TagCache,
    authors_list: ListPolicy,
    books_list: ListPolicy,
    pagination: PaginationSettings,
    admin_role: Arc<str>,
    public_base_url: Option<Arc<str>>,
}

impl Catalog {
    pub fn new(settings: &Settings, store: DynCatalogStore, cache: TagCache) -> Self {
        let ttl = settings.cache.ttl();
        Self {
            store,
            cache,
            authors_list: ListPolicy::new(AUTHORS_LIST, &settings.cache.authors_tag, ttl),
            books_list: ListPolicy::new(BOOKS_LIST, &settings.cache.books_tag, ttl),
            pagination: settings.pagination.clone(),
            admin_role: settings.auth.admin_role.as_str().into(),
            public_base_url: settings.server.public_base_url.as_deref().map(Into::into),
        }
    }

    pub fn store(&self) -> &dyn CatalogStore {
        self.store.as_ref()
    }

    pub fn cache(&self) -> &TagCache {
        &self.cache
    }

    pub fn authors_list(&self) -> &ListPolicy {
        &self.authors_list
    }

    pub fn books_list(&self) -> &ListPolicy {
        &self.books_list
    }

    /// Every cached page of either list. Author pages embed books and book
    /// pages embed authors, so a write in one category stales both.
    pub fn invalidate_lists(&self) {
        self.cache
            .invalidate_tags(&[self.authors_list.tag(), self.books_list.tag()]);
    }

    /// Deny catalog writes to callers without the admin role.
    pub fn require_admin(&self, principal: &Principal) -> Result<(), AppError> {
        require_role(principal, &self.admin_role)
    }

    /// Apply configured defaults to the list query. Zero is rejected.
    pub fn page_request(&self, query: &ListQuery) -> Result<PageRequest, CatalogError> {
        let page = query.page.unwrap_or(self.pagination.default_page);
        let limit = query.limit.unwrap_or(self.pagination.default_limit);
        if page == 0 || limit == 0 {
            return Err(CatalogError::InvalidQuery(
                "page and limit must be at least 1".to_string(),
            ));
        }
        Ok(PageRequest::new(page, limit))
    }

    /// Absolute URL for `path`, used in `Location` headers.
    pub fn location(&self, headers: &HeaderMap, path: &str) -> String {
        crate::utils::absolute_url(self.public_base_url.as_deref(), headers, path)
    }
}
