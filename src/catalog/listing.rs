//! Cache policy for the paginated list endpoints.
//!
//! A page is cached under `{operation}-{page}-{limit}` and tagged with the
//! list's category tag. Writes drop the whole tag, not just one page, since a
//! single new or changed record shifts every page after it.

use std::future::Future;
use std::time::Duration;

use bookshelf_cache::{CacheStatus, Payload, TagCache};
use bookshelf_db::PageRequest;
use serde::{Deserialize, Serialize};

use super::CatalogError;

pub const AUTHORS_LIST: &str = "getAllAuthors";
pub const BOOKS_LIST: &str = "getAllBooks";

/// `?page=&limit=` of a list request; missing values fall back to configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Cache key for one page of one list operation.
pub fn cache_key(operation: &str, page: PageRequest) -> String {
    format!("{operation}-{}-{}", page.page, page.limit)
}

/// How one list endpoint is cached.
#[derive(Debug, Clone)]
pub struct ListPolicy {
    operation: &'static str,
    tag: String,
    ttl: Duration,
}

impl ListPolicy {
    pub fn new(operation: &'static str, tag: &str, ttl: Duration) -> Self {
        Self {
            operation,
            tag: tag.to_string(),
            ttl,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key(&self, page: PageRequest) -> String {
        cache_key(self.operation, page)
    }

    /// Serve `page` from the cache, or load it with `fetch`, serialize it and
    /// cache the result under this list's tag.
    pub async fn fetch_page<T, F, Fut>(
        &self,
        cache: &TagCache,
        page: PageRequest,
        fetch: F,
    ) -> Result<(Payload, CacheStatus), CatalogError>
    where
        T: Serialize,
        F: FnOnce(PageRequest) -> Fut,
        Fut: Future<Output = Result<Vec<T>, CatalogError>>,
    {
        let key = self.key(page);
        let (payload, status) = cache
            .get_or_try_insert_with(&key, &[self.tag.as_str()], self.ttl, || async move {
                let records = fetch(page).await?;
                Ok::<_, CatalogError>(serde_json::to_string(&records)?)
            })
            .await?;

        tracing::debug!(
            list = self.operation,
            page = page.page,
            limit = page.limit,
            cache = status.as_str(),
            "list page served"
        );
        Ok((payload, status))
    }
}
