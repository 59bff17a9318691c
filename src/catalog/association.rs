//! Resolution of related-entity ids supplied with author and book writes.
//!
//! Ids that do not resolve are skipped rather than failing the request; a
//! missing id field behaves like the sentinel id, which never resolves.

use bookshelf_db::{AuthorId, AuthorRepository, BookId, BookRepository, CatalogStore, StorageError};
use serde::Deserialize;

/// Placeholder id used when a request omits the related id field.
pub const SENTINEL_ID: i64 = -1;

/// `idBook` as sent by clients: a single id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IdSelection {
    One(i64),
    Many(Vec<i64>),
}

impl IdSelection {
    pub fn ids(&self) -> Vec<i64> {
        match self {
            IdSelection::One(id) => vec![*id],
            IdSelection::Many(ids) => ids.clone(),
        }
    }
}

/// Ids to resolve for a possibly absent selection.
pub fn requested_ids(selection: Option<&IdSelection>) -> Vec<i64> {
    selection
        .map(IdSelection::ids)
        .unwrap_or_else(|| vec![SENTINEL_ID])
}

/// Resolve each requested id independently, keeping the ones that exist.
/// Order is preserved and duplicates are collapsed.
pub async fn resolve_books(
    store: &dyn CatalogStore,
    selection: Option<&IdSelection>,
) -> Result<Vec<BookId>, StorageError> {
    let mut resolved = Vec::new();
    for id in requested_ids(selection) {
        match store.find_book(id).await? {
            Some(book) if !resolved.contains(&book.id) => resolved.push(book.id),
            Some(_) => {}
            None => tracing::debug!(book_id = id, "book id did not resolve; skipped"),
        }
    }
    Ok(resolved)
}

/// Resolve the author of a book write; an absent or unknown id yields no author.
pub async fn resolve_author(
    store: &dyn CatalogStore,
    id: Option<i64>,
) -> Result<Option<AuthorId>, StorageError> {
    let id = id.unwrap_or(SENTINEL_ID);
    let author = store.find_author(id).await?;
    if author.is_none() {
        tracing::debug!(author_id = id, "author id did not resolve; book left without author");
    }
    Ok(author.map(|author| author.id))
}
