//! Book operations behind the HTTP handlers.

use bookshelf_cache::{CacheStatus, Payload};
use bookshelf_db::{BookId, BookRepository, PageRequest, StorageError};

use super::models::{BookInput, BookView};
use crate::catalog::association::resolve_author;
use crate::catalog::{Catalog, CatalogError};

/// Cached page of books.
pub async fn list(
    catalog: &Catalog,
    page: PageRequest,
) -> Result<(Payload, CacheStatus), CatalogError> {
    let store = catalog.store();
    catalog
        .books_list()
        .fetch_page(catalog.cache(), page, |page| async move {
            let records = store.find_books_page(page).await?;
            Ok::<_, CatalogError>(records.into_iter().map(BookView::from).collect::<Vec<_>>())
        })
        .await
}

pub async fn get(catalog: &Catalog, id: BookId) -> Result<BookView, CatalogError> {
    catalog
        .store()
        .find_book_with_author(id)
        .await?
        .map(BookView::from)
        .ok_or_else(|| StorageError::book_not_found(id).into())
}

/// Validate, resolve `idAuthor`, persist, then drop cached lists.
pub async fn create(catalog: &Catalog, input: BookInput) -> Result<BookView, CatalogError> {
    let (draft, author_id) = input.into_draft()?;
    let author = resolve_author(catalog.store(), author_id).await?;
    let created = catalog.store().create_book(draft, author).await?;
    catalog.invalidate_lists();

    tracing::info!(book_id = created.book.id, author_id = ?author, "book created");
    Ok(created.into())
}

/// Apply a partial update. The resolved author replaces the current one; an
/// absent or unknown `idAuthor` leaves the book without an author.
pub async fn update(
    catalog: &Catalog,
    id: BookId,
    input: BookInput,
) -> Result<BookView, CatalogError> {
    let (patch, author_id) = input.into_patch()?;
    let author = resolve_author(catalog.store(), author_id).await?;
    let updated = catalog.store().update_book(id, patch, author).await?;
    catalog.invalidate_lists();

    tracing::info!(book_id = id, author_id = ?author, "book updated");
    Ok(updated.into())
}

pub async fn delete(catalog: &Catalog, id: BookId) -> Result<(), CatalogError> {
    catalog.store().delete_book(id).await?;
    catalog.invalidate_lists();

    tracing::info!(book_id = id, "book deleted");
    Ok(())
}
