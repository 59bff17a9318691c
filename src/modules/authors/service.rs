//! Author operations behind the HTTP handlers.

use bookshelf_cache::{CacheStatus, Payload};
use bookshelf_db::{AuthorId, AuthorRepository, PageRequest};

use super::models::{AuthorInput, AuthorView};
use crate::catalog::association::resolve_books;
use crate::catalog::{Catalog, CatalogError};

/// Cached page of authors.
pub async fn list(
    catalog: &Catalog,
    page: PageRequest,
) -> Result<(Payload, CacheStatus), CatalogError> {
    let store = catalog.store();
    catalog
        .authors_list()
        .fetch_page(catalog.cache(), page, |page| async move {
            let records = store.find_authors_page(page).await?;
            Ok::<_, CatalogError>(records.into_iter().map(AuthorView::from).collect::<Vec<_>>())
        })
        .await
}

pub async fn get(catalog: &Catalog, id: AuthorId) -> Result<AuthorView, CatalogError> {
    catalog
        .store()
        .find_author_with_books(id)
        .await?
        .map(AuthorView::from)
        .ok_or_else(|| bookshelf_db::StorageError::author_not_found(id).into())
}

/// Validate, resolve `idBook`, persist, then drop cached lists.
pub async fn create(catalog: &Catalog, input: AuthorInput) -> Result<AuthorView, CatalogError> {
    let (draft, selection) = input.into_draft()?;
    let books = resolve_books(catalog.store(), selection.as_ref()).await?;
    let created = catalog.store().create_author(draft, &books).await?;
    catalog.invalidate_lists();

    tracing::info!(
        author_id = created.author.id,
        books = created.books.len(),
        "author created"
    );
    Ok(created.into())
}

/// Apply a partial update. Resolved books are added to the ones the author
/// already owns.
pub async fn update(
    catalog: &Catalog,
    id: AuthorId,
    input: AuthorInput,
) -> Result<AuthorView, CatalogError> {
    let (patch, selection) = input.into_patch()?;
    let books = resolve_books(catalog.store(), selection.as_ref()).await?;
    let updated = catalog.store().update_author(id, patch, &books).await?;
    catalog.invalidate_lists();

    tracing::info!(author_id = id, attached = books.len(), "author updated");
    Ok(updated.into())
}

/// Delete an author; its books stay in the catalog without an author.
pub async fn delete(catalog: &Catalog, id: AuthorId) -> Result<(), CatalogError> {
    catalog.store().delete_author(id).await?;
    catalog.invalidate_lists();

    tracing::info!(author_id = id, "author deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_cache::TagCache;
    use bookshelf_db::{create_memory_store, BookDraft, BookRepository};
    use bookshelf_kernel::settings::Settings;

    use crate::catalog::association::IdSelection;

    fn catalog() -> Catalog {
        Catalog::new(&Settings::default(), create_memory_store(), TagCache::new())
    }

    fn input(first: &str, last: &str, books: Option<IdSelection>) -> AuthorInput {
        AuthorInput {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            id_book: books,
        }
    }

    async fn add_books(catalog: &Catalog, count: usize) {
        for i in 0..count {
            catalog
                .store()
                .create_book(
                    BookDraft {
                        title: format!("Title {i}"),
                        cover_text: None,
                    },
                    None,
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn create_attaches_existing_books_and_skips_missing_ones() {
        let catalog = catalog();
        add_books(&catalog, 8).await;

        let created = create(&catalog, input("Ada", "Lovelace", Some(IdSelection::Many(vec![3, 7, 40]))))
            .await
            .unwrap();

        let ids: Vec<i64> = created.books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[tokio::test]
    async fn invalid_author_is_not_persisted() {
        let catalog = catalog();
        let err = create(&catalog, input("", "Lovelace", None)).await.unwrap_err();
        assert!(matches!(err, CatalogError::Validation { .. }));
        assert!(catalog
            .store()
            .find_authors_page(PageRequest::new(1, 10))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn writes_invalidate_cached_pages() {
        let catalog = catalog();
        let page = PageRequest::new(1, 3);

        let (empty, status) = list(&catalog, page).await.unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(&*empty, "[]");
        assert_eq!(list(&catalog, page).await.unwrap().1, CacheStatus::Hit);

        create(&catalog, input("Ada", "Lovelace", None)).await.unwrap();

        let (refreshed, status) = list(&catalog, page).await.unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert!(refreshed.contains("Lovelace"));
    }

    #[tokio::test]
    async fn update_adds_books_and_missing_author_is_not_found() {
        let catalog = catalog();
        add_books(&catalog, 2).await;
        let created = create(&catalog, input("Ada", "Lovelace", Some(IdSelection::One(1))))
            .await
            .unwrap();

        let update_input = AuthorInput {
            id_book: Some(IdSelection::One(2)),
            ..AuthorInput::default()
        };
        let updated = update(&catalog, created.id, update_input).await.unwrap();
        assert_eq!(updated.books.len(), 2);
        assert_eq!(updated.first_name, "Ada");

        let err = update(&catalog, 99, AuthorInput::default()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
    }

    #[tokio::test]
    async fn get_and_delete_report_missing_authors() {
        let catalog = catalog();
        assert!(matches!(get(&catalog, 1).await, Err(CatalogError::Storage(_))));
        assert!(matches!(delete(&catalog, 1).await, Err(CatalogError::Storage(_))));
    }
}
