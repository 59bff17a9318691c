//! In-memory catalog backend.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, StorageError};
use crate::models::{
    Author, AuthorDraft, AuthorId, AuthorPatch, AuthorWithBooks, Book, BookDraft, BookId,
    BookPatch, BookWithAuthor, PageRequest,
};
use crate::repository::{AuthorRepository, BookRepository};

/// Catalog store keeping both tables behind a single lock.
///
/// Ids are assigned sequentially starting at 1 and never reused, so negative
/// sentinel ids never resolve.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    authors: BTreeMap<AuthorId, Author>,
    books: BTreeMap<BookId, Book>,
    last_author_id: AuthorId,
    last_book_id: BookId,
}

impl Tables {
    fn books_of(&self, author_id: AuthorId) -> Vec<Book> {
        self.books
            .values()
            .filter(|book| book.author_id == Some(author_id))
            .cloned()
            .collect()
    }

    fn author_with_books(&self, author: &Author) -> AuthorWithBooks {
        AuthorWithBooks {
            author: author.clone(),
            books: self.books_of(author.id),
        }
    }

    fn book_with_author(&self, book: &Book) -> BookWithAuthor {
        BookWithAuthor {
            book: book.clone(),
            author: book
                .author_id
                .and_then(|id| self.authors.get(&id))
                .cloned(),
        }
    }

    fn attach_books(&mut self, author_id: AuthorId, books: &[BookId]) {
        for id in books {
            match self.books.get_mut(id) {
                Some(book) => book.author_id = Some(author_id),
                None => tracing::debug!(book_id = id, author_id, "skipping unknown book"),
            }
        }
    }

    /// Author ids that do not exist resolve to no author.
    fn existing_author(&self, author: Option<AuthorId>) -> Option<AuthorId> {
        author.filter(|id| self.authors.contains_key(id))
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorRepository for MemoryStore {
    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn find_author_with_books(&self, id: AuthorId) -> Result<Option<AuthorWithBooks>> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .get(&id)
            .map(|author| tables.author_with_books(author)))
    }

    async fn find_authors_page(&self, page: PageRequest) -> Result<Vec<AuthorWithBooks>> {
        let tables = self.tables.read().await;
        Ok(tables
            .authors
            .values()
            .skip(page.offset())
            .take(page.limit())
            .map(|author| tables.author_with_books(author))
            .collect())
    }

    async fn create_author(
        &self,
        draft: AuthorDraft,
        books: &[BookId],
    ) -> Result<AuthorWithBooks> {
        let mut tables = self.tables.write().await;
        tables.last_author_id += 1;
        let author = Author {
            id: tables.last_author_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
        };
        tables.authors.insert(author.id, author.clone());
        tables.attach_books(author.id, books);

        tracing::debug!(author_id = author.id, "author created");
        Ok(tables.author_with_books(&author))
    }

    async fn update_author(
        &self,
        id: AuthorId,
        patch: AuthorPatch,
        books: &[BookId],
    ) -> Result<AuthorWithBooks> {
        let mut tables = self.tables.write().await;
        let author = tables
            .authors
            .get_mut(&id)
            .ok_or_else(|| StorageError::author_not_found(id))?;

        if let Some(first_name) = patch.first_name {
            author.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            author.last_name = last_name;
        }
        let author = author.clone();
        tables.attach_books(id, books);

        tracing::debug!(author_id = id, "author updated");
        Ok(tables.author_with_books(&author))
    }

    async fn delete_author(&self, id: AuthorId) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .authors
            .remove(&id)
            .ok_or_else(|| StorageError::author_not_found(id))?;

        let mut detached = 0usize;
        for book in tables.books.values_mut() {
            if book.author_id == Some(id) {
                book.author_id = None;
                detached += 1;
            }
        }

        tracing::debug!(author_id = id, detached, "author deleted");
        Ok(())
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn find_book(&self, id: BookId) -> Result<Option<Book>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn find_book_with_author(&self, id: BookId) -> Result<Option<BookWithAuthor>> {
        let tables = self.tables.read().await;
        Ok(tables.books.get(&id).map(|book| tables.book_with_author(book)))
    }

    async fn find_books_page(&self, page: PageRequest) -> Result<Vec<BookWithAuthor>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .skip(page.offset())
            .take(page.limit())
            .map(|book| tables.book_with_author(book))
            .collect())
    }

    async fn create_book(
        &self,
        draft: BookDraft,
        author: Option<AuthorId>,
    ) -> Result<BookWithAuthor> {
        let mut tables = self.tables.write().await;
        tables.last_book_id += 1;
        let book = Book {
            id: tables.last_book_id,
            title: draft.title,
            cover_text: draft.cover_text,
            author_id: tables.existing_author(author),
        };
        tables.books.insert(book.id, book.clone());

        tracing::debug!(book_id = book.id, author_id = ?book.author_id, "book created");
        Ok(tables.book_with_author(&book))
    }

    async fn update_book(
        &self,
        id: BookId,
        patch: BookPatch,
        author: Option<AuthorId>,
    ) -> Result<BookWithAuthor> {
        let mut tables = self.tables.write().await;
        let author_id = tables.existing_author(author);
        let book = tables
            .books
            .get_mut(&id)
            .ok_or_else(|| StorageError::book_not_found(id))?;

        if let Some(title) = patch.title {
            book.title = title;
        }
        if let Some(cover_text) = patch.cover_text {
            book.cover_text = Some(cover_text);
        }
        book.author_id = author_id;
        let book = book.clone();

        tracing::debug!(book_id = id, author_id = ?book.author_id, "book updated");
        Ok(tables.book_with_author(&book))
    }

    async fn delete_book(&self, id: BookId) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .books
            .remove(&id)
            .ok_or_else(|| StorageError::book_not_found(id))?;

        tracing::debug!(book_id = id, "book deleted");
        Ok(())
    }
}
