//! # Repository Traits
//!
//! Backend-neutral interfaces for the catalog. Each call is expected to be
//! atomic: a create/update/delete either fully applies or not at all.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Author, AuthorDraft, AuthorId, AuthorPatch, AuthorWithBooks, Book, BookDraft, BookId,
    BookPatch, BookWithAuthor, PageRequest,
};

// =============================================================================
// AUTHOR REPOSITORY
// =============================================================================

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Get author by ID
    async fn find_author(&self, id: AuthorId) -> Result<Option<Author>>;

    /// Get author by ID along with its books
    async fn find_author_with_books(&self, id: AuthorId) -> Result<Option<AuthorWithBooks>>;

    /// Get one page of authors ordered by id; out-of-range pages are empty
    async fn find_authors_page(&self, page: PageRequest) -> Result<Vec<AuthorWithBooks>>;

    /// Create an author and attach the given books to it.
    /// Ids that no longer exist are skipped.
    async fn create_author(&self, draft: AuthorDraft, books: &[BookId])
        -> Result<AuthorWithBooks>;

    /// Apply `patch` and attach `books` on top of the books already owned
    async fn update_author(
        &self,
        id: AuthorId,
        patch: AuthorPatch,
        books: &[BookId],
    ) -> Result<AuthorWithBooks>;

    /// Delete an author; its books are kept and detached
    async fn delete_author(&self, id: AuthorId) -> Result<()>;
}

// =============================================================================
// BOOK REPOSITORY
// =============================================================================

#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Get book by ID
    async fn find_book(&self, id: BookId) -> Result<Option<Book>>;

    /// Get book by ID along with its author
    async fn find_book_with_author(&self, id: BookId) -> Result<Option<BookWithAuthor>>;

    /// Get one page of books ordered by id; out-of-range pages are empty
    async fn find_books_page(&self, page: PageRequest) -> Result<Vec<BookWithAuthor>>;

    /// Create a book owned by `author` (or by nobody)
    async fn create_book(&self, draft: BookDraft, author: Option<AuthorId>)
        -> Result<BookWithAuthor>;

    /// Apply `patch` and replace the book's author with `author`
    async fn update_book(
        &self,
        id: BookId,
        patch: BookPatch,
        author: Option<AuthorId>,
    ) -> Result<BookWithAuthor>;

    /// Delete a book
    async fn delete_book(&self, id: BookId) -> Result<()>;
}

/// Both repositories behind one handle.
pub trait CatalogStore: AuthorRepository + BookRepository {}

impl<T> CatalogStore for T where T: AuthorRepository + BookRepository {}
