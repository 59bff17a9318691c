//! Catalog records as stored by the repositories.

/// Identifier of an [`Author`].
pub type AuthorId = i64;
/// Identifier of a [`Book`].
pub type BookId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: AuthorId,
    pub first_name: String,
    pub last_name: String,
}

/// A book. The author relation lives here only: attaching a book to an
/// author re-points `author_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub cover_text: Option<String>,
    pub author_id: Option<AuthorId>,
}

/// An author together with the books currently pointing at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorWithBooks {
    pub author: Author,
    pub books: Vec<Book>,
}

/// A book together with its resolved author, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithAuthor {
    pub book: Book,
    pub author: Option<Author>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorDraft {
    pub first_name: String,
    pub last_name: String,
}

/// Partial author update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub cover_text: Option<String>,
}

/// Partial book update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub cover_text: Option<String>,
}

/// One-based page of `limit` records, ordered by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of records preceding this page. Page 0 is treated as page 1.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    pub fn limit(&self) -> usize {
        self.limit as usize
    }
}
