//! Persistence gateway for the catalog.
//!
//! Handlers talk to the [`AuthorRepository`] and [`BookRepository`] traits; the
//! shipped backend is [`MemoryStore`], which keeps both tables behind one lock so
//! every call is applied atomically.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;

pub use error::{Result, StorageError};
pub use memory::MemoryStore;
pub use models::{
    Author, AuthorDraft, AuthorId, AuthorPatch, AuthorWithBooks, Book, BookDraft, BookId,
    BookPatch, BookWithAuthor, PageRequest,
};
pub use repository::{AuthorRepository, BookRepository, CatalogStore};

/// Shareable handle to the catalog store.
pub type DynCatalogStore = std::sync::Arc<dyn CatalogStore>;

/// Creates an empty in-memory catalog store.
pub fn create_memory_store() -> DynCatalogStore {
    std::sync::Arc::new(MemoryStore::new())
}
