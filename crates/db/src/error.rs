//! Persistence error types

use thiserror::Error;

/// Errors reported by catalog repositories
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
}

impl StorageError {
    pub fn author_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "author",
            id,
        }
    }

    pub fn book_not_found(id: i64) -> Self {
        Self::NotFound { entity: "book", id }
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
