use bookshelf_db::{Author, BookDraft, BookPatch, BookWithAuthor};
use serde::{Deserialize, Serialize};

use crate::catalog::validation::Validator;
use crate::catalog::CatalogError;

/// Book as returned by the API, with its author when it has one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: i64,
    pub title: String,
    pub cover_text: Option<String>,
    pub author: Option<BookAuthorView>,
}

/// Author summary nested in a [`BookView`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookAuthorView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<Author> for BookAuthorView {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
        }
    }
}

impl From<BookWithAuthor> for BookView {
    fn from(record: BookWithAuthor) -> Self {
        Self {
            id: record.book.id,
            title: record.book.title,
            cover_text: record.book.cover_text,
            author: record.author.map(Into::into),
        }
    }
}

/// Body of book create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover_text: Option<String>,
    /// Author to own the book; replaces the current one on update.
    #[serde(default)]
    pub id_author: Option<i64>,
}

impl BookInput {
    /// Validate as a create request; the title is required.
    pub fn into_draft(self) -> Result<(BookDraft, Option<i64>), CatalogError> {
        let mut validator = Validator::new();
        validator
            .required("title", self.title.as_deref())
            .optional("coverText", self.cover_text.as_deref());
        validator.finish("book")?;

        let draft = BookDraft {
            title: self.title.unwrap_or_default(),
            cover_text: self.cover_text,
        };
        Ok((draft, self.id_author))
    }

    /// Validate as an update; only the fields present are checked.
    pub fn into_patch(self) -> Result<(BookPatch, Option<i64>), CatalogError> {
        let mut validator = Validator::new();
        validator
            .optional("title", self.title.as_deref())
            .optional("coverText", self.cover_text.as_deref());
        validator.finish("book")?;

        let patch = BookPatch {
            title: self.title,
            cover_text: self.cover_text,
        };
        Ok((patch, self.id_author))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_reads_camel_case() {
        let input: BookInput =
            serde_json::from_str(r#"{"title":"T","coverText":"C","idAuthor":5}"#).unwrap();
        let (draft, author) = input.into_draft().unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.cover_text.as_deref(), Some("C"));
        assert_eq!(author, Some(5));
    }

    #[test]
    fn create_requires_a_title() {
        let input: BookInput = serde_json::from_str(r#"{"coverText":"C"}"#).unwrap();
        assert!(matches!(
            input.into_draft(),
            Err(CatalogError::Validation { subject: "book", .. })
        ));
    }

    #[test]
    fn update_checks_only_present_fields() {
        let input: BookInput = serde_json::from_str(r#"{"coverText":"New cover"}"#).unwrap();
        let (patch, author) = input.into_patch().unwrap();
        assert_eq!(patch.title, None);
        assert_eq!(author, None);

        let blank: BookInput = serde_json::from_str(r#"{"title":" "}"#).unwrap();
        assert!(blank.into_patch().is_err());
    }

    #[test]
    fn view_without_author_serializes_null() {
        let view = BookView {
            id: 2,
            title: "T".to_string(),
            cover_text: Some("C".to_string()),
            author: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["coverText"], "C");
        assert_eq!(json["author"], serde_json::Value::Null);
    }
}
