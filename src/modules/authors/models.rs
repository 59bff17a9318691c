use bookshelf_db::{AuthorDraft, AuthorPatch, AuthorWithBooks, Book};
use serde::{Deserialize, Serialize};

use crate::catalog::association::IdSelection;
use crate::catalog::validation::Validator;
use crate::catalog::CatalogError;

/// Author as returned by the API, with the books it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub books: Vec<AuthorBookView>,
}

/// Book summary nested in an [`AuthorView`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorBookView {
    pub id: i64,
    pub title: String,
    pub cover_text: Option<String>,
}

impl From<Book> for AuthorBookView {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            cover_text: book.cover_text,
        }
    }
}

impl From<AuthorWithBooks> for AuthorView {
    fn from(record: AuthorWithBooks) -> Self {
        Self {
            id: record.author.id,
            first_name: record.author.first_name,
            last_name: record.author.last_name,
            books: record.books.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body of author create and update requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorInput {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// One book id or a list of them, attached to the author.
    #[serde(default)]
    pub id_book: Option<IdSelection>,
}

impl AuthorInput {
    /// Validate as a create request; both names are required.
    pub fn into_draft(self) -> Result<(AuthorDraft, Option<IdSelection>), CatalogError> {
        let mut validator = Validator::new();
        validator
            .required("firstName", self.first_name.as_deref())
            .required("lastName", self.last_name.as_deref());
        validator.finish("author")?;

        let draft = AuthorDraft {
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
        };
        Ok((draft, self.id_book))
    }

    /// Validate as a partial update; only the fields present are checked.
    pub fn into_patch(self) -> Result<(AuthorPatch, Option<IdSelection>), CatalogError> {
        let mut validator = Validator::new();
        validator
            .optional("firstName", self.first_name.as_deref())
            .optional("lastName", self.last_name.as_deref());
        validator.finish("author")?;

        let patch = AuthorPatch {
            first_name: self.first_name,
            last_name: self.last_name,
        };
        Ok((patch, self.id_book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_reads_camel_case_and_id_selection() {
        let input: AuthorInput =
            serde_json::from_str(r#"{"firstName":"Ada","lastName":"Lovelace","idBook":[3,7]}"#)
                .unwrap();
        let (draft, books) = input.into_draft().unwrap();
        assert_eq!(draft.first_name, "Ada");
        assert_eq!(books, Some(IdSelection::Many(vec![3, 7])));
    }

    #[test]
    fn create_requires_both_names() {
        let input: AuthorInput = serde_json::from_str(r#"{"firstName":"Ada"}"#).unwrap();
        assert!(matches!(
            input.into_draft(),
            Err(CatalogError::Validation { subject: "author", ref violations }) if violations.len() == 1
        ));
    }

    #[test]
    fn update_accepts_partial_input() {
        let input: AuthorInput = serde_json::from_str(r#"{"lastName":"King"}"#).unwrap();
        let (patch, books) = input.into_patch().unwrap();
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.last_name.as_deref(), Some("King"));
        assert!(books.is_none());
    }

    #[test]
    fn view_serializes_camel_case() {
        let view = AuthorView {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            books: vec![AuthorBookView {
                id: 3,
                title: "Notes".to_string(),
                cover_text: None,
            }],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["books"][0]["coverText"], serde_json::Value::Null);
    }
}
