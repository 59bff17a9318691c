//! Field constraints checked before anything is persisted.

use serde_json::json;

use super::CatalogError;

/// Longest accepted value for short text fields, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Collects field violations for one subject.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<serde_json::Value>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field must be present, non-blank and at most [`MAX_TEXT_LEN`] characters.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => self.check_text(field, value),
            None => self.violation(field, "must not be blank"),
        }
        self
    }

    /// Like [`Validator::required`] when the field is present; absence is fine.
    pub fn optional(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.check_text(field, value);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn finish(self, subject: &'static str) -> Result<(), CatalogError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(CatalogError::Validation {
            subject,
            violations: self.violations,
        })
    }

    fn check_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.violation(field, "must not be blank");
        } else if value.chars().count() > MAX_TEXT_LEN {
            self.violation(
                field,
                &format!("must be at most {MAX_TEXT_LEN} characters"),
            );
        }
    }

    fn violation(&mut self, field: &str, error: &str) {
        self.violations.push(json!({ "field": field, "error": error }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(result: Result<(), CatalogError>) -> Vec<serde_json::Value> {
        match result {
            Err(CatalogError::Validation { violations, .. }) => violations,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_and_blank_required_fields_are_reported() {
        let mut validator = Validator::new();
        validator
            .required("firstName", None)
            .required("lastName", Some("   "));
        let found = violations(validator.finish("author"));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0]["field"], "firstName");
        assert_eq!(found[1]["error"], "must not be blank");
    }

    #[test]
    fn overlong_values_are_reported() {
        let long = "x".repeat(MAX_TEXT_LEN + 1);
        let mut validator = Validator::new();
        validator.required("title", Some(&long));
        let found = violations(validator.finish("book"));
        assert_eq!(found[0]["error"], "must be at most 255 characters");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_TEXT_LEN);
        let mut validator = Validator::new();
        validator.required("title", Some(&accented));
        assert!(validator.finish("book").is_ok());
    }

    #[test]
    fn optional_fields_may_be_absent_but_not_blank() {
        let mut validator = Validator::new();
        validator.optional("firstName", None);
        assert!(validator.is_valid());

        validator.optional("lastName", Some(""));
        assert!(!validator.is_valid());
    }
}
