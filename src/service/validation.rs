//! Presence checks for construction requests and patches.

use crate::error::AppError;

pub struct RequestValidator;

impl RequestValidator {
    /// Required text: must be present and not blank.
    pub fn required_text(field: &str, value: &str) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
        Ok(())
    }

    /// Required non-text value, e.g. a foreign key or a price.
    pub fn required<T>(field: &str, value: &Option<T>) -> Result<(), AppError> {
        if value.is_none() {
            return Err(AppError::Validation(format!("{} is required", field)));
        }
        Ok(())
    }

    /// For patches: a required text field may be omitted but not blanked.
    pub fn not_blank(field: &str, value: Option<&str>) -> Result<(), AppError> {
        match value {
            Some(v) if v.trim().is_empty() => Err(AppError::Validation(format!("{} must not be empty", field))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_missing() {
        assert!(RequestValidator::required_text("name", "Ada").is_ok());
        let err = RequestValidator::required_text("name", "   ").unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn required_values() {
        assert!(RequestValidator::required("author_id", &Some(1_i64)).is_ok());
        assert!(matches!(
            RequestValidator::required::<i64>("author_id", &None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn patches_may_omit_but_not_blank() {
        assert!(RequestValidator::not_blank("title", None).is_ok());
        assert!(RequestValidator::not_blank("title", Some("Dune")).is_ok());
        assert!(RequestValidator::not_blank("title", Some("")).is_err());
    }
}
