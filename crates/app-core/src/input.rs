//! Field state for text inputs
//!
//! [`InputState`] backs one editable form field. The stored error only
//! changes through explicit calls (`validate`, `set_error`, `clear_error`,
//! `clear_all`), while [`InputState::is_valid`] re-runs the rules without
//! touching it. Screens use `is_valid` to enable a submit button live, and
//! `validate` when the user actually submits.

use crate::validation::{InputValidator, ValidationError};
use std::sync::Arc;

/// Display status of a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldStatus {
    /// Not validated since creation or the last reset
    Untouched,
    /// Last validation passed
    Valid,
    /// Last validation failed with this message
    Invalid(String),
}

/// Validation and edit state of one text input
///
/// # Example
///
/// ```
/// use app_core::input::InputState;
/// use app_core::validation::NonEmpty;
///
/// let mut password = InputState::with_validator("", NonEmpty);
/// assert!(!password.is_valid());
/// assert!(!password.has_error());
///
/// password.validate();
/// assert_eq!(password.error_message().as_deref(), Some("Field cannot be empty"));
///
/// password.clear_error();
/// password.text = "hunter2".to_string();
/// assert!(password.is_valid());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current text, edited by the user
    pub text: String,
    error: Option<ValidationError>,
    validator: Option<Arc<dyn InputValidator>>,
    validated: bool,
}

impl InputState {
    /// Create a field without validation rules
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a field checked by `validator`
    ///
    /// The validator is fixed for the lifetime of the field.
    pub fn with_validator(text: impl Into<String>, validator: impl InputValidator + 'static) -> Self {
        Self {
            text: text.into(),
            error: None,
            validator: Some(Arc::new(validator)),
            validated: false,
        }
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Run the rules against the current text and store the outcome
    ///
    /// Clears the error on success, stores the first failure otherwise.
    pub fn validate(&mut self) {
        self.error = self.run_validation().err();
        self.validated = true;
    }

    /// Whether the current text passes the rules
    ///
    /// Never reads or writes the stored error.
    pub fn is_valid(&self) -> bool {
        self.run_validation().is_ok()
    }

    /// Whether an error is currently stored
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The stored error, if any
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// User-facing message of the stored error
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Store an error decided outside the field's own rules
    ///
    /// Used for cross-field checks such as password confirmation.
    pub fn set_error(&mut self, error: ValidationError) {
        self.error = Some(error);
        self.validated = true;
    }

    /// Drop the stored error, keeping the text
    pub fn clear_error(&mut self) {
        self.error = None;
        self.validated = false;
    }

    /// Drop the stored error and the text
    pub fn clear_all(&mut self) {
        self.clear_error();
        self.text.clear();
    }

    /// Tri-state status for rendering
    pub fn status(&self) -> FieldStatus {
        match (&self.error, self.validated) {
            (Some(error), _) => FieldStatus::Invalid(error.to_string()),
            (None, true) => FieldStatus::Valid,
            (None, false) => FieldStatus::Untouched,
        }
    }

    fn run_validation(&self) -> Result<(), ValidationError> {
        match &self.validator {
            Some(validator) => validator.validate(&self.text),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{
        InputValidatorExt, LengthValidator, NonEmpty, PatternValidator, ValidatorChain,
    };

    fn email_field(text: &str) -> InputState {
        InputState::with_validator(
            text,
            ValidatorChain::new()
                .then(NonEmpty)
                .then(
                    PatternValidator::email()
                        .map_error_to(ValidationError::message("Email is incorrect")),
                )
                .build(),
        )
    }

    #[test]
    fn test_validate_stores_error() {
        let mut email = email_field("abc");
        assert!(!email.has_error());

        email.validate();
        assert!(email.has_error());
        assert_eq!(email.error_message().as_deref(), Some("Email is incorrect"));
    }

    #[test]
    fn test_validate_empty_reports_non_empty_error() {
        let mut email = email_field("");
        email.validate();
        assert_eq!(email.error(), Some(&ValidationError::Empty));
    }

    #[test]
    fn test_validate_success_clears_error() {
        let mut email = email_field("abc");
        email.validate();
        assert!(email.has_error());

        email.set_text("alice@example.com");
        email.validate();
        assert!(!email.has_error());
        assert_eq!(email.status(), FieldStatus::Valid);
    }

    #[test]
    fn test_validate_then_clear_error() {
        for text in ["", "abc", "alice@example.com"] {
            let mut email = email_field(text);
            email.validate();
            email.clear_error();
            assert!(!email.has_error());
        }
    }

    #[test]
    fn test_is_valid_does_not_touch_error() {
        let mut email = email_field("abc");

        for _ in 0..100 {
            assert!(!email.is_valid());
        }
        assert!(email.error().is_none());

        email.validate();
        let before = email.error().cloned();
        email.set_text("alice@example.com");
        for _ in 0..100 {
            assert!(email.is_valid());
        }
        assert_eq!(email.error().cloned(), before);
    }

    #[test]
    fn test_error_survives_edits_until_cleared() {
        let mut password = InputState::with_validator("", NonEmpty);
        password.validate();
        password.set_text("typed");
        assert!(password.has_error());
        assert!(password.is_valid());
    }

    #[test]
    fn test_clear_all() {
        let mut field = InputState::with_validator("abc", LengthValidator::min(5));
        field.validate();
        field.clear_all();
        assert!(!field.has_error());
        assert!(field.text.is_empty());
        assert_eq!(field.status(), FieldStatus::Untouched);
    }

    #[test]
    fn test_no_validator_always_valid() {
        let mut field = InputState::new("");
        assert!(field.is_valid());
        field.validate();
        assert!(!field.has_error());
    }

    #[test]
    fn test_set_error_from_cross_field_check() {
        let mut confirm = InputState::with_validator("secret1", NonEmpty);
        confirm.validate();
        assert!(!confirm.has_error());

        confirm.set_error(ValidationError::message("Passwords do not match"));
        assert_eq!(
            confirm.status(),
            FieldStatus::Invalid("Passwords do not match".to_string())
        );
        // The field's own rules still pass
        assert!(confirm.is_valid());
    }

    #[test]
    fn test_status_transitions() {
        let mut field = InputState::with_validator("", NonEmpty);
        assert_eq!(field.status(), FieldStatus::Untouched);

        field.validate();
        assert_eq!(
            field.status(),
            FieldStatus::Invalid("Field cannot be empty".to_string())
        );

        field.clear_error();
        assert_eq!(field.status(), FieldStatus::Untouched);
    }

    #[test]
    fn test_clone_shares_validator() {
        let field = email_field("abc");
        let copy = field.clone();
        assert!(!copy.is_valid());
    }
}
