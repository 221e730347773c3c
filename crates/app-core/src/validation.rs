//! Composable input validation
//!
//! Validators check a single text input in isolation. Each rule implements
//! [`InputValidator`]; rules are combined left-to-right into a [`Sequence`]
//! that stops at the first failure, so only one error is ever surfaced for a
//! given input.
//!
//! # Example
//!
//! ```
//! use app_core::validation::{
//!     InputValidator, InputValidatorExt, NonEmpty, PatternValidator,
//!     ValidationError, ValidatorChain,
//! };
//!
//! let email = ValidatorChain::new()
//!     .then(NonEmpty)
//!     .then(
//!         PatternValidator::email()
//!             .map_error_to(ValidationError::message("Email is incorrect")),
//!     )
//!     .build();
//!
//! assert_eq!(email.validate(""), Err(ValidationError::Empty));
//! assert_eq!(email.validate("abc").unwrap_err().to_string(), "Email is incorrect");
//! assert!(email.validate("alice@example.com").is_ok());
//! ```

use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

// =============================================================================
// Errors
// =============================================================================

/// Error produced by a failing validation rule
///
/// The `Display` output is the message shown inline under the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Text is empty
    #[error("Field cannot be empty")]
    Empty,

    /// Text is shorter than the minimum length
    #[error("Must be at least {min} characters")]
    TooShort {
        /// Minimum required length
        min: usize,
        /// Actual length
        actual: usize,
    },

    /// Text is longer than the maximum length
    #[error("Must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual length
        actual: usize,
    },

    /// Text does not match the expected pattern
    #[error("Wrong format")]
    WrongFormat,

    /// Field-specific error with a custom message
    #[error("{0}")]
    Message(String),
}

impl ValidationError {
    /// Create a field-specific error with a custom message
    pub fn message(message: impl Into<String>) -> Self {
        ValidationError::Message(message.into())
    }
}

// =============================================================================
// Validator Capability
// =============================================================================

/// A single validation rule for a text input
///
/// Implementations must be stateless and free of side effects: calling
/// `validate` any number of times with the same text yields the same result.
pub trait InputValidator: fmt::Debug + Send + Sync {
    /// Check the text, failing with the first violated constraint
    fn validate(&self, text: &str) -> Result<(), ValidationError>;
}

impl<V: InputValidator + ?Sized> InputValidator for Box<V> {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        (**self).validate(text)
    }
}

impl<V: InputValidator + ?Sized> InputValidator for Arc<V> {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        (**self).validate(text)
    }
}

/// Combinators available on every validator
pub trait InputValidatorExt: InputValidator + Sized {
    /// Handle the error of this validator when it fails
    ///
    /// The mapping function receives the original error and either returns
    /// the error to surface instead or `Ok(())` to accept the text.
    fn map_error<F>(self, map: F) -> ErrorMapped<Self>
    where
        F: Fn(ValidationError) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        ErrorMapped::new(self, map)
    }

    /// Replace any failure of this validator with a fixed error
    fn map_error_to(self, error: ValidationError) -> ErrorMapped<Self> {
        ErrorMapped::new(self, move |_| Err(error.clone()))
    }
}

impl<V: InputValidator + Sized> InputValidatorExt for V {}

// =============================================================================
// Primitive Rules
// =============================================================================

/// Fails with [`ValidationError::Empty`] when the text is empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonEmpty;

impl InputValidator for NonEmpty {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        if text.is_empty() {
            return Err(ValidationError::Empty);
        }
        Ok(())
    }
}

/// Bounds the length of the text
///
/// Length is counted in user-perceived characters (extended grapheme
/// clusters), so `"é"` written with a combining accent counts as one.
/// The minimum is checked before the maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthValidator {
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthValidator {
    /// Create a validator with optional bounds
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Only a lower bound
    pub fn min(min: usize) -> Self {
        Self::new(Some(min), None)
    }

    /// Only an upper bound
    pub fn max(max: usize) -> Self {
        Self::new(None, Some(max))
    }

    /// Both bounds (inclusive)
    pub fn between(min: usize, max: usize) -> Self {
        Self::new(Some(min), Some(max))
    }
}

impl InputValidator for LengthValidator {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        let actual = text.graphemes(true).count();

        if let Some(min) = self.min {
            if actual < min {
                return Err(ValidationError::TooShort { min, actual });
            }
        }

        if let Some(max) = self.max {
            if actual > max {
                return Err(ValidationError::TooLong { max, actual });
            }
        }

        Ok(())
    }
}

/// Requires the whole text to match a regular expression
///
/// The pattern is anchored at both ends, so a partial match is rejected.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    pattern: String,
    regex: Regex,
}

impl PatternValidator {
    /// Compile a pattern validator
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error if `pattern` is not a valid
    /// regular expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Validator for email addresses
    pub fn email() -> Self {
        static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = EMAIL_REGEX
            .get_or_init(|| {
                Regex::new(&format!("^(?:{})$", patterns::EMAIL))
                    .expect("email pattern is a valid regex")
            })
            .clone();
        Self {
            pattern: patterns::EMAIL.to_string(),
            regex,
        }
    }

    /// The pattern as written, without anchors
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl InputValidator for PatternValidator {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        if !self.regex.is_match(text) {
            return Err(ValidationError::WrongFormat);
        }
        Ok(())
    }
}

/// Well-known patterns used by the application forms
pub mod patterns {
    /// Email address (RFC 5322 subset, lowercase)
    pub const EMAIL: &str = r#"(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*)@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"#;

    /// Names: no leading space, no digits or punctuation
    pub const ONLY_LETTERS: &str = r"[^ ][^0-9!@#$%^&*()/;:.,'?]+";
}

// =============================================================================
// Composition
// =============================================================================

type ErrorMap = Box<dyn Fn(ValidationError) -> Result<(), ValidationError> + Send + Sync>;

/// Runs an inner validator and transforms its error on failure
pub struct ErrorMapped<V> {
    inner: V,
    map: ErrorMap,
}

impl<V: InputValidator> ErrorMapped<V> {
    /// Wrap `inner`, mapping its failures through `map`
    pub fn new<F>(inner: V, map: F) -> Self
    where
        F: Fn(ValidationError) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Self {
            inner,
            map: Box::new(map),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for ErrorMapped<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMapped")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<V: InputValidator> InputValidator for ErrorMapped<V> {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        self.inner.validate(text).or_else(|err| (self.map)(err))
    }
}

/// Ordered chain of validators that short-circuits on the first failure
#[derive(Debug, Default)]
pub struct Sequence {
    validators: Vec<Box<dyn InputValidator>>,
}

impl Sequence {
    /// Create a sequence from validators in execution order
    pub fn new(validators: Vec<Box<dyn InputValidator>>) -> Self {
        Self { validators }
    }

    /// Number of rules in the chain
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the chain has no rules (and therefore always passes)
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl InputValidator for Sequence {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        self.validators
            .iter()
            .try_for_each(|validator| validator.validate(text))
    }
}

impl FromIterator<Box<dyn InputValidator>> for Sequence {
    fn from_iter<I: IntoIterator<Item = Box<dyn InputValidator>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Builder folding validators into a [`Sequence`] in declaration order
#[derive(Debug, Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn InputValidator>>,
}

impl ValidatorChain {
    /// Start an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; it runs after every rule added before it
    pub fn then(mut self, validator: impl InputValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Finish the chain
    pub fn build(self) -> Sequence {
        Sequence::new(self.validators)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how many times it ran; fails when `fail` is set
    #[derive(Debug)]
    struct Probe {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl InputValidator for Probe {
        fn validate(&self, _text: &str) -> Result<(), ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ValidationError::message("probe"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(NonEmpty.validate(""), Err(ValidationError::Empty));
        assert!(NonEmpty.validate(" ").is_ok());
        assert!(NonEmpty.validate("movie").is_ok());
    }

    #[test]
    fn test_length_bounds() {
        let validator = LengthValidator::between(2, 4);

        for len in 0..8 {
            let text = "x".repeat(len);
            let result = validator.validate(&text);
            match len {
                0 | 1 => assert_eq!(
                    result,
                    Err(ValidationError::TooShort { min: 2, actual: len })
                ),
                2..=4 => assert!(result.is_ok()),
                _ => assert_eq!(
                    result,
                    Err(ValidationError::TooLong { max: 4, actual: len })
                ),
            }
        }
    }

    #[test]
    fn test_length_min_checked_before_max() {
        // Inverted bounds: every length violates one of them
        let validator = LengthValidator::between(5, 2);
        assert_eq!(
            validator.validate("abc"),
            Err(ValidationError::TooShort { min: 5, actual: 3 })
        );
    }

    #[test]
    fn test_length_unbounded_sides() {
        assert!(LengthValidator::min(3).validate(&"a".repeat(1000)).is_ok());
        assert!(LengthValidator::max(3).validate("").is_ok());
        assert!(LengthValidator::default().validate("anything").is_ok());
    }

    #[test]
    fn test_length_counts_graphemes() {
        // "e" + combining acute accent is one user-perceived character
        let text = "e\u{301}";
        assert_eq!(text.chars().count(), 2);
        assert!(LengthValidator::max(1).validate(text).is_ok());
    }

    #[test]
    fn test_pattern_is_anchored() {
        let digits = PatternValidator::new("[0-9]+").unwrap();
        assert!(digits.validate("12345").is_ok());
        assert_eq!(digits.validate("abc123"), Err(ValidationError::WrongFormat));
        assert_eq!(digits.validate("123abc"), Err(ValidationError::WrongFormat));
        assert_eq!(digits.pattern(), "[0-9]+");
    }

    #[test]
    fn test_pattern_alternation_stays_anchored() {
        let validator = PatternValidator::new("cat|dog").unwrap();
        assert!(validator.validate("dog").is_ok());
        assert_eq!(validator.validate("catalog"), Err(ValidationError::WrongFormat));
    }

    #[test]
    fn test_pattern_invalid_regex() {
        assert!(PatternValidator::new("(unclosed").is_err());
    }

    #[test]
    fn test_email_pattern() {
        let email = PatternValidator::email();
        assert!(email.validate("alice@example.com").is_ok());
        assert!(email.validate("first.last+tag@sub.domain.org").is_ok());
        assert!(email.validate("abc").is_err());
        assert!(email.validate("alice@").is_err());
        assert!(email.validate("alice@example.com trailing").is_err());
    }

    #[test]
    fn test_only_letters_pattern() {
        let name = PatternValidator::new(patterns::ONLY_LETTERS).unwrap();
        assert!(name.validate("Anton").is_ok());
        assert!(name.validate(" Anton").is_err());
        assert!(name.validate("R2D2").is_err());
    }

    #[test]
    fn test_map_error() {
        let validator = PatternValidator::email().map_error(|err| {
            assert_eq!(err, ValidationError::WrongFormat);
            Err(ValidationError::message("Email is incorrect"))
        });
        let err = validator.validate("abc").unwrap_err();
        assert_eq!(err.to_string(), "Email is incorrect");
    }

    #[test]
    fn test_map_error_can_accept_failure() {
        // Too long is tolerated, too short still fails
        let validator = LengthValidator::between(2, 4).map_error(|err| match err {
            ValidationError::TooLong { .. } => Ok(()),
            other => Err(other),
        });
        assert!(validator.validate("abcdef").is_ok());
        assert!(matches!(
            validator.validate("a"),
            Err(ValidationError::TooShort { .. })
        ));
    }

    #[test]
    fn test_map_error_passes_through_success() {
        let validator = NonEmpty.map_error_to(ValidationError::message("never"));
        assert!(validator.validate("ok").is_ok());
    }

    #[test]
    fn test_sequence_short_circuits() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let chain = ValidatorChain::new()
            .then(Probe {
                calls: first.clone(),
                fail: true,
            })
            .then(Probe {
                calls: second.clone(),
                fail: false,
            })
            .build();

        assert_eq!(chain.len(), 2);
        assert!(chain.validate("text").is_err());
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_sequence_runs_in_declaration_order() {
        let chain = ValidatorChain::new()
            .then(LengthValidator::min(3))
            .then(NonEmpty)
            .build();

        // Length runs first, so the empty string reports TooShort, not Empty
        assert_eq!(
            chain.validate(""),
            Err(ValidationError::TooShort { min: 3, actual: 0 })
        );
    }

    #[test]
    fn test_email_chain_surfaces_first_error_only() {
        let chain = ValidatorChain::new()
            .then(NonEmpty.map_error_to(ValidationError::message("Email is required")))
            .then(
                PatternValidator::email()
                    .map_error_to(ValidationError::message("Email is incorrect")),
            )
            .build();

        assert_eq!(
            chain.validate("").unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(
            chain.validate("bad").unwrap_err().to_string(),
            "Email is incorrect"
        );
    }

    #[test]
    fn test_empty_sequence_passes() {
        let chain = ValidatorChain::new().build();
        assert!(chain.is_empty());
        assert!(chain.validate("").is_ok());
    }

    #[test]
    fn test_sequence_from_iterator() {
        let rules: Vec<Box<dyn InputValidator>> =
            vec![Box::new(NonEmpty), Box::new(LengthValidator::max(2))];
        let chain: Sequence = rules.into_iter().collect();
        assert_eq!(
            chain.validate("long"),
            Err(ValidationError::TooLong { max: 2, actual: 4 })
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ValidationError::Empty.to_string(), "Field cannot be empty");
        assert_eq!(
            ValidationError::TooShort { min: 6, actual: 2 }.to_string(),
            "Must be at least 6 characters"
        );
        assert_eq!(ValidationError::WrongFormat.to_string(), "Wrong format");
    }
}
