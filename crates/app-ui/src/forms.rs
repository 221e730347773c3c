//! Form models for the authentication screens
//!
//! Each form owns one [`InputState`] per field plus the focused field.
//! Beginning to edit a field clears its error; the return key moves focus
//! to the next field and, on the last one, asks the screen to submit.

use app_core::input::InputState;
use app_core::validation::{
    InputValidatorExt, LengthValidator, NonEmpty, PatternValidator, ValidationError,
    ValidatorChain,
};

/// Message shown under an email that fails the format check
pub const EMAIL_INCORRECT: &str = "Email is incorrect";

/// Message shown under a confirmation that differs from the password
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Email and password pulled from a valid form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

/// Result of pressing return on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKeyAction<F> {
    /// Focus moved to this field
    Focus(F),
    /// Focus released; the form should submit
    Submit,
}

fn email_field() -> InputState {
    InputState::with_validator(
        "",
        ValidatorChain::new()
            .then(NonEmpty)
            .then(PatternValidator::email().map_error_to(ValidationError::message(EMAIL_INCORRECT)))
            .build(),
    )
}

// =============================================================================
// Login
// =============================================================================

/// Login form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginField {
    /// Email
    Email,
    /// Password
    Password,
}

/// Login form
#[derive(Debug, Clone)]
pub struct LoginForm {
    /// Email field
    pub email: InputState,
    /// Password field
    pub password: InputState,
    focus: Option<LoginField>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self {
            email: email_field(),
            password: InputState::with_validator("", NonEmpty),
            focus: None,
        }
    }

    /// Focused field
    pub fn focus(&self) -> Option<LoginField> {
        self.focus
    }

    /// Field state
    pub fn field_mut(&mut self, field: LoginField) -> &mut InputState {
        match field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    /// The user started editing `field`
    pub fn begin_editing(&mut self, field: LoginField) {
        self.focus = Some(field);
        self.field_mut(field).clear_error();
    }

    /// The user pressed return on `field`
    pub fn return_key(&mut self, field: LoginField) -> ReturnKeyAction<LoginField> {
        match field {
            LoginField::Email => {
                self.focus = Some(LoginField::Password);
                ReturnKeyAction::Focus(LoginField::Password)
            }
            LoginField::Password => {
                self.focus = None;
                ReturnKeyAction::Submit
            }
        }
    }

    /// Whether the submit button is enabled
    pub fn is_submit_enabled(&self) -> bool {
        self.email.is_valid() && self.password.is_valid()
    }

    /// Validate every field, returning the credentials when all pass
    pub fn validate(&mut self) -> Option<Credentials> {
        self.email.validate();
        self.password.validate();

        if self.email.has_error() || self.password.has_error() {
            return None;
        }
        Some(Credentials {
            email: self.email.text.clone(),
            password: self.password.text.clone(),
        })
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationField {
    /// Email
    Email,
    /// Password
    Password,
    /// Password confirmation
    ConfirmPassword,
}

/// Registration form
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    /// Email field
    pub email: InputState,
    /// Password field
    pub password: InputState,
    /// Password confirmation field
    pub confirm_password: InputState,
    focus: Option<RegistrationField>,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationForm {
    /// Create an empty form
    pub fn new() -> Self {
        Self {
            email: email_field(),
            password: InputState::with_validator(
                "",
                ValidatorChain::new()
                    .then(NonEmpty)
                    .then(LengthValidator::min(MIN_PASSWORD_LENGTH))
                    .build(),
            ),
            confirm_password: InputState::with_validator("", NonEmpty),
            focus: None,
        }
    }

    /// Focused field
    pub fn focus(&self) -> Option<RegistrationField> {
        self.focus
    }

    /// Field state
    pub fn field_mut(&mut self, field: RegistrationField) -> &mut InputState {
        match field {
            RegistrationField::Email => &mut self.email,
            RegistrationField::Password => &mut self.password,
            RegistrationField::ConfirmPassword => &mut self.confirm_password,
        }
    }

    /// The user started editing `field`
    pub fn begin_editing(&mut self, field: RegistrationField) {
        self.focus = Some(field);
        self.field_mut(field).clear_error();
    }

    /// The user pressed return on `field`
    pub fn return_key(&mut self, field: RegistrationField) -> ReturnKeyAction<RegistrationField> {
        let next = match field {
            RegistrationField::Email => Some(RegistrationField::Password),
            RegistrationField::Password => Some(RegistrationField::ConfirmPassword),
            RegistrationField::ConfirmPassword => None,
        };
        self.focus = next;
        match next {
            Some(field) => ReturnKeyAction::Focus(field),
            None => ReturnKeyAction::Submit,
        }
    }

    /// Whether the submit button is enabled
    pub fn is_submit_enabled(&self) -> bool {
        self.email.is_valid() && self.password.is_valid() && self.confirm_password.is_valid()
    }

    /// Validate every field, then check the confirmation matches
    ///
    /// A mismatch is stored on the confirmation field.
    pub fn validate(&mut self) -> Option<Credentials> {
        self.email.validate();
        self.password.validate();
        self.confirm_password.validate();

        if self.email.has_error() || self.password.has_error() || self.confirm_password.has_error()
        {
            return None;
        }

        if self.password.text != self.confirm_password.text {
            self.confirm_password
                .set_error(ValidationError::message(PASSWORDS_DO_NOT_MATCH));
            return None;
        }

        Some(Credentials {
            email: self.email.text.clone(),
            password: self.password.text.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_email_format_message() {
        let mut form = LoginForm::new();
        form.email.set_text("abc");
        form.password.set_text("secret");

        assert!(form.validate().is_none());
        assert_eq!(form.email.error_message().as_deref(), Some(EMAIL_INCORRECT));
        assert!(!form.password.has_error());
    }

    #[test]
    fn test_login_empty_email_reports_empty() {
        let mut form = LoginForm::new();
        assert!(form.validate().is_none());
        assert_eq!(form.email.error(), Some(&ValidationError::Empty));
        assert_eq!(form.password.error(), Some(&ValidationError::Empty));
    }

    #[test]
    fn test_login_valid_credentials() {
        let mut form = LoginForm::new();
        form.email.set_text("alice@example.com");
        form.password.set_text("secret1");

        assert!(form.is_submit_enabled());
        assert_eq!(
            form.validate(),
            Some(Credentials {
                email: "alice@example.com".to_string(),
                password: "secret1".to_string(),
            })
        );
    }

    #[test]
    fn test_login_submit_enabled_is_live() {
        let mut form = LoginForm::new();
        assert!(!form.is_submit_enabled());

        form.email.set_text("alice@example.com");
        assert!(!form.is_submit_enabled());
        form.password.set_text("x");
        assert!(form.is_submit_enabled());

        // Gating never surfaces errors
        assert!(!form.email.has_error());
        assert!(!form.password.has_error());
    }

    #[test]
    fn test_login_focus_flow() {
        let mut form = LoginForm::new();
        form.begin_editing(LoginField::Email);
        assert_eq!(form.focus(), Some(LoginField::Email));

        assert_eq!(
            form.return_key(LoginField::Email),
            ReturnKeyAction::Focus(LoginField::Password)
        );
        assert_eq!(form.focus(), Some(LoginField::Password));

        assert_eq!(form.return_key(LoginField::Password), ReturnKeyAction::Submit);
        assert_eq!(form.focus(), None);
    }

    #[test]
    fn test_begin_editing_clears_only_that_field() {
        let mut form = LoginForm::new();
        form.validate();
        assert!(form.email.has_error());
        assert!(form.password.has_error());

        form.begin_editing(LoginField::Password);
        assert!(form.email.has_error());
        assert!(!form.password.has_error());
    }

    #[test]
    fn test_registration_short_password() {
        let mut form = RegistrationForm::new();
        form.email.set_text("bob@example.com");
        form.password.set_text("12345");
        form.confirm_password.set_text("12345");

        assert!(form.validate().is_none());
        assert_eq!(
            form.password.error(),
            Some(&ValidationError::TooShort { min: 6, actual: 5 })
        );
    }

    #[test]
    fn test_registration_mismatch_sets_confirmation_error() {
        let mut form = RegistrationForm::new();
        form.email.set_text("bob@example.com");
        form.password.set_text("123456");
        form.confirm_password.set_text("654321");

        assert!(form.validate().is_none());
        assert_eq!(
            form.confirm_password.error_message().as_deref(),
            Some(PASSWORDS_DO_NOT_MATCH)
        );
        assert!(!form.password.has_error());
    }

    #[test]
    fn test_registration_mismatch_checked_after_field_rules() {
        let mut form = RegistrationForm::new();
        form.email.set_text("bob");
        form.password.set_text("123456");
        form.confirm_password.set_text("different");

        assert!(form.validate().is_none());
        assert!(form.email.has_error());
        assert!(!form.confirm_password.has_error());
    }

    #[test]
    fn test_registration_valid() {
        let mut form = RegistrationForm::new();
        form.email.set_text("bob@example.com");
        form.password.set_text("123456");
        form.confirm_password.set_text("123456");

        assert!(form.is_submit_enabled());
        assert!(form.validate().is_some());
    }

    #[test]
    fn test_registration_focus_flow() {
        let mut form = RegistrationForm::new();
        assert_eq!(
            form.return_key(RegistrationField::Email),
            ReturnKeyAction::Focus(RegistrationField::Password)
        );
        assert_eq!(
            form.return_key(RegistrationField::Password),
            ReturnKeyAction::Focus(RegistrationField::ConfirmPassword)
        );
        assert_eq!(
            form.return_key(RegistrationField::ConfirmPassword),
            ReturnKeyAction::Submit
        );
        assert_eq!(form.focus(), None);
    }
}
