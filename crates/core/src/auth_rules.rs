//! Input rules for the account forms: signup, login, password reset.
//!
//! Request bodies are validated here so the API handlers and any other
//! front end reject the same inputs with the same messages.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::CoreError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Failed logins allowed before the account is temporarily locked.
pub const MAX_FAILED_LOGINS: i32 = 5;

/// Lock duration after [`MAX_FAILED_LOGINS`] consecutive failures.
pub const LOCKOUT_MINUTES: i64 = 15;

/// Prefix of the verification-token identifier for email confirmation.
pub const EMAIL_VERIFICATION_PREFIX: &str = "email-verification";

/// Prefix of the verification-token identifier for password resets.
pub const PASSWORD_RESET_PREFIX: &str = "reset-password";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn username_charset(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(rule(
            "username_charset",
            "Username can only contain letters, numbers, and underscores",
        ))
    }
}

/// Uppercase, lowercase and digit, each at least once.
fn password_complexity(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(rule(
            "password_uppercase",
            "Password must contain at least 1 uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(rule(
            "password_lowercase",
            "Password must contain at least 1 lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(rule(
            "password_digit",
            "Password must contain at least 1 number",
        ));
    }
    Ok(())
}

/// Build the verification-token identifier for `token` under `prefix`.
pub fn token_identifier(prefix: &str, token: &str) -> String {
    format!("{prefix}:{token}")
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(
        length(min = 3, max = 20, message = "Username must be 3 to 20 characters"),
        custom(function = "username_charset")
    )]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "password_complexity")
    )]
    pub password: String,
    pub confirm_password: String,
}

impl SignupInput {
    /// Field rules plus the password confirmation match.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.password != self.confirm_password {
            return Err(CoreError::Validation(
                "confirmPassword: Passwords do not match".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginInput {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordInput {
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordInput {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "password_complexity")
    )]
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordInput {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.new_password != self.confirm_password {
            return Err(CoreError::Validation(
                "confirmPassword: Passwords do not match".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn signup() -> SignupInput {
        SignupInput {
            name: "Ada Lovelace".into(),
            username: "ada_l".into(),
            email: "ada@example.com".into(),
            password: "Engine123".into(),
            confirm_password: "Engine123".into(),
        }
    }

    #[test]
    fn valid_signup_passes() {
        assert!(signup().check().is_ok());
    }

    #[test]
    fn username_rules() {
        let mut input = signup();
        input.username = "ab".into();
        assert_matches!(input.check(), Err(CoreError::Validation(m)) if m.starts_with("username"));

        input.username = "has space".into();
        assert_matches!(input.check(), Err(CoreError::Validation(m)) if m.contains("underscores"));

        input.username = "a".repeat(21);
        assert!(input.check().is_err());
    }

    #[test]
    fn password_needs_each_character_class() {
        for (password, fragment) in [
            ("engine123", "uppercase"),
            ("ENGINE123", "lowercase"),
            ("EngineOne", "number"),
            ("Eng1", "at least 8"),
        ] {
            let mut input = signup();
            input.password = password.into();
            input.confirm_password = password.into();
            assert_matches!(
                input.check(),
                Err(CoreError::Validation(m)) if m.contains(fragment),
                "{password}"
            );
        }
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        let mut input = signup();
        input.confirm_password = "Engine124".into();
        assert_matches!(input.check(), Err(CoreError::Validation(m)) if m.contains("do not match"));
    }

    #[test]
    fn login_requires_email_and_length() {
        let input = LoginInput {
            email: "not-an-email".into(),
            password: "short".into(),
        };
        let err = CoreError::from(input.validate().unwrap_err());
        assert_matches!(err, CoreError::Validation(m) if m.contains("email:") && m.contains("password:"));
    }

    #[test]
    fn reset_password_checks_token_and_match() {
        let input = ResetPasswordInput {
            token: String::new(),
            new_password: "Engine123".into(),
            confirm_password: "Engine123".into(),
        };
        assert!(input.check().is_err());

        let input = ResetPasswordInput {
            token: "abc".into(),
            new_password: "Engine123".into(),
            confirm_password: "Engine123".into(),
        };
        assert!(input.check().is_ok());
    }

    #[test]
    fn identifiers_are_prefixed() {
        assert_eq!(
            token_identifier(PASSWORD_RESET_PREFIX, "t0k"),
            "reset-password:t0k"
        );
    }
}
