//! Form validation.
//!
//! Every field is checked and all failures are collected, so a form can show
//! them side by side. Validation runs before any request is made.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::AuthError;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum username length after trimming.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Field name to message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok` when nothing was recorded.
    pub fn into_result(self) -> Result<(), AuthError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AuthError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Shape check for `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let clean = |part: &str| !part.is_empty() && !part.contains('@') && !part.chars().any(char::is_whitespace);
    if !clean(local) || !clean(domain) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn check_email(email: &str, errors: &mut FieldErrors) {
    if email.trim().is_empty() {
        errors.insert("email", "Email is required");
    } else if !is_valid_email(email.trim()) {
        errors.insert("email", "Please enter a valid email address");
    }
}

fn check_password(password: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
}

/// Login form input.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        let mut errors = FieldErrors::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        errors.into_result()
    }
}

/// Signup form input.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Checked against `password` when present.
    pub confirm_password: Option<String>,
    pub accept_terms: bool,
}

impl SignupForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: None,
            accept_terms: false,
        }
    }

    pub fn with_confirmation(mut self, confirm_password: impl Into<String>) -> Self {
        self.confirm_password = Some(confirm_password.into());
        self
    }

    pub fn with_terms_accepted(mut self, accepted: bool) -> Self {
        self.accept_terms = accepted;
        self
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        let mut errors = FieldErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.insert("username", "Username is required");
        } else if username.chars().count() < MIN_USERNAME_LENGTH {
            errors.insert(
                "username",
                format!("Username must be at least {} characters", MIN_USERNAME_LENGTH),
            );
        }

        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);

        if let Some(confirm) = &self.confirm_password {
            if confirm != &self.password {
                errors.insert("confirm_password", "Passwords do not match");
            }
        }
        if !self.accept_terms {
            errors.insert("terms", "You must accept the terms and conditions");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(!is_valid_email("foo"));
        assert!(!is_valid_email("foo@bar"));
        assert!(is_valid_email("foo@bar.com"));
        assert!(!is_valid_email("foo@bar."));
        assert!(!is_valid_email("@bar.com"));
        assert!(!is_valid_email("fo o@bar.com"));
        assert!(!is_valid_email("foo@b@r.com"));
    }

    #[test]
    fn test_short_password_rejected() {
        let err = LoginForm::new("foo@bar.com", "12345").validate().unwrap_err();
        assert!(err.is_validation());
        assert!(err.field_errors().unwrap().contains("password"));
        assert!(LoginForm::new("foo@bar.com", "123456").validate().is_ok());
    }

    #[test]
    fn test_all_signup_errors_collected() {
        let err = SignupForm::new("  ab ", "foo@bar", "123")
            .with_confirmation("1234")
            .validate()
            .unwrap_err();
        let errors = err.field_errors().unwrap();

        assert_eq!(errors.len(), 5);
        for field in ["username", "email", "password", "confirm_password", "terms"] {
            assert!(errors.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_valid_signup() {
        let form = SignupForm::new("alice", "alice@shop.io", "secret1")
            .with_confirmation("secret1")
            .with_terms_accepted(true);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.insert("password", "too short");
        errors.insert("email", "bad");
        assert_eq!(errors.to_string(), "email: bad; password: too short");
    }
}
