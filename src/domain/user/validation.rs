//! User field validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email must contain a local part and a domain separated by '@'")]
    MalformedEmail,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("{0} exceeds maximum length of {1} characters")]
    FieldTooLong(&'static str, usize),
}

const MAX_EMAIL_LENGTH: usize = 120;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NAME_LENGTH: usize = 100;

/// Validate an email address
///
/// Rules:
/// - Cannot be empty
/// - Maximum 120 characters
/// - Exactly one '@' with non-empty local part and domain
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || parts.next().is_some() {
        return Err(UserValidationError::MalformedEmail);
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validate a required display field (name, school, program, ...)
pub fn validate_required(label: &'static str, value: &str) -> Result<(), UserValidationError> {
    if value.trim().is_empty() {
        return Err(UserValidationError::EmptyField(label));
    }

    if value.len() > MAX_NAME_LENGTH {
        return Err(UserValidationError::FieldTooLong(label, MAX_NAME_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("ana@campus.edu").is_ok());
        assert!(validate_email("a.b-c@sub.campus.edu").is_ok());
    }

    #[test]
    fn test_empty_email() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmptyEmail));
    }

    #[test]
    fn test_malformed_email() {
        assert_eq!(
            validate_email("no-at-sign"),
            Err(UserValidationError::MalformedEmail)
        );
        assert_eq!(
            validate_email("@campus.edu"),
            Err(UserValidationError::MalformedEmail)
        );
        assert_eq!(
            validate_email("ana@"),
            Err(UserValidationError::MalformedEmail)
        );
        assert_eq!(
            validate_email("ana@campus@edu"),
            Err(UserValidationError::MalformedEmail)
        );
    }

    #[test]
    fn test_email_too_long() {
        let long = format!("{}@campus.edu", "a".repeat(120));
        assert_eq!(
            validate_email(&long),
            Err(UserValidationError::EmailTooLong(120))
        );
    }

    #[test]
    fn test_valid_passwords() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_password_too_short() {
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
    }

    #[test]
    fn test_password_too_long() {
        let long = "a".repeat(129);
        assert_eq!(
            validate_password(&long),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_required_fields() {
        assert!(validate_required("First name", "Ana").is_ok());
        assert_eq!(
            validate_required("First name", "   "),
            Err(UserValidationError::EmptyField("First name"))
        );
        assert_eq!(
            validate_required("School", &"a".repeat(101)),
            Err(UserValidationError::FieldTooLong("School", 100))
        );
    }
}
