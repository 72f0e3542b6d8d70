//! Field validation for incoming values

use crate::contract::CatalogError;

/// Column limit shared by names, titles, links and file references
pub const MAX_CHAR_LEN: usize = 255;
pub const MAX_USERNAME_LEN: usize = 40;
pub const MIN_PASSWORD_LEN: usize = 5;

/// Trim a required text field and enforce its length limit
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::validation(field, "This field may not be blank."));
    }
    if value.chars().count() > max_len {
        return Err(CatalogError::validation(
            field,
            format!("Ensure this field has no more than {} characters.", max_len),
        ));
    }
    Ok(value.to_string())
}

/// Enforce the length limit of an optional text field without requiring it
pub fn bounded_text(field: &str, value: &str, max_len: usize) -> Result<String, CatalogError> {
    if value.chars().count() > max_len {
        return Err(CatalogError::validation(
            field,
            format!("Ensure this field has no more than {} characters.", max_len),
        ));
    }
    Ok(value.to_string())
}

/// Validate an email address and lower-case its domain part
pub fn normalize_email(email: &str) -> Result<String, CatalogError> {
    let email = required_text("email", email, MAX_CHAR_LEN)?;
    match email.rsplit_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => {
            Ok(format!("{}@{}", local, domain.to_lowercase()))
        }
        _ => Err(CatalogError::validation("email", "Enter a valid email address.")),
    }
}

pub fn validate_username(username: &str) -> Result<String, CatalogError> {
    let username = required_text("username", username, MAX_USERNAME_LEN)?;
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(CatalogError::validation(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ));
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<(), CatalogError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CatalogError::validation(
            "password",
            format!("Ensure this field has at least {} characters.", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}
