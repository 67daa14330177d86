///! Input validation for inventory resources
///! Names follow the namespace naming rules the managed clusters enforce

use alohomora_common::Error;
use regex::Regex;
use std::sync::LazyLock;

/// Maximum allowed lengths for various fields
pub const MAX_RESOURCE_NAME_LENGTH: usize = 63;
pub const MAX_DISPLAY_NAME_LENGTH: usize = 255;
pub const MAX_USERNAME_LENGTH: usize = 64;
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Regex patterns for validation
static RESOURCE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap());

/// Validation result type
pub type ValidationResult = Result<(), Error>;

/// Cluster set, cluster and project name validation (DNS-label rules)
pub fn validate_resource_name(kind: &str, name: &str) -> ValidationResult {
    if name.is_empty() {
        return Err(Error::Validation(format!("{} name cannot be empty", kind)));
    }
    if name.len() > MAX_RESOURCE_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "{} name exceeds {} characters",
            kind, MAX_RESOURCE_NAME_LENGTH
        )));
    }
    if !RESOURCE_NAME_REGEX.is_match(name) {
        return Err(Error::Validation(format!(
            "{} name '{}' must be lowercase alphanumeric with interior dashes",
            kind, name
        )));
    }
    Ok(())
}

/// Display name validation for identities and roles
pub fn validate_display_name(name: &str) -> ValidationResult {
    if name.trim().is_empty() {
        return Err(Error::Validation("Display name cannot be empty".to_string()));
    }
    if name.len() > MAX_DISPLAY_NAME_LENGTH {
        return Err(Error::Validation(format!(
            "Display name exceeds {} characters",
            MAX_DISPLAY_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Username validation
pub fn validate_username(username: &str) -> ValidationResult {
    if username.len() < MIN_USERNAME_LENGTH {
        return Err(Error::Validation(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LENGTH
        )));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(Error::Validation(format!(
            "Username exceeds {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !USERNAME_REGEX.is_match(username) {
        return Err(Error::Validation(format!(
            "Username '{}' contains invalid characters",
            username
        )));
    }
    Ok(())
}
