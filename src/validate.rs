use std::sync::LazyLock;

use regex::Regex;

static APP_SERVICE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-zA-Z-]{1,60}$").expect("valid regex"));

static RESOURCE_GROUP_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-\w._()]+$").expect("valid regex"));

/// Maximum length of a resource group name.
pub const RESOURCE_GROUP_NAME_MAX_LEN: usize = 90;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "{field} {value:?} may only contain alphanumeric characters and dashes and up to 60 characters in length"
    )]
    AppServiceName { field: &'static str, value: String },

    #[error("{field} may not exceed 90 characters in length")]
    ResourceGroupTooLong { field: &'static str },

    #[error("{field} may not end with a period")]
    ResourceGroupTrailingPeriod { field: &'static str },

    #[error(
        "{field} may only contain alphanumeric characters, dash, underscores, parentheses and periods"
    )]
    ResourceGroupCharacters { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

pub fn app_service_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !APP_SERVICE_NAME_RE.is_match(value) {
        return Err(ValidationError::AppServiceName {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

pub fn resource_group_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > RESOURCE_GROUP_NAME_MAX_LEN {
        return Err(ValidationError::ResourceGroupTooLong { field });
    }
    if value.ends_with('.') {
        return Err(ValidationError::ResourceGroupTrailingPeriod { field });
    }
    if !RESOURCE_GROUP_NAME_RE.is_match(value) {
        return Err(ValidationError::ResourceGroupCharacters { field });
    }
    Ok(())
}

pub fn not_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}
