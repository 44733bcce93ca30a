//! Account field validation and the user-selectable app mode.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address shape (`local@domain.tld`, no whitespace).
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::Validation("Invalid email format".into()))
    }
}

/// Reject blank required text fields.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// App presentation mode stored on the user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    Sweet,
    Street,
}

impl UserMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserMode::Sweet => "sweet",
            UserMode::Street => "street",
        }
    }
}

impl std::str::FromStr for UserMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sweet" => Ok(UserMode::Sweet),
            "street" => Ok(UserMode::Street),
            other => Err(CoreError::Validation(format!(
                "Invalid mode '{other}'. Must be one of: sweet, street"
            ))),
        }
    }
}
