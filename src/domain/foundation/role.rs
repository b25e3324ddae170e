//! Approver role value object.
//!
//! Roles are campaign-configurable strings ("creator", "editor", "marketer",
//! "legal", ...) rather than a closed enum, so new approval chains need no
//! code change. Normalized to lowercase for comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Maximum length for a role name.
pub const MAX_ROLE_LENGTH: usize = 64;

/// Role required to sign off at an approval stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApproverRole(String);

impl ApproverRole {
    /// Creates a role, normalizing to lowercase.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is empty or whitespace
    /// - `InvalidFormat` if the name exceeds the length limit
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("approver_role"));
        }
        if trimmed.len() > MAX_ROLE_LENGTH {
            return Err(ValidationError::invalid_format(
                "approver_role",
                format!("must be {} characters or less", MAX_ROLE_LENGTH),
            ));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_accepts_normal_name() {
        let role = ApproverRole::new("editor").unwrap();
        assert_eq!(role.as_str(), "editor");
    }

    #[test]
    fn role_normalizes_case_and_whitespace() {
        let role = ApproverRole::new("  Marketer ").unwrap();
        assert_eq!(role.as_str(), "marketer");
    }

    #[test]
    fn roles_compare_case_insensitively_via_normalization() {
        let a = ApproverRole::new("Legal").unwrap();
        let b = ApproverRole::new("legal").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn role_rejects_empty_name() {
        assert!(ApproverRole::new("").is_err());
        assert!(ApproverRole::new("   ").is_err());
    }

    #[test]
    fn role_rejects_too_long_name() {
        let long = "x".repeat(MAX_ROLE_LENGTH + 1);
        assert!(ApproverRole::new(long).is_err());
    }
}
