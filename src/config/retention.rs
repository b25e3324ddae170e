//! Version retention configuration

use serde::Deserialize;

use crate::domain::version::{RetentionPolicy, RETENTION_FLOOR_DAYS};

use super::error::ValidationError;

/// Retention configuration for the version store
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Minimum age, in days, before a version becomes prunable
    #[serde(default = "default_retain_days")]
    pub retain_days: i64,
}

impl RetentionConfig {
    /// Validate retention configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.retain_days < RETENTION_FLOOR_DAYS {
            return Err(ValidationError::RetentionBelowFloor(RETENTION_FLOOR_DAYS));
        }
        Ok(())
    }

    /// Build the domain policy from this configuration.
    pub fn policy(&self) -> Result<RetentionPolicy, ValidationError> {
        RetentionPolicy::new(self.retain_days)
            .map_err(|_| ValidationError::RetentionBelowFloor(RETENTION_FLOOR_DAYS))
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            retain_days: default_retain_days(),
        }
    }
}

fn default_retain_days() -> i64 {
    RETENTION_FLOOR_DAYS
}
