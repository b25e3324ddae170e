//! Retention policy for version pruning.
//!
//! Versions younger than the retention floor must never be purged. Purging
//! older versions is an out-of-band maintenance decision, not a hot-path
//! operation, and is never atomic with approval state.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Versions younger than this many days are never pruned.
pub const RETENTION_FLOOR_DAYS: i64 = 90;

/// Policy governing which versions may be pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Minimum age, in days, before a version becomes prunable.
    retain_days: i64,
}

impl RetentionPolicy {
    /// Creates a policy. The retention window may be extended beyond the
    /// floor but never shortened below it.
    pub fn new(retain_days: i64) -> Result<Self, ValidationError> {
        if retain_days < RETENTION_FLOOR_DAYS {
            return Err(ValidationError::out_of_range(
                "retain_days",
                RETENTION_FLOOR_DAYS as i32,
                i32::MAX,
                retain_days as i32,
            ));
        }
        Ok(Self { retain_days })
    }

    /// Returns the number of retained days.
    pub fn retain_days(&self) -> i64 {
        self.retain_days
    }

    /// Versions created at or after this cutoff must be kept.
    pub fn cutoff(&self, now: Timestamp) -> Timestamp {
        now.minus_days(self.retain_days)
    }

    /// Returns true if a version created at `created_at` may be pruned.
    pub fn is_prunable(&self, created_at: &Timestamp, now: Timestamp) -> bool {
        created_at.is_before(&self.cutoff(now))
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            retain_days: RETENTION_FLOOR_DAYS,
        }
    }
}
