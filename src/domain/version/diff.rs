//! Line-level diff between two stored bodies.
//!
//! Pure function over two texts: the result is the set of line additions and
//! deletions that turn `from` into `to`, computed from a longest-common-
//! subsequence alignment. Identical inputs always produce an empty diff.

use serde::{Deserialize, Serialize};

use super::VersionNumber;

/// One changed line in a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffLine {
    /// Line present in `to` but not in `from`. `line_number` is its 1-based
    /// position in `to`.
    Added { line_number: usize, text: String },
    /// Line present in `from` but not in `to`. `line_number` is its 1-based
    /// position in `from`.
    Removed { line_number: usize, text: String },
}

/// Diff between two versions of the same content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDiff {
    pub from: VersionNumber,
    pub to: VersionNumber,
    pub lines: Vec<DiffLine>,
}

impl VersionDiff {
    /// Creates a diff result.
    pub fn new(from: VersionNumber, to: VersionNumber, lines: Vec<DiffLine>) -> Self {
        Self { from, to, lines }
    }

    /// Returns true when the two bodies were identical.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of added lines.
    pub fn additions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Added { .. }))
            .count()
    }

    /// Number of removed lines.
    pub fn deletions(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, DiffLine::Removed { .. }))
            .count()
    }
}

/// Computes the line-level edit set turning `from` into `to`.
pub fn diff_bodies(from: &str, to: &str) -> Vec<DiffLine> {
    let from_lines: Vec<&str> = from.lines().collect();
    let to_lines: Vec<&str> = to.lines().collect();

    let common = lcs_table(&from_lines, &to_lines);
    let mut changes = Vec::new();
    let (mut i, mut j) = (from_lines.len(), to_lines.len());

    // Walk the table backwards, collecting removals and additions.
    let mut reversed = Vec::new();
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && from_lines[i - 1] == to_lines[j - 1] {
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || common[i][j - 1] >= common[i - 1][j]) {
            reversed.push(DiffLine::Added {
                line_number: j,
                text: to_lines[j - 1].to_string(),
            });
            j -= 1;
        } else {
            reversed.push(DiffLine::Removed {
                line_number: i,
                text: from_lines[i - 1].to_string(),
            });
            i -= 1;
        }
    }
    changes.extend(reversed.into_iter().rev());
    changes
}

/// Builds the LCS length table for two line slices.
fn lcs_table(a: &[&str], b: &[&str]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, line_a) in a.iter().enumerate() {
        for (j, line_b) in b.iter().enumerate() {
            table[i + 1][j + 1] = if line_a == line_b {
                table[i][j] + 1
            } else {
                table[i][j + 1].max(table[i + 1][j])
            };
        }
    }
    table
}
