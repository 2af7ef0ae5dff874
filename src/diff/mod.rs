//! Changed-line extraction from `git diff -U0` output.
//!
//! Only hunk headers are consulted; body lines are ignored. With zero context
//! lines every hunk covers exactly the lines that changed, so the new-file side
//! of each header is the range a linter finding has to fall into.
//!
//! ```
//! use lint_scope::diff::{LineRange, parse_hunks};
//!
//! let diff = "@@ -10,2 +10,2 @@\n-old\n-old\n+new\n+new\n@@ -5,0 +6 @@\n+added\n";
//! assert_eq!(
//!     parse_hunks(diff),
//!     vec![LineRange::new(10, 12).unwrap(), LineRange::new(6, 6).unwrap()]
//! );
//! ```

pub mod hunk;

pub use hunk::HunkHeader;

use std::fmt;

/// Inclusive range of new-file line numbers touched by one hunk.
///
/// Always satisfies `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    start: u32,
    end: u32,
}

impl LineRange {
    /// Returns `None` unless `1 <= start <= end`
    #[must_use]
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Collect the changed range of every hunk header in `diff_text`, in order.
///
/// Malformed headers are skipped so that one odd hunk only costs precision for
/// that hunk instead of the whole file.
#[must_use]
pub fn parse_hunks(diff_text: &str) -> Vec<LineRange> {
    diff_text
        .lines()
        .filter(|line| line.starts_with("@@"))
        .filter_map(HunkHeader::parse)
        .filter_map(|header| header.changed_range())
        .collect()
}
