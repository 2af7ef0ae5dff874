//! Selection of candidate files from `git status --porcelain` rows.
//!
//! A porcelain row starts with two status codes (staged, unstaged) followed by
//! the path:
//!
//! ```text
//!  M src/app.js
//! D  old.js
//! ?? temp.txt
//! ```

use regex::RegexBuilder;
use std::collections::BTreeSet;

/// Filtering applied to every status row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchFilterOptions {
    /// Single-letter status codes that disqualify a row, compared case-insensitively
    pub exclude_statuses: BTreeSet<char>,
    /// Pattern searched case-insensitively in the whole row
    pub filter: Option<String>,
}

impl MatchFilterOptions {
    pub fn new<I>(exclude_statuses: I, filter: Option<String>) -> Self
    where
        I: IntoIterator<Item = char>,
    {
        Self {
            exclude_statuses: exclude_statuses
                .into_iter()
                .map(|code| code.to_ascii_uppercase())
                .collect(),
            filter,
        }
    }

    fn excludes(&self, code: char) -> bool {
        let code = code.to_ascii_uppercase();
        self.exclude_statuses
            .iter()
            .any(|excluded| excluded.to_ascii_uppercase() == code)
    }
}

/// Check whether a status row is a lint candidate.
///
/// Rows shorter than the two status columns never match. A row is rejected if
/// either status code is excluded; otherwise it matches when there is no
/// filter or the filter finds a match anywhere in the row.
pub fn matches(status_row: &str, options: &MatchFilterOptions) -> bool {
    let mut codes = status_row.chars();
    let (Some(staged), Some(unstaged)) = (codes.next(), codes.next()) else {
        return false;
    };

    if options.excludes(staged) || options.excludes(unstaged) {
        return false;
    }

    let Some(pattern) = options.filter.as_deref() else {
        return true;
    };

    // Built per call; the pattern is the only input that matters here
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => regex.is_match(status_row),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "invalid status filter, rejecting row");
            false
        }
    }
}

/// Path of a status row: its last whitespace-separated token.
///
/// Paths containing spaces come back truncated to their final segment.
pub fn row_path(status_row: &str) -> Option<&str> {
    status_row.split_whitespace().last()
}

/// Paths of every matching row in a full `git status --porcelain` output.
pub fn changed_files(status_text: &str, options: &MatchFilterOptions) -> Vec<String> {
    status_text
        .lines()
        .filter(|row| matches(row, options))
        .filter_map(row_path)
        .map(str::to_string)
        .collect()
}
