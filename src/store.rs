use std::collections::HashMap;

use crate::diff::LineRange;

/// Changed line ranges per file for one lint run.
///
/// Ranges are kept in the order they were added; staged and unstaged results
/// for a file accumulate in the same entry.
#[derive(Debug, Default, Clone)]
pub struct ChangedRangeStore {
    files: HashMap<String, Vec<LineRange>>,
}

impl ChangedRangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every tracked file
    pub fn reset(&mut self) {
        self.files.clear();
    }

    /// Append `ranges` to the entry for `file_path`, creating it if needed
    pub fn add_ranges<I>(&mut self, file_path: &str, ranges: I)
    where
        I: IntoIterator<Item = LineRange>,
    {
        self.files
            .entry(file_path.to_string())
            .or_default()
            .extend(ranges);
    }

    /// Whether `line_number` falls inside any changed range of `file_path`.
    ///
    /// Unknown files have no changed lines.
    #[must_use]
    pub fn contains_line(&self, file_path: &str, line_number: u32) -> bool {
        self.files
            .get(file_path)
            .is_some_and(|ranges| ranges.iter().any(|range| range.contains(line_number)))
    }

    /// Whether `file_path` has an entry, even one without ranges
    pub fn contains_file(&self, file_path: &str) -> bool {
        self.files.contains_key(file_path)
    }

    /// Ranges recorded for `file_path`, in insertion order
    pub fn ranges(&self, file_path: &str) -> &[LineRange] {
        self.files.get(file_path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tracked files and their ranges, sorted by path
    pub fn files(&self) -> Vec<(&str, &[LineRange])> {
        let mut files: Vec<_> = self
            .files
            .iter()
            .map(|(path, ranges)| (path.as_str(), ranges.as_slice()))
            .collect();
        files.sort_by_key(|(path, _)| *path);
        files
    }

    /// Number of tracked files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
