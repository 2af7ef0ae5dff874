//! Deciding which linter findings to surface.
//!
//! Linter output is read one finding per line in the `path:line[:column][: message]`
//! shape produced by eslint's `unix` formatter and most compiler-style tools.

use nom::{
    IResult, Parser,
    bytes::complete::take_till1,
    character::complete::{self, char},
    combinator::{all_consuming, opt, rest},
    sequence::preceded,
};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::store::ChangedRangeStore;

/// One finding reported by a linter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file_path: String,
    pub line: u32,
    pub column: Option<u32>,
    pub message: String,
}

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    /// Parse a `path:line[:column][: message]` line
    ///
    /// ```
    /// use lint_scope::Diagnostic;
    ///
    /// let diagnostic = Diagnostic::parse("src/app.js:10:5: Missing semicolon. [Error/semi]").unwrap();
    /// assert_eq!(diagnostic.file_path, "src/app.js");
    /// assert_eq!(diagnostic.line, 10);
    /// assert_eq!(diagnostic.column, Some(5));
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        diagnostic(line).ok().map(|(_, diagnostic)| diagnostic)
    }

    /// Rewrite the path to be relative to `root`, matching the paths git reports
    #[must_use]
    pub fn relative_to(mut self, root: &Path) -> Self {
        self.file_path = normalize_path(&self.file_path, root);
        self
    }

    /// Severity from the trailing `[Error/rule]` or `[Warning/rule]` tag.
    ///
    /// Findings without a recognised tag count as errors.
    pub fn severity(&self) -> Severity {
        let tag = self
            .message
            .strip_suffix(']')
            .and_then(|message| message.rsplit_once('['))
            .map(|(_, tag)| tag.split('/').next().unwrap_or(tag));

        match tag {
            Some(tag) if tag.eq_ignore_ascii_case("warning") => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// Make `path` relative to `root` the way git prints paths.
///
/// Absolute paths under `root` lose the prefix and a leading `./` is dropped;
/// anything else is returned unchanged.
pub fn normalize_path(path: &str, root: &Path) -> String {
    if let Ok(relative) = Path::new(path).strip_prefix(root) {
        return relative.to_string_lossy().into_owned();
    }
    let mut path = path;
    while let Some(stripped) = path.strip_prefix("./") {
        path = stripped;
    }
    path.to_string()
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.line)?;
        if let Some(column) = self.column {
            write!(f, ":{}", column)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

fn diagnostic(input: &str) -> IResult<&str, Diagnostic> {
    all_consuming((
        take_till1(|c: char| c == ':'),
        preceded(char(':'), complete::u32),
        opt(preceded(char(':'), complete::u32)),
        opt(preceded(char(':'), rest)),
    ))
    .map(
        |(file_path, line, column, message): (&str, u32, Option<u32>, Option<&str>)| Diagnostic {
            file_path: file_path.to_string(),
            line,
            column,
            message: message.unwrap_or_default().trim().to_string(),
        },
    )
    .parse(input)
}

/// How much of a change set gets linted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LintMode {
    /// Changed files only, and only findings on changed lines
    #[default]
    Changed,
    /// Changed files only, every finding in them
    Entire,
    /// Every file, every finding; git is never consulted
    All,
}

impl LintMode {
    /// Mode selected by the `--all` and `--entire` flags; `--all` wins
    pub fn from_flags(all: bool, entire: bool) -> Self {
        match (all, entire) {
            (true, _) => LintMode::All,
            (false, true) => LintMode::Entire,
            (false, false) => LintMode::Changed,
        }
    }

    /// Whether this mode needs the changed files at all
    pub fn uses_changes(self) -> bool {
        self != LintMode::All
    }
}

/// The files and lines a lint run reports on.
#[derive(Debug, Clone, Default)]
pub struct LintScope {
    mode: LintMode,
    files: HashSet<String>,
    store: ChangedRangeStore,
}

impl LintScope {
    /// Scope that reports everything
    pub fn all() -> Self {
        Self {
            mode: LintMode::All,
            ..Self::default()
        }
    }

    /// Scope over the resolved changed `files` and their ranges
    pub fn new<I>(mode: LintMode, files: I, store: ChangedRangeStore) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            mode,
            files: files.into_iter().collect(),
            store,
        }
    }

    pub fn mode(&self) -> LintMode {
        self.mode
    }

    /// Whether `diagnostic` should be reported.
    ///
    /// `Entire` checks the resolved file list, so a changed file whose diffs
    /// could not be read is still reported in full.
    pub fn admits(&self, diagnostic: &Diagnostic) -> bool {
        match self.mode {
            LintMode::Changed => should_report(diagnostic, &self.store),
            LintMode::Entire => self.files.contains(&diagnostic.file_path),
            LintMode::All => true,
        }
    }
}

/// Quiet-mode filter: report only findings on changed lines.
///
/// Findings in files without recorded changes are suppressed.
pub fn should_report(diagnostic: &Diagnostic, store: &ChangedRangeStore) -> bool {
    store.contains_line(&diagnostic.file_path, diagnostic.line)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::LineRange;
    use similar_asserts::assert_eq;

    fn store() -> ChangedRangeStore {
        let mut store = ChangedRangeStore::new();
        store.add_ranges("src/app.js", LineRange::new(10, 12));
        store.add_ranges("src/untracked.js", []);
        store
    }

    fn at(file_path: &str, line: u32) -> Diagnostic {
        Diagnostic {
            file_path: file_path.to_string(),
            line,
            column: None,
            message: String::new(),
        }
    }

    fn with_message(message: &str) -> Diagnostic {
        Diagnostic {
            message: message.to_string(),
            ..at("a.js", 1)
        }
    }

    #[test]
    fn parse_unix_format() {
        let diagnostic = Diagnostic::parse(
            "src/app.js:10:5: Missing semicolon. [Error/semi]",
        )
        .unwrap();
        assert_eq!(
            diagnostic,
            Diagnostic {
                file_path: "src/app.js".to_string(),
                line: 10,
                column: Some(5),
                message: "Missing semicolon. [Error/semi]".to_string(),
            }
        );
    }

    #[test]
    fn parse_message_containing_colons() {
        let diagnostic = Diagnostic::parse("a.js:3:1: Unexpected token: ':'").unwrap();
        assert_eq!(diagnostic.message, "Unexpected token: ':'");
    }

    #[test]
    fn parse_without_column_or_message() {
        assert_eq!(Diagnostic::parse("a.js:7").unwrap(), at("a.js", 7));

        let diagnostic = Diagnostic::parse("a.js:7: no column").unwrap();
        assert_eq!(diagnostic.column, None);
        assert_eq!(diagnostic.message, "no column");
    }

    #[test]
    fn parse_rejects_other_lines() {
        assert_eq!(Diagnostic::parse(""), None);
        assert_eq!(Diagnostic::parse("3 problems"), None);
        assert_eq!(Diagnostic::parse("a.js:seven: oops"), None);
        assert_eq!(Diagnostic::parse("a.js:7 trailing"), None);
        assert_eq!(Diagnostic::parse(":7:1: no path"), None);
    }

    #[test]
    fn render_round_trip() {
        let line = "src/app.js:10:5: Missing semicolon.";
        assert_eq!(Diagnostic::parse(line).unwrap().to_string(), line);
    }

    #[test]
    fn relative_to_repo_root() {
        let diagnostic = at("/work/repo/src/app.js", 1).relative_to(Path::new("/work/repo"));
        assert_eq!(diagnostic.file_path, "src/app.js");

        let diagnostic = at("./src/app.js", 1).relative_to(Path::new("/work/repo"));
        assert_eq!(diagnostic.file_path, "src/app.js");

        let diagnostic = at("/elsewhere/app.js", 1).relative_to(Path::new("/work/repo"));
        assert_eq!(diagnostic.file_path, "/elsewhere/app.js");
    }

    #[test]
    fn normalize_path_forms_agree() {
        let root = Path::new("/work/repo");
        assert_eq!(normalize_path("app.js", root), "app.js");
        assert_eq!(normalize_path("./app.js", root), "app.js");
        assert_eq!(normalize_path("././app.js", root), "app.js");
        assert_eq!(normalize_path("/work/repo/app.js", root), "app.js");
    }

    #[test]
    fn severity_from_eslint_tag() {
        assert_eq!(
            with_message("Missing semicolon. [Error/semi]").severity(),
            Severity::Error
        );
        assert_eq!(
            with_message("Unexpected console. [Warning/no-console]").severity(),
            Severity::Warning
        );
        assert_eq!(with_message("Parsing error [Warning]").severity(), Severity::Warning);
    }

    #[test]
    fn untagged_findings_are_errors() {
        assert_eq!(with_message("").severity(), Severity::Error);
        assert_eq!(with_message("x is [unused]").severity(), Severity::Error);
    }

    #[test]
    fn quiet_filter_reports_changed_lines_only() {
        let store = store();
        assert!(!should_report(&at("src/app.js", 9), &store));
        assert!(should_report(&at("src/app.js", 10), &store));
        assert!(should_report(&at("src/app.js", 12), &store));
        assert!(!should_report(&at("src/app.js", 13), &store));
        assert!(!should_report(&at("never-seen.js", 1), &store));
    }

    #[test]
    fn entire_scope_reports_whole_changed_files() {
        let files = ["src/app.js", "src/untracked.js"].map(String::from);
        let scope = LintScope::new(LintMode::Entire, files, store());
        assert!(scope.admits(&at("src/app.js", 400)));
        assert!(scope.admits(&at("src/untracked.js", 1)));
        assert!(!scope.admits(&at("other.js", 1)));
    }

    #[test]
    fn entire_scope_keeps_files_without_ranges() {
        // Both diffs failed, so the store knows nothing about the file
        let scope = LintScope::new(
            LintMode::Entire,
            ["broken.js".to_string()],
            ChangedRangeStore::new(),
        );
        assert!(scope.admits(&at("broken.js", 3)));
    }

    #[test]
    fn changed_scope_uses_ranges() {
        let scope = LintScope::new(LintMode::Changed, ["src/app.js".to_string()], store());
        assert!(scope.admits(&at("src/app.js", 11)));
        assert!(!scope.admits(&at("src/app.js", 40)));
    }

    #[test]
    fn all_scope_reports_everything() {
        let scope = LintScope::all();
        assert_eq!(scope.mode(), LintMode::All);
        assert!(scope.admits(&at("anything.js", 1)));
    }

    #[test]
    fn mode_from_flags() {
        assert_eq!(LintMode::from_flags(false, false), LintMode::Changed);
        assert_eq!(LintMode::from_flags(false, true), LintMode::Entire);
        assert_eq!(LintMode::from_flags(true, false), LintMode::All);
        assert_eq!(LintMode::from_flags(true, true), LintMode::All);
        assert!(!LintMode::All.uses_changes());
        assert!(LintMode::Changed.uses_changes());
        assert!(LintMode::Entire.uses_changes());
    }
}
