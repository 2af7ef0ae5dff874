//! Resolution of the change set for one lint run.
//!
//! [`ChangeSetResolver`] turns status output into candidate files and fills a
//! [`ChangedRangeStore`] from their staged and unstaged diffs. Diffs for every
//! file are requested at once and awaited together on the current task; the
//! store is only touched after all of them have finished.

use futures::future::join_all;
use std::future::Future;

use crate::GitCommandError;
use crate::diff::{self, LineRange};
use crate::status::{self, MatchFilterOptions};
use crate::store::ChangedRangeStore;

/// Where status and diff text come from.
pub trait ChangeSource {
    /// Porcelain status of the working tree
    fn status(&self) -> impl Future<Output = Result<String, GitCommandError>>;

    /// Unified diff of one file, against the index (`staged == false`) or
    /// against `HEAD` for staged changes
    fn diff(
        &self,
        file_path: &str,
        staged: bool,
        context_lines: u32,
    ) -> impl Future<Output = Result<String, GitCommandError>>;
}

/// Builds the change set of a working tree from a [`ChangeSource`].
pub struct ChangeSetResolver<S> {
    source: S,
    options: MatchFilterOptions,
    context_lines: u32,
    store: ChangedRangeStore,
}

impl<S: ChangeSource> ChangeSetResolver<S> {
    /// Create a resolver that requests diffs without context lines
    pub fn new(source: S, options: MatchFilterOptions) -> Self {
        Self {
            source,
            options,
            context_lines: 0,
            store: ChangedRangeStore::new(),
        }
    }

    /// Override the number of context lines requested per diff
    #[must_use]
    pub fn with_context_lines(mut self, context_lines: u32) -> Self {
        self.context_lines = context_lines;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Candidate files listed in `status_text`
    pub fn resolve_changed_files(&self, status_text: &str) -> Vec<String> {
        status::changed_files(status_text, &self.options)
    }

    /// Query the source for its status and resolve the candidate files.
    ///
    /// Without status output there is nothing to lint, so a failure here is
    /// returned rather than absorbed.
    pub async fn changed_files(&self) -> Result<Vec<String>, GitCommandError> {
        let status_text = self.source.status().await?;
        let files = self.resolve_changed_files(&status_text);
        tracing::debug!(count = files.len(), "resolved changed files");
        Ok(files)
    }

    /// Rebuild the store from the unstaged and staged diffs of `file_paths`.
    ///
    /// Returns once every one of the `2 * file_paths.len()` diffs has either
    /// been parsed or failed. Failed diffs are logged and contribute nothing.
    pub async fn load_changed_ranges<P>(&mut self, file_paths: &[P]) -> &ChangedRangeStore
    where
        P: AsRef<str>,
    {
        self.store.reset();

        let source = &self.source;
        let context_lines = self.context_lines;
        let fetches = file_paths.iter().flat_map(move |path| {
            let path: &str = path.as_ref();
            [false, true].map(move |staged| fetch_ranges(source, path, staged, context_lines))
        });

        let results = join_all(fetches).await;
        let attempted = results.len();
        let mut failed = 0;

        for result in results {
            match result {
                Some((path, ranges)) => self.store.add_ranges(path, ranges),
                None => failed += 1,
            }
        }

        tracing::info!(
            files = file_paths.len(),
            attempted,
            failed,
            "loaded changed ranges"
        );
        &self.store
    }

    /// Ranges from the most recent [`load_changed_ranges`](Self::load_changed_ranges)
    pub fn store(&self) -> &ChangedRangeStore {
        &self.store
    }

    pub fn into_store(self) -> ChangedRangeStore {
        self.store
    }
}

/// Fetch and parse one diff; `None` when the source failed
async fn fetch_ranges<'a, S: ChangeSource>(
    source: &S,
    path: &'a str,
    staged: bool,
    context_lines: u32,
) -> Option<(&'a str, Vec<LineRange>)> {
    match source.diff(path, staged, context_lines).await {
        Ok(text) => {
            let ranges = diff::parse_hunks(&text);
            tracing::debug!(path, staged, ranges = ranges.len(), "parsed diff");
            Some((path, ranges))
        }
        Err(e) => {
            tracing::warn!(path, staged, error = %e, "skipping diff");
            None
        }
    }
}
