use error_set::error_set;

pub mod config;
pub mod diff;
pub mod filter;
pub mod git;
pub mod resolver;
pub mod status;
pub mod store;

pub use config::{Config, ConfigError};
pub use diff::{LineRange, parse_hunks};
pub use filter::{Diagnostic, LintMode, LintScope, Severity, normalize_path, should_report};
pub use git::Git;
pub use resolver::{ChangeSetResolver, ChangeSource};
pub use status::MatchFilterOptions;
pub use store::ChangedRangeStore;

error_set! {
    /// Top-level error for lint-scope operations
    LintScopeError := {
        #[display("Failed to read linter output: {message}")]
        ReadInput { message: String },
        #[display("Failed to write output: {message}")]
        WriteOutput { message: String },
        ConfigError(ConfigError),
    } || GitCommandError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git {command}: {message}")]
        SpawnFailed { command: String, message: String },
        #[display("git {command} failed: {stderr}")]
        ExitError { command: String, stderr: String },
        #[display("Invalid UTF-8 in git {command} output: {message}")]
        InvalidUtf8 { command: String, message: String },
    }
}
