use clap::{CommandFactory, Parser, Subcommand};
use lint_scope::{
    ChangeSetResolver, ChangeSource, Config, Diagnostic, Git, LintMode, LintScope,
    LintScopeError, Severity, normalize_path,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "lint-scope")]
#[command(about = "Restrict linter findings to the lines changed in a git working tree")]
struct Cli {
    /// Repository to inspect
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Config file (defaults to lint-scope.toml in the repository)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List changed files that should be linted
    Files,
    /// Show changed line ranges (e.g., src/app.js:10-12)
    Ranges {
        /// Inspect this file instead of everything in git status
        #[arg(long)]
        path: Option<String>,
    },
    /// Filter linter output read from stdin (e.g., `eslint -f unix`)
    Filter {
        /// Report every finding in changed files
        #[arg(long, conflicts_with = "all")]
        entire: bool,
        /// Report every finding without consulting git
        #[arg(long)]
        all: bool,
        /// Restrict to this file instead of everything in git status
        #[arg(long, conflicts_with = "all")]
        path: Option<String>,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Render the man page
    Man,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("lint-scope: {e}");
            ExitCode::from(2)
        }
    }
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::prelude::*;

    let default_filter = if verbose { "lint_scope=debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode, LintScopeError> {
    let config = Config::discover(&cli.repo, cli.config.as_deref())?;
    let mut resolver = ChangeSetResolver::new(Git::new(&cli.repo), config.match_options())
        .with_context_lines(config.context_lines);

    match cli.command {
        Commands::Files => {
            for file in resolver.changed_files().await? {
                println!("{file}");
            }
        }
        Commands::Ranges { path } => {
            let root = repo_root(resolver.source()).await;
            load(&mut resolver, &root, path).await?;
            for (file, ranges) in resolver.store().files() {
                for range in ranges {
                    println!("{file}:{range}");
                }
            }
        }
        Commands::Filter { entire, all, path } => {
            let mode = LintMode::from_flags(all, entire);
            let root = repo_root(resolver.source()).await;

            let scope = if mode.uses_changes() {
                let files = load(&mut resolver, &root, path).await?;
                LintScope::new(mode, files, resolver.into_store())
            } else {
                LintScope::all()
            };

            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .map_err(|e| LintScopeError::ReadInput {
                    message: e.to_string(),
                })?;

            let report = filter_output(&input, &root, &scope, &mut io::stdout().lock())
                .map_err(|e| LintScopeError::WriteOutput {
                    message: e.to_string(),
                })?;
            tracing::info!(
                reported = report.reported,
                errors = report.errors,
                ?mode,
                "filtered linter output"
            );

            return Ok(report.exit_code());
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "lint-scope", &mut io::stdout());
        }
        Commands::Man => {
            clap_mangen::Man::new(Cli::command())
                .render(&mut io::stdout())
                .map_err(|e| LintScopeError::WriteOutput {
                    message: e.to_string(),
                })?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Directory that status paths are relative to
async fn repo_root(git: &Git) -> PathBuf {
    match git.toplevel().await {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!(error = %e, "no git top level, using --repo");
            tokio::fs::canonicalize(git.repo_path())
                .await
                .unwrap_or_else(|_| git.repo_path().to_path_buf())
        }
    }
}

/// Load ranges for one explicit path, or for every changed file in git status.
///
/// Returns the files the store was loaded for, with `path` normalised against
/// `root` so it lines up with diagnostic paths.
async fn load<S: ChangeSource>(
    resolver: &mut ChangeSetResolver<S>,
    root: &Path,
    path: Option<String>,
) -> Result<Vec<String>, LintScopeError> {
    let files = match path {
        Some(path) => vec![normalize_path(&path, root)],
        None => resolver.changed_files().await?,
    };
    resolver.load_changed_ranges(&files).await;
    Ok(files)
}

/// Counts from one pass over linter output
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Report {
    reported: usize,
    errors: usize,
}

impl Report {
    /// Warnings are reported but never fail the run
    fn fails(self) -> bool {
        self.errors > 0
    }

    fn exit_code(self) -> ExitCode {
        if self.fails() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Write the linter output lines that `scope` admits and count the findings.
///
/// Lines that are not findings (headers, summaries) are passed through.
fn filter_output(
    input: &str,
    root: &Path,
    scope: &LintScope,
    out: &mut impl Write,
) -> io::Result<Report> {
    let mut report = Report::default();
    for line in input.lines() {
        if let Some(diagnostic) = Diagnostic::parse(line) {
            let diagnostic = diagnostic.relative_to(root);
            if !scope.admits(&diagnostic) {
                continue;
            }
            report.reported += 1;
            if diagnostic.severity() == Severity::Error {
                report.errors += 1;
            }
        }
        writeln!(out, "{line}")?;
    }
    Ok(report)
}
