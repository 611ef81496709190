//! Diff-scoped selective reformatting for git trees.
//!
//! `git-restyle` computes the line ranges a commit range touched, runs an
//! external code-style tool (uncrustify) against exactly those spans, and
//! either previews the resulting patches or applies them in place. Lines the
//! developer did not change are never rewritten.
//!
//! The pipeline is strictly sequential: diff retrieval → range extraction →
//! per-range format jobs (scoped copy → formatter → marker strip → patch
//! reconciliation) → preview or apply.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//! use git_restyle::{Config, Workflow, WorkflowMode};
//! use git_restyle::tools::Tools;
//!
//! let config = Config {
//!     mode: WorkflowMode::Preview,
//!     ..Config::default()
//! };
//! let root = Path::new(".");
//! let tools = Tools::system(root);
//! let report = Workflow::new(&config, root, tools.as_refs()).run().unwrap();
//! std::process::exit(report.exit_code(config.mode).into());
//! ```

use error_set::error_set;

pub mod ranges;
pub mod reconcile;
pub mod scope;
pub mod tools;
pub mod workflow;

pub use ranges::{ChangeRange, extract_ranges};
pub use reconcile::Patch;
pub use workflow::{JobOutcome, RunReport, SkipReason, Workflow};

error_set! {
    /// Top-level error for a restyle run
    RestyleError := {
        #[display("Not in the toplevel of a git repository")]
        NotARepository,
    } || GitCommandError || JobError

    /// Errors from git command execution
    GitCommandError := {
        #[display("Failed to run git diff: {message}")]
        DiffFailed { message: String },
        #[display("git diff failed: {stderr}")]
        DiffExitError { stderr: String },
        #[display("Invalid UTF-8 in git diff output: {message}")]
        InvalidUtf8 { message: String },
        #[display("Failed to run git add -p: {message}")]
        StageFailed { message: String },
        #[display("Failed to run git commit: {message}")]
        CommitFailed { message: String },
        #[display("Failed to run git reset: {message}")]
        ResetFailed { message: String },
    }

    /// Errors from a single format job or patch application
    JobError := {
        #[display("Failed to read {file}: {message}")]
        ReadFailed { file: String, message: String },
        #[display("Failed to write scoped copy of {file}: {message}")]
        ScopedCopyFailed { file: String, message: String },
        #[display("Failed to spawn formatter: {message}")]
        FormatterSpawnFailed { message: String },
        #[display("Invalid UTF-8 in formatter output: {message}")]
        FormatterOutputInvalid { message: String },
        #[display("Failed to spawn patch: {message}")]
        ApplySpawnFailed { message: String },
        #[display("Failed to get stdin handle for patch")]
        ApplyStdinFailed,
        #[display("Failed to write patch input: {message}")]
        ApplyWriteFailed { message: String },
        #[display("Failed to wait for patch: {message}")]
        ApplyWaitFailed { message: String },
        #[display("patch failed: {stderr}")]
        ApplyExitError { stderr: String },
    }
}

/// Whether discovered patches are only reported or written back to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMode {
    /// Print colorized patches, change nothing; exit 1 when anything differs
    Preview,
    /// Apply patches to the working files in place
    Apply,
}

/// Configuration for one run, fixed at startup.
///
/// Every component receives this struct by reference; nothing reads the
/// environment or other global state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base revision for the comparison (the diff is `base..HEAD`)
    pub base_revision: String,
    /// Preview or apply
    pub mode: WorkflowMode,
    /// After applying, stage interactively and create a squash-marked commit
    pub rewrite: bool,
    /// File suffixes whose hunks are considered for reformatting
    pub suffixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_revision: "HEAD^".to_string(),
            mode: WorkflowMode::Apply,
            rewrite: false,
            suffixes: ranges::SOURCE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
