//! External collaborators behind capability traits.
//!
//! Every external process the pipeline touches — diff retrieval, the
//! formatter, the patch utility, commit staging — sits behind a small trait
//! so the workflow can be driven with deterministic fakes in tests. The real
//! implementations spawn `git`, `uncrustify` and `patch` as blocking child
//! processes with no timeout.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{GitCommandError, JobError};

/// Path of the uncrustify configuration, relative to the repository root.
pub const UNCRUSTIFY_CONFIG: &str = ".gitlab-ci/uncrustify.cfg";

/// Outcome of one formatter invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatterRun {
    /// Formatter succeeded; captured stdout is the candidate content
    Output(String),
    /// Formatter exited non-zero; the range is skipped, the run continues
    Rejected { status: Option<i32> },
}

/// Supplies the unified diff between a base revision and HEAD.
pub trait DiffProvider {
    fn diff(&self, base: &str) -> Result<String, GitCommandError>;
}

/// Runs the external code-style tool against a scoped copy.
pub trait Formatter {
    /// A non-zero formatter exit maps to [`FormatterRun::Rejected`]; only a
    /// failure to run the tool at all is an error.
    fn format(&self, scoped: &Path) -> Result<FormatterRun, JobError>;
}

/// Applies a unified diff to a working file in place.
pub trait PatchApplier {
    fn apply(&self, file: &Path, patch: &str) -> Result<(), JobError>;
}

/// Interactive staging and squash-commit creation after an apply run.
pub trait CommitStager {
    /// Stage changes interactively; `Ok(false)` means staging was declined
    /// or failed, and the commit step is skipped.
    fn stage_interactive(&self) -> Result<bool, GitCommandError>;
    /// Create a commit marked to be squashed into the current commit.
    fn commit_squash(&self) -> Result<(), GitCommandError>;
    /// Discard unstaged residue after the squash commit.
    fn reset_hard(&self) -> Result<(), GitCommandError>;
}

/// The real tool set rooted at a repository checkout.
pub struct Tools {
    diff: GitDiff,
    formatter: Uncrustify,
    applier: SystemPatch,
    stager: GitSquash,
}

impl Tools {
    pub fn system(root: &Path) -> Self {
        Tools {
            diff: GitDiff::new(root),
            formatter: Uncrustify::new(root),
            applier: SystemPatch::new(),
            stager: GitSquash::new(root),
        }
    }

    pub fn as_refs(&self) -> ToolRefs<'_> {
        ToolRefs {
            diff: &self.diff,
            formatter: &self.formatter,
            applier: &self.applier,
            stager: &self.stager,
        }
    }
}

/// Borrowed trait objects handed to the workflow; tests substitute fakes.
#[derive(Clone, Copy)]
pub struct ToolRefs<'a> {
    pub diff: &'a dyn DiffProvider,
    pub formatter: &'a dyn Formatter,
    pub applier: &'a dyn PatchApplier,
    pub stager: &'a dyn CommitStager,
}

/// `git diff` with zero context plus full function context, so each changed
/// region is bounded by its enclosing unit.
pub struct GitDiff {
    root: PathBuf,
}

impl GitDiff {
    pub fn new(root: &Path) -> Self {
        GitDiff {
            root: root.to_path_buf(),
        }
    }
}

impl DiffProvider for GitDiff {
    fn diff(&self, base: &str) -> Result<String, GitCommandError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args([
                "diff",
                "--no-ext-diff",
                "--no-color",
                "-U0",
                "--function-context",
            ])
            .arg(base)
            .arg("HEAD")
            .output()
            .map_err(|e| GitCommandError::DiffFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitCommandError::DiffExitError {
                stderr: stderr.into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| GitCommandError::InvalidUtf8 {
            message: e.to_string(),
        })
    }
}

/// uncrustify invoked on a scoped copy, output captured from stdout.
pub struct Uncrustify {
    config: PathBuf,
}

impl Uncrustify {
    pub fn new(root: &Path) -> Self {
        Uncrustify {
            config: root.join(UNCRUSTIFY_CONFIG),
        }
    }
}

impl Formatter for Uncrustify {
    fn format(&self, scoped: &Path) -> Result<FormatterRun, JobError> {
        let output = Command::new("uncrustify")
            .arg("-c")
            .arg(&self.config)
            .arg("-f")
            .arg(scoped)
            .output()
            .map_err(|e| JobError::FormatterSpawnFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Ok(FormatterRun::Rejected {
                status: output.status.code(),
            });
        }

        String::from_utf8(output.stdout)
            .map(FormatterRun::Output)
            .map_err(|e| JobError::FormatterOutputInvalid {
                message: e.to_string(),
            })
    }
}

/// The `patch` utility, fed a unified diff on stdin.
pub struct SystemPatch;

impl SystemPatch {
    pub fn new() -> Self {
        SystemPatch
    }
}

impl Default for SystemPatch {
    fn default() -> Self {
        SystemPatch::new()
    }
}

impl PatchApplier for SystemPatch {
    fn apply(&self, file: &Path, patch: &str) -> Result<(), JobError> {
        use std::io::Write;

        let mut child = Command::new("patch")
            .arg(file)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| JobError::ApplySpawnFailed {
                message: e.to_string(),
            })?;

        child
            .stdin
            .take()
            .ok_or(JobError::ApplyStdinFailed)?
            .write_all(patch.as_bytes())
            .map_err(|e| JobError::ApplyWriteFailed {
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .map_err(|e| JobError::ApplyWaitFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JobError::ApplyExitError {
                stderr: stderr.into_owned(),
            });
        }

        Ok(())
    }
}

/// Squash-commit plumbing: `git add -p`, `git commit --squash`, `git reset`.
pub struct GitSquash {
    root: PathBuf,
}

impl GitSquash {
    pub fn new(root: &Path) -> Self {
        GitSquash {
            root: root.to_path_buf(),
        }
    }
}

impl CommitStager for GitSquash {
    fn stage_interactive(&self) -> Result<bool, GitCommandError> {
        // Inherited stdio: the hunk selection is a human-interactive step
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["add", "-p"])
            .status()
            .map_err(|e| GitCommandError::StageFailed {
                message: e.to_string(),
            })?;
        Ok(status.success())
    }

    fn commit_squash(&self) -> Result<(), GitCommandError> {
        // Exit status ignored: an empty staging area is not an error here
        Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["commit", "--squash", "HEAD", "-C", "HEAD"])
            .stdout(Stdio::null())
            .status()
            .map_err(|e| GitCommandError::CommitFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn reset_hard(&self) -> Result<(), GitCommandError> {
        Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["reset", "--hard"])
            .stdout(Stdio::null())
            .status()
            .map_err(|e| GitCommandError::ResetFailed {
                message: e.to_string(),
            })?;
        Ok(())
    }
}
