//! End-to-end workflow over the set of changed ranges.
//!
//! One run walks `START → diff → ranges → per-range format jobs → preview or
//! apply`. Each format job brackets the file with scope sentinels, hands the
//! copy to the formatter, strips the sentinels from its output and reconciles
//! the result into a patch. Jobs are independent and sequential; a formatter
//! rejection skips its range only, everything else aborts the run.
//!
//! Patches are computed against the original file content. Two overlapping
//! ranges in one file can therefore conflict once the first patch is applied;
//! overlap is deliberately not detected or resolved.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::ranges::{ChangeRange, extract_ranges};
use crate::reconcile::{Patch, reconcile};
use crate::scope;
use crate::tools::{FormatterRun, ToolRefs};
use crate::{Config, JobError, RestyleError, WorkflowMode};

/// Why a range produced no patch despite the formatter being consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The formatter exited non-zero on the scoped copy, e.g. because the
    /// bracketed span is a construct it cannot parse in isolation
    FormatterRejected { status: Option<i32> },
}

/// A non-empty patch for one range.
#[derive(Debug, Clone)]
pub struct FormatResult {
    pub range: ChangeRange,
    pub patch: Patch,
}

/// Tagged outcome of one format job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// Formatter produced a real difference
    Changed(FormatResult),
    /// Formatter agreed with the existing style
    Unchanged { range: ChangeRange },
    /// Range abandoned; the run continues
    Skipped {
        range: ChangeRange,
        reason: SkipReason,
    },
}

/// Aggregate result of a run.
#[derive(Debug)]
pub struct RunReport {
    /// Per-range outcomes, in diff order
    pub outcomes: Vec<JobOutcome>,
    /// Whether any non-empty patch was seen
    pub changed: bool,
}

impl RunReport {
    /// Process exit code: 1 when preview found discrepancies, else 0.
    pub fn exit_code(&self, mode: WorkflowMode) -> u8 {
        match mode {
            WorkflowMode::Preview if self.changed => 1,
            _ => 0,
        }
    }
}

/// Drives one preview or apply run over a repository checkout.
pub struct Workflow<'a> {
    config: &'a Config,
    root: &'a Path,
    tools: ToolRefs<'a>,
}

impl<'a> Workflow<'a> {
    pub fn new(config: &'a Config, root: &'a Path, tools: ToolRefs<'a>) -> Self {
        Workflow {
            config,
            root,
            tools,
        }
    }

    /// Run the full pipeline and return the aggregate report.
    ///
    /// Fails before any external call when `root` is not the toplevel of a
    /// git repository. In preview mode every non-empty patch is printed
    /// colorized, followed by rebase advice when anything differed. In apply
    /// mode patches are piped to the patch utility in place; with `rewrite`
    /// set, successful interactive staging is followed by a squash-marked
    /// commit and a hard reset of the residue.
    pub fn run(&self) -> Result<RunReport, RestyleError> {
        if !self.root.join(".git").exists() {
            return Err(RestyleError::NotARepository);
        }

        let diff = self.tools.diff.diff(&self.config.base_revision)?;
        let ranges = extract_ranges(&diff, &self.config.suffixes);

        let mut outcomes = Vec::with_capacity(ranges.len());
        for range in &ranges {
            outcomes.push(self.run_job(range)?);
        }
        let changed = outcomes
            .iter()
            .any(|o| matches!(o, JobOutcome::Changed(_)));

        match self.config.mode {
            WorkflowMode::Preview => {
                for outcome in &outcomes {
                    if let JobOutcome::Changed(result) = outcome {
                        println!("{}", result.patch.colorized());
                    }
                }
                if changed {
                    print_rebase_advice(&self.config.base_revision);
                }
            }
            WorkflowMode::Apply => {
                for outcome in &outcomes {
                    if let JobOutcome::Changed(result) = outcome {
                        let target = self.root.join(&result.range.file);
                        self.tools.applier.apply(&target, result.patch.unified())?;
                    }
                }
                if self.config.rewrite && self.tools.stager.stage_interactive()? {
                    self.tools.stager.commit_squash()?;
                    self.tools.stager.reset_hard()?;
                }
            }
        }

        Ok(RunReport { outcomes, changed })
    }

    /// One format job: scoped copy → formatter → strip → reconcile.
    ///
    /// The scoped copy is a named temp file deleted on every exit path,
    /// including formatter rejection. The suffix of the source file is kept
    /// so the formatter can detect the language.
    fn run_job(&self, range: &ChangeRange) -> Result<JobOutcome, JobError> {
        let path = self.root.join(&range.file);
        let original = fs::read_to_string(&path).map_err(|e| JobError::ReadFailed {
            file: range.file.clone(),
            message: e.to_string(),
        })?;

        let scoped = scope::bracket(&original, range);
        let suffix = Path::new(&range.file)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let tmp = tempfile::Builder::new()
            .prefix("restyle-")
            .suffix(&suffix)
            .tempfile()
            .and_then(|mut tmp| {
                tmp.write_all(scoped.as_bytes())?;
                tmp.flush()?;
                Ok(tmp)
            })
            .map_err(|e| JobError::ScopedCopyFailed {
                file: range.file.clone(),
                message: e.to_string(),
            })?;

        let outcome = match self.tools.formatter.format(tmp.path())? {
            FormatterRun::Rejected { status } => JobOutcome::Skipped {
                range: range.clone(),
                reason: SkipReason::FormatterRejected { status },
            },
            FormatterRun::Output(output) => {
                let candidate = scope::strip(&output);
                match reconcile(&range.file, &original, &candidate) {
                    Some(patch) => JobOutcome::Changed(FormatResult {
                        range: range.clone(),
                        patch,
                    }),
                    None => JobOutcome::Unchanged {
                        range: range.clone(),
                    },
                }
            }
        };

        tmp.close().map_err(|e| JobError::ScopedCopyFailed {
            file: range.file.clone(),
            message: e.to_string(),
        })?;

        Ok(outcome)
    }
}

/// Follow-up instructions after a preview found discrepancies.
fn print_rebase_advice(base: &str) {
    println!(
        "\nIssue the following commands in your local tree to apply the suggested changes:\n\n    \
         $ git rebase {base} --exec \"git-restyle --rewrite\"\n    \
         $ git rebase --autosquash {base}\n\n\
         Don't trust the formatter unconditionally.\n"
    );
}
