//! Reconciliation of formatter output into minimal patches.
//!
//! Compares the original file with the stripped formatter candidate and, when
//! they differ, renders the difference twice: a machine-applicable unified
//! diff for the apply workflow and a colorized form for preview. The
//! comparison is purely textual.

use colored::Colorize;
use similar::{ChangeTag, TextDiff};

/// A non-empty stylistic difference for one file.
#[derive(Debug, Clone)]
pub struct Patch {
    /// Path as named by the diff
    pub file: String,
    unified: String,
    colorized: String,
}

impl Patch {
    /// Machine-applicable unified diff (`patch`-compatible, context 3)
    pub fn unified(&self) -> &str {
        &self.unified
    }

    /// Human-readable rendering with colors and tab markers
    pub fn colorized(&self) -> &str {
        &self.colorized
    }
}

/// Diff `original` against the formatter `candidate`.
///
/// Returns `None` when the formatter agreed with the existing style; the
/// range then contributes nothing to the run.
pub fn reconcile(file: &str, original: &str, candidate: &str) -> Option<Patch> {
    if original == candidate {
        return None;
    }

    let diff = TextDiff::from_lines(original, candidate);
    let old_header = format!("a/{file}");
    let new_header = format!("b/{file}");
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string();
    let colorized = render_colorized(file, &diff);

    Some(Patch {
        file: file.to_string(),
        unified,
        colorized,
    })
}

/// Render a unified diff with colors, in the style of `diff -up --color`.
///
/// Changed lines get their tabs marked with `↦` so indentation-only
/// differences stay visible.
fn render_colorized(file: &str, diff: &TextDiff<'_, '_, '_, str>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", format!("--- a/{file}").bold()));
    out.push_str(&format!("{}\n", format!("+++ b/{file}").bold()));

    for group in diff.grouped_ops(3) {
        let first = &group[0];
        let last = &group[group.len() - 1];
        let header = format!(
            "@@ -{},{} +{},{} @@",
            first.old_range().start + 1,
            last.old_range().end - first.old_range().start,
            first.new_range().start + 1,
            last.new_range().end - first.new_range().start,
        );
        out.push_str(&format!("{}\n", header.cyan()));

        for op in &group {
            for change in diff.iter_changes(op) {
                let value = change.value();
                let line = value.strip_suffix('\n').unwrap_or(value);
                match change.tag() {
                    ChangeTag::Equal => {
                        out.push_str(&format!(" {line}\n"));
                    }
                    ChangeTag::Delete => {
                        out.push_str(&format!("{}\n", format!("-{}", mark_tabs(line)).red()));
                    }
                    ChangeTag::Insert => {
                        out.push_str(&format!("{}\n", format!("+{}", mark_tabs(line)).green()));
                    }
                }
            }
        }
    }

    out
}

fn mark_tabs(line: &str) -> String {
    line.replace('\t', "↦\t")
}
