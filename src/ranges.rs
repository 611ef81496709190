//! Extraction of changed line ranges from git diff output.
//!
//! The input is the textual unified diff between a base revision and HEAD
//! (`git diff -U0 --function-context`). Each hunk header carries the
//! post-image span of the change; for every hunk in a recognized source file
//! one [`ChangeRange`] is emitted, in diff order.
//!
//! # Examples
//!
//! ```
//! use git_restyle::ranges::{ChangeRange, extract_ranges};
//!
//! let diff = "\
//! diff --git a/src/panel.c b/src/panel.c
//! --- a/src/panel.c
//! +++ b/src/panel.c
//! @@ -10,2 +10,5 @@ panel_init (void)
//! ";
//! let suffixes = vec![".c".to_string()];
//! assert_eq!(
//!     extract_ranges(diff, &suffixes),
//!     vec![ChangeRange {
//!         file: "src/panel.c".to_string(),
//!         start: 10,
//!         end: 15,
//!     }]
//! );
//! ```

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, u32 as line_number},
    combinator::opt,
    sequence::preceded,
};

/// File suffixes whose diff hunks are considered for reformatting.
pub const SOURCE_SUFFIXES: &[&str] = &[".c", ".h", ".vala"];

/// A post-image line span touched by one diff hunk.
///
/// `start`/`end` are 1-based and end-exclusive. Ranges are only emitted with
/// `end > start`; pure deletions leave no surviving line to reformat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRange {
    /// Path as named by the diff (relative to the repository root)
    pub file: String,
    /// First changed line
    pub start: u32,
    /// One past the last changed line
    pub end: u32,
}

/// Extract changed ranges from unified diff text.
///
/// Tracks the current file from `+++ b/<path>` headers and parses every hunk
/// header for its post-image span. Hunks of length zero are dropped, as are
/// hunks in files without a recognized suffix and hunks seen before any file
/// header. Overlapping or adjacent ranges are not merged; emission order
/// matches diff order.
pub fn extract_ranges(diff: &str, suffixes: &[String]) -> Vec<ChangeRange> {
    let mut ranges = Vec::new();
    let mut current_file: Option<&str> = None;

    for line in diff.lines() {
        if let Some(path) = line.strip_prefix("+++ b/") {
            current_file = Some(path);
        } else if line.starts_with("+++ ") {
            // Deleted file (`+++ /dev/null`) or unusual header
            current_file = None;
        } else if let Ok((_, (start, len))) = hunk_header(line) {
            if len == 0 {
                continue;
            }
            let Some(file) = current_file else {
                continue;
            };
            if suffixes.iter().any(|s| file.ends_with(s.as_str())) {
                ranges.push(ChangeRange {
                    file: file.to_string(),
                    start,
                    end: start + len,
                });
            }
        }
    }

    ranges
}

/// Parse `@@ -old[,len] +new[,len] @@` and return the post-image span.
fn hunk_header(input: &str) -> IResult<&str, (u32, u32)> {
    let (input, _) = tag("@@ -").parse(input)?;
    let (input, _) = line_span(input)?;
    let (input, _) = tag(" +").parse(input)?;
    let (input, span) = line_span(input)?;
    let (input, _) = tag(" @@").parse(input)?;
    Ok((input, span))
}

/// Parse `start[,len]`; a missing length means a single line.
fn line_span(input: &str) -> IResult<&str, (u32, u32)> {
    let (input, start) = line_number(input)?;
    let (input, len) = opt(preceded(char(','), line_number)).parse(input)?;
    Ok((input, (start, len.unwrap_or(1))))
}
