//! Sentinel bracketing of source files for scoped reformatting.
//!
//! uncrustify honors `*INDENT-OFF*`/`*INDENT-ON*` comment markers and leaves
//! everything between OFF and ON exactly as written. [`bracket`] inserts the
//! markers so that only a [`ChangeRange`] is open for rewriting; [`strip`]
//! removes them from the formatter's output. The pair must round-trip
//! byte-for-byte: any residual sentinel leaking into a patch is a bug.

use crate::ranges::ChangeRange;

/// Sentinel closing the formatting scope (uncrustify syntax).
pub const SCOPE_OFF: &str = "/** *INDENT-OFF* **/";
/// Sentinel opening the formatting scope (uncrustify syntax).
pub const SCOPE_ON: &str = "/** *INDENT-ON* **/";

/// Produce a copy of `content` with only `range` open for reformatting.
///
/// When the range starts past line 1, the copy opens with [`SCOPE_OFF`] and
/// [`SCOPE_ON`] is inserted immediately before line `start`; when it starts
/// at line 1 the head of the file is already in scope and both are omitted.
/// [`SCOPE_OFF`] is inserted after line `end - 1` unless the range runs to
/// the end of the file. All original lines are copied verbatim.
pub fn bracket(content: &str, range: &ChangeRange) -> String {
    let total = content.split_inclusive('\n').count() as u32;
    let mut out = String::with_capacity(content.len() + 64);

    if range.start > 1 {
        out.push_str(SCOPE_OFF);
        out.push('\n');
    }

    for (i, line) in content.split_inclusive('\n').enumerate() {
        let line_no = i as u32 + 1;
        if range.start > 1 && line_no == range.start {
            out.push_str(SCOPE_ON);
            out.push('\n');
        }
        out.push_str(line);
        if line_no + 1 == range.end && line_no < total {
            out.push_str(SCOPE_OFF);
            out.push('\n');
        }
    }

    out
}

/// Remove every line that is exactly a scope sentinel.
///
/// All other lines keep their order and content byte-for-byte, including a
/// missing final newline.
pub fn strip(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| {
            let body = line.strip_suffix('\n').unwrap_or(line);
            body != SCOPE_ON && body != SCOPE_OFF
        })
        .collect()
}
