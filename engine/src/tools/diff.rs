//! Unified diff rendering for proposed file edits.
//!
//! The pipeline shows the user a diff between the current file content and
//! the model's proposal before anything is written to disk. Rendering is
//! pure text work; no filesystem access happens here.

use similar::{ChangeTag, TextDiff};

/// Number of unchanged context lines shown around each hunk.
const CONTEXT_LINES: usize = 3;

/// Renders a unified diff between `original` and `modified`.
///
/// Returns an empty string when the two inputs are identical, so callers
/// can treat "no diff" as "nothing to apply". The `--- a/` / `+++ b/`
/// header is only emitted once at least one hunk exists.
pub fn unified(original: &str, modified: &str, filename: &str) -> String {
    let diff = TextDiff::from_lines(original, modified);

    let mut output = String::new();
    let mut header = Some(format!("--- a/{}\n+++ b/{}\n", filename, filename));

    for (idx, group) in diff.grouped_ops(CONTEXT_LINES).iter().enumerate() {
        if let Some(h) = header.take() {
            output.push_str(&h);
        }
        if idx > 0 {
            output.push('\n');
        }

        let (old_start, old_count, new_start, new_count) = group.iter().fold(
            (usize::MAX, 0, usize::MAX, 0),
            |(old_start, old_count, new_start, new_count), op| {
                (
                    old_start.min(op.old_range().start),
                    old_count + op.old_range().len(),
                    new_start.min(op.new_range().start),
                    new_count + op.new_range().len(),
                )
            },
        );

        output.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_start + 1,
            old_count,
            new_start + 1,
            new_count
        ));

        for op in group {
            for change in diff.iter_changes(op) {
                let prefix = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };

                output.push_str(prefix);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }

    output
}
