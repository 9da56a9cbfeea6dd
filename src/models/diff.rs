//! Diff-related types: file diffs, hunks, and diff lines.

use serde::{Deserialize, Serialize};

/// Path used in place of a file name for the missing side of an
/// added or deleted file.
pub const DEV_NULL: &str = "/dev/null";

/// The type of a line in a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLineType {
    /// Line exists only in the new version (added).
    Added,
    /// Line exists only in the old version (removed).
    Removed,
    /// Line is unchanged (context).
    Context,
}

impl DiffLineType {
    /// The unified diff marker for this line type.
    pub fn marker(self) -> char {
        match self {
            DiffLineType::Added => '+',
            DiffLineType::Removed => '-',
            DiffLineType::Context => ' ',
        }
    }
}

/// A single line in a diff hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    /// The type of change.
    pub line_type: DiffLineType,
    /// The content of the line (without the leading +/-/space).
    pub content: String,
    /// Line number in the old file (None for added lines).
    pub old_line_no: Option<u32>,
    /// Line number in the new file (None for removed lines).
    pub new_line_no: Option<u32>,
}

impl DiffLine {
    /// Line number to show next to this line: the new-file number when
    /// the line exists there, otherwise the old-file number.
    pub fn line_number(&self) -> u32 {
        self.new_line_no.or(self.old_line_no).unwrap_or(0)
    }
}

/// A contiguous hunk within a file diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    /// The raw `@@ -a,b +c,d @@ ...` line that opened this hunk.
    pub raw_header: String,
    /// Starting line in the old file.
    pub old_start: u32,
    /// Number of lines in the old file.
    pub old_count: u32,
    /// Starting line in the new file.
    pub new_start: u32,
    /// Number of lines in the new file.
    pub new_count: u32,
    /// Optional hunk header text (e.g., function name).
    pub header: Option<String>,
    /// The lines in this hunk.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Iterate over the lines added by this hunk.
    pub fn added(&self) -> impl Iterator<Item = &DiffLine> {
        self.lines
            .iter()
            .filter(|l| l.line_type == DiffLineType::Added)
    }
}

/// A diff for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Path of the old file (`/dev/null` for new files).
    pub old_path: String,
    /// Path of the new file (`/dev/null` for deleted files).
    pub new_path: String,
    /// Whether this file was deleted.
    pub is_deleted: bool,
    /// Whether this is a binary file.
    pub is_binary: bool,
    /// The hunks in this diff.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// The destination path, or `None` when the file was deleted.
    pub fn destination(&self) -> Option<&str> {
        if self.is_deleted || self.new_path == DEV_NULL || self.new_path.is_empty() {
            None
        } else {
            Some(&self.new_path)
        }
    }
}
