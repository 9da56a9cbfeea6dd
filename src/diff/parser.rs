//! Unified diff format parser.
//!
//! Parses `git diff` output, the diff media type served by the hosting
//! API, and plain `diff -u` output into `Vec<FileDiff>`. Hunk bodies are
//! read by their declared line counts, so removed lines that happen to
//! start with `--` are never mistaken for file headers.

use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use crate::models::diff::{DEV_NULL, DiffLine, DiffLineType, FileDiff, Hunk};

use super::DiffError;

/// Parse a unified diff string into a list of file diffs.
///
/// Text outside of file sections (commit messages, mail headers) is
/// ignored. A malformed hunk header or a hunk body that does not match
/// its declared counts is an error.
pub fn parse_unified_diff(input: &str) -> Result<Vec<FileDiff>, DiffError> {
    Parser::new(input).parse()
}

/// A file section under construction.
struct PendingFile {
    diff: FileDiff,
    /// Whether the `---`/`+++` lines for this section have been read.
    has_paths: bool,
}

impl PendingFile {
    fn new(old_path: String, new_path: String) -> Self {
        Self {
            diff: FileDiff {
                old_path,
                new_path,
                is_deleted: false,
                is_binary: false,
                hunks: Vec::new(),
            },
            has_paths: false,
        }
    }

    fn finish(mut self) -> FileDiff {
        if self.diff.new_path == DEV_NULL {
            self.diff.is_deleted = true;
        }
        self.diff
    }
}

struct Parser<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
    files: Vec<FileDiff>,
    current: Option<PendingFile>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate().peekable(),
            files: Vec::new(),
            current: None,
        }
    }

    fn parse(mut self) -> Result<Vec<FileDiff>, DiffError> {
        while let Some((idx, line)) = self.lines.next() {
            if line.starts_with("diff --git ") {
                let (old_path, new_path) = parse_diff_header(line);
                self.start_file(PendingFile::new(old_path, new_path));
            } else if line.starts_with("--- ") && self.next_starts_with("+++ ") {
                let old_path = parse_file_line(&line[4..]);
                let new_line = self.lines.next().map(|(_, l)| l).unwrap_or_default();
                let new_path = parse_file_line(&new_line[4..]);

                let reuse = matches!(
                    &self.current,
                    Some(f) if !f.has_paths && f.diff.hunks.is_empty()
                );
                if !reuse {
                    self.start_file(PendingFile::new(String::new(), String::new()));
                }
                if let Some(file) = self.current.as_mut() {
                    file.diff.old_path = old_path;
                    file.diff.new_path = new_path;
                    file.has_paths = true;
                }
            } else if line.starts_with("@@") {
                let hunk = self.parse_hunk(idx, line)?;
                match self.current.as_mut() {
                    Some(file) => file.diff.hunks.push(hunk),
                    None => {
                        return Err(parse_error(idx, "hunk found before any file header"));
                    }
                }
            } else if let Some(file) = self.current.as_mut() {
                apply_extended_header(&mut file.diff, line);
            }
        }

        if let Some(file) = self.current.take() {
            self.files.push(file.finish());
        }
        Ok(self.files)
    }

    fn start_file(&mut self, file: PendingFile) {
        if let Some(done) = self.current.replace(file) {
            self.files.push(done.finish());
        }
    }

    fn next_starts_with(&mut self, prefix: &str) -> bool {
        self.lines
            .peek()
            .is_some_and(|(_, next)| next.starts_with(prefix))
    }

    /// Parse a hunk body, consuming exactly the lines its header declares.
    fn parse_hunk(&mut self, idx: usize, header_line: &str) -> Result<Hunk, DiffError> {
        let (old_start, old_count, new_start, new_count, header) =
            parse_hunk_header(header_line)
                .ok_or_else(|| parse_error(idx, &format!("invalid hunk header: {header_line}")))?;

        let mut hunk_lines: Vec<DiffLine> = Vec::new();
        let mut old_line = old_start;
        let mut new_line = new_start;
        let mut old_remaining = old_count;
        let mut new_remaining = new_count;

        while old_remaining > 0 || new_remaining > 0 {
            let Some((line_idx, line)) = self.lines.next() else {
                return Err(parse_error(idx, "unexpected end of input inside hunk"));
            };

            let (line_type, content) = if let Some(content) = line.strip_prefix('+') {
                (DiffLineType::Added, content)
            } else if let Some(content) = line.strip_prefix('-') {
                (DiffLineType::Removed, content)
            } else if let Some(content) = line.strip_prefix(' ') {
                (DiffLineType::Context, content)
            } else if line.is_empty() {
                // Some tools strip the trailing space of blank context lines
                (DiffLineType::Context, "")
            } else if line.starts_with('\\') {
                // "\ No newline at end of file"
                continue;
            } else {
                return Err(parse_error(line_idx, &format!("unexpected line in hunk: {line}")));
            };

            let (old_line_no, new_line_no) = match line_type {
                DiffLineType::Added if new_remaining > 0 => {
                    new_remaining -= 1;
                    new_line += 1;
                    (None, Some(new_line - 1))
                }
                DiffLineType::Removed if old_remaining > 0 => {
                    old_remaining -= 1;
                    old_line += 1;
                    (Some(old_line - 1), None)
                }
                DiffLineType::Context if old_remaining > 0 && new_remaining > 0 => {
                    old_remaining -= 1;
                    new_remaining -= 1;
                    old_line += 1;
                    new_line += 1;
                    (Some(old_line - 1), Some(new_line - 1))
                }
                _ => {
                    return Err(parse_error(
                        line_idx,
                        "hunk has more lines than its header declares",
                    ));
                }
            };

            hunk_lines.push(DiffLine {
                line_type,
                content: content.to_string(),
                old_line_no,
                new_line_no,
            });
        }

        // Trailing "\ No newline at end of file" after the last line
        while self.next_starts_with("\\") {
            self.lines.next();
        }

        Ok(Hunk {
            raw_header: header_line.to_string(),
            old_start,
            old_count,
            new_start,
            new_count,
            header,
            lines: hunk_lines,
        })
    }
}

fn parse_error(idx: usize, msg: &str) -> DiffError {
    DiffError::ParseError(format!("line {}: {msg}", idx + 1))
}

/// Record git extended header lines on the current file.
fn apply_extended_header(file: &mut FileDiff, line: &str) {
    if line.starts_with("new file mode") {
        file.old_path = DEV_NULL.to_string();
    } else if line.starts_with("deleted file mode") {
        file.is_deleted = true;
        file.new_path = DEV_NULL.to_string();
    } else if let Some(from) = line.strip_prefix("rename from ") {
        file.old_path = from.to_string();
    } else if let Some(to) = line.strip_prefix("rename to ") {
        file.new_path = to.to_string();
    } else if line.starts_with("Binary files") || line.starts_with("GIT binary patch") {
        file.is_binary = true;
    }
}

/// Parse the path of a `--- ` / `+++ ` line (prefix already removed).
fn parse_file_line(rest: &str) -> String {
    // `diff -u` appends a tab and a timestamp
    let path = rest.split('\t').next().unwrap_or(rest).trim_end();
    let path = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path);
    if path == DEV_NULL {
        return DEV_NULL.to_string();
    }
    strip_diff_prefix(path).to_string()
}

/// Parse the "diff --git a/path b/path" header line.
fn parse_diff_header(line: &str) -> (String, String) {
    let rest = line.strip_prefix("diff --git ").unwrap_or(line);

    // Handle paths with spaces by finding the second prefix separator.
    // Paths are prefixed with a/ and b/ (default), or c/w/i/o/ when
    // git's diff.mnemonicPrefix is enabled.
    if let Some(b_idx) = find_second_prefix(rest) {
        let old_path = strip_diff_prefix(&rest[..b_idx]).to_string();
        let new_path = strip_diff_prefix(&rest[b_idx + 1..]).to_string();
        (old_path, new_path)
    } else {
        let mut parts = rest.splitn(2, ' ');
        let old_path = strip_diff_prefix(parts.next().unwrap_or("")).to_string();
        let new_path = strip_diff_prefix(parts.next().unwrap_or("")).to_string();
        (old_path, new_path)
    }
}

/// Strip a single-character git diff prefix (`a/`, `b/`, `c/`, `w/`, `i/`, `o/`).
fn strip_diff_prefix(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2
        && bytes[1] == b'/'
        && matches!(bytes[0], b'a' | b'b' | b'c' | b'w' | b'i' | b'o')
    {
        return &path[2..];
    }
    path
}

/// Find the position of the second path prefix separator in a diff header.
fn find_second_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (1..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i] == b' '
            && bytes.get(i + 2) == Some(&b'/')
            && matches!(bytes.get(i + 1), Some(b'a' | b'b' | b'c' | b'w' | b'i' | b'o'))
    })
}

/// Parse a `@@ -old_start,old_count +new_start,new_count @@ header` line.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32, Option<String>)> {
    let line = line.strip_prefix("@@ ")?;
    let end = line.find(" @@")?;
    let range_part = &line[..end];
    let header = Some(line[end + 3..].trim())
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    let mut parts = range_part.split(' ');
    let old = parts.next()?.strip_prefix('-')?;
    let new = parts.next()?.strip_prefix('+')?;
    if parts.next().is_some() {
        return None;
    }

    let (old_start, old_count) = parse_range(old)?;
    let (new_start, new_count) = parse_range(new)?;

    Some((old_start, old_count, new_start, new_count, header))
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((s.parse().ok()?, 1))
    }
}
