//! Insertion report: every added line of a diff, grouped by file.
//!
//! The report is produced lazily, one output line at a time, so the
//! printer can stream it straight to stdout.

use crate::models::diff::FileDiff;

/// Header line introducing a file's insertions.
pub fn file_header(path: &str) -> String {
    format!("+++++++++++ {path} ++++++++++++")
}

/// Lazily yield the report lines for `files`.
///
/// For each file: the header, the content of every added line across all
/// hunks in order, a blank separator, and a blank line between files.
/// Lines carry no trailing newline.
pub fn insertion_report(files: &[FileDiff]) -> impl Iterator<Item = String> + '_ {
    files.iter().flat_map(|file| {
        std::iter::once(file_header(&file.new_path))
            .chain(
                file.hunks
                    .iter()
                    .flat_map(|h| h.added())
                    .map(|line| line.content.clone()),
            )
            .chain([String::new(), String::new()])
    })
}

/// Render the whole report as a single string, one line per entry.
pub fn render_insertions(files: &[FileDiff]) -> String {
    insertion_report(files).fold(String::new(), |mut out, line| {
        out.push_str(&line);
        out.push('\n');
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parser::parse_unified_diff;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_hunk_example() {
        let diff = "diff --git a/f.txt b/f.txt\n--- a/f.txt\n+++ b/f.txt\n@@ -1,2 +1,2 @@\n+foo\n-bar\n baz\n";
        let files = parse_unified_diff(diff).unwrap();
        assert_eq!(
            render_insertions(&files),
            "+++++++++++ f.txt ++++++++++++\nfoo\n\n\n"
        );
    }

    #[test]
    fn joins_insertions_across_hunks_in_order() {
        let diff = "diff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n@@ -1,1 +1,2 @@\n x\n+one\n@@ -10,1 +11,3 @@\n y\n+two\n+three\n";
        let files = parse_unified_diff(diff).unwrap();
        let lines: Vec<String> = insertion_report(&files).collect();
        assert_eq!(
            lines,
            vec![
                "+++++++++++ a.rs ++++++++++++",
                "one",
                "two",
                "three",
                "",
                "",
            ]
        );
    }

    #[test]
    fn file_without_insertions_prints_only_header_and_separators() {
        let diff = "diff --git a/gone.rs b/gone.rs\ndeleted file mode 100644\n--- a/gone.rs\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-a\n-b\n";
        let files = parse_unified_diff(diff).unwrap();
        assert_eq!(
            render_insertions(&files),
            "+++++++++++ /dev/null ++++++++++++\n\n\n"
        );
    }

    #[test]
    fn multiple_files_each_get_a_section() {
        let diff = "--- a/x\n+++ b/x\n@@ -0,0 +1 @@\n+X\n--- a/y\n+++ b/y\n@@ -0,0 +1 @@\n+Y\n";
        let files = parse_unified_diff(diff).unwrap();
        assert_eq!(
            render_insertions(&files),
            "+++++++++++ x ++++++++++++\nX\n\n\n+++++++++++ y ++++++++++++\nY\n\n\n"
        );
    }

    #[test]
    fn empty_diff_renders_nothing() {
        assert_eq!(render_insertions(&[]), "");
    }
}
