//! Static HTML change report.
//!
//! The report lists the four classification lists in a fixed order (changed,
//! removed, new, missing), each as a table of `file://` links. It renders a
//! [`Comparison`] as given and never re-derives classification.

use crate::compare::Comparison;
use crate::error::Result;
use crate::storage::RepositoryStore;
use crate::utils::{escape_html, file_url};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the report inside the report directory
pub const REPORT_FILE: &str = "report.htm";

const REPORT_STYLE: &str = "\
body { font-family: 'Courier New', Courier, monospace; min-width: 1024px; }
table { border-collapse: collapse; margin-bottom: 2em; }
th, td { border: 1px solid; padding: 2px 6px; text-align: left; }
a:link { color: #4b5cc3; text-decoration: none; }
a:visited { color: #a0a0a0; text-decoration: none; }
a:hover { color: #4b5cc3; text-decoration: underline; }
";

/// Render the report page for `comparison`.
#[must_use]
pub fn render_report(comparison: &Comparison, generated_at: DateTime<Local>) -> String {
    let mut html = String::new();

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Differences report</title>\n<style>\n{REPORT_STYLE}</style>\n</head>\n<body>\n\
         <p>Generated {}</p>\n",
        escape_html(&generated_at.format("%Y-%m-%d %H:%M:%S").to_string())
    );

    // Changed
    section_header(
        &mut html,
        "Changed files",
        comparison.changed.len(),
        &["Modified file", "Original file (from repository)", "Differences"],
    );
    for changed in &comparison.changed {
        let modified = changed
            .current_copy
            .as_deref()
            .unwrap_or(&changed.source_path);
        let diff_cell = changed
            .diff_path
            .as_deref()
            .map_or_else(|| "&nbsp;".to_string(), |p| link(p, "View differences"));

        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{diff_cell}</td></tr>",
            link(modified, &changed.source_path.display().to_string()),
            path_link(&changed.snapshot_path),
        );
    }
    section_footer(&mut html);

    // Removed
    section_header(
        &mut html,
        "Removed files",
        comparison.removed.len(),
        &["Removed file", "Original file (from repository)"],
    );
    for removed in &comparison.removed {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td></tr>",
            path_link(&removed.source_path),
            path_link(&removed.snapshot_path),
        );
    }
    section_footer(&mut html);

    single_column_section(&mut html, "New files", "New file", &comparison.new);
    single_column_section(&mut html, "Missing files", "Missing file", &comparison.missing);

    html.push_str("</body>\n</html>\n");
    html
}

/// Render and write the report into the store's report directory.
///
/// # Errors
///
/// Returns an error if the report file cannot be written.
pub fn write_report(store: &RepositoryStore, comparison: &Comparison) -> Result<PathBuf> {
    let path = store.report_path();
    std::fs::write(&path, render_report(comparison, Local::now()))?;
    debug!(report = %path.display(), "Report written");
    Ok(path)
}

fn section_header(html: &mut String, title: &str, count: usize, columns: &[&str]) {
    let _ = writeln!(html, "<h3>{} ({count})</h3>\n<table>", escape_html(title));
    html.push_str("<tr>");
    for column in columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr>\n<tbody>\n");
}

fn section_footer(html: &mut String) {
    html.push_str("</tbody>\n</table>\n");
}

fn single_column_section(html: &mut String, title: &str, column: &str, paths: &[PathBuf]) {
    section_header(html, title, paths.len(), &[column]);
    for path in paths {
        let _ = writeln!(html, "<tr><td>{}</td></tr>", path_link(path));
    }
    section_footer(html);
}

fn path_link(path: &Path) -> String {
    link(path, &path.display().to_string())
}

fn link(target: &Path, text: &str) -> String {
    format!(
        "<a href=\"{}\">{}</a>",
        escape_html(&file_url(target)),
        escape_html(text)
    )
}
