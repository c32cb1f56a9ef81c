use super::binary::is_binary;
use crate::error::Result;
use crate::utils::escape_html;
use similar::{Algorithm, ChangeTag, TextDiff};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{Level, info, span};

/// Configuration for HTML diff fragments
#[derive(Debug, Clone, Copy)]
pub struct HtmlDiffConfig {
    /// Number of context lines around changes
    pub context_lines: usize,
    /// Diff algorithm to use (Myers, Patience)
    pub algorithm: Algorithm,
}

impl Default for HtmlDiffConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            algorithm: Algorithm::Myers,
        }
    }
}

const FRAGMENT_STYLE: &str = "body{font-family:monospace}\
table{border-collapse:collapse;width:100%}\
td{padding:0 6px;white-space:pre-wrap;vertical-align:top}\
td.ln{color:#888;text-align:right;width:1%}\
tr.del td.text{background:#fdd}\
tr.ins td.text{background:#dfd}\
tr.hunk td{background:#eef;color:#555}";

/// Render a complete HTML page showing the line diff of `old` → `new`.
///
/// Lines are numbered on both sides; unchanged lines beyond the context
/// radius are folded into hunk headers.
#[must_use]
pub fn render_html_diff(
    old: &str,
    new: &str,
    old_label: &str,
    new_label: &str,
    config: &HtmlDiffConfig,
) -> String {
    let span = span!(
        Level::DEBUG,
        "html_diff",
        path = new_label,
        algorithm = ?config.algorithm,
        context = config.context_lines
    );
    let _guard = span.enter();

    let diff = TextDiff::configure()
        .algorithm(config.algorithm)
        .diff_lines(old, new);

    let mut body = String::new();
    let mut total_changes = 0;

    for hunk in diff
        .unified_diff()
        .context_radius(config.context_lines)
        .iter_hunks()
    {
        let _ = writeln!(
            body,
            "<tr class=\"hunk\"><td class=\"ln\"></td><td class=\"ln\"></td><td class=\"text\">{}</td></tr>",
            escape_html(&hunk.header().to_string())
        );

        for change in hunk.iter_changes() {
            let (class, sign) = match change.tag() {
                ChangeTag::Delete => {
                    total_changes += 1;
                    ("del", '-')
                }
                ChangeTag::Insert => {
                    total_changes += 1;
                    ("ins", '+')
                }
                ChangeTag::Equal => ("eq", ' '),
            };
            let old_line = change.old_index().map_or_else(String::new, |i| (i + 1).to_string());
            let new_line = change.new_index().map_or_else(String::new, |i| (i + 1).to_string());
            let text = change.value().trim_end_matches(['\n', '\r']);

            let _ = writeln!(
                body,
                "<tr class=\"{class}\"><td class=\"ln\">{old_line}</td><td class=\"ln\">{new_line}</td><td class=\"text\">{sign}{}</td></tr>",
                escape_html(text)
            );
        }
    }

    info!(path = new_label, changes = total_changes, "Diff generation complete");

    if body.is_empty() {
        body.push_str("<tr><td colspan=\"3\">No line differences (whitespace or line endings only)</td></tr>\n");
    }

    page(old_label, new_label, &body)
}

/// Fragment for content that cannot be shown as text.
#[must_use]
pub fn render_binary_notice(old_label: &str, new_label: &str) -> String {
    let body = format!(
        "<tr><td colspan=\"3\">Binary files {} and {} differ</td></tr>\n",
        escape_html(old_label),
        escape_html(new_label)
    );
    page(old_label, new_label, &body)
}

fn page(old_label: &str, new_label: &str, rows: &str) -> String {
    let old_label = escape_html(old_label);
    let new_label = escape_html(new_label);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{new_label}</title>\n\
         <style>{FRAGMENT_STYLE}</style>\n</head>\n<body>\n\
         <p>--- {old_label}<br>+++ {new_label}</p>\n<table>\n{rows}</table>\n</body>\n</html>\n"
    )
}

/// Renders diff fragments for pairs of files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffRenderer {
    config: HtmlDiffConfig,
}

impl DiffRenderer {
    #[must_use]
    pub const fn new(config: HtmlDiffConfig) -> Self {
        Self { config }
    }

    /// Diff `old_path` against `new_path` and write the fragment to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error if either input cannot be read or the fragment cannot
    /// be written.
    pub fn render_files(&self, old_path: &Path, new_path: &Path, output: &Path) -> Result<()> {
        let old = std::fs::read(old_path)?;
        let new = std::fs::read(new_path)?;

        let old_label = old_path.display().to_string();
        let new_label = new_path.display().to_string();

        let html = if is_binary(&old) || is_binary(&new) {
            render_binary_notice(&old_label, &new_label)
        } else {
            render_html_diff(
                &String::from_utf8_lossy(&old),
                &String::from_utf8_lossy(&new),
                &old_label,
                &new_label,
                &self.config,
            )
        };

        std::fs::write(output, html)?;
        Ok(())
    }
}
