//! Monthly plain-text summary export.
//!
//! # Responsibility
//! - Render one calendar month of log rows into the `YYYYMM.txt` format.
//! - Write the file into a caller-configured export directory.
//!
//! # Invariants
//! - Rows arrive pre-sorted (date DESC, `sort_order ASC`); rendering groups
//!   consecutive rows of the same date.
//! - No file is written for an empty month.
//! - This is a convenience artifact; nothing reads it back.

use crate::repo::log_repo::MonthRow;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 50;

/// Derives the `YYYY-MM` query prefix from a full date.
pub fn month_prefix(date: &str) -> &str {
    if date.len() >= 7 {
        &date[..7]
    } else {
        date
    }
}

/// Derives the export file name (`YYYYMM.txt`) from a full date.
pub fn month_file_name(date: &str) -> String {
    let compact: String = date.chars().filter(|c| *c != '-').take(6).collect();
    format!("{compact}.txt")
}

/// Renders the month summary text from pre-sorted rows.
pub fn render_month(rows: &[MonthRow]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let mut current_date: Option<&str> = None;
    let mut position = 0usize;

    for row in rows {
        if current_date != Some(row.date.as_str()) {
            if current_date.is_some() {
                out.push('\n');
            }
            out.push_str(&format!("{rule}\nDATE: {}\n{rule}\n", row.date));
            current_date = Some(row.date.as_str());
            position = 0;
        }

        position += 1;
        let status = if row.is_done { "[v]" } else { "[ ]" };
        let tag_str = if row.tags.is_empty() {
            String::new()
        } else {
            format!(" (#{})", row.tags)
        };
        out.push_str(&format!("{position}. {status} {}{tag_str}\n", row.title));
        if !row.content.is_empty() {
            out.push_str(&format!("   Note: {}\n", row.content));
        }
    }

    if !rows.is_empty() {
        out.push('\n');
    }
    out
}

/// Writes the summary for the month containing `date`.
///
/// Returns the written path, or `None` when the month has no rows.
///
/// # Side effects
/// - Creates `export_dir` when absent.
/// - Emits `month_export` logging events.
pub fn write_month_summary(
    export_dir: impl AsRef<Path>,
    date: &str,
    rows: &[MonthRow],
) -> io::Result<Option<PathBuf>> {
    if rows.is_empty() {
        info!("event=month_export module=export status=skipped reason=empty_month");
        return Ok(None);
    }

    let export_dir = export_dir.as_ref();
    std::fs::create_dir_all(export_dir)?;
    let target = export_dir.join(month_file_name(date));
    std::fs::write(&target, render_month(rows))?;
    info!(
        "event=month_export module=export status=ok rows={} target={}",
        rows.len(),
        target.display()
    );
    Ok(Some(target))
}

#[cfg(test)]
mod tests {
    use super::{month_file_name, month_prefix, render_month};
    use crate::repo::log_repo::MonthRow;

    fn row(date: &str, title: &str, tags: &str, content: &str, is_done: bool) -> MonthRow {
        MonthRow {
            date: date.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.to_string(),
            is_done,
        }
    }

    #[test]
    fn month_prefix_and_file_name_derive_from_date() {
        assert_eq!(month_prefix("2024-05-01"), "2024-05");
        assert_eq!(month_file_name("2024-05-01"), "202405.txt");
    }

    #[test]
    fn render_groups_by_date_and_numbers_items() {
        let rows = vec![
            row("2024-05-02", "later", "", "", true),
            row("2024-05-01", "first", "rust", "note body", false),
            row("2024-05-01", "second", "", "", true),
        ];
        let text = render_month(&rows);

        assert!(text.contains("DATE: 2024-05-02"));
        assert!(text.contains("1. [v] later"));
        assert!(text.contains("DATE: 2024-05-01"));
        assert!(text.contains("1. [ ] first (#rust)"));
        assert!(text.contains("   Note: note body"));
        assert!(text.contains("2. [v] second"));
    }

    #[test]
    fn render_is_empty_for_no_rows() {
        assert!(render_month(&[]).is_empty());
    }
}
