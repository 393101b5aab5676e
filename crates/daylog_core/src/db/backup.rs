//! Startup database backup.
//!
//! # Responsibility
//! - Copy the database file into a backup directory once per calendar day.
//!
//! # Invariants
//! - An existing backup for today is never overwritten.
//! - "Today" is the local calendar day, matching the user's view of when a
//!   day rolls over.
//! - Backup failure is reported to the caller but must stay non-fatal for
//!   application startup (callers log and continue).

use chrono::Local;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};

/// Copies `db_path` to `backup_dir/<stem>_backup_YYYY-MM-DD.<ext>` unless a
/// backup for today already exists.
///
/// Returns the backup path when a copy was made, `None` when skipped
/// (missing source file or backup already present).
///
/// # Side effects
/// - Creates `backup_dir` when absent.
/// - Emits `db_backup` logging events.
pub fn backup_on_startup(
    db_path: impl AsRef<Path>,
    backup_dir: impl AsRef<Path>,
) -> io::Result<Option<PathBuf>> {
    let db_path = db_path.as_ref();
    let backup_dir = backup_dir.as_ref();

    if !db_path.exists() {
        info!("event=db_backup module=db status=skipped reason=no_database");
        return Ok(None);
    }

    std::fs::create_dir_all(backup_dir)?;

    let today = Local::now().format("%Y-%m-%d").to_string();
    let target = backup_dir.join(backup_file_name(db_path, &today));
    if target.exists() {
        info!("event=db_backup module=db status=skipped reason=already_backed_up_today");
        return Ok(None);
    }

    match std::fs::copy(db_path, &target) {
        Ok(bytes) => {
            info!(
                "event=db_backup module=db status=ok bytes={} target={}",
                bytes,
                target.display()
            );
            Ok(Some(target))
        }
        Err(err) => {
            warn!(
                "event=db_backup module=db status=error error_code=copy_failed error={}",
                err
            );
            Err(err)
        }
    }
}

fn backup_file_name(db_path: &Path, date: &str) -> String {
    let stem = db_path
        .file_stem()
        .and_then(|value| value.to_str())
        .unwrap_or("daylog");
    match db_path.extension().and_then(|value| value.to_str()) {
        Some(ext) => format!("{stem}_backup_{date}.{ext}"),
        None => format!("{stem}_backup_{date}"),
    }
}

#[cfg(test)]
mod tests {
    use super::backup_file_name;
    use std::path::Path;

    #[test]
    fn backup_name_keeps_stem_and_extension() {
        let name = backup_file_name(Path::new("/data/work_logs.db"), "2024-05-01");
        assert_eq!(name, "work_logs_backup_2024-05-01.db");
    }

    #[test]
    fn backup_name_handles_missing_extension() {
        let name = backup_file_name(Path::new("/data/worklogs"), "2024-05-01");
        assert_eq!(name, "worklogs_backup_2024-05-01");
    }
}
