//! Logging Infrastructure
//!
//! Structured logging setup for development and production. Console
//! output always; daily-rotating file output when a log directory is
//! configured. The `reconciliation` target is emitted at ERROR level and
//! is what operational alerting should key on.

use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Clean up rotated log files older than 14 days.
///
/// The daily appender writes `checkout-server.YYYY-MM-DD`; anything with
/// a date before the cutoff is removed.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(14);

    if !log_dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && let Some(date_part) = name.strip_prefix("checkout-server.")
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(())
}

/// Initialize the logger from `RUST_LOG` (default `info`)
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or("info")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    // Add file output if log_dir is provided and exists
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "checkout-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_removes_only_dated_files_past_the_cutoff() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("checkout-server.2020-01-01");
        let recent = dir
            .path()
            .join(format!("checkout-server.{}", chrono::Utc::now().date_naive()));
        let unrelated = dir.path().join("access.log");
        for f in [&old, &recent, &unrelated] {
            fs::write(f, b"line").unwrap();
        }

        cleanup_old_logs(dir.path()).unwrap();

        assert!(!old.exists());
        assert!(recent.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn cleanup_of_a_missing_directory_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(cleanup_old_logs(&missing).is_ok());
    }
}
