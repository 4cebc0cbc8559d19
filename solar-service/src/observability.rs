use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use time::{macros::format_description, OffsetDateTime};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// `YYYY-MM-DD_HH-MM-SS.log` for the given start instant.
pub fn log_file_name(started_at: OffsetDateTime) -> anyhow::Result<String> {
    let stamp = started_at.format(format_description!(
        "[year]-[month]-[day]_[hour]-[minute]-[second]"
    ))?;
    Ok(format!("{stamp}.log"))
}

/// Create the log directory and open this run's append-only log file.
pub fn open_log_file(directory: &Path, started_at: OffsetDateTime) -> anyhow::Result<(PathBuf, fs::File)> {
    fs::create_dir_all(directory)?;
    let path = directory.join(log_file_name(started_at)?);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

const DEFAULT_FILTER: &str = "solar_service=info";

/// `RUST_LOG` directives when set and valid, `solar_service=info` otherwise.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber: stdout plus a timestamped (UTC) file under
/// `cfg.directory`. Returns the log file path.
pub fn init_tracing(cfg: &LoggingConfig) -> anyhow::Result<PathBuf> {
    let (path, file) = open_log_file(&cfg.directory, OffsetDateTime::now_utc())?;

    let filter = env_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn log_file_is_named_after_start_time() {
        let name = log_file_name(datetime!(2024-03-07 09:05:01 UTC)).unwrap();
        assert_eq!(name, "2024-03-07_09-05-01.log");
    }

    #[test]
    fn rust_log_replaces_the_default_filter() {
        let filter = env_filter(Some("solar_service=debug,sqlx=warn")).to_string();
        assert!(filter.contains("solar_service=debug"));
        assert!(filter.contains("sqlx=warn"));
        assert!(!filter.contains("solar_service=info"));
    }

    #[test]
    fn default_filter_applies_when_rust_log_is_unset_or_invalid() {
        assert_eq!(env_filter(None).to_string(), DEFAULT_FILTER);
        assert_eq!(env_filter(Some("  ")).to_string(), DEFAULT_FILTER);
        assert_eq!(env_filter(Some("solar_service=loud")).to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn open_log_file_creates_missing_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("logs");

        let (path, _file) = open_log_file(&dir, datetime!(2024-03-07 09:05:01 UTC)).unwrap();

        assert!(dir.is_dir());
        assert!(path.is_file());
        assert_eq!(path, dir.join("2024-03-07_09-05-01.log"));
    }
}
