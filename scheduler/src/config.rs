/// Scheduler configuration read from the environment (and `.env`).
use chrono::NaiveTime;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use vozbr_shared::errors::{VozError, VozResult};

/// Name of the scheduler log file inside the log directory.
pub const LOG_FILE_NAME: &str = "voz_brasil_scheduler.log";

const DEFAULT_TRIGGER_TIME: &str = "20:30";
const DEFAULT_FILENAME: &str = "voz_brasil";
const DEFAULT_POLL_SECS: u64 = 60;
const DOWNLOADER_BIN: &str = "vozbr-downloader";

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Working directory of the downloader; anchors the other defaults.
    pub project_dir: PathBuf,
    pub download_dir: PathBuf,
    pub log_dir: PathBuf,
    pub fetcher_bin: PathBuf,
    /// Extra arguments placed before the request arguments.
    pub fetcher_args: Vec<OsString>,
    pub filename: String,
    pub trigger_time: NaiveTime,
    pub poll_interval: Duration,
}

impl SchedulerConfig {
    pub fn from_env() -> VozResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> VozResult<Self> {
        let project_dir = match lookup("VOZBR_PROJECT_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        let download_dir = lookup("VOZBR_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_dir.join("downloads"));
        let log_dir = lookup("VOZBR_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| project_dir.join("logs"));

        let fetcher_bin = match lookup("VOZBR_FETCHER_BIN") {
            Some(bin) => PathBuf::from(bin),
            None => default_fetcher_bin()?,
        };
        let fetcher_args = lookup("VOZBR_FETCHER_ARGS")
            .map(|raw| raw.split_whitespace().map(OsString::from).collect())
            .unwrap_or_default();

        let filename = lookup("VOZBR_FILENAME").unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        if filename.trim().is_empty() {
            return Err(VozError::Config("VOZBR_FILENAME must not be empty".into()));
        }

        let trigger_time = parse_trigger_time(
            &lookup("VOZBR_TRIGGER_TIME").unwrap_or_else(|| DEFAULT_TRIGGER_TIME.to_string()),
        )?;

        let poll_secs = match lookup("VOZBR_POLL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    VozError::Config(format!(
                        "VOZBR_POLL_SECS must be a positive integer, got {:?}",
                        raw
                    ))
                })?,
            None => DEFAULT_POLL_SECS,
        };

        Ok(Self {
            project_dir,
            download_dir,
            log_dir,
            fetcher_bin,
            fetcher_args,
            filename,
            trigger_time,
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

/// The downloader binary installed next to the scheduler.
fn default_fetcher_bin() -> VozResult<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.with_file_name(format!("{}{}", DOWNLOADER_BIN, std::env::consts::EXE_SUFFIX)))
}

/// Parse an `HH:MM` time of day.
pub fn parse_trigger_time(raw: &str) -> VozResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| VozError::Config(format!("Invalid trigger time {:?}: expected HH:MM", raw)))
}
