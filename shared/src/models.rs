/// Data model shared by the downloader and the scheduler.
use chrono::NaiveDate;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::errors::FetchError;
use crate::resolver::format_cli_date;

/// One request to archive a programme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Programme date. `None` means today, resolved when the download starts.
    pub target_date: Option<NaiveDate>,
    pub destination_dir: PathBuf,
    /// File stem without extension.
    pub base_filename: String,
}

impl DownloadRequest {
    pub fn new(destination_dir: impl Into<PathBuf>, base_filename: impl Into<String>) -> Self {
        Self {
            target_date: None,
            destination_dir: destination_dir.into(),
            base_filename: base_filename.into(),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    /// Reject filenames that would escape the destination directory.
    pub fn validate(&self) -> Result<(), FetchError> {
        let name = self.base_filename.as_str();
        if name.trim().is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name == "."
            || name == ".."
        {
            return Err(FetchError::InvalidFilename(name.to_string()));
        }
        Ok(())
    }

    /// Downloader argument vector (without the program itself).
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--filename".into(),
            self.base_filename.clone().into(),
            "--dest".into(),
            self.destination_dir.clone().into_os_string(),
        ];
        if let Some(date) = self.target_date {
            args.push("--data".into());
            args.push(format_cli_date(date).into());
        }
        args
    }
}

/// Concrete URL and local path for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    pub remote_url: String,
    pub local_path: PathBuf,
}

impl ResolvedResource {
    /// Sibling path the body is streamed into before the final rename.
    pub fn partial_path(&self) -> PathBuf {
        let mut name = self
            .local_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        self.local_path.with_file_name(name)
    }
}

/// Outcome of a successful download.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub local_path: PathBuf,
    pub bytes_written: u64,
}

impl FetchReport {
    pub fn size_mb(&self) -> f64 {
        self.bytes_written as f64 / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_date() {
        let req = DownloadRequest::new("/srv/downloads", "voz_brasil");
        let args: Vec<String> = req
            .to_args()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, ["--filename", "voz_brasil", "--dest", "/srv/downloads"]);
    }

    #[test]
    fn test_args_with_date() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 5).unwrap();
        let req = DownloadRequest::new("d", "f").with_date(date);
        let args = req.to_args();
        assert_eq!(args[4], "--data");
        assert_eq!(args[5], "05112024");
    }

    #[test]
    fn test_validate_filename() {
        assert!(DownloadRequest::new("d", "voz_brasil").validate().is_ok());
        assert!(DownloadRequest::new("d", "").validate().is_err());
        assert!(DownloadRequest::new("d", "../etc").validate().is_err());
        assert!(DownloadRequest::new("d", "a\\b").validate().is_err());
    }

    #[test]
    fn test_partial_path_is_sibling() {
        let res = ResolvedResource {
            remote_url: "u".into(),
            local_path: PathBuf::from("downloads/voz_brasil.mp3"),
        };
        assert_eq!(res.partial_path(), PathBuf::from("downloads/voz_brasil.mp3.part"));
    }

    #[test]
    fn test_size_mb() {
        let report = FetchReport { local_path: "x".into(), bytes_written: 3 * 1024 * 1024 };
        assert!((report.size_mb() - 3.0).abs() < f64::EPSILON);
    }
}
