/// Maps a programme date to its archive URL and local file.
///
/// The EBC archive publishes one file per business day under
/// `{root}/{year}/{month}/{DD-MM-YY}-a-voz-do-brasil.mp3`, where the month
/// is not zero-padded.
use chrono::{Datelike, NaiveDate};
use std::path::Path;

use crate::errors::FetchError;
use crate::models::{DownloadRequest, ResolvedResource};

/// Archive root used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://audios.ebc.com.br/radiogov";

/// File suffix appended after the date segment.
pub const PROGRAMME_SUFFIX: &str = "a-voz-do-brasil";

/// Extension of downloaded files.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Date format accepted on the command line.
const CLI_DATE_FORMAT: &str = "%d%m%Y";

/// URL builder for the programme archive.
#[derive(Debug, Clone)]
pub struct ArchiveUrl {
    base_url: String,
}

impl Default for ArchiveUrl {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ArchiveUrl {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Remote URL for a programme date.
    pub fn url_for(&self, date: NaiveDate) -> String {
        format!(
            "{}/{}/{}/{}-{}.{}",
            self.base_url,
            date.year(),
            date.month(),
            date_segment(date),
            PROGRAMME_SUFFIX,
            AUDIO_EXTENSION,
        )
    }

    /// Resolve a request against a concrete date.
    ///
    /// `today` is used when the request carries no date of its own.
    pub fn resolve(
        &self,
        request: &DownloadRequest,
        today: NaiveDate,
    ) -> Result<ResolvedResource, FetchError> {
        request.validate()?;
        let date = request.target_date.unwrap_or(today);
        Ok(ResolvedResource {
            remote_url: self.url_for(date),
            local_path: local_path(&request.destination_dir, &request.base_filename),
        })
    }
}

/// `DD-MM-YY` segment embedded in the archive file name.
pub fn date_segment(date: NaiveDate) -> String {
    date.format("%d-%m-%y").to_string()
}

fn local_path(dir: &Path, base_filename: &str) -> std::path::PathBuf {
    dir.join(format!("{}.{}", base_filename, AUDIO_EXTENSION))
}

/// Parse a `DDMMYYYY` command-line date.
///
/// Exactly eight ASCII digits are required; chrono alone would accept
/// unpadded fields.
pub fn parse_target_date(raw: &str) -> Result<NaiveDate, FetchError> {
    let raw = raw.trim();
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FetchError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, CLI_DATE_FORMAT)
        .map_err(|_| FetchError::InvalidDate(raw.to_string()))
}

/// Inverse of [`parse_target_date`].
pub fn format_cli_date(date: NaiveDate) -> String {
    date.format(CLI_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_date_url() {
        let url = ArchiveUrl::default().url_for(ymd(2024, 11, 5));
        assert_eq!(
            url,
            "https://audios.ebc.com.br/radiogov/2024/11/05-11-24-a-voz-do-brasil.mp3"
        );
    }

    #[test]
    fn test_month_not_padded_but_segment_is() {
        let url = ArchiveUrl::default().url_for(ymd(2025, 3, 7));
        assert!(url.contains("/2025/3/07-03-25-"));
    }

    #[test]
    fn test_segments_follow_date_across_year() {
        let mut date = ymd(2023, 12, 25);
        let archive = ArchiveUrl::new("http://localhost/root/");
        for _ in 0..20 {
            let url = archive.url_for(date);
            let expected = format!(
                "http://localhost/root/{}/{}/{}-a-voz-do-brasil.mp3",
                date.year(),
                date.month(),
                date_segment(date)
            );
            assert_eq!(url, expected);
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_resolve_defaults_to_today() {
        let req = DownloadRequest::new("./downloads", "voz_brasil");
        let res = ArchiveUrl::default().resolve(&req, ymd(2024, 11, 5)).unwrap();
        assert!(res.remote_url.ends_with("/2024/11/05-11-24-a-voz-do-brasil.mp3"));
        assert_eq!(res.local_path, PathBuf::from("./downloads/voz_brasil.mp3"));
    }

    #[test]
    fn test_resolve_prefers_request_date() {
        let req = DownloadRequest::new("d", "f").with_date(ymd(2024, 1, 2));
        let res = ArchiveUrl::default().resolve(&req, ymd(2024, 11, 5)).unwrap();
        assert!(res.remote_url.ends_with("/2024/1/02-01-24-a-voz-do-brasil.mp3"));
    }

    #[test]
    fn test_resolve_rejects_empty_filename() {
        let req = DownloadRequest::new("d", "");
        assert!(matches!(
            ArchiveUrl::default().resolve(&req, ymd(2024, 11, 5)),
            Err(FetchError::InvalidFilename(_))
        ));
    }

    #[test]
    fn test_parse_cli_date() {
        assert_eq!(parse_target_date("05112024").unwrap(), ymd(2024, 11, 5));
        assert_eq!(format_cli_date(ymd(2024, 11, 5)), "05112024");
    }

    #[test]
    fn test_parse_rejects_bad_dates() {
        for raw in ["2024-11-05", "5112024", "31022024", "", "0511202a", "051120245"] {
            assert!(
                matches!(parse_target_date(raw), Err(FetchError::InvalidDate(_))),
                "accepted {raw:?}"
            );
        }
    }
}
