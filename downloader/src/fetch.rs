/// Streaming HTTP download of a single programme.
///
/// The body is written to `<name>.mp3.part` next to the target and renamed
/// into place only after the last chunk is flushed. Any failure removes the
/// partial file, so `<name>.mp3` is either absent, the previous complete
/// copy, or the new complete copy.
use chrono::NaiveDate;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use vozbr_shared::errors::FetchError;
use vozbr_shared::models::{DownloadRequest, FetchReport};
use vozbr_shared::resolver::{date_segment, ArchiveUrl};

/// Write buffer size; bounds how much of the body sits in memory.
pub const CHUNK_SIZE: usize = 8192;

pub struct Fetcher {
    client: Client,
    archive: ArchiveUrl,
}

impl Fetcher {
    pub fn new(archive: ArchiveUrl) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("vozbr-downloader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, archive })
    }

    /// Download the programme described by `request`.
    ///
    /// `today` stands in for the request date when it has none.
    pub async fn fetch(
        &self,
        request: &DownloadRequest,
        today: NaiveDate,
    ) -> Result<FetchReport, FetchError> {
        let resource = self.archive.resolve(request, today)?;
        let date = request.target_date.unwrap_or(today);

        tokio::fs::create_dir_all(&request.destination_dir).await?;

        println!("Downloading programme for {}...", date_segment(date));
        info!("GET {} -> {:?}", resource.remote_url, resource.local_path);

        let partial = resource.partial_path();
        let bytes_written = match self.stream_to_file(&resource.remote_url, &partial).await {
            Ok(n) => n,
            Err(e) => {
                discard_partial(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, &resource.local_path).await {
            discard_partial(&partial).await;
            return Err(e.into());
        }

        info!("Saved {} bytes to {:?}", bytes_written, resource.local_path);
        Ok(FetchReport {
            local_path: resource.local_path,
            bytes_written,
        })
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<u64, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            debug!("Content-Length: {}", len);
        }

        let file = File::create(path).await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        Ok(written)
    }
}

async fn discard_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial file {:?}", path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove partial file {:?}: {}", path, e),
    }
}
