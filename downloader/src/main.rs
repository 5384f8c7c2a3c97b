/// Voz do Brasil downloader
///
/// Fetches the programme for one day from the EBC archive and stores it as
/// `<dest>/<filename>.mp3`. Exit code 0 on success, 1 on download failure,
/// 2 on invalid arguments.
mod fetch;

use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use fetch::Fetcher;
use vozbr_shared::errors::FetchError;
use vozbr_shared::models::{DownloadRequest, FetchReport};
use vozbr_shared::resolver::{parse_target_date, ArchiveUrl, DEFAULT_BASE_URL};

#[derive(Debug, Parser)]
#[command(
    name = "vozbr-downloader",
    version,
    about = "Download the A Voz do Brasil programme",
    after_help = "Examples:\n  vozbr-downloader --filename voz_brasil --dest ./downloads\n  vozbr-downloader --filename programa --dest /srv/radio --data 05112024"
)]
struct Cli {
    /// Base file name, without extension
    #[arg(long)]
    filename: String,

    /// Directory the file is saved in (created if missing)
    #[arg(long)]
    dest: PathBuf,

    /// Programme date as DDMMYYYY; defaults to today
    #[arg(long, value_name = "DDMMYYYY", value_parser = parse_target_date)]
    data: Option<NaiveDate>,

    /// Archive root URL
    #[arg(long, env = "VOZBR_BASE_URL", default_value = DEFAULT_BASE_URL, hide_default_value = true)]
    base_url: String,
}

impl Cli {
    fn request(&self) -> DownloadRequest {
        let request = DownloadRequest::new(&self.dest, &self.filename);
        match self.data {
            Some(date) => request.with_date(date),
            None => request,
        }
    }
}

async fn run(cli: &Cli) -> Result<FetchReport, FetchError> {
    let fetcher = Fetcher::new(ArchiveUrl::new(&cli.base_url))?;
    fetcher.fetch(&cli.request(), Local::now().date_naive()).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the report the scheduler captures.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vozbr_downloader=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(report) => {
            println!("Download complete, saved as {}", report.local_path.display());
            println!("File size: {:.2} MB", report.size_mb());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error downloading file: {}", e);
            if e.is_not_published() {
                eprintln!("The programme for this date has not been published yet.");
            }
            ExitCode::from(e.exit_code())
        }
    }
}
