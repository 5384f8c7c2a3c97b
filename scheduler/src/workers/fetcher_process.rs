/// Downloader subprocess runner.
///
/// Each run spawns the downloader binary with the request encoded as
/// command-line arguments, waits for it to exit and captures stdout and
/// stderr. A crash in the child only surfaces as a failed run.
use std::ffi::OsString;
use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use vozbr_shared::errors::DispatchError;
use vozbr_shared::models::DownloadRequest;

/// Captured streams of a successful downloader run.
#[derive(Debug, Clone, Default)]
pub struct FetcherOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Something that can carry out a download request to completion.
pub trait FetchRunner {
    fn run(
        &self,
        request: &DownloadRequest,
    ) -> impl Future<Output = Result<FetcherOutput, DispatchError>> + Send;
}

/// Runs the downloader as a child process.
pub struct ProcessFetcher {
    /// Downloader executable.
    program: PathBuf,
    /// Arguments placed before the request arguments (wrapper commands).
    leading_args: Vec<OsString>,
    /// Working directory of the child.
    working_dir: PathBuf,
}

impl ProcessFetcher {
    pub fn new(program: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            program,
            leading_args: Vec::new(),
            working_dir,
        }
    }

    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn command(&self, request: &DownloadRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(request.to_args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl FetchRunner for ProcessFetcher {
    async fn run(&self, request: &DownloadRequest) -> Result<FetcherOutput, DispatchError> {
        info!(
            "Spawning downloader: {:?} (filename={}, dest={:?})",
            self.program, request.base_filename, request.destination_dir
        );

        let output = self.command(request).output().await.map_err(|e| {
            DispatchError::SpawnFailed(format!("{:?} in {:?}: {}", self.program, self.working_dir, e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!("Downloader exited with status: {}", output.status);

        if output.status.success() {
            Ok(FetcherOutput { stdout, stderr })
        } else {
            Err(DispatchError::FetcherFailed {
                code: output.status.code(),
                stderr,
            })
        }
    }
}
