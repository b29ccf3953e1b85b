use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use log::{debug, info};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder, Proxy, Response, StatusCode};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::error::{Error, Result};

/// Callback type for reporting download progress.
/// Arguments: source URL, bytes downloaded, total bytes, MiB/s, is_complete
pub type ProgressFn = Arc<dyn Fn(&str, u64, u64, f64, bool) + Send + Sync>;

/// Downloads release archives and queries release metadata.
#[derive(Clone)]
pub struct Downloader {
    /// GitHub API URL for the latest release.
    pub api_url: String,
    /// Optional HTTP proxy URL.
    pub proxy: Option<String>,
    /// Connect and read timeout for artifact downloads.
    pub connect_timeout: Duration,
    /// Maximum number of redirect hops followed by [`Downloader::fetch`].
    pub max_redirects: usize,
    /// Optional progress callback.
    pub progress: Option<ProgressFn>,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    tag_name: String,
}

/// State of one in-flight transfer.
#[derive(Debug)]
pub struct DownloadJob {
    pub url: String,
    pub destination: PathBuf,
    /// `None` when the server omits `Content-Length`.
    pub total_bytes: Option<u64>,
    pub downloaded_bytes: u64,
}

impl Downloader {
    pub fn new(config: &Config) -> Self {
        Self {
            api_url: config.latest_release_url(),
            proxy: config.proxy.clone(),
            connect_timeout: config.connect_timeout,
            max_redirects: config.max_redirects,
            progress: config.progress.clone(),
        }
    }

    /// Build an HTTP client, optionally with proxy support.
    fn build_client(
        &self,
        configure: impl FnOnce(ClientBuilder) -> ClientBuilder,
    ) -> std::result::Result<Client, reqwest::Error> {
        let mut builder = configure(
            Client::builder().user_agent(concat!("pbfetch/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }
        builder.build()
    }

    /// Fetch the latest release tag, without its leading `v`.
    ///
    /// All failures come back as [`Error::VersionLookup`]; callers are
    /// expected to fall back rather than abort.
    pub async fn latest_version(&self) -> Result<String> {
        let lookup = |e: reqwest::Error| Error::VersionLookup(e.to_string());

        let client = self.build_client(|b| b).map_err(lookup)?;
        let resp = client
            .get(&self.api_url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(lookup)?;

        if !resp.status().is_success() {
            return Err(Error::VersionLookup(format!(
                "GitHub API returned {}",
                resp.status()
            )));
        }

        let body = resp.text().await.map_err(lookup)?;
        let release: ReleaseResponse = serde_json::from_str(&body)
            .map_err(|e| Error::VersionLookup(format!("malformed release JSON: {e}")))?;
        let version = release.tag_name.trim().trim_start_matches('v');
        if version.is_empty() {
            return Err(Error::VersionLookup(format!(
                "unusable tag name '{}'",
                release.tag_name
            )));
        }
        Ok(version.to_owned())
    }

    /// Stream `url` into `dest`, following redirects.
    ///
    /// Returns the number of bytes written. On failure the (possibly
    /// partial) destination file is removed.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        let timeout = self.connect_timeout;
        let client = self
            .build_client(|b| {
                b.connect_timeout(timeout)
                    .read_timeout(timeout)
                    .redirect(Policy::none())
            })
            .map_err(|e| Error::network(url, e))?;

        let response = self.follow_redirects(&client, url).await?;
        let mut job = DownloadJob {
            url: response.url().to_string(),
            destination: dest.to_path_buf(),
            total_bytes: response.content_length(),
            downloaded_bytes: 0,
        };

        match self.stream_to_file(response, &mut job).await {
            Ok(()) => {
                info!("Download complete: {} bytes", job.downloaded_bytes);
                Ok(job.downloaded_bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(dest).await;
                Err(e)
            }
        }
    }

    /// Issue GET requests until a non-redirect response arrives.
    async fn follow_redirects(&self, client: &Client, url: &str) -> Result<Response> {
        let mut current = url.to_owned();

        for _ in 0..=self.max_redirects {
            let response = client
                .get(&current)
                .send()
                .await
                .map_err(|e| Error::network(&current, e))?;
            let status = response.status();

            if is_redirect(status) {
                let next = redirect_target(&response).ok_or_else(|| Error::HttpStatus {
                    url: current.clone(),
                    status: status.as_u16(),
                    message: "redirect without a usable Location header".to_owned(),
                })?;
                debug!("{current} redirected ({status}) to {next}");
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(Error::HttpStatus {
                    url: current,
                    status: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_owned(),
                });
            }

            return Ok(response);
        }

        Err(Error::TooManyRedirects {
            url: url.to_owned(),
            max: self.max_redirects,
        })
    }

    async fn stream_to_file(&self, response: Response, job: &mut DownloadJob) -> Result<()> {
        let dest = job.destination.clone();
        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| Error::fs("failed to create download file", &dest, e))?;

        let start = Instant::now();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::network(&job.url, e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::fs("failed to write download data", &dest, e))?;
            job.downloaded_bytes += chunk.len() as u64;
            self.report(job, start, false);
        }

        file.flush()
            .await
            .map_err(|e| Error::fs("failed to flush download file", &dest, e))?;
        self.report(job, start, true);
        Ok(())
    }

    /// Progress is only reported when the total size is known.
    fn report(&self, job: &DownloadJob, start: Instant, complete: bool) {
        let (Some(progress), Some(total)) = (&self.progress, job.total_bytes) else {
            return;
        };
        let elapsed = start.elapsed().as_secs_f64();
        let mib_per_sec = if elapsed > 0.0 {
            (job.downloaded_bytes as f64) / (1024.0 * 1024.0) / elapsed
        } else {
            0.0
        };
        progress(&job.url, job.downloaded_bytes, total, mib_per_sec, complete);
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolve the `Location` header against the URL that produced it.
fn redirect_target(response: &Response) -> Option<String> {
    let location = response.headers().get(LOCATION)?.to_str().ok()?;
    response.url().join(location).ok().map(String::from)
}
