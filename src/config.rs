use std::path::PathBuf;
use std::time::Duration;

use crate::downloader::ProgressFn;
use crate::progress::default_progress_fn;

/// Environment variable holding the process-wide default version.
pub const VERSION_ENV: &str = "POCKETBASE_VERSION";

/// Version used when no other source yields one.
pub const FALLBACK_VERSION: &str = "0.22.0";

pub const DEFAULT_REPO: &str = "pocketbase/pocketbase";
pub const DEFAULT_BINARY_NAME: &str = "pocketbase";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// Everything the installer needs, gathered in one place.
///
/// Components never read the process environment on their own; the only
/// place that does is [`Config::from_env`].
#[derive(Clone)]
pub struct Config {
    /// Directory that receives the binary, the version marker and the
    /// transient archive.
    pub install_dir: PathBuf,
    /// GitHub repository in `owner/repo` format.
    pub repo: String,
    /// Binary name without platform extension.
    pub binary_name: String,
    /// Environment-provided default version, if any.
    pub default_version: Option<String>,
    /// Pinned version used when the latest-release lookup fails.
    pub fallback_version: String,
    /// Optional HTTP proxy URL.
    pub proxy: Option<String>,
    pub api_base_url: String,
    pub download_base_url: String,
    /// Budget for the latest-release lookup.
    pub lookup_timeout: Duration,
    /// Connect/read timeout for the artifact download.
    pub connect_timeout: Duration,
    pub max_redirects: usize,
    /// Optional progress callback.
    pub progress: Option<ProgressFn>,
}

impl Config {
    /// Defaults plus whatever the process environment provides.
    ///
    /// Proxy is read from `HTTP_PROXY` / `HTTPS_PROXY`, the default version
    /// from `POCKETBASE_VERSION`.
    pub fn from_env() -> Self {
        let env = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
        };

        Self {
            default_version: env(VERSION_ENV),
            proxy: env("HTTP_PROXY").or_else(|| env("HTTPS_PROXY")),
            ..Self::default()
        }
    }

    /// Latest-release endpoint for the configured repository.
    pub fn latest_release_url(&self) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base_url.trim_end_matches('/'),
            self.repo
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from("."),
            repo: DEFAULT_REPO.to_owned(),
            binary_name: DEFAULT_BINARY_NAME.to_owned(),
            default_version: None,
            fallback_version: FALLBACK_VERSION.to_owned(),
            proxy: None,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_owned(),
            lookup_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(30),
            max_redirects: 5,
            progress: Some(default_progress_fn()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_release_url_joins_base_and_repo() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9999/".to_owned(),
            repo: "owner/repo".to_owned(),
            ..Config::default()
        };

        assert_eq!(
            config.latest_release_url(),
            "http://127.0.0.1:9999/repos/owner/repo/releases/latest"
        );
    }

    #[test]
    fn defaults_match_pinned_constants() {
        let config = Config::default();

        assert_eq!(config.fallback_version, FALLBACK_VERSION);
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.max_redirects, 5);
        assert!(config.default_version.is_none());
    }
}
