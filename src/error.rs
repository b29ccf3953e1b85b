use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way provisioning a release binary can fail.
///
/// Only [`Error::VersionLookup`] is recoverable: the version resolver absorbs
/// it and falls back to the pinned version. Everything else unwinds to the
/// caller with the underlying cause attached.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("unable to look up latest version: {0}")]
    VersionLookup(String),

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("download of {url} timed out")]
    DownloadTimeout { url: String },

    #[error("too many redirects (more than {max}) starting at {url}")]
    TooManyRedirects { url: String, max: usize },

    #[error("archive {} has no entry named '{entry}'", archive.display())]
    EntryNotFound { entry: String, archive: PathBuf },

    #[error("failed to read archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{context} ({}): {source}", path.display())]
    Filesystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn fs(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Filesystem {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Classify a transport error: timeouts get their own variant.
    pub(crate) fn network(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::DownloadTimeout {
                url: url.to_owned(),
            }
        } else {
            Self::Network {
                url: url.to_owned(),
                source,
            }
        }
    }

    pub(crate) fn archive(path: &Path, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use std::error::Error as _;
    use std::path::Path;

    #[test]
    fn filesystem_error_carries_path_and_cause() {
        let err = Error::fs(
            "failed to write version marker",
            Path::new("/tmp/x/.pocketbase-version"),
            std::io::Error::other("disk full"),
        );

        let msg = err.to_string();
        assert!(msg.contains("failed to write version marker"));
        assert!(msg.contains(".pocketbase-version"));
        assert!(msg.contains("disk full"));
        assert!(err.source().is_some());
    }

    #[test]
    fn http_status_formats_code() {
        let err = Error::HttpStatus {
            url: "https://example.test/a.zip".to_owned(),
            status: 404,
            message: "Not Found".to_owned(),
        };

        assert_eq!(
            err.to_string(),
            "https://example.test/a.zip returned HTTP 404: Not Found"
        );
    }
}
