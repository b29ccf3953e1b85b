use std::time::Duration;

use log::{info, warn};

use crate::config::FALLBACK_VERSION;
use crate::downloader::Downloader;

/// Where a resolved version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    Explicit,
    Environment,
    Latest,
    Fallback,
}

/// Picks the version to install.
///
/// First match wins: explicit request, environment default, latest published
/// release, pinned fallback. A failed or slow latest-release lookup is never
/// fatal, and the result is never empty.
pub struct VersionResolver<'a> {
    downloader: &'a Downloader,
    env_default: Option<String>,
    fallback: String,
    lookup_timeout: Duration,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        downloader: &'a Downloader,
        env_default: Option<String>,
        fallback: impl Into<String>,
        lookup_timeout: Duration,
    ) -> Self {
        let fallback = fallback.into();
        Self {
            downloader,
            env_default,
            fallback: if fallback.trim().is_empty() {
                FALLBACK_VERSION.to_owned()
            } else {
                fallback
            },
            lookup_timeout,
        }
    }

    pub async fn resolve(&self, explicit: Option<&str>) -> String {
        self.resolve_with_source(explicit).await.0
    }

    pub async fn resolve_with_source(&self, explicit: Option<&str>) -> (String, VersionSource) {
        if let Some(version) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
            return (version.to_owned(), VersionSource::Explicit);
        }
        if let Some(version) = self.env_default.as_deref().filter(|v| !v.trim().is_empty()) {
            return (version.trim().to_owned(), VersionSource::Environment);
        }

        match tokio::time::timeout(self.lookup_timeout, self.downloader.latest_version()).await {
            Ok(Ok(version)) => {
                info!("Latest release is {version}");
                return (version, VersionSource::Latest);
            }
            Ok(Err(e)) => warn!("{e}; using pinned version {}", self.fallback),
            Err(_) => warn!(
                "latest version lookup timed out after {:?}; using pinned version {}",
                self.lookup_timeout, self.fallback
            ),
        }
        (self.fallback.clone(), VersionSource::Fallback)
    }
}
