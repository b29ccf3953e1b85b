use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::downloader::ProgressFn;
use crate::error::Result;
use crate::install::{Install, Installation};
use crate::platform::PlatformTriple;

// ──────────────────────────────────────────────────────────────────────────────
// Api
// ──────────────────────────────────────────────────────────────────────────────

/// Top-level entry-point with a chainable builder API.
///
/// # Example
/// ```rust,no_run
/// use pbfetch::Api;
///
/// #[tokio::main]
/// async fn main() {
///     let installed = Api::new()
///         .set_install_dir("./pb")
///         .repo("pocketbase/pocketbase")
///         .version("0.22.0")
///         .ensure()
///         .await
///         .unwrap();
///     println!("{}", installed.binary_path.display());
/// }
/// ```
pub struct Api {
    config: Config,
    platform: Option<PlatformTriple>,
}

impl Api {
    /// Create a new `Api` from defaults and the process environment.
    ///
    /// See [`Config::from_env`] for the variables consulted.
    pub fn new() -> Self {
        Self::with_config(Config::from_env())
    }

    /// Create a new `Api` without consulting the environment.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            platform: None,
        }
    }

    /// Set the installation directory (builder).
    pub fn set_install_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.install_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the binary name, without platform extension (builder).
    pub fn set_binary_name(mut self, name: &str) -> Self {
        self.config.binary_name = name.to_owned();
        self
    }

    /// Set the default version used when none is requested explicitly (builder).
    pub fn set_default_version(mut self, version: &str) -> Self {
        self.config.default_version = Some(version.to_owned());
        self
    }

    /// Set the pinned version used when the latest-release lookup fails (builder).
    pub fn set_fallback_version(mut self, version: &str) -> Self {
        self.config.fallback_version = version.to_owned();
        self
    }

    /// Override the progress callback (builder).
    pub fn set_progress(mut self, progress: ProgressFn) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Disable progress output (builder).
    pub fn no_progress(mut self) -> Self {
        self.config.progress = None;
        self
    }

    /// Set an explicit HTTP/HTTPS proxy URL (builder).
    pub fn set_proxy(mut self, proxy: &str) -> Self {
        self.config.proxy = Some(proxy.to_owned());
        self
    }

    /// Point release metadata lookups at another API host (builder).
    pub fn set_api_base_url(mut self, url: &str) -> Self {
        self.config.api_base_url = url.to_owned();
        self
    }

    /// Point artifact downloads at another host (builder).
    pub fn set_download_base_url(mut self, url: &str) -> Self {
        self.config.download_base_url = url.to_owned();
        self
    }

    /// Set the latest-release lookup budget (builder).
    pub fn set_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.config.lookup_timeout = timeout;
        self
    }

    /// Set the download connect/read timeout (builder).
    pub fn set_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the maximum number of redirects followed per download (builder).
    pub fn set_max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Install for another platform than the running host (builder).
    pub fn set_platform(mut self, platform: PlatformTriple) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Select a GitHub repository and return a [`RepoApi`].
    pub fn repo(mut self, repo: &str) -> RepoApi {
        self.config.repo = repo.to_owned();
        RepoApi { api: self }
    }

    fn into_install(self) -> Install {
        let install = Install::new(self.config);
        match self.platform {
            Some(platform) => install.with_platform(platform),
            None => install,
        }
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// RepoApi
// ──────────────────────────────────────────────────────────────────────────────

/// Intermediate builder after a repository has been specified.
pub struct RepoApi {
    api: Api,
}

impl RepoApi {
    /// Resolve the version from the environment default, the latest release,
    /// or the pinned fallback, in that order.
    pub fn latest(self) -> VersionApi {
        self.requested(None)
    }

    /// Target a specific release version (e.g. `"0.22.0"`).
    pub fn version(self, version: &str) -> VersionApi {
        self.requested(Some(version))
    }

    /// Target `version` when given, otherwise behave like [`RepoApi::latest`].
    pub fn requested(self, version: Option<&str>) -> VersionApi {
        VersionApi {
            api: self.api,
            requested: version.map(str::to_owned),
            force: false,
        }
    }

    /// Return the installed version recorded in the install directory.
    pub fn installed_version(self) -> Option<String> {
        self.api.into_install().installed_version()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// VersionApi
// ──────────────────────────────────────────────────────────────────────────────

/// Intermediate builder after a version strategy has been chosen.
pub struct VersionApi {
    api: Api,
    requested: Option<String>,
    force: bool,
}

impl VersionApi {
    /// Reinstall even when the cached copy matches (builder).
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Make sure the binary is installed and current, downloading it if needed.
    pub async fn ensure(self) -> Result<Installation> {
        let install = self.api.into_install();
        install
            .ensure_with(self.requested.as_deref(), self.force)
            .await
    }
}
