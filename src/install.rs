use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::cache;
use crate::config::Config;
use crate::downloader::Downloader;
use crate::error::{Error, Result};
use crate::extract::extract_entry;
use crate::location::{marker_file_name, ArtifactLocation};
use crate::platform::PlatformTriple;
use crate::version::VersionResolver;

/// Stages of one [`Install::ensure`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallState {
    Unchecked,
    /// Terminal: the requested version was already in place.
    CacheValid,
    CacheStale,
    Downloading,
    Extracting,
    /// Terminal: a fresh copy was installed.
    Installed,
    /// Terminal: some stage failed.
    Failed,
}

/// Result of a successful [`Install::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub binary_path: PathBuf,
    pub version: String,
    /// Either [`InstallState::CacheValid`] or [`InstallState::Installed`].
    pub state: InstallState,
}

/// Keeps one release binary present and current in an install directory.
pub struct Install {
    config: Config,
    platform: Option<PlatformTriple>,
    /// Downloader used for HTTP operations.
    pub downloader: Downloader,
}

impl Install {
    pub fn new(config: Config) -> Self {
        let downloader = Downloader::new(&config);
        Self {
            config,
            platform: None,
            downloader,
        }
    }

    /// Install for `platform` instead of the running host.
    pub fn with_platform(mut self, platform: PlatformTriple) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Make sure the binary for the resolved version is installed.
    ///
    /// `requested` takes precedence over every other version source. Nothing
    /// touches the network when the cached copy already matches. Dropping the
    /// returned future aborts any in-flight request.
    pub async fn ensure(&self, requested: Option<&str>) -> Result<Installation> {
        self.ensure_with(requested, false).await
    }

    /// Like [`Install::ensure`], but `force` skips the cache check.
    pub async fn ensure_with(&self, requested: Option<&str>, force: bool) -> Result<Installation> {
        let mut state = InstallState::Unchecked;
        let result = self.run(requested, force, &mut state).await;
        if let Err(e) = &result {
            advance(&mut state, InstallState::Failed);
            debug!("install failed: {e}");
        }
        result
    }

    /// Trimmed content of the version marker, if one exists.
    pub fn installed_version(&self) -> Option<String> {
        let marker = self
            .config
            .install_dir
            .join(marker_file_name(&self.config.binary_name));
        cache::read_marker(&marker)
    }

    async fn run(
        &self,
        requested: Option<&str>,
        force: bool,
        state: &mut InstallState,
    ) -> Result<Installation> {
        let triple = match self.platform {
            Some(triple) => triple,
            None => PlatformTriple::current()?,
        };

        let resolver = VersionResolver::new(
            &self.downloader,
            self.config.default_version.clone(),
            self.config.fallback_version.clone(),
            self.config.lookup_timeout,
        );
        let version = resolver.resolve(requested).await;

        let root = self.install_root()?;
        let location = ArtifactLocation::new(&root, &self.config, &triple, &version);

        if !force && cache::is_up_to_date(&location) {
            advance(state, InstallState::CacheValid);
            info!("{} {version} is up to date", location.binary_name);
            return Ok(Installation {
                binary_path: location.binary_path,
                version,
                state: *state,
            });
        }
        advance(state, InstallState::CacheStale);

        let binary_path = self.install_fresh(&root, &triple, &location, state).await?;

        advance(state, InstallState::Installed);
        info!("Installed {} {version}", binary_path.display());
        Ok(Installation {
            binary_path,
            version,
            state: *state,
        })
    }

    async fn install_fresh(
        &self,
        root: &Path,
        triple: &PlatformTriple,
        location: &ArtifactLocation,
        state: &mut InstallState,
    ) -> Result<PathBuf> {
        let archive = tempfile::Builder::new()
            .prefix(".pbfetch-")
            .suffix(".zip")
            .tempfile_in(root)
            .map_err(|e| Error::fs("failed to create temporary archive", root, e))?
            .into_temp_path();

        advance(state, InstallState::Downloading);
        info!("Downloading {}", location.download_url);
        self.downloader
            .fetch(&location.download_url, &archive)
            .await?;

        advance(state, InstallState::Extracting);
        let binary_path = extract_entry(&archive, root, &location.binary_name)?;

        let archive_path = archive.to_path_buf();
        archive
            .close()
            .map_err(|e| Error::fs("failed to remove temporary archive", &archive_path, e))?;

        if !triple.is_windows() {
            make_executable(&binary_path)?;
        }
        cache::write_marker(&location.version_marker_path, &location.version)?;

        Ok(binary_path)
    }

    /// Absolute install directory, created if missing.
    fn install_root(&self) -> Result<PathBuf> {
        let dir = &self.config.install_dir;
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::fs("failed to create install directory", dir, e))?;
        std::path::absolute(dir)
            .map_err(|e| Error::fs("failed to resolve install directory", dir, e))
    }
}

fn advance(state: &mut InstallState, next: InstallState) {
    debug!("{state:?} -> {next:?}");
    *state = next;
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::fs("failed to mark binary executable", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
