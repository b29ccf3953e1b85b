use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::platform::PlatformTriple;

/// Where a given version lives, locally and remotely.
///
/// Recomputed on every invocation from the platform, the resolved version
/// and the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub binary_path: PathBuf,
    pub download_url: String,
    /// On-disk binary name, including the platform extension.
    pub binary_name: String,
    pub version_marker_path: PathBuf,
    /// Version this location was derived for.
    pub version: String,
}

impl ArtifactLocation {
    pub fn new(root: &Path, config: &Config, triple: &PlatformTriple, version: &str) -> Self {
        let binary_name = format!("{}{}", config.binary_name, triple.file_extension);
        let asset = format!(
            "{}_{}_{}_{}.zip",
            config.binary_name,
            version,
            triple.platform.as_str(),
            triple.arch.as_str()
        );
        let download_url = format!(
            "{}/{}/releases/download/v{}/{}",
            config.download_base_url.trim_end_matches('/'),
            config.repo,
            version,
            asset
        );

        Self {
            binary_path: root.join(&binary_name),
            download_url,
            version_marker_path: root.join(marker_file_name(&config.binary_name)),
            binary_name,
            version: version.to_owned(),
        }
    }
}

/// Name of the plain-text file recording the installed version.
pub fn marker_file_name(binary_name: &str) -> String {
    format!(".{binary_name}-version")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_location() {
        let triple = PlatformTriple::from_parts("linux", "x86_64").unwrap();
        let loc = ArtifactLocation::new(Path::new("/srv/app"), &Config::default(), &triple, "0.22.0");

        assert_eq!(loc.binary_name, "pocketbase");
        assert_eq!(loc.binary_path, Path::new("/srv/app/pocketbase"));
        assert_eq!(
            loc.version_marker_path,
            Path::new("/srv/app/.pocketbase-version")
        );
        assert_eq!(
            loc.download_url,
            "https://github.com/pocketbase/pocketbase/releases/download/v0.22.0/pocketbase_0.22.0_linux_amd64.zip"
        );
    }

    #[test]
    fn windows_binary_gets_exe_suffix() {
        let triple = PlatformTriple::from_parts("windows", "aarch64").unwrap();
        let config = Config {
            download_base_url: "http://mirror.local/".to_owned(),
            ..Config::default()
        };
        let loc = ArtifactLocation::new(Path::new("C:/pb"), &config, &triple, "0.23.1");

        assert_eq!(loc.binary_name, "pocketbase.exe");
        assert!(loc.binary_path.ends_with("pocketbase.exe"));
        assert_eq!(
            loc.download_url,
            "http://mirror.local/pocketbase/pocketbase/releases/download/v0.23.1/pocketbase_0.23.1_windows_arm64.zip"
        );
    }
}
