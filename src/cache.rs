use std::path::Path;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::location::ArtifactLocation;

/// True only when both the binary and the marker exist and the marker holds
/// exactly the target version. Anything else means reinstall.
pub fn is_up_to_date(location: &ArtifactLocation) -> bool {
    if !location.binary_path.is_file() {
        debug!("{} is missing", location.binary_path.display());
        return false;
    }

    match read_marker(&location.version_marker_path) {
        Some(installed) if installed == location.version.trim() => true,
        Some(installed) => {
            info!(
                "Installed version {installed} differs from requested {}",
                location.version
            );
            false
        }
        None => {
            debug!(
                "no readable version marker at {}",
                location.version_marker_path.display()
            );
            false
        }
    }
}

/// Trimmed marker content, or `None` when absent, unreadable, or empty.
pub fn read_marker(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let version = raw.trim();
    (!version.is_empty()).then(|| version.to_owned())
}

/// Write (or overwrite) the marker with `version`.
pub fn write_marker(path: &Path, version: &str) -> Result<()> {
    std::fs::write(path, version)
        .map_err(|e| Error::fs("failed to write version marker", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::PlatformTriple;

    fn location(dir: &Path, version: &str) -> ArtifactLocation {
        let triple = PlatformTriple::from_parts("linux", "x86_64").unwrap();
        ArtifactLocation::new(dir, &Config::default(), &triple, version)
    }

    #[test]
    fn missing_everything_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_up_to_date(&location(dir.path(), "0.22.0")));
    }

    #[test]
    fn missing_marker_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let loc = location(dir.path(), "0.22.0");
        std::fs::write(&loc.binary_path, b"bin").unwrap();

        assert!(!is_up_to_date(&loc));
    }

    #[test]
    fn missing_binary_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let loc = location(dir.path(), "0.22.0");
        write_marker(&loc.version_marker_path, "0.22.0").unwrap();

        assert!(!is_up_to_date(&loc));
    }

    #[test]
    fn mismatched_marker_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let loc = location(dir.path(), "0.22.0");
        std::fs::write(&loc.binary_path, b"bin").unwrap();
        write_marker(&loc.version_marker_path, "0.21.3").unwrap();

        assert!(!is_up_to_date(&loc));
    }

    #[test]
    fn corrupt_marker_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let loc = location(dir.path(), "0.22.0");
        std::fs::write(&loc.binary_path, b"bin").unwrap();
        std::fs::write(&loc.version_marker_path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(!is_up_to_date(&loc));
    }

    #[test]
    fn matching_marker_with_whitespace_is_current() {
        let dir = tempfile::tempdir().unwrap();
        let loc = location(dir.path(), "0.22.0");
        std::fs::write(&loc.binary_path, b"bin").unwrap();
        std::fs::write(&loc.version_marker_path, "  0.22.0\n").unwrap();

        assert!(is_up_to_date(&loc));
    }

    #[test]
    fn padded_target_version_matches_marker() {
        let dir = tempfile::tempdir().unwrap();
        let loc = location(dir.path(), "0.22.0\n");
        std::fs::write(&loc.binary_path, b"bin").unwrap();
        write_marker(&loc.version_marker_path, "0.22.0").unwrap();

        assert!(is_up_to_date(&loc));
    }

    #[test]
    fn write_marker_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".pocketbase-version");
        write_marker(&path, "0.21.0").unwrap();
        write_marker(&path, "0.22.0").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.22.0");
        assert_eq!(read_marker(&path).as_deref(), Some("0.22.0"));
    }
}
