use std::env::consts::{ARCH, OS};
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformName {
    Windows,
    Darwin,
    Linux,
}

impl PlatformName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Darwin => "darwin",
            Self::Linux => "linux",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchName {
    Amd64,
    Arm64,
}

impl ArchName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

/// Which release build to fetch for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTriple {
    pub platform: PlatformName,
    pub arch: ArchName,
    /// Executable suffix, `".exe"` on Windows and empty elsewhere.
    pub file_extension: &'static str,
}

impl PlatformTriple {
    /// Resolve the triple for the running host.
    pub fn current() -> Result<Self> {
        Self::from_parts(OS, ARCH)
    }

    /// Map Rust's `std::env::consts` identifiers to a release triple.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self> {
        let platform = match os {
            "windows" => PlatformName::Windows,
            "macos" => PlatformName::Darwin,
            "linux" => PlatformName::Linux,
            _ => return Err(unsupported(os, arch)),
        };
        let arch_name = match arch {
            "x86_64" => ArchName::Amd64,
            "aarch64" => ArchName::Arm64,
            _ => return Err(unsupported(os, arch)),
        };
        let file_extension = match platform {
            PlatformName::Windows => ".exe",
            PlatformName::Darwin | PlatformName::Linux => "",
        };

        Ok(Self {
            platform,
            arch: arch_name,
            file_extension,
        })
    }

    pub fn is_windows(&self) -> bool {
        self.platform == PlatformName::Windows
    }
}

impl fmt::Display for PlatformTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.platform.as_str(), self.arch.as_str())
    }
}

fn unsupported(os: &str, arch: &str) -> Error {
    Error::UnsupportedPlatform {
        os: os.to_owned(),
        arch: arch.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SUPPORTED: &[(&str, &str, &str, &str, &str)] = &[
        ("windows", "x86_64", "windows", "amd64", ".exe"),
        ("windows", "aarch64", "windows", "arm64", ".exe"),
        ("macos", "x86_64", "darwin", "amd64", ""),
        ("macos", "aarch64", "darwin", "arm64", ""),
        ("linux", "x86_64", "linux", "amd64", ""),
        ("linux", "aarch64", "linux", "arm64", ""),
    ];

    #[test]
    fn supported_pairs_map_to_unique_stable_triples() {
        let mut seen = HashSet::new();
        for (os, arch, platform, arch_name, ext) in SUPPORTED {
            let triple = PlatformTriple::from_parts(os, arch).unwrap();
            assert_eq!(triple.platform.as_str(), *platform);
            assert_eq!(triple.arch.as_str(), *arch_name);
            assert_eq!(triple.file_extension, *ext);
            assert_eq!(triple, PlatformTriple::from_parts(os, arch).unwrap());
            assert!(seen.insert(triple), "duplicate triple for {os}/{arch}");
        }
    }

    #[test]
    fn unsupported_pairs_fail() {
        for (os, arch) in [
            ("freebsd", "x86_64"),
            ("linux", "x86"),
            ("linux", "riscv64"),
            ("macos", "powerpc"),
            ("android", "aarch64"),
        ] {
            let err = PlatformTriple::from_parts(os, arch).unwrap_err();
            assert!(
                matches!(&err, Error::UnsupportedPlatform { os: o, arch: a } if o == os && a == arch),
                "unexpected error for {os}/{arch}: {err}"
            );
        }
    }

    #[test]
    fn display_is_platform_underscore_arch() {
        let triple = PlatformTriple::from_parts("linux", "aarch64").unwrap();
        assert_eq!(triple.to_string(), "linux_arm64");
    }
}
