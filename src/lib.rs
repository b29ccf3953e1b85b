//! # pbfetch
//!
//! Resolve, download, and install a platform-specific PocketBase release
//! binary into a working directory, with a chainable, builder-style API.
//!
//! A run resolves the host platform, picks a version (explicit request,
//! `POCKETBASE_VERSION`, latest GitHub release, pinned fallback), and only
//! touches the network when the version marker next to the binary disagrees.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pbfetch::Api;
//!
//! #[tokio::main]
//! async fn main() {
//!     let installed = Api::new()
//!         .set_install_dir("./pb")
//!         .repo("pocketbase/pocketbase")
//!         .latest()
//!         .ensure()
//!         .await
//!         .unwrap();
//!     println!("{} {}", installed.binary_path.display(), installed.version);
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod install;
pub mod location;
pub mod platform;
pub mod progress;
pub mod version;

pub use api::Api;
pub use config::Config;
pub use downloader::{Downloader, ProgressFn};
pub use error::{Error, Result};
pub use install::{Install, InstallState, Installation};
pub use location::ArtifactLocation;
pub use platform::PlatformTriple;
pub use progress::default_progress_fn;
pub use version::{VersionResolver, VersionSource};
