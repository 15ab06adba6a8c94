//! Patch releases: bump the version in `package.json`, commit, tag
//! `v<version>` and push to `origin`.

mod config;
mod release;
mod reporter;
mod version;

// Re-export public API
pub use config::ReleaseConfig;
pub use release::{ReleaseReport, run_release};
pub use reporter::print_release_summary;
pub use version::{DEFAULT_VERSION, next_version};
