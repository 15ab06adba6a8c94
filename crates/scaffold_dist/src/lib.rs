//! Dependency-closure extraction for JavaScript/TypeScript projects.
//!
//! Starting from one entry file, this crate follows every local import,
//! copies the reached files into a single flat directory with their import
//! specifiers rewritten, and derives a `package.json` listing only the
//! packages the copied code actually imports.
//!
//! # Examples
//!
//! ```no_run
//! use scaffold_core::BuiltinModules;
//! use scaffold_dist::{Extractor, LogSink};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let extractor = Extractor::new(BuiltinModules::node());
//! let result = extractor.extract(
//!     Path::new("/path/to/project/src/main.ts"),
//!     Path::new("/path/to/project/dist"),
//!     Path::new("/path/to/project"),
//!     &mut LogSink,
//! )?;
//! println!("{} files, entry {}", result.emitted_count, result.entry_output_name);
//! # Ok(())
//! # }
//! ```

mod config;
mod extractor;
mod naming;
mod package;
mod reporter;
mod rewrite;
mod shake;
mod types;
mod workflow;

// Re-export public API
pub use config::DistConfig;
pub use extractor::Extractor;
pub use package::{build_dist_manifest, write_dist_manifest};
pub use reporter::print_dist_summary;
pub use types::{
    ExtractError, ExtractOptions, ExtractWarning, ExtractionResult, LogSink, NamingStrategy,
    WarningSink,
};
pub use workflow::{DistReport, extract_package, run_dist};
