use log::warn;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    path::PathBuf,
};
use thiserror::Error;

use scaffold_core::PackageManifest;

/// What `extract` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Package name -> declared version range, empty when undeclared.
    pub external_dependencies: BTreeMap<String, String>,
    pub emitted_count: usize,
    pub entry_output_name: String,
    /// Output names in emission order, entry first.
    pub emitted: Vec<String>,
}

/// How non-entry files are named in the output directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum NamingStrategy {
    /// `src/lib/util.ts` -> `src_lib_util.ts`
    #[default]
    Flatten,
    /// `src/lib/util.ts` -> `util_<8 hex digits>.ts`
    Hash,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub naming: NamingStrategy,
    pub tree_shake: bool,
    /// tsconfig `paths` aliases; empty disables alias resolution.
    pub tsconfig_paths: HashMap<String, Vec<String>>,
    /// Host manifest the dependency versions are copied from.
    pub manifest: Option<PackageManifest>,
}

/// Non-fatal problems found during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractWarning {
    /// A relative specifier matched no file; left unchanged in the output.
    UnresolvedImport { from: PathBuf, request: String },
    /// `path` would be written under a name already taken by `owner`; skipped.
    NameCollision { path: PathBuf, name: String, owner: PathBuf },
    /// The parser recovered from syntax errors; specifiers may be incomplete.
    ParseErrors { path: PathBuf, count: usize },
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractWarning::UnresolvedImport { from, request } => {
                write!(f, "Cannot resolve '{}' imported from {}", request, from.display())
            }
            ExtractWarning::NameCollision { path, name, owner } => write!(
                f,
                "Skipping {}: output name '{}' is already used by {}",
                path.display(),
                name,
                owner.display()
            ),
            ExtractWarning::ParseErrors { path, count } => {
                write!(f, "{} syntax error(s) in {}", count, path.display())
            }
        }
    }
}

/// Receives the warnings of an extraction run.
pub trait WarningSink {
    fn warn(&mut self, warning: ExtractWarning);
}

impl WarningSink for Vec<ExtractWarning> {
    fn warn(&mut self, warning: ExtractWarning) {
        self.push(warning);
    }
}

/// Forwards warnings to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warn(&mut self, warning: ExtractWarning) {
        warn!("{}", warning);
    }
}

/// Fatal extraction failures.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Entry file not found: {}", path.display())]
    EntryNotFound { path: PathBuf },

    #[error("Unsupported entry file (expected .ts/.tsx/.js/.jsx/.mts/.cts/.mjs/.cjs): {}", path.display())]
    UnsupportedEntry { path: PathBuf },

    #[error("Refusing to overwrite existing output file {}", path.display())]
    OutputExists { path: PathBuf },
}
