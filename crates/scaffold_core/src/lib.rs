//! Core utilities shared by the scaffold commands.
//!
//! This crate provides:
//! - Parsing import/export specifiers from JS/TS files
//! - Resolving relative specifiers and tsconfig path aliases
//! - Locating the enclosing project and reading its `package.json`
//! - Interactive prompts and external process execution

mod config;
mod constants;
mod error;
mod fsutil;
mod manifest;
mod parser;
mod process;
mod prompt;
mod resolver;
mod types;

// Re-export public API
pub use config::{locate_project, read_tsconfig_paths};
pub use constants::{INDEX_FILES, JS_TS_EXTENSIONS, NODE_BUILTINS, RESOLVE_EXTENSIONS};
pub use error::CoreError;
pub use fsutil::{copy_dir, list_source_files, remove_dir_if_exists, validate_dir_name};
pub use manifest::{PackageManifest, ProjectInfo, update_manifest_field, write_json_pretty};
pub use parser::{ModuleScan, scan_source, source_type_for};
pub use process::{CommandSpec, ProcessRunner, RunMode, SystemRunner, program_exists};
pub use prompt::{DialoguerPrompt, Outcome, Prompt};
pub use resolver::{ResolveCache, resolve, resolve_alias};
pub use types::{BuiltinModules, SpecKind, Specifier, SpecifierClass, classify, package_name};
