use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, info, trace, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::constants::JS_TS_EXTENSIONS;

/// Checks a directory name typed by the user and returns it trimmed.
///
/// Allowed: ASCII letters, digits, `-` and `_`; `parent.join(name)` must not
/// exist yet.
pub fn validate_dir_name(name: &str, parent: &Path) -> std::result::Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err("Name cannot contain path separators".to_string());
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err("Name may only contain letters, digits, '-' and '_'".to_string());
    }
    if parent.join(trimmed).exists() {
        return Err(format!("'{}' already exists", trimmed));
    }
    Ok(trimmed.to_string())
}

/// Copies the tree under `source` into `target`, honoring `.gitignore` and
/// skipping `.git` and `node_modules`. Returns the number of files copied.
pub fn copy_dir(source: &Path, target: &Path) -> Result<usize> {
    debug!("Copying {} -> {}", source.display(), target.display());
    fs::create_dir_all(target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let walker = WalkBuilder::new(source)
        .hidden(false)
        .git_ignore(true)
        .require_git(false)
        .filter_entry(|e| e.file_name() != ".git" && e.file_name() != "node_modules")
        .build();

    let mut copied = 0;
    for res in walker {
        let dent = res?;
        let p = dent.path();
        let Ok(rel) = p.strip_prefix(source) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let dest = target.join(rel);
        if p.is_dir() {
            fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;
        } else {
            trace!("Copying file: {}", rel.display());
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(p, &dest).with_context(|| format!("Failed to copy {}", p.display()))?;
            copied += 1;
        }
    }
    debug!("Copied {} files", copied);
    Ok(copied)
}

/// JS/TS files directly inside `dir`, sorted by name.
pub fn list_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .require_git(false)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| JS_TS_EXTENSIONS.contains(&ext))
        })
        .collect();
    files.sort();
    trace!("Found {} source files in {}", files.len(), dir.display());
    files
}

/// Removes a directory left behind by a failed or cancelled run.
pub fn remove_dir_if_exists(path: &Path) {
    if !path.exists() {
        return;
    }
    info!("Removing {}", path.display());
    if let Err(e) = fs::remove_dir_all(path) {
        warn!("Failed to remove {}: {}", path.display(), e);
    }
}
