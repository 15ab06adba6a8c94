use dashmap::DashMap;
use log::{debug, trace};
use path_clean::clean;
use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

use crate::constants::{INDEX_FILES, JS_TO_TS_EXTENSIONS, RESOLVE_EXTENSIONS};

/// Memoized resolutions keyed by importing directory and request.
pub type ResolveCache = DashMap<(PathBuf, String), Option<PathBuf>>;

/// Resolves a relative (or absolute) specifier imported from `from_file`.
///
/// Returns the canonical path of the first match, or `None` when nothing on
/// disk matches or the match lives under `node_modules`.
pub fn resolve(from_file: &Path, request: &str, cache: &ResolveCache) -> Option<PathBuf> {
    let base = from_file.parent().unwrap_or(Path::new("."));
    let key = (base.to_path_buf(), request.to_string());
    if let Some(v) = cache.get(&key) {
        trace!("Cache hit for resolve: '{}' from {}", request, from_file.display());
        return v.clone();
    }
    trace!("Resolving: '{}' from {}", request, from_file.display());

    let p = clean(base.join(request));
    let resolved = resolve_file(&p).filter(|r| {
        let external = r.components().any(|c| c == Component::Normal("node_modules".as_ref()));
        if external {
            trace!("Refusing to resolve '{}' into node_modules: {}", request, r.display());
        }
        !external
    });

    if resolved.is_some() {
        debug!("Resolved '{}' from {} to {:?}", request, from_file.display(), resolved);
    } else {
        trace!("Failed to resolve '{}' from {}", request, from_file.display());
    }
    cache.insert(key, resolved.clone());
    resolved
}

/// Resolves a bare specifier through tsconfig `paths` aliases.
pub fn resolve_alias(request: &str, tsconfig_paths: &HashMap<String, Vec<String>>) -> Option<PathBuf> {
    trace!("Checking tsconfig path aliases for '{}'", request);
    // Longest alias first so `@app/ui` wins over `@app`
    let mut aliases: Vec<(&String, &Vec<String>)> = tsconfig_paths.iter().collect();
    aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    for (alias, targets) in aliases {
        let remainder = match request.strip_prefix(alias.as_str()) {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => rest.trim_start_matches('/'),
            _ => continue,
        };
        trace!("Matched alias '{}' for request '{}'", alias, request);
        for target in targets {
            let candidate =
                if remainder.is_empty() { PathBuf::from(target) } else { Path::new(target).join(remainder) };
            if let Some(resolved) = resolve_file(&clean(candidate)) {
                debug!("Resolved alias '{}' to {}", alias, resolved.display());
                return Some(resolved);
            }
        }
    }
    None
}

fn resolve_file(p: &Path) -> Option<PathBuf> {
    // Try exact path first
    if p.is_file() {
        return Some(canonical(p));
    }

    // Try adding extensions
    for ext in RESOLVE_EXTENSIONS {
        let candidate = with_appended_extension(p, ext);
        if candidate.is_file() {
            return Some(canonical(&candidate));
        }
    }

    // Try index files
    if p.is_dir() {
        for index_file in INDEX_FILES {
            let candidate = p.join(index_file);
            if candidate.is_file() {
                return Some(canonical(&candidate));
            }
        }
    }

    // `./util.js` written against `util.ts`
    let ext = p.extension().and_then(|e| e.to_str())?;
    let (_, ts_exts) = JS_TO_TS_EXTENSIONS.iter().find(|(js, _)| *js == ext)?;
    ts_exts.iter().map(|ts| p.with_extension(ts)).find(|c| c.is_file()).map(|c| canonical(&c))
}

fn with_appended_extension(p: &Path, ext: &str) -> PathBuf {
    let mut s: OsString = p.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

fn canonical(p: &Path) -> PathBuf {
    p.canonicalize().unwrap_or_else(|_| p.to_path_buf())
}
