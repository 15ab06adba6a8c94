use log::trace;
use sha2::{Digest, Sha256};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use scaffold_core::JS_TS_EXTENSIONS;

use crate::types::NamingStrategy;

/// Outcome of asking the registry for a file's output name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// First time this file is seen; it must be emitted and traversed.
    New(String),
    Existing(String),
    /// The name belongs to another file. Reported once per path.
    Collision { name: String, owner: PathBuf },
    /// Lost a collision earlier; never emitted.
    Rejected,
}

/// Output names handed out during one extraction, keyed by canonical path.
///
/// A name never changes once assigned, so rewriting can rely on it. Names
/// are owned by their import target, so `helper.js` and `helper.ts` cannot
/// both be emitted behind the same `./helper` specifier.
#[derive(Debug)]
pub struct NameRegistry {
    strategy: NamingStrategy,
    root: PathBuf,
    by_path: HashMap<PathBuf, String>,
    /// Import target -> file that emits it.
    owners: HashMap<String, PathBuf>,
    rejected: HashSet<PathBuf>,
}

impl NameRegistry {
    pub fn new(strategy: NamingStrategy, root: &Path) -> Self {
        Self {
            strategy,
            root: root.to_path_buf(),
            by_path: HashMap::new(),
            owners: HashMap::new(),
            rejected: HashSet::new(),
        }
    }

    /// The entry is always `index.<ext>`.
    pub fn assign_entry(&mut self, entry: &Path) -> String {
        let name = match extension(entry) {
            Some(ext) => format!("index.{}", ext),
            None => "index".to_string(),
        };
        self.by_path.insert(entry.to_path_buf(), name.clone());
        self.owners.insert(import_target(&name), entry.to_path_buf());
        name
    }

    pub fn assign(&mut self, path: &Path) -> Assignment {
        if let Some(name) = self.by_path.get(path) {
            return Assignment::Existing(name.clone());
        }
        if self.rejected.contains(path) {
            return Assignment::Rejected;
        }

        let name = self.name_for(path);
        let target = import_target(&name);
        if let Some(owner) = self.owners.get(&target) {
            self.rejected.insert(path.to_path_buf());
            return Assignment::Collision { name, owner: owner.clone() };
        }

        trace!("Assigned output name '{}' to {}", name, path.display());
        self.by_path.insert(path.to_path_buf(), name.clone());
        self.owners.insert(target, path.to_path_buf());
        Assignment::New(name)
    }

    fn name_for(&self, path: &Path) -> String {
        match (self.strategy, flattened_name(&self.root, path)) {
            (NamingStrategy::Flatten, Some(name)) => name,
            _ => hashed_name(&self.root, path),
        }
    }
}

/// `src/lib/util.ts` -> `src_lib_util.ts`; `None` outside `root`.
pub fn flattened_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let rel = forward_slashes(rel);
    if rel.is_empty() {
        return None;
    }
    Some(rel.replace('/', "_"))
}

/// `<stem>_<first 8 hex digits of sha256>.<ext>`, hashing the path relative
/// to `root` when possible and the absolute path otherwise.
pub fn hashed_name(root: &Path, path: &Path) -> String {
    let key = match path.strip_prefix(root) {
        Ok(rel) => forward_slashes(rel),
        Err(_) => forward_slashes(path),
    };
    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    match extension(path) {
        Some(ext) => format!("{}_{}.{}", stem, &digest[..8], ext),
        None => format!("{}_{}", stem, &digest[..8]),
    }
}

/// Specifier text that points at an emitted file: source modules lose their
/// extension, assets keep it.
pub fn import_target(name: &str) -> String {
    let path = Path::new(name);
    match extension(path) {
        Some(ext) if JS_TS_EXTENSIONS.contains(&ext.as_str()) => {
            let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            format!("./{}", stem)
        }
        _ => format!("./{}", name),
    }
}

/// Path text with `/` separators regardless of platform.
pub fn forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().into_owned())
}
