use anyhow::{Context, Result};
use log::{debug, info, trace};
use std::{
    collections::{BTreeMap, VecDeque},
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use scaffold_core::{
    BuiltinModules, JS_TS_EXTENSIONS, ResolveCache, SpecifierClass, classify, resolve,
    resolve_alias, scan_source,
};

use crate::{
    naming::{Assignment, NameRegistry, import_target},
    rewrite::{Edit, apply_edits},
    shake::dead_statement_edits,
    types::{ExtractError, ExtractOptions, ExtractWarning, ExtractionResult, WarningSink},
};

/// Copies the import closure of one entry file into a flat output directory.
///
/// Local imports are followed breadth-first and rewritten to point at the
/// emitted copies; package imports are recorded with the version the host
/// manifest declares for them.
#[derive(Debug)]
pub struct Extractor {
    builtins: BuiltinModules,
    options: ExtractOptions,
    resolve_cache: ResolveCache,
}

impl Extractor {
    pub fn new(builtins: BuiltinModules) -> Self {
        Self { builtins, options: ExtractOptions::default(), resolve_cache: ResolveCache::new() }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn extract(
        &self,
        entry: &Path,
        out_dir: &Path,
        project_root: &Path,
        sink: &mut dyn WarningSink,
    ) -> Result<ExtractionResult> {
        info!("Extracting {} into {}", entry.display(), out_dir.display());

        if !entry.is_file() {
            return Err(ExtractError::EntryNotFound { path: entry.to_path_buf() }.into());
        }
        if !is_source(entry) {
            return Err(ExtractError::UnsupportedEntry { path: entry.to_path_buf() }.into());
        }
        let entry = entry.canonicalize().unwrap_or_else(|_| entry.to_path_buf());
        let root = project_root.canonicalize().unwrap_or_else(|_| project_root.to_path_buf());
        debug!("Using project root: {}", root.display());

        fs::create_dir_all(out_dir)
            .with_context(|| format!("Failed to create {}", out_dir.display()))?;

        let mut registry = NameRegistry::new(self.options.naming, &root);
        let entry_output_name = registry.assign_entry(&entry);
        let mut queue: VecDeque<(PathBuf, String)> =
            VecDeque::from([(entry, entry_output_name.clone())]);
        let mut external_dependencies = BTreeMap::new();
        let mut emitted = Vec::new();

        while let Some((path, name)) = queue.pop_front() {
            trace!("Processing {} as {}", path.display(), name);
            let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;

            let contents = match (is_source(&path), String::from_utf8(bytes)) {
                (true, Ok(source)) => {
                    let rewritten = self.rewrite_unit(
                        &path,
                        &source,
                        &mut registry,
                        &mut queue,
                        &mut external_dependencies,
                        sink,
                    );
                    rewritten.into_bytes()
                }
                (_, Ok(text)) => text.into_bytes(),
                (_, Err(e)) => e.into_bytes(),
            };

            write_new(&out_dir.join(&name), &contents)?;
            emitted.push(name);
        }

        info!(
            "Emitted {} files, {} external dependencies",
            emitted.len(),
            external_dependencies.len()
        );
        Ok(ExtractionResult {
            external_dependencies,
            emitted_count: emitted.len(),
            entry_output_name,
            emitted,
        })
    }

    /// Rewrites the local specifiers of one source file, naming and queueing
    /// every file it reaches for the first time.
    fn rewrite_unit(
        &self,
        path: &Path,
        source: &str,
        registry: &mut NameRegistry,
        queue: &mut VecDeque<(PathBuf, String)>,
        external_dependencies: &mut BTreeMap<String, String>,
        sink: &mut dyn WarningSink,
    ) -> String {
        let scan = scan_source(path, source);
        if scan.errors > 0 {
            sink.warn(ExtractWarning::ParseErrors { path: path.to_path_buf(), count: scan.errors });
        }

        let mut edits = Vec::new();
        for spec in &scan.specifiers {
            let target = match classify(&spec.request) {
                SpecifierClass::Relative => resolve(path, &spec.request, &self.resolve_cache),
                SpecifierClass::External { package } => {
                    if let Some(local) = self.alias_target(&spec.request) {
                        Some(local)
                    } else {
                        self.record_external(package, external_dependencies);
                        continue;
                    }
                }
            };

            let Some(target) = target else {
                sink.warn(ExtractWarning::UnresolvedImport {
                    from: path.to_path_buf(),
                    request: spec.request.clone(),
                });
                continue;
            };

            let name = match registry.assign(&target) {
                Assignment::New(name) => {
                    queue.push_back((target, name.clone()));
                    name
                }
                Assignment::Existing(name) => name,
                Assignment::Collision { name, owner } => {
                    sink.warn(ExtractWarning::NameCollision { path: target, name, owner });
                    continue;
                }
                Assignment::Rejected => continue,
            };
            edits.push(Edit::replace(spec.span, import_target(&name)));
        }

        let rewritten = apply_edits(source, edits);
        if self.options.tree_shake {
            let removals = dead_statement_edits(path, &rewritten);
            return apply_edits(&rewritten, removals);
        }
        rewritten
    }

    fn alias_target(&self, request: &str) -> Option<PathBuf> {
        if self.options.tsconfig_paths.is_empty() {
            return None;
        }
        resolve_alias(request, &self.options.tsconfig_paths)
    }

    fn record_external(&self, package: String, deps: &mut BTreeMap<String, String>) {
        if self.builtins.is_builtin(&package) || deps.contains_key(&package) {
            return;
        }
        let version = self
            .options
            .manifest
            .as_ref()
            .and_then(|m| m.declared_version(&package))
            .unwrap_or_default()
            .to_string();
        debug!("Recording external dependency {}@{}", package, version);
        deps.insert(package, version);
    }
}

fn is_source(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|ext| JS_TS_EXTENSIONS.contains(&ext))
}

/// Writes a file that must not exist yet.
fn write_new(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ExtractError::OutputExists { path: path.to_path_buf() }.into());
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to create {}", path.display())),
    };
    file.write_all(contents).with_context(|| format!("Failed to write {}", path.display()))?;
    trace!("Wrote {}", path.display());
    Ok(())
}
