use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info, warn};
use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

use scaffold_core::{
    BuiltinModules, Outcome, ProjectInfo, Prompt, list_source_files, locate_project,
    read_tsconfig_paths, remove_dir_if_exists, validate_dir_name,
};

use crate::{
    config::DistConfig,
    extractor::Extractor,
    package::{build_dist_manifest, write_dist_manifest},
    types::{ExtractOptions, ExtractWarning, ExtractionResult, WarningSink},
};

const DEFAULT_OUT_DIR: &str = "dist";

/// What a completed `dist` run produced.
#[derive(Debug)]
pub struct DistReport {
    pub out_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub result: ExtractionResult,
    pub warnings: Vec<ExtractWarning>,
}

/// Interactive `dist`: pick an output directory and an entry file in the
/// working directory, extract, and write the trimmed `package.json`.
pub fn run_dist(cfg: DistConfig, prompt: &mut dyn Prompt) -> Result<Outcome<DistReport>> {
    info!("Starting dist");
    let cwd = match cfg.cwd.clone() {
        Some(dir) => dir,
        None => env::current_dir().context("Failed to read the current directory")?,
    };
    let cwd = cwd.canonicalize().unwrap_or(cwd);
    let project = locate_project(&cwd)?;
    info!("Using project: {}", project.manifest_path.display());

    let Some(out_name) = ask_out_dir(cfg.out_dir.as_deref(), &cwd, prompt)? else {
        return Ok(Outcome::Cancelled);
    };
    let entry = match &cfg.entry {
        Some(entry) => cwd.join(entry),
        None => match ask_entry(&cwd, prompt)? {
            Some(entry) => entry,
            None => return Ok(Outcome::Cancelled),
        },
    };
    let out_dir = cwd.join(&out_name);

    let tsconfig_paths =
        if cfg.tsconfig_paths { read_tsconfig_paths(&project.root_dir) } else { HashMap::new() };
    let extractor = Extractor::new(BuiltinModules::node()).with_options(ExtractOptions {
        naming: cfg.naming,
        tree_shake: cfg.tree_shake,
        tsconfig_paths,
        manifest: Some(project.manifest.clone()),
    });

    let package_name = project.manifest.name.clone().unwrap_or_else(|| out_name.clone());
    let mut warnings = Vec::new();
    match extract_package(&extractor, &entry, &out_dir, &project, &package_name, &mut warnings) {
        Ok((result, manifest_path)) => {
            Ok(Outcome::Completed(DistReport { out_dir, manifest_path, result, warnings }))
        }
        Err(e) => {
            remove_dir_if_exists(&out_dir);
            Err(e)
        }
    }
}

/// Extracts `entry` into `out_dir` and writes the dist `package.json` there.
pub fn extract_package(
    extractor: &Extractor,
    entry: &Path,
    out_dir: &Path,
    project: &ProjectInfo,
    package_name: &str,
    sink: &mut dyn WarningSink,
) -> Result<(ExtractionResult, PathBuf)> {
    let result = extractor.extract(entry, out_dir, &project.root_dir, sink)?;
    let manifest = build_dist_manifest(package_name, Some(&project.manifest), &result);
    let manifest_path = write_dist_manifest(out_dir, &manifest)?;
    Ok((result, manifest_path))
}

fn ask_out_dir(given: Option<&str>, cwd: &Path, prompt: &mut dyn Prompt) -> Result<Option<String>> {
    if let Some(name) = given {
        return validate_dir_name(name, cwd).map(Some).map_err(|msg| anyhow!(msg));
    }
    loop {
        let Some(answer) = prompt.ask_text("Output directory name", DEFAULT_OUT_DIR)? else {
            return Ok(None);
        };
        let answer = if answer.trim().is_empty() { DEFAULT_OUT_DIR.to_string() } else { answer };
        match validate_dir_name(&answer, cwd) {
            Ok(name) => return Ok(Some(name)),
            Err(msg) => warn!("{}", msg),
        }
    }
}

fn ask_entry(cwd: &Path, prompt: &mut dyn Prompt) -> Result<Option<PathBuf>> {
    let candidates = list_source_files(cwd);
    if candidates.is_empty() {
        bail!("No source files found in {}", cwd.display());
    }
    let names: Vec<String> = candidates
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let Some(index) = prompt.ask_select("Entry file", &names)? else {
        return Ok(None);
    };
    let entry = candidates.get(index).cloned().context("Selection out of range")?;
    debug!("Selected entry: {}", entry.display());
    Ok(Some(entry))
}
