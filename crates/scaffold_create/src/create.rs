use anyhow::{Context, Result, anyhow, bail};
use log::{debug, info, warn};
use serde_json::json;
use std::{
    env,
    path::{Path, PathBuf},
};

use scaffold_core::{
    BuiltinModules, CommandSpec, Outcome, ProcessRunner, Prompt, RunMode, copy_dir,
    list_source_files, locate_project, remove_dir_if_exists, update_manifest_field,
    validate_dir_name,
};
use scaffold_dist::{ExtractOptions, Extractor, LogSink, extract_package};

use crate::{
    catalog::{Template, TemplateCatalog, TemplateSource},
    config::CreateConfig,
};

const DEFAULT_PROJECT_NAME: &str = "my-app";

/// Package managers in order of preference; the last one is assumed present.
const PACKAGE_MANAGERS: &[&str] = &["pnpm", "yarn", "npm"];

/// What a completed `create` run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub name: String,
    pub target: PathBuf,
    pub template: Template,
    /// The package manager dependencies were installed with, `None` when
    /// installation was skipped.
    pub installed_with: Option<String>,
}

/// Creates `<cwd>/<name>` from a template, renames its package and installs
/// its dependencies. The target directory is removed again when the run
/// fails or is cancelled after it was created.
pub fn run_create(
    cfg: CreateConfig,
    prompt: &mut dyn Prompt,
    runner: &dyn ProcessRunner,
) -> Result<Outcome<CreateReport>> {
    info!("Starting create");
    let cwd = match cfg.cwd.clone() {
        Some(dir) => dir,
        None => env::current_dir().context("Failed to read the current directory")?,
    };

    let Some(name) = ask_name(cfg.name.as_deref(), &cwd, prompt)? else {
        return Ok(Outcome::Cancelled);
    };

    let mut catalog = TemplateCatalog::builtin();
    if let Some(dir) = &cfg.templates_dir {
        catalog = catalog.with_templates_dir(dir)?;
    }
    let Some(template) = choose_template(&catalog, cfg.template.as_deref(), prompt)? else {
        return Ok(Outcome::Cancelled);
    };
    info!("Creating {} from template '{}'", name, template.id);

    let target = cwd.join(&name);
    match build_project(&cfg, &cwd, &name, &target, &template, prompt, runner) {
        Ok(Outcome::Completed(installed_with)) => {
            Ok(Outcome::Completed(CreateReport { name, target, template, installed_with }))
        }
        Ok(Outcome::Cancelled) => {
            remove_dir_if_exists(&target);
            Ok(Outcome::Cancelled)
        }
        Err(e) => {
            remove_dir_if_exists(&target);
            Err(e)
        }
    }
}

fn build_project(
    cfg: &CreateConfig,
    cwd: &Path,
    name: &str,
    target: &Path,
    template: &Template,
    prompt: &mut dyn Prompt,
    runner: &dyn ProcessRunner,
) -> Result<Outcome<Option<String>>> {
    match &template.source {
        TemplateSource::Degit { repo } => {
            let target_arg = target.to_string_lossy().into_owned();
            let cmd = CommandSpec::new("npx", ["degit", repo.as_str(), target_arg.as_str()]).cwd(cwd);
            runner.run(&cmd, RunMode::Strict)?;
        }
        TemplateSource::Directory { path } => {
            let dist = path.join("dist");
            let source = if dist.is_dir() { dist } else { path.clone() };
            let copied = copy_dir(&source, target)?;
            info!("Copied {} template files", copied);
        }
        TemplateSource::Local => {
            let Some(entry) = local_entry(cfg.from.as_deref(), cwd, prompt)? else {
                return Ok(Outcome::Cancelled);
            };
            extract_local(&entry, target, name)?;
        }
    }

    rename_package(target, name);

    if cfg.skip_install {
        debug!("Skipping dependency installation");
        return Ok(Outcome::Completed(None));
    }
    let pm = detect_package_manager(runner);
    info!("Installing dependencies with {}", pm);
    runner.run(&CommandSpec::new(pm, ["install"]).cwd(target), RunMode::Strict)?;
    Ok(Outcome::Completed(Some(pm.to_string())))
}

fn ask_name(given: Option<&str>, cwd: &Path, prompt: &mut dyn Prompt) -> Result<Option<String>> {
    if let Some(name) = given {
        return validate_dir_name(name, cwd).map(Some).map_err(|msg| anyhow!(msg));
    }
    loop {
        let Some(answer) = prompt.ask_text("Project name", DEFAULT_PROJECT_NAME)? else {
            return Ok(None);
        };
        if answer.trim().is_empty() {
            return Ok(None);
        }
        match validate_dir_name(&answer, cwd) {
            Ok(name) => return Ok(Some(name)),
            Err(msg) => warn!("{}", msg),
        }
    }
}

fn choose_template(
    catalog: &TemplateCatalog,
    given: Option<&str>,
    prompt: &mut dyn Prompt,
) -> Result<Option<Template>> {
    if let Some(id) = given {
        let template = catalog.find(id).with_context(|| format!("Unknown template '{}'", id))?;
        return Ok(Some(template.clone()));
    }
    let Some(index) = prompt.ask_select("Template", &catalog.choices())? else {
        return Ok(None);
    };
    let template = catalog.templates().get(index).context("Selection out of range")?;
    Ok(Some(template.clone()))
}

/// Entry file for the local template: a file is used as is, a directory
/// offers its source files.
fn local_entry(given: Option<&Path>, cwd: &Path, prompt: &mut dyn Prompt) -> Result<Option<PathBuf>> {
    let path = match given {
        Some(path) => cwd.join(path),
        None => match prompt.ask_text("Entry file or project directory", "")? {
            Some(answer) if !answer.trim().is_empty() => cwd.join(answer.trim()),
            _ => return Ok(None),
        },
    };
    if !path.is_dir() {
        return Ok(Some(path));
    }

    let candidates = list_source_files(&path);
    if candidates.is_empty() {
        bail!("No source files found in {}", path.display());
    }
    let names: Vec<String> = candidates
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let Some(index) = prompt.ask_select("Entry file", &names)? else {
        return Ok(None);
    };
    Ok(candidates.get(index).cloned())
}

fn extract_local(entry: &Path, target: &Path, name: &str) -> Result<()> {
    let start = entry.parent().unwrap_or(Path::new("."));
    let project = locate_project(start)?;
    let extractor = Extractor::new(BuiltinModules::node())
        .with_options(ExtractOptions { manifest: Some(project.manifest.clone()), ..Default::default() });
    let (result, _) = extract_package(&extractor, entry, target, &project, name, &mut LogSink)?;
    info!("Extracted {} files from {}", result.emitted_count, entry.display());
    Ok(())
}

fn rename_package(target: &Path, name: &str) {
    let manifest_path = target.join("package.json");
    if !manifest_path.is_file() {
        warn!("No package.json in {}; name not set", target.display());
        return;
    }
    match update_manifest_field(&manifest_path, "name", json!(name)) {
        Ok(()) => info!("Set package name to {}", name),
        Err(e) => warn!("Failed to set package name: {:#}", e),
    }
}

/// First of pnpm, yarn that answers `--version`, else npm.
fn detect_package_manager(runner: &dyn ProcessRunner) -> &'static str {
    for &pm in &PACKAGE_MANAGERS[..PACKAGE_MANAGERS.len() - 1] {
        let probe = CommandSpec::new(pm, ["--version"]).quiet();
        if matches!(runner.output(&probe), Ok(Some(_))) {
            debug!("Detected package manager: {}", pm);
            return pm;
        }
    }
    PACKAGE_MANAGERS[PACKAGE_MANAGERS.len() - 1]
}
