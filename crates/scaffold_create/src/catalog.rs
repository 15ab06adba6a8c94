use anyhow::{Context, Result};
use log::{debug, trace};
use std::{
    fs,
    path::{Path, PathBuf},
};

use scaffold_core::PackageManifest;

/// Id of the template that distills a local project.
pub const LOCAL_TEMPLATE_ID: &str = "local";

/// Prefix of ids for templates found in a templates directory.
const DIRECTORY_PREFIX: &str = "tpls-";

const DEGIT_TEMPLATES: &[(&str, &str)] = &[
    ("see7788/electron-template", "Electron application starter"),
    ("see7788/ts-template", "Basic TypeScript starter"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Remote repository mirrored with `npx degit`.
    Degit { repo: String },
    /// A template directory; its `dist/` subdirectory wins when present.
    Directory { path: PathBuf },
    /// An entry file of a local project, run through the extractor.
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub source: TemplateSource,
}

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// The local template followed by the remote starters.
    pub fn builtin() -> Self {
        let mut templates = vec![Template {
            id: LOCAL_TEMPLATE_ID.to_string(),
            title: "Extract from a local project".to_string(),
            source: TemplateSource::Local,
        }];
        templates.extend(DEGIT_TEMPLATES.iter().map(|(repo, title)| Template {
            id: repo.to_string(),
            title: title.to_string(),
            source: TemplateSource::Degit { repo: repo.to_string() },
        }));
        Self { templates }
    }

    /// Adds every subdirectory of `dir` as a template, titled after its
    /// `package.json` name and description when it has one.
    pub fn with_templates_dir(mut self, dir: &Path) -> Result<Self> {
        debug!("Reading templates from {}", dir.display());
        let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("Failed to read templates directory {}", dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        subdirs.sort();

        for path in subdirs {
            let Some(dir_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let manifest = read_manifest(&path.join("package.json"));
            let name = manifest.as_ref().and_then(|m| m.name.clone()).unwrap_or_else(|| dir_name.clone());
            let title = match manifest.and_then(|m| m.description) {
                Some(description) if !description.is_empty() => format!("{} - {}", name, description),
                _ => name,
            };
            trace!("Found template '{}' at {}", title, path.display());
            self.templates.push(Template {
                id: format!("{}{}", DIRECTORY_PREFIX, dir_name),
                title,
                source: TemplateSource::Directory { path },
            });
        }
        Ok(self)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn find(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Numbered menu entries, in catalog order.
    pub fn choices(&self) -> Vec<String> {
        self.templates.iter().enumerate().map(|(i, t)| format!("{}. {}", i + 1, t.title)).collect()
    }
}

fn read_manifest(path: &Path) -> Option<PackageManifest> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}
