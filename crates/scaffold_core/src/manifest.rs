use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// The fields of a `package.json` this tool reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub author: Option<Value>,
    pub repository: Option<Value>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Version range declared for `package`, runtime dependencies first.
    pub fn declared_version(&self, package: &str) -> Option<&str> {
        self.dependencies
            .get(package)
            .or_else(|| self.dev_dependencies.get(package))
            .map(String::as_str)
    }

    pub fn is_dev_only(&self, package: &str) -> bool {
        !self.dependencies.contains_key(package) && self.dev_dependencies.contains_key(package)
    }

    /// Browsable repository URL from `repository` (string or `{ url }`).
    pub fn repository_url(&self) -> Option<String> {
        let url = match self.repository.as_ref()? {
            Value::String(s) => s.clone(),
            Value::Object(obj) => obj.get("url")?.as_str()?.to_string(),
            _ => return None,
        };
        let url = url.trim_start_matches("git+").trim_end_matches(".git");
        if url.is_empty() {
            return None;
        }
        match url.strip_prefix("github:") {
            Some(slug) => Some(format!("https://github.com/{}", slug)),
            None => Some(url.to_string()),
        }
    }
}

/// A located project: its manifest and the directory holding it.
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub manifest_path: PathBuf,
    pub manifest: PackageManifest,
    /// The manifest as parsed, key order preserved.
    pub raw: Value,
    pub root_dir: PathBuf,
}

/// Sets one top-level key of a `package.json`, keeping every other key and
/// the key order intact.
pub fn update_manifest_field(path: &Path, key: &str, value: Value) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut json: Value =
        serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    let obj = json
        .as_object_mut()
        .with_context(|| format!("{} is not a JSON object", path.display()))?;
    obj.insert(key.to_string(), value);
    debug!("Updated '{}' in {}", key, path.display());
    write_json_pretty(path, &json)
}

/// Writes `value` with two-space indentation and a trailing newline.
pub fn write_json_pretty(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
