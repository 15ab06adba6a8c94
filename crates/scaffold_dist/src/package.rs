use anyhow::Result;
use log::debug;
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

use scaffold_core::{PackageManifest, write_json_pretty};

use crate::types::ExtractionResult;

const DEFAULT_VERSION: &str = "1.0.0";

/// The `package.json` for an extracted directory.
///
/// Dependencies the host declares only under `devDependencies` stay dev
/// dependencies; everything else, undeclared packages included, is a runtime
/// dependency.
pub fn build_dist_manifest(
    name: &str,
    host: Option<&PackageManifest>,
    result: &ExtractionResult,
) -> Value {
    let main = format!("./{}", result.entry_output_name);
    let types = is_typescript(&result.entry_output_name).then(|| main.clone());

    let mut dependencies = Map::new();
    let mut dev_dependencies = Map::new();
    for (package, version) in &result.external_dependencies {
        if host.is_some_and(|h| h.is_dev_only(package)) {
            dev_dependencies.insert(package.clone(), json!(version));
        } else {
            dependencies.insert(package.clone(), json!(version));
        }
    }
    debug!(
        "Dist manifest lists {} dependencies, {} devDependencies",
        dependencies.len(),
        dev_dependencies.len()
    );

    let mut manifest = Map::new();
    manifest.insert("name".into(), json!(name));
    let version = host.and_then(|h| h.version.as_deref()).unwrap_or(DEFAULT_VERSION);
    manifest.insert("version".into(), json!(version));
    if let Some(description) = host.and_then(|h| h.description.as_deref()) {
        manifest.insert("description".into(), json!(description));
    }
    if let Some(author) = host.and_then(|h| h.author.clone()) {
        manifest.insert("author".into(), author);
    }
    if let Some(license) = host.and_then(|h| h.license.as_deref()) {
        manifest.insert("license".into(), json!(license));
    }
    if let Some(repository) = host.and_then(|h| h.repository.clone()) {
        manifest.insert("repository".into(), repository);
    }
    manifest.insert("type".into(), json!("module"));
    manifest.insert("main".into(), json!(main));
    if let Some(types) = &types {
        manifest.insert("types".into(), json!(types));
    }

    let mut export = Map::new();
    if let Some(types) = &types {
        export.insert("types".into(), json!(types));
    }
    export.insert("import".into(), json!(main));
    export.insert("default".into(), json!(main));
    manifest.insert("exports".into(), json!({ ".": export }));

    manifest.insert("dependencies".into(), Value::Object(dependencies));
    manifest.insert("devDependencies".into(), Value::Object(dev_dependencies));
    Value::Object(manifest)
}

/// Writes `out_dir/package.json` and returns its path.
pub fn write_dist_manifest(out_dir: &Path, manifest: &Value) -> Result<PathBuf> {
    let path = out_dir.join("package.json");
    write_json_pretty(&path, manifest)?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

fn is_typescript(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| matches!(ext, "ts" | "tsx" | "mts" | "cts"))
}
