use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, trace};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::error::CoreError;
use crate::manifest::{PackageManifest, ProjectInfo};

/// Walks up from `start_dir` to the nearest directory holding a `package.json`.
pub fn locate_project(start_dir: &Path) -> Result<ProjectInfo> {
    debug!("Searching for package.json from {:?}", start_dir);
    let mut current_dir = start_dir.to_path_buf();

    loop {
        let manifest_path = current_dir.join("package.json");
        trace!("Checking for package.json at: {:?}", manifest_path);
        if manifest_path.is_file() {
            debug!("Found project root at: {:?}", current_dir);
            let text = fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
            let raw: serde_json::Value = serde_json::from_str(&text).map_err(|source| {
                CoreError::InvalidManifest { path: manifest_path.clone(), source }
            })?;
            let manifest: PackageManifest = serde_json::from_value(raw.clone()).map_err(
                |source| CoreError::InvalidManifest { path: manifest_path.clone(), source },
            )?;
            return Ok(ProjectInfo { manifest_path, manifest, raw, root_dir: current_dir });
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                debug!("No package.json in any parent folder of {:?}", start_dir);
                return Err(CoreError::ProjectNotFound { start: start_dir.to_path_buf() }.into());
            }
        }
    }
}

/// Collects `compilerOptions.paths` aliases from every `tsconfig.json` under
/// `root`, with targets made absolute against each file's `baseUrl`.
pub fn read_tsconfig_paths(root: &Path) -> HashMap<String, Vec<String>> {
    debug!("Reading tsconfig paths from root: {:?}", root);
    let mut paths = HashMap::new();

    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .filter_entry(|e| e.file_name() != "node_modules" && e.file_name() != ".git")
        .build();

    let mut tsconfig_files: Vec<PathBuf> = walker
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() == "tsconfig.json")
        .map(|e| e.into_path())
        .collect();
    // Deterministic precedence when two files declare the same alias
    tsconfig_files.sort();
    debug!("Found {} tsconfig.json files", tsconfig_files.len());

    for tsconfig_path in &tsconfig_files {
        trace!("Checking tsconfig at: {:?}", tsconfig_path);
        let Ok(content) = fs::read_to_string(tsconfig_path) else {
            continue;
        };
        let Ok(json) = serde_json::from_str::<serde_json::Value>(&strip_json_comments(&content))
        else {
            trace!("Skipping unparsable tsconfig: {:?}", tsconfig_path);
            continue;
        };

        if let Some(compiler_options) = json.get("compilerOptions")
            && let Some(paths_obj) = compiler_options.get("paths").and_then(|p| p.as_object())
        {
            let base_url = compiler_options.get("baseUrl").and_then(|b| b.as_str()).unwrap_or(".");
            let tsconfig_dir = tsconfig_path.parent().unwrap_or(root);
            let base_path = tsconfig_dir.join(base_url);

            for (alias, targets) in paths_obj {
                let Some(target_arr) = targets.as_array() else {
                    continue;
                };
                let resolved_targets: Vec<String> = target_arr
                    .iter()
                    .filter_map(|t| t.as_str())
                    .map(|t| base_path.join(t.trim_end_matches("/*")).to_string_lossy().to_string())
                    .collect();

                if !resolved_targets.is_empty() {
                    let alias_key = alias.trim_end_matches("/*").to_string();
                    trace!("Found tsconfig path alias: '{}' -> {:?}", alias_key, resolved_targets);
                    paths.insert(alias_key, resolved_targets);
                }
            }
        }
    }

    debug!("Loaded {} tsconfig path aliases", paths.len());
    paths
}

/// Removes `//` and `/* */` comments outside of string literals.
fn strip_json_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match (c, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_locate_project_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(
            root,
            "package.json",
            r#"{"name":"demo","version":"1.2.3","dependencies":{"lodash":"^4.17.21"},"devDependencies":{"vitest":"^1.0.0"}}"#,
        );
        let subdir = root.join("src").join("components");
        fs::create_dir_all(&subdir).unwrap();

        let project = locate_project(&subdir).unwrap();
        assert_eq!(project.root_dir, root);
        assert_eq!(project.manifest_path, root.join("package.json"));
        assert_eq!(project.manifest.name.as_deref(), Some("demo"));
        assert_eq!(project.manifest.version.as_deref(), Some("1.2.3"));
        assert_eq!(project.manifest.declared_version("lodash"), Some("^4.17.21"));
        assert_eq!(project.manifest.declared_version("vitest"), Some("^1.0.0"));
        assert_eq!(project.raw["name"], "demo");
    }

    #[test]
    fn test_locate_project_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("nested").join("deep");
        fs::create_dir_all(&subdir).unwrap();

        // Only meaningful when no ancestor of the temp dir carries a package.json
        if locate_project(&std::env::temp_dir()).is_ok() {
            return;
        }
        let err = locate_project(&subdir).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::ProjectNotFound { .. })));
    }

    #[test]
    fn test_locate_project_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "package.json", "{ not json");

        let err = locate_project(temp_dir.path()).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::InvalidManifest { .. })));
    }

    #[test]
    fn test_read_tsconfig_paths_simple() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let tsconfig_content = r#"
{
  "compilerOptions": {
    "baseUrl": ".",
    "paths": {
      "@components/*": ["src/components/*"],
      "@utils": ["src/utils"]
    }
  }
}
"#;
        create_test_file(root, "tsconfig.json", tsconfig_content);

        let paths = read_tsconfig_paths(root);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains_key("@components"));
        assert!(paths.contains_key("@utils"));

        let components_paths = paths.get("@components").unwrap();
        assert_eq!(components_paths.len(), 1);
        assert!(components_paths[0].contains("src/components"));
    }

    #[test]
    fn test_read_tsconfig_paths_with_base_url() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let tsconfig_content = r#"
{
  "compilerOptions": {
    "baseUrl": "src",
    "paths": {
      "@components/*": ["components/*"]
    }
  }
}
"#;
        create_test_file(root, "tsconfig.json", tsconfig_content);

        let paths = read_tsconfig_paths(root);
        let components_paths = paths.get("@components").unwrap();
        assert!(components_paths[0].contains("src/components"));
    }

    #[test]
    fn test_read_tsconfig_paths_with_comments_and_urls() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let tsconfig_content = r#"
{
  // This is a comment
  "$schema": "https://json.schemastore.org/tsconfig",
  "compilerOptions": {
    /* block
       comment */
    "baseUrl": ".", // Another comment
    "paths": {
      "@components/*": ["src/components/*"] // Path comment
    }
  }
}
"#;
        create_test_file(root, "tsconfig.json", tsconfig_content);

        let paths = read_tsconfig_paths(root);
        assert_eq!(paths.len(), 1);
        assert!(paths.contains_key("@components"));
    }

    #[test]
    fn test_read_tsconfig_paths_skips_node_modules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_test_file(
            root,
            "node_modules/pkg/tsconfig.json",
            r#"{"compilerOptions":{"paths":{"@pkg/*":["src/*"]}}}"#,
        );

        let paths = read_tsconfig_paths(root);
        assert!(paths.is_empty());
    }

    #[test]
    fn test_read_tsconfig_paths_empty() {
        let temp_dir = TempDir::new().unwrap();
        let paths = read_tsconfig_paths(temp_dir.path());
        assert_eq!(paths.len(), 0);
    }

    #[test]
    fn test_strip_json_comments_keeps_strings() {
        let stripped = strip_json_comments(r#"{"a": "x//y", "b": "/*z*/"} // tail"#);
        let json: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(json["a"], "x//y");
        assert_eq!(json["b"], "/*z*/");
    }
}
