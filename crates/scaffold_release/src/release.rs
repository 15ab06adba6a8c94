use anyhow::{Context, Result};
use log::{debug, info};
use semver::Version;
use serde_json::json;
use std::{
    env,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use scaffold_core::{
    CommandSpec, ProcessRunner, ProjectInfo, RunMode, locate_project, update_manifest_field,
};

use crate::{config::ReleaseConfig, version::next_version};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReport {
    pub previous: Option<String>,
    pub version: Version,
    pub tag: String,
    pub manifest_path: PathBuf,
    /// Whether HEAD and the tag were pushed; false when no remote is set.
    pub pushed: bool,
    pub repository: Option<String>,
}

/// Bumps the version in `package.json`, commits and tags it, and pushes to
/// `origin` when a remote exists.
pub fn run_release(cfg: ReleaseConfig, runner: &dyn ProcessRunner) -> Result<ReleaseReport> {
    info!("Starting release");
    let cwd = match cfg.cwd {
        Some(dir) => dir,
        None => env::current_dir().context("Failed to read the current directory")?,
    };
    let project = locate_project(&cwd)?;
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis();
    release_project(&project, runner, timestamp)
}

pub(crate) fn release_project(
    project: &ProjectInfo,
    runner: &dyn ProcessRunner,
    timestamp_ms: u128,
) -> Result<ReleaseReport> {
    let dir = &project.root_dir;
    let previous = project.manifest.version.clone();
    let version = next_version(previous.as_deref(), timestamp_ms)?;
    let tag = format!("v{}", version);
    info!("Releasing {} ({})", version, tag);

    update_manifest_field(&project.manifest_path, "version", json!(version.to_string()))?;

    // Commit and tag the bump; the repository may not exist yet
    let manifest_arg = project.manifest_path.to_string_lossy().into_owned();
    runner.run(&git(dir, &["add", &manifest_arg]), RunMode::BestEffort)?;
    let message = format!("chore: release {}", version);
    runner.run(&git(dir, &["commit", "-m", &message]), RunMode::BestEffort)?;
    let tag_message = format!("Release {}", version);
    runner.run(&git(dir, &["tag", "-a", &tag, "-m", &tag_message]), RunMode::BestEffort)?;

    let inside = runner.output(&git(dir, &["rev-parse", "--is-inside-work-tree"]))?;
    if inside.as_deref() != Some("true") {
        info!("Not a git work tree; running git init");
        runner.run(&git(dir, &["init"]), RunMode::BestEffort)?;
    }

    let status = runner.output(&git(dir, &["status", "--porcelain"]))?;
    if status.is_some_and(|s| !s.is_empty()) {
        info!("Committing pending changes");
        runner
            .run(&git(dir, &["add", "."]), RunMode::Strict)
            .and_then(|_| {
                runner.run(&git(dir, &["commit", "-m", "Update files before release"]), RunMode::Strict)
            })
            .context("Failed to commit pending changes")?;
    }

    let remotes = runner.output(&git(dir, &["remote"]))?;
    let pushed = match remotes {
        Some(r) if !r.is_empty() => {
            runner
                .run(&git(dir, &["push", "origin", "HEAD"]), RunMode::Strict)
                .and_then(|_| runner.run(&git(dir, &["push", "origin", &tag]), RunMode::Strict))
                .context("Failed to push to the remote repository")?;
            true
        }
        _ => {
            debug!("No git remote configured; skipping push");
            false
        }
    };

    Ok(ReleaseReport {
        previous,
        version,
        tag,
        manifest_path: project.manifest_path.clone(),
        pushed,
        repository: project.manifest.repository_url(),
    })
}

fn git(dir: &Path, args: &[&str]) -> CommandSpec {
    CommandSpec::new("git", args.iter().copied()).cwd(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::{cell::RefCell, collections::HashMap, fs};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Answers `output` from a table keyed by the git arguments; `run`
    /// records the call and fails for the arguments in `failing`.
    #[derive(Default)]
    struct FakeGit {
        outputs: HashMap<&'static str, &'static str>,
        failing: Vec<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeGit {
        fn args(cmd: &CommandSpec) -> String {
            cmd.args.join(" ")
        }
    }

    impl ProcessRunner for FakeGit {
        fn run(&self, cmd: &CommandSpec, mode: RunMode) -> Result<i32> {
            let args = Self::args(cmd);
            self.calls.borrow_mut().push(args.clone());
            if self.failing.contains(&args.as_str()) {
                if mode == RunMode::Strict {
                    bail!("git {} failed", args);
                }
                return Ok(1);
            }
            Ok(0)
        }

        fn output(&self, cmd: &CommandSpec) -> Result<Option<String>> {
            let args = Self::args(cmd);
            self.calls.borrow_mut().push(args.clone());
            Ok(self.outputs.get(args.as_str()).map(|s| s.to_string()))
        }
    }

    fn project(root: &Path, manifest: &str) -> ProjectInfo {
        create_test_file(root, "package.json", manifest);
        locate_project(root).unwrap()
    }

    #[test]
    fn test_release_with_remote() {
        let temp_dir = TempDir::new().unwrap();
        let info = project(
            temp_dir.path(),
            r#"{ "name": "pkg", "version": "1.2.3", "repository": "github:acme/pkg", "private": true }"#,
        );
        let runner = FakeGit {
            outputs: HashMap::from([
                ("rev-parse --is-inside-work-tree", "true"),
                ("status --porcelain", "M src/index.ts"),
                ("remote", "origin"),
            ]),
            ..Default::default()
        };

        let report = release_project(&info, &runner, 1700000000000).unwrap();

        assert_eq!(report.previous.as_deref(), Some("1.2.3"));
        assert_eq!(report.version.to_string(), "1.2.4+1700000000000");
        assert_eq!(report.tag, "v1.2.4+1700000000000");
        assert!(report.pushed);
        assert_eq!(report.repository.as_deref(), Some("https://github.com/acme/pkg"));

        let manifest = info.manifest_path.to_string_lossy().into_owned();
        assert_eq!(
            *runner.calls.borrow(),
            vec![
                format!("add {}", manifest),
                "commit -m chore: release 1.2.4+1700000000000".to_string(),
                "tag -a v1.2.4+1700000000000 -m Release 1.2.4+1700000000000".to_string(),
                "rev-parse --is-inside-work-tree".to_string(),
                "status --porcelain".to_string(),
                "add .".to_string(),
                "commit -m Update files before release".to_string(),
                "remote".to_string(),
                "push origin HEAD".to_string(),
                "push origin v1.2.4+1700000000000".to_string(),
            ]
        );

        // Version rewritten in place, other keys kept in order
        let text = fs::read_to_string(&info.manifest_path).unwrap();
        let keys: Vec<String> = serde_json::from_str::<serde_json::Value>(&text)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["name", "version", "repository", "private"]);
        assert!(text.contains("\"version\": \"1.2.4+1700000000000\""));
    }

    #[test]
    fn test_release_outside_repository_without_remote() {
        let temp_dir = TempDir::new().unwrap();
        let info = project(temp_dir.path(), r#"{ "name": "pkg" }"#);
        let manifest = info.manifest_path.to_string_lossy().into_owned();
        let runner = FakeGit {
            failing: vec!["commit -m chore: release 0.0.2+42", "tag -a v0.0.2+42 -m Release 0.0.2+42"],
            ..Default::default()
        };

        let report = release_project(&info, &runner, 42).unwrap();

        assert!(!report.pushed);
        assert_eq!(report.previous, None);
        assert_eq!(report.version.to_string(), "0.0.2+42");
        let calls = runner.calls.borrow();
        assert_eq!(calls[0], format!("add {}", manifest));
        assert!(calls.contains(&"init".to_string()));
        assert!(!calls.iter().any(|c| c.starts_with("push")));
    }

    #[test]
    fn test_failed_push_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let info = project(temp_dir.path(), r#"{ "name": "pkg", "version": "0.1.0" }"#);
        let runner = FakeGit {
            outputs: HashMap::from([("rev-parse --is-inside-work-tree", "true"), ("remote", "origin")]),
            failing: vec!["push origin HEAD"],
            ..Default::default()
        };

        let err = release_project(&info, &runner, 1).unwrap_err();
        assert!(err.to_string().contains("Failed to push"));
    }

    #[test]
    fn test_invalid_version_leaves_manifest_alone() {
        let temp_dir = TempDir::new().unwrap();
        let original = r#"{ "name": "pkg", "version": "latest" }"#;
        let info = project(temp_dir.path(), original);
        let runner = FakeGit::default();

        assert!(release_project(&info, &runner, 1).is_err());
        assert_eq!(fs::read_to_string(&info.manifest_path).unwrap(), original);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_run_release_requires_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let runner = FakeGit::default();
        let cfg = ReleaseConfig { cwd: Some(temp_dir.path().to_path_buf()) };

        // Only meaningful when no ancestor of the temp dir has a package.json
        if locate_project(temp_dir.path()).is_err() {
            assert!(run_release(cfg, &runner).is_err());
        }
    }
}
