use anyhow::{Context, Result};
use log::{debug, warn};
use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::error::CoreError;

/// An external program invocation. Arguments are passed as a vector, never
/// through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Child shares the terminal; otherwise its output is discarded.
    pub inherit_io: bool,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
            inherit_io: true,
        }
    }

    pub fn cwd(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    pub fn quiet(mut self) -> Self {
        self.inherit_io = false;
        self
    }

    /// Command line for logs and error messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// A non-zero exit is an error.
    Strict,
    /// A non-zero exit (or a failed spawn) is logged and the code returned.
    BestEffort,
}

pub trait ProcessRunner {
    fn run(&self, cmd: &CommandSpec, mode: RunMode) -> Result<i32>;

    /// Trimmed stdout of a successful run, `None` when the program is missing
    /// or exits non-zero.
    fn output(&self, cmd: &CommandSpec) -> Result<Option<String>>;
}

/// Spawns real processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec, mode: RunMode) -> Result<i32> {
        debug!("Running: {}", cmd.display());
        let mut command = cmd.command();
        if !cmd.inherit_io {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let status = match command.status() {
            Ok(status) => status,
            Err(e) if mode == RunMode::BestEffort => {
                warn!("Failed to start `{}`: {}", cmd.display(), e);
                return Ok(-1);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to start `{}`", cmd.display()));
            }
        };

        let code = status.code().unwrap_or(-1);
        if !status.success() {
            match mode {
                RunMode::Strict => {
                    return Err(CoreError::Process { command: cmd.display(), code }.into());
                }
                RunMode::BestEffort => warn!("`{}` exited with code {}", cmd.display(), code),
            }
        }
        Ok(code)
    }

    fn output(&self, cmd: &CommandSpec) -> Result<Option<String>> {
        if !program_exists(&cmd.program) {
            debug!("`{}` is not on PATH", cmd.program);
            return Ok(None);
        }
        debug!("Capturing: {}", cmd.display());
        let output = cmd
            .command()
            .stderr(Stdio::null())
            .output()
            .with_context(|| format!("Failed to start `{}`", cmd.display()))?;
        if !output.status.success() {
            debug!("`{}` exited with {:?}", cmd.display(), output.status.code());
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }
}

/// Whether `program` is found on `PATH`.
pub fn program_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_arguments() {
        let cmd = CommandSpec::new("git", ["tag", "-a", "v1.0.0"]);
        assert_eq!(cmd.display(), "git tag -a v1.0.0");
        assert!(cmd.inherit_io);
        assert!(cmd.cwd.is_none());
    }

    #[test]
    fn test_builder_sets_cwd_and_quiet() {
        let cmd = CommandSpec::new("npm", ["install"]).cwd(Path::new("/tmp/app")).quiet();
        assert_eq!(cmd.cwd.as_deref(), Some(Path::new("/tmp/app")));
        assert!(!cmd.inherit_io);
    }

    #[test]
    fn test_best_effort_swallows_missing_program() {
        let cmd = CommandSpec::new("definitely-not-a-real-program-4711", Vec::<String>::new());
        assert_eq!(SystemRunner.run(&cmd, RunMode::BestEffort).unwrap(), -1);
        assert!(SystemRunner.run(&cmd, RunMode::Strict).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_strict_fails_on_non_zero_exit() {
        let cmd = CommandSpec::new("sh", ["-c", "exit 3"]).quiet();
        let err = SystemRunner.run(&cmd, RunMode::Strict).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::Process { code: 3, .. })));
        assert_eq!(SystemRunner.run(&cmd, RunMode::BestEffort).unwrap(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_output_trims_stdout() {
        let cmd = CommandSpec::new("sh", ["-c", "echo '  hello  '"]);
        assert_eq!(SystemRunner.output(&cmd).unwrap().as_deref(), Some("hello"));

        let failing = CommandSpec::new("sh", ["-c", "exit 1"]);
        assert_eq!(SystemRunner.output(&failing).unwrap(), None);

        let missing = CommandSpec::new("definitely-not-a-real-program-4711", ["--version"]);
        assert_eq!(SystemRunner.output(&missing).unwrap(), None);
    }
}
