use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions raised by the core helpers.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("No package.json found in {} or any parent directory", start.display())]
    ProjectNotFound { start: PathBuf },

    #[error("Invalid package.json at {}: {source}", path.display())]
    InvalidManifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{command}` exited with code {code}")]
    Process { command: String, code: i32 },
}
