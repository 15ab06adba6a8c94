use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "release")]
#[command(about = "Bump the patch version, commit, tag and push")]
pub struct ReleaseConfig {
    /// Directory to search for package.json from (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}
