use clap::Parser;
use std::path::PathBuf;

use crate::types::NamingStrategy;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "dist")]
#[command(about = "Copy the import closure of an entry file into a standalone package")]
pub struct DistConfig {
    /// Entry file (prompted for when omitted)
    #[arg(long)]
    pub entry: Option<PathBuf>,

    /// Name of the output directory, created next to the entry's project (prompted for when omitted)
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Directory to start from (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Remove unreferenced top-level declarations from emitted files
    #[arg(long)]
    pub tree_shake: bool,

    /// How emitted files are named
    #[arg(long, value_enum, default_value_t = NamingStrategy::Flatten)]
    pub naming: NamingStrategy,

    /// Resolve tsconfig.json `paths` aliases as local files
    #[arg(long)]
    pub tsconfig_paths: bool,
}
