use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "create")]
#[command(about = "Create a new project from a template")]
pub struct CreateConfig {
    /// Project directory name (prompted for when omitted)
    pub name: Option<String>,

    /// Template id, e.g. `see7788/ts-template`, `tpls-<dir>` or `local`
    #[arg(long)]
    pub template: Option<String>,

    /// Directory whose subdirectories are offered as templates
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    /// Entry file or project directory for the `local` template
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Do not install dependencies
    #[arg(long)]
    pub skip_install: bool,

    /// Directory to create the project in (defaults to the current directory)
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}
