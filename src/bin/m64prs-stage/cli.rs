//! CLI definitions using clap.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use m64prs_stage::core::scheme::find_scheme;
use m64prs_stage::core::InstallScheme;
use m64prs_stage::util::shell::ColorChoice;

/// m64prs-stage - build the m64prs bundle and stage it into a runnable tree
#[derive(Parser)]
#[command(name = "m64prs-stage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root (defaults to the nearest parent containing m64prs/native)
    #[arg(long, global = true, env = "M64PRS_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build every subproject and stage the install tree
    Build(BuildArgs),

    /// Build, then launch the staged front end
    Run(RunArgs),

    /// Remove build outputs and the install tree
    Clean(CleanArgs),

    /// Placeholder kept for older scripts
    #[command(hide = true, alias = "git_setup")]
    GitSetup,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

fn parse_scheme(name: &str) -> Result<InstallScheme, String> {
    find_scheme(name).map_err(|e| e.to_string())
}

#[derive(Args)]
pub struct BuildArgs {
    /// Build in release mode
    #[arg(short, long)]
    pub release: bool,

    /// Install layout (portable, unix)
    #[arg(short = 's', long, value_parser = parse_scheme)]
    pub install_scheme: Option<InstallScheme>,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Arguments passed to m64prs-gtk
    #[arg(last = true)]
    pub args: Vec<OsString>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Clean the release profile (otherwise `PROFILE` decides)
    #[arg(short, long)]
    pub release: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
