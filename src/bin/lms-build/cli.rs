//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// lms-build - configure, install and package the Library Management System
#[derive(Parser)]
#[command(name = "lms-build")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter lms.toml
    Init(InitArgs),

    /// Configure a build directory
    Configure(ConfigureArgs),

    /// Display the target graph
    Graph(GraphArgs),

    /// Show effective compile flags for a target
    Flags(FlagsArgs),

    /// Install a configured build into a prefix
    Install(InstallArgs),

    /// Show the package manifest
    Package(PackageArgs),

    /// Find an installed package
    Locate(LocateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Source directory and option assignments shared by planning commands.
#[derive(Args)]
pub struct ProjectArgs {
    /// Project source directory
    #[arg(short = 'S', long = "source-dir", default_value = ".")]
    pub source_dir: PathBuf,

    /// Build directory whose cached options are used
    #[arg(short = 'B', long = "build-dir")]
    pub build_dir: Option<PathBuf>,

    /// Set an option (NAME=VALUE, e.g. USE_LIBRARY=OFF)
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    pub define: Vec<String>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,

    /// Overwrite an existing lms.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Project source directory
    #[arg(short = 'S', long = "source-dir", default_value = ".")]
    pub source_dir: PathBuf,

    /// Build directory
    #[arg(short = 'B', long = "build-dir", default_value = "build")]
    pub build_dir: PathBuf,

    /// Set an option (NAME=VALUE, e.g. USE_LIBRARY=OFF)
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    pub define: Vec<String>,

    /// Print the plan without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct GraphArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Emit the graph as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Target to show flags for
    pub target: String,

    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args)]
pub struct InstallArgs {
    /// Configured build directory
    #[arg(short = 'B', long = "build-dir", default_value = "build")]
    pub build_dir: PathBuf,

    /// Source directory (defaults to the one the build was configured from)
    #[arg(short = 'S', long = "source-dir")]
    pub source_dir: Option<PathBuf>,

    /// Install prefix
    #[arg(long)]
    pub prefix: PathBuf,

    /// List files without copying them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct PackageArgs {
    /// Project source directory
    #[arg(short = 'S', long = "source-dir", default_value = ".")]
    pub source_dir: PathBuf,

    /// Emit the manifest as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the Debian control stanza
    #[arg(long, conflicts_with = "json")]
    pub control: bool,

    /// Architecture for the archive name and control stanza
    #[arg(long)]
    pub arch: Option<String>,
}

#[derive(Args)]
pub struct LocateArgs {
    /// Package name
    pub name: String,

    /// Minimum version required
    #[arg(long)]
    pub version: Option<String>,

    /// Prefix to search (searched before CMAKE_PREFIX_PATH)
    #[arg(long = "prefix-path", value_name = "DIR")]
    pub prefix_path: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
