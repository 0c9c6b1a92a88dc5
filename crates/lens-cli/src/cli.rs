use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lens",
    about = "Ledger Lens: inspect persisted measurements and compare tables",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print a persisted measurement set
    Show(ShowArgs),
    /// Diff two persisted measurement sets
    Delta(DeltaArgs),
    /// Compare two encoded data tables
    TableDiff(TableDiffArgs),
    /// Validate a run configuration file
    CheckConfig(CheckConfigArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    pub set: PathBuf,
    /// Run configuration whose format rules are applied
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeltaArgs {
    pub before: PathBuf,
    pub after: PathBuf,
    /// Run configuration whose format rules are applied
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct TableDiffArgs {
    pub expected: PathBuf,
    pub actual: PathBuf,
}

#[derive(Args)]
pub struct CheckConfigArgs {
    #[arg(default_value = "lens.toml")]
    pub path: PathBuf,
}
