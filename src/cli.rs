use clap::{Args, Parser, Subcommand};
use housepot::Month;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "housepot")]
#[command(about = "Shared household expense settlement", long_about = None)]
pub struct Cli {
    /// Override Housepot home directory (a config subdir will be created inside it).
    #[arg(long, env = "HOUSEPOT_HOME")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Roster(RosterArgs),
    /// Show or set the default book (JSON snapshot of expenses, templates and salaries).
    Book(BookArgs),

    Settle(SettleArgs),
    Ious(IouArgs),
    Summary(SummaryArgs),
    Check(CheckArgs),
}

#[derive(Debug, Args, Clone)]
pub struct SourceFlags {
    /// Book to read. Falls back to the configured default.
    #[arg(long, env = "HOUSEPOT_BOOK")]
    pub book: Option<PathBuf>,

    /// Month to report (YYYY-MM). Defaults to the current month.
    #[arg(long)]
    pub month: Option<Month>,

    /// Print JSON instead of tab-separated lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum RosterCmd {
    Add {
        id: String,
        #[arg(long)]
        name: Option<String>,
    },
    Remove {
        id: String,
    },
    List,
}

#[derive(Debug, Args)]
pub struct RosterArgs {
    #[command(subcommand)]
    pub cmd: RosterCmd,
}

#[derive(Debug, Args)]
pub struct BookArgs {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SettleArgs {
    #[command(flatten)]
    pub source: SourceFlags,

    /// Refuse to settle when the book has validation issues.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Args)]
pub struct IouArgs {
    #[command(flatten)]
    pub source: SourceFlags,

    /// Only IOUs this participant is part of.
    #[arg(long)]
    pub participant: Option<String>,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub source: SourceFlags,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[arg(long, env = "HOUSEPOT_BOOK")]
    pub book: Option<PathBuf>,
}
