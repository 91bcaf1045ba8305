//! Flags shared by every subcommand, flattened into [`super::Cli`].

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

/// Where templates come from and how much `slnforge` says about it.
#[derive(Debug, Default, Args)]
pub struct GlobalArgs {
    /// Template library holding `solution/`, `project/`, `alteration/` and
    /// `testing/` directories plus an optional `templates.toml`.
    #[arg(short = 'L', long, global = true, value_name = "DIR", env = "SLNFORGE_LIBRARY")]
    pub library: Option<PathBuf>,

    /// `-v` prints each plan step, `-vv` adds solution load/save and planner
    /// detail with span timings, `-vvv` traces everything.
    #[arg(short, long, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only errors reach the terminal; confirmation prompts are skipped.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true, env = "NO_COLOR", help = "Disable colored output")]
    pub no_color: bool,

    /// Read settings from FILE instead of the per-user `config.toml`.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// `json` prints plan reports and listings as JSON and switches log
    /// lines on stderr to JSON as well.
    #[arg(long, global = true, value_enum, default_value_t)]
    pub output_format: OutputFormat,
}

/// How reports and listings are rendered on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human when stdout is a terminal, plain otherwise.
    #[default]
    Auto,
    Human,
    Plain,
    Json,
}
