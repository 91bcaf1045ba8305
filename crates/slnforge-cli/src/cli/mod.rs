//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "slnforge",
    bin_name = "slnforge",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate and extend Visual Studio solutions from templates",
    long_about = "slnforge creates .sln solutions and .csproj projects from a \
                  directory-based template library, and adds new projects to \
                  existing solutions without disturbing hand-made edits.",
    after_help = "EXAMPLES:\n\
        \x20 slnforge new Shop -t baseline -p Shop.Core --project-template library\n\
        \x20 slnforge add Shop.Web --set web --option spark --solution Shop\n\
        \x20 slnforge list project\n\
        \x20 slnforge completions bash > /usr/share/bash-completion/completions/slnforge",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a solution, or extend it, from named templates.
    #[command(
        visible_alias = "n",
        about = "Create a solution from templates",
        after_help = "EXAMPLES:\n\
            \x20 slnforge new Shop -t baseline\n\
            \x20 slnforge new Shop -p Shop.Core --project-template library -a structuremap\n\
            \x20 slnforge new Shop -t baseline -i COMPANY=Acme --dry-run"
    )]
    New(NewArgs),

    /// Add a project resolved through the template graph.
    #[command(
        visible_alias = "a",
        about = "Add a project to a solution",
        after_help = "EXAMPLES:\n\
            \x20 slnforge add Shop.Web --set web --solution Shop\n\
            \x20 slnforge add Shop.Web --set web --tag csharp --option spark --select views=razor --solution Shop"
    )]
    Add(AddArgs),

    /// List the template library.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 slnforge list\n\
            \x20 slnforge list project\n\
            \x20 slnforge list sets --format json"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 slnforge completions bash > ~/.local/share/bash-completion/completions/slnforge\n\
            \x20 slnforge completions zsh  > ~/.zfunc/_slnforge\n\
            \x20 slnforge completions fish > ~/.config/fish/completions/slnforge.fish"
    )]
    Completions(CompletionsArgs),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Where the solution tree lives.
#[derive(Debug, Clone, Args)]
pub struct LocationArgs {
    /// Directory the solution lives under; the `.sln` goes in `<root>/src`.
    #[arg(
        long = "root",
        value_name = "DIR",
        default_value = ".",
        help = "Root directory of the solution tree"
    )]
    pub root: PathBuf,
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `slnforge new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Solution name; reused when `<root>/src/<name>.sln` already exists.
    #[arg(value_name = "SOLUTION", help = "Solution name")]
    pub solution: String,

    #[command(flatten)]
    pub location: LocationArgs,

    /// Solution templates, applied in order.
    #[arg(
        short = 't',
        long = "template",
        value_name = "TEMPLATE",
        help = "Solution template to apply (repeatable)"
    )]
    pub templates: Vec<String>,

    /// Projects to create with `--project-template`.
    #[arg(
        short = 'p',
        long = "project",
        value_name = "NAME",
        help = "Project to create (repeatable)"
    )]
    pub projects: Vec<String>,

    /// Project template for every `--project`.
    #[arg(
        long = "project-template",
        value_name = "TEMPLATE",
        help = "Project template for --project"
    )]
    pub project_template: Option<String>,

    /// Alterations applied to every `--project`.
    #[arg(
        short = 'a',
        long = "alteration",
        value_name = "ALTERATION",
        requires = "projects",
        help = "Alteration to apply to each project (repeatable)"
    )]
    pub alterations: Vec<String>,

    /// Substitution tokens, `KEY=VALUE`.
    #[arg(
        short = 'i',
        long = "input",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Template input (repeatable)"
    )]
    pub inputs: Vec<(String, String)>,

    /// Print the plan without touching the disk.
    #[arg(long = "dry-run", help = "Show the plan without executing it")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation")]
    pub yes: bool,
}

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `slnforge add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Name of the new project.
    #[arg(value_name = "PROJECT", help = "Project name")]
    pub project: String,

    /// Template set from `templates.toml`.
    #[arg(short = 's', long = "set", value_name = "SET", help = "Template set")]
    pub set: String,

    /// Tag the set must carry; falls back to `[defaults] tag`.
    #[arg(long = "tag", value_name = "TAG", help = "Template tag")]
    pub tag: Option<String>,

    #[arg(
        short = 'o',
        long = "option",
        value_name = "OPTION",
        help = "Set option to apply (repeatable)"
    )]
    pub options: Vec<String>,

    /// Choose an option of a selection, `SELECTION=OPTION`.
    #[arg(
        long = "select",
        value_name = "SELECTION=OPTION",
        value_parser = parse_key_value,
        help = "Selection choice (repeatable)"
    )]
    pub selections: Vec<(String, String)>,

    #[arg(
        short = 'i',
        long = "input",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Template input (repeatable)"
    )]
    pub inputs: Vec<(String, String)>,

    /// Solution the project joins.
    #[arg(long = "solution", value_name = "NAME", help = "Solution name")]
    pub solution: String,

    /// Also create `<PROJECT>.Testing` from this testing template.
    #[arg(
        long = "testing",
        value_name = "TEMPLATE",
        help = "Testing template for a companion test project"
    )]
    pub testing: Option<String>,

    #[command(flatten)]
    pub location: LocationArgs,

    #[arg(long = "dry-run", help = "Show the plan without executing it")]
    pub dry_run: bool,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `slnforge list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// What to list; everything when omitted.
    #[arg(value_enum, value_name = "WHAT", help = "Kind of template to list")]
    pub kind: Option<ListKind>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Things `slnforge list` can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    /// Template sets from `templates.toml`.
    Sets,
    Solution,
    Project,
    Alteration,
    Testing,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `slnforge completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── value parsers ─────────────────────────────────────────────────────────────

/// Split `KEY=VALUE`; the value may itself contain `=`.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
