//! Tracing subscriber set-up.
//!
//! `slnforge-core` and `slnforge-adapters` never install a subscriber. They
//! emit two kinds of telemetry this module filters:
//!
//! - plan progress from `TracingLogger`, under [`PLAN_TARGET`]: one INFO
//!   event per step and project, DEBUG per alteration;
//! - spans around plan execution (`root`, `steps`), planners (`scope`,
//!   `directory`), solution load/save (`path`), project plans (`project`)
//!   and graph loading (`library`).
//!
//! | Flag(s)   | Plan steps | Crate events | Span close timings | Dependencies |
//! |-----------|------------|--------------|--------------------|--------------|
//! | `--quiet` | -          | ERROR        | -                  | ERROR        |
//! | (none)    | -          | WARN         | -                  | WARN         |
//! | `-v`      | INFO       | INFO         | -                  | WARN         |
//! | `-vv`     | DEBUG      | DEBUG        | yes                | WARN         |
//! | `-vvv`    | TRACE      | TRACE        | yes                | DEBUG        |
//!
//! `RUST_LOG` replaces the filter column entirely.

use std::io::IsTerminal as _;

use slnforge_adapters::PLAN_TARGET;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::{GlobalArgs, OutputFormat};

/// Crates whose events follow the verbosity flags; everything else stays at
/// the dependency level.
const CRATE_TARGETS: [&str; 3] = ["slnforge", "slnforge_core", "slnforge_adapters"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Steps,
    Debug,
    Trace,
}

impl From<&GlobalArgs> for Verbosity {
    fn from(args: &GlobalArgs) -> Self {
        if args.quiet {
            return Self::Quiet;
        }
        match args.verbose {
            0 => Self::Normal,
            1 => Self::Steps,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }
}

impl Verbosity {
    fn level(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Steps => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub fn directives(self) -> String {
        let dependencies = match self {
            Self::Quiet => "error",
            Self::Trace => "debug",
            _ => "warn",
        };
        let level = self.level();

        let mut directives = vec![dependencies.to_owned()];
        directives.extend(CRATE_TARGETS.iter().map(|target| format!("{target}={level}")));
        directives.push(format!("{PLAN_TARGET}={level}"));
        directives.join(",")
    }

    /// Close events show how long each plan, planner and solution save took.
    pub fn span_events(self) -> FmtSpan {
        if self >= Self::Debug {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Install the global subscriber on stderr. Call once, before anything logs.
///
/// With `--output-format json` log lines are JSON too, carrying the current
/// span's fields, so stdout and stderr can both be machine-read.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let verbosity = Verbosity::from(args);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let json = args.output_format == OutputFormat::Json;
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_span_events(verbosity.span_events())
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(verbosity >= Verbosity::Debug)
            .with_ansi(!args.no_color && std::io::stderr().is_terminal())
            .with_span_events(verbosity.span_events())
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}
