//! Command handlers.  Each translates parsed arguments into core requests and
//! reports results through the [`OutputManager`].

pub mod add;
pub mod completions;
pub mod list;
pub mod new;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use slnforge_adapters::{LocalFilesystem, TracingLogger};
use slnforge_core::domain::substitutions::to_token;
use slnforge_core::prelude::*;

use crate::{
    cli::{OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// The library from `--library`, else `[library] path`; it must exist.
pub(crate) fn resolve_library(global: &GlobalArgs, config: &AppConfig) -> CliResult<TemplateLibrary> {
    let root = global
        .library
        .as_ref()
        .or(config.library.path.as_ref())
        .ok_or(CliError::MissingLibrary)?;
    if !root.is_dir() {
        return Err(CliError::LibraryNotFound { path: root.clone() });
    }
    debug!(library = %root.display(), "using template library");
    Ok(TemplateLibrary::new(root))
}

/// `KEY=VALUE` pairs keyed by their `%KEY%` token.
pub(crate) fn input_tokens(inputs: &[(String, String)]) -> Vec<(String, String)> {
    inputs
        .iter()
        .map(|(key, value)| (to_token(key), value.clone()))
        .collect()
}

/// What `new` and `add` report once the plan has run.
#[derive(Debug, Serialize)]
struct PlanReport {
    solution: Option<PathBuf>,
    executed: bool,
    steps: Vec<String>,
    dependencies: Vec<String>,
}

/// Build the plan for `request`, then print it (`dry_run`) or execute it.
pub(crate) fn run_request(
    library: TemplateLibrary,
    request: &TemplateRequest,
    dry_run: bool,
    global: &GlobalArgs,
    output: &OutputManager,
) -> CliResult<()> {
    request.validate().map_err(ForgeError::from)?;

    let mut plan = TemplatePlanBuilder::new(library)
        .build_plan(
            request,
            Box::new(LocalFilesystem::new()),
            Box::new(TracingLogger),
        )
        .with_cli_context(|| "building the template plan")?;

    let solution = request
        .solution_name
        .as_deref()
        .map(|name| solution_file(&request.root_directory, name));

    if dry_run {
        let report = PlanReport {
            solution,
            executed: false,
            steps: plan.steps().map(|step| step.to_string()).collect(),
            dependencies: Vec::new(),
        };
        return print_report(&report, global, output);
    }

    let spinner = output.spinner("Generating solution...");
    let result = plan.execute();
    spinner.finish_and_clear();
    result.with_cli_context(|| "executing the template plan")?;
    info!(steps = plan.steps().count(), "generation finished");

    let report = PlanReport {
        solution,
        executed: true,
        steps: plan.steps().map(|step| step.to_string()).collect(),
        dependencies: plan.dependency_statements(),
    };
    print_report(&report, global, output)
}

fn solution_file(root: &Path, name: &str) -> PathBuf {
    root.join(slnforge_core::application::plan::SOURCE_DIRECTORY)
        .join(Solution::file_name_for(name))
}

fn print_report(report: &PlanReport, global: &GlobalArgs, output: &OutputManager) -> CliResult<()> {
    if output.format() == OutputFormat::Json {
        output.json(report)?;
        return Ok(());
    }

    if !report.executed || global.verbose > 0 {
        output.header("Plan:")?;
        for (index, step) in report.steps.iter().enumerate() {
            output.print(&format!("  {:>2}. {step}", index + 1))?;
        }
    }
    if !report.executed {
        output.info("Dry run: nothing was written")?;
        return Ok(());
    }

    match &report.solution {
        Some(path) => output.success(&format!("Solution ready at {}", path.display()))?,
        None => output.success("Templates applied")?,
    }
    if !report.dependencies.is_empty() {
        output.print("")?;
        output.header("Dependencies to install:")?;
        for statement in &report.dependencies {
            output.print(&format!("  {statement}"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn library_flag_wins_over_config() {
        let temp = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.library.path = Some(temp.path().join("elsewhere"));

        let global = GlobalArgs {
            library: Some(temp.path().to_path_buf()),
            ..GlobalArgs::default()
        };
        let library = resolve_library(&global, &config).unwrap();
        assert_eq!(library.root(), temp.path());
    }

    #[test]
    fn library_is_required() {
        let err = resolve_library(&GlobalArgs::default(), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingLibrary));
    }

    #[test]
    fn library_must_exist() {
        let temp = TempDir::new().unwrap();
        let global = GlobalArgs {
            library: Some(temp.path().join("missing")),
            ..GlobalArgs::default()
        };
        let err = resolve_library(&global, &AppConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::LibraryNotFound { .. }));
    }

    #[test]
    fn inputs_become_tokens() {
        let tokens = input_tokens(&[
            ("COMPANY".into(), "Acme".into()),
            ("%YEAR%".into(), "2026".into()),
        ]);
        assert_eq!(
            tokens,
            [
                ("%COMPANY%".to_owned(), "Acme".to_owned()),
                ("%YEAR%".to_owned(), "2026".to_owned())
            ]
        );
    }

    #[test]
    fn solution_lives_under_src() {
        assert_eq!(
            solution_file(Path::new("work"), "Shop"),
            PathBuf::from("work/src/Shop.sln")
        );
        assert_eq!(
            solution_file(Path::new("work"), "Shop.sln"),
            PathBuf::from("work/src/Shop.sln")
        );
    }
}
