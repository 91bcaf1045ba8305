//! Implementation of the `slnforge new` command.
//!
//! Responsibility: translate CLI arguments into a `TemplateRequest`, confirm,
//! and hand over to the shared plan runner.  No business logic lives here.

use tracing::{debug, instrument};

use slnforge_core::prelude::*;

use crate::{
    cli::{NewArgs, global::GlobalArgs},
    commands::{input_tokens, resolve_library, run_request},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `slnforge new` command.
#[instrument(skip_all, fields(solution = %args.solution))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let library = resolve_library(&global, &config)?;
    let request = build_request(&args, &config)?;
    debug!(
        templates = ?request.templates,
        projects = request.projects.len(),
        "request built"
    );

    if !args.dry_run && !args.yes && !output.is_quiet() {
        show_request(&request, &output)?;
        if !confirm()? {
            return Err(CliError::Cancelled);
        }
    }

    run_request(library, &request, args.dry_run, &global, &output)
}

pub(crate) fn build_request(args: &NewArgs, config: &AppConfig) -> CliResult<TemplateRequest> {
    let mut request = TemplateRequest::new(&args.location.root, &args.solution);

    let templates = if args.templates.is_empty() {
        &config.defaults.solution_templates
    } else {
        &args.templates
    };
    for template in templates {
        request = request.with_template(template);
    }

    if !args.projects.is_empty() {
        let project_template = args
            .project_template
            .as_ref()
            .or(config.defaults.project_template.as_ref())
            .ok_or_else(|| CliError::InvalidInput {
                message: "--project needs --project-template (or [defaults] project_template)"
                    .into(),
                source: None,
            })?;
        for name in &args.projects {
            let mut project = ProjectRequest::new(name, project_template);
            for alteration in &args.alterations {
                project = project.with_alteration(alteration);
            }
            request = request.with_project(project);
        }
    }

    for (token, value) in input_tokens(&args.inputs) {
        request = request.with_input(token, value);
    }
    Ok(request)
}

fn show_request(request: &TemplateRequest, out: &OutputManager) -> CliResult<()> {
    out.header("Configuration")?;
    if let Some(name) = &request.solution_name {
        out.print(&format!("  Solution:   {name}"))?;
    }
    out.print(&format!("  Root:       {}", request.root_directory.display()))?;
    if !request.templates.is_empty() {
        out.print(&format!("  Templates:  {}", request.templates.join(", ")))?;
    }
    for project in &request.projects {
        let mut line = format!("  Project:    {} ({})", project.name, project.template);
        if !project.alterations.is_empty() {
            line.push_str(&format!(" + {}", project.alterations.join(", ")));
        }
        out.print(&line)?;
    }
    out.print("")?;
    Ok(())
}

/// Ask before writing; a non-interactive stdin counts as yes.
#[cfg(feature = "interactive")]
fn confirm() -> CliResult<bool> {
    use std::io::IsTerminal;

    if !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm() -> CliResult<bool> {
    Ok(true)
}
