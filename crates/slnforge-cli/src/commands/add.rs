//! Implementation of the `slnforge add` command: resolve a project through
//! the template graph, then run it against an existing or new solution.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use slnforge_adapters::{GraphLoader, LocalFilesystem};
use slnforge_core::application::TestingRequest;
use slnforge_core::prelude::*;

use crate::{
    cli::{AddArgs, global::GlobalArgs},
    commands::{input_tokens, resolve_library, run_request},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(project = %args.project, set = %args.set))]
pub fn execute(
    args: AddArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let library = resolve_library(&global, &config)?;
    let graph = GraphLoader::new(library.clone()).load(&LocalFilesystem::new())?;

    let choices = choices(&args, &config, &graph);
    let project = graph.configure(&choices).map_err(ForgeError::from)?;
    debug!(
        template = %project.template,
        alterations = ?project.alterations,
        "template set resolved"
    );

    let mut request = TemplateRequest::new(&args.location.root, &args.solution).with_project(project);
    if let Some(template) = &args.testing {
        request = request.with_testing_project(TestingRequest::new(&args.project, template));
    }

    run_request(library, &request, args.dry_run, &global, &output)
}

/// The tag is `--tag`, else `[defaults] tag`, else the set's first tag.
fn choices(args: &AddArgs, config: &AppConfig, graph: &TemplateGraph) -> TemplateChoices {
    let tag = args
        .tag
        .clone()
        .or_else(|| config.defaults.tag.clone())
        .or_else(|| {
            graph
                .find(&args.set)
                .and_then(|set| set.tags.first().cloned())
        })
        .unwrap_or_default();

    TemplateChoices {
        set_name: args.set.clone(),
        tag,
        project_name: args.project.clone(),
        selections: args.selections.iter().cloned().collect::<BTreeMap<_, _>>(),
        options: args.options.clone(),
        inputs: input_tokens(&args.inputs).into_iter().collect(),
    }
}
