//! Implementation of the `slnforge list` command.

use serde::Serialize;

use slnforge_adapters::{GraphLoader, LocalFilesystem};
use slnforge_core::prelude::*;

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat, ListKind},
    commands::resolve_library,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub kind: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

pub fn execute(
    args: ListArgs,
    global: &GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let library = resolve_library(global, &config)?;
    let entries = collect(&library, &LocalFilesystem::new(), args.kind)?;

    match args.format {
        ListFormat::Table => {
            if entries.is_empty() {
                output.warning(&format!(
                    "No templates found in {}",
                    library.root().display()
                ))?;
                return Ok(());
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.kind.clone(),
                        e.name.clone(),
                        e.tags.join(","),
                        e.description.clone(),
                    ]
                })
                .collect();
            output.table(&["kind", "name", "tags", "description"], &rows)?;
        }
        ListFormat::List => {
            for entry in &entries {
                if args.kind.is_some() {
                    output.print(&entry.name)?;
                } else {
                    output.print(&format!("{}/{}", entry.kind, entry.name))?;
                }
            }
        }
        ListFormat::Json => output.json(&entries)?,
    }

    Ok(())
}

/// Entries of one kind, or of every kind (sets first) when `kind` is `None`.
pub(crate) fn collect(
    library: &TemplateLibrary,
    fs: &dyn Filesystem,
    kind: Option<ListKind>,
) -> CliResult<Vec<ListEntry>> {
    let loader = GraphLoader::new(library.clone());
    let mut entries = Vec::new();

    if matches!(kind, None | Some(ListKind::Sets)) {
        let graph = loader.load(fs)?;
        entries.extend(graph.sets().map(|set| ListEntry {
            kind: "set".into(),
            name: set.name.clone(),
            description: set.description.clone(),
            tags: set.tags.clone(),
        }));
    }

    let kinds: Vec<TemplateType> = match kind {
        None => TemplateType::ALL.to_vec(),
        Some(ListKind::Sets) => Vec::new(),
        Some(ListKind::Solution) => vec![TemplateType::Solution],
        Some(ListKind::Project) => vec![TemplateType::Project],
        Some(ListKind::Alteration) => vec![TemplateType::Alteration],
        Some(ListKind::Testing) => vec![TemplateType::Testing],
    };
    for kind in kinds {
        for name in library.list(fs, kind)? {
            let description = loader
                .metadata(fs, kind, &name)?
                .map(|m| m.description)
                .unwrap_or_default();
            entries.push(ListEntry {
                kind: kind.to_string(),
                name,
                description,
                tags: Vec::new(),
            });
        }
    }
    Ok(entries)
}
