//! TOML loading for the template graph and per-template metadata.
//!
//! # `templates.toml` format
//!
//! ```toml
//! [[sets]]
//! name        = "web"
//! description = "FubuMVC web application"
//! tags        = ["csharp"]
//! template    = "web-app"
//! alterations = ["structuremap"]
//!
//! [[sets.options]]
//! name        = "spark"
//! alterations = ["spark-views"]
//!
//! [[sets.selections]]
//! name = "views"
//!
//! [[sets.selections.options]]
//! name        = "razor"
//! alterations = ["razor-views"]
//! ```
//!
//! Every template directory may also carry a `template.toml` with a
//! `description`; planners skip that file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use slnforge_core::application::ports::Filesystem;
use slnforge_core::application::{TemplateLibrary, TemplateType};
use slnforge_core::domain::{TemplateGraph, TemplateSet};
use slnforge_core::error::ForgeError;
use thiserror::Error;
use tracing::{debug, instrument, warn};

const METADATA_FILE: &str = "template.toml";

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ForgeError,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("template set '{name}' is defined more than once in {path}")]
    DuplicateSet { path: PathBuf, name: String },
}

impl From<LoaderError> for ForgeError {
    fn from(err: LoaderError) -> Self {
        ForgeError::Configuration {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GraphFile {
    #[serde(default)]
    sets: Vec<TemplateSet>,
}

/// Contents of a template directory's `template.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub description: String,
}

/// Reads TOML files out of a [`TemplateLibrary`].
#[derive(Debug, Clone)]
pub struct GraphLoader {
    library: TemplateLibrary,
}

impl GraphLoader {
    pub fn new(library: TemplateLibrary) -> Self {
        Self { library }
    }

    /// Load `templates.toml`. A library without one has an empty graph.
    #[instrument(skip_all, fields(library = %self.library.root().display()))]
    pub fn load(&self, fs: &dyn Filesystem) -> Result<TemplateGraph, LoaderError> {
        let path = self.library.graph_file();
        if !fs.file_exists(&path) {
            warn!(path = %path.display(), "no template graph found");
            return Ok(TemplateGraph::new());
        }
        let text = read(fs, &path)?;
        let graph = parse_graph(&text, &path)?;
        debug!(sets = graph.len(), "template graph loaded");
        Ok(graph)
    }

    /// Metadata of one template, if it has a `template.toml`.
    pub fn metadata(
        &self,
        fs: &dyn Filesystem,
        kind: TemplateType,
        name: &str,
    ) -> Result<Option<TemplateMetadata>, LoaderError> {
        let path = self
            .library
            .root()
            .join(kind.directory())
            .join(name)
            .join(METADATA_FILE);
        if !fs.file_exists(&path) {
            return Ok(None);
        }
        let text = read(fs, &path)?;
        toml::from_str(&text)
            .map(Some)
            .map_err(|source| LoaderError::Parse { path, source })
    }
}

/// Parse `templates.toml` text; `path` is only used in errors.
pub fn parse_graph(text: &str, path: &Path) -> Result<TemplateGraph, LoaderError> {
    let file: GraphFile = toml::from_str(text).map_err(|source| LoaderError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut graph = TemplateGraph::new();
    for set in file.sets {
        if graph.find(&set.name).is_some() {
            return Err(LoaderError::DuplicateSet {
                path: path.to_path_buf(),
                name: set.name,
            });
        }
        graph.add(set);
    }
    Ok(graph)
}

fn read(fs: &dyn Filesystem, path: &Path) -> Result<String, LoaderError> {
    fs.read_to_string(path).map_err(|source| LoaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}
