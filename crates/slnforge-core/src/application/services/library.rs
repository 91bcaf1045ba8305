//! Template library: a directory of named template directories, grouped by
//! kind.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::application::ports::Filesystem;
use crate::error::ForgeResult;

/// File describing the template graph, at the library root.
pub const GRAPH_FILE: &str = "templates.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Solution,
    Project,
    Alteration,
    Testing,
}

impl TemplateType {
    pub const ALL: [TemplateType; 4] = [
        TemplateType::Solution,
        TemplateType::Project,
        TemplateType::Alteration,
        TemplateType::Testing,
    ];

    /// Subdirectory of the library holding templates of this kind.
    pub fn directory(&self) -> &'static str {
        match self {
            Self::Solution => "solution",
            Self::Project => "project",
            Self::Alteration => "alteration",
            Self::Testing => "testing",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directory())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateLibrary {
    root: PathBuf,
}

impl TemplateLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn graph_file(&self) -> PathBuf {
        self.root.join(GRAPH_FILE)
    }

    /// Directory of the template `name`.
    pub fn find(&self, fs: &dyn Filesystem, kind: TemplateType, name: &str) -> ForgeResult<PathBuf> {
        let path = self.root.join(kind.directory()).join(name);
        if fs.dir_exists(&path) {
            debug!(%kind, name, path = %path.display(), "template found");
            Ok(path)
        } else {
            Err(ApplicationError::TemplateNotFound {
                kind: kind.directory(),
                name: name.to_owned(),
            }
            .into())
        }
    }

    /// Names of every template of `kind`, sorted.
    pub fn list(&self, fs: &dyn Filesystem, kind: TemplateType) -> ForgeResult<Vec<String>> {
        let directory = self.root.join(kind.directory());
        if !fs.dir_exists(&directory) {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = fs
            .walk(&directory)?
            .into_iter()
            .filter(|entry| entry.is_dir && entry.depth() == 1)
            .map(|entry| entry.slashed())
            .collect();
        names.sort();
        Ok(names)
    }
}
