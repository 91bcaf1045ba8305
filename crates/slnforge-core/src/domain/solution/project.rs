use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::guid::{format_guid, parse_guid};
use crate::domain::project::{CLASS_LIBRARY, ProjectFile, native_path};

/// Type GUID of a solution folder.
pub const SOLUTION_FOLDER: Uuid = Uuid::from_u128(0x2150E333_8FDC_42A3_9474_1A3956D46DE8);
pub const SOLUTION_ITEMS: &str = "Solution Items";

const END_PROJECT: &str = "EndProject";

/// A `Project(...) ... EndProject` block of a solution file.
#[derive(Debug, Clone)]
pub struct SolutionProject {
    /// Header line as read; regenerated when absent.
    header: Option<String>,
    project_type: Uuid,
    name: String,
    relative_path: String,
    guid: Uuid,
    directives: Vec<String>,
    footer: String,
    /// Unrecognized top-level lines that followed this block.
    pub(super) trailer: Vec<String>,
    project: Option<ProjectFile>,
}

impl SolutionProject {
    /// Parse `Project("{TYPE}") = "Name", "Path", "{GUID}"`.
    pub(super) fn from_header(line: &str, line_number: usize) -> Result<Self, DomainError> {
        let malformed = |reason: &str| DomainError::MalformedSolution {
            line: line_number,
            reason: reason.to_owned(),
        };

        let (type_part, rest) = line
            .split_once('=')
            .ok_or_else(|| malformed("project line has no '='"))?;
        let project_type = type_part
            .split('"')
            .nth(1)
            .ok_or_else(|| malformed("project type GUID is not quoted"))
            .and_then(|raw| parse_guid(raw).map_err(|_| malformed("invalid project type GUID")))?;

        let values: Vec<&str> = rest.split('"').skip(1).step_by(2).collect();
        let [name, relative_path, guid] = values[..] else {
            return Err(malformed("expected name, path and GUID"));
        };
        let guid = parse_guid(guid).map_err(|_| malformed("invalid project GUID"))?;

        Ok(Self {
            header: Some(line.to_owned()),
            project_type,
            name: name.to_owned(),
            relative_path: relative_path.to_owned(),
            guid,
            directives: Vec::new(),
            footer: END_PROJECT.to_owned(),
            trailer: Vec::new(),
            project: None,
        })
    }

    /// Entry for a project file living under `solution_directory`.
    pub fn for_project(project: ProjectFile, solution_directory: &Path) -> Self {
        let relative = project
            .file_name()
            .strip_prefix(solution_directory)
            .unwrap_or(project.file_name())
            .iter()
            .map(|segment| segment.to_string_lossy())
            .collect::<Vec<_>>()
            .join("\\");

        Self {
            header: None,
            project_type: project.project_types().last().unwrap_or(CLASS_LIBRARY),
            name: project.project_name(),
            relative_path: relative,
            guid: project.project_guid().unwrap_or_else(Uuid::new_v4),
            directives: Vec::new(),
            footer: END_PROJECT.to_owned(),
            trailer: Vec::new(),
            project: Some(project),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    pub fn project_type(&self) -> Uuid {
        self.project_type
    }

    /// Path of the project file relative to the solution, as written.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn project_path(&self, solution_directory: &Path) -> PathBuf {
        solution_directory.join(native_path(&self.relative_path))
    }

    /// Solution folders carry no build configuration.
    pub fn is_folder(&self) -> bool {
        self.project_type == SOLUTION_FOLDER || self.name == SOLUTION_ITEMS
    }

    /// Raw `ProjectSection` lines inside the block.
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    pub fn is_loaded(&self) -> bool {
        self.project.is_some()
    }

    pub fn project(&self) -> Option<&ProjectFile> {
        self.project.as_ref()
    }

    pub fn project_mut(&mut self) -> Option<&mut ProjectFile> {
        self.project.as_mut()
    }

    /// The project file, loading it through `loader` on first access.
    pub fn load_with<E>(
        &mut self,
        solution_directory: &Path,
        loader: impl FnOnce(&Path) -> Result<ProjectFile, E>,
    ) -> Result<&mut ProjectFile, E> {
        let project = match self.project.take() {
            Some(project) => project,
            None => loader(&self.project_path(solution_directory))?,
        };
        Ok(self.project.insert(project))
    }

    pub(super) fn read_line(&mut self, line: &str) {
        self.directives.push(line.to_owned());
    }

    pub(super) fn set_footer(&mut self, line: &str) {
        self.footer = line.to_owned();
    }

    pub(super) fn write(&self, out: &mut Vec<String>) {
        let header = self.header.clone().unwrap_or_else(|| {
            format!(
                "Project(\"{}\") = \"{}\", \"{}\", \"{}\"",
                format_guid(&self.project_type),
                self.name,
                self.relative_path,
                format_guid(&self.guid)
            )
        });
        out.push(header);
        out.extend(self.directives.iter().cloned());
        out.push(self.footer.clone());
        out.extend(self.trailer.iter().cloned());
    }
}
