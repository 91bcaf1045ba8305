//! Project-scoped plan steps.
//!
//! A [`ProjectPlan`] creates (or finds) one project in the active solution
//! and runs its own ordered list of [`ProjectAlteration`]s against it.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::steps::{append_fragment, BuildScriptTransform};
use super::{PlanContext, TemplateStep};
use crate::application::ports::Filesystem;
use crate::application::store::SolutionStore;
use crate::application::ApplicationError;
use crate::domain::project::native_path;
use crate::domain::substitutions::{ASSEMBLY_NAME, MANIFEST_FILE, PROJECT_PATH};
use crate::domain::{AssemblyReference, CodeFile, ProjectFile, ProjectItem, ProjectReference, Substitutions};
use crate::error::ForgeResult;

/// One transformation applied to the project of a [`ProjectPlan`].
pub trait ProjectAlteration: fmt::Display + fmt::Debug + Send {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()>;
}

/// What an alteration can reach: the plan context, the project's own
/// substitutions and the project name.
pub struct ProjectContext<'a> {
    plan: &'a mut PlanContext,
    substitutions: &'a Substitutions,
    project_name: &'a str,
}

impl<'a> ProjectContext<'a> {
    pub fn project_name(&self) -> &str {
        self.project_name
    }

    pub fn substitutions(&self) -> &Substitutions {
        self.substitutions
    }

    pub fn plan(&mut self) -> &mut PlanContext {
        self.plan
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.plan.filesystem()
    }

    pub fn root(&self) -> &Path {
        self.plan.root()
    }

    pub fn project_mut(&mut self, step: &dyn fmt::Display) -> ForgeResult<&mut ProjectFile> {
        self.plan.current_project_mut(step)
    }

    pub fn project_directory(&mut self, step: &dyn fmt::Display) -> ForgeResult<PathBuf> {
        Ok(self.project_mut(step)?.project_directory().to_path_buf())
    }

    /// Substitutions applied for a file at `relative_path` in the project.
    pub fn apply_for_file(&self, text: &str, relative_path: &str) -> String {
        self.substitutions
            .apply_for_file(text, self.project_name, relative_path)
    }
}

// ── ProjectPlan ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ProjectPlan {
    name: String,
    project_template: Option<PathBuf>,
    alterations: Vec<Box<dyn ProjectAlteration>>,
    substitutions: Substitutions,
}

impl ProjectPlan {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_template: None,
            alterations: Vec::new(),
            substitutions: Substitutions::new(),
        }
    }

    pub fn with_substitutions(mut self, substitutions: Substitutions) -> Self {
        self.substitutions = substitutions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn substitutions(&self) -> &Substitutions {
        &self.substitutions
    }

    /// Template file the project is created from when it does not exist yet.
    pub fn set_project_template(&mut self, path: impl Into<PathBuf>) {
        self.project_template = Some(path.into());
    }

    pub fn add(&mut self, alteration: impl ProjectAlteration + 'static) {
        self.alterations.push(Box::new(alteration));
    }

    pub fn alterations(&self) -> impl Iterator<Item = &dyn ProjectAlteration> {
        self.alterations.iter().map(|a| a.as_ref())
    }

    /// Create the project unless the solution already has it. Returns the
    /// project file path.
    fn ensure_project(&self, context: &mut PlanContext) -> ForgeResult<PathBuf> {
        let template = match &self.project_template {
            Some(path) => Some(context.filesystem().read_to_string(path)?),
            None => None,
        };

        let solution = context.require_solution(self)?;
        if solution.find_project(&self.name).is_none() {
            match template {
                Some(text) => solution.add_project_from_template(&self.name, &text)?,
                None => solution.add_project(&self.name)?,
            };
        }

        let directory = solution.parent_directory().to_path_buf();
        solution
            .find_project(&self.name)
            .map(|project| project.project_path(&directory))
            .ok_or_else(|| {
                ApplicationError::NoActiveProject {
                    step: self.to_string(),
                }
                .into()
            })
    }

    fn run_alterations(&self, plan: &mut PlanContext, substitutions: &Substitutions) -> ForgeResult<()> {
        let mut context = ProjectContext {
            plan,
            substitutions,
            project_name: &self.name,
        };
        for alteration in &self.alterations {
            context.plan.logger().trace_alteration(&alteration.to_string());
            alteration.alter(&mut context)?;
        }
        Ok(())
    }
}

impl TemplateStep for ProjectPlan {
    #[instrument(skip_all, fields(project = %self.name))]
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        context.logger().start_project(&self.name);

        let mut substitutions = self.substitutions.clone();
        substitutions.set_if_missing(ASSEMBLY_NAME, self.name.as_str());
        context.substitutions().copy_missing_into(&mut substitutions);

        let project_file = self.ensure_project(context)?;
        substitutions.set(PROJECT_PATH, context.relative_to_root(&project_file));

        let directory = project_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        context.filesystem().create_dir_all(&directory)?;

        context.set_current_project(Some(self.name.clone()));
        let result = self.run_alterations(context, &substitutions);
        context.set_current_project(None);
        result?;

        context
            .filesystem()
            .write_file(&directory.join(MANIFEST_FILE), &substitutions.to_manifest())?;

        debug!(alterations = self.alterations.len(), "project plan applied");
        context.logger().end_project(&self.name);
        Ok(())
    }

    fn as_project_plan_mut(&mut self) -> Option<&mut ProjectPlan> {
        Some(self)
    }
}

impl fmt::Display for ProjectPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Project '{}'", self.name)
    }
}

// ── Alterations ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProjectDirectory {
    relative_path: String,
}

impl ProjectDirectory {
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }
}

impl ProjectAlteration for ProjectDirectory {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()> {
        let directory = context.project_directory(self)?;
        context
            .filesystem()
            .create_dir_all(&directory.join(native_path(&self.relative_path)))
    }
}

impl fmt::Display for ProjectDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Create directory {}", self.relative_path)
    }
}

/// Copy a template file into the project. C# sources are also added to
/// the project file as `Compile` items.
#[derive(Debug, Clone)]
pub struct CopyFileToProject {
    relative_path: String,
    source: PathBuf,
}

impl CopyFileToProject {
    pub fn new(relative_path: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            source: source.into(),
        }
    }

    fn is_code_file(&self) -> bool {
        Path::new(&self.relative_path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("cs"))
    }
}

impl ProjectAlteration for CopyFileToProject {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()> {
        let text = context.filesystem().read_to_string(&self.source)?;
        let text = context.apply_for_file(&text, &self.relative_path);

        let directory = context.project_directory(self)?;
        let target = directory.join(native_path(&self.relative_path));
        if let Some(parent) = target.parent() {
            context.filesystem().create_dir_all(parent)?;
        }
        context.filesystem().write_file(&target, &text)?;

        if self.is_code_file() {
            let include = self.relative_path.replace('/', "\\");
            context.project_mut(self)?.add(CodeFile::from_include(&include));
        }
        Ok(())
    }
}

impl fmt::Display for CopyFileToProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Copy {}", self.relative_path)
    }
}

/// Add a framework assembly reference.
#[derive(Debug, Clone)]
pub struct SystemReference {
    assembly: String,
}

impl SystemReference {
    pub const SOURCE_FILE: &'static str = "references.txt";

    pub fn new(assembly: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
        }
    }
}

impl ProjectAlteration for SystemReference {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()> {
        context
            .project_mut(self)?
            .add(AssemblyReference::from_include(&self.assembly));
        Ok(())
    }
}

impl fmt::Display for SystemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Add reference to {}", self.assembly)
    }
}

/// A project template's `rake.txt`, merged into the root build script with
/// the project's substitutions.
#[derive(Debug, Clone)]
pub struct BuildScriptAlteration {
    text: String,
}

impl BuildScriptAlteration {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ProjectAlteration for BuildScriptAlteration {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()> {
        let fragment = context.substitutions().apply(&self.text);
        let target = context.root().join(BuildScriptTransform::TARGET_FILE);
        append_fragment(context.filesystem(), &target, &fragment)?;
        Ok(())
    }
}

impl fmt::Display for BuildScriptAlteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Add content to the rakefile")
    }
}

/// Package dependencies declared by a template's `nuget.txt`.
#[derive(Debug, Clone)]
pub struct DependencyDeclaration {
    packages: Vec<String>,
}

impl DependencyDeclaration {
    pub const SOURCE_FILE: &'static str = "nuget.txt";

    pub fn from_text(text: &str) -> Self {
        Self {
            packages: text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl ProjectAlteration for DependencyDeclaration {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()> {
        let project = context.project_name().to_owned();
        context
            .plan()
            .add_dependencies(&project, self.packages.iter().cloned());
        Ok(())
    }
}

impl fmt::Display for DependencyDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Declare dependencies: {}", self.packages.join(", "))
    }
}

/// Point a testing project at the project it tests and share that
/// project's assembly references.
#[derive(Debug, Clone)]
pub struct ReferenceProject {
    original: String,
}

impl ReferenceProject {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
        }
    }
}

impl ProjectAlteration for ReferenceProject {
    fn alter(&self, context: &mut ProjectContext<'_>) -> ForgeResult<()> {
        let step = self.to_string();
        let current = context.project_name().to_owned();
        let plan = context.plan();
        let fs = plan.fs.as_ref();
        let solution = plan
            .solution
            .as_mut()
            .ok_or_else(|| ApplicationError::NoActiveSolution { step: step.clone() })?;

        let (original_path, original_guid) = solution
            .find_project(&self.original)
            .map(|p| (p.relative_path().to_owned(), p.guid()))
            .ok_or_else(|| ApplicationError::NoActiveProject { step: step.clone() })?;
        let depth = solution
            .find_project(&current)
            .map(|p| p.relative_path().split('\\').count().saturating_sub(1))
            .unwrap_or(1);
        let include = format!("{}{}", "..\\".repeat(depth), original_path);

        let references: Vec<AssemblyReference> = SolutionStore::new(fs)
            .project(solution, &self.original)?
            .map(|project| project.all::<AssemblyReference>().into_iter().cloned().collect())
            .unwrap_or_default();

        let project = context.project_mut(&step)?;
        project.add(ProjectReference::to_project(&include, original_guid, &self.original));
        for reference in references {
            project.add(reference);
        }
        Ok(())
    }
}

impl fmt::Display for ReferenceProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference project {}", self.original)
    }
}
