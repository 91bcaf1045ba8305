//! Template plans: an ordered list of steps plus the context they mutate.
//!
//! Steps run strictly in the order they were added. A step sees what earlier
//! steps left in the [`PlanContext`] (the active solution, the current
//! project, substitutions) and nothing else. There is no rollback: when a
//! step fails, the files written by earlier steps stay.

mod project_plan;
mod steps;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, PlanLogger};
use crate::application::store::SolutionStore;
use crate::domain::{ProjectFile, Solution, Substitutions};
use crate::error::ForgeResult;

pub use project_plan::{
    BuildScriptAlteration, CopyFileToProject, DependencyDeclaration, ProjectAlteration,
    ProjectContext, ProjectDirectory, ProjectPlan, ReferenceProject, SystemReference,
};
pub use steps::{
    BuildScriptTransform, CopyFileToSolution, CreateSolution, GemReference, GitIgnoreStep,
    ReadSolution, SolutionDirectory, SOURCE_DIRECTORY,
};

/// One unit of work in a [`TemplatePlan`].
pub trait TemplateStep: fmt::Display + fmt::Debug + Send {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()>;

    /// Project steps expose themselves so planners can attach alterations.
    fn as_project_plan_mut(&mut self) -> Option<&mut ProjectPlan> {
        None
    }
}

/// State shared by the steps of one plan.
pub struct PlanContext {
    root: PathBuf,
    solution: Option<Solution>,
    current_project: Option<String>,
    substitutions: Substitutions,
    fs: Box<dyn Filesystem>,
    logger: Box<dyn PlanLogger>,
    scheduled: Vec<Box<dyn TemplateStep>>,
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

impl PlanContext {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    pub fn logger(&self) -> &dyn PlanLogger {
        self.logger.as_ref()
    }

    pub fn substitutions(&self) -> &Substitutions {
        &self.substitutions
    }

    pub fn substitutions_mut(&mut self) -> &mut Substitutions {
        &mut self.substitutions
    }

    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// The active solution; `step` names the caller in the error.
    pub fn require_solution(&mut self, step: &dyn fmt::Display) -> ForgeResult<&mut Solution> {
        self.solution.as_mut().ok_or_else(|| {
            ApplicationError::NoActiveSolution {
                step: step.to_string(),
            }
            .into()
        })
    }

    /// Install the solution later steps work against.
    pub fn set_solution(&mut self, solution: Solution) {
        debug!(solution = %solution.name(), "active solution set");
        self.solution = Some(solution);
    }

    pub fn current_project_name(&self) -> Option<&str> {
        self.current_project.as_deref()
    }

    pub(crate) fn set_current_project(&mut self, name: Option<String>) {
        self.current_project = name;
    }

    /// The project file of the running project plan, loaded on demand.
    pub fn current_project_mut(&mut self, step: &dyn fmt::Display) -> ForgeResult<&mut ProjectFile> {
        let missing = || ApplicationError::NoActiveProject {
            step: step.to_string(),
        };
        let name = self.current_project.as_deref().ok_or_else(missing)?;
        let solution = self
            .solution
            .as_mut()
            .ok_or_else(|| ApplicationError::NoActiveSolution {
                step: step.to_string(),
            })?;
        SolutionStore::new(self.fs.as_ref())
            .project(solution, name)?
            .ok_or_else(|| missing().into())
    }

    /// Run `step` after every step already in the plan.
    pub fn schedule(&mut self, step: Box<dyn TemplateStep>) {
        self.scheduled.push(step);
    }

    /// Record packages a project depends on.
    pub fn add_dependencies<I, S>(&mut self, project: &str, packages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies
            .entry(project.to_owned())
            .or_default()
            .extend(packages.into_iter().map(Into::into));
    }

    /// Relative path from the plan root, `/`-separated.
    pub fn relative_to_root(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .iter()
            .map(|segment| segment.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// An ordered list of steps, executed once.
pub struct TemplatePlan {
    steps: Vec<Box<dyn TemplateStep>>,
    context: PlanContext,
    executed: bool,
}

impl TemplatePlan {
    pub fn new(
        root: impl Into<PathBuf>,
        fs: Box<dyn Filesystem>,
        logger: Box<dyn PlanLogger>,
    ) -> Self {
        Self {
            steps: Vec::new(),
            context: PlanContext {
                root: root.into(),
                solution: None,
                current_project: None,
                substitutions: Substitutions::new(),
                fs,
                logger,
                scheduled: Vec::new(),
                dependencies: BTreeMap::new(),
            },
            executed: false,
        }
    }

    /// Plan over an emptied root directory.
    pub fn create_clean(
        root: impl Into<PathBuf>,
        fs: Box<dyn Filesystem>,
        logger: Box<dyn PlanLogger>,
    ) -> ForgeResult<Self> {
        let plan = Self::new(root, fs, logger);
        let root = plan.root();
        if plan.filesystem().dir_exists(root) {
            plan.filesystem().remove_dir_all(root)?;
        }
        plan.filesystem().create_dir_all(root)?;
        Ok(plan)
    }

    pub fn root(&self) -> &Path {
        self.context.root()
    }

    pub fn filesystem(&self) -> &dyn Filesystem {
        self.context.filesystem()
    }

    pub fn context(&self) -> &PlanContext {
        &self.context
    }

    pub fn substitutions(&self) -> &Substitutions {
        self.context.substitutions()
    }

    pub fn substitutions_mut(&mut self) -> &mut Substitutions {
        self.context.substitutions_mut()
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.context.solution()
    }

    pub fn steps(&self) -> impl Iterator<Item = &dyn TemplateStep> {
        self.steps.iter().map(|step| step.as_ref())
    }

    pub fn add(&mut self, step: impl TemplateStep + 'static) {
        self.steps.push(Box::new(step));
    }

    pub fn add_project(&mut self, project: ProjectPlan) {
        self.add(project);
    }

    /// The project plan most recently added.
    pub fn current_project_plan_mut(&mut self) -> Option<&mut ProjectPlan> {
        self.steps
            .iter_mut()
            .rev()
            .find_map(|step| step.as_project_plan_mut())
    }

    /// Run every step in order, then save the active solution and its
    /// loaded projects.
    #[instrument(skip_all, fields(root = %self.context.root.display(), steps = self.steps.len()))]
    pub fn execute(&mut self) -> ForgeResult<()> {
        if self.executed {
            return Err(ApplicationError::PlanAlreadyExecuted.into());
        }
        self.executed = true;

        let mut index = 0;
        while index < self.steps.len() {
            let step = &self.steps[index];
            self.context.logger.start_step(&step.to_string());
            debug!(index, step = %step, "running step");
            step.alter(&mut self.context)?;
            self.steps.append(&mut self.context.scheduled);
            index += 1;
        }

        if let Some(solution) = self.context.solution.as_mut() {
            SolutionStore::new(self.context.fs.as_ref()).save(solution)?;
        }
        info!(steps = self.steps.len(), "plan executed");
        Ok(())
    }

    /// `"Project: a, b"` for every project that declared dependencies.
    pub fn dependency_statements(&self) -> Vec<String> {
        self.context
            .dependencies
            .iter()
            .map(|(project, packages)| {
                let packages: Vec<&str> = packages.iter().map(String::as_str).collect();
                format!("{project}: {}", packages.join(", "))
            })
            .collect()
    }
}

impl fmt::Debug for TemplatePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatePlan")
            .field("root", &self.context.root)
            .field("steps", &self.steps)
            .field("executed", &self.executed)
            .finish()
    }
}
