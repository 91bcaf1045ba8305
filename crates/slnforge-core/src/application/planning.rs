//! Template planners: turn a template directory into plan steps.
//!
//! Every file under the template directory is matched against an ordered
//! list of rules. The first matching rule decides what the file becomes;
//! files no rule claims are copied with substitutions. Subdirectories become
//! directory steps.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace};

use crate::application::plan::{
    BuildScriptAlteration, BuildScriptTransform, CopyFileToProject, CopyFileToSolution,
    DependencyDeclaration, GemReference, GitIgnoreStep, ProjectDirectory, ProjectPlan,
    SolutionDirectory, SystemReference, TemplatePlan,
};
use crate::application::ApplicationError;
use crate::domain::error::DomainError;
use crate::domain::Input;
use crate::error::ForgeResult;

/// Template metadata file, never turned into a step.
pub const TEMPLATE_METADATA: &str = "template.toml";

/// Project template file inside a project template directory.
pub const PROJECT_TEMPLATE: &str = "csproj.xml";

// ── File matching ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum NameMatch {
    Exact(String),
    Pattern(glob::Pattern),
}

impl NameMatch {
    fn matches(&self, file_name: &str) -> bool {
        match self {
            Self::Exact(name) => name.eq_ignore_ascii_case(file_name),
            Self::Pattern(pattern) => pattern.matches(file_name),
        }
    }
}

/// Which files a rule applies to: top-level only, or anywhere below the
/// template directory.
#[derive(Debug, Clone)]
pub enum FileSet {
    Shallow(NameMatch),
    Deep(NameMatch),
}

impl FileSet {
    pub fn shallow(name: impl Into<String>) -> Self {
        Self::Shallow(NameMatch::Exact(name.into()))
    }

    pub fn deep(pattern: &str) -> ForgeResult<Self> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| DomainError::InvalidPattern {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self::Deep(NameMatch::Pattern(pattern)))
    }

    pub fn matches(&self, file: &TextFile) -> bool {
        match self {
            Self::Shallow(name) => file.depth == 1 && name.matches(file.file_name()),
            Self::Deep(name) => name.matches(file.file_name()),
        }
    }
}

/// A template file found by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    /// Location on disk.
    pub path: PathBuf,
    /// `/`-separated path relative to the template directory.
    pub relative_path: String,
    pub depth: usize,
}

impl TextFile {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// Turns a matched file into plan steps.
pub type PlanRule = fn(&TextFile, &mut TemplatePlan) -> ForgeResult<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanScope {
    Solution,
    Project,
}

impl fmt::Display for PlanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solution => f.write_str("solution"),
            Self::Project => f.write_str("project"),
        }
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

pub struct TemplatePlanner {
    scope: PlanScope,
    rules: Vec<(FileSet, PlanRule)>,
}

impl TemplatePlanner {
    pub fn new(scope: PlanScope) -> Self {
        Self {
            scope,
            rules: Vec::new(),
        }
    }

    /// Rules for solution templates.
    pub fn for_solution() -> Self {
        let mut planner = Self::new(PlanScope::Solution);
        planner.add_rule(FileSet::shallow(BuildScriptTransform::SOURCE_FILE), |file, plan| {
            let text = read(file, plan)?;
            plan.add(BuildScriptTransform::new(text));
            Ok(())
        });
        planner.add_rule(FileSet::shallow(GitIgnoreStep::SOURCE_FILE), |file, plan| {
            let text = read(file, plan)?;
            plan.add(GitIgnoreStep::from_text(&text));
            Ok(())
        });
        planner.add_rule(FileSet::shallow(GemReference::SOURCE_FILE), |file, plan| {
            let text = read(file, plan)?;
            plan.add(GemReference::from_text(&text));
            Ok(())
        });
        planner.add_rule(FileSet::shallow(Input::FILE), |file, plan| {
            let text = read(file, plan)?;
            plan.substitutions_mut().read_inputs(&Input::parse_all(&text));
            Ok(())
        });
        planner
    }

    /// Rules for project and alteration templates. They attach to the most
    /// recently added project plan.
    pub fn for_project() -> Self {
        let mut planner = Self::new(PlanScope::Project);
        planner.add_rule(FileSet::shallow(PROJECT_TEMPLATE), |file, plan| {
            project_plan(plan, file)?.set_project_template(&file.path);
            Ok(())
        });
        planner.add_rule(FileSet::shallow(DependencyDeclaration::SOURCE_FILE), |file, plan| {
            let text = read(file, plan)?;
            project_plan(plan, file)?.add(DependencyDeclaration::from_text(&text));
            Ok(())
        });
        planner.add_rule(FileSet::shallow(SystemReference::SOURCE_FILE), |file, plan| {
            let text = read(file, plan)?;
            let project = project_plan(plan, file)?;
            for assembly in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                project.add(SystemReference::new(assembly));
            }
            Ok(())
        });
        planner.add_rule(FileSet::shallow(BuildScriptTransform::SOURCE_FILE), |file, plan| {
            let text = read(file, plan)?;
            project_plan(plan, file)?.add(BuildScriptAlteration::new(text));
            Ok(())
        });
        planner
    }

    pub fn scope(&self) -> PlanScope {
        self.scope
    }

    /// Rules are tried in registration order.
    pub fn add_rule(&mut self, files: FileSet, rule: PlanRule) {
        self.rules.push((files, rule));
    }

    /// Walk `directory` and add a step for every entry.
    #[instrument(skip_all, fields(scope = %self.scope, directory = %directory.display()))]
    pub fn create_plan(&self, directory: &Path, plan: &mut TemplatePlan) -> ForgeResult<()> {
        let entries = plan.filesystem().walk(directory)?;
        debug!(entries = entries.len(), "planning template directory");

        for entry in entries {
            let relative_path = entry.slashed();
            if entry.is_dir {
                self.add_directory(&relative_path, plan)?;
                continue;
            }

            let file = TextFile {
                path: directory.join(&entry.relative_path),
                depth: entry.depth(),
                relative_path,
            };
            if file.depth == 1 && file.file_name().eq_ignore_ascii_case(TEMPLATE_METADATA) {
                continue;
            }

            match self.rules.iter().find(|(files, _)| files.matches(&file)) {
                Some((_, rule)) => {
                    trace!(file = %file.relative_path, "matched rule");
                    rule(&file, plan)?;
                }
                None => self.add_copy(file, plan)?,
            }
        }
        Ok(())
    }

    fn add_directory(&self, relative_path: &str, plan: &mut TemplatePlan) -> ForgeResult<()> {
        match self.scope {
            PlanScope::Solution => plan.add(SolutionDirectory::new(relative_path)),
            PlanScope::Project => {
                project_plan_for(plan, relative_path)?.add(ProjectDirectory::new(relative_path))
            }
        }
        Ok(())
    }

    fn add_copy(&self, file: TextFile, plan: &mut TemplatePlan) -> ForgeResult<()> {
        match self.scope {
            PlanScope::Solution => plan.add(CopyFileToSolution::new(file.relative_path, file.path)),
            PlanScope::Project => project_plan(plan, &file)?
                .add(CopyFileToProject::new(file.relative_path.clone(), file.path.clone())),
        }
        Ok(())
    }
}

impl fmt::Debug for TemplatePlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplatePlanner")
            .field("scope", &self.scope)
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn read(file: &TextFile, plan: &TemplatePlan) -> ForgeResult<String> {
    plan.filesystem().read_to_string(&file.path)
}

fn project_plan<'p>(plan: &'p mut TemplatePlan, file: &TextFile) -> ForgeResult<&'p mut ProjectPlan> {
    project_plan_for(plan, &file.relative_path)
}

fn project_plan_for<'p>(plan: &'p mut TemplatePlan, relative_path: &str) -> ForgeResult<&'p mut ProjectPlan> {
    plan.current_project_plan_mut().ok_or_else(|| {
        ApplicationError::NoActiveProject {
            step: relative_path.to_owned(),
        }
        .into()
    })
}
