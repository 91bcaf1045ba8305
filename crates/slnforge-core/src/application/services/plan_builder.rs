//! Builds a [`TemplatePlan`] from a [`TemplateRequest`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::library::{TemplateLibrary, TemplateType};
use crate::application::plan::{
    CreateSolution, ProjectPlan, ReadSolution, ReferenceProject, TemplatePlan, SOURCE_DIRECTORY,
};
use crate::application::planning::TemplatePlanner;
use crate::application::ports::{Filesystem, PlanLogger};
use crate::application::ApplicationError;
use crate::domain::{ProjectRequest, Solution, Substitutions};
use crate::error::ForgeResult;

/// A testing project `<original>.Testing` that references `original`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestingRequest {
    pub original: String,
    pub template: String,
}

impl TestingRequest {
    pub fn new(original: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            template: template.into(),
        }
    }

    pub fn project_name(&self) -> String {
        format!("{}.Testing", self.original)
    }
}

/// Everything a generation run needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub root_directory: PathBuf,
    pub solution_name: Option<String>,
    /// Solution templates, applied in order.
    pub templates: Vec<String>,
    pub projects: Vec<ProjectRequest>,
    pub testing_projects: Vec<TestingRequest>,
    pub substitutions: Substitutions,
}

impl TemplateRequest {
    pub fn new(root_directory: impl Into<PathBuf>, solution_name: impl Into<String>) -> Self {
        Self {
            root_directory: root_directory.into(),
            solution_name: Some(solution_name.into()),
            ..Self::default()
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    pub fn with_project(mut self, project: ProjectRequest) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_testing_project(mut self, testing: TestingRequest) -> Self {
        self.testing_projects.push(testing);
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.substitutions.set(key, value);
        self
    }

    pub fn validate(&self) -> Result<(), ApplicationError> {
        let has_solution = self
            .solution_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !has_solution && (!self.projects.is_empty() || !self.testing_projects.is_empty()) {
            return Err(ApplicationError::ValidationFailed(
                "projects can only be added to a named solution".into(),
            ));
        }
        if let Some(project) = self.projects.iter().find(|p| p.name.trim().is_empty()) {
            return Err(ApplicationError::ValidationFailed(format!(
                "project with template '{}' has no name",
                project.template
            )));
        }
        Ok(())
    }
}

/// Resolves request templates against a [`TemplateLibrary`].
#[derive(Debug, Clone)]
pub struct TemplatePlanBuilder {
    library: TemplateLibrary,
}

impl TemplatePlanBuilder {
    pub fn new(library: TemplateLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    #[instrument(skip_all, fields(root = %request.root_directory.display()))]
    pub fn build_plan(
        &self,
        request: &TemplateRequest,
        fs: Box<dyn Filesystem>,
        logger: Box<dyn PlanLogger>,
    ) -> ForgeResult<TemplatePlan> {
        request.validate()?;

        let mut plan = TemplatePlan::new(&request.root_directory, fs, logger);
        for (key, value) in request.substitutions.iter() {
            plan.substitutions_mut().set(key, value);
        }

        if let Some(name) = request.solution_name.as_deref().filter(|n| !n.trim().is_empty()) {
            let path = request
                .root_directory
                .join(SOURCE_DIRECTORY)
                .join(Solution::file_name_for(name));
            if plan.filesystem().file_exists(&path) {
                plan.add(ReadSolution::new(path));
            } else {
                plan.add(CreateSolution::new(name));
            }
        }

        let solution_planner = TemplatePlanner::for_solution();
        for template in &request.templates {
            let directory = self
                .library
                .find(plan.filesystem(), TemplateType::Solution, template)?;
            solution_planner.create_plan(&directory, &mut plan)?;
        }

        let project_planner = TemplatePlanner::for_project();
        for project in &request.projects {
            plan.add_project(
                ProjectPlan::new(&project.name).with_substitutions(project.substitutions.clone()),
            );
            if !project.template.is_empty() {
                let directory =
                    self.library
                        .find(plan.filesystem(), TemplateType::Project, &project.template)?;
                project_planner.create_plan(&directory, &mut plan)?;
            }
            for alteration in &project.alterations {
                let directory =
                    self.library
                        .find(plan.filesystem(), TemplateType::Alteration, alteration)?;
                project_planner.create_plan(&directory, &mut plan)?;
            }
        }

        for testing in &request.testing_projects {
            let mut project = ProjectPlan::new(testing.project_name());
            project.add(ReferenceProject::new(&testing.original));
            plan.add_project(project);
            let directory =
                self.library
                    .find(plan.filesystem(), TemplateType::Testing, &testing.template)?;
            project_planner.create_plan(&directory, &mut plan)?;
        }

        info!(steps = plan.steps().count(), "plan built");
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use mockall::predicate::*;

    use super::*;
    use crate::application::ports::{MockFilesystem, WalkEntry};
    use crate::application::testing::Transcript;

    fn build(request: &TemplateRequest, fs: MockFilesystem) -> ForgeResult<TemplatePlan> {
        TemplatePlanBuilder::new(TemplateLibrary::new("lib")).build_plan(
            request,
            Box::new(fs),
            Box::new(Transcript::default()),
        )
    }

    #[test]
    fn projects_without_solution_are_rejected() {
        let mut request = TemplateRequest::default();
        request.projects.push(ProjectRequest::new("Lib", "library"));
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("named solution"));
    }

    #[test]
    fn existing_solution_is_read_instead_of_created() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists()
            .with(eq(PathBuf::from("work/src/Demo.sln")))
            .return_const(true);

        let plan = build(&TemplateRequest::new("work", "Demo"), fs).unwrap();
        let steps: Vec<String> = plan.steps().map(|s| s.to_string()).collect();
        assert_eq!(steps, ["Read solution work/src/Demo.sln"]);
    }

    #[test]
    fn solution_name_with_extension_finds_the_existing_file() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists()
            .with(eq(PathBuf::from("work/src/Demo.sln")))
            .return_const(true);

        let plan = build(&TemplateRequest::new("work", "Demo.sln"), fs).unwrap();
        let steps: Vec<String> = plan.steps().map(|s| s.to_string()).collect();
        assert_eq!(steps, ["Read solution work/src/Demo.sln"]);
    }

    #[test]
    fn request_is_expanded_in_order() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists().return_const(false);
        fs.expect_dir_exists().return_const(true);
        fs.expect_walk()
            .with(eq(Path::new("lib/solution/baseline").to_path_buf()))
            .returning(|_| Ok(vec![WalkEntry::file("ignore.txt")]));
        fs.expect_walk()
            .with(eq(Path::new("lib/project/library").to_path_buf()))
            .returning(|_| Ok(vec![WalkEntry::file("Class1.cs")]));
        fs.expect_walk()
            .with(eq(Path::new("lib/alteration/structuremap").to_path_buf()))
            .returning(|_| Ok(vec![WalkEntry::file("nuget.txt")]));
        fs.expect_read_to_string().returning(|path| {
            Ok(if path.ends_with("ignore.txt") {
                "bin\n".to_owned()
            } else {
                "StructureMap\n".to_owned()
            })
        });

        let request = TemplateRequest::new("work", "Demo")
            .with_template("baseline")
            .with_project(ProjectRequest::new("Lib", "library").with_alteration("structuremap"))
            .with_input("%OWNER%", "me");
        let mut plan = build(&request, fs).unwrap();

        let steps: Vec<String> = plan.steps().map(|s| s.to_string()).collect();
        assert_eq!(
            steps,
            ["Create solution 'Demo'", "Add to .gitignore: bin", "Project 'Lib'"]
        );
        assert_eq!(plan.substitutions().value_for("%OWNER%"), Some("me"));

        let project = plan.current_project_plan_mut().unwrap();
        let alterations: Vec<String> = project.alterations().map(|a| a.to_string()).collect();
        assert_eq!(alterations, ["Copy Class1.cs", "Declare dependencies: StructureMap"]);
    }
}
