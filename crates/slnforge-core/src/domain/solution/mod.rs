//! Solution file model.
//!
//! A [`Solution`] keeps projects and global sections in the order they were
//! read, along with every line it does not understand, so that rendering an
//! unmodified solution reproduces the original text. The only section
//! rewritten on render is `ProjectConfigurationPlatforms`.

mod project;
mod reader;
mod section;
mod version;

use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::DomainError;
use super::project::ProjectFile;

pub use project::{SOLUTION_FOLDER, SOLUTION_ITEMS, SolutionProject};
pub use section::{
    BuildConfiguration, GlobalSection, PROJECT_CONFIGURATION_PLATFORMS,
    SOLUTION_CONFIGURATION_PLATFORMS,
};
pub use version::SolutionVersion;

const SKELETON: &str = include_str!("skeleton.sln");
const BOM: char = '\u{feff}';
const GLOBAL: &str = "Global";
const END_GLOBAL: &str = "EndGlobal";

/// The two preamble lines as read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Preamble {
    version: SolutionVersion,
    format_line: String,
    comment_line: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Solution {
    filename: PathBuf,
    preamble: Option<Preamble>,
    /// Set when the version was changed after reading.
    version_override: Option<SolutionVersion>,
    bom: bool,
    newline: &'static str,
    trailing_newline: bool,
    leading_lines: Vec<String>,
    header_lines: Vec<String>,
    projects: Vec<SolutionProject>,
    global_leading: Vec<String>,
    sections: Vec<GlobalSection>,
    trailing_lines: Vec<String>,
}

impl Solution {
    /// Parse solution text read from `filename`.
    pub fn parse(filename: impl Into<PathBuf>, text: &str) -> Result<Self, DomainError> {
        let (bom, body) = match text.strip_prefix(BOM) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut solution = Self {
            filename: filename.into(),
            preamble: None,
            version_override: None,
            bom,
            newline: if body.contains("\r\n") { "\r\n" } else { "\n" },
            trailing_newline: body.ends_with('\n'),
            leading_lines: Vec::new(),
            header_lines: Vec::new(),
            projects: Vec::new(),
            global_leading: Vec::new(),
            sections: Vec::new(),
            trailing_lines: Vec::new(),
        };
        reader::read_into(&mut solution, body)?;
        Ok(solution)
    }

    /// Empty VS2010 solution at `directory/name.sln`.
    pub fn create_new(directory: &Path, name: &str) -> Result<Self, DomainError> {
        let mut solution = Self::parse(directory.join(Self::file_name_for(name)), SKELETON)?;
        solution.newline = "\r\n";
        solution.set_version(SolutionVersion::Vs2010);
        Ok(solution)
    }

    /// `name` with the `.sln` extension, appended only when missing.
    pub fn file_name_for(name: &str) -> String {
        if Path::new(name).extension().is_some_and(|ext| ext == "sln") {
            name.to_owned()
        } else {
            format!("{name}.sln")
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// File stem of the solution file.
    pub fn name(&self) -> String {
        self.filename
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn parent_directory(&self) -> &Path {
        self.filename.parent().unwrap_or(Path::new(""))
    }

    pub fn version(&self) -> Option<SolutionVersion> {
        self.version_override
            .or_else(|| self.preamble.as_ref().map(|p| p.version))
    }

    pub fn set_version(&mut self, version: SolutionVersion) {
        let unchanged = self.preamble.as_ref().map(|p| p.version) == Some(version);
        self.version_override = (!unchanged).then_some(version);
    }

    // ── Sections ──────────────────────────────────────────────────────────

    pub fn sections(&self) -> &[GlobalSection] {
        &self.sections
    }

    pub fn find_section(&self, name: &str) -> Option<&GlobalSection> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn find_section_mut(&mut self, name: &str) -> Option<&mut GlobalSection> {
        self.sections.iter_mut().find(|s| s.name() == name)
    }

    /// Build configurations declared by `SolutionConfigurationPlatforms`.
    pub fn configurations(&self) -> Vec<BuildConfiguration> {
        self.find_section(SOLUTION_CONFIGURATION_PLATFORMS)
            .map(|section| {
                section
                    .properties()
                    .iter()
                    .filter_map(|line| BuildConfiguration::parse(line))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ── Projects ──────────────────────────────────────────────────────────

    pub fn projects(&self) -> &[SolutionProject] {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut [SolutionProject] {
        &mut self.projects
    }

    pub fn find_project(&self, name: &str) -> Option<&SolutionProject> {
        self.projects.iter().find(|p| p.name() == name)
    }

    pub fn find_project_mut(&mut self, name: &str) -> Option<&mut SolutionProject> {
        self.projects.iter_mut().find(|p| p.name() == name)
    }

    /// The project named `name`, creating a class library when absent.
    pub fn add_project(&mut self, name: &str) -> Result<&mut SolutionProject, DomainError> {
        if let Some(index) = self.projects.iter().position(|p| p.name() == name) {
            return Ok(&mut self.projects[index]);
        }

        let file = ProjectFile::create(self.project_file_path(name), name)?;
        Ok(self.push_project(file))
    }

    /// Add a project built from template text. Fails when the name is taken.
    pub fn add_project_from_template(
        &mut self,
        name: &str,
        template: &str,
    ) -> Result<&mut SolutionProject, DomainError> {
        if self.find_project(name).is_some() {
            return Err(DomainError::DuplicateProject {
                name: name.to_owned(),
            });
        }

        let file = ProjectFile::from_template(self.project_file_path(name), name, template)?;
        Ok(self.push_project(file))
    }

    fn project_file_path(&self, name: &str) -> PathBuf {
        self.parent_directory()
            .join(name)
            .join(format!("{name}.csproj"))
    }

    fn push_project(&mut self, file: ProjectFile) -> &mut SolutionProject {
        debug!(project = %file.project_name(), solution = %self.name(), "adding project");
        let entry = SolutionProject::for_project(file, self.parent_directory());
        self.projects.push(entry);
        let last = self.projects.len() - 1;
        &mut self.projects[last]
    }

    // ── Writing ───────────────────────────────────────────────────────────

    /// Rebuild `ProjectConfigurationPlatforms`: one line per configuration
    /// and non-folder project.
    pub fn recompute_project_configurations(&mut self) {
        let configurations = self.configurations();
        let lines: Vec<String> = self
            .projects
            .iter()
            .filter(|project| !project.is_folder())
            .flat_map(|project| {
                configurations
                    .iter()
                    .map(move |config| config.project_line(&project.guid()))
            })
            .collect();

        if self.find_section(PROJECT_CONFIGURATION_PLATFORMS).is_none() {
            let section = GlobalSection::new(PROJECT_CONFIGURATION_PLATFORMS, "postSolution");
            match self
                .sections
                .iter()
                .position(|s| s.name() == SOLUTION_CONFIGURATION_PLATFORMS)
            {
                Some(index) => self.sections.insert(index + 1, section),
                None => self.sections.push(section),
            }
        }

        if let Some(section) = self.find_section_mut(PROJECT_CONFIGURATION_PLATFORMS) {
            section.clear();
            for line in &lines {
                section.read(line);
            }
        }
    }

    /// Solution text. Project files are not written.
    pub fn render(&mut self) -> String {
        self.recompute_project_configurations();

        let mut lines: Vec<String> = self.leading_lines.clone();

        match (self.version_override, &self.preamble) {
            (None, Some(preamble)) => {
                lines.push(preamble.format_line.clone());
                lines.extend(preamble.comment_line.clone());
            }
            (Some(version), _) => {
                lines.extend(version.preamble().iter().map(|line| line.to_string()));
            }
            (None, None) => {}
        }

        lines.extend(self.header_lines.iter().cloned());
        for project in &self.projects {
            project.write(&mut lines);
        }

        lines.push(GLOBAL.to_owned());
        lines.extend(self.global_leading.iter().cloned());
        for section in &self.sections {
            section.write(&mut lines);
        }
        lines.push(END_GLOBAL.to_owned());
        lines.extend(self.trailing_lines.iter().cloned());

        let mut text = String::new();
        if self.bom {
            text.push(BOM);
        }
        text.push_str(&lines.join(self.newline));
        if self.trailing_newline {
            text.push_str(self.newline);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> String {
        [
            "\u{feff}",
            "Microsoft Visual Studio Solution File, Format Version 12.00",
            "# Visual Studio 2013",
            "VisualStudioVersion = 12.0.21005.1",
            "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Core\", \"Core\\Core.csproj\", \"{11111111-1111-1111-1111-111111111111}\"",
            "EndProject",
            "Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"Solution Items\", \"Solution Items\", \"{22222222-2222-2222-2222-222222222222}\"",
            "\tProjectSection(SolutionItems) = preProject",
            "\t\tREADME.md = README.md",
            "\tEndProjectSection",
            "EndProject",
            "Global",
            "\tGlobalSection(SolutionConfigurationPlatforms) = preSolution",
            "\t\tDebug|Any CPU = Debug|Any CPU",
            "\t\tRelease|Any CPU = Release|Any CPU",
            "\tEndGlobalSection",
            "\tGlobalSection(ProjectConfigurationPlatforms) = postSolution",
            "\t\t{11111111-1111-1111-1111-111111111111}.Debug|Any CPU.ActiveCfg = Debug|Any CPU",
            "\t\t{11111111-1111-1111-1111-111111111111}.Release|Any CPU.ActiveCfg = Release|Any CPU",
            "\tEndGlobalSection",
            "\tGlobalSection(ExtensibilityGlobals) = postSolution",
            "\t\tSolutionGuid = {33333333-3333-3333-3333-333333333333}",
            "\tEndGlobalSection",
            "EndGlobal",
            "",
        ]
        .join("\r\n")
    }

    #[test]
    fn parse_then_render_is_identity() {
        let text = sample();
        let mut solution = Solution::parse("src/Sample.sln", &text).unwrap();
        assert_eq!(solution.render(), text);
    }

    #[test]
    fn reads_version_projects_and_sections_in_order() {
        let solution = Solution::parse("src/Sample.sln", &sample()).unwrap();
        assert_eq!(solution.version(), Some(SolutionVersion::Vs2013));

        let names: Vec<_> = solution.projects().iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Core", "Solution Items"]);

        let sections: Vec<_> = solution.sections().iter().map(|s| s.name()).collect();
        assert_eq!(
            sections,
            [
                SOLUTION_CONFIGURATION_PLATFORMS,
                PROJECT_CONFIGURATION_PLATFORMS,
                "ExtensibilityGlobals"
            ]
        );
        assert_eq!(solution.configurations().len(), 2);
        assert_eq!(solution.find_project("Solution Items").unwrap().directives().len(), 3);
    }

    #[test]
    fn format_13_preamble_is_recognized_and_kept() {
        let text = sample().replace("Format Version 12.00", "Format Version 13.00");
        let mut solution = Solution::parse("src/Sample.sln", &text).unwrap();
        assert_eq!(solution.version(), Some(SolutionVersion::Vs2013));
        assert_eq!(solution.render(), text);
    }

    #[test]
    fn version_change_rewrites_only_the_preamble() {
        let text = sample();
        let mut solution = Solution::parse("src/Sample.sln", &text).unwrap();
        solution.set_version(SolutionVersion::Vs2010);

        let rendered = solution.render();
        assert!(rendered.contains("Format Version 11.00\r\n# Visual Studio 2010\r\n"));
        assert_eq!(
            rendered.replace(
                "Format Version 11.00\r\n# Visual Studio 2010",
                "Format Version 12.00\r\n# Visual Studio 2013"
            ),
            text
        );
    }

    #[test]
    fn create_new_uses_vs2010_skeleton() {
        let solution = Solution::create_new(Path::new("src"), "MySolution").unwrap();
        assert_eq!(solution.filename(), Path::new("src/MySolution.sln"));
        assert_eq!(solution.name(), "MySolution");
        assert_eq!(solution.version(), Some(SolutionVersion::Vs2010));
        assert_eq!(solution.configurations().len(), 6);
        assert!(solution.projects().is_empty());
    }

    #[test]
    fn sln_extension_is_not_doubled() {
        assert_eq!(Solution::file_name_for("Shop"), "Shop.sln");
        assert_eq!(Solution::file_name_for("Shop.sln"), "Shop.sln");
        assert_eq!(Solution::file_name_for("Shop.Web"), "Shop.Web.sln");

        let solution = Solution::create_new(Path::new("src"), "Shop.sln").unwrap();
        assert_eq!(solution.filename(), Path::new("src/Shop.sln"));
    }

    #[test]
    fn add_project_is_idempotent() {
        let mut solution = Solution::create_new(Path::new("src"), "MySolution").unwrap();
        let first = solution.add_project("Lib").unwrap().guid();
        let second = solution.add_project("Lib").unwrap().guid();

        assert_eq!(first, second);
        assert_eq!(solution.projects().len(), 1);
        assert_eq!(
            solution.projects()[0].project_path(solution.parent_directory()),
            Path::new("src/Lib/Lib.csproj")
        );
    }

    #[test]
    fn add_project_from_template_rejects_duplicates() {
        let template = "<Project>\n  <PropertyGroup>\n    <AssemblyName>%ASSEMBLY_NAME%</AssemblyName>\n  </PropertyGroup>\n</Project>\n";
        let mut solution = Solution::create_new(Path::new("src"), "MySolution").unwrap();
        solution.add_project_from_template("Web", template).unwrap();

        let err = solution
            .add_project_from_template("Web", template)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "project with this name (Web) already exists in the solution"
        );
    }

    #[test]
    fn configuration_lines_cover_every_non_folder_project() {
        let mut solution = Solution::create_new(Path::new("src"), "MySolution").unwrap();
        solution.add_project("A").unwrap();
        solution.add_project("B").unwrap();

        solution.recompute_project_configurations();
        let section = solution
            .find_section(PROJECT_CONFIGURATION_PLATFORMS)
            .unwrap();
        assert_eq!(section.properties().len(), 2 * 6);
    }

    #[test]
    fn missing_configuration_section_is_inserted_after_solution_platforms() {
        let text = "Microsoft Visual Studio Solution File, Format Version 11.00\n# Visual Studio 2010\nGlobal\n\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\n\t\tDebug|Any CPU = Debug|Any CPU\n\tEndGlobalSection\nEndGlobal\n";
        let mut solution = Solution::parse("x.sln", text).unwrap();
        solution.add_project("A").unwrap();

        let rendered = solution.render();
        let names: Vec<_> = solution.sections().iter().map(|s| s.name()).collect();
        assert_eq!(names, [SOLUTION_CONFIGURATION_PLATFORMS, PROJECT_CONFIGURATION_PLATFORMS]);
        assert!(rendered.contains(".Debug|Any CPU.ActiveCfg = Debug|Any CPU\n"));
    }

    #[test]
    fn malformed_project_line_is_an_error() {
        let text = "Microsoft Visual Studio Solution File, Format Version 11.00\nProject(\"bogus\nEndProject\n";
        let err = Solution::parse("x.sln", text).unwrap_err();
        assert!(matches!(err, DomainError::MalformedSolution { line: 2, .. }));
    }
}
