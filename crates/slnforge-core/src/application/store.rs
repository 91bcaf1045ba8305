//! Loading and saving solution and project files through the filesystem port.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::application::ports::Filesystem;
use crate::domain::{ProjectFile, Solution};
use crate::error::ForgeResult;

pub struct SolutionStore<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> SolutionStore<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> ForgeResult<Solution> {
        let text = self.fs.read_to_string(path)?;
        let solution = Solution::parse(path, &text)?;
        debug!(projects = solution.projects().len(), "solution loaded");
        Ok(solution)
    }

    /// Write the solution, then every project file that has been loaded.
    #[instrument(skip_all, fields(path = %solution.filename().display()))]
    pub fn save(&self, solution: &mut Solution) -> ForgeResult<()> {
        let text = solution.render();
        self.write(solution.filename(), &text)?;

        let mut saved = 0;
        for project in solution.projects_mut() {
            if let Some(file) = project.project_mut() {
                self.save_project(file)?;
                saved += 1;
            }
        }
        info!(projects = saved, "solution saved");
        Ok(())
    }

    pub fn load_project(&self, path: &Path) -> ForgeResult<ProjectFile> {
        let text = self.fs.read_to_string(path)?;
        Ok(ProjectFile::parse(path, &text)?)
    }

    pub fn save_project(&self, project: &mut ProjectFile) -> ForgeResult<()> {
        let text = project.render();
        self.write(project.file_name(), &text)
    }

    /// The project named `name`, loaded from disk on first access.
    pub fn project<'s>(
        &self,
        solution: &'s mut Solution,
        name: &str,
    ) -> ForgeResult<Option<&'s mut ProjectFile>> {
        let directory = solution.parent_directory().to_path_buf();
        match solution.find_project_mut(name) {
            Some(project) => project
                .load_with(&directory, |path| self.load_project(path))
                .map(Some),
            None => Ok(None),
        }
    }

    fn write(&self, path: &Path, text: &str) -> ForgeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent)?;
        }
        self.fs.write_file(path, text)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use mockall::predicate::*;

    use super::*;
    use crate::application::ports::MockFilesystem;

    #[test]
    fn save_writes_solution_then_loaded_projects() {
        let mut solution = Solution::create_new(Path::new("src"), "Demo").unwrap();
        solution.add_project("Lib").unwrap();

        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file()
            .with(eq(PathBuf::from("src/Demo.sln")), always())
            .times(1)
            .returning(|_, text| {
                assert!(text.contains("\"Lib\", \"Lib\\Lib.csproj\""));
                Ok(())
            });
        fs.expect_write_file()
            .with(eq(PathBuf::from("src/Lib/Lib.csproj")), always())
            .times(1)
            .returning(|_, _| Ok(()));

        SolutionStore::new(&fs).save(&mut solution).unwrap();
    }

    #[test]
    fn project_is_loaded_lazily() {
        let text = "Microsoft Visual Studio Solution File, Format Version 11.00\n# Visual Studio 2010\nProject(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Lib\", \"Lib\\Lib.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\nEndProject\nGlobal\nEndGlobal\n";
        let mut solution = Solution::parse("src/Demo.sln", text).unwrap();

        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("src/Lib/Lib.csproj")))
            .times(1)
            .returning(|_| Ok("<Project>\n</Project>\n".into()));

        let store = SolutionStore::new(&fs);
        assert!(store.project(&mut solution, "Lib").unwrap().is_some());
        // second access hits the cached file
        assert!(store.project(&mut solution, "Lib").unwrap().is_some());
        assert!(store.project(&mut solution, "Other").unwrap().is_none());
    }
}
