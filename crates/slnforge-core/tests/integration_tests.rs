//! Integration tests for slnforge-core.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use slnforge_core::application::ApplicationError;
use slnforge_core::domain::{CodeFile, ProjectItem, TemplateChoices};
use slnforge_core::prelude::*;

/// Small in-process filesystem for driving whole plans.
#[derive(Clone, Default)]
struct TestFs {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
    dirs: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl TestFs {
    fn add(&self, path: &str, content: &str) {
        self.write_file(Path::new(path), content).unwrap();
    }

    fn get(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(Path::new(path)).cloned()
    }
}

impl Filesystem for TestFs {
    fn create_dir_all(&self, path: &Path) -> ForgeResult<()> {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
            dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> ForgeResult<()> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_owned());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> ForgeResult<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "not found").into())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> ForgeResult<()> {
        let content = self.read_to_string(from)?;
        self.write_file(to, &content)
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn dir_exists(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }

    fn remove_dir_all(&self, path: &Path) -> ForgeResult<()> {
        self.files.lock().unwrap().retain(|p, _| !p.starts_with(path));
        self.dirs.lock().unwrap().retain(|p| !p.starts_with(path));
        Ok(())
    }

    fn walk(&self, root: &Path) -> ForgeResult<Vec<WalkEntry>> {
        let mut entries: BTreeMap<PathBuf, bool> = BTreeMap::new();
        for dir in self.dirs.lock().unwrap().iter() {
            if let Ok(relative) = dir.strip_prefix(root) {
                if !relative.as_os_str().is_empty() {
                    entries.insert(relative.to_path_buf(), true);
                }
            }
        }
        for file in self.files.lock().unwrap().keys() {
            if let Ok(relative) = file.strip_prefix(root) {
                entries.insert(relative.to_path_buf(), false);
            }
        }
        Ok(entries
            .into_iter()
            .map(|(path, is_dir)| if is_dir { WalkEntry::dir(path) } else { WalkEntry::file(path) })
            .collect())
    }
}

#[derive(Default)]
struct QuietLogger;

impl PlanLogger for QuietLogger {
    fn trace(&self, _message: &str) {}
}

fn seed_library(fs: &TestFs) {
    fs.add("lib/solution/baseline/template.toml", "description = \"baseline\"\n");
    fs.add("lib/solution/baseline/ignore.txt", "bin\nobj\n");
    fs.add("lib/solution/baseline/inputs.txt", "COMPANY=Acme~Owner of the code\n");
    fs.add("lib/solution/baseline/rake.txt", "COMPANY = \"%COMPANY%\"");
    fs.add("lib/solution/baseline/docs/README.md", "%SOLUTION_NAME% by %COMPANY%");

    fs.add("lib/project/library/Class1.cs", "namespace %NAMESPACE% { class Class1 {} }");
    fs.add("lib/project/library/references.txt", "System.Web\n");
    fs.add("lib/project/library/nuget.txt", "FubuCore\n");

    fs.add("lib/alteration/structuremap/nuget.txt", "StructureMap\n");
    fs.add("lib/alteration/structuremap/Registry/LibRegistry.cs", "namespace %NAMESPACE% {}");
}

fn graph() -> TemplateGraph {
    let mut set = TemplateSet::new("lib");
    set.tags = vec!["csharp".into()];
    set.template = "library".into();
    set.alterations = vec!["structuremap".into()];
    [set].into_iter().collect()
}

fn request_for(project: &str) -> TemplateRequest {
    let choices = TemplateChoices {
        set_name: "lib".into(),
        tag: "csharp".into(),
        project_name: project.into(),
        ..TemplateChoices::default()
    };
    let project = graph().configure(&choices).unwrap();
    TemplateRequest::new("work", "Demo")
        .with_template("baseline")
        .with_project(project)
}

fn run(fs: &TestFs, request: &TemplateRequest) -> TemplatePlan {
    let builder = TemplatePlanBuilder::new(TemplateLibrary::new("lib"));
    let mut plan = builder
        .build_plan(request, Box::new(fs.clone()), Box::new(QuietLogger))
        .unwrap();
    plan.execute().unwrap();
    plan
}

#[test]
fn full_generation_workflow() {
    let fs = TestFs::default();
    seed_library(&fs);

    let plan = run(&fs, &request_for("Lib"));

    let sln = fs.get("work/src/Demo.sln").unwrap();
    assert!(sln.contains("\"Lib\", \"Lib\\Lib.csproj\""));

    let csproj = fs.get("work/src/Lib/Lib.csproj").unwrap();
    assert!(csproj.contains("<Compile Include=\"Class1.cs\" />"));
    assert!(csproj.contains("<Compile Include=\"Registry\\LibRegistry.cs\" />"));
    assert!(csproj.contains("<Reference Include=\"System.Web\" />"));

    assert_eq!(
        fs.get("work/src/Lib/Class1.cs").as_deref(),
        Some("namespace Lib { class Class1 {} }")
    );
    assert_eq!(
        fs.get("work/src/Lib/Registry/LibRegistry.cs").as_deref(),
        Some("namespace Lib.Registry {}")
    );
    assert_eq!(fs.get("work/docs/README.md").as_deref(), Some("Demo by Acme"));
    assert_eq!(fs.get("work/.gitignore").as_deref(), Some("bin\nobj\n"));
    assert_eq!(fs.get("work/rakefile").as_deref(), Some("COMPANY = \"Acme\"\n"));
    assert!(fs.get("work/template.toml").is_none());

    let manifest = fs.get("work/src/Lib/.slnforge-tokens").unwrap();
    assert!(manifest.contains("%ASSEMBLY_NAME%=Lib\n"));
    assert!(manifest.contains("%COMPANY%=Acme\n"));

    assert_eq!(plan.dependency_statements(), ["Lib: FubuCore, StructureMap"]);
}

#[test]
fn rerunning_against_existing_solution_changes_nothing_twice() {
    let fs = TestFs::default();
    seed_library(&fs);

    run(&fs, &request_for("Lib"));
    let first_sln = fs.get("work/src/Demo.sln").unwrap();
    let first_csproj = fs.get("work/src/Lib/Lib.csproj").unwrap();

    run(&fs, &request_for("Lib"));

    assert_eq!(fs.get("work/src/Demo.sln").unwrap(), first_sln);
    assert_eq!(fs.get("work/src/Lib/Lib.csproj").unwrap(), first_csproj);
    assert_eq!(fs.get("work/.gitignore").as_deref(), Some("bin\nobj\n"));
    assert_eq!(fs.get("work/rakefile").as_deref(), Some("COMPANY = \"Acme\"\n"));
}

#[test]
fn second_project_joins_existing_solution() {
    let fs = TestFs::default();
    seed_library(&fs);

    run(&fs, &request_for("Lib"));
    run(&fs, &request_for("Web"));

    let mut solution = SolutionStore::new(&fs)
        .load(Path::new("work/src/Demo.sln"))
        .unwrap();
    let names: Vec<&str> = solution.projects().iter().map(|p| p.name()).collect();
    assert_eq!(names, ["Lib", "Web"]);

    // 6 configurations x 2 projects
    let text = solution.render();
    assert_eq!(text.matches(".ActiveCfg = ").count(), 12);
}

#[test]
fn missing_template_stops_before_anything_is_written() {
    let fs = TestFs::default();
    seed_library(&fs);

    let request = TemplateRequest::new("work", "Demo").with_template("nope");
    let err = TemplatePlanBuilder::new(TemplateLibrary::new("lib"))
        .build_plan(&request, Box::new(fs.clone()), Box::new(QuietLogger))
        .unwrap_err();

    assert_eq!(err.to_string(), "solution template 'nope' not found");
    assert!(fs.get("work/src/Demo.sln").is_none());
}

#[test]
fn items_survive_save_and_reload_once_each() {
    let fs = TestFs::default();
    let store = SolutionStore::new(&fs);

    let mut project = ProjectFile::create("src/Lib/Lib.csproj", "Lib").unwrap();
    project.add(CodeFile::from_include("b.cs"));
    project.add(CodeFile::from_include("a.cs"));
    project.add(CodeFile::from_include("b.cs"));
    store.save_project(&mut project).unwrap();

    let mut reloaded = store.load_project(Path::new("src/Lib/Lib.csproj")).unwrap();
    let includes: Vec<String> = reloaded
        .all::<CodeFile>()
        .into_iter()
        .map(|file| file.include().to_owned())
        .collect();
    assert_eq!(includes, ["a.cs", "b.cs"]);
}
