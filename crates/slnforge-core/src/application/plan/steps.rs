//! Solution-scoped steps.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{PlanContext, TemplateStep};
use crate::application::ports::Filesystem;
use crate::application::store::SolutionStore;
use crate::domain::project::native_path;
use crate::domain::substitutions::{SOLUTION_NAME, SOLUTION_PATH};
use crate::domain::{Solution, Substitutions};
use crate::error::ForgeResult;

/// Directory under the root that holds the solution file.
pub const SOURCE_DIRECTORY: &str = "src";

// ── Text merging ──────────────────────────────────────────────────────────────

fn read_lines(fs: &dyn Filesystem, path: &Path) -> ForgeResult<Vec<String>> {
    if !fs.file_exists(path) {
        return Ok(Vec::new());
    }
    Ok(fs
        .read_to_string(path)?
        .lines()
        .map(str::to_owned)
        .collect())
}

fn write_lines(fs: &dyn Filesystem, path: &Path, lines: &[String]) -> ForgeResult<()> {
    let mut text = lines.join("\n");
    text.push('\n');
    fs.write_file(path, &text)
}

fn contains_sequence(haystack: &[String], needle: &[String]) -> bool {
    needle.is_empty()
        || haystack
            .windows(needle.len())
            .any(|window| window == needle)
}

/// Append `fragment` to `target` after a blank line unless its exact line
/// sequence is already there. Returns whether the file changed.
pub(crate) fn append_fragment(fs: &dyn Filesystem, target: &Path, fragment: &str) -> ForgeResult<bool> {
    let fragment: Vec<String> = fragment.lines().map(str::to_owned).collect();
    let mut lines = read_lines(fs, target)?;
    if contains_sequence(&lines, &fragment) {
        debug!(target = %target.display(), "fragment already present");
        return Ok(false);
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.extend(fragment);
    write_lines(fs, target, &lines)?;
    Ok(true)
}

/// Append each of `entries` that `target` does not already contain.
fn append_missing_lines(fs: &dyn Filesystem, target: &Path, seed: &[&str], entries: &[String]) -> ForgeResult<()> {
    let mut lines = read_lines(fs, target)?;
    if lines.is_empty() {
        lines.extend(seed.iter().map(|line| line.to_string()));
    }
    let before = lines.len();
    for entry in entries {
        if !lines.iter().any(|line| line.trim() == entry.trim()) {
            lines.push(entry.clone());
        }
    }
    if lines.len() != before || !fs.file_exists(target) {
        write_lines(fs, target, &lines)?;
    }
    Ok(())
}

fn record_solution(substitutions: &mut Substitutions, solution: &Solution, path: String) {
    substitutions.set(SOLUTION_NAME, solution.name());
    substitutions.set(SOLUTION_PATH, path);
}

// ── Solution file ─────────────────────────────────────────────────────────────

/// Start a new solution at `<root>/src/<name>.sln`.
#[derive(Debug, Clone)]
pub struct CreateSolution {
    name: String,
}

impl CreateSolution {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TemplateStep for CreateSolution {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let directory = context.root().join(SOURCE_DIRECTORY);
        context.filesystem().create_dir_all(&directory)?;

        let solution = Solution::create_new(&directory, &self.name)?;
        let path = context.relative_to_root(solution.filename());
        record_solution(context.substitutions_mut(), &solution, path);
        info!(solution = %self.name, "solution created");
        context.set_solution(solution);
        Ok(())
    }
}

impl fmt::Display for CreateSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Create solution '{}'", self.name)
    }
}

/// Load an existing solution file.
#[derive(Debug, Clone)]
pub struct ReadSolution {
    path: PathBuf,
}

impl ReadSolution {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TemplateStep for ReadSolution {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let solution = SolutionStore::new(context.filesystem()).load(&self.path)?;
        let path = context.relative_to_root(&self.path);
        record_solution(context.substitutions_mut(), &solution, path);
        context.set_solution(solution);
        Ok(())
    }
}

impl fmt::Display for ReadSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Read solution {}", self.path.display())
    }
}

// ── Files and directories ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SolutionDirectory {
    relative_path: String,
}

impl SolutionDirectory {
    pub fn new(relative_path: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
        }
    }
}

impl TemplateStep for SolutionDirectory {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let path = context.root().join(native_path(&self.relative_path));
        context.filesystem().create_dir_all(&path)
    }
}

impl fmt::Display for SolutionDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Create directory {}", self.relative_path)
    }
}

/// Copy a template file under the root, applying substitutions.
#[derive(Debug, Clone)]
pub struct CopyFileToSolution {
    relative_path: String,
    source: PathBuf,
}

impl CopyFileToSolution {
    pub fn new(relative_path: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            source: source.into(),
        }
    }
}

impl TemplateStep for CopyFileToSolution {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let text = context.filesystem().read_to_string(&self.source)?;
        let text = context.substitutions().apply(&text);
        let target = context.root().join(native_path(&self.relative_path));
        context.filesystem().write_file(&target, &text)
    }
}

impl fmt::Display for CopyFileToSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Copy {}", self.relative_path)
    }
}

// ── Build script, ignore file, gems ───────────────────────────────────────────

/// Merge a `rake.txt` fragment into the root `rakefile`.
#[derive(Debug, Clone)]
pub struct BuildScriptTransform {
    text: String,
}

impl BuildScriptTransform {
    pub const SOURCE_FILE: &'static str = "rake.txt";
    pub const TARGET_FILE: &'static str = "rakefile";

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl TemplateStep for BuildScriptTransform {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let fragment = context.substitutions().apply(&self.text);
        let target = context.root().join(Self::TARGET_FILE);
        append_fragment(context.filesystem(), &target, &fragment)?;
        Ok(())
    }
}

impl fmt::Display for BuildScriptTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Add content to the rakefile")
    }
}

/// Merge `ignore.txt` entries into the root `.gitignore`.
#[derive(Debug, Clone)]
pub struct GitIgnoreStep {
    entries: Vec<String>,
}

impl GitIgnoreStep {
    pub const SOURCE_FILE: &'static str = "ignore.txt";
    pub const TARGET_FILE: &'static str = ".gitignore";

    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }
}

impl TemplateStep for GitIgnoreStep {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let target = context.root().join(Self::TARGET_FILE);
        append_missing_lines(context.filesystem(), &target, &[], &self.entries)
    }
}

impl fmt::Display for GitIgnoreStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Add to .gitignore: {}", self.entries.join(", "))
    }
}

/// Merge `gems.txt` (`name,version` lines) into the root `Gemfile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemReference {
    gems: Vec<(String, Option<String>)>,
}

impl GemReference {
    pub const SOURCE_FILE: &'static str = "gems.txt";
    pub const TARGET_FILE: &'static str = "Gemfile";
    pub const SOURCE_LINE: &'static str = "source 'http://rubygems.org'";

    pub fn from_text(text: &str) -> Self {
        let gems = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| match line.split_once(',') {
                Some((name, version)) => {
                    let version = version.trim();
                    (
                        name.trim().to_owned(),
                        (!version.is_empty()).then(|| version.to_owned()),
                    )
                }
                None => (line.to_owned(), None),
            })
            .collect();
        Self { gems }
    }

    fn gem_lines(&self) -> Vec<String> {
        self.gems
            .iter()
            .map(|(name, version)| match version {
                Some(version) => format!("gem \"{name}\", \"{version}\""),
                None => format!("gem \"{name}\""),
            })
            .collect()
    }
}

impl TemplateStep for GemReference {
    fn alter(&self, context: &mut PlanContext) -> ForgeResult<()> {
        let target = context.root().join(Self::TARGET_FILE);
        append_missing_lines(
            context.filesystem(),
            &target,
            &[Self::SOURCE_LINE, ""],
            &self.gem_lines(),
        )
    }
}

impl fmt::Display for GemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.gems.iter().map(|(name, _)| name.as_str()).collect();
        write!(f, "Add gems: {}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::application::ports::MockFilesystem;
    use crate::application::testing::plan_with;

    #[test]
    fn fragment_is_not_appended_twice() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists().return_const(true);
        fs.expect_read_to_string()
            .returning(|_| Ok("task :default\n\ntask :ci do\nend\n".into()));
        fs.expect_write_file().never();

        let changed = append_fragment(&fs, Path::new("rakefile"), "task :ci do\nend").unwrap();
        assert!(!changed);
    }

    #[test]
    fn fragment_is_appended_after_blank_line() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists().return_const(true);
        fs.expect_read_to_string()
            .returning(|_| Ok("task :default\n".into()));
        fs.expect_write_file()
            .with(eq(PathBuf::from("rakefile")), eq("task :default\n\ntask :ci\n"))
            .times(1)
            .returning(|_, _| Ok(()));

        assert!(append_fragment(&fs, Path::new("rakefile"), "task :ci").unwrap());
    }

    #[test]
    fn gitignore_only_gains_missing_entries() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists().return_const(true);
        fs.expect_read_to_string()
            .returning(|_| Ok("bin\nobj\n".into()));
        fs.expect_write_file()
            .with(eq(PathBuf::from("work/.gitignore")), eq("bin\nobj\n*.suo\n"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut plan = plan_with(fs);
        plan.add(GitIgnoreStep::from_text("obj\n\n*.suo\n"));
        plan.execute().unwrap();
    }

    #[test]
    fn gemfile_is_seeded_with_source() {
        let mut fs = MockFilesystem::new();
        fs.expect_file_exists().return_const(false);
        fs.expect_write_file()
            .with(
                eq(PathBuf::from("work/Gemfile")),
                eq("source 'http://rubygems.org'\n\ngem \"rake\", \"~> 10.0\"\ngem \"fuburake\"\n"),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let mut plan = plan_with(fs);
        plan.add(GemReference::from_text("rake, ~> 10.0\nfuburake\n"));
        plan.execute().unwrap();
    }

    #[test]
    fn create_solution_records_tokens() {
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file()
            .with(eq(PathBuf::from("work/src/Demo.sln")), always())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut plan = plan_with(fs);
        plan.add(CreateSolution::new("Demo"));
        plan.execute().unwrap();

        assert_eq!(plan.substitutions().value_for(SOLUTION_NAME), Some("Demo"));
        assert_eq!(
            plan.substitutions().value_for(SOLUTION_PATH),
            Some("src/Demo.sln")
        );
        assert!(plan.solution().is_some());
    }

    #[test]
    fn copy_applies_substitutions() {
        let mut fs = MockFilesystem::new();
        fs.expect_read_to_string()
            .with(eq(PathBuf::from("tpl/readme.md")))
            .returning(|_| Ok("# %SOLUTION_NAME%".into()));
        fs.expect_write_file()
            .with(eq(PathBuf::from("work/docs/readme.md")), eq("# Demo"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut plan = plan_with(fs);
        plan.substitutions_mut().set(SOLUTION_NAME, "Demo");
        plan.add(CopyFileToSolution::new("docs/readme.md", "tpl/readme.md"));
        plan.execute().unwrap();
    }
}
