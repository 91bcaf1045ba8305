//! Token substitution for generated files.
//!
//! [`Substitutions`] is an ordered token → text map. Tokens are applied as
//! literal find/replace passes in the order they were registered, so a value
//! may itself contain a token registered later.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Replaced with the namespace derived from the destination file's path.
pub const NAMESPACE: &str = "%NAMESPACE%";
/// Seeded with the project name for every project plan.
pub const ASSEMBLY_NAME: &str = "%ASSEMBLY_NAME%";
/// Path of the project file relative to the plan root, `/`-separated.
pub const PROJECT_PATH: &str = "%PROJECT_PATH%";
pub const SOLUTION_NAME: &str = "%SOLUTION_NAME%";
/// Path of the solution file relative to the plan root, `/`-separated.
pub const SOLUTION_PATH: &str = "%SOLUTION_PATH%";

/// Name of the per-project manifest recording the resolved token values.
pub const MANIFEST_FILE: &str = ".slnforge-tokens";

/// Ordered token → value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitutions {
    entries: Vec<(String, String)>,
}

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a token, keeping its original position if it is already present.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set a token only when no value is registered for it yet.
    pub fn set_if_missing(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !self.has(&key) {
            self.entries.push((key, value.into()));
        }
    }

    pub fn value_for(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every token into `other` that `other` does not define yet.
    pub fn copy_missing_into(&self, other: &mut Substitutions) {
        for (key, value) in &self.entries {
            other.set_if_missing(key.clone(), value.clone());
        }
    }

    /// Register the defaults of each input that has no value yet.
    pub fn read_inputs(&mut self, inputs: &[Input]) {
        for input in inputs {
            self.set_if_missing(input.name.clone(), input.default.clone());
        }
    }

    /// Replace every registered token in `text`, one pass per token.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_owned();
        for (key, value) in &self.entries {
            if key.is_empty() || !result.contains(key.as_str()) {
                continue;
            }
            result = result.replace(key.as_str(), value);
        }
        result
    }

    /// [`apply`](Self::apply), then rewrite [`NAMESPACE`] for a file written
    /// to `relative_path` inside `project_name`.
    pub fn apply_for_file(&self, text: &str, project_name: &str, relative_path: &str) -> String {
        let result = self.apply(text);
        if !result.contains(NAMESPACE) {
            return result;
        }
        result.replace(NAMESPACE, &namespace_for(project_name, relative_path))
    }

    /// Render as `KEY=value` lines.
    pub fn to_manifest(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Parse the output of [`to_manifest`](Self::to_manifest).
    pub fn from_manifest(text: &str) -> Self {
        let mut substitutions = Self::new();
        for line in text.lines() {
            if let Some((key, value)) = line.split_once('=') {
                substitutions.set(key.trim(), value.trim());
            }
        }
        substitutions
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Substitutions {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut substitutions = Self::new();
        for (key, value) in iter {
            substitutions.set(key, value);
        }
        substitutions
    }
}

/// Namespace for a file: the project name followed by each directory segment
/// of `relative_path` (the file name itself is dropped), joined with dots.
pub fn namespace_for(project_name: &str, relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let mut segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();

    std::iter::once(project_name)
        .chain(segments)
        .collect::<Vec<_>>()
        .join(".")
}

/// Wrap a token name in `%` unless it already is.
pub fn to_token(name: &str) -> String {
    let name = name.trim();
    if name.len() > 1 && name.starts_with('%') && name.ends_with('%') {
        name.to_owned()
    } else {
        format!("%{}%", name.trim_matches('%'))
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// A token declared by a template's inputs file, with its default value.
///
/// Lines look like `NAME=default~description`; the description is optional,
/// blank lines and `#` comments are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub name: String,
    pub default: String,
    pub description: Option<String>,
}

impl Input {
    /// File name of the inputs file inside a solution template.
    pub const FILE: &'static str = "inputs.txt";

    pub fn new(name: &str, default: impl Into<String>) -> Self {
        Self {
            name: to_token(name),
            default: default.into(),
            description: None,
        }
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (body, description) = match line.split_once('~') {
            Some((body, description)) => (body, Some(description.trim().to_owned())),
            None => (line, None),
        };
        let (name, default) = body.split_once('=').unwrap_or((body, ""));
        if name.trim().is_empty() {
            return None;
        }

        Some(Self {
            name: to_token(name),
            default: default.trim().to_owned(),
            description: description.filter(|d| !d.is_empty()),
        })
    }

    pub fn parse_all(text: &str) -> Vec<Self> {
        text.lines().filter_map(Self::parse_line).collect()
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.default)?;
        if let Some(description) = &self.description {
            write!(f, " ({description})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replaces_every_occurrence_in_registration_order() {
        let mut subs = Substitutions::new();
        subs.set("%A%", "x%B%");
        subs.set("%B%", "y");

        assert_eq!(subs.apply("%A% and %A% / %B%"), "xy and xy / y");
    }

    #[test]
    fn set_keeps_position_and_overwrites() {
        let mut subs = Substitutions::new();
        subs.set("%A%", "1");
        subs.set("%B%", "2");
        subs.set("%A%", "3");

        let keys: Vec<_> = subs.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["%A%", "%B%"]);
        assert_eq!(subs.value_for("%A%"), Some("3"));
    }

    #[test]
    fn set_if_missing_does_not_overwrite() {
        let mut subs = Substitutions::new();
        subs.set("%A%", "1");
        subs.set_if_missing("%A%", "2");
        assert_eq!(subs.value_for("%A%"), Some("1"));
    }

    #[test]
    fn namespace_uses_directory_segments() {
        assert_eq!(namespace_for("MyProject", "Foo.cs"), "MyProject");
        assert_eq!(
            namespace_for("MyProject", "Properties/AssemblyInfo.cs"),
            "MyProject.Properties"
        );
        assert_eq!(
            namespace_for("MyProject", "a\\b\\c\\Thing.cs"),
            "MyProject.a.b.c"
        );
    }

    #[test]
    fn apply_for_file_rewrites_namespace_last() {
        let mut subs = Substitutions::new();
        subs.set(ASSEMBLY_NAME, "MyProject");

        let text = "namespace %NAMESPACE% // %ASSEMBLY_NAME%";
        assert_eq!(
            subs.apply_for_file(text, "MyProject", "Models/Thing.cs"),
            "namespace MyProject.Models // MyProject"
        );
    }

    #[test]
    fn manifest_round_trips() {
        let mut subs = Substitutions::new();
        subs.set(ASSEMBLY_NAME, "MyProject");
        subs.set(PROJECT_PATH, "src/MyProject/MyProject.csproj");

        let text = subs.to_manifest();
        assert_eq!(
            text,
            "%ASSEMBLY_NAME%=MyProject\n%PROJECT_PATH%=src/MyProject/MyProject.csproj\n"
        );
        assert_eq!(Substitutions::from_manifest(&text), subs);
    }

    #[test]
    fn inputs_parse_names_defaults_and_descriptions() {
        let inputs = Input::parse_all(
            "# comment\n\nSHORT_NAME=Foo~Short name of the app\n%COLOR%=blue\nEMPTY\n",
        );

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].name, "%SHORT_NAME%");
        assert_eq!(inputs[0].default, "Foo");
        assert_eq!(
            inputs[0].description.as_deref(),
            Some("Short name of the app")
        );
        assert_eq!(inputs[1].name, "%COLOR%");
        assert_eq!(inputs[2].default, "");
    }

    #[test]
    fn read_inputs_only_fills_gaps() {
        let mut subs = Substitutions::new();
        subs.set("%COLOR%", "red");
        subs.read_inputs(&[Input::new("COLOR", "blue"), Input::new("SIZE", "10")]);

        assert_eq!(subs.value_for("%COLOR%"), Some("red"));
        assert_eq!(subs.value_for("%SIZE%"), Some("10"));
    }
}
