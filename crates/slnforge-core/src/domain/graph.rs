//! Template graph: a catalogue of named template sets that resolves a user's
//! choices into a concrete [`ProjectRequest`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::substitutions::Substitutions;

/// A named bundle of alterations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOption {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub alterations: Vec<String>,
}

impl TemplateOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_alterations<I, S>(mut self, alterations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alterations = alterations.into_iter().map(Into::into).collect();
        self
    }
}

/// A mutually exclusive choice between options. The first option is the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSelection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: Vec<TemplateOption>,
}

impl OptionSelection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_option(mut self, option: TemplateOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn find_option(&self, name: &str) -> Option<&TemplateOption> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    pub fn default_option(&self) -> Option<&TemplateOption> {
        self.options.first()
    }
}

/// A named, tagged template definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSet {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Empty means "valid for any tag".
    #[serde(default)]
    pub tags: Vec<String>,
    /// Project template used by requests resolved from this set.
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub alterations: Vec<String>,
    #[serde(default)]
    pub options: Vec<TemplateOption>,
    #[serde(default)]
    pub selections: Vec<OptionSelection>,
}

impl TemplateSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn find_option(&self, name: &str) -> Option<&TemplateOption> {
        self.options
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    pub fn is_tagged(&self, tag: &str) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|t| t == tag)
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateChoices {
    pub set_name: String,
    pub tag: String,
    pub project_name: String,
    /// Selection name → chosen option name.
    #[serde(default)]
    pub selections: BTreeMap<String, String>,
    /// Explicitly requested option names, applied in order.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,
}

/// The resolved output of [`TemplateGraph::configure`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRequest {
    pub name: String,
    pub template: String,
    pub alterations: Vec<String>,
    pub substitutions: Substitutions,
}

impl ProjectRequest {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            ..Self::default()
        }
    }

    pub fn with_alteration(mut self, alteration: impl Into<String>) -> Self {
        self.alterations.push(alteration.into());
        self
    }
}

/// Mapping from set name to [`TemplateSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGraph {
    #[serde(default)]
    sets: BTreeMap<String, TemplateSet>,
}

impl TemplateGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set, replacing any set with the same name.
    pub fn add(&mut self, set: TemplateSet) {
        self.sets.insert(set.name.clone(), set);
    }

    pub fn find(&self, name: &str) -> Option<&TemplateSet> {
        self.sets.get(name)
    }

    pub fn sets(&self) -> impl Iterator<Item = &TemplateSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Resolve `choices` into a project request.
    ///
    /// Alterations are the set's base alterations, then the chosen option of
    /// each selection (first option when none was chosen), then each
    /// explicitly requested option in the order given. Nothing is
    /// deduplicated.
    pub fn configure(&self, choices: &TemplateChoices) -> Result<ProjectRequest, DomainError> {
        if choices.set_name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "SetName" });
        }

        let set = self
            .find(&choices.set_name)
            .ok_or_else(|| DomainError::UnknownTemplateSet {
                name: choices.set_name.clone(),
            })?;

        if choices.project_name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField {
                field: "ProjectName",
            });
        }

        if !set.is_tagged(&choices.tag) {
            return Err(DomainError::InvalidTag {
                set: set.name.clone(),
                tag: choices.tag.clone(),
            });
        }

        let mut alterations = set.alterations.clone();

        for selection in &set.selections {
            let option = match chosen_option(choices, &selection.name) {
                Some(name) => {
                    selection
                        .find_option(name)
                        .ok_or_else(|| DomainError::UnknownOption {
                            set: set.name.clone(),
                            option: name.to_owned(),
                        })?
                }
                None => match selection.default_option() {
                    Some(option) => option,
                    None => continue,
                },
            };
            alterations.extend(option.alterations.iter().cloned());
        }

        for name in &choices.options {
            let option = set
                .find_option(name)
                .ok_or_else(|| DomainError::UnknownOption {
                    set: set.name.clone(),
                    option: name.clone(),
                })?;
            alterations.extend(option.alterations.iter().cloned());
        }

        let substitutions = choices
            .inputs
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(ProjectRequest {
            name: choices.project_name.clone(),
            template: set.template.clone(),
            alterations,
            substitutions,
        })
    }
}

impl FromIterator<TemplateSet> for TemplateGraph {
    fn from_iter<T: IntoIterator<Item = TemplateSet>>(iter: T) -> Self {
        let mut graph = Self::new();
        for set in iter {
            graph.add(set);
        }
        graph
    }
}

fn chosen_option<'a>(choices: &'a TemplateChoices, selection: &str) -> Option<&'a str> {
    choices
        .selections
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(selection))
        .map(|(_, option)| option.as_str())
}
