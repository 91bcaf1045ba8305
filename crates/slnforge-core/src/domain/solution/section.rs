use uuid::Uuid;

use crate::domain::guid::format_guid;

pub const SOLUTION_CONFIGURATION_PLATFORMS: &str = "SolutionConfigurationPlatforms";
pub const PROJECT_CONFIGURATION_PLATFORMS: &str = "ProjectConfigurationPlatforms";

const END_GLOBAL_SECTION: &str = "\tEndGlobalSection";

/// A `GlobalSection(name) = scope ... EndGlobalSection` block. Property
/// lines are kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSection {
    header: String,
    name: String,
    scope: String,
    properties: Vec<String>,
    footer: String,
    /// Unrecognized lines found after this section inside `Global`.
    pub(super) trailer: Vec<String>,
}

impl GlobalSection {
    pub fn new(name: &str, scope: &str) -> Self {
        Self {
            header: format!("\tGlobalSection({name}) = {scope}"),
            name: name.to_owned(),
            scope: scope.to_owned(),
            properties: Vec::new(),
            footer: END_GLOBAL_SECTION.to_owned(),
            trailer: Vec::new(),
        }
    }

    /// Parse a header line such as `\tGlobalSection(SolutionProperties) = preSolution`.
    pub(super) fn from_header(line: &str) -> Self {
        let trimmed = line.trim();
        let name = trimmed
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(name, _)| name.trim())
            .unwrap_or_default();
        let scope = trimmed
            .split_once('=')
            .map(|(_, scope)| scope.trim())
            .unwrap_or_default();

        Self {
            header: line.to_owned(),
            name: name.to_owned(),
            scope: scope.to_owned(),
            properties: Vec::new(),
            footer: END_GLOBAL_SECTION.to_owned(),
            trailer: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn read(&mut self, line: &str) {
        self.properties.push(line.to_owned());
    }

    pub fn clear(&mut self) {
        self.properties.clear();
    }

    pub(super) fn set_footer(&mut self, line: &str) {
        self.footer = line.to_owned();
    }

    pub(super) fn write(&self, out: &mut Vec<String>) {
        out.push(self.header.clone());
        out.extend(self.properties.iter().cloned());
        out.push(self.footer.clone());
        out.extend(self.trailer.iter().cloned());
    }
}

/// One `config|platform = config|platform` line of the
/// `SolutionConfigurationPlatforms` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    pub key: String,
    pub value: String,
}

impl BuildConfiguration {
    pub fn parse(line: &str) -> Option<Self> {
        let (key, value) = line.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key: key.to_owned(),
            value: value.trim().to_owned(),
        })
    }

    /// The `ProjectConfigurationPlatforms` line mapping `project` onto this
    /// configuration.
    pub fn project_line(&self, project: &Uuid) -> String {
        format!(
            "\t\t{}.{}.ActiveCfg = {}",
            format_guid(project),
            self.key,
            self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_yields_name_and_scope() {
        let section = GlobalSection::from_header("\tGlobalSection(SolutionProperties) = preSolution");
        assert_eq!(section.name(), "SolutionProperties");
        assert_eq!(section.scope(), "preSolution");
    }

    #[test]
    fn configuration_line_maps_project() {
        let config = BuildConfiguration::parse("\t\tDebug|Any CPU = Debug|Any CPU").unwrap();
        let guid = Uuid::from_u128(0x1);
        assert_eq!(
            config.project_line(&guid),
            "\t\t{00000000-0000-0000-0000-000000000001}.Debug|Any CPU.ActiveCfg = Debug|Any CPU"
        );
    }

    #[test]
    fn blank_configuration_lines_are_skipped() {
        assert!(BuildConfiguration::parse("   ").is_none());
    }
}
