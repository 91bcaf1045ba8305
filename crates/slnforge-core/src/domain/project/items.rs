//! Typed project items.
//!
//! Each item kind maps to one MSBuild item element (`<Compile>`,
//! `<Reference>`, ...). [`AnyItem`] is the closed set of supported kinds;
//! item types outside that set are never materialized and pass through the
//! document untouched.

use std::fmt;

use uuid::Uuid;

use crate::domain::guid;
use crate::domain::msbuild::{Element, Layout};

pub const INCLUDE: &str = "Include";

/// Operations every typed item supports.
pub trait ProjectItem: fmt::Debug + Clone + Into<AnyItem> {
    /// MSBuild element name of this kind.
    const ITEM_TYPE: &'static str;

    fn from_include(include: &str) -> Self;

    fn include(&self) -> &str;

    /// Build from a backing element.
    fn read(element: &Element) -> Self;

    /// Write this item's metadata into its backing element.
    fn configure(&self, element: &mut Element, layout: Layout);

    /// Whether a new item of this kind should join `group`.
    fn belongs_in(&self, group: &Element) -> bool {
        group.has_child(Self::ITEM_TYPE) && group.attribute("Condition").is_none()
    }

    fn from_any(item: &AnyItem) -> Option<&Self>;

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self>;

    fn to_element(&self, layout: Layout) -> Element {
        let mut element = Element::new(Self::ITEM_TYPE).with_attribute(INCLUDE, self.include());
        self.configure(&mut element, layout);
        element
    }
}

/// One of the supported item kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyItem {
    CodeFile(CodeFile),
    AssemblyReference(AssemblyReference),
    ProjectReference(ProjectReference),
    EmbeddedResource(EmbeddedResource),
    Content(Content),
    None(NoneItem),
}

impl AnyItem {
    pub fn item_type(&self) -> &'static str {
        match self {
            Self::CodeFile(_) => CodeFile::ITEM_TYPE,
            Self::AssemblyReference(_) => AssemblyReference::ITEM_TYPE,
            Self::ProjectReference(_) => ProjectReference::ITEM_TYPE,
            Self::EmbeddedResource(_) => EmbeddedResource::ITEM_TYPE,
            Self::Content(_) => Content::ITEM_TYPE,
            Self::None(_) => NoneItem::ITEM_TYPE,
        }
    }

    pub fn include(&self) -> &str {
        match self {
            Self::CodeFile(item) => item.include(),
            Self::AssemblyReference(item) => item.include(),
            Self::ProjectReference(item) => item.include(),
            Self::EmbeddedResource(item) => item.include(),
            Self::Content(item) => item.include(),
            Self::None(item) => item.include(),
        }
    }

    pub fn configure(&self, element: &mut Element, layout: Layout) {
        match self {
            Self::CodeFile(item) => item.configure(element, layout),
            Self::AssemblyReference(item) => item.configure(element, layout),
            Self::ProjectReference(item) => item.configure(element, layout),
            Self::EmbeddedResource(item) => item.configure(element, layout),
            Self::Content(item) => item.configure(element, layout),
            Self::None(item) => item.configure(element, layout),
        }
    }
}

macro_rules! any_item_variant {
    ($variant:ident, $item:ty) => {
        impl From<$item> for AnyItem {
            fn from(item: $item) -> Self {
                AnyItem::$variant(item)
            }
        }

        impl $item {
            fn unwrap_any(item: &AnyItem) -> Option<&Self> {
                match item {
                    AnyItem::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn unwrap_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
                match item {
                    AnyItem::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

any_item_variant!(CodeFile, CodeFile);
any_item_variant!(AssemblyReference, AssemblyReference);
any_item_variant!(ProjectReference, ProjectReference);
any_item_variant!(EmbeddedResource, EmbeddedResource);
any_item_variant!(Content, Content);
any_item_variant!(None, NoneItem);

// ── Metadata helpers ──────────────────────────────────────────────────────────

fn set_metadata(element: &mut Element, name: &str, value: Option<&str>, layout: Layout) {
    match value {
        Some(value) => element.set_child_text(name, value, layout),
        None => {
            element.remove_elements(|e| e.name() == name);
        }
    }
}

fn read_flag(element: &Element, name: &str) -> Option<bool> {
    element
        .child_text(name)
        .map(|value| value.eq_ignore_ascii_case("true"))
}

fn flag_text(value: Option<bool>) -> Option<&'static str> {
    value.map(|flag| if flag { "True" } else { "False" })
}

fn include_of(element: &Element) -> String {
    element.attribute(INCLUDE).unwrap_or_default().to_owned()
}

// ── Compile ───────────────────────────────────────────────────────────────────

/// A source file compiled into the project (`<Compile>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFile {
    include: String,
    pub link: Option<String>,
}

impl ProjectItem for CodeFile {
    const ITEM_TYPE: &'static str = "Compile";

    fn from_include(include: &str) -> Self {
        Self {
            include: include.to_owned(),
            link: None,
        }
    }

    fn include(&self) -> &str {
        &self.include
    }

    fn read(element: &Element) -> Self {
        Self {
            include: include_of(element),
            link: element.child_text("Link"),
        }
    }

    fn configure(&self, element: &mut Element, layout: Layout) {
        set_metadata(element, "Link", self.link.as_deref(), layout);
    }

    /// Linked files live outside the project directory and are kept apart.
    fn belongs_in(&self, group: &Element) -> bool {
        group.attribute("Condition").is_none()
            && group.elements().any(|e| {
                e.name() == Self::ITEM_TYPE && e.has_child("Link") == self.link.is_some()
            })
    }

    fn from_any(item: &AnyItem) -> Option<&Self> {
        Self::unwrap_any(item)
    }

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
        Self::unwrap_any_mut(item)
    }
}

// ── Reference ─────────────────────────────────────────────────────────────────

/// A GAC or file assembly reference (`<Reference>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReference {
    include: String,
    pub hint_path: Option<String>,
    pub specific_version: Option<bool>,
    pub private: Option<bool>,
}

impl AssemblyReference {
    pub fn with_hint_path(mut self, hint_path: impl Into<String>) -> Self {
        self.hint_path = Some(hint_path.into());
        self
    }
}

impl ProjectItem for AssemblyReference {
    const ITEM_TYPE: &'static str = "Reference";

    fn from_include(include: &str) -> Self {
        Self {
            include: include.to_owned(),
            hint_path: None,
            specific_version: None,
            private: None,
        }
    }

    fn include(&self) -> &str {
        &self.include
    }

    fn read(element: &Element) -> Self {
        Self {
            include: include_of(element),
            hint_path: element.child_text("HintPath"),
            specific_version: read_flag(element, "SpecificVersion"),
            private: read_flag(element, "Private"),
        }
    }

    fn configure(&self, element: &mut Element, layout: Layout) {
        set_metadata(
            element,
            "SpecificVersion",
            flag_text(self.specific_version),
            layout,
        );
        set_metadata(element, "HintPath", self.hint_path.as_deref(), layout);
        set_metadata(element, "Private", flag_text(self.private), layout);
    }

    fn from_any(item: &AnyItem) -> Option<&Self> {
        Self::unwrap_any(item)
    }

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
        Self::unwrap_any_mut(item)
    }
}

// ── ProjectReference ──────────────────────────────────────────────────────────

/// A reference to another project file (`<ProjectReference>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    include: String,
    /// Raw `Project` metadata, normally a braced GUID.
    pub project: Option<String>,
    pub name: Option<String>,
}

impl ProjectReference {
    pub fn to_project(include: &str, guid: Uuid, name: &str) -> Self {
        Self {
            include: include.to_owned(),
            project: Some(format!("{{{}}}", guid.hyphenated())),
            name: Some(name.to_owned()),
        }
    }

    pub fn project_guid(&self) -> Option<Uuid> {
        self.project
            .as_deref()
            .and_then(|raw| guid::parse_guid(raw).ok())
    }
}

impl ProjectItem for ProjectReference {
    const ITEM_TYPE: &'static str = "ProjectReference";

    fn from_include(include: &str) -> Self {
        Self {
            include: include.to_owned(),
            project: None,
            name: None,
        }
    }

    fn include(&self) -> &str {
        &self.include
    }

    fn read(element: &Element) -> Self {
        Self {
            include: include_of(element),
            project: element.child_text("Project"),
            name: element.child_text("Name"),
        }
    }

    fn configure(&self, element: &mut Element, layout: Layout) {
        set_metadata(element, "Project", self.project.as_deref(), layout);
        set_metadata(element, "Name", self.name.as_deref(), layout);
    }

    fn from_any(item: &AnyItem) -> Option<&Self> {
        Self::unwrap_any(item)
    }

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
        Self::unwrap_any_mut(item)
    }
}

// ── EmbeddedResource ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResource {
    include: String,
}

impl ProjectItem for EmbeddedResource {
    const ITEM_TYPE: &'static str = "EmbeddedResource";

    fn from_include(include: &str) -> Self {
        Self {
            include: include.to_owned(),
        }
    }

    fn include(&self) -> &str {
        &self.include
    }

    fn read(element: &Element) -> Self {
        Self {
            include: include_of(element),
        }
    }

    fn configure(&self, _element: &mut Element, _layout: Layout) {}

    fn from_any(item: &AnyItem) -> Option<&Self> {
        Self::unwrap_any(item)
    }

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
        Self::unwrap_any_mut(item)
    }
}

// ── Content / None ────────────────────────────────────────────────────────────

/// Content and None items share groups in files written by Visual Studio.
fn is_file_group(group: &Element) -> bool {
    group.attribute("Condition").is_none()
        && group
            .elements()
            .any(|e| e.name() == Content::ITEM_TYPE || e.name() == NoneItem::ITEM_TYPE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    include: String,
    pub copy_to_output: Option<String>,
}

impl ProjectItem for Content {
    const ITEM_TYPE: &'static str = "Content";

    fn from_include(include: &str) -> Self {
        Self {
            include: include.to_owned(),
            copy_to_output: None,
        }
    }

    fn include(&self) -> &str {
        &self.include
    }

    fn read(element: &Element) -> Self {
        Self {
            include: include_of(element),
            copy_to_output: element.child_text("CopyToOutputDirectory"),
        }
    }

    fn configure(&self, element: &mut Element, layout: Layout) {
        set_metadata(
            element,
            "CopyToOutputDirectory",
            self.copy_to_output.as_deref(),
            layout,
        );
    }

    fn belongs_in(&self, group: &Element) -> bool {
        is_file_group(group)
    }

    fn from_any(item: &AnyItem) -> Option<&Self> {
        Self::unwrap_any(item)
    }

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
        Self::unwrap_any_mut(item)
    }
}

/// An item with no build action (`<None>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoneItem {
    include: String,
    pub copy_to_output: Option<String>,
}

impl ProjectItem for NoneItem {
    const ITEM_TYPE: &'static str = "None";

    fn from_include(include: &str) -> Self {
        Self {
            include: include.to_owned(),
            copy_to_output: None,
        }
    }

    fn include(&self) -> &str {
        &self.include
    }

    fn read(element: &Element) -> Self {
        Self {
            include: include_of(element),
            copy_to_output: element.child_text("CopyToOutputDirectory"),
        }
    }

    fn configure(&self, element: &mut Element, layout: Layout) {
        set_metadata(
            element,
            "CopyToOutputDirectory",
            self.copy_to_output.as_deref(),
            layout,
        );
    }

    fn belongs_in(&self, group: &Element) -> bool {
        is_file_group(group)
    }

    fn from_any(item: &AnyItem) -> Option<&Self> {
        Self::unwrap_any(item)
    }

    fn from_any_mut(item: &mut AnyItem) -> Option<&mut Self> {
        Self::unwrap_any_mut(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout {
            depth: 2,
            newline: "\n",
        }
    }

    #[test]
    fn reference_reads_and_writes_metadata() {
        let mut reference =
            AssemblyReference::from_include("FubuCore").with_hint_path("..\\lib\\FubuCore.dll");
        reference.specific_version = Some(false);

        let element = reference.to_element(layout());
        assert_eq!(element.attribute(INCLUDE), Some("FubuCore"));
        assert_eq!(AssemblyReference::read(&element), reference);
    }

    #[test]
    fn clearing_metadata_removes_the_child() {
        let mut element = AssemblyReference::from_include("Foo")
            .with_hint_path("foo.dll")
            .to_element(layout());
        AssemblyReference::from_include("Foo").configure(&mut element, layout());
        assert!(!element.has_child("HintPath"));
    }

    #[test]
    fn project_reference_exposes_guid() {
        let guid = Uuid::new_v4();
        let reference = ProjectReference::to_project("..\\Other\\Other.csproj", guid, "Other");
        assert_eq!(reference.project_guid(), Some(guid));
    }

    #[test]
    fn code_file_groups_separate_links() {
        let mut group = Element::new("ItemGroup");
        group.append_element(CodeFile::from_include("Foo.cs").to_element(layout()), layout());

        assert!(CodeFile::from_include("Bar.cs").belongs_in(&group));
        let mut linked = CodeFile::from_include("..\\Shared.cs");
        linked.link = Some("Shared.cs".into());
        assert!(!linked.belongs_in(&group));
    }

    #[test]
    fn any_item_round_trips_through_variants() {
        let item: AnyItem = Content::from_include("app.config").into();
        assert_eq!(item.item_type(), "Content");
        assert!(Content::from_any(&item).is_some());
        assert!(NoneItem::from_any(&item).is_none());
    }
}
