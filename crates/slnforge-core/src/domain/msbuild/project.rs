//! Property-group/item-group view over a project document.

use super::element::{Element, Layout, XmlDocument};
use crate::domain::error::DomainError;

pub const PROJECT: &str = "Project";
pub const PROPERTY_GROUP: &str = "PropertyGroup";
pub const ITEM_GROUP: &str = "ItemGroup";

const CLASS_LIBRARY_SKELETON: &str = include_str!("skeleton.csproj");

/// A legacy MSBuild project: ordered property groups and item groups under a
/// `<Project>` root. Everything else in the document passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsBuildProject {
    document: XmlDocument,
}

impl MsBuildProject {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let document = XmlDocument::parse(text)?;
        if document.root().name() != PROJECT {
            return Err(DomainError::MalformedProjectFile {
                reason: format!(
                    "root element is <{}>, expected <{PROJECT}>",
                    document.root().name()
                ),
            });
        }
        Ok(Self { document })
    }

    /// Empty class-library project.
    pub fn class_library() -> Result<Self, DomainError> {
        Self::parse(CLASS_LIBRARY_SKELETON)
    }

    pub fn render(&self) -> String {
        self.document.render()
    }

    /// Layout of any group element.
    pub fn group_layout(&self) -> Layout {
        self.document.layout().child()
    }

    /// Layout of any item element.
    pub fn item_layout(&self) -> Layout {
        self.group_layout().child()
    }

    // ── Properties ────────────────────────────────────────────────────────

    pub fn property_groups(&self) -> impl Iterator<Item = &Element> {
        self.document
            .root()
            .elements()
            .filter(|e| e.name() == PROPERTY_GROUP)
    }

    /// First non-empty value of `name` across property groups, in document order.
    pub fn property(&self, name: &str) -> Option<String> {
        self.property_values(name).into_iter().next()
    }

    /// Every non-empty value of `name`, in document order.
    pub fn property_values(&self, name: &str) -> Vec<String> {
        self.property_groups()
            .filter_map(|group| group.child_text(name))
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Update `name` in the group already defining it, else in the first
    /// property group, else in a new group.
    pub fn set_property(&mut self, name: &str, value: &str) {
        let layout = self.group_layout();
        let root = self.document.root_mut();

        if let Some(group) = root
            .elements_mut()
            .filter(|e| e.name() == PROPERTY_GROUP)
            .find(|group| group.has_child(name))
        {
            group.set_child_text(name, value, layout);
            return;
        }

        if let Some(group) = root.elements_mut().find(|e| e.name() == PROPERTY_GROUP) {
            group.set_child_text(name, value, layout);
            return;
        }

        let mut group = Element::new(PROPERTY_GROUP);
        group.append_element(Element::with_text(name, value), layout);
        self.insert_group(group);
    }

    // ── Items ─────────────────────────────────────────────────────────────

    pub fn item_groups(&self) -> impl Iterator<Item = &Element> {
        self.document
            .root()
            .elements()
            .filter(|e| e.name() == ITEM_GROUP)
    }

    /// Every item element named `item_type`, in document order.
    pub fn items_of<'a>(&'a self, item_type: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.item_groups()
            .flat_map(move |group| group.elements().filter(move |e| e.name() == item_type))
    }

    pub fn find_item<'a>(&'a self, item_type: &'a str, include: &str) -> Option<&'a Element> {
        self.items_of(item_type)
            .find(|e| e.attribute("Include") == Some(include))
    }

    pub fn find_item_mut(&mut self, item_type: &str, include: &str) -> Option<&mut Element> {
        self.document
            .root_mut()
            .elements_mut()
            .filter(|e| e.name() == ITEM_GROUP)
            .flat_map(|group| group.elements_mut())
            .find(|e| e.name() == item_type && e.attribute("Include") == Some(include))
    }

    /// Append `item` to the first item group accepted by `belongs`, else to
    /// the first group already holding items of the same type, else to a new
    /// item group.
    pub fn add_item(&mut self, item: Element, belongs: impl Fn(&Element) -> bool) {
        let layout = self.group_layout();
        let item_type = item.name().to_owned();
        let root = self.document.root_mut();

        let target = root
            .elements()
            .filter(|e| e.name() == ITEM_GROUP)
            .position(|group| belongs(group))
            .or_else(|| {
                root.elements()
                    .filter(|e| e.name() == ITEM_GROUP)
                    .position(|group| group.has_child(&item_type))
            });

        match target.and_then(|index| {
            root.elements_mut()
                .filter(|e| e.name() == ITEM_GROUP)
                .nth(index)
        }) {
            Some(group) => group.append_element(item, layout),
            None => {
                let mut group = Element::new(ITEM_GROUP);
                group.append_element(item, layout);
                self.insert_group(group);
            }
        }
    }

    /// Remove every `item_type` element with the given `Include`.
    pub fn remove_item(&mut self, item_type: &str, include: &str) -> usize {
        self.document
            .root_mut()
            .elements_mut()
            .filter(|e| e.name() == ITEM_GROUP)
            .map(|group| {
                group.remove_elements(|e| {
                    e.name() == item_type && e.attribute("Include") == Some(include)
                })
            })
            .sum()
    }

    /// New groups go right after the last existing group so they stay ahead
    /// of trailing `<Import>` elements.
    fn insert_group(&mut self, group: Element) {
        let layout = self.document.layout();
        let root = self.document.root_mut();
        match root.last_position(|e| e.name() == PROPERTY_GROUP || e.name() == ITEM_GROUP) {
            Some(index) => root.insert_element_after(index, group, layout),
            None => root.append_element(group, layout),
        }
    }
}
