//! Project file model.
//!
//! [`ProjectFile`] owns one MSBuild document and an identity cache of typed
//! items. Every query goes through the cache, so an item fetched twice is the
//! same logical object and edits made through [`ProjectFile::item_mut`] are
//! written back on [`ProjectFile::flush`].

pub mod items;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use super::error::DomainError;
use super::guid::{format_guid, parse_guid};
use super::msbuild::MsBuildProject;
use super::substitutions;

pub use items::{
    AnyItem, AssemblyReference, CodeFile, Content, EmbeddedResource, NoneItem, ProjectItem,
    ProjectReference,
};

pub const PROJECT_GUID: &str = "ProjectGuid";
pub const ASSEMBLY_NAME: &str = "AssemblyName";
pub const ROOT_NAMESPACE: &str = "RootNamespace";
pub const TARGET_FRAMEWORK_VERSION: &str = "TargetFrameworkVersion";
pub const PROJECT_TYPE_GUIDS: &str = "ProjectTypeGuids";

/// Project type of a plain C# class library.
pub const CLASS_LIBRARY: Uuid = Uuid::from_u128(0xFAE04EC0_301F_11D3_BF4B_00C04F79EFBC);

/// Stable index of a cached item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemHandle(usize);

/// Arena of live typed items keyed by `(item type, Include)`.
#[derive(Debug, Clone, Default)]
struct ItemArena {
    slots: Vec<Option<AnyItem>>,
    index: HashMap<(String, String), ItemHandle>,
}

impl ItemArena {
    fn key(item_type: &str, include: &str) -> (String, String) {
        (item_type.to_owned(), include.to_owned())
    }

    fn lookup(&self, item_type: &str, include: &str) -> Option<ItemHandle> {
        self.index.get(&Self::key(item_type, include)).copied()
    }

    fn get(&self, handle: ItemHandle) -> Option<&AnyItem> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, handle: ItemHandle) -> Option<&mut AnyItem> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Insert or replace the live item with the same key.
    fn insert(&mut self, item: AnyItem) -> ItemHandle {
        let key = Self::key(item.item_type(), item.include());
        if let Some(handle) = self.index.get(&key).copied() {
            self.slots[handle.0] = Some(item);
            return handle;
        }
        let handle = ItemHandle(self.slots.len());
        self.slots.push(Some(item));
        self.index.insert(key, handle);
        handle
    }

    fn remove(&mut self, item_type: &str, include: &str) -> Option<AnyItem> {
        let handle = self.index.remove(&Self::key(item_type, include))?;
        self.slots.get_mut(handle.0).and_then(Option::take)
    }

    fn live(&self) -> impl Iterator<Item = &AnyItem> {
        self.slots.iter().flatten()
    }
}

/// One `.csproj` file.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    file_name: PathBuf,
    project: MsBuildProject,
    items: ItemArena,
}

impl ProjectFile {
    pub fn parse(file_name: impl Into<PathBuf>, text: &str) -> Result<Self, DomainError> {
        Ok(Self {
            file_name: file_name.into(),
            project: MsBuildProject::parse(text)?,
            items: ItemArena::default(),
        })
    }

    /// New class library with a fresh GUID.
    pub fn create(file_name: impl Into<PathBuf>, assembly_name: &str) -> Result<Self, DomainError> {
        let mut project = Self {
            file_name: file_name.into(),
            project: MsBuildProject::class_library()?,
            items: ItemArena::default(),
        };
        project.set_project_guid(Uuid::new_v4());
        project.set_assembly_name(assembly_name);
        project.set_root_namespace(assembly_name);
        Ok(project)
    }

    /// New project from template text. `%ASSEMBLY_NAME%` is replaced with
    /// `assembly_name` and the project always gets a fresh GUID.
    pub fn from_template(
        file_name: impl Into<PathBuf>,
        assembly_name: &str,
        template: &str,
    ) -> Result<Self, DomainError> {
        let text = template.replace(substitutions::ASSEMBLY_NAME, assembly_name);
        let mut project = Self::parse(file_name, &text)?;
        project.set_project_guid(Uuid::new_v4());
        if project.assembly_name().is_none() {
            project.set_assembly_name(assembly_name);
        }
        if project.root_namespace().is_none() {
            project.set_root_namespace(assembly_name);
        }
        Ok(project)
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// File stem of the project file.
    pub fn project_name(&self) -> String {
        self.file_name
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn project_directory(&self) -> &Path {
        self.file_name.parent().unwrap_or(Path::new(""))
    }

    /// Absolute location of a compiled file.
    pub fn path_to(&self, file: &CodeFile) -> PathBuf {
        self.project_directory().join(native_path(file.include()))
    }

    // ── Properties ────────────────────────────────────────────────────────

    pub fn property(&self, name: &str) -> Option<String> {
        self.project.property(name)
    }

    pub fn set_property(&mut self, name: &str, value: &str) {
        self.project.set_property(name, value);
    }

    pub fn project_guid(&self) -> Option<Uuid> {
        let raw = self.property(PROJECT_GUID)?;
        match parse_guid(&raw) {
            Ok(guid) => Some(guid),
            Err(_) => {
                warn!(project = %self.file_name.display(), value = %raw, "unparsable project GUID");
                None
            }
        }
    }

    pub(crate) fn set_project_guid(&mut self, guid: Uuid) {
        self.project.set_property(PROJECT_GUID, &format_guid(&guid));
    }

    pub fn assembly_name(&self) -> Option<String> {
        self.property(ASSEMBLY_NAME)
    }

    pub fn set_assembly_name(&mut self, value: &str) {
        self.set_property(ASSEMBLY_NAME, value);
    }

    pub fn root_namespace(&self) -> Option<String> {
        self.property(ROOT_NAMESPACE)
    }

    pub fn set_root_namespace(&mut self, value: &str) {
        self.set_property(ROOT_NAMESPACE, value);
    }

    pub fn target_framework_version(&self) -> Option<String> {
        self.property(TARGET_FRAMEWORK_VERSION)
    }

    pub fn set_target_framework_version(&mut self, value: &str) {
        self.set_property(TARGET_FRAMEWORK_VERSION, value);
    }

    /// Project type GUIDs, defaulting to [`CLASS_LIBRARY`].
    pub fn project_types(&self) -> ProjectTypes {
        let segments: Vec<String> = self
            .property(PROJECT_TYPE_GUIDS)
            .map(|raw| {
                raw.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        ProjectTypes {
            fallback: segments.is_empty().then_some(CLASS_LIBRARY),
            segments: segments.into_iter(),
        }
    }

    // ── Items ─────────────────────────────────────────────────────────────

    /// Write `item` into the document and the cache. An existing item with
    /// the same `Include` is replaced in place.
    pub fn add<T: ProjectItem>(&mut self, item: T) -> ItemHandle {
        let layout = self.project.item_layout();
        match self.project.find_item_mut(T::ITEM_TYPE, item.include()) {
            Some(element) => item.configure(element, layout),
            None => {
                let element = item.to_element(layout);
                self.project.add_item(element, |group| item.belongs_in(group));
            }
        }
        self.items.insert(item.into())
    }

    /// Handles of every `T`, ordered by `Include`.
    pub fn all_handles<T: ProjectItem>(&mut self) -> Vec<ItemHandle> {
        let mut includes: Vec<String> = self
            .project
            .items_of(T::ITEM_TYPE)
            .filter_map(|e| e.attribute(items::INCLUDE))
            .map(str::to_owned)
            .collect();
        includes.sort();
        includes.dedup();

        let mut handles = Vec::with_capacity(includes.len());
        for include in includes {
            let handle = match self.items.lookup(T::ITEM_TYPE, &include) {
                Some(handle) => handle,
                None => {
                    let Some(element) = self.project.find_item(T::ITEM_TYPE, &include) else {
                        continue;
                    };
                    self.items.insert(T::read(element).into())
                }
            };
            handles.push(handle);
        }
        handles
    }

    /// Every `T`, ordered by `Include`.
    pub fn all<T: ProjectItem>(&mut self) -> Vec<&T> {
        let handles = self.all_handles::<T>();
        handles
            .into_iter()
            .filter_map(|handle| self.item::<T>(handle))
            .collect()
    }

    pub fn item<T: ProjectItem>(&self, handle: ItemHandle) -> Option<&T> {
        self.items.get(handle).and_then(T::from_any)
    }

    pub fn item_mut<T: ProjectItem>(&mut self, handle: ItemHandle) -> Option<&mut T> {
        self.items.get_mut(handle).and_then(T::from_any_mut)
    }

    pub fn find_handle<T: ProjectItem>(&mut self, include: &str) -> Option<ItemHandle> {
        self.all_handles::<T>()
            .into_iter()
            .find(|handle| self.items.get(*handle).map(AnyItem::include) == Some(include))
    }

    pub fn find<T: ProjectItem>(&mut self, include: &str) -> Option<&T> {
        let handle = self.find_handle::<T>(include)?;
        self.item(handle)
    }

    pub fn find_mut<T: ProjectItem>(&mut self, include: &str) -> Option<&mut T> {
        let handle = self.find_handle::<T>(include)?;
        self.item_mut(handle)
    }

    /// Delete the element and the cached instance. Returns whether anything
    /// was removed.
    pub fn remove<T: ProjectItem>(&mut self, include: &str) -> bool {
        let removed = self.project.remove_item(T::ITEM_TYPE, include) > 0;
        let cached = self.items.remove(T::ITEM_TYPE, include).is_some();
        removed || cached
    }

    /// Write every cached item back into its element.
    pub fn flush(&mut self) {
        let layout = self.project.item_layout();
        for item in self.items.live() {
            if let Some(element) = self.project.find_item_mut(item.item_type(), item.include()) {
                item.configure(element, layout);
            }
        }
    }

    /// Flush and serialize.
    pub fn render(&mut self) -> String {
        self.flush();
        self.project.render()
    }
}

/// Lazily parsed project-type GUIDs. Cloning restarts the sequence.
#[derive(Debug, Clone)]
pub struct ProjectTypes {
    fallback: Option<Uuid>,
    segments: std::vec::IntoIter<String>,
}

impl Iterator for ProjectTypes {
    type Item = Uuid;

    fn next(&mut self) -> Option<Uuid> {
        if let Some(guid) = self.fallback.take() {
            return Some(guid);
        }
        for segment in self.segments.by_ref() {
            match parse_guid(&segment) {
                Ok(guid) => return Some(guid),
                Err(_) => warn!(value = %segment, "skipping unparsable project type GUID"),
            }
        }
        None
    }
}

/// Turn a `\`- or `/`-separated relative path into a native one.
pub fn native_path(relative: &str) -> PathBuf {
    relative
        .split(['\\', '/'])
        .filter(|segment| !segment.is_empty())
        .collect()
}
