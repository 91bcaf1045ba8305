//! Lossless XML model for MSBuild project documents.

pub mod element;
pub mod project;

pub use element::{Element, Layout, XmlDocument, XmlNode};
pub use project::{ITEM_GROUP, MsBuildProject, PROPERTY_GROUP};
