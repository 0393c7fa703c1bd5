//! Font family to font asset mapping.

use graft_core::Document;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A font file the output can reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontAsset {
    pub name: String,
    pub path: String,
}

impl FontAsset {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Outcome of looking up a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontResolution<'a> {
    /// The table maps the family to an asset.
    Mapped(&'a FontAsset),
    /// The family is unmapped; the fallback font stands in.
    Fallback(&'a FontAsset),
    /// Unmapped and no fallback configured.
    Missing,
}

impl<'a> FontResolution<'a> {
    pub fn asset(&self) -> Option<&'a FontAsset> {
        match *self {
            FontResolution::Mapped(asset) | FontResolution::Fallback(asset) => Some(asset),
            FontResolution::Missing => None,
        }
    }
}

/// Families in document order, each mapped to an asset or left unassigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontTable {
    entries: IndexMap<String, Option<FontAsset>>,
}

impl FontTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table for every family the document uses, carrying over
    /// assignments from `previous` where the family is still in use.
    pub fn from_document(document: &Document, previous: Option<&FontTable>) -> Self {
        let entries = document
            .used_fonts()
            .into_iter()
            .map(|family| {
                let asset = previous.and_then(|p| p.get(&family)).cloned();
                (family, asset)
            })
            .collect();
        Self { entries }
    }

    pub fn insert(&mut self, family: impl Into<String>, asset: Option<FontAsset>) {
        self.entries.insert(family.into(), asset);
    }

    pub fn with_font(mut self, family: impl Into<String>, asset: FontAsset) -> Self {
        self.insert(family, Some(asset));
        self
    }

    /// Case-insensitive lookup of an assigned asset.
    pub fn get(&self, family: &str) -> Option<&FontAsset> {
        if let Some(Some(asset)) = self.entries.get(family) {
            return Some(asset);
        }
        self.entries
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(family))
            .find_map(|(_, asset)| asset.as_ref())
    }

    pub fn resolve<'a>(
        &'a self,
        family: &str,
        fallback: Option<&'a FontAsset>,
    ) -> FontResolution<'a> {
        match (self.get(family), fallback) {
            (Some(asset), _) => FontResolution::Mapped(asset),
            (None, Some(fallback)) => FontResolution::Fallback(fallback),
            (None, None) => FontResolution::Missing,
        }
    }

    /// Families present in the table without an asset.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, asset)| asset.is_none())
            .map(|(name, _)| name.as_str())
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
