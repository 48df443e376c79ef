//! Load-once mapping from catalog position to item id and display name.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{Error, Result};
use crate::types::CatalogEntry;

#[derive(Serialize, Deserialize)]
struct MappingFile {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
pub struct CatalogMapping {
    entries: Vec<CatalogEntry>,
}

impl CatalogMapping {
    /// Read and validate a mapping artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::load(path.display(), e))?;
        let file: MappingFile = serde_json::from_str(&raw).map_err(|e| Error::load(path.display(), e))?;
        let mapping = Self::from_entries(file.entries)?;
        info!(path = %path.display(), entries = mapping.len(), "catalog mapping loaded");
        Ok(mapping)
    }

    /// Validate that positions are unique and dense from 0, then order by position.
    pub fn from_entries(mut entries: Vec<CatalogEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Load("catalog is empty".to_string()));
        }
        entries.sort_by_key(|e| e.position);
        for (expected, entry) in entries.iter().enumerate() {
            if entry.position != expected {
                let reason = if entry.position < expected { "duplicate" } else { "missing" };
                return Err(Error::Load(format!(
                    "catalog positions must be dense from 0: {reason} position near {expected} (found {})",
                    entry.position
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::load(parent.display(), e))?;
        }
        let file = MappingFile { entries: self.entries.clone() };
        let json = serde_json::to_string_pretty(&file).map_err(|e| Error::load(path.display(), e))?;
        fs::write(path, json).map_err(|e| Error::load(path.display(), e))
    }

    pub fn entry_at(&self, position: usize) -> Result<&CatalogEntry> {
        self.entries
            .get(position)
            .ok_or(Error::OutOfRange { position, len: self.entries.len() })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Display names in position order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}
