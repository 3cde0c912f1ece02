//! Export index management
//!
//! Every export writes `workflows.yml` next to the documents, listing what
//! was written.
//!
//! Example format:
//! ```yaml
//! workflows:
//!   - id: 8xKq2mPz
//!     name: Email Digest
//!     file: 8xKq2mPz_Email_Digest.json
//!     active: true
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the index inside an export directory
pub const MANIFEST_FILE: &str = "workflows.yml";

/// One exported workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub id: String,
    pub name: String,
    /// File name relative to the export directory
    pub file: String,
    #[serde(default)]
    pub active: bool,
}

/// Index of an export directory
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExportManifest {
    pub workflows: Vec<ManifestEntry>,
}

impl ExportManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any previous entry with the same id
    pub fn add(&mut self, entry: ManifestEntry) {
        match self.workflows.iter_mut().find(|w| w.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.workflows.push(entry),
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ManifestEntry> {
        self.workflows.iter().find(|w| w.id == id)
    }

    pub fn count(&self) -> usize {
        self.workflows.len()
    }

    /// Read the index from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        serde_yaml::from_str(&content).map_err(|e| {
            Error::MalformedDocument(format!(
                "Failed to parse export index {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Write the index to a YAML file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let yaml = serde_yaml::to_string(self).map_err(|e| {
            Error::MalformedDocument(format!("Failed to serialize export index: {}", e))
        })?;

        std::fs::write(path, yaml).map_err(|e| Error::io(path, e))
    }
}
