//! File system storage operations
//!
//! This module handles all file I/O operations including:
//! - Reading workflow documents from a directory or a single file
//! - Writing one pretty-printed document per workflow
//! - The YAML index written next to an export

mod directory;
mod manifest;

pub use directory::{DirectoryReader, DirectoryWriter, sanitize_file_stem};
pub use manifest::{ExportManifest, MANIFEST_FILE, ManifestEntry};
