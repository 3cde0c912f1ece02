//! Directory-based workflow storage

use crate::error::{Error, Result};
use crate::etl::Extractor;
use crate::workflow::{WorkflowDefinition, document};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9 _-]").expect("Invalid regex"));

/// Read JSON workflow documents from a directory, or from a single file
pub struct DirectoryReader {
    path: PathBuf,
}

impl DirectoryReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read every `*.json` file, in file name order
    ///
    /// A path pointing at a file reads just that file. A missing path yields nothing.
    pub fn read_all(&self) -> Result<Vec<Value>> {
        if !self.path.exists() {
            log::warn!("{} does not exist, nothing to read", self.path.display());
            return Ok(Vec::new());
        }

        if self.path.is_file() {
            return Ok(vec![read_json_file(&self.path)?]);
        }

        self.json_files()?
            .iter()
            .map(|path| read_json_file(path))
            .collect()
    }

    /// Number of documents [`DirectoryReader::read_all`] would return
    pub fn count(&self) -> Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        if self.path.is_file() {
            return Ok(1);
        }
        Ok(self.json_files()?.len())
    }

    fn json_files(&self) -> Result<Vec<PathBuf>> {
        let entries =
            std::fs::read_dir(&self.path).map_err(|e| Error::io(&self.path, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.path, e))?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn read_json_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        Error::MalformedDocument(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

// Implement Extractor trait for reading from directories
impl Extractor for DirectoryReader {
    type Item = Value;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let documents = self.read_all()?;
        log::info!(
            "Read {} document(s) from {}",
            documents.len(),
            self.path.display()
        );
        Ok(documents)
    }
}

/// Write workflow documents to a directory, one pretty-printed file each
pub struct DirectoryWriter {
    path: PathBuf,
}

impl DirectoryWriter {
    /// Open the output directory, creating it if needed
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name for a workflow: `{id}_{name}.json`, both sanitized
    ///
    /// Unsaved workflows use `new` for the id; an empty name becomes `unnamed_workflow`.
    pub fn file_name(workflow: &WorkflowDefinition) -> String {
        let id = workflow
            .id
            .as_deref()
            .map(sanitize_file_stem)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| "new".to_string());

        let name = Some(sanitize_file_stem(&workflow.name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "unnamed_workflow".to_string());

        format!("{}_{}.json", id, name)
    }

    /// Write one workflow, returning the path written
    pub fn write_workflow(&self, workflow: &WorkflowDefinition) -> Result<PathBuf> {
        let path = self.path.join(Self::file_name(workflow));
        let json = document::to_string_pretty(workflow)?;
        std::fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Reduce a string to characters safe in a file name
///
/// Keeps ASCII letters, digits, `-`, `_` and spaces, trims trailing spaces,
/// then turns the remaining spaces into underscores.
pub fn sanitize_file_stem(raw: &str) -> String {
    UNSAFE_CHARS
        .replace_all(raw, "")
        .trim_end()
        .replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::Node;
    use serde_json::json;
    use tempfile::TempDir;

    fn workflow(id: Option<&str>, name: &str) -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new(name);
        workflow.id = id.map(str::to_string);
        workflow.nodes.push(Node::new("Start", "n8n-nodes-base.manualTrigger"));
        workflow
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Daily Report: v2!"), "Daily_Report_v2");
        assert_eq!(sanitize_file_stem("keep-this_one"), "keep-this_one");
        assert_eq!(sanitize_file_stem("trailing   "), "trailing");
        assert_eq!(sanitize_file_stem("日本"), "");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            DirectoryWriter::file_name(&workflow(Some("abc123"), "Email Digest")),
            "abc123_Email_Digest.json"
        );
        assert_eq!(
            DirectoryWriter::file_name(&workflow(None, "Draft")),
            "new_Draft.json"
        );
        assert_eq!(
            DirectoryWriter::file_name(&workflow(Some("x1"), "???")),
            "x1_unnamed_workflow.json"
        );
    }

    #[test]
    fn test_write_read() {
        let temp = TempDir::new().unwrap();
        let writer = DirectoryWriter::new(temp.path().join("out")).unwrap();

        let data = vec![workflow(Some("1"), "First"), workflow(Some("2"), "Second")];
        for item in &data {
            writer.write_workflow(item).unwrap();
        }

        let reader = DirectoryReader::new(writer.path());
        let read_data = reader.read_all().unwrap();

        assert_eq!(read_data.len(), 2);
        assert_eq!(reader.count().unwrap(), 2);
        assert_eq!(read_data[0]["name"], json!("First"));
        assert_eq!(document::parse(&read_data[1]).unwrap(), data[1]);
    }

    #[test]
    fn test_read_single_file_and_skip_other_extensions() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("one.json");
        std::fs::write(&file, r#"{"name": "One", "nodes": []}"#).unwrap();
        std::fs::write(temp.path().join("workflows.yml"), "workflows: []").unwrap();

        assert_eq!(DirectoryReader::new(&file).read_all().unwrap().len(), 1);
        assert_eq!(DirectoryReader::new(temp.path()).count().unwrap(), 1);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad.json"), "{ nope").unwrap();

        let result = DirectoryReader::new(temp.path()).read_all();
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_missing_directory_reads_nothing() {
        let temp = TempDir::new().unwrap();
        let reader = DirectoryReader::new(temp.path().join("absent"));
        assert!(reader.read_all().unwrap().is_empty());
        assert_eq!(reader.count().unwrap(), 0);
    }

    #[test]
    fn test_write_workflow_returns_path() {
        let temp = TempDir::new().unwrap();
        let writer = DirectoryWriter::new(temp.path()).unwrap();

        let path = writer.write_workflow(&workflow(Some("7"), "Loaded")).unwrap();
        assert_eq!(path, temp.path().join("7_Loaded.json"));
        assert!(path.is_file());
    }
}
