//! Filesystem utilities.
//!
//! Helpers for reading the structured documents (rubric, guidance, answer
//! sheets) and for writing files atomically.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AssessError, Result};

/// Structured document formats accepted for input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension. `None` when the extension is
    /// missing or unrecognized.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse a document in the given format; with no format, JSON is tried first
/// and YAML second.
pub fn parse_document<T: DeserializeOwned>(raw: &str, format: Option<DocumentFormat>) -> Result<T> {
    match format {
        Some(DocumentFormat::Json) => Ok(serde_json::from_str(raw)?),
        Some(DocumentFormat::Yaml) => Ok(serde_yaml::from_str(raw)?),
        None => match serde_json::from_str(raw) {
            Ok(value) => Ok(value),
            Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
                tracing::debug!(%json_err, %yaml_err, "document is neither JSON nor YAML");
                AssessError::Json(json_err)
            }),
        },
    }
}

/// Read and parse a structured document from disk.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)?;
    parse_document(&raw, DocumentFormat::from_path(path))
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write `value` as pretty JSON to `path`. The data lands in a temp file in
/// the same directory first and is renamed into place.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".assessor-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    serde_json::to_writer_pretty(&mut temp, value)?;
    temp.write_all(b"\n")?;
    temp.flush()?;
    temp.persist(path).map_err(|err| AssessError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Doc {
        name: String,
        count: u32,
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/rubric.JSON")),
            Some(DocumentFormat::Json)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("guidance.yml")),
            Some(DocumentFormat::Yaml)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("answers.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("answers")), None);
    }

    #[test]
    fn parse_without_format_accepts_yaml() {
        let doc: Doc = parse_document("name: quiz\ncount: 4\n", None).unwrap();
        assert_eq!(doc.name, "quiz");
        assert_eq!(doc.count, 4);
    }

    #[test]
    fn parse_without_format_reports_garbage() {
        let err = parse_document::<Doc>("{ not: [valid", None).unwrap_err();
        assert!(matches!(err, AssessError::Json(_)));
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn write_json_atomic_replaces_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("record.json");

        write_json_atomic(&path, &Doc { name: "first".into(), count: 1 }).unwrap();
        write_json_atomic(&path, &Doc { name: "second".into(), count: 2 }).unwrap();

        let doc: Doc = read_document(&path).unwrap();
        assert_eq!(doc, Doc { name: "second".into(), count: 2 });

        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
