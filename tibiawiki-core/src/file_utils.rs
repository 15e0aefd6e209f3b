//! File utility functions.

use crate::error::{Result, WikiError};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(WikiError::NotFound(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }
    Ok(())
}

/// Recursively find files with given extension in a directory.
pub fn find_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() {
            if let Some(ext) = entry.path().extension() {
                if ext == extension {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }
    Ok(files)
}

/// List regular files directly inside `dir` whose name ends with `suffix`,
/// sorted by file name.
pub fn list_files_with_suffix(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    ensure_dir(dir)?;

    let files = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(suffix))
        .map(|e| e.into_path())
        .collect::<Vec<_>>();
    Ok(files)
}

/// Read a text file as UTF-8, falling back to Windows-1252 for legacy saves.
pub fn read_text_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            tracing::warn!("{:?} is not valid UTF-8, decoding as Windows-1252", path);
            let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            if had_errors {
                return Err(WikiError::Parse(format!(
                    "Failed to decode {}",
                    path.display()
                )));
            }
            Ok(text.into_owned())
        }
    }
}

/// Serialize `value` as indented JSON with `indent` spaces per level.
///
/// Non-ASCII characters are written verbatim.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| WikiError::Parse(e.to_string()))
}

/// Write `value` to `path` as indented JSON.
pub fn write_json_file<T: Serialize + ?Sized>(path: &Path, value: &T, indent: usize) -> Result<()> {
    let json = to_json_string(value, indent)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_with_suffix_sorted_and_flat() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_shields.json"), "[]").unwrap();
        std::fs::write(dir.path().join("a_helmets.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c_legs.json"), "[]").unwrap();

        let files = list_files_with_suffix(dir.path(), ".json").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a_helmets.json", "b_shields.json"]);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            list_files_with_suffix(&missing, ".json"),
            Err(WikiError::NotFound(_))
        ));
    }

    #[test]
    fn test_json_indent_and_unicode() {
        let value = serde_json::json!({"nome": "Escudo Mágico", "ids": [1]});
        let out = to_json_string(&value, 4).unwrap();
        assert_eq!(out, "{\n    \"nome\": \"Escudo Mágico\",\n    \"ids\": [\n        1\n    ]\n}");
    }

    #[test]
    fn test_read_text_file_latin1_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.txt");
        std::fs::write(&path, b"Prote\xe7\xe3o").unwrap();
        assert_eq!(read_text_file(&path).unwrap(), "Proteção");
    }
}
