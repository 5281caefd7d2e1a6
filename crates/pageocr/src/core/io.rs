//! Filesystem helpers: PDF discovery and JSON output.

use crate::error::{PageOcrError, Result};
use crate::types::PageRecord;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn pdfs_in(dir: &Path, files: &mut Vec<PathBuf>, subdirs: Option<&mut Vec<PathBuf>>) -> Result<()> {
    let mut subdirs = subdirs;

    for entry in fs::read_dir(dir).map_err(PageOcrError::Io)? {
        let entry = entry.map_err(PageOcrError::Io)?;
        let path = entry.path();

        if path.is_file() && has_extension(&path, "pdf") {
            files.push(path);
        } else if path.is_dir()
            && let Some(subdirs) = subdirs.as_deref_mut()
        {
            subdirs.push(path);
        }
    }

    Ok(())
}

/// Find the PDFs of an input tree.
///
/// Looks at `*.pdf` files directly inside `input_dir` and inside each of its immediate
/// subdirectories (the document-class folders). Extension matching ignores case. The result
/// is sorted so runs are reproducible.
///
/// # Errors
///
/// Returns `PageOcrError::Validation` if `input_dir` is not a directory and
/// `PageOcrError::Io` if listing fails.
pub fn find_pdfs(input_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();

    if !input_dir.is_dir() {
        return Err(PageOcrError::validation(format!(
            "Path is not a directory: {}",
            input_dir.display()
        )));
    }

    let mut files = Vec::new();
    let mut class_dirs = Vec::new();
    pdfs_in(input_dir, &mut files, Some(&mut class_dirs))?;

    for class_dir in &class_dirs {
        pdfs_in(class_dir, &mut files, None)?;
    }

    files.sort();
    Ok(files)
}

/// Write page records as compact JSON, creating parent directories as needed.
///
/// Non-ASCII text is written as UTF-8, not escaped. The file appears at `path` only once it
/// is complete; a failed write leaves nothing behind.
pub fn write_records(path: impl AsRef<Path>, records: &[PageRecord]) -> Result<()> {
    write_json(path.as_ref(), records)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(PageOcrError::Io)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(PageOcrError::Io)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer(&mut writer, value)?;
        writer.flush().map_err(PageOcrError::Io)?;
    }

    temp.persist(path).map_err(|e| PageOcrError::Io(e.error))?;
    Ok(())
}

/// Read back a records file written by [`write_records`].
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<PageRecord>> {
    let content = fs::read(path.as_ref()).map_err(PageOcrError::Io)?;
    Ok(serde_json::from_slice(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn test_find_pdfs_one_level_of_class_dirs() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("Invoices/b.pdf"));
        touch(&dir.path().join("Invoices/a.PDF"));
        touch(&dir.path().join("Letters/c.pdf"));
        touch(&dir.path().join("Letters/notes.txt"));
        touch(&dir.path().join("top.pdf"));
        touch(&dir.path().join("Letters/deeper/d.pdf"));

        let found = find_pdfs(dir.path()).unwrap();
        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("Invoices/a.PDF"),
                PathBuf::from("Invoices/b.pdf"),
                PathBuf::from("Letters/c.pdf"),
                PathBuf::from("top.pdf"),
            ]
        );
    }

    #[test]
    fn test_find_pdfs_empty_dir() {
        let dir = tempdir().unwrap();
        assert!(find_pdfs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_find_pdfs_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.pdf");
        touch(&file);
        let err = find_pdfs(&file).unwrap_err();
        assert!(matches!(err, PageOcrError::Validation { .. }));
    }

    #[test]
    fn test_write_records_creates_parent_and_keeps_unicode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/Class/doc.json");

        let mut ocr = Map::new();
        ocr.insert("text".to_string(), Value::from("Straße №5"));
        let records = vec![PageRecord { ocr, page: 1 }];

        write_records(&path, &records).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"[{"ocr":{"text":"Straße №5"},"page":1}]"#);
        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn test_write_empty_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        write_records(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("page payload cannot be written"))
        }
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Class/doc.json");

        let err = write_json(&path, &[Unserializable]).unwrap_err();

        assert!(matches!(err, PageOcrError::Serialization { .. }));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path().join("Class")).unwrap().count(), 0);
    }

    #[test]
    fn test_write_records_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, "stale").unwrap();

        write_records(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
