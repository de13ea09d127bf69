//! The file system as a lazily enumerated hierarchy.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use horizon_treelist::{CellValue, HierarchySource};

use crate::error::{ExplorerError, Result};

/// One directory entry, as stored in the tag of its row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub modified: Option<DateTime<Local>>,
    /// Length in bytes; zero for directories.
    pub size: u64,
}

impl FsEntry {
    /// Reads the metadata of `path`, following symbolic links.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| ExplorerError::io(path, e))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            path: path.to_path_buf(),
            name,
            is_dir: metadata.is_dir(),
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
        })
    }

    /// Whether the entry is hidden by the `.` naming convention.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// The "Type" column text.
    pub fn type_name(&self) -> String {
        if self.is_dir {
            return "File folder".to_string();
        }
        match self.path.extension() {
            Some(extension) => format!("{} File", extension.to_string_lossy().to_uppercase()),
            None => "File".to_string(),
        }
    }

    /// Folders first, then by name ignoring case.
    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .is_dir
            .cmp(&self.is_dir)
            .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Sizes as shown by the "Size" column: whole kilobytes, rounded up.
pub fn format_size(bytes: u64) -> String {
    format!("{} KB", bytes.div_ceil(1024))
}

/// Directory listings below a fixed root.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    show_hidden: bool,
    date_format: String,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>, show_hidden: bool, date_format: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            show_hidden,
            date_format: date_format.into(),
        }
    }

    /// The sorted, filtered entries of `directory`.
    ///
    /// Entries whose metadata cannot be read are skipped.
    pub fn list(&self, directory: &Path) -> Result<Vec<FsEntry>> {
        let reader = fs::read_dir(directory).map_err(|e| ExplorerError::io(directory, e))?;
        let mut entries = Vec::new();
        for dir_entry in reader {
            let dir_entry = dir_entry.map_err(|e| ExplorerError::io(directory, e))?;
            match FsEntry::from_path(&dir_entry.path()) {
                Ok(entry) if self.show_hidden || !entry.is_hidden() => entries.push(entry),
                Ok(_) => {}
                Err(error) => tracing::debug!(%error, "skipping unreadable entry"),
            }
        }
        entries.sort_by(FsEntry::listing_order);
        Ok(entries)
    }

    fn format_modified(&self, entry: &FsEntry) -> String {
        entry
            .modified
            .map(|time| time.format(&self.date_format).to_string())
            .unwrap_or_default()
    }
}

impl HierarchySource for FsSource {
    type Item = FsEntry;
    type Error = ExplorerError;

    fn roots(&self) -> Result<Vec<FsEntry>> {
        self.list(&self.root)
    }

    fn is_container(&self, item: &FsEntry) -> bool {
        if !item.is_dir {
            return false;
        }
        fs::read_dir(&item.path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false)
    }

    fn children(&self, item: &FsEntry) -> Result<Vec<FsEntry>> {
        self.list(&item.path)
    }

    fn cells(&self, item: &FsEntry) -> Vec<CellValue> {
        let size = if item.is_dir {
            CellValue::Empty
        } else {
            CellValue::from(format_size(item.size))
        };
        vec![
            CellValue::from(item.name.clone()),
            CellValue::from(self.format_modified(item)),
            CellValue::from(item.type_name()),
            size,
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write;

    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("beta")).unwrap();
        fs::create_dir(root.join("Alpha")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        File::create(root.join("beta").join("inner.txt")).unwrap();
        let mut notes = File::create(root.join("notes.md")).unwrap();
        notes.write_all(&[b'x'; 1500]).unwrap();
        File::create(root.join("Makefile")).unwrap();
        File::create(root.join(".hidden")).unwrap();
        dir
    }

    fn names(entries: &[FsEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[test]
    fn test_folders_first_then_name() {
        let dir = fixture();
        let source = FsSource::new(dir.path(), false, "%Y");
        let roots = source.roots().unwrap();
        assert_eq!(names(&roots), vec!["Alpha", "beta", "empty", "Makefile", "notes.md"]);
    }

    #[test]
    fn test_hidden_entries_on_request() {
        let dir = fixture();
        let source = FsSource::new(dir.path(), true, "%Y");
        assert!(names(&source.roots().unwrap()).contains(&".hidden"));
    }

    #[test]
    fn test_only_non_empty_folders_are_containers() {
        let dir = fixture();
        let source = FsSource::new(dir.path(), false, "%Y");
        let roots = source.roots().unwrap();
        let container: Vec<bool> = roots.iter().map(|entry| source.is_container(entry)).collect();
        assert_eq!(container, vec![false, true, false, false, false]);
    }

    #[test]
    fn test_cells() {
        let dir = fixture();
        let source = FsSource::new(dir.path(), false, "%Y-%m-%d %H:%M");
        let notes = FsEntry::from_path(&dir.path().join("notes.md")).unwrap();
        let cells = source.cells(&notes);
        assert_eq!(cells[0], CellValue::from("notes.md"));
        assert_eq!(cells[1].to_string().len(), "2026-01-01 00:00".len());
        assert_eq!(cells[2], CellValue::from("MD File"));
        assert_eq!(cells[3], CellValue::from("2 KB"));

        let beta = FsEntry::from_path(&dir.path().join("beta")).unwrap();
        let cells = source.cells(&beta);
        assert_eq!(cells[2], CellValue::from("File folder"));
        assert!(cells[3].is_empty());

        let makefile = FsEntry::from_path(&dir.path().join("Makefile")).unwrap();
        assert_eq!(makefile.type_name(), "File");
    }

    #[test]
    fn test_format_size_rounds_up() {
        assert_eq!(format_size(0), "0 KB");
        assert_eq!(format_size(1), "1 KB");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1025), "2 KB");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(dir.path().join("gone"), false, "%Y");
        assert!(matches!(source.roots(), Err(ExplorerError::Io { .. })));
    }
}
