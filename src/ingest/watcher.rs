use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read-only scan of the uploads directory against the processed directory.
///
/// A file counts as processed when a file with the same stem exists in the
/// processed directory. No timestamps or checksums are kept, so a partial
/// earlier run is indistinguishable from a complete one.
pub struct FileWatcher {
    uploads_dir: PathBuf,
    processed_dir: PathBuf,
}

impl FileWatcher {
    pub fn new(uploads_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    /// Every uploads-directory file whose stem is not yet in the processed
    /// set, in filesystem enumeration order.
    ///
    /// A missing directory propagates the underlying not-found error.
    pub fn list_new_files(&self) -> io::Result<Vec<PathBuf>> {
        let processed = Self::stems_of(&self.processed_dir)?;

        let mut new_files = Vec::new();
        for entry in fs::read_dir(&self.uploads_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            match path.file_stem() {
                Some(stem) if !processed.contains(stem) => new_files.push(path),
                _ => {}
            }
        }
        Ok(new_files)
    }

    fn stems_of(dir: &Path) -> io::Result<HashSet<OsString>> {
        let mut stems = HashSet::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(stem) = path.file_stem() {
                stems.insert(stem.to_os_string());
            }
        }
        Ok(stems)
    }
}
