use anyhow::{bail, Result};
use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::ingest::watcher::FileWatcher;

/// MIME types the upload pipeline accepts.
pub const SUPPORTED_MIME_TYPES: [&str; 3] = [
    "application/pdf",
    "text/plain",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const SNIFF_BUFFER_BYTES: usize = 8192;

/// Content-based file type gate for uploaded files.
///
/// This path is intentionally independent from the document loader: it
/// screens uploads by MIME type but performs no extraction itself.
pub struct TypeDetector {
    watcher: FileWatcher,
}

impl TypeDetector {
    pub fn new(watcher: FileWatcher) -> Self {
        Self { watcher }
    }

    /// Detect a MIME type from file content, never from the extension.
    ///
    /// `infer` covers the binary formats from their magic bytes; anything
    /// it cannot classify that still decodes as UTF-8 counts as text/plain.
    pub fn detect(path: &Path) -> Result<String> {
        let mut buffer = fs::read(path)?;
        buffer.truncate(SNIFF_BUFFER_BYTES);

        if let Some(kind) = infer::get(&buffer) {
            return Ok(kind.mime_type().to_string());
        }

        if is_utf8_prefix(&buffer) {
            Ok("text/plain".to_string())
        } else {
            Ok("application/octet-stream".to_string())
        }
    }

    /// Gate one file on its detected MIME type.
    ///
    /// Returns `Ok(false)` for unsupported types so a batch run can keep
    /// going; a missing path is an error. Extraction for supported types is
    /// a deliberate placeholder, the loader pipeline is not invoked here.
    pub fn process_one(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            bail!("File not found: {}", path.display());
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mime = Self::detect(path)?;
        if !SUPPORTED_MIME_TYPES.contains(&mime.as_str()) {
            warn!("Unsupported file type {} for file {}", mime, file_name);
            return Ok(false);
        }

        info!("Processing {} of type {}", file_name, mime);
        Ok(true)
    }

    /// Apply `process_one` to every new upload, reporting each outcome
    /// independently; one failing file never aborts the batch.
    pub fn process_all(&self) -> Result<Vec<(String, bool)>> {
        let new_files = self.watcher.list_new_files()?;

        let mut results = Vec::with_capacity(new_files.len());
        for path in new_files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            let success = match self.process_one(&path) {
                Ok(flag) => flag,
                Err(e) => {
                    warn!("Error processing {}: {}", name, e);
                    false
                }
            };
            results.push((name, success));
        }
        Ok(results)
    }
}

/// UTF-8 validity check tolerant of a codepoint cut off at the end of the
/// sniff buffer.
fn is_utf8_prefix(buffer: &[u8]) -> bool {
    match std::str::from_utf8(buffer) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn detects_pdf_from_magic_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.dat");
        fs::write(&path, b"%PDF-1.7\n%fake body").unwrap();

        assert_eq!(TypeDetector::detect(&path).unwrap(), "application/pdf");
    }

    #[test]
    fn plain_text_falls_through_to_text_plain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.bin");
        fs::write(&path, "just some lecture notes\nwith two lines").unwrap();

        assert_eq!(TypeDetector::detect(&path).unwrap(), "text/plain");
    }

    #[test]
    fn detects_docx_and_accepts_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("essay.dat");
        // Minimal zip container: a local file header whose first entry is
        // word/document.xml, which marks the archive as a Word document.
        let mut bytes = vec![0x50, 0x4B, 0x03, 0x04];
        bytes.resize(0x1E, 0);
        bytes.extend_from_slice(b"word/document.xml");
        fs::write(&path, &bytes).unwrap();

        assert_eq!(
            TypeDetector::detect(&path).unwrap(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );

        let uploads = tempdir().unwrap();
        let processed = tempdir().unwrap();
        let detector = TypeDetector::new(FileWatcher::new(uploads.path(), processed.path()));
        assert!(detector.process_one(&path).unwrap());
    }

    #[test]
    fn rejects_unsupported_type_without_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

        let uploads = tempdir().unwrap();
        let processed = tempdir().unwrap();
        let detector = TypeDetector::new(FileWatcher::new(uploads.path(), processed.path()));

        assert!(!detector.process_one(&path).unwrap());
    }

    #[test]
    fn accepts_supported_type_with_no_extraction() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        fs::write(&path, "a perfectly ordinary essay").unwrap();

        let uploads = tempdir().unwrap();
        let processed = tempdir().unwrap();
        let detector = TypeDetector::new(FileWatcher::new(uploads.path(), processed.path()));

        assert!(detector.process_one(&path).unwrap());
    }

    #[test]
    fn missing_file_is_an_error() {
        let uploads = tempdir().unwrap();
        let processed = tempdir().unwrap();
        let detector = TypeDetector::new(FileWatcher::new(uploads.path(), processed.path()));

        assert!(detector.process_one(Path::new("/no/such/file.pdf")).is_err());
    }

    #[test]
    fn batch_reports_each_file_independently() {
        let uploads = tempdir().unwrap();
        let processed = tempdir().unwrap();
        fs::write(uploads.path().join("ok.txt"), "readable text").unwrap();
        fs::write(
            uploads.path().join("img.png"),
            [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        )
        .unwrap();

        let detector = TypeDetector::new(FileWatcher::new(uploads.path(), processed.path()));
        let mut results = detector.process_all().unwrap();
        results.sort();

        assert_eq!(
            results,
            vec![("img.png".to_string(), false), ("ok.txt".to_string(), true)]
        );
    }
}
