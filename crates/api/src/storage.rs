//! Filesystem-backed storage for uploaded documents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use agrisensa_core::error::CoreError;
use agrisensa_core::uploads::{extension, is_stored_name, validate_upload_name};

/// Flat directory of uploaded files addressed by sanitized name.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `bytes` under the sanitized form of `raw_name`, replacing any
    /// file of the same name. Returns the stored name.
    pub async fn save(&self, raw_name: &str, bytes: &[u8]) -> Result<String, CoreError> {
        let name = validate_upload_name(raw_name)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error("create upload directory", e))?;
        tokio::fs::write(self.root.join(&name), bytes)
            .await
            .map_err(|e| io_error("write upload", e))?;
        Ok(name)
    }

    /// Names of all stored files, sorted. A missing directory is empty.
    pub async fn list(&self) -> Result<Vec<String>, CoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("list uploads", e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| io_error("list uploads", e))?
        {
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| io_error("list uploads", e))?
                .is_file();
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Contents of a stored file. Names that are not already sanitized are
    /// treated as missing.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, CoreError> {
        if !is_stored_name(name) {
            return Err(CoreError::not_found("Document", name));
        }
        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CoreError::not_found("Document", name))
            }
            Err(e) => Err(io_error("read upload", e)),
        }
    }
}

/// MIME type served for a stored file.
pub fn content_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn io_error(action: &str, e: std::io::Error) -> CoreError {
    CoreError::Internal(format!("failed to {action}: {e}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn save_list_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("pdfs"));

        assert!(store.list().await.unwrap().is_empty());

        let name = store.save("../Panduan Padi.pdf", b"%PDF-1.4").await.unwrap();
        assert_eq!(name, "Panduan_Padi.pdf");
        store.save("a.png", b"png").await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["Panduan_Padi.pdf", "a.png"]);
        assert_eq!(store.read("Panduan_Padi.pdf").await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn rejects_disallowed_and_unsanitized_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        assert_matches!(
            store.save("run.sh", b"#!/bin/sh").await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            store.read("../secret.pdf").await,
            Err(CoreError::NotFound { .. })
        );
        assert_matches!(
            store.read("missing.pdf").await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type("a.PDF"), "application/pdf");
        assert_eq!(content_type("a.jpeg"), "image/jpeg");
        assert_eq!(content_type("a.bin"), "application/octet-stream");
    }
}
