//! Input resolution: validate a user-supplied path before pdfium sees it.
//!
//! pdfium reports a missing file or a non-PDF as a generic load failure.
//! Checking existence, read permission and the `%PDF` magic bytes up front
//! turns those into specific, actionable errors.

use crate::error::ExtractError;
use crate::pipeline::normalize::RawPage;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve a local path, validating existence and PDF magic bytes.
pub fn resolve_pdf(path: impl AsRef<Path>) -> Result<PathBuf, ExtractError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(ExtractError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ExtractError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExtractError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ExtractError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Load pre-decoded pages: a JSON array of `{ "items": [...] }` objects.
///
/// Lets text dumps from another decoder go through the same pipeline.
pub async fn load_raw_pages(path: impl AsRef<Path>) -> Result<Vec<RawPage>, ExtractError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::InputReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    })?;

    serde_json::from_slice(&bytes).map_err(|e| ExtractError::InputReadFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_pdf("/definitely/not/here.pdf").unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_not_a_pdf() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"PK\x03\x04 zip archive").unwrap();
        let err = resolve_pdf(tmp.path()).unwrap_err();
        assert!(matches!(err, ExtractError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_pdf(tmp.path()).unwrap(), tmp.path());
    }

    #[tokio::test]
    async fn raw_pages_load_from_json() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(br#"[{"items":[{"str":"Cash","transformX":10,"transformY":700}]},{"items":[]}]"#)
            .unwrap();
        let pages = load_raw_pages(tmp.path()).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].items[0].text.as_deref(), Some("Cash"));
    }

    #[tokio::test]
    async fn malformed_json_is_an_input_error() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"{not json").unwrap();
        let err = load_raw_pages(tmp.path()).await.unwrap_err();
        assert!(matches!(err, ExtractError::InputReadFailed { .. }));
    }
}
