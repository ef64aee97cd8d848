//! Error types for the pdf2table library.
//!
//! Extraction is all-or-nothing: a document either yields a complete
//! [`crate::output::ExtractedDocument`] or a single [`ExtractError`]
//! describing why it could not. A failing page fails the document; there
//! is no page-level error type.
//!
//! Only decoding problems (and invalid caller input) are errors. Irregular
//! layouts never are: an empty page yields no table, an empty document
//! yields empty tables with default metadata, and a fragment that fits no
//! column lands in the last one.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2table library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A pre-decoded text item dump could not be read or parsed.
    #[error("Failed to read text items from '{path}': {detail}")]
    InputReadFailed { path: PathBuf, detail: String },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not load a page or its text layer.
    #[error("Failed to decode text on page {page}: {detail}")]
    PageDecodeFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
pdf2table needs a pdfium shared library to read PDFs. You can:\n\
  • Place libpdfium next to the working directory.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Page content errors ───────────────────────────────────────────────
    /// A page delivered text items that cannot be placed on the page.
    #[error("Page {page} is malformed: {detail}")]
    MalformedPage { page: usize, detail: String },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Whether the input PDF could not be opened or decoded.
    ///
    /// Covers a missing or unreadable file as well as a broken, encrypted or
    /// unbindable PDF. Everything else is a caller or layout problem.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            ExtractError::FileNotFound { .. }
                | ExtractError::PermissionDenied { .. }
                | ExtractError::NotAPdf { .. }
                | ExtractError::CorruptPdf { .. }
                | ExtractError::PasswordRequired { .. }
                | ExtractError::WrongPassword { .. }
                | ExtractError::PageDecodeFailed { .. }
                | ExtractError::PdfiumBindingFailed(_)
        )
    }
}
