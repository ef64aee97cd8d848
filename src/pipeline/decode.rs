//! PDF decoding: pull positioned text segments out of pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and blocks while it parses. `tokio::task::spawn_blocking` moves the
//! work onto the blocking pool so runtime worker threads never stall.
//!
//! ## Coordinates
//!
//! Segment bounds are reported in PDF user space with the origin at the
//! bottom-left. They are passed through unchanged: `x` is the left edge and
//! `y` the bottom edge (close to the baseline), which is what line
//! clustering expects.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::output::PdfInfo;
use crate::pipeline::normalize::{RawPage, RawTextItem};
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Text items of the selected pages, in page order.
#[derive(Debug, Clone, Default)]
pub struct DecodedPages {
    /// Pages in the whole document, selected or not.
    pub total_pages: usize,
    /// `(page_num, page)` with 1-indexed page numbers.
    pub pages: Vec<(usize, RawPage)>,
}

/// Decode the pages selected by `config.pages`.
pub async fn decode_pages(
    pdf_path: &Path,
    config: &ExtractionConfig,
) -> Result<DecodedPages, ExtractError> {
    let path = pdf_path.to_path_buf();
    let password = config.password.clone();
    let library = config.pdfium_library_path.clone();
    let selection = config.pages.clone();

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium(library.as_deref())?;
        let document = open_document(&pdfium, &path, password.as_deref())?;
        let pages = document.pages();
        let total_pages = pages.len() as usize;
        info!("PDF loaded: {} pages", total_pages);

        if let Some(page) = selection.first_out_of_range(total_pages) {
            return Err(ExtractError::PageOutOfRange {
                page,
                total: total_pages,
            });
        }

        let indices = selection.to_indices(total_pages);
        let mut decoded = Vec::with_capacity(indices.len());
        for idx in indices {
            let page = pages
                .get(idx as u16)
                .map_err(|e| ExtractError::PageDecodeFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;
            let raw = page_text_items(&page, idx + 1)?;
            debug!("Decoded page {} → {} text segments", idx + 1, raw.items.len());
            decoded.push((idx + 1, raw));
        }

        Ok(DecodedPages {
            total_pages,
            pages: decoded,
        })
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Decode task panicked: {}", e)))?
}

/// Read document-level facts without decoding any page text.
pub async fn read_info(
    pdf_path: &Path,
    password: Option<&str>,
    library: Option<&Path>,
) -> Result<PdfInfo, ExtractError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);
    let library = library.map(Path::to_path_buf);

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium(library.as_deref())?;
        let document = open_document(&pdfium, &path, pwd.as_deref())?;
        Ok(document_info(&document))
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Bind pdfium: the explicit library if given, else `./`, else the system one.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, ExtractError> {
    let bindings = match library {
        Some(path) => {
            let path: PathBuf = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(path)
            } else {
                path.to_path_buf()
            };
            Pdfium::bind_to_library(&path).map_err(|e| {
                ExtractError::PdfiumBindingFailed(format!("{}: {:?}", path.display(), e))
            })?
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{:?}", e)))?,
    };
    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                ExtractError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                ExtractError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

fn page_text_items(page: &PdfPage, page_num: usize) -> Result<RawPage, ExtractError> {
    let text = page.text().map_err(|e| ExtractError::PageDecodeFailed {
        page: page_num,
        detail: format!("text layer unavailable: {:?}", e),
    })?;

    let items = text
        .segments()
        .iter()
        .map(|segment| {
            let bounds = segment.bounds();
            let left = f64::from(bounds.left().value);
            let bottom = f64::from(bounds.bottom().value);
            RawTextItem::new(segment.text(), left, bottom).with_size(
                f64::from(bounds.right().value) - left,
                f64::from(bounds.top().value) - bottom,
            )
        })
        .collect();

    Ok(RawPage::new(items))
}

fn document_info(document: &PdfDocument) -> PdfInfo {
    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    PdfInfo {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}
