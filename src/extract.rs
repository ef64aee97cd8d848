//! Eager (full-document) extraction entry points.
//!
//! Every entry point funnels into the same assembler: normalise and cluster
//! each selected page, resolve column boundaries once for the whole
//! document, build tables, then run the field extractors over the
//! document text. Use [`crate::stream::extract_stream`] instead to receive
//! tables page by page.

use crate::config::{ExtractionConfig, TableLayout};
use crate::error::ExtractError;
use crate::output::{
    ExtractedDocument, ExtractionStats, PdfInfo, PositionedFragment, TableData,
};
use crate::pipeline::columns::{ColumnAssigner, ColumnBoundaries};
use crate::pipeline::lines::{cluster_lines, LineCluster};
use crate::pipeline::normalize::{normalize_page, RawPage};
use crate::pipeline::table::{detect_merged_table_with, detect_table};
use crate::pipeline::{decode, fields, input};
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Extract tables and fields from a PDF file.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Any failure aborts the whole document: missing or unreadable file, not a
/// PDF, wrong or missing password, a page pdfium cannot decode, or a page
/// whose text items carry non-finite coordinates.
pub async fn extract(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractedDocument, ExtractError> {
    let started = Instant::now();
    let pdf_path = input::resolve_pdf(path)?;
    info!("Starting extraction: {}", pdf_path.display());

    let decode_start = Instant::now();
    let decoded = decode::decode_pages(&pdf_path, config).await?;
    let decode_duration_ms = decode_start.elapsed().as_millis() as u64;
    info!(
        "Decoded {} of {} pages in {}ms",
        decoded.pages.len(),
        decoded.total_pages,
        decode_duration_ms
    );

    let mut doc = assemble(
        decoded.pages.iter().map(|(n, page)| (*n, page)),
        decoded.total_pages,
        config,
    )?;
    doc.stats.decode_duration_ms = decode_duration_ms;
    doc.stats.total_duration_ms = started.elapsed().as_millis() as u64;

    info!(
        "Extraction complete: {} tables, {} rows, {}ms total",
        doc.stats.table_count, doc.stats.row_count, doc.stats.total_duration_ms
    );
    Ok(doc)
}

/// Run the pipeline over pre-decoded pages. Pure and synchronous.
///
/// `pages[0]` is page 1. `config.pages` selects among them exactly as it
/// would for a PDF.
pub fn extract_pages(
    pages: &[RawPage],
    config: &ExtractionConfig,
) -> Result<ExtractedDocument, ExtractError> {
    let started = Instant::now();
    let total_pages = pages.len();
    if let Some(page) = config.pages.first_out_of_range(total_pages) {
        return Err(ExtractError::PageOutOfRange {
            page,
            total: total_pages,
        });
    }

    let selected = config
        .pages
        .to_indices(total_pages)
        .into_iter()
        .map(|idx| (idx + 1, &pages[idx]));
    let mut doc = assemble(selected, total_pages, config)?;
    doc.stats.total_duration_ms = started.elapsed().as_millis() as u64;
    Ok(doc)
}

/// Extract and write the document as pretty JSON.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionStats, ExtractError> {
    let doc = extract(path, config).await?;
    write_json_atomic(output_path.as_ref(), &doc).await?;
    Ok(doc.stats)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractedDocument, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(path, config))
}

/// Extract from PDF bytes in memory.
///
/// pdfium wants a path, so the bytes go to a managed [`tempfile`] that is
/// removed on return.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractedDocument, ExtractError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ExtractError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ExtractError::Internal(format!("tempfile write: {e}")))?;
    extract(tmp.path(), config).await
}

/// Read PDF-level facts (title, producer, page count) without extracting.
pub async fn inspect(path: impl AsRef<Path>) -> Result<PdfInfo, ExtractError> {
    inspect_with(path, &ExtractionConfig::default()).await
}

/// [`inspect`] honouring the config's password and pdfium library.
pub async fn inspect_with(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<PdfInfo, ExtractError> {
    let pdf_path = input::resolve_pdf(path)?;
    decode::read_info(
        &pdf_path,
        config.password.as_deref(),
        config.pdfium_library_path.as_deref(),
    )
    .await
}

// ── Assembly ─────────────────────────────────────────────────────────────

/// One selected page after normalisation and clustering.
pub(crate) struct PageLayout {
    pub page_num: usize,
    pub fragments: Vec<PositionedFragment>,
    /// This page's slice of [`DocumentLayout::lines`].
    pub lines: Range<usize>,
}

/// Every selected page's lines, plus the column boundaries resolved over
/// all of them.
pub(crate) struct DocumentLayout {
    pub pages: Vec<PageLayout>,
    pub lines: Vec<LineCluster>,
    pub boundaries: ColumnBoundaries,
}

impl DocumentLayout {
    pub fn page_lines(&self, page: &PageLayout) -> &[LineCluster] {
        &self.lines[page.lines.clone()]
    }
}

/// Normalise and cluster pages in order, then resolve column boundaries.
///
/// Fires the start and per-page start/error progress events.
pub(crate) fn lay_out<'a>(
    pages: impl IntoIterator<Item = (usize, &'a RawPage)>,
    config: &ExtractionConfig,
) -> Result<DocumentLayout, ExtractError> {
    let pages: Vec<(usize, &RawPage)> = pages.into_iter().collect();
    let selected = pages.len();
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_extraction_start(selected);
    }

    let mut lines = Vec::new();
    let mut laid_out = Vec::with_capacity(selected);
    for (page_num, raw) in pages {
        if let Some(cb) = cb {
            cb.on_page_start(page_num, selected);
        }
        let fragments = normalize_page(page_num, raw).inspect_err(|e| {
            if let Some(cb) = cb {
                cb.on_page_error(page_num, selected, &e.to_string());
            }
        })?;

        let first = lines.len();
        lines.extend(cluster_lines(&fragments, config.line_tolerance));
        debug!(
            "Page {}: {} fragments in {} lines",
            page_num,
            fragments.len(),
            lines.len() - first
        );
        laid_out.push(PageLayout {
            page_num,
            fragments,
            lines: first..lines.len(),
        });
    }

    let boundaries = config.columns.resolve(&lines);
    debug!(
        "{} column(s), thresholds {:?}",
        boundaries.column_count(),
        boundaries.thresholds()
    );

    Ok(DocumentLayout {
        pages: laid_out,
        lines,
        boundaries,
    })
}

fn assemble<'a>(
    pages: impl IntoIterator<Item = (usize, &'a RawPage)>,
    total_pages: usize,
    config: &ExtractionConfig,
) -> Result<ExtractedDocument, ExtractError> {
    let layout = lay_out(pages, config)?;
    let selected = layout.pages.len();
    let tables = build_tables(&layout, config);

    let raw_fragments: Vec<PositionedFragment> = layout
        .pages
        .into_iter()
        .flat_map(|page| page.fragments)
        .collect();
    let full_text = raw_fragments
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let line_texts: Vec<String> = layout.lines.iter().map(LineCluster::text).collect();

    let metadata = fields::extract_metadata(
        line_texts.iter().map(String::as_str),
        config.metadata_lines,
    );
    let transactions = fields::extract_transactions(line_texts.iter().map(String::as_str));

    let stats = ExtractionStats {
        total_pages,
        processed_pages: selected,
        fragment_count: raw_fragments.len(),
        line_count: layout.lines.len(),
        table_count: tables.len(),
        row_count: tables.iter().map(|t| t.rows.len()).sum(),
        decode_duration_ms: 0,
        total_duration_ms: 0,
    };

    if let Some(cb) = config.progress_callback.as_ref() {
        cb.on_extraction_complete(selected, stats.table_count);
    }

    Ok(ExtractedDocument {
        metadata,
        tables,
        dates: fields::find_dates(&full_text),
        amounts: fields::find_amounts(&full_text),
        transactions,
        raw_fragments,
        stats,
    })
}

fn build_tables(layout: &DocumentLayout, config: &ExtractionConfig) -> Vec<TableData> {
    let selected = layout.pages.len();
    let cb = config.progress_callback.as_ref();

    match config.table_layout {
        TableLayout::PerPage => {
            let mut tables = Vec::new();
            for page in &layout.pages {
                let table = detect_table(
                    layout.page_lines(page),
                    &layout.boundaries,
                    &config.headers,
                    Some(page.page_num),
                );
                if let Some(cb) = cb {
                    let rows = table.as_ref().map_or(0, |t| t.rows.len());
                    cb.on_page_complete(page.page_num, selected, rows);
                }
                tables.extend(table);
            }
            tables
        }
        TableLayout::Merged => detect_merged_table_with(
            layout.pages.iter().map(|page| layout.page_lines(page)),
            &layout.boundaries,
            &config.headers,
            |i, rows| {
                if let Some(cb) = cb {
                    cb.on_page_complete(layout.pages[i].page_num, selected, rows);
                }
            },
        )
        .into_iter()
        .collect(),
    }
}

pub(crate) async fn write_json_atomic(
    path: &Path,
    doc: &ExtractedDocument,
) -> Result<(), ExtractError> {
    let json = serde_json::to_vec_pretty(doc)
        .map_err(|e| ExtractError::Internal(format!("JSON serialisation failed: {e}")))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExtractError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(())
}
