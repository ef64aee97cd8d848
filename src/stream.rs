//! Streaming extraction API: emit one [`PageTables`] per selected page.
//!
//! Column boundaries are inferred over the whole document, so every page is
//! decoded, normalised and clustered before the stream is returned; any
//! failure there is returned as the `Err` of [`extract_stream`]. Table
//! building then happens lazily as the caller polls, in page order, and
//! `on_extraction_complete` fires as the last page is yielded.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::extract::lay_out;
use crate::output::PageTables;
use crate::pipeline::normalize::RawPage;
use crate::pipeline::table::detect_table;
use crate::pipeline::{decode, input};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of per-page tables.
pub type PageStream = Pin<Box<dyn Stream<Item = PageTables> + Send>>;

/// Extract a PDF, yielding each selected page's table as it is built.
///
/// Pages without text still yield an item, with `table: None`.
pub async fn extract_stream(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<PageStream, ExtractError> {
    let pdf_path = input::resolve_pdf(path)?;
    info!("Starting streaming extraction: {}", pdf_path.display());

    let decoded = decode::decode_pages(&pdf_path, config).await?;
    stream_pages(decoded.pages, config)
}

/// Stream tables from pre-decoded pages (`pages[0]` is page 1).
pub fn extract_pages_stream(
    pages: Vec<RawPage>,
    config: &ExtractionConfig,
) -> Result<PageStream, ExtractError> {
    let total = pages.len();
    if let Some(page) = config.pages.first_out_of_range(total) {
        return Err(ExtractError::PageOutOfRange { page, total });
    }
    let selected: Vec<usize> = config.pages.to_indices(total);
    let numbered = pages
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| selected.binary_search(idx).is_ok())
        .map(|(idx, page)| (idx + 1, page))
        .collect();
    stream_pages(numbered, config)
}

fn stream_pages(
    pages: Vec<(usize, RawPage)>,
    config: &ExtractionConfig,
) -> Result<PageStream, ExtractError> {
    let layout = Arc::new(lay_out(pages.iter().map(|(n, page)| (*n, page)), config)?);
    let headers = config.headers.clone();
    let callback = config.progress_callback.clone();
    let total = layout.pages.len();

    if total == 0 {
        if let Some(cb) = &callback {
            cb.on_extraction_complete(0, 0);
        }
    }

    let mut table_count = 0usize;
    let s = stream::iter(0..total).map(move |i| {
        let started = Instant::now();
        let page = &layout.pages[i];
        let table = detect_table(
            layout.page_lines(page),
            &layout.boundaries,
            &headers,
            Some(page.page_num),
        );
        table_count += usize::from(table.is_some());
        if let Some(cb) = &callback {
            let rows = table.as_ref().map_or(0, |t| t.rows.len());
            cb.on_page_complete(page.page_num, total, rows);
            if i + 1 == total {
                cb.on_extraction_complete(total, table_count);
            }
        }
        PageTables {
            page_num: page.page_num,
            table,
            fragments: page.fragments.clone(),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    });

    Ok(Box::pin(s))
}
