//! End-to-end tests against real PDFs through pdfium.
//!
//! They need the pdfium shared library and sample statements in
//! `./test_cases/`, so they are gated behind the `E2E_ENABLED`
//! environment variable.
//!
//! Run with:
//!   E2E_ENABLED=1 LD_LIBRARY_PATH=. cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 LD_LIBRARY_PATH=. cargo test --test e2e test_inspect -- --nocapture

use futures::StreamExt;
use pdf2table::{
    extract, extract_from_bytes, extract_stream, extract_to_file, inspect, ExtractError,
    ExtractedDocument, ExtractionConfig, ExtractionProgressCallback, PageSelection, TableLayout,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Structural checks every extracted document must pass.
fn assert_document_sane(doc: &ExtractedDocument, context: &str) {
    assert!(
        !doc.raw_fragments.is_empty(),
        "[{context}] no text fragments decoded"
    );
    assert!(!doc.tables.is_empty(), "[{context}] no tables built");

    for table in &doc.tables {
        let width = table.column_count();
        assert!(
            table.rows.iter().all(|row| row.len() == width),
            "[{context}] ragged rows on page {:?}",
            table.page
        );
    }

    let invisible = ['\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}'];
    for fragment in &doc.raw_fragments {
        assert!(
            !fragment.text.trim().is_empty(),
            "[{context}] blank fragment survived normalisation"
        );
        assert!(
            !fragment.text.contains(&invisible[..]),
            "[{context}] fragment contains invisible characters: {:?}",
            fragment.text
        );
    }

    println!(
        "[{context}] ✓  {} fragments, {} tables, {} amounts, {} dates",
        doc.raw_fragments.len(),
        doc.tables.len(),
        doc.amounts.len(),
        doc.dates.len()
    );
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_balance_sheet() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("balance_sheet.pdf"));

    let info = inspect(&path).await.expect("inspect() should succeed");

    assert!(info.page_count >= 1);
    assert!(!info.pdf_version.is_empty());
    println!("Info: {:?}", info);
}

// ── Full extraction ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_extract_balance_sheet() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("balance_sheet.pdf"));

    let doc = extract(&path, &ExtractionConfig::default())
        .await
        .expect("extract() should succeed");

    assert_document_sane(&doc, "balance_sheet");
    assert!(!doc.amounts.is_empty(), "a balance sheet carries amounts");
    assert_ne!(doc.metadata.company_name, "Unknown Company");
}

#[tokio::test]
async fn test_extract_profit_and_loss_merged() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("profit_and_loss.pdf"));

    let config = ExtractionConfig::builder()
        .table_layout(TableLayout::Merged)
        .build()
        .unwrap();
    let doc = extract(&path, &config).await.expect("extract() should succeed");

    assert_document_sane(&doc, "profit_and_loss");
    assert_eq!(doc.tables.len(), 1, "merged layout yields a single table");
    assert!(doc.tables[0].page.is_none());
}

#[tokio::test]
async fn test_extract_first_page_only() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("profit_and_loss.pdf"));

    let config = ExtractionConfig::builder()
        .pages(PageSelection::Single(1))
        .build()
        .unwrap();
    let doc = extract(&path, &config).await.expect("extract() should succeed");

    assert_eq!(doc.stats.processed_pages, 1);
    assert!(doc.raw_fragments.iter().all(|f| f.page == 1));
}

#[tokio::test]
async fn test_page_beyond_document_is_rejected() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("balance_sheet.pdf"));

    let config = ExtractionConfig::builder()
        .pages(PageSelection::Single(9_999))
        .build()
        .unwrap();
    let err = extract(&path, &config).await.unwrap_err();
    assert!(
        matches!(err, ExtractError::PageOutOfRange { page: 9_999, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn test_password_is_passed_through_to_pdfium() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("balance_sheet.pdf"));

    // pdfium ignores a password on an unencrypted file.
    let config = ExtractionConfig::builder()
        .password("not-needed")
        .build()
        .unwrap();
    let with_password = extract(&path, &config)
        .await
        .expect("extract() with a password should succeed");
    let without = extract(&path, &ExtractionConfig::default()).await.unwrap();

    assert_eq!(with_password.tables, without.tables);
}

// ── Streaming ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stream_matches_batch() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("profit_and_loss.pdf"));
    let config = ExtractionConfig::default();

    let batch = extract(&path, &config).await.unwrap();
    let streamed: Vec<_> = extract_stream(&path, &config)
        .await
        .expect("extract_stream() should succeed")
        .collect()
        .await;

    let streamed_tables: Vec<_> = streamed.into_iter().filter_map(|p| p.table).collect();
    assert_eq!(streamed_tables, batch.tables);
}

// ── Output and input variants ────────────────────────────────────────────────

#[tokio::test]
async fn test_extract_to_file_writes_json() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("balance_sheet.pdf"));
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("balance_sheet.json");

    let stats = extract_to_file(&path, &out, &ExtractionConfig::default())
        .await
        .expect("extract_to_file() should succeed");

    let written: ExtractedDocument =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written.stats, stats);
    assert!(!dir.path().join("balance_sheet.json.tmp").exists());
}

#[tokio::test]
async fn test_extract_from_bytes() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("balance_sheet.pdf"));
    let bytes = std::fs::read(&path).unwrap();

    let from_bytes = extract_from_bytes(&bytes, &ExtractionConfig::default())
        .await
        .unwrap();
    let from_path = extract(&path, &ExtractionConfig::default()).await.unwrap();

    assert_eq!(from_bytes.tables, from_path.tables);
    assert_eq!(from_bytes.metadata, from_path.metadata);
}

// ── Progress ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Counting {
    pages: AtomicUsize,
    finished: AtomicUsize,
}

impl ExtractionProgressCallback for Counting {
    fn on_page_start(&self, _page_num: usize, _total: usize) {
        self.pages.fetch_add(1, Ordering::SeqCst);
    }

    fn on_extraction_complete(&self, _total_pages: usize, _table_count: usize) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_progress_reports_every_page() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("profit_and_loss.pdf"));
    let counter = Arc::new(Counting::default());
    let config = ExtractionConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let doc = extract(&path, &config).await.unwrap();

    assert_eq!(counter.pages.load(Ordering::SeqCst), doc.stats.processed_pages);
    assert_eq!(counter.finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stream_reports_completion() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("profit_and_loss.pdf"));
    let counter = Arc::new(Counting::default());
    let config = ExtractionConfig::builder()
        .progress_callback(counter.clone())
        .build()
        .unwrap();

    let pages: Vec<_> = extract_stream(&path, &config).await.unwrap().collect().await;

    assert!(!pages.is_empty());
    assert_eq!(counter.finished.load(Ordering::SeqCst), 1);
}

// ── Error paths (no pdfium needed) ───────────────────────────────────────────

#[tokio::test]
async fn test_missing_file_is_reported() {
    let err = extract("test_cases/does_not_exist.pdf", &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::FileNotFound { .. }), "{err}");
}

#[tokio::test]
async fn test_non_pdf_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let fake = dir.path().join("statement.pdf");
    std::fs::write(&fake, b"Date,Description,Amount\n").unwrap();

    let err = extract(&fake, &ExtractionConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::NotAPdf { .. }), "{err}");
}
