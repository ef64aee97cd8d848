//! # pdf2table
//!
//! Reconstruct tables, dates, amounts and report metadata from the
//! positioned text of financial PDFs.
//!
//! ## Why this crate?
//!
//! A PDF has no notion of a table. An exported profit-and-loss statement is
//! a bag of text runs, each placed at an absolute coordinate. This crate
//! recovers the rows from vertical proximity and the columns from horizontal
//! position, then pulls out the facts a bookkeeping app cares about.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      validate the local file (or load a JSON dump of text items)
//!  ├─ 2. Decode     pdfium text segments (CPU-bound, spawn_blocking)
//!  ├─ 3. Normalize  items → positioned fragments, garbage rejected
//!  ├─ 4. Lines      cluster by y, top of page first
//!  ├─ 5. Columns    fixed thresholds or boundaries inferred from recurring gaps
//!  ├─ 6. Tables     header choice, one table per page (or merged)
//!  └─ 7. Fields     dates, amounts, company/report/period, ledger lines
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2table::{extract, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let doc = extract("statement.pdf", &config).await?;
//!     println!("{} / {}", doc.metadata.company_name, doc.metadata.period);
//!     for table in &doc.tables {
//!         println!("{}", table.to_markdown());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Already have text items from another decoder? [`extract_pages`] runs the
//! same pipeline synchronously, without pdfium.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2table` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2table = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageSelection, TableLayout};
pub use error::ExtractError;
pub use extract::{
    extract, extract_from_bytes, extract_pages, extract_sync, extract_to_file, inspect,
    inspect_with,
};
pub use output::{
    DocumentMetadata, ExtractedDocument, ExtractionStats, PageTables, PdfInfo, PeriodKind,
    PositionedFragment, ReportKind, TableData, TableRow, Transaction,
};
pub use pipeline::columns::{ColumnAssigner, ColumnBoundaries, ColumnPolicy, GapSettings};
pub use pipeline::normalize::{RawPage, RawTextItem};
pub use pipeline::table::HeaderPolicy;
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_pages_stream, extract_stream, PageStream};
