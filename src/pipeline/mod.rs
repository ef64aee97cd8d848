//! Pipeline stages for PDF table reconstruction.
//!
//! Each submodule implements one transformation step and is testable on its
//! own. Everything after `decode` is pure and synchronous.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ normalize ──▶ lines ──▶ columns ──▶ table
//! (path)   (pdfium)   (fragments)  (rows by y) (cells by x) (TableData)
//!                          │
//!                          └──▶ fields (dates, amounts, metadata, transactions)
//! ```
//!
//! 1. [`input`]    : validate the path and PDF magic bytes; load JSON item dumps
//! 2. [`decode`]   : pull positioned text segments via pdfium in `spawn_blocking`
//! 3. [`normalize`]: raw items → [`crate::output::PositionedFragment`]s
//! 4. [`lines`]    : cluster fragments into visual lines
//! 5. [`columns`]  : fixed or inferred column boundaries; line → row
//! 6. [`table`]    : header choice and row assembly
//! 7. [`fields`]   : regex extractors over the document text

pub mod columns;
pub mod decode;
pub mod fields;
pub mod input;
pub mod lines;
pub mod normalize;
pub mod table;
