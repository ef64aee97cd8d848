//! Configuration types for table extraction.
//!
//! Every extraction knob lives in [`ExtractionConfig`], built via
//! [`ExtractionConfigBuilder`]. One struct means a run can be logged, shared
//! across tasks and diffed against another run when two statements come out
//! differently.

use crate::error::ExtractError;
use crate::pipeline::columns::{validate_thresholds, ColumnPolicy, GapSettings};
use crate::pipeline::table::HeaderPolicy;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Configuration for one extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2table::{ColumnPolicy, ExtractionConfig};
///
/// let config = ExtractionConfig::builder()
///     .line_tolerance(4.0)
///     .columns(ColumnPolicy::Fixed(vec![100.0, 300.0, 500.0]))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Vertical distance (PDF units) below which two fragments share a line.
    /// Default: 5.0.
    ///
    /// Body text at 10–12 pt sits 12–14 units apart, so 5 merges baseline
    /// jitter inside a row without swallowing the next row.
    pub line_tolerance: f64,

    /// Where column boundaries come from. Default: dynamic gap detection.
    pub columns: ColumnPolicy,

    /// How each table's header row is chosen. Default: [`HeaderPolicy::Auto`].
    pub headers: HeaderPolicy,

    /// One table per page, or one table for the whole document.
    pub table_layout: TableLayout,

    /// Leading lines inspected for company, report type and period. Default: 5.
    pub metadata_lines: usize,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Explicit pdfium shared library. If `None`, a library next to the
    /// working directory is tried first, then the system one.
    pub pdfium_library_path: Option<PathBuf>,

    /// Per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 5.0,
            columns: ColumnPolicy::default(),
            headers: HeaderPolicy::default(),
            table_layout: TableLayout::default(),
            metadata_lines: 5,
            pages: PageSelection::default(),
            password: None,
            pdfium_library_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("line_tolerance", &self.line_tolerance)
            .field("columns", &self.columns)
            .field("headers", &self.headers)
            .field("table_layout", &self.table_layout)
            .field("metadata_lines", &self.metadata_lines)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn line_tolerance(mut self, tolerance: f64) -> Self {
        self.config.line_tolerance = tolerance;
        self
    }

    pub fn columns(mut self, policy: ColumnPolicy) -> Self {
        self.config.columns = policy;
        self
    }

    /// Shorthand for [`ColumnPolicy::Fixed`].
    pub fn fixed_columns(self, thresholds: Vec<f64>) -> Self {
        self.columns(ColumnPolicy::Fixed(thresholds))
    }

    /// Shorthand for [`ColumnPolicy::Dynamic`].
    pub fn dynamic_columns(self, settings: GapSettings) -> Self {
        self.columns(ColumnPolicy::Dynamic(settings))
    }

    pub fn headers(mut self, policy: HeaderPolicy) -> Self {
        self.config.headers = policy;
        self
    }

    pub fn table_layout(mut self, layout: TableLayout) -> Self {
        self.config.table_layout = layout;
        self
    }

    pub fn metadata_lines(mut self, n: usize) -> Self {
        self.config.metadata_lines = n;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !c.line_tolerance.is_finite() || c.line_tolerance <= 0.0 {
            return Err(ExtractError::InvalidConfig(format!(
                "Line tolerance must be a positive number, got {}",
                c.line_tolerance
            )));
        }
        match &c.columns {
            ColumnPolicy::Fixed(thresholds) => validate_thresholds(thresholds)?,
            ColumnPolicy::Dynamic(gap) => {
                if !gap.min_gap.is_finite() || gap.min_gap <= 0.0 {
                    return Err(ExtractError::InvalidConfig(format!(
                        "Minimum column gap must be a positive number, got {}",
                        gap.min_gap
                    )));
                }
                if !gap.alignment_tolerance.is_finite() || gap.alignment_tolerance < 0.0 {
                    return Err(ExtractError::InvalidConfig(format!(
                        "Alignment tolerance must be ≥ 0, got {}",
                        gap.alignment_tolerance
                    )));
                }
                if gap.min_support == 0 {
                    return Err(ExtractError::InvalidConfig(
                        "Minimum column support must be ≥ 1".into(),
                    ));
                }
            }
        }
        if let PageSelection::Range(start, end) = c.pages {
            if start == 0 || start > end {
                return Err(ExtractError::InvalidConfig(format!(
                    "Page range must be 1-indexed and ascending, got {start}-{end}"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Whether tables are kept per page or merged into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TableLayout {
    /// One table per page that carries text (default).
    #[default]
    PerPage,
    /// One table for the whole document. Statements that run over several
    /// pages usually reprint the column titles; those repeats are dropped.
    Merged,
}

/// Specifies which pages of the PDF to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

/// Parses the CLI forms `all`, `5`, `3-15` and `1,3,5,7`.
impl FromStr for PageSelection {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let page = |raw: &str| -> Result<usize, ExtractError> {
            match raw.trim().parse::<usize>() {
                Ok(0) => Err(ExtractError::InvalidConfig(
                    "pages are 1-indexed, 0 is not a page".into(),
                )),
                Ok(n) => Ok(n),
                Err(_) => Err(ExtractError::InvalidConfig(format!(
                    "'{}' is not a page number",
                    raw.trim()
                ))),
            }
        };

        if s.eq_ignore_ascii_case("all") {
            Ok(PageSelection::All)
        } else if s.contains(',') {
            s.split(',').map(page).collect::<Result<_, _>>().map(PageSelection::Set)
        } else if let Some((start, end)) = s.split_once('-') {
            let (start, end) = (page(start)?, page(end)?);
            if start > end {
                return Err(ExtractError::InvalidConfig(format!(
                    "page range {start}-{end} runs backwards"
                )));
            }
            Ok(PageSelection::Range(start, end))
        } else {
            page(s).map(PageSelection::Single)
        }
    }
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    ///
    /// Pages past `total_pages` are dropped.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if (1..=total_pages).contains(p) {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                if *end > total_pages {
                    warn!(
                        "Page range {}-{} ends past the last page ({}), truncating",
                        start, end, total_pages
                    );
                }
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| (1..=total_pages).contains(&p))
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// First requested page beyond `total_pages`, if any.
    pub fn first_out_of_range(&self, total_pages: usize) -> Option<usize> {
        match self {
            PageSelection::All => None,
            PageSelection::Single(p) => (*p > total_pages || *p == 0).then_some(*p),
            PageSelection::Range(start, _) => (*start > total_pages).then_some(*start),
            PageSelection::Set(pages) => pages
                .iter()
                .copied()
                .find(|&p| p > total_pages || p == 0),
        }
    }
}
