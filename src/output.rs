//! Output types: everything an extraction hands back to the caller.
//!
//! All types serialise to camelCase JSON so a UI layer can render the
//! document directly and a spreadsheet exporter can take `headers` and
//! `rows` as plain string arrays.

use serde::{Deserialize, Serialize};

/// Sentinel used when no leading line names the company.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
/// Sentinel used when no leading line names a known report type.
pub const UNKNOWN_DOCUMENT_TYPE: &str = "Unknown Document Type";
/// Sentinel used when no leading line names a month or period.
pub const UNKNOWN_PERIOD: &str = "Unknown Period";

/// One positioned string from a PDF page.
///
/// Coordinates are PDF user-space units with the origin at the bottom-left
/// of the page, so a larger `y` is closer to the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedFragment {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 1-indexed page the fragment came from.
    pub page: usize,
}

impl PositionedFragment {
    /// Right edge of the fragment.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// One table row: a cell per column slot, empty when nothing landed there.
pub type TableRow = Vec<String>;

/// A table reconstructed from line clusters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Source page (1-indexed), or `None` for a table merged across pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

impl TableData {
    /// Number of column slots in this table.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Copy of the table without rows whose cells are all empty.
    ///
    /// Statements use blank spacer rows on purpose, so the detector keeps
    /// them; this is for callers that do not want them.
    pub fn without_blank_rows(&self) -> TableData {
        TableData {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.iter().any(|cell| !cell.is_empty()))
                .cloned()
                .collect(),
            page: self.page,
        }
    }

    /// Render as a GitHub-flavoured Markdown table.
    pub fn to_markdown(&self) -> String {
        let cols = self.column_count();
        if cols == 0 {
            return String::new();
        }

        let mut widths = vec![3usize; cols];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(escape_pipes(cell).chars().count());
            }
        }

        let render_row = |row: &[String]| -> String {
            let mut line = String::from("|");
            for (i, &width) in widths.iter().enumerate() {
                let cell = row.get(i).map(|c| escape_pipes(c)).unwrap_or_default();
                line.push_str(&format!(" {cell:width$} |"));
            }
            line
        };

        let mut md = render_row(&self.headers);
        md.push('\n');
        md.push('|');
        for width in &widths {
            md.push_str(&format!(" {} |", "-".repeat(*width)));
        }
        md.push('\n');
        for row in &self.rows {
            md.push_str(&render_row(row));
            md.push('\n');
        }
        md
    }
}

fn escape_pipes(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Financial report families recognised in leading lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportKind {
    ProfitAndLoss,
    BalanceSheet,
    CashFlow,
    #[serde(rename = "AR")]
    AccountsReceivable,
    #[serde(rename = "AP")]
    AccountsPayable,
    Inventory,
}

/// Shape of the period a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodKind {
    Monthly,
    Quarterly,
    Annual,
    #[serde(rename = "TTM")]
    TrailingTwelveMonths,
    Custom,
}

/// Company, report type and period inferred from the document's first lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub company_name: String,
    pub document_type: String,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_kind: Option<ReportKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_kind: Option<PeriodKind>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            company_name: UNKNOWN_COMPANY.to_string(),
            document_type: UNKNOWN_DOCUMENT_TYPE.to_string(),
            period: UNKNOWN_PERIOD.to_string(),
            report_kind: None,
            period_kind: None,
        }
    }
}

/// A ledger-style line: date, description and amount found on one text line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub category: String,
}

/// Counters and timings for one extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages that went through the pipeline (after page selection).
    pub processed_pages: usize,
    pub fragment_count: usize,
    pub line_count: usize,
    pub table_count: usize,
    pub row_count: usize,
    /// Time spent inside pdfium; zero when pages were supplied pre-decoded.
    pub decode_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// The final artifact of one extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub metadata: DocumentMetadata,
    pub tables: Vec<TableData>,
    pub raw_fragments: Vec<PositionedFragment>,
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub transactions: Vec<Transaction>,
    pub stats: ExtractionStats,
}

/// Per-page output of [`crate::stream::extract_stream`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTables {
    /// 1-indexed page number.
    pub page_num: usize,
    /// The page's table, `None` when the page carried no text.
    pub table: Option<TableData>,
    pub fragments: Vec<PositionedFragment>,
    pub duration_ms: u64,
}

/// PDF-level facts read without running the table pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableData {
        TableData {
            headers: vec!["Account".into(), "Amount".into()],
            rows: vec![
                vec!["Revenue".into(), "$5,000.00".into()],
                vec![String::new(), String::new()],
                vec!["Expenses".into(), "$1,200.50".into()],
            ],
            page: Some(1),
        }
    }

    #[test]
    fn default_metadata_uses_sentinels() {
        let meta = DocumentMetadata::default();
        assert_eq!(meta.company_name, "Unknown Company");
        assert_eq!(meta.document_type, "Unknown Document Type");
        assert_eq!(meta.period, "Unknown Period");
    }

    #[test]
    fn metadata_serialises_camel_case() {
        let json = serde_json::to_value(DocumentMetadata::default()).unwrap();
        assert_eq!(json["companyName"], "Unknown Company");
        assert_eq!(json["documentType"], "Unknown Document Type");
        assert!(json.get("reportKind").is_none());
    }

    #[test]
    fn report_kind_uses_original_codes() {
        let json = serde_json::to_string(&ReportKind::AccountsReceivable).unwrap();
        assert_eq!(json, "\"AR\"");
        let json = serde_json::to_string(&ReportKind::ProfitAndLoss).unwrap();
        assert_eq!(json, "\"PROFIT_AND_LOSS\"");
    }

    #[test]
    fn blank_rows_are_kept_until_filtered() {
        let t = table();
        assert_eq!(t.rows.len(), 3);
        let filtered = t.without_blank_rows();
        assert_eq!(filtered.rows.len(), 2);
        assert_eq!(filtered.headers, t.headers);
    }

    #[test]
    fn markdown_has_header_separator_and_rows() {
        let md = table().to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Account"));
        assert!(lines[1].starts_with("| ---"));
        assert!(lines[2].contains("$5,000.00"));
    }

    #[test]
    fn markdown_escapes_pipes() {
        let t = TableData {
            headers: vec!["A|B".into()],
            rows: vec![],
            page: None,
        };
        assert!(t.to_markdown().contains("A\\|B"));
    }

    #[test]
    fn markdown_columns_stay_aligned_around_escaped_pipes() {
        let t = TableData {
            headers: vec!["Account".into(), "Amount".into()],
            rows: vec![
                vec!["Cash|Bank".into(), "$1.00".into()],
                vec!["A|B|C|D|E".into(), "$2.00".into()],
            ],
            page: None,
        };
        let md = t.to_markdown();
        let widths: Vec<usize> = md.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{md}");
        assert!(md.contains("| A\\|B\\|C\\|D\\|E |"));
    }

    #[test]
    fn empty_table_renders_nothing() {
        assert_eq!(TableData::default().to_markdown(), "");
    }
}
