//! Field extractors: dates, currency amounts, document metadata and
//! ledger-style transaction lines.
//!
//! Every extractor is a pure function over text. Matches come back in
//! document order and are never deduplicated: the same amount on two line
//! items is two facts.
//!
//! ## Metadata heuristic
//!
//! Statement headers follow a near-universal convention: company name,
//! report title, then the period ("Acme Corp / Profit and Loss / January
//! 2024"), in some order. Only the first few lines are inspected and the
//! first line that fits a category claims it.

use crate::output::{DocumentMetadata, PeriodKind, ReportKind, Transaction};
use crate::pipeline::lines::join_trimmed;
use once_cell::sync::Lazy;
use regex::Regex;

// ── Dates ────────────────────────────────────────────────────────────────────

static RE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b|\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.? \d{1,2},? \d{4}\b",
    )
    .unwrap()
});

/// Numeric (`3/15/2024`, `03-15-24`) and long-form (`January 5, 2024`) dates.
pub fn find_dates(text: &str) -> Vec<String> {
    RE_DATE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ── Amounts ──────────────────────────────────────────────────────────────────

static RE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$[ \t]*\d+(?:,\d{3})*(?:\.\d{2})?|\b\d+(?:,\d{3})*(?:\.\d{2})?[ \t]*(?:usd|dollars)\b",
    )
    .unwrap()
});

/// Amount matches, minus suffix-form hits that start inside a longer number
/// (`3.5 USD` must not yield `5 USD`).
fn amount_matches(text: &str) -> impl Iterator<Item = regex::Match<'_>> {
    RE_AMOUNT.find_iter(text).filter(move |m| {
        m.as_str().starts_with('$')
            || !text[..m.start()]
                .chars()
                .next_back()
                .is_some_and(|c| c == '.' || c == ',' || c.is_ascii_digit())
    })
}

/// `$`-prefixed amounts and numbers suffixed with `USD` or `dollars`.
pub fn find_amounts(text: &str) -> Vec<String> {
    amount_matches(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Bare figures as printed in statement columns: `1,234`, `(450.00)`, `-12.50`.
static RE_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?-?\$?\s*(?:\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.\d{2})\)?$").unwrap()
});

/// Whether a table cell holds a money value rather than a label.
pub fn is_money_cell(cell: &str) -> bool {
    let cell = cell.trim();
    amount_matches(cell).next().is_some() || RE_FIGURE.is_match(cell)
}

// ── Metadata ─────────────────────────────────────────────────────────────────

static REPORT_PHRASES: Lazy<Vec<(Regex, ReportKind)>> = Lazy::new(|| {
    [
        (
            r"(?i)\bprofit\s*(?:and|&)\s*loss\b|\bp\s*&\s*l\b|\bincome\s+statement\b|\bstatement\s+of\s+operations\b",
            ReportKind::ProfitAndLoss,
        ),
        (
            r"(?i)\bbalance\s+sheet\b|\bstatement\s+of\s+financial\s+position\b",
            ReportKind::BalanceSheet,
        ),
        (r"(?i)\bcash\s+flows?\b", ReportKind::CashFlow),
        (r"(?i)\baccounts\s+receivable\b", ReportKind::AccountsReceivable),
        (r"(?i)\baccounts\s+payable\b", ReportKind::AccountsPayable),
        (r"(?i)\binventory\b", ReportKind::Inventory),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), kind))
    .collect()
});

static RE_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\b",
    )
    .unwrap()
});

/// Report family named in `text`, if any.
pub fn report_kind(text: &str) -> Option<ReportKind> {
    REPORT_PHRASES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, kind)| *kind)
}

/// Whether `text` names a calendar month.
pub fn mentions_month(text: &str) -> bool {
    RE_MONTH.is_match(text)
}

static RE_TTM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btrailing\s+(?:twelve|12)\b|\bttm\b|\bltm\b").unwrap());
static RE_QUARTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bq[1-4]\b|\bquarter|\b(?:three|3)\s+months\b").unwrap());
static RE_ANNUAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\byear\b|\bannual|\bfiscal\b|\bfy\s?\d{2,4}\b|\b(?:twelve|12)\s+months\b")
        .unwrap()
});
static RE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bthrough\b|\bthru\b|\bto\b|\s[-–]\s").unwrap());

/// Classify a period line into the report-period families.
pub fn period_kind(text: &str) -> Option<PeriodKind> {
    if RE_TTM.is_match(text) {
        return Some(PeriodKind::TrailingTwelveMonths);
    }
    if RE_QUARTER.is_match(text) {
        return Some(PeriodKind::Quarterly);
    }
    if RE_ANNUAL.is_match(text) {
        return Some(PeriodKind::Annual);
    }
    let months = RE_MONTH.find_iter(text).count();
    if months >= 2 || (months == 1 && RE_RANGE.is_match(text)) {
        return Some(PeriodKind::Custom);
    }
    (months == 1).then_some(PeriodKind::Monthly)
}

/// Infer company, report type and period from a document's leading lines.
///
/// Only the first `limit` lines are considered; blank ones are skipped.
/// A line naming a report type fills `document_type`, otherwise a line
/// naming a month fills `period`, otherwise it fills `company_name`. The
/// first candidate per category wins and later ones are ignored. Unfilled
/// categories keep their "Unknown …" sentinels.
pub fn extract_metadata<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> DocumentMetadata {
    let mut meta = DocumentMetadata::default();
    let (mut company, mut doc_type, mut period) = (None, None, None);

    for line in lines.into_iter().take(limit) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(kind) = report_kind(line) {
            if doc_type.is_none() {
                doc_type = Some(line);
                meta.report_kind = Some(kind);
            }
        } else if mentions_month(line) {
            if period.is_none() {
                period = Some(line);
                meta.period_kind = period_kind(line);
            }
        } else if company.is_none() {
            company = Some(line);
        }
    }

    if let Some(c) = company {
        meta.company_name = c.to_string();
    }
    if let Some(d) = doc_type {
        meta.document_type = d.to_string();
    }
    if let Some(p) = period {
        meta.period = p.to_string();
    }
    meta
}

// ── Transactions ─────────────────────────────────────────────────────────────

static RE_SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap());
static RE_CENTS_AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$[\d,]+\.\d{2}").unwrap());

/// Category assigned to every parsed transaction.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Parse ledger-style lines ("3/15/2024 Office supplies $42.10").
///
/// A line yields a transaction when at least two of date, description and
/// amount are present. The description is whatever text remains once the
/// date and amount are cut out, provided it contains a letter.
pub fn extract_transactions<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<Transaction> {
    lines.into_iter().filter_map(parse_transaction).collect()
}

fn parse_transaction(line: &str) -> Option<Transaction> {
    let date = RE_SLASH_DATE.find(line);
    let amount = RE_CENTS_AMOUNT.find(line);

    let mut cuts: Vec<_> = [date, amount].into_iter().flatten().map(|m| m.range()).collect();
    cuts.sort_by_key(|r| r.start);
    let mut pieces = Vec::with_capacity(cuts.len() + 1);
    let mut pos = 0;
    for range in cuts {
        if range.start >= pos {
            pieces.push(&line[pos..range.start]);
            pos = range.end;
        }
    }
    pieces.push(&line[pos..]);

    let description = join_trimmed(pieces.into_iter().flat_map(str::split_whitespace));
    let description = if description.chars().any(char::is_alphabetic) {
        description
    } else {
        String::new()
    };

    let present =
        usize::from(date.is_some()) + usize::from(amount.is_some()) + usize::from(!description.is_empty());
    if present < 2 {
        return None;
    }

    Some(Transaction {
        date: date.map(|m| m.as_str().to_string()).unwrap_or_default(),
        description,
        amount: amount.map(|m| m.as_str().to_string()).unwrap_or_default(),
        category: UNCATEGORIZED.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_in_left_to_right_order() {
        assert_eq!(
            find_amounts("Total: $1,234.56 and 500 USD"),
            vec!["$1,234.56", "500 USD"]
        );
    }

    #[test]
    fn amount_variants() {
        assert_eq!(
            find_amounts("$ 42, $1,000,000 and 12.50 dollars or 7 usd"),
            vec!["$ 42", "$1,000,000", "12.50 dollars", "7 usd"]
        );
    }

    #[test]
    fn plain_numbers_are_not_amounts() {
        assert!(find_amounts("Invoice 12345 dated 2024").is_empty());
    }

    #[test]
    fn amounts_stay_on_one_line() {
        assert!(find_amounts("Total $\n500").is_empty());
        assert_eq!(find_amounts("$\t500"), vec!["$\t500"]);
    }

    #[test]
    fn suffix_amounts_never_start_inside_a_number() {
        assert!(find_amounts("paid 3.5 USD").is_empty());
        assert!(find_amounts("ref 1,5 dollars").is_empty());
        assert_eq!(find_amounts("paid 3.50 USD"), vec!["3.50 USD"]);
        assert!(!is_money_cell("3.5 USD"));
    }

    #[test]
    fn duplicate_amounts_are_kept() {
        assert_eq!(find_amounts("$10.00 $10.00"), vec!["$10.00", "$10.00"]);
    }

    #[test]
    fn dates_in_document_order() {
        assert_eq!(
            find_dates("Paid on 3/15/2024 and again on January 5, 2024"),
            vec!["3/15/2024", "January 5, 2024"]
        );
    }

    #[test]
    fn date_variants() {
        assert_eq!(
            find_dates("12-31-23, DECEMBER 31 2023, sept. 1, 2024"),
            vec!["12-31-23", "DECEMBER 31 2023", "sept. 1, 2024"]
        );
    }

    #[test]
    fn words_starting_with_a_month_are_not_dates() {
        assert!(find_dates("Marketing 12, 2024 expense").is_empty());
        assert!(find_dates("Decking 3 2024 Mayor 1, 2023").is_empty());
        assert_eq!(find_dates("Sept 9, 2024 Junior 1, 2024"), vec!["Sept 9, 2024"]);
    }

    #[test]
    fn extractors_are_idempotent() {
        let text = "On 1/2/2024 paid $3,000.00; on Feb 4, 2024 received 200 USD";
        assert_eq!(find_dates(text), find_dates(text));
        assert_eq!(find_amounts(text), find_amounts(text));
    }

    #[test]
    fn money_cells() {
        assert!(is_money_cell("$5,000.00"));
        assert!(is_money_cell("1,234"));
        assert!(is_money_cell("(450.00)"));
        assert!(is_money_cell("-12.50"));
        assert!(!is_money_cell("2024"));
        assert!(!is_money_cell("Revenue"));
        assert!(!is_money_cell("Dec 31, 2024"));
    }

    #[test]
    fn metadata_from_leading_lines() {
        let lines = ["Acme Holdings LLC", "Profit and Loss", "January 2024", "Income", "$5.00"];
        let meta = extract_metadata(lines, 5);
        assert_eq!(meta.company_name, "Acme Holdings LLC");
        assert_eq!(meta.document_type, "Profit and Loss");
        assert_eq!(meta.period, "January 2024");
        assert_eq!(meta.report_kind, Some(ReportKind::ProfitAndLoss));
        assert_eq!(meta.period_kind, Some(PeriodKind::Monthly));
    }

    #[test]
    fn metadata_first_match_wins() {
        let lines = ["Balance Sheet", "Cash Flow", "Acme", "Globex"];
        let meta = extract_metadata(lines, 5);
        assert_eq!(meta.document_type, "Balance Sheet");
        assert_eq!(meta.report_kind, Some(ReportKind::BalanceSheet));
        assert_eq!(meta.company_name, "Acme");
        assert_eq!(meta.period, "Unknown Period");
    }

    #[test]
    fn metadata_only_scans_the_limit() {
        let lines = ["Acme", "Assets", "Cash", "Receivables", "Equipment", "Profit & Loss"];
        let meta = extract_metadata(lines, 5);
        assert_eq!(meta.document_type, "Unknown Document Type");
        assert_eq!(meta.report_kind, None);
    }

    #[test]
    fn metadata_defaults_on_empty_input() {
        let meta = extract_metadata(std::iter::empty(), 5);
        assert_eq!(meta, DocumentMetadata::default());
    }

    #[test]
    fn report_kinds() {
        assert_eq!(report_kind("P&L Detail"), Some(ReportKind::ProfitAndLoss));
        assert_eq!(report_kind("Statement of Cash Flows"), Some(ReportKind::CashFlow));
        assert_eq!(report_kind("A/P: Accounts Payable Aging"), Some(ReportKind::AccountsPayable));
        assert_eq!(report_kind("Accounts Receivable"), Some(ReportKind::AccountsReceivable));
        assert_eq!(report_kind("Inventory Valuation"), Some(ReportKind::Inventory));
        assert_eq!(report_kind("Acme Corp"), None);
    }

    #[test]
    fn period_kinds() {
        assert_eq!(period_kind("January 2024"), Some(PeriodKind::Monthly));
        assert_eq!(period_kind("Q1 2024 (Jan - Mar)"), Some(PeriodKind::Quarterly));
        assert_eq!(
            period_kind("For the year ended December 31, 2023"),
            Some(PeriodKind::Annual)
        );
        assert_eq!(
            period_kind("Trailing twelve months through June 2024"),
            Some(PeriodKind::TrailingTwelveMonths)
        );
        assert_eq!(
            period_kind("January 1 - February 15, 2024"),
            Some(PeriodKind::Custom)
        );
        assert_eq!(period_kind("Acme"), None);
    }

    #[test]
    fn transactions_need_two_of_three_fields() {
        let lines = [
            "3/15/2024 Office supplies $42.10",
            "Wire transfer $1,000.00",
            "4/1/2024",
            "Opening remarks",
            "5/2/24 $9.99",
        ];
        let txs = extract_transactions(lines);
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].date, "3/15/2024");
        assert_eq!(txs[0].description, "Office supplies");
        assert_eq!(txs[0].amount, "$42.10");
        assert_eq!(txs[0].category, "Uncategorized");
        assert_eq!(txs[1].date, "");
        assert_eq!(txs[1].description, "Wire transfer");
        assert_eq!(txs[2].description, "");
        assert_eq!(txs[2].amount, "$9.99");
    }
}
