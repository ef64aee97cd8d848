//! CLI binary for pdf2table.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2table::pipeline::input::load_raw_pages;
use pdf2table::{
    extract, extract_pages, extract_to_file, inspect_with, ColumnPolicy, ExtractedDocument,
    ExtractionConfig, ExtractionProgressCallback, GapSettings, HeaderPolicy, PageSelection,
    ProgressCallback, TableLayout,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while pdfium decodes, then a page bar with one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Decoding");
        bar.set_message("Reading text layer…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Laying out {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, row_count: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{row_count:>4} rows")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.abandon();
    }

    fn on_extraction_complete(&self, total_pages: usize, table_count: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} tables from {} pages",
            green("✔"),
            bold(&table_count.to_string()),
            total_pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Tables, dates, amounts and metadata as JSON (stdout)
  pdf2table statement.pdf

  # Markdown tables, one per page
  pdf2table --format markdown statement.pdf

  # Known layout: column boundaries at x = 100, 300 and 500
  pdf2table --columns 100,300,500 statement.pdf -o statement.json

  # Multi-page statement as a single table with named columns
  pdf2table --merge-pages --headers "Account,Jan,Feb,Mar" statement.pdf

  # Text items already decoded elsewhere (JSON array of { items: [...] })
  pdf2table --items-json pages.json

  # Inspect PDF metadata only
  pdf2table --inspect-only statement.pdf

COLUMN DETECTION:
  Without --columns, boundaries are inferred from horizontal gaps of at
  least --min-gap units that line up (within --alignment-tolerance) on at
  least --min-support lines. Everything right of the last boundary lands in
  the last column.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium (file or directory)
  RUST_LOG          Override log filter (e.g. pdf2table=debug)
  PDF2TABLE_*       Every flag, e.g. PDF2TABLE_COLUMNS=100,300

SETUP:
  pdf2table needs the pdfium shared library. Put libpdfium in the working
  directory, install it system-wide, or point PDFIUM_LIB_PATH at it.
"#;

/// Reconstruct tables and financial fields from PDF text.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2table",
    version,
    about = "Reconstruct tables, dates, amounts and report metadata from financial PDFs",
    long_about = "Rebuild the tables of a financial statement PDF from the positions of its \
text runs, and extract dates, currency amounts, ledger lines and the company / report / period \
header. Works on text-layer PDFs; scanned images need OCR first.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file path (or a JSON text-item dump with --items-json).
    input: PathBuf,

    /// Treat INPUT as a JSON array of pages of text items instead of a PDF.
    #[arg(long, env = "PDF2TABLE_ITEMS_JSON")]
    items_json: bool,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "PDF2TABLE_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format.
    #[arg(long, env = "PDF2TABLE_FORMAT", value_enum, default_value = "json")]
    format: FormatArg,

    /// Fixed column boundaries as ascending x positions, e.g. 100,300,500.
    #[arg(long, env = "PDF2TABLE_COLUMNS")]
    columns: Option<String>,

    /// Smallest horizontal gap that can separate two columns.
    #[arg(long, env = "PDF2TABLE_MIN_GAP", default_value_t = 15.0)]
    min_gap: f64,

    /// Lines that must share a gap position before it becomes a column boundary.
    #[arg(long, env = "PDF2TABLE_MIN_SUPPORT", default_value_t = 2)]
    min_support: usize,

    /// Gap positions closer than this are the same boundary.
    #[arg(long, env = "PDF2TABLE_ALIGNMENT_TOLERANCE", default_value_t = 10.0)]
    alignment_tolerance: f64,

    /// Vertical distance below which two fragments share a line.
    #[arg(long, env = "PDF2TABLE_LINE_TOLERANCE", default_value_t = 5.0)]
    line_tolerance: f64,

    /// Header row choice: auto or first-line. Ignored with --headers.
    #[arg(long, env = "PDF2TABLE_HEADER", value_enum, default_value = "auto")]
    header: HeaderArg,

    /// Comma-separated column names; every line becomes data.
    #[arg(long, env = "PDF2TABLE_HEADERS")]
    headers: Option<String>,

    /// Build one table across all pages instead of one per page.
    #[arg(long, env = "PDF2TABLE_MERGE_PAGES")]
    merge_pages: bool,

    /// Drop rows whose cells are all empty.
    #[arg(long, env = "PDF2TABLE_DROP_BLANK_ROWS")]
    drop_blank_rows: bool,

    /// Leading lines scanned for company, report type and period.
    #[arg(long, env = "PDF2TABLE_METADATA_LINES", default_value_t = 5)]
    metadata_lines: usize,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2TABLE_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2TABLE_PASSWORD")]
    password: Option<String>,

    /// pdfium shared library (file or directory).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TABLE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TABLE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TABLE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Json,
    Markdown,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum HeaderArg {
    Auto,
    FirstLine,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs unless -v asks for everything.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect_with(&cli.input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.format == FormatArg::Json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = info.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = info.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", info.page_count);
            println!("PDF Version:  {}", info.pdf_version);
            if let Some(ref p) = info.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = info.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Run extraction ───────────────────────────────────────────────────
    // Straight to file when nothing needs post-processing.
    if let (Some(output_path), false, FormatArg::Json, false) = (
        cli.output.as_ref(),
        cli.items_json,
        cli.format,
        cli.drop_blank_rows,
    ) {
        let stats = extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} tables  {} rows  {}ms  →  {}",
                green("✔"),
                stats.table_count,
                stats.row_count,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    let mut doc = if cli.items_json {
        let pages = load_raw_pages(&cli.input)
            .await
            .context("Failed to load text items")?;
        extract_pages(&pages, &config).context("Extraction failed")?
    } else {
        extract(&cli.input, &config)
            .await
            .context("Extraction failed")?
    };

    if cli.drop_blank_rows {
        doc.tables = doc.tables.iter().map(|t| t.without_blank_rows()).collect();
    }

    let rendered = match cli.format {
        FormatArg::Json => {
            serde_json::to_string_pretty(&doc).context("Failed to serialise output")?
        }
        FormatArg::Markdown => render_markdown(&doc),
    };

    match cli.output {
        Some(ref path) => write_output(path, &rendered)?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            if !rendered.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "Extracted {} tables ({} rows) from {}/{} pages in {}ms",
            doc.stats.table_count,
            doc.stats.row_count,
            doc.stats.processed_pages,
            doc.stats.total_pages,
            doc.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let columns = match cli.columns {
        Some(ref raw) => ColumnPolicy::Fixed(parse_columns(raw)?),
        None => ColumnPolicy::Dynamic(GapSettings {
            min_gap: cli.min_gap,
            alignment_tolerance: cli.alignment_tolerance,
            min_support: cli.min_support,
        }),
    };

    let headers = match (cli.headers.as_deref(), cli.header) {
        (Some(names), _) => HeaderPolicy::Fixed(
            names
                .split(',')
                .map(|n| n.trim().to_string())
                .collect(),
        ),
        (None, HeaderArg::Auto) => HeaderPolicy::Auto,
        (None, HeaderArg::FirstLine) => HeaderPolicy::FirstLine,
    };

    let layout = if cli.merge_pages {
        TableLayout::Merged
    } else {
        TableLayout::PerPage
    };

    let mut builder = ExtractionConfig::builder()
        .line_tolerance(cli.line_tolerance)
        .columns(columns)
        .headers(headers)
        .table_layout(layout)
        .metadata_lines(cli.metadata_lines)
        .pages(
            cli.pages
                .parse::<PageSelection>()
                .context("Invalid --pages")?,
        );

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref lib) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(lib);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--columns` into ascending thresholds.
fn parse_columns(s: &str) -> Result<Vec<f64>> {
    s.split(',')
        .map(|p| {
            p.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid column boundary: '{}'", p.trim()))
        })
        .collect()
}

/// Metadata block followed by one Markdown table per extracted table.
fn render_markdown(doc: &ExtractedDocument) -> String {
    let meta = &doc.metadata;
    let mut md = format!(
        "# {}\n\n**{}** · {}\n",
        meta.company_name, meta.document_type, meta.period
    );

    for table in &doc.tables {
        md.push('\n');
        if let Some(page) = table.page {
            md.push_str(&format!("## Page {page}\n\n"));
        }
        md.push_str(&table.to_markdown());
    }
    md
}

/// Atomic write (temp file + rename), as the library does for JSON.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
