//! CLI binary for thesis2csv.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, drives a batch, and renders progress.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thesis2csv::{
    run_batch, BatchProgressCallback, ExtractionConfig, PageBudget, PromptMode,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the whole batch, one printed line
/// per completed document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning input directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_documents as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_documents} document(s)…"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, file_name: &str) {
        self.bar.set_message(file_name.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, file_name: &str, used_ocr: bool) {
        let via = if used_ocr { dim("(OCR)") } else { String::new() };
        self.bar.println(format!(
            "  {} [{index:>3}/{total:<3}] {file_name} {via}",
            green("✓"),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, processed: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} document(s) processed",
            green("✔"),
            bold(&processed.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process every PDF in a directory with the default model
  thesis2csv teses/ -o respostas.csv

  # Use a reasoning model with the combined single-prompt strategy
  thesis2csv teses/ -o respostas.csv --model deepseek-r1 --mode combined

  # Point at a remote Ollama server and a specific tesseract install
  thesis2csv teses/ --base-url http://gpu-box:11434 --tesseract /opt/tesseract/bin/tesseract

  # Higher OCR quality for poor scans
  thesis2csv teses/ --dpi 300 --lang por

PREREQUISITES:
  1. An Ollama server with the chosen model pulled:
       ollama pull llama3.2
  2. tesseract with the Portuguese language pack, for scanned PDFs:
       apt install tesseract-ocr tesseract-ocr-por
  3. The pdfium shared library on the system library path, or pass
     --pdfium-dir /path/to/dir containing libpdfium.

ENVIRONMENT VARIABLES:
  THESIS2CSV_MODEL       Override the model ID
  THESIS2CSV_BASE_URL    Override the Ollama base URL
  RUST_LOG               Tracing filter (overrides -v/-q)

OUTPUT:
  A CSV with a UTF-8 BOM, one row per PDF, one column per question, rewritten
  and flushed after every document. Interrupting the run keeps all rows
  written so far.
"#;

/// Extract bibliographic metadata from thesis PDFs into a CSV table.
#[derive(Parser, Debug)]
#[command(
    name = "thesis2csv",
    version,
    about = "Extract bibliographic metadata from thesis PDFs into a CSV table",
    long_about = "Scan a directory of thesis PDFs, pull text from each (with OCR fallback \
for scanned documents), ask a local Ollama model a fixed set of questions, and write one \
CSV row per document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the PDF files (scanned non-recursively).
    input_dir: PathBuf,

    /// Output CSV path.
    #[arg(short, long, default_value = "respostas.csv")]
    output: PathBuf,

    /// Ollama model ID (e.g. llama3.2, deepseek-r1).
    #[arg(long, env = "THESIS2CSV_MODEL", default_value = "llama3.2")]
    model: String,

    /// Base URL of the Ollama server.
    #[arg(long, env = "THESIS2CSV_BASE_URL", default_value = "http://localhost:11434")]
    base_url: String,

    /// Prompting strategy: per-question or combined.
    #[arg(long, value_enum, default_value = "per-question")]
    mode: ModeArg,

    /// Path to the tesseract binary.
    #[arg(long, default_value = "tesseract")]
    tesseract: PathBuf,

    /// Tesseract language code.
    #[arg(long, default_value = "por")]
    lang: String,

    /// Rasterisation DPI for the OCR path (72–400).
    #[arg(long, default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Directory containing the pdfium shared library.
    #[arg(long)]
    pdfium_dir: Option<PathBuf>,

    /// Pages taken from the start of each document in combined mode.
    #[arg(long, default_value_t = 20)]
    first_pages: usize,

    /// Pages taken from the end of each document in combined mode.
    #[arg(long, default_value_t = 10)]
    last_pages: usize,

    /// Character cap on the document text embedded in a combined prompt.
    #[arg(long, default_value_t = 6000)]
    max_chars: usize,

    /// Per-request timeout in seconds (unset: wait indefinitely).
    #[arg(long)]
    timeout: Option<u64>,

    /// Retries per generation call.
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ModeArg {
    PerQuestion,
    Combined,
}

impl From<ModeArg> for PromptMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::PerQuestion => PromptMode::PerQuestion,
            ModeArg::Combined => PromptMode::Combined,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level feedback; library logs are
    // suppressed while it is active unless -v asks for them.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ExtractionConfig::builder()
        .input_dir(&cli.input_dir)
        .output_csv(&cli.output)
        .model(&cli.model)
        .base_url(&cli.base_url)
        .prompt_mode(cli.mode.clone().into())
        .tesseract_path(&cli.tesseract)
        .ocr_language(&cli.lang)
        .ocr_dpi(cli.dpi)
        .page_budget(PageBudget {
            first: cli.first_pages,
            last: cli.last_pages,
        })
        .max_prompt_chars(cli.max_chars)
        .max_retries(cli.max_retries);

    if let Some(dir) = &cli.pdfium_dir {
        builder = builder.pdfium_lib_dir(dir);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new());
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run batch ────────────────────────────────────────────────────────
    let stats = run_batch(&config).await.context("Batch failed")?;

    if !cli.quiet {
        eprintln!(
            "{}  {}/{} documents  {} via OCR  {} generation failure(s)  {:.1}s  →  {}",
            if stats.generation_failures == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.processed_documents,
            stats.total_documents,
            stats.ocr_documents,
            stats.generation_failures,
            stats.duration_ms as f64 / 1000.0,
            bold(&cli.output.display().to_string()),
        );
    }

    Ok(())
}
