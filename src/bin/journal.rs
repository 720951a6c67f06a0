//! CLI binary for journal-builder.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ProcessingContext` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use journal_builder::{
    build, BuildProgressCallback, ErrorPolicy, OutputKind, ProcessingContext, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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

/// Terminal progress callback: a bar over eligible documents plus one log
/// line per generated or failed document.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// The bar starts as a spinner; `on_build_start` sets its length.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning sources…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Building");
    }
}

impl BuildProgressCallback for CliProgressCallback {
    fn on_build_start(&self, total_documents: usize) {
        self.activate_bar(total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Checking {total_documents} document(s)…"))
        ));
    }

    fn on_document_skipped(&self, name: &str) {
        self.bar.println(format!("  {} {}  {}", dim("·"), name, dim("up to date")));
        self.bar.inc(1);
    }

    fn on_document_start(&self, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, name: &str, title: &str) {
        self.bar
            .println(format!("  {} {}  {}", green("✓"), name, dim(title)));
        self.bar.inc(1);
    }

    fn on_document_error(&self, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!("  {} {}  {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_build_complete(&self, total_documents: usize, generated: usize) {
        self.bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} of {} document(s) regenerated",
                green("✔"),
                bold(&generated.to_string()),
                total_documents
            );
        } else {
            eprintln!(
                "{} {} regenerated, {} failed",
                cyan("⚠"),
                bold(&generated.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render every changed journal to HTML
  journal journals -o output --templates styles

  # LaTeX output (remote images are downloaded into output/savedimages)
  journal journals -o output --latex

  # Rebuild one journal even if it is up to date
  journal journals -o output --only Report.fsx --overwrite

  # Stop at the first journal that fails to evaluate
  journal journals -o output --abort-on-error

  # Machine-readable summary
  journal journals -o output --json > build.json

LAYOUT:
  <ROOT>/*.fsx, <ROOT>/*.md      sources (flat; build.* is ignored)
  <OUTPUT>/styles/template.html  must contain {document}, {tooltips}, {page-title}
  <OUTPUT>/styles/template.tex   must contain {contents}, {tooltips}, {page-title}
  <OUTPUT>/<name>.html | .tex    one page per source
  <OUTPUT>/index.html            synthesised when there is no single entry page

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. journal_builder=debug)
  JOURNAL_OUTPUT          Output directory
  JOURNAL_TEMPLATES       Template asset directory copied into <OUTPUT>/styles
"#;

/// Render literate scripts and Markdown journals to HTML or LaTeX.
#[derive(Parser, Debug)]
#[command(
    name = "journal",
    version,
    about = "Render literate scripts and Markdown journals to HTML or LaTeX",
    long_about = "Render every F# literate script (.fsx) and Markdown document (.md) in a \
directory through a page template. Only documents whose source changed since the last run \
are regenerated; the run ends by picking or writing an entry page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the journal sources.
    root: PathBuf,

    /// Output directory for rendered pages.
    #[arg(short, long, env = "JOURNAL_OUTPUT")]
    output: PathBuf,

    /// Render LaTeX (.tex) instead of HTML.
    #[arg(long, env = "JOURNAL_LATEX")]
    latex: bool,

    /// Float format handed to the evaluator.
    #[arg(long, env = "JOURNAL_FLOAT_FORMAT", default_value = "G4")]
    float_format: String,

    /// Template asset directory mirrored into <OUTPUT>/styles (never overwrites).
    #[arg(long, env = "JOURNAL_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Only process these file names (repeatable).
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,

    /// Regenerate every document regardless of timestamps.
    #[arg(long, env = "JOURNAL_OVERWRITE")]
    overwrite: bool,

    /// Stop the run when a document fails to parse or evaluate.
    #[arg(long, env = "JOURNAL_ABORT_ON_ERROR")]
    abort_on_error: bool,

    /// Heading of a synthesised index page.
    #[arg(long, env = "JOURNAL_LANDING_TITLE", default_value = "FsLab Journals")]
    landing_title: String,

    /// HTTP download timeout in seconds for remote images.
    #[arg(long, env = "JOURNAL_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Output structured JSON (BuildOutput) on stdout.
    #[arg(long, env = "JOURNAL_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "JOURNAL_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "JOURNAL_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "JOURNAL_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Build context ────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn BuildProgressCallback>)
    } else {
        None
    };

    let ctx = build_context(&cli, progress_cb)?;

    // ── Run build ────────────────────────────────────────────────────────
    let output = build(&ctx).await.context("Build failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} generated  {} up to date  {} failed  {}ms  →  {}",
            if stats.failed == 0 { green("✔") } else { cyan("⚠") },
            stats.generated,
            stats.skipped,
            stats.failed,
            stats.total_duration_ms,
            bold(&ctx.output.join(&output.default_file).display().to_string()),
        );
        if stats.assets_copied > 0 {
            eprintln!(
                "   {}",
                dim(&format!("{} style file(s) copied", stats.assets_copied))
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ProcessingContext`.
fn build_context(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ProcessingContext> {
    let mut builder = ProcessingContext::builder(&cli.root, &cli.output)
        .output_kind(if cli.latex {
            OutputKind::Latex
        } else {
            OutputKind::Html
        })
        .float_format(&cli.float_format)
        .overwrite(cli.overwrite)
        .error_policy(if cli.abort_on_error {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::Ignore
        })
        .landing_title(&cli.landing_title)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref dir) = cli.templates {
        builder = builder.template_location(dir);
    }
    if !cli.only.is_empty() {
        builder = builder.whitelist(cli.only.iter().cloned());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
