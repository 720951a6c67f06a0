//! End-to-end tests for journal-builder.
//!
//! Every test builds a small journal directory in a temp dir and runs the
//! full pipeline with a stub evaluator. No network access is needed.

use journal_builder::{
    build, build_sync, BuildProgressCallback, DocumentError, DocumentOutcome, ErrorPolicy,
    Evaluation, EvaluationOptions, Evaluator, GeneratedEntry, JournalError, OutputKind, Paragraph,
    ProcessingContext, Snippet,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

// ── Test helpers ─────────────────────────────────────────────────────────────

const HTML_TEMPLATE: &str =
    "<html><head><title>{page-title}</title></head><body>{document}{tooltips}</body></html>\n";
const TEX_TEMPLATE: &str =
    "\\documentclass{article}\n\\title{{page-title}}\n\\begin{document}\n{contents}\\end{document}\n";

/// Echoes each snippet as a code block with an `// evaluated` marker and
/// fails any snippet containing `failwith`.
struct StubEvaluator;

impl Evaluator for StubEvaluator {
    fn evaluate(
        &self,
        snippet: &Snippet,
        _options: &EvaluationOptions,
    ) -> Result<Evaluation, String> {
        if snippet.code.contains("failwith") {
            return Err("boom".into());
        }
        Ok(Evaluation {
            paragraphs: vec![Paragraph::CodeBlock {
                code: format!("{}\n// evaluated", snippet.code),
                language: Some("fsharp".into()),
            }],
            tooltips: format!("<div class=\"tip\" id=\"fs{}\"></div>", snippet.index + 1),
        })
    }
}

struct Journal {
    _dir: tempfile::TempDir,
    root: PathBuf,
    output: PathBuf,
    templates: PathBuf,
}

impl Journal {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("journals");
        let output = dir.path().join("output");
        let templates = dir.path().join("templates");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("template.html"), HTML_TEMPLATE).unwrap();
        fs::write(templates.join("template.tex"), TEX_TEMPLATE).unwrap();
        fs::write(templates.join("style.css"), "body { margin: 0 }").unwrap();
        Self {
            _dir: dir,
            root,
            output,
            templates,
        }
    }

    fn source(&self, name: &str, text: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn context(&self) -> ProcessingContext {
        ProcessingContext::builder(&self.root, &self.output)
            .template_location(&self.templates)
            .evaluator(Arc::new(StubEvaluator))
            .build()
            .unwrap()
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.output.join(name)).unwrap()
    }
}

fn report_script() -> &'static str {
    "(**\n# Report Title\nSales went **up**.\n*)\nlet total = 42\n"
}

fn set_mtime(path: &Path, at: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(at)
        .unwrap();
}

fn entry(file: &str, title: &str) -> GeneratedEntry {
    GeneratedEntry {
        file_name: file.into(),
        title: title.into(),
    }
}

// ── Pipeline ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_with_build_script() {
    let j = Journal::new();
    j.source("Report.fsx", report_script());
    j.source("build.fsx", "(** # Not a journal *)\nlet target = \"all\"\n");

    let out = build(&j.context()).await.unwrap();

    assert_eq!(out.entries, vec![entry("Report.html", "Report Title")]);
    assert_eq!(out.default_file, "Report.html");
    assert_eq!(out.stats.discovered, 1);
    assert_eq!(out.stats.generated, 1);
    assert!(!j.output.join("build.html").exists());
    assert!(!j.output.join("index.html").exists());

    let page = j.read("Report.html");
    assert!(page.contains("<title>Report Title</title>"), "got {page}");
    assert!(page.contains("<h1>Report Title</h1>"));
    assert!(page.contains("Sales went <strong>up</strong>."));
    assert!(page.contains("// evaluated"));
    assert!(page.contains("<div class=\"tip\" id=\"fs1\"></div>"));

    assert!(j.output.join("styles/template.html").exists());
    assert!(j.output.join("styles/style.css").exists());
}

#[tokio::test]
async fn second_run_is_idempotent() {
    let j = Journal::new();
    j.source("Report.fsx", report_script());
    let ctx = j.context();

    build(&ctx).await.unwrap();
    let first = j.read("Report.html");
    let first_mtime = fs::metadata(j.output.join("Report.html"))
        .unwrap()
        .modified()
        .unwrap();

    let out = build(&ctx).await.unwrap();
    assert!(out.entries.is_empty());
    assert_eq!(out.stats.generated, 0);
    assert_eq!(out.stats.skipped, 1);
    assert_eq!(out.stats.assets_copied, 0);
    assert_eq!(
        out.outcomes,
        vec![DocumentOutcome::Skipped {
            name: "Report.fsx".into()
        }]
    );
    assert_eq!(out.default_file, "Report.html");

    assert_eq!(j.read("Report.html"), first);
    let second_mtime = fs::metadata(j.output.join("Report.html"))
        .unwrap()
        .modified()
        .unwrap();
    assert_eq!(first_mtime, second_mtime);
}

#[tokio::test]
async fn newer_source_or_overwrite_regenerates() {
    let j = Journal::new();
    let src = j.source("Report.fsx", report_script());
    let ctx = j.context();
    build(&ctx).await.unwrap();

    let out = build(&ctx.with_overwrite(true)).await.unwrap();
    assert_eq!(out.stats.generated, 1);

    set_mtime(&src, SystemTime::now() + Duration::from_secs(60));
    let out = build(&ctx).await.unwrap();
    assert_eq!(out.entries, vec![entry("Report.html", "Report Title")]);
}

#[tokio::test]
async fn customised_styles_survive_rebuilds() {
    let j = Journal::new();
    j.source("Report.fsx", report_script());
    let ctx = j.context();
    build(&ctx).await.unwrap();

    fs::write(
        j.output.join("styles/template.html"),
        "CUSTOM {page-title} {document}",
    )
    .unwrap();
    build(&ctx.with_overwrite(true)).await.unwrap();

    assert!(j.read("Report.html").starts_with("CUSTOM Report Title "));
}

// ── Landing page ────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_documents_get_a_synthesized_index() {
    let j = Journal::new();
    j.source("A.md", "# Doc A\n\nFirst.\n");
    j.source("B.md", "# Doc B\n\nSecond.\n");

    let out = build(&j.context()).await.unwrap();

    assert_eq!(
        out.entries,
        vec![entry("A.html", "Doc A"), entry("B.html", "Doc B")]
    );
    assert_eq!(out.default_file, "index.html");

    let index = j.read("index.html");
    assert!(index.contains("<title>FsLab Journals</title>"), "got {index}");
    assert!(index.contains("<a href=\"A.html\">Doc A</a>"));
    assert!(index.contains("<a href=\"B.html\">Doc B</a>"));
}

#[tokio::test]
async fn index_source_becomes_entry_page() {
    let j = Journal::new();
    j.source("A.md", "# Doc A\n");
    j.source("index.fsx", "(** # Home *)\nlet x = 1\n");

    let out = build(&j.context()).await.unwrap();

    assert_eq!(out.default_file, "index.html");
    let index = j.read("index.html");
    assert!(index.contains("<title>Home</title>"), "got {index}");
    assert!(!index.contains("FsLab Journals"));
}

#[tokio::test]
async fn no_documents_is_fatal() {
    let j = Journal::new();
    j.source("build.fsx", "let target = 1\n");
    fs::write(j.root.join("notes.txt"), "not a journal").unwrap();

    let err = build(&j.context()).await.unwrap_err();
    assert!(matches!(err, JournalError::NoDocuments { .. }), "got {err:?}");
}

#[tokio::test]
async fn missing_source_root_is_fatal() {
    let j = Journal::new();
    let ctx = ProcessingContext::builder(j.root.join("nope"), &j.output)
        .template_location(&j.templates)
        .build()
        .unwrap();
    let err = build(&ctx).await.unwrap_err();
    assert!(matches!(err, JournalError::SourceRootNotFound { .. }));
}

// ── Whitelist ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn whitelist_restricts_processing() {
    let j = Journal::new();
    j.source("A.md", "# Doc A\n");
    j.source("B.md", "# Doc B\n");
    j.source("AB.md", "# Doc AB\n");

    let out = build(&j.context().with_whitelist(["B.md"])).await.unwrap();

    assert_eq!(out.stats.discovered, 2, "suffix match keeps AB.md");
    assert_eq!(out.stats.eligible, 1, "exact match drops AB.md");
    assert_eq!(out.entries, vec![entry("B.html", "Doc B")]);
    assert_eq!(out.default_file, "B.html");
    assert!(!j.output.join("A.html").exists());
    assert!(!j.output.join("AB.html").exists());
}

// ── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_document_is_ignored_by_default() {
    let j = Journal::new();
    j.source("Good.md", "# Good\n");
    j.source("Broken.fsx", "(** # Broken *)\nfailwith \"no\"\n");

    let out = build(&j.context()).await.unwrap();

    assert_eq!(out.entries, vec![entry("Good.html", "Good")]);
    assert_eq!(out.stats.failed, 1);
    assert!(!j.output.join("Broken.html").exists());
    match &out.outcomes[0] {
        DocumentOutcome::Failed { name, error } => {
            assert_eq!(name, "Broken.fsx");
            assert!(
                matches!(error, DocumentError::Evaluation { snippet: 0, .. }),
                "got {error:?}"
            );
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_document_aborts_when_asked() {
    let j = Journal::new();
    j.source("Broken.fsx", "failwith \"no\"\n");
    j.source("Good.md", "# Good\n");

    let ctx = ProcessingContext {
        error_policy: ErrorPolicy::Abort,
        ..j.context()
    };
    let err = build(&ctx).await.unwrap_err();

    match err {
        JournalError::DocumentFailed { name, .. } => assert_eq!(name, "Broken.fsx"),
        other => panic!("expected DocumentFailed, got {other:?}"),
    }
    assert!(!j.output.join("Good.html").exists(), "run stopped at Broken.fsx");
}

#[tokio::test]
async fn missing_template_is_fatal() {
    let j = Journal::new();
    j.source("Report.fsx", report_script());
    let ctx = ProcessingContext::builder(&j.root, &j.output)
        .evaluator(Arc::new(StubEvaluator))
        .build()
        .unwrap();

    let err = build(&ctx).await.unwrap_err();
    assert!(matches!(err, JournalError::TemplateNotFound { .. }), "got {err:?}");
}

// ── LaTeX ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn latex_writes_tex_without_title_heading() {
    let j = Journal::new();
    j.source(
        "Report.md",
        "# Report Title\n\nCosts rose 5% in Q1.\n\n![chart][c]\n\n[c]: figures/chart.png\n",
    );
    let ctx = j.context().with_output_kind(OutputKind::Latex);

    let out = build(&ctx).await.unwrap();

    assert_eq!(out.entries, vec![entry("Report.html", "Report Title")]);
    assert!(!j.output.join("Report.html").exists());
    let tex = j.read("Report.tex");
    assert!(tex.contains("\\title{Report Title}"), "got {tex}");
    assert!(!tex.contains("\\section*{Report Title}"));
    assert!(tex.contains("Costs rose 5\\% in Q1."));
    assert!(tex.contains("\\includegraphics{figures/chart.png}"));
    assert!(!j.output.join("savedimages").exists());

    let again = build(&ctx).await.unwrap();
    assert_eq!(again.stats.skipped, 1, "staleness checks the .tex file");
}

// ── Callbacks and sync API ───────────────────────────────────────────────────

#[derive(Default)]
struct Counting {
    started: AtomicUsize,
    skipped: AtomicUsize,
    completed: AtomicUsize,
    errors: AtomicUsize,
    finished: AtomicUsize,
}

impl BuildProgressCallback for Counting {
    fn on_build_start(&self, total_documents: usize) {
        self.started.store(total_documents, Ordering::SeqCst);
    }
    fn on_document_skipped(&self, _name: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
    }
    fn on_document_complete(&self, _name: &str, _title: &str) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
    fn on_document_error(&self, _name: &str, _error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
    fn on_build_complete(&self, _total: usize, generated: usize) {
        self.finished.store(generated, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn progress_callback_sees_every_document() {
    let j = Journal::new();
    j.source("A.md", "# Doc A\n");
    j.source("B.fsx", "failwith \"x\"\n");
    let counter = Arc::new(Counting::default());
    let ctx = ProcessingContext {
        progress_callback: Some(counter.clone() as Arc<dyn BuildProgressCallback>),
        ..j.context()
    };

    build(&ctx).await.unwrap();
    assert_eq!(counter.started.load(Ordering::SeqCst), 2);
    assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
    assert_eq!(counter.errors.load(Ordering::SeqCst), 1);
    assert_eq!(counter.finished.load(Ordering::SeqCst), 1);

    build(&ctx).await.unwrap();
    assert_eq!(counter.skipped.load(Ordering::SeqCst), 1);
}

#[test]
fn build_sync_runs_without_a_runtime() {
    let j = Journal::new();
    j.source("Report.fsx", report_script());

    let out = build_sync(&j.context()).unwrap();
    assert_eq!(out.default_file, "Report.html");

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["entries"][0]["title"], "Report Title");
    assert_eq!(json["outcomes"][0]["status"], "generated");
}
