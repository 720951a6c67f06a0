//! Build entry points: turn a journal directory into rendered pages.
//!
//! A run walks the eligible documents strictly one after another. Each one
//! is either skipped (its output is newer than the source), regenerated, or
//! recorded as failed; the [`ErrorPolicy`] decides whether a failure ends the
//! run. The landing page is chosen only after every document has finished.

use crate::config::{ErrorPolicy, ProcessingContext};
use crate::error::JournalError;
use crate::eval::{EvaluationOptions, Evaluator};
use crate::model::SourceKind;
use crate::output::{BuildOutput, BuildStats, DocumentOutcome, GeneratedEntry};
use crate::parse;
use crate::pipeline::discover::{self, file_name, output_file_name};
use crate::pipeline::walk::extract_title;
use crate::pipeline::{landing, sync, template};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Title used when a document has no level-1 heading.
pub const UNTITLED: &str = "Untitled";

/// Build every stale document under `ctx.root` and choose the entry page.
///
/// # Errors
/// Returns `Err(JournalError)` only for fatal errors:
/// - source root missing, or no documents found
/// - template missing, output not writable, image download failed
/// - a document failed and the policy is [`ErrorPolicy::Abort`]
pub async fn build(ctx: &ProcessingContext) -> Result<BuildOutput, JournalError> {
    let total_start = Instant::now();
    info!(
        "Building journals: {} → {}",
        ctx.root.display(),
        ctx.output.display()
    );

    // ── Step 1: Prepare output tree ──────────────────────────────────────
    let assets_copied = prepare_output(ctx).await?;
    if assets_copied > 0 {
        info!("Copied {} style file(s) into {}", assets_copied, ctx.styles_dir().display());
    }

    // ── Step 2: Discover sources ─────────────────────────────────────────
    let discovered = discover::discover_documents(ctx).await?;
    if discovered.is_empty() {
        return Err(JournalError::NoDocuments {
            root: ctx.root.clone(),
        });
    }
    let eligible = discover::eligible(ctx, &discovered);
    debug!(
        "{} discovered, {} eligible",
        discovered.len(),
        eligible.len()
    );

    if let Some(ref cb) = ctx.progress_callback {
        cb.on_build_start(eligible.len());
    }

    // ── Step 3: Regenerate stale documents ───────────────────────────────
    let outcomes = process_directory(ctx, &eligible).await?;
    let entries: Vec<GeneratedEntry> = outcomes
        .iter()
        .filter_map(|o| match o {
            DocumentOutcome::Generated { name, title, .. } => Some(GeneratedEntry {
                file_name: output_file_name(Path::new(name)),
                title: title.clone(),
            }),
            _ => None,
        })
        .collect();

    // ── Step 4: Landing page ─────────────────────────────────────────────
    let default_file = landing::default_file(ctx, &discovered, &eligible, &entries).await?;

    // ── Step 5: Compute stats ────────────────────────────────────────────
    let skipped = outcomes
        .iter()
        .filter(|o| matches!(o, DocumentOutcome::Skipped { .. }))
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, DocumentOutcome::Failed { .. }))
        .count();
    let stats = BuildStats {
        discovered: discovered.len(),
        eligible: eligible.len(),
        generated: entries.len(),
        skipped,
        failed,
        assets_copied,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Build complete: {} generated, {} up to date, {} failed, entry page {} ({}ms)",
        stats.generated, stats.skipped, stats.failed, default_file, stats.total_duration_ms
    );

    if let Some(ref cb) = ctx.progress_callback {
        cb.on_build_complete(eligible.len(), stats.generated);
    }

    Ok(BuildOutput {
        entries,
        outcomes,
        default_file,
        stats,
    })
}

/// Synchronous wrapper around [`build`].
///
/// Creates a temporary tokio runtime internally.
pub fn build_sync(ctx: &ProcessingContext) -> Result<BuildOutput, JournalError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| JournalError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(build(ctx))
}

/// Process `documents` in order, applying the context's error policy.
pub async fn process_directory(
    ctx: &ProcessingContext,
    documents: &[PathBuf],
) -> Result<Vec<DocumentOutcome>, JournalError> {
    let evaluator = ctx.evaluator();
    let options = EvaluationOptions {
        output_kind: ctx.output_kind,
        float_format: ctx.float_format.clone(),
    };

    let mut outcomes = Vec::with_capacity(documents.len());
    for path in documents {
        let outcome = process_document(ctx, evaluator.as_ref(), &options, path).await?;
        if let DocumentOutcome::Failed { name, error } = &outcome {
            match ctx.error_policy {
                ErrorPolicy::Abort => {
                    return Err(JournalError::DocumentFailed {
                        name: name.clone(),
                        source: error.clone(),
                    })
                }
                ErrorPolicy::Ignore => warn!("Ignoring failed document {}: {}", name, error),
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Skip, regenerate, or fail a single source document.
///
/// Parse and evaluation problems come back as [`DocumentOutcome::Failed`];
/// rendering problems (template, output, images) are fatal.
pub async fn process_document(
    ctx: &ProcessingContext,
    evaluator: &dyn Evaluator,
    options: &EvaluationOptions,
    path: &Path,
) -> Result<DocumentOutcome, JournalError> {
    let name = file_name(path);
    let requested = ctx.output.join(output_file_name(path));
    let target = template::output_path(ctx.output_kind, &requested);

    if !discover::is_stale(path, &target, ctx.overwrite).await {
        debug!("Skipping {}: {} is up to date", name, target.display());
        if let Some(ref cb) = ctx.progress_callback {
            cb.on_document_skipped(&name);
        }
        return Ok(DocumentOutcome::Skipped { name });
    }

    info!("Generating {}", target.display());
    if let Some(ref cb) = ctx.progress_callback {
        cb.on_document_start(&name);
    }

    let kind = SourceKind::from_path(path)
        .ok_or_else(|| JournalError::Internal(format!("not a source document: {}", path.display())))?;

    let document = match parse::parse_file(kind, path, evaluator, options).await {
        Ok(document) => document,
        Err(error) => {
            if let Some(ref cb) = ctx.progress_callback {
                cb.on_document_error(&name, &error.to_string());
            }
            return Ok(DocumentOutcome::Failed { name, error });
        }
    };

    let title = extract_title(&document.paragraphs).unwrap_or_else(|| UNTITLED.to_string());
    let output = template::render_document(ctx, document, &title, &requested).await?;

    if let Some(ref cb) = ctx.progress_callback {
        cb.on_document_complete(&name, &title);
    }
    Ok(DocumentOutcome::Generated {
        name,
        output,
        title,
    })
}

/// Create the output directories and copy template assets.
async fn prepare_output(ctx: &ProcessingContext) -> Result<usize, JournalError> {
    let output = ctx.output.clone();
    let styles = ctx.styles_dir();
    let templates = ctx.template_location.clone();

    tokio::task::spawn_blocking(move || {
        sync::ensure_directory(&output)?;
        sync::ensure_directory(&styles)?;
        match templates {
            Some(source) => sync::copy_files(&source, &styles),
            None => Ok(0),
        }
    })
    .await
    .map_err(|e| JournalError::Internal(format!("Copy task panicked: {}", e)))?
}
