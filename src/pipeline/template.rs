//! Template rendering: place a formatted body into `styles/template.*`.
//!
//! Templates are plain text containing literal tokens. Substitution is a
//! straight substring replace, so a template may repeat a token or omit one.
//! LaTeX pages additionally get their remote images downloaded and their
//! level-1 headings removed, since the template supplies the title itself.

use crate::config::{OutputKind, ProcessingContext};
use crate::error::JournalError;
use crate::format;
use crate::model::Document;
use crate::pipeline::images::ImageStore;
use crate::pipeline::walk::drop_title;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const TOOLTIPS_TOKEN: &str = "{tooltips}";
pub const DOCUMENT_TOKEN: &str = "{document}";
pub const CONTENTS_TOKEN: &str = "{contents}";
pub const PAGE_TITLE_TOKEN: &str = "{page-title}";

/// `<styles>/template.html` or `<styles>/template.tex`.
pub fn template_path(styles_dir: &Path, kind: OutputKind) -> PathBuf {
    styles_dir.join(format!("template.{}", kind.extension()))
}

/// Where a page requested at `requested` is actually written.
///
/// LaTeX output always lands next to it with a `.tex` extension.
pub fn output_path(kind: OutputKind, requested: &Path) -> PathBuf {
    match kind {
        OutputKind::Html => requested.to_path_buf(),
        OutputKind::Latex => requested.with_extension("tex"),
    }
}

/// Read the template for `kind` as raw text.
pub async fn load_template(styles_dir: &Path, kind: OutputKind) -> Result<String, JournalError> {
    let path = template_path(styles_dir, kind);
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(JournalError::TemplateNotFound { path })
        }
        Err(e) => Err(JournalError::TemplateReadFailed { path, source: e }),
    }
}

/// Replace the placeholder tokens of `template`.
///
/// `body` and `tooltips` are inserted as they are; `title` is plain text and
/// gets escaped for `kind`.
pub fn substitute(
    template: &str,
    kind: OutputKind,
    body: &str,
    tooltips: &str,
    title: &str,
) -> String {
    let body_token = match kind {
        OutputKind::Html => DOCUMENT_TOKEN,
        OutputKind::Latex => CONTENTS_TOKEN,
    };
    template
        .replace(TOOLTIPS_TOKEN, tooltips)
        .replace(body_token, body)
        .replace(PAGE_TITLE_TOKEN, &format::escape_text(kind, title))
}

/// Render `document` through the context's template and write it.
///
/// `requested` is the `.html` path chosen by the pipeline; the file actually
/// written is returned.
pub async fn render_document(
    ctx: &ProcessingContext,
    document: Document,
    title: &str,
    requested: &Path,
) -> Result<PathBuf, JournalError> {
    let kind = ctx.output_kind;
    let template = load_template(&ctx.styles_dir(), kind).await?;

    let Document {
        paragraphs,
        links,
        tooltips,
        source_path,
        ..
    } = document;

    let paragraphs = match kind {
        OutputKind::Html => paragraphs,
        OutputKind::Latex => {
            let name = source_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| title.to_string());
            let mut store = ImageStore::new(&ctx.output, ctx.download_timeout_secs);
            let localized = store.localize(&name, &links, paragraphs).await?;
            drop_title(&localized)
        }
    };

    let body = format::render_body(kind, &paragraphs, &links);
    let page = substitute(&template, kind, &body, &tooltips, title);

    let path = output_path(kind, requested);
    write_atomic(&path, &page).await?;
    debug!("Wrote {} ({} bytes)", path.display(), page.len());
    Ok(path)
}

/// Write via a sibling temp file and rename, so readers never see a
/// half-written page.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<(), JournalError> {
    let write_failed = |e: std::io::Error| JournalError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(write_failed)?;
    Ok(())
}
