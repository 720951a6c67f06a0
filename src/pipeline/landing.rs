//! Choosing (and if needed, writing) the entry page of a run.

use crate::config::ProcessingContext;
use crate::error::JournalError;
use crate::model::{Document, ListKind, Paragraph, Span};
use crate::output::GeneratedEntry;
use crate::pipeline::discover::output_file_name;
use crate::pipeline::template;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of a synthesised landing page.
pub const INDEX_FILE: &str = "index.html";

/// Source stems that make a document the entry page.
const DEFAULT_STEMS: [&str; 2] = ["default", "index"];

/// First source whose stem is `default` or `index`, ignoring case.
pub fn find_default_source(sources: &[PathBuf]) -> Option<&PathBuf> {
    sources.iter().find(|p| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| DEFAULT_STEMS.iter().any(|d| stem.eq_ignore_ascii_case(d)))
    })
}

/// Level-1 heading followed by a bulleted list linking every entry.
pub fn synthesize_index(entries: &[GeneratedEntry], heading: &str) -> Document {
    let items = entries
        .iter()
        .map(|entry| {
            vec![Paragraph::Span(vec![Span::DirectLink {
                body: vec![Span::Literal(entry.title.clone())],
                url: entry.file_name.clone(),
                title: None,
            }])]
        })
        .collect();

    Document::synthesized(vec![
        Paragraph::Heading {
            level: 1,
            body: vec![Span::Literal(heading.to_string())],
        },
        Paragraph::List {
            kind: ListKind::Unordered,
            items,
        },
    ])
}

/// Pick the entry page for a run.
///
/// * one page regenerated → that page
/// * nothing regenerated and a single eligible document → its page
/// * a `default`/`index` source among `discovered` → its page
/// * otherwise `index.html` listing `entries`, rendered through the template
///
/// An existing `index.html` is kept when nothing was regenerated and
/// overwrite is off, so an unchanged tree is not rewritten.
pub async fn default_file(
    ctx: &ProcessingContext,
    discovered: &[PathBuf],
    eligible: &[PathBuf],
    entries: &[GeneratedEntry],
) -> Result<String, JournalError> {
    if discovered.is_empty() {
        return Err(JournalError::NoDocuments {
            root: ctx.root.clone(),
        });
    }

    if let [only] = entries {
        return Ok(only.file_name.clone());
    }
    if let ([], [only]) = (entries, eligible) {
        return Ok(output_file_name(only));
    }
    if let Some(source) = find_default_source(discovered) {
        debug!("Using {} as entry page", source.display());
        return Ok(output_file_name(source));
    }

    let index = ctx.output.join(INDEX_FILE);
    if entries.is_empty() && !ctx.overwrite && exists(&template::output_path(ctx.output_kind, &index)).await {
        debug!("Keeping existing {}", INDEX_FILE);
        return Ok(INDEX_FILE.to_string());
    }

    info!("Generating {} ({} entries)", INDEX_FILE, entries.len());
    let document = synthesize_index(entries, &ctx.landing_title);
    template::render_document(ctx, document, &ctx.landing_title, &index).await?;
    Ok(INDEX_FILE.to_string())
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::walk::extract_title;

    fn entry(file: &str, title: &str) -> GeneratedEntry {
        GeneratedEntry {
            file_name: file.into(),
            title: title.into(),
        }
    }

    async fn context(dir: &Path) -> ProcessingContext {
        let styles = dir.join("out/styles");
        tokio::fs::create_dir_all(&styles).await.unwrap();
        tokio::fs::write(styles.join("template.html"), "<h1>{page-title}</h1>{document}")
            .await
            .unwrap();
        ProcessingContext::builder(dir.join("src"), dir.join("out"))
            .build()
            .unwrap()
    }

    #[test]
    fn default_source_matched_case_insensitively() {
        let sources = vec![PathBuf::from("a.fsx"), PathBuf::from("INDEX.md")];
        assert_eq!(find_default_source(&sources), Some(&PathBuf::from("INDEX.md")));
        let sources = vec![PathBuf::from("Default.fsx")];
        assert!(find_default_source(&sources).is_some());
        assert!(find_default_source(&[PathBuf::from("indexer.fsx")]).is_none());
    }

    #[test]
    fn synthesized_index_lists_every_entry() {
        let doc = synthesize_index(&[entry("A.html", "Doc A"), entry("B.html", "Doc B")], "FsLab Journals");
        assert_eq!(extract_title(&doc.paragraphs).as_deref(), Some("FsLab Journals"));
        match &doc.paragraphs[1] {
            Paragraph::List { kind, items } => {
                assert_eq!(*kind, ListKind::Unordered);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_entry_is_the_entry_page() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;
        let discovered = vec![PathBuf::from("A.fsx")];
        let page = default_file(&ctx, &discovered, &discovered, &[entry("A.html", "Doc A")])
            .await
            .unwrap();
        assert_eq!(page, "A.html");
    }

    #[tokio::test]
    async fn two_entries_synthesize_index() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;
        let discovered = vec![PathBuf::from("A.fsx"), PathBuf::from("B.md")];
        let entries = [entry("A.html", "Doc A"), entry("B.html", "Doc B")];

        let page = default_file(&ctx, &discovered, &discovered, &entries).await.unwrap();
        assert_eq!(page, "index.html");

        let html = std::fs::read_to_string(dir.path().join("out/index.html")).unwrap();
        assert!(html.starts_with("<h1>FsLab Journals</h1>"), "got {html}");
        assert!(html.contains("<a href=\"A.html\">Doc A</a>"));
        assert!(html.contains("<a href=\"B.html\">Doc B</a>"));
    }

    #[tokio::test]
    async fn index_source_wins_over_synthesis() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;
        let discovered = vec![PathBuf::from("A.fsx"), PathBuf::from("index.fsx")];
        let entries = [entry("A.html", "Doc A"), entry("index.html", "Home")];

        let page = default_file(&ctx, &discovered, &discovered, &entries).await.unwrap();
        assert_eq!(page, "index.html");
        assert!(!dir.path().join("out/index.html").exists(), "nothing synthesised");
    }

    #[tokio::test]
    async fn existing_index_kept_when_nothing_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;
        let index = dir.path().join("out/index.html");
        std::fs::write(&index, "previous").unwrap();
        let discovered = vec![PathBuf::from("A.fsx"), PathBuf::from("B.md")];

        let page = default_file(&ctx, &discovered, &discovered, &[]).await.unwrap();
        assert_eq!(page, "index.html");
        assert_eq!(std::fs::read_to_string(&index).unwrap(), "previous");
    }

    #[tokio::test]
    async fn no_documents_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path()).await;
        let err = default_file(&ctx, &[], &[], &[]).await.unwrap_err();
        assert!(matches!(err, JournalError::NoDocuments { .. }));
    }
}
