//! Image localisation: fetch remote images and point the document at the
//! local copies.
//!
//! LaTeX cannot include images over HTTP, so before a LaTeX page is rendered
//! every image span (direct, or indirect through the reference table) is
//! rewritten into a direct image whose URL is produced by a *saver*. The
//! network-backed saver is [`ImageStore`]: remote URLs are downloaded to
//! `<output>/savedimages/saved<N><ext>` with `N` counting from 1 per
//! document; anything that does not start with `http` is treated as already
//! local and returned unchanged.
//!
//! Downloads are async while span rewriting is a plain function, so the
//! store first fetches every remote URL found in the tree and the rewrite
//! then looks the results up.

use crate::error::JournalError;
use crate::model::{LinkTable, Paragraph, Span};
use crate::pipeline::walk::{for_each_span, try_map_spans};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sub-folder of the output directory holding downloaded images.
pub const SAVED_IMAGES_DIR: &str = "savedimages";

/// URLs the saver downloads rather than passing through.
pub fn is_remote(url: &str) -> bool {
    url.starts_with("http")
}

/// Rewrite every image span into a direct image at `saver(url)`.
///
/// Indirect images whose key is not in `links` are left as they are.
pub fn localize_images<F, E>(
    links: &LinkTable,
    paragraphs: Vec<Paragraph>,
    saver: &mut F,
) -> Result<Vec<Paragraph>, E>
where
    F: FnMut(&str) -> Result<String, E>,
{
    try_map_spans(paragraphs, &mut |span: Span| match span {
        Span::DirectImage { alt, url, title } => Ok(Span::DirectImage {
            alt,
            url: saver(&url)?,
            title,
        }),
        Span::IndirectImage { alt, original, key } => match links.get(&key) {
            Some(def) => Ok(Span::DirectImage {
                alt,
                url: saver(&def.url)?,
                title: def.title.clone(),
            }),
            None => Ok(Span::IndirectImage { alt, original, key }),
        },
        other => Ok(other),
    })
}

/// Remote image URLs in document order, without duplicates.
pub fn remote_image_urls(links: &LinkTable, paragraphs: &[Paragraph]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for_each_span(paragraphs, &mut |span: &Span| {
        let url = match span {
            Span::DirectImage { url, .. } => Some(url.as_str()),
            Span::IndirectImage { key, .. } => links.get(key).map(|d| d.url.as_str()),
            _ => None,
        };
        if let Some(url) = url {
            if is_remote(url) && !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
            }
        }
    });
    urls
}

/// Extension (with the dot) of the last path segment of `url`, or `""`.
pub fn url_extension(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|last| Path::new(last).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Downloads remote images for one document.
///
/// The counter and the URL → file mapping live only as long as the store;
/// create one store per rendered document.
pub struct ImageStore {
    dir: PathBuf,
    counter: usize,
    saved: HashMap<String, String>,
    timeout_secs: u64,
}

impl ImageStore {
    pub fn new(output: &Path, timeout_secs: u64) -> Self {
        Self {
            dir: output.join(SAVED_IMAGES_DIR),
            counter: 0,
            saved: HashMap::new(),
            timeout_secs,
        }
    }

    /// Download every remote image of `paragraphs` and rewrite the tree to
    /// point at the local copies.
    pub async fn localize(
        &mut self,
        document: &str,
        links: &LinkTable,
        paragraphs: Vec<Paragraph>,
    ) -> Result<Vec<Paragraph>, JournalError> {
        let urls = remote_image_urls(links, &paragraphs);
        if !urls.is_empty() {
            info!("{}: downloading {} image(s)", document, urls.len());
            self.fetch_all(document, &urls).await?;
        }
        localize_images(links, paragraphs, &mut |url: &str| self.lookup(url))
    }

    /// Local relative path for `url`; non-remote URLs pass through.
    pub fn lookup(&self, url: &str) -> Result<String, JournalError> {
        if !is_remote(url) {
            return Ok(url.to_string());
        }
        self.saved
            .get(url)
            .cloned()
            .ok_or_else(|| JournalError::Internal(format!("image '{url}' was not fetched")))
    }

    async fn fetch_all(&mut self, document: &str, urls: &[String]) -> Result<(), JournalError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| JournalError::Internal(format!("HTTP client: {e}")))?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| JournalError::DirectoryCreateFailed {
                path: self.dir.clone(),
                source: e,
            })?;

        for url in urls {
            if self.saved.contains_key(url) {
                continue;
            }
            let parsed = reqwest::Url::parse(url).map_err(|e| JournalError::InvalidImageUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            let file_name = self.next_file_name(&parsed);
            let path = self.dir.join(&file_name);
            download(&client, document, url, &path).await?;
            self.saved
                .insert(url.clone(), format!("{SAVED_IMAGES_DIR}/{file_name}"));
        }
        Ok(())
    }

    fn next_file_name(&mut self, url: &reqwest::Url) -> String {
        self.counter += 1;
        format!("saved{}{}", self.counter, url_extension(url))
    }
}

async fn download(
    client: &reqwest::Client,
    document: &str,
    url: &str,
    path: &Path,
) -> Result<(), JournalError> {
    let failed = |reason: String| JournalError::ImageDownloadFailed {
        document: document.to_string(),
        url: url.to_string(),
        reason,
    };

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            failed("timed out".into())
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    tokio::fs::write(path, &bytes)
        .await
        .map_err(|e| JournalError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Saved {} → {} ({} bytes)", url, path.display(), bytes.len());
    Ok(())
}
