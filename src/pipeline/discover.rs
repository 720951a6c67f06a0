//! Source discovery, whitelist filtering and staleness checks.

use crate::config::ProcessingContext;
use crate::error::JournalError;
use crate::model::SourceKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Stem of the build script that lives next to the journals.
const BUILD_SCRIPT_STEM: &str = "build";

/// `true` for `.fsx`/`.md` files other than the build script.
pub fn is_source_file(path: &Path) -> bool {
    if SourceKind::from_path(path).is_none() {
        return false;
    }
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => !stem.eq_ignore_ascii_case(BUILD_SCRIPT_STEM),
        None => false,
    }
}

/// File name component of `path` as UTF-8, lossily.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<stem>.html`, whatever the output kind.
pub fn output_file_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{stem}.html")
}

/// List source documents directly under `ctx.root`, sorted by path.
///
/// The whitelist is applied here as a suffix match on the full path.
pub async fn discover_documents(ctx: &ProcessingContext) -> Result<Vec<PathBuf>, JournalError> {
    let root = &ctx.root;
    let not_found = || JournalError::SourceRootNotFound { path: root.clone() };

    let meta = tokio::fs::metadata(root).await.map_err(|_| not_found())?;
    if !meta.is_dir() {
        return Err(not_found());
    }

    let mut entries = tokio::fs::read_dir(root).await.map_err(|_| not_found())?;
    let mut found = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| JournalError::Internal(format!("reading '{}': {e}", root.display())))?
    {
        let path = entry.path();
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file && is_source_file(&path) && ctx.path_matches_whitelist(&path) {
            found.push(path);
        }
    }
    found.sort();
    debug!("Discovered {} document(s) in {}", found.len(), root.display());
    Ok(found)
}

/// Documents whose file name exactly matches a whitelist entry.
pub fn eligible(ctx: &ProcessingContext, discovered: &[PathBuf]) -> Vec<PathBuf> {
    discovered
        .iter()
        .filter(|p| ctx.is_whitelisted(&file_name(p)))
        .cloned()
        .collect()
}

/// Last-modified time, or the epoch when the file is missing or unreadable.
pub async fn modified_or_epoch(path: &Path) -> SystemTime {
    match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => SystemTime::UNIX_EPOCH,
    }
}

/// Whether `source` must be regenerated into `output`.
pub async fn is_stale(source: &Path, output: &Path, overwrite: bool) -> bool {
    if overwrite {
        return true;
    }
    modified_or_epoch(source).await > modified_or_epoch(output).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn touch(path: &Path, at: SystemTime) {
        fs::write(path, "x").unwrap();
        fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(at)
            .unwrap();
    }

    fn ctx(root: &Path) -> ProcessingContext {
        ProcessingContext::builder(root, root.join("out")).build().unwrap()
    }

    #[test]
    fn source_file_rules() {
        assert!(is_source_file(Path::new("a/Report.fsx")));
        assert!(is_source_file(Path::new("notes.MD")));
        assert!(!is_source_file(Path::new("build.fsx")));
        assert!(!is_source_file(Path::new("BUILD.md")));
        assert!(is_source_file(Path::new("building.fsx")));
        assert!(!is_source_file(Path::new("style.css")));
        assert!(!is_source_file(Path::new("README")));
    }

    #[test]
    fn output_name_is_always_html() {
        assert_eq!(output_file_name(Path::new("src/Report.fsx")), "Report.html");
        assert_eq!(output_file_name(Path::new("notes.md")), "notes.html");
    }

    #[tokio::test]
    async fn discovers_flat_sorted_without_build_script() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.md", "a.fsx", "build.fsx", "style.css"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/nested.md"), "").unwrap();

        let found = discover_documents(&ctx(dir.path())).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["a.fsx", "b.md"]);
    }

    #[tokio::test]
    async fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_documents(&ctx(&dir.path().join("missing")))
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::SourceRootNotFound { .. }));
    }

    #[tokio::test]
    async fn whitelist_applied_at_both_stages() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Report.fsx", "MyReport.fsx", "Other.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let ctx = ctx(dir.path()).with_whitelist(["Report.fsx"]);

        let found = discover_documents(&ctx).await.unwrap();
        let names: Vec<_> = found.iter().map(|p| file_name(p)).collect();
        assert_eq!(names, vec!["MyReport.fsx", "Report.fsx"]);

        let kept: Vec<_> = eligible(&ctx, &found).iter().map(|p| file_name(p)).collect();
        assert_eq!(kept, vec!["Report.fsx"]);
    }

    #[tokio::test]
    async fn staleness_follows_modification_times() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("Report.fsx");
        let out = dir.path().join("Report.html");
        let t = SystemTime::now() - Duration::from_secs(3600);

        touch(&src, t);
        assert!(is_stale(&src, &out, false).await, "missing output regenerates");

        touch(&out, t + Duration::from_secs(60));
        assert!(!is_stale(&src, &out, false).await);
        assert!(is_stale(&src, &out, true).await);

        touch(&src, t + Duration::from_secs(120));
        assert!(is_stale(&src, &out, false).await);

        touch(&out, t + Duration::from_secs(120));
        assert!(!is_stale(&src, &out, false).await, "equal times are fresh");
    }
}
