//! Whole-site writing.
//!
//! A [`SiteWriter`] drives one dialect over every page and static asset of
//! a loaded site. Shared plumbing lives here: the segment-then-render pass,
//! parent directory creation, and byte-for-byte static copies that preserve
//! the source modification time.

use std::fs;
use std::io;
use std::path::Path;

use wikiport_site::{Page, Site, Static};

use crate::renderer::{BodyRenderer, Dialect};
use crate::segment::segment;

/// Error type for output writing.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("{0}")]
    Io(#[from] io::Error),

    /// Front matter serialization failure.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Counters reported by a writer run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Pages rendered (written, or scanned by the check pass).
    pub pages: usize,
    /// Pages skipped because their rendered body was empty.
    pub pages_skipped: usize,
    /// Static assets copied (or counted by the check pass).
    pub statics: usize,
    /// Recoverable conditions surfaced while rendering.
    pub warnings: usize,
}

/// One output format driven over a whole site.
pub trait SiteWriter {
    /// Convert every page and static asset of `site`.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError`] on the first I/O or serialization failure;
    /// recoverable conditions only surface as warnings in the summary.
    fn write(&self, site: &Site) -> Result<WriteSummary, WriteError>;
}

/// Run the full segment-and-render pass for one page.
pub(crate) fn render_page<'a, D: Dialect>(
    site: &Site,
    page: &'a Page,
    dialect: D,
) -> BodyRenderer<'a, D> {
    let mut warnings = Vec::new();
    let lines = segment(site, page, &mut warnings);
    let mut renderer = BodyRenderer::new(dialect, page);
    renderer.warnings = warnings;
    renderer.render(&lines);
    renderer
}

/// Create the parent directories of an output path.
pub(crate) fn ensure_parent(dst: &Path) -> io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Copy one static asset byte-for-byte, preserving the source mtime.
pub(crate) fn copy_static(site: &Site, asset: &Static, dst_root: &Path) -> io::Result<()> {
    let src = site.root.join(&asset.relpath);
    let dst = dst_root.join(&asset.relpath);
    tracing::info!(src = %asset.relpath, dst = %dst.display(), "copying static file");

    ensure_parent(&dst)?;
    fs::copy(&src, &dst)?;

    let mtime = fs::metadata(&src)?.modified()?;
    fs::File::options()
        .write(true)
        .open(&dst)?
        .set_modified(mtime)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_copy_static_preserves_bytes_and_mtime() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(src_dir.path().join("2019/img")).unwrap();
        let src = src_dir.path().join("2019/img/photo.png");
        fs::write(&src, b"\x89PNG fake bytes").unwrap();

        // Backdate the source so preservation is observable.
        let old = SystemTime::now() - Duration::from_secs(86_400);
        fs::File::options()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let site = Site::new(src_dir.path());
        let asset = Static::new("2019/img/photo.png".to_owned(), None);
        copy_static(&site, &asset, dst_dir.path()).unwrap();

        let dst = dst_dir.path().join("2019/img/photo.png");
        assert_eq!(fs::read(&dst).unwrap(), b"\x89PNG fake bytes");

        let src_mtime = fs::metadata(&src).unwrap().modified().unwrap();
        let dst_mtime = fs::metadata(&dst).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dst_mtime);
    }

    #[test]
    fn test_copy_static_without_ctime() {
        // Scenario: asset with no ctime anywhere still copies fine.
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(src_dir.path().join("img")).unwrap();
        fs::write(src_dir.path().join("img/photo.png"), b"bytes").unwrap();

        let site = Site::new(src_dir.path());
        let asset = Static::new("img/photo.png".to_owned(), None);
        assert!(asset.ctime.is_none());

        copy_static(&site, &asset, dst_dir.path()).unwrap();
        assert_eq!(
            fs::read(dst_dir.path().join("img/photo.png")).unwrap(),
            b"bytes"
        );
    }
}
