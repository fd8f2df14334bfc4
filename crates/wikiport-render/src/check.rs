//! Check-only pass.
//!
//! Renders every page through a no-op dialect purely to surface warnings
//! (unresolved links, unsupported directives, misplaced map markers).
//! Writes no files and copies nothing.

use wikiport_site::Site;

use crate::element::LinkTarget;
use crate::renderer::{Dialect, LineContext};
use crate::writer::{SiteWriter, WriteError, WriteSummary, render_page};

struct CheckDialect;

impl Dialect for CheckDialect {
    fn text_span(&self, _ctx: &LineContext<'_>, _text: &str) -> String {
        String::new()
    }

    fn image(
        &self,
        _ctx: &LineContext<'_>,
        _target: Option<&str>,
        _filename: &str,
        _alt: &str,
    ) -> String {
        String::new()
    }

    fn link(&self, _ctx: &LineContext<'_>, _text: &str, _target: &LinkTarget) -> String {
        String::new()
    }

    fn directive(&self, _ctx: &LineContext<'_>, _raw: &str) -> String {
        String::new()
    }
}

/// Scans a site for convertibility problems without writing output.
#[derive(Default)]
pub struct CheckWriter;

impl CheckWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SiteWriter for CheckWriter {
    fn write(&self, site: &Site) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();

        for page in site.pages.values() {
            let renderer = render_page(site, page, CheckDialect);
            summary.warnings += renderer.warnings().len();
            summary.pages += 1;
        }
        summary.statics = site.statics.len();

        tracing::info!(
            pages = summary.pages,
            statics = summary.statics,
            warnings = summary.warnings,
            "check completed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn load_site(files: &[(&str, &str)]) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        for (relpath, content) in files {
            let path = dir.path().join(relpath);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, content).unwrap();
        }
        let mut site = Site::new(dir.path());
        site.load().unwrap();
        (dir, site)
    }

    #[test]
    fn test_counts_and_warnings() {
        let (_src, site) = load_site(&[
            (
                "2019/post.mdwn",
                "see [[broken/target]]\nand [[!toc levels=2]]\n",
            ),
            ("2019/fine.mdwn", "just text\n"),
            ("2019/img/photo.png", "\u{89}PNG"),
        ]);

        let summary = CheckWriter::new().write(&site).unwrap();
        assert_eq!(summary.pages, 2);
        assert_eq!(summary.statics, 1);
        // One unresolved link, one unsupported directive.
        assert_eq!(summary.warnings, 2);
    }

    #[test]
    fn test_writes_nothing() {
        let (_src, site) = load_site(&[("2019/post.mdwn", "text\n")]);

        let before: Vec<_> = fs::read_dir(site.root.join("2019")).unwrap().collect();
        CheckWriter::new().write(&site).unwrap();
        let after: Vec<_> = fs::read_dir(site.root.join("2019")).unwrap().collect();
        assert_eq!(before.len(), after.len());
    }
}
