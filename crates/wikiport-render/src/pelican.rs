//! Pelican output dialect.
//!
//! Pages land under `<root>/content/<relpath>.md` with a line-oriented
//! `Key: value` header; links to assets use `{attach}` and links to pages
//! use `{filename}`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::Local;
use wikiport_site::{Page, Site};

use crate::element::LinkTarget;
use crate::renderer::{Dialect, LineContext};
use crate::writer::{SiteWriter, WriteError, WriteSummary, copy_static, ensure_parent, render_page};

struct PelicanDialect;

impl Dialect for PelicanDialect {
    fn code_begin(&self, _ctx: &LineContext<'_>, lang: &str) -> Option<String> {
        Some(format!("```{lang}"))
    }

    fn code_end(&self, _ctx: &LineContext<'_>) -> Option<String> {
        Some("```".to_owned())
    }

    fn text_line(&self, ctx: &LineContext<'_>) -> Option<String> {
        Some(ctx.raw.to_owned())
    }

    fn text_span(&self, _ctx: &LineContext<'_>, text: &str) -> String {
        text.to_owned()
    }

    fn image(
        &self,
        _ctx: &LineContext<'_>,
        target: Option<&str>,
        filename: &str,
        alt: &str,
    ) -> String {
        match target {
            Some(_) => format!("![{alt}]({{attach}}{filename})"),
            None => format!("(missing image: {alt})"),
        }
    }

    fn link(&self, _ctx: &LineContext<'_>, text: &str, target: &LinkTarget) -> String {
        match target {
            LinkTarget::Page(relpath) => format!("[{text}]({{filename}}{relpath}.md)"),
            LinkTarget::Asset(relpath) => format!("[{text}]({{attach}}{relpath})"),
            LinkTarget::Unresolved(_) => text.to_owned(),
        }
    }
}

/// Writes a site as a Pelican content tree.
pub struct PelicanWriter {
    root: PathBuf,
}

impl PelicanWriter {
    /// Create a writer targeting the Pelican site root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write_page(&self, site: &Site, page: &Page, summary: &mut WriteSummary) -> Result<(), WriteError> {
        let renderer = render_page(site, page, PelicanDialect);
        summary.warnings += renderer.warnings().len();
        if renderer.is_empty() {
            summary.pages_skipped += 1;
            return Ok(());
        }

        let dst = self.root.join("content").join(format!("{}.md", page.relpath));
        tracing::info!(page = %page.relpath, dst = %dst.display(), "writing page");
        ensure_parent(&dst)?;

        let mut out = BufWriter::new(fs::File::create(&dst)?);
        if let Some(title) = &page.title {
            writeln!(out, "Title: {title}")?;
        }
        if !page.tags.is_empty() {
            let tags: Vec<&str> = page.tags.iter().map(String::as_str).collect();
            writeln!(out, "Tags: {}", tags.join(", "))?;
        }
        if let Some(date) = page.date {
            let local = date.with_timezone(&Local);
            writeln!(out, "Date: {}", local.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(out)?;
        renderer.write_to(&mut out)?;
        out.flush()?;

        summary.pages += 1;
        Ok(())
    }
}

impl SiteWriter for PelicanWriter {
    fn write(&self, site: &Site) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();

        for page in site.pages.values() {
            self.write_page(site, page, &mut summary)?;
        }

        for asset in site.statics.values() {
            copy_static(site, asset, &self.root.join("content"))?;
            summary.statics += 1;
        }

        Ok(summary)
    }
}
