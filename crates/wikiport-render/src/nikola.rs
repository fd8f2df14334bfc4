//! Nikola output dialect.
//!
//! Pages land under `<root>/<relpath>.md` with an HTML-comment metadata
//! block; code fences become fenced code blocks and the date carries the
//! local timezone offset.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Local, Offset, Utc};
use wikiport_site::{Page, Site};

use crate::element::LinkTarget;
use crate::renderer::{Dialect, LineContext};
use crate::writer::{SiteWriter, WriteError, WriteSummary, copy_static, ensure_parent, render_page};

struct NikolaDialect;

impl Dialect for NikolaDialect {
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
            Some(_) => format!("![{alt}]({filename})"),
            None => format!("(missing image: {alt})"),
        }
    }

    fn link(&self, _ctx: &LineContext<'_>, text: &str, target: &LinkTarget) -> String {
        match target {
            LinkTarget::Page(relpath) => format!("[{text}]({{{{< relref \"{relpath}.md\" >}}}})"),
            LinkTarget::Asset(relpath) => format!("[{text}](/{relpath})"),
            LinkTarget::Unresolved(_) => text.to_owned(),
        }
    }
}

/// Format a page date in local time with a ` UTC±HH:MM` suffix
/// (plain ` UTC` when the offset is zero).
fn format_date(date: DateTime<Utc>) -> String {
    let local = date.with_timezone(&Local);
    let offset_secs = local.offset().fix().local_minus_utc();
    let suffix = if offset_secs == 0 {
        " UTC".to_owned()
    } else {
        format!(
            " UTC{:+03}:{:02}",
            offset_secs / 3600,
            (offset_secs.abs() % 3600) / 60
        )
    };
    format!("{}{}", local.format("%Y-%m-%d %H:%M:%S"), suffix)
}

/// Writes a site as a Nikola posts tree.
pub struct NikolaWriter {
    root: PathBuf,
}

impl NikolaWriter {
    /// Create a writer targeting the Nikola site root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write_page(&self, site: &Site, page: &Page, summary: &mut WriteSummary) -> Result<(), WriteError> {
        let renderer = render_page(site, page, NikolaDialect);
        summary.warnings += renderer.warnings().len();
        if renderer.is_empty() {
            summary.pages_skipped += 1;
            return Ok(());
        }

        let dst = self.root.join(format!("{}.md", page.relpath));
        tracing::info!(page = %page.relpath, dst = %dst.display(), "writing page");
        ensure_parent(&dst)?;

        let mut out = BufWriter::new(fs::File::create(&dst)?);
        writeln!(out, "<!--")?;
        if let Some(title) = &page.title {
            writeln!(out, ".. title: {title}")?;
        }
        if !page.tags.is_empty() {
            let tags: Vec<&str> = page.tags.iter().map(String::as_str).collect();
            writeln!(out, ".. tags: {}", tags.join(", "))?;
        }
        if let Some(date) = page.date {
            writeln!(out, ".. date: {}", format_date(date))?;
        }
        writeln!(out, "-->")?;
        writeln!(out)?;
        renderer.write_to(&mut out)?;
        out.flush()?;

        summary.pages += 1;
        Ok(())
    }
}

impl SiteWriter for NikolaWriter {
    fn write(&self, site: &Site) -> Result<WriteSummary, WriteError> {
        let mut summary = WriteSummary::default();

        for page in site.pages.values() {
            self.write_page(site, page, &mut summary)?;
        }

        for asset in site.statics.values() {
            copy_static(site, asset, &self.root)?;
            summary.statics += 1;
        }

        Ok(summary)
    }
}
