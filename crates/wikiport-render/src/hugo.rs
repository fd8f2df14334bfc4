//! Hugo output dialect.
//!
//! Pages land under `<root>/content/<relpath>.md` with a JSON front matter
//! block; code fences become `highlight` shortcode pairs and internal links
//! use `relref`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;
use wikiport_site::{Page, Site};

use crate::element::LinkTarget;
use crate::renderer::{Dialect, LineContext};
use crate::writer::{SiteWriter, WriteError, WriteSummary, copy_static, ensure_parent, render_page};

struct HugoDialect;

impl Dialect for HugoDialect {
    fn code_begin(&self, _ctx: &LineContext<'_>, lang: &str) -> Option<String> {
        Some(format!("{{{{< highlight {lang} >}}}}"))
    }

    fn code_end(&self, _ctx: &LineContext<'_>) -> Option<String> {
        Some("{{< /highlight >}}".to_owned())
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
            Some(_) => format!("{{{{< figure src=\"{filename}\" alt=\"{alt}\" >}}}}"),
            None => format!("(missing image: {alt})"),
        }
    }

    fn link(&self, _ctx: &LineContext<'_>, text: &str, target: &LinkTarget) -> String {
        match target {
            LinkTarget::Page(relpath) => format!("[{text}]({{{{< relref \"{relpath}.md\" >}}}})"),
            LinkTarget::Asset(relpath) => format!("[{text}]({{{{< relref \"{relpath}\" >}}}})"),
            LinkTarget::Unresolved(_) => text.to_owned(),
        }
    }
}

/// JSON front matter, omitting absent fields.
#[derive(Serialize)]
struct FrontMatter<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

impl<'a> FrontMatter<'a> {
    fn new(page: &'a Page) -> Self {
        Self {
            title: page.title.as_deref(),
            tags: page.tags.iter().map(String::as_str).collect(),
            date: page.date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Writes a site as a Hugo content tree.
pub struct HugoWriter {
    root: PathBuf,
}

impl HugoWriter {
    /// Create a writer targeting the Hugo site root.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write_page(&self, site: &Site, page: &Page, summary: &mut WriteSummary) -> Result<(), WriteError> {
        let renderer = render_page(site, page, HugoDialect);
        summary.warnings += renderer.warnings().len();
        if renderer.is_empty() {
            summary.pages_skipped += 1;
            return Ok(());
        }

        let dst = self.root.join("content").join(format!("{}.md", page.relpath));
        tracing::info!(page = %page.relpath, dst = %dst.display(), "writing page");
        ensure_parent(&dst)?;

        let mut out = BufWriter::new(fs::File::create(&dst)?);
        serde_json::to_writer_pretty(&mut out, &FrontMatter::new(page))?;
        out.write_all(b"\n")?;
        renderer.write_to(&mut out)?;
        out.flush()?;

        summary.pages += 1;
        Ok(())
    }
}

impl SiteWriter for HugoWriter {
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
