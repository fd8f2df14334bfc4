//! Renderer contract and driving logic.
//!
//! A [`Dialect`] maps already-resolved elements to output markup; the
//! generic [`BodyRenderer`] replays a segmented body through it,
//! accumulating one output chunk per emitting line. Dialects never touch
//! the site or the filesystem.

use std::io;
use std::io::Write;

use wikiport_site::Page;

use crate::element::{BodyLine, Element, LinkTarget, RenderWarning, Span, WarningKind};

/// Per-line context handed to every dialect method.
#[derive(Debug, Clone, Copy)]
pub struct LineContext<'a> {
    pub page: &'a Page,
    /// 1-based source line number.
    pub lineno: usize,
    /// The raw body line.
    pub raw: &'a str,
}

/// One output markup convention.
///
/// Whole-line methods return `None` to drop the line (the default for code
/// fences and map markers, matching the base behavior of the original
/// conversion scripts); span methods return the markup for one part of a
/// composite line.
pub trait Dialect {
    fn code_begin(&self, ctx: &LineContext<'_>, lang: &str) -> Option<String> {
        let _ = (ctx, lang);
        None
    }

    fn code_end(&self, ctx: &LineContext<'_>) -> Option<String> {
        let _ = ctx;
        None
    }

    fn map_include(&self, ctx: &LineContext<'_>) -> Option<String> {
        let _ = ctx;
        None
    }

    fn text_line(&self, ctx: &LineContext<'_>) -> Option<String> {
        let _ = ctx;
        None
    }

    fn text_span(&self, ctx: &LineContext<'_>, text: &str) -> String;

    fn image(
        &self,
        ctx: &LineContext<'_>,
        target: Option<&str>,
        filename: &str,
        alt: &str,
    ) -> String;

    fn link(&self, ctx: &LineContext<'_>, text: &str, target: &LinkTarget) -> String;

    /// Unrecognized directive passthrough, re-wrapped in its brackets.
    fn directive(&self, ctx: &LineContext<'_>, raw: &str) -> String {
        let _ = ctx;
        format!("[[{raw}]]")
    }
}

/// Replays an element stream through a [`Dialect`], collecting chunks.
pub struct BodyRenderer<'a, D> {
    dialect: D,
    page: &'a Page,
    chunks: Vec<String>,
    pub(crate) warnings: Vec<RenderWarning>,
}

impl<'a, D: Dialect> BodyRenderer<'a, D> {
    #[must_use]
    pub fn new(dialect: D, page: &'a Page) -> Self {
        Self {
            dialect,
            page,
            chunks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Process the segmented body, one chunk per emitting line.
    pub fn render(&mut self, lines: &[BodyLine]) {
        for line in lines {
            let ctx = LineContext {
                page: self.page,
                lineno: line.lineno,
                raw: &line.raw,
            };
            let chunk = match &line.element {
                Element::CodeBegin { lang } => self.dialect.code_begin(&ctx, lang),
                Element::CodeEnd => self.dialect.code_end(&ctx),
                Element::MapInclude => self.dialect.map_include(&ctx),
                Element::Text => self.dialect.text_line(&ctx),
                Element::Composite { spans } => Some(self.render_spans(&ctx, spans)),
            };
            if let Some(chunk) = chunk {
                self.chunks.push(chunk);
            }
        }
    }

    /// Render composite spans and concatenate them in source order.
    fn render_spans(&mut self, ctx: &LineContext<'_>, spans: &[Span]) -> String {
        let mut out = String::new();
        for span in spans {
            match span {
                Span::Text(text) => out.push_str(&self.dialect.text_span(ctx, text)),
                Span::Image {
                    target,
                    filename,
                    alt,
                } => out.push_str(&self.dialect.image(ctx, target.as_deref(), filename, alt)),
                Span::Link { text, target } => out.push_str(&self.dialect.link(ctx, text, target)),
                Span::Directive(raw) => {
                    let warning = RenderWarning {
                        page: ctx.page.relpath.clone(),
                        lineno: ctx.lineno,
                        kind: WarningKind::UnsupportedDirective,
                        detail: raw.clone(),
                    };
                    tracing::warn!(page = %warning.page, line = warning.lineno, "{warning}");
                    self.warnings.push(warning);
                    out.push_str(&self.dialect.directive(ctx, raw));
                }
            }
        }
        out
    }

    /// Accumulated output, one entry per emitting body line.
    #[must_use]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Warnings collected during segmentation and rendering.
    #[must_use]
    pub fn warnings(&self) -> &[RenderWarning] {
        &self.warnings
    }

    /// True when every chunk is empty or whitespace; such pages produce no
    /// output file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|c| c.trim().is_empty())
    }

    /// Write the chunks line by line.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the destination.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for chunk in &self.chunks {
            writeln!(out, "{chunk}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    /// Minimal dialect echoing everything, used to test the driver.
    struct EchoDialect;

    impl Dialect for EchoDialect {
        fn code_begin(&self, _ctx: &LineContext<'_>, lang: &str) -> Option<String> {
            Some(format!("begin:{lang}"))
        }

        fn code_end(&self, _ctx: &LineContext<'_>) -> Option<String> {
            Some("end".to_owned())
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
            _target: Option<&str>,
            filename: &str,
            alt: &str,
        ) -> String {
            format!("img:{filename}:{alt}")
        }

        fn link(&self, _ctx: &LineContext<'_>, text: &str, _target: &LinkTarget) -> String {
            format!("link:{text}")
        }
    }

    fn empty_page() -> Page {
        Page {
            relpath: "2019/post".to_owned(),
            src: PathBuf::new(),
            title: None,
            tags: BTreeSet::new(),
            date: None,
            body: Vec::new(),
        }
    }

    #[test]
    fn test_one_chunk_per_line_and_dropped_lines() {
        let page = empty_page();
        let lines = vec![
            BodyLine {
                lineno: 1,
                raw: "[[!map x]]".to_owned(),
                element: Element::MapInclude,
            },
            BodyLine {
                lineno: 2,
                raw: "hello".to_owned(),
                element: Element::Text,
            },
            BodyLine {
                lineno: 3,
                raw: String::new(),
                element: Element::Composite {
                    spans: vec![
                        Span::Text("a".to_owned()),
                        Span::Link {
                            text: "b".to_owned(),
                            target: LinkTarget::Unresolved("b".to_owned()),
                        },
                        Span::Text("c".to_owned()),
                    ],
                },
            },
        ];

        let mut renderer = BodyRenderer::new(EchoDialect, &page);
        renderer.render(&lines);

        // MapInclude uses the default None and emits no chunk.
        assert_eq!(renderer.chunks(), &["hello", "alink:bc"]);
    }

    #[test]
    fn test_directive_span_warns() {
        let page = empty_page();
        let lines = vec![BodyLine {
            lineno: 7,
            raw: "[[!toc]]".to_owned(),
            element: Element::Composite {
                spans: vec![
                    Span::Text(String::new()),
                    Span::Directive("!toc".to_owned()),
                    Span::Text(String::new()),
                ],
            },
        }];

        let mut renderer = BodyRenderer::new(EchoDialect, &page);
        renderer.render(&lines);

        assert_eq!(renderer.chunks(), &["[[!toc]]"]);
        assert_eq!(renderer.warnings().len(), 1);
        assert_eq!(renderer.warnings()[0].kind, WarningKind::UnsupportedDirective);
        assert_eq!(renderer.warnings()[0].lineno, 7);
    }

    #[test]
    fn test_is_empty_ignores_whitespace_chunks() {
        let page = empty_page();
        let lines = vec![
            BodyLine {
                lineno: 1,
                raw: "   ".to_owned(),
                element: Element::Text,
            },
            BodyLine {
                lineno: 2,
                raw: String::new(),
                element: Element::Text,
            },
        ];

        let mut renderer = BodyRenderer::new(EchoDialect, &page);
        renderer.render(&lines);
        assert!(renderer.is_empty());

        renderer.render(&[BodyLine {
            lineno: 3,
            raw: "content".to_owned(),
            element: Element::Text,
        }]);
        assert!(!renderer.is_empty());
    }

    #[test]
    fn test_write_to_emits_one_line_per_chunk() {
        let page = empty_page();
        let lines = vec![
            BodyLine {
                lineno: 1,
                raw: "one".to_owned(),
                element: Element::Text,
            },
            BodyLine {
                lineno: 2,
                raw: "two".to_owned(),
                element: Element::Text,
            },
        ];

        let mut renderer = BodyRenderer::new(EchoDialect, &page);
        renderer.render(&lines);

        let mut out = Vec::new();
        renderer.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "one\ntwo\n");
    }
}
