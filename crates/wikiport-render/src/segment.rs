//! Body segmentation.
//!
//! Converts a page's stored body lines into [`BodyLine`]s. Whole-line
//! patterns (code fences in both quote styles, the map marker) are tested
//! first; remaining lines are scanned for `[[..]]` directive spans and
//! split into alternating text and directive parts. Link and image targets
//! are resolved here, once, so every dialect renders the same resolution.

use std::sync::LazyLock;

use regex::Regex;
use wikiport_site::{Page, ResolvedTarget, Site};

use crate::element::{BodyLine, Element, LinkTarget, RenderWarning, Span, WarningKind};

static CODE_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[\[!format (\S+) (?:"""|''')"#).unwrap());
static CODE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^(?:"""|''')\]\]"#).unwrap());
static MAP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\[!map").unwrap());
static DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());
static IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^!img (\S+) alt="([^"]+)""#).unwrap());
static PIPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^|]+)\|(.+)$").unwrap());

/// Segment a page body into typed lines, resolving link targets.
///
/// Recoverable conditions (unresolved links, out-of-position map markers)
/// are appended to `warnings`.
#[must_use]
pub fn segment(site: &Site, page: &Page, warnings: &mut Vec<RenderWarning>) -> Vec<BodyLine> {
    page.body
        .iter()
        .map(|(lineno, line)| BodyLine {
            lineno: *lineno,
            raw: line.clone(),
            element: segment_line(site, page, *lineno, line, warnings),
        })
        .collect()
}

fn segment_line(
    site: &Site,
    page: &Page,
    lineno: usize,
    line: &str,
    warnings: &mut Vec<RenderWarning>,
) -> Element {
    if let Some(caps) = CODE_BEGIN_RE.captures(line) {
        return Element::CodeBegin {
            lang: caps[1].to_owned(),
        };
    }
    if CODE_END_RE.is_match(line) {
        return Element::CodeEnd;
    }
    if MAP_RE.is_match(line) {
        // Only conventionally valid as the very first line. Warning only.
        if lineno != 1 {
            warn(warnings, page, lineno, WarningKind::MapNotFirst, line);
        }
        return Element::MapInclude;
    }

    let mut spans = Vec::new();
    let mut last = 0;
    for caps in DIRECTIVE_RE.captures_iter(line) {
        let whole = caps.get(0).expect("capture 0 always present");
        spans.push(Span::Text(line[last..whole.start()].to_owned()));
        spans.push(classify_directive(site, page, lineno, &caps[1], warnings));
        last = whole.end();
    }

    if spans.is_empty() {
        return Element::Text;
    }
    spans.push(Span::Text(line[last..].to_owned()));
    Element::Composite { spans }
}

/// Classify one bracketed span, in fixed priority order.
fn classify_directive(
    site: &Site,
    page: &Page,
    lineno: usize,
    text: &str,
    warnings: &mut Vec<RenderWarning>,
) -> Span {
    if let Some(caps) = IMG_RE.captures(text) {
        let filename = caps[1].to_owned();
        let target = match site.resolve_link(page, &filename) {
            Some(ResolvedTarget::Asset(p) | ResolvedTarget::Page(p)) => Some(p),
            None => None,
        };
        return Span::Image {
            target,
            filename,
            alt: caps[2].to_owned(),
        };
    }

    if let Some(caps) = PIPE_RE.captures(text) {
        return link_span(site, page, lineno, caps[1].to_owned(), &caps[2], warnings);
    }

    // Bare spans are link candidates only when they look like a path;
    // anything starting with `!` or containing whitespace is a directive
    // we do not understand.
    if text.starts_with('!') || text.contains(char::is_whitespace) {
        return Span::Directive(text.to_owned());
    }

    match site.resolve_link(page, text) {
        Some(ResolvedTarget::Page(relpath)) => {
            // A missing title falls back to the raw span text.
            let label = site.page_title(&relpath).unwrap_or(text).to_owned();
            Span::Link {
                text: label,
                target: LinkTarget::Page(relpath),
            }
        }
        Some(ResolvedTarget::Asset(relpath)) => Span::Link {
            text: text.to_owned(),
            target: LinkTarget::Asset(relpath),
        },
        None => {
            warn(warnings, page, lineno, WarningKind::UnresolvedLink, text);
            Span::Link {
                text: text.to_owned(),
                target: LinkTarget::Unresolved(text.to_owned()),
            }
        }
    }
}

/// Build a link span with explicit display text, resolving the target.
fn link_span(
    site: &Site,
    page: &Page,
    lineno: usize,
    display: String,
    target: &str,
    warnings: &mut Vec<RenderWarning>,
) -> Span {
    let resolved = match site.resolve_link(page, target) {
        Some(ResolvedTarget::Page(relpath)) => LinkTarget::Page(relpath),
        Some(ResolvedTarget::Asset(relpath)) => LinkTarget::Asset(relpath),
        None => {
            warn(warnings, page, lineno, WarningKind::UnresolvedLink, target);
            LinkTarget::Unresolved(target.to_owned())
        }
    };
    Span::Link {
        text: display,
        target: resolved,
    }
}

fn warn(
    warnings: &mut Vec<RenderWarning>,
    page: &Page,
    lineno: usize,
    kind: WarningKind,
    detail: &str,
) {
    let warning = RenderWarning {
        page: page.relpath.clone(),
        lineno,
        kind,
        detail: detail.to_owned(),
    };
    tracing::warn!(page = %warning.page, line = warning.lineno, "{warning}");
    warnings.push(warning);
}
