//! Typed elements produced by the body segmenter.

use std::fmt;

/// Where a wiki link points after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Another content page, by extension-stripped relpath.
    Page(String),
    /// A static asset, by exact relpath.
    Asset(String),
    /// Nothing found anywhere up to the root; carries the raw target.
    Unresolved(String),
}

/// One part of a line containing inline directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Plain text between directives. May be empty.
    Text(String),
    /// An `[[!img ..]]` directive. `target` is the resolved asset relpath,
    /// `None` when the image file is absent.
    Image {
        target: Option<String>,
        filename: String,
        alt: String,
    },
    /// An internal link with resolved target and display text.
    Link { text: String, target: LinkTarget },
    /// A directive matching no known pattern, kept verbatim.
    Directive(String),
}

/// One body line classified by the segmenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// `[[!format <lang> """` (or `'''`) code fence opening.
    CodeBegin { lang: String },
    /// `"""]]` (or `''']]`) code fence closing.
    CodeEnd,
    /// `[[!map ..]]` inclusion marker.
    MapInclude,
    /// A line with no directives; the raw text lives on [`BodyLine`].
    Text,
    /// A line mixing text spans and inline directives, in source order.
    Composite { spans: Vec<Span> },
}

/// A body line together with its source position and raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyLine {
    /// 1-based source line number.
    pub lineno: usize,
    /// The line as stored in the page body.
    pub raw: String,
    pub element: Element,
}

/// Kind of a recoverable condition surfaced during segmentation/rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Link target not found in the ancestor search.
    UnresolvedLink,
    /// Directive text matched no known pattern.
    UnsupportedDirective,
    /// `[[!map ..]]` found on a line other than line 1.
    MapNotFirst,
}

/// A recoverable condition tied to a page and line.
///
/// Warnings are logged via `tracing` where they are detected and collected
/// on the render pass so writers can count and report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderWarning {
    pub page: String,
    pub lineno: usize,
    pub kind: WarningKind,
    /// The offending target or directive text.
    pub detail: String,
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::UnresolvedLink => "no target file found for link target",
            WarningKind::UnsupportedDirective => "unsupported directive",
            WarningKind::MapNotFirst => "map tag not on first line",
        };
        write!(f, "{}:{}: {} {}", self.page, self.lineno, what, self.detail)
    }
}
