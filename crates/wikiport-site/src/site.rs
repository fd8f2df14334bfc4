//! Site tree loading and link resolution.
//!
//! [`Site::load`] walks the configured subdirectories of the source root
//! (four-digit year directories plus an optional `talks` directory),
//! classifying every entry as a content page, a static asset, or a
//! directory to recurse into. Directory listings are sorted by name so a
//! single listing is processed deterministically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::ctimes::Ctimes;
use crate::page::{Page, Static};
use crate::SiteError;

/// File extension marking content pages, dot included.
pub const PAGE_EXTENSION: &str = ".mdwn";

/// Name of the fixed non-year directory scanned when present.
const TALKS_DIR: &str = "talks";

static YEAR_DIR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());

/// Result of resolving a wiki link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// A content page, identified by its extension-stripped relpath.
    Page(String),
    /// A static asset, identified by its exact relpath.
    Asset(String),
}

/// The in-memory source site.
///
/// Constructed once, populated by [`Site::load`], then read-only.
#[derive(Debug)]
pub struct Site {
    /// Source root directory.
    pub root: PathBuf,
    /// Pages keyed by extension-stripped relpath.
    pub pages: BTreeMap<String, Page>,
    /// Static assets keyed by exact relpath.
    pub statics: BTreeMap<String, Static>,
    ctimes: Option<Ctimes>,
}

impl Site {
    /// Create an empty site rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pages: BTreeMap::new(),
            statics: BTreeMap::new(),
            ctimes: None,
        }
    }

    /// Load the auxiliary ctimes store. Must be called before [`Site::load`]
    /// for the backfill to take effect.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Io`] or [`SiteError::Metadata`] when the file
    /// cannot be read or parsed.
    pub fn load_ctimes(&mut self, path: &Path) -> Result<(), SiteError> {
        self.ctimes = Some(Ctimes::load(path)?);
        Ok(())
    }

    /// Walk the source tree and populate pages and statics.
    ///
    /// Visits every four-digit year directory under the root, then the
    /// `talks` directory if present.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Io`] when a directory cannot be listed and
    /// propagates page load failures.
    pub fn load(&mut self) -> Result<(), SiteError> {
        for name in sorted_entry_names(&self.root)? {
            if YEAR_DIR_RE.is_match(&name) && self.root.join(&name).is_dir() {
                self.read_tree(&name)?;
            }
        }

        if self.root.join(TALKS_DIR).is_dir() {
            self.read_tree(TALKS_DIR)?;
        }

        Ok(())
    }

    fn read_tree(&mut self, relpath: &str) -> Result<(), SiteError> {
        tracing::info!(path = %relpath, "loading directory");
        let abspath = self.root.join(relpath);

        for name in sorted_entry_names(&abspath)? {
            let child_relpath = format!("{relpath}/{name}");
            let child_abspath = abspath.join(&name);

            if child_abspath.is_dir() {
                self.read_tree(&child_relpath)?;
            } else if name.ends_with(PAGE_EXTENSION) {
                self.read_page(&child_relpath, &child_abspath)?;
            } else if child_abspath.is_file() {
                self.read_static(&child_relpath);
            }
        }

        Ok(())
    }

    fn read_page(&mut self, relpath: &str, src: &Path) -> Result<(), SiteError> {
        tracing::info!(path = %relpath, "loading page");
        let ctime = self.ctime_for(relpath);
        let page = Page::load(src, relpath, ctime)?;
        self.pages.insert(page.relpath.clone(), page);
        Ok(())
    }

    fn read_static(&mut self, relpath: &str) {
        tracing::info!(path = %relpath, "loading static file");
        let ctime = self.ctime_for(relpath);
        self.statics
            .insert(relpath.to_owned(), Static::new(relpath.to_owned(), ctime));
    }

    fn ctime_for(&self, relpath: &str) -> Option<i64> {
        self.ctimes.as_ref().and_then(|c| c.get(relpath))
    }

    /// Resolve a wiki link target relative to `source`.
    ///
    /// Strips a single leading `/`, then walks upward from the source
    /// page's own relpath treated as a directory (ikiwiki subpage
    /// semantics) through each parent directory up to and including the
    /// root. At each level the exact path is tested as a static asset
    /// first, then as a content page. The first hit wins.
    #[must_use]
    pub fn resolve_link(&self, source: &Page, target: &str) -> Option<ResolvedTarget> {
        let target = target.strip_prefix('/').unwrap_or(target);
        let mut dir = source.relpath.as_str();

        loop {
            let candidate = if dir.is_empty() {
                target.to_owned()
            } else {
                format!("{dir}/{target}")
            };

            if self.statics.contains_key(&candidate) {
                return Some(ResolvedTarget::Asset(candidate));
            }
            if self.pages.contains_key(&candidate) {
                return Some(ResolvedTarget::Page(candidate));
            }

            if dir.is_empty() {
                return None;
            }
            dir = dir.rfind('/').map_or("", |idx| &dir[..idx]);
        }
    }

    /// Title of the page at `relpath`, for resolving missing link labels.
    #[must_use]
    pub fn page_title(&self, relpath: &str) -> Option<&str> {
        self.pages.get(relpath).and_then(|p| p.title.as_deref())
    }
}

/// Sorted names of the entries in a directory.
fn sorted_entry_names(dir: &Path) -> Result<Vec<String>, SiteError> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
