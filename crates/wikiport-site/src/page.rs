//! Page and static asset models.
//!
//! A [`Page`] is parsed from an `.mdwn` source file: metadata lines (title
//! heading, `[[!tag ..]]`, `[[!meta date=..]]`) are consumed on the way in,
//! every other line is kept in the body together with its 1-based source
//! line number. Line numbers keep the gaps left by consumed metadata lines.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;

use crate::SiteError;

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s*(.+)").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[\[!tag ([^\]]+)\]\]").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[\[!meta date="(\d+-\d+-\d+)"\]\]"#).unwrap());

/// A content page loaded from the source tree.
///
/// Immutable once [`Page::load`] returns.
#[derive(Debug)]
pub struct Page {
    /// Source-relative path without the `.mdwn` extension.
    pub relpath: String,
    /// Absolute path of the source file.
    pub src: PathBuf,
    /// Title from the first heading line, if any.
    pub title: Option<String>,
    /// Deduplicated tags with any `tags/` prefix stripped. Sorted iteration.
    pub tags: BTreeSet<String>,
    /// Page date (metadata, then ctime store, then file mtime).
    pub date: Option<DateTime<Utc>>,
    /// Body lines with their 1-based source line numbers.
    pub body: Vec<(usize, String)>,
}

impl Page {
    /// Read and parse a page from `src`.
    ///
    /// `relpath` is the source-relative path including the extension;
    /// `ctime` is the backfill date from the auxiliary store, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Io`] if the file cannot be read and
    /// [`SiteError::InvalidDate`] on a malformed date payload.
    pub fn load(src: &Path, relpath: &str, ctime: Option<i64>) -> Result<Self, SiteError> {
        let mut page = Self {
            relpath: relpath
                .strip_suffix(crate::PAGE_EXTENSION)
                .unwrap_or(relpath)
                .to_owned(),
            src: src.to_path_buf(),
            title: None,
            tags: BTreeSet::new(),
            date: ctime.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            body: Vec::new(),
        };

        let content = fs::read_to_string(src)?;
        for (idx, raw) in content.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw.trim_end();
            if !page.consume_meta_line(lineno, line)? {
                page.body.push((lineno, line.to_owned()));
            }
        }

        if page.date.is_none() {
            let mtime = fs::metadata(src)?.modified()?;
            page.date = Some(DateTime::<Utc>::from(mtime));
        }

        Ok(page)
    }

    /// Apply the metadata line rules in fixed priority order.
    ///
    /// Returns `true` if the line was consumed. A matching rule wins the
    /// line even when it leaves it in the body (later heading lines).
    fn consume_meta_line(&mut self, lineno: usize, line: &str) -> Result<bool, SiteError> {
        if let Some(caps) = TITLE_RE.captures(line) {
            if self.title.is_none() {
                self.title = Some(caps[1].to_owned());
                return Ok(true);
            }
            // Only the first heading becomes the title.
            return Ok(false);
        }

        if let Some(caps) = TAG_RE.captures(line) {
            for tag in caps[1].split_whitespace() {
                let tag = tag.strip_prefix("tags/").unwrap_or(tag);
                self.tags.insert(tag.to_owned());
            }
            return Ok(true);
        }

        if let Some(caps) = DATE_RE.captures(line) {
            let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").map_err(|e| {
                SiteError::InvalidDate {
                    path: self.src.display().to_string(),
                    line: lineno,
                    message: e.to_string(),
                }
            })?;
            self.date = Some(date.and_time(NaiveTime::MIN).and_utc());
            return Ok(true);
        }

        Ok(false)
    }
}

/// A static asset found in the source tree, copied byte-for-byte to output.
#[derive(Debug)]
pub struct Static {
    /// Source-relative path, extension included.
    pub relpath: String,
    /// Creation time from the auxiliary store, if any.
    pub ctime: Option<DateTime<Utc>>,
}

impl Static {
    /// Create a static asset entry.
    #[must_use]
    pub fn new(relpath: String, ctime: Option<i64>) -> Self {
        Self {
            relpath,
            ctime: ctime.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn load_page(content: &str, ctime: Option<i64>) -> Result<Page, SiteError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        Page::load(file.path(), "2019/post.mdwn", ctime)
    }

    #[test]
    fn test_title_consumed() {
        let page = load_page("# Hello World\nbody line\n", None).unwrap();

        assert_eq!(page.relpath, "2019/post");
        assert_eq!(page.title.as_deref(), Some("Hello World"));
        assert_eq!(page.body, vec![(2, "body line".to_owned())]);
    }

    #[test]
    fn test_later_headings_kept_in_body() {
        let page = load_page("# Title\ntext\n# Not the title\n", None).unwrap();

        assert_eq!(page.title.as_deref(), Some("Title"));
        assert_eq!(
            page.body,
            vec![
                (2, "text".to_owned()),
                (3, "# Not the title".to_owned()),
            ]
        );
    }

    #[test]
    fn test_tags_deduplicated_and_prefix_stripped() {
        let page = load_page("[[!tag foo tags/bar]]\n[[!tag foo]]\n", None).unwrap();

        let tags: Vec<&str> = page.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["bar", "foo"]);
        assert!(page.body.is_empty());
    }

    #[test]
    fn test_meta_date() {
        let page = load_page("[[!meta date=\"2019-03-02\"]]\ntext\n", None).unwrap();

        let date = page.date.unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2019, 3, 2, 0, 0, 0).unwrap());
        assert_eq!(page.body, vec![(2, "text".to_owned())]);
    }

    #[test]
    fn test_malformed_date_fails() {
        let err = load_page("[[!meta date=\"2019-99-99\"]]\n", None).unwrap_err();
        assert!(matches!(err, SiteError::InvalidDate { line: 1, .. }));
    }

    #[test]
    fn test_ctime_backfill() {
        let page = load_page("text\n", Some(1_546_300_800)).unwrap();

        let date = page.date.unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_mtime_fallback() {
        let page = load_page("text\n", None).unwrap();

        // Freshly written file, mtime is "now".
        let date = page.date.unwrap();
        assert!(date.year() >= 2024);
    }

    #[test]
    fn test_meta_date_wins_over_ctime() {
        let page = load_page("[[!meta date=\"2019-03-02\"]]\n", Some(1_546_300_800)).unwrap();

        let date = page.date.unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2019, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_line_numbers_keep_gaps() {
        let page = load_page("# Title\n[[!tag a]]\nthird\nfourth\n", None).unwrap();

        assert_eq!(
            page.body,
            vec![(3, "third".to_owned()), (4, "fourth".to_owned())]
        );
    }

    #[test]
    fn test_unreadable_file() {
        let err = Page::load(Path::new("/nonexistent/post.mdwn"), "post.mdwn", None).unwrap_err();
        assert!(matches!(err, SiteError::Io(_)));
    }

    #[test]
    fn test_static_ctime() {
        let s = Static::new("2019/photo.png".to_owned(), Some(1_546_300_800));
        assert_eq!(
            s.ctime.unwrap(),
            Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap()
        );

        let s = Static::new("2019/photo.png".to_owned(), None);
        assert!(s.ctime.is_none());
    }
}
