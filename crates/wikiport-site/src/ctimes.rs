//! Auxiliary creation-time store.
//!
//! Some source trees carry a JSON sidecar file recording the original
//! creation time of each file, used to backfill page dates when the page
//! itself has no `[[!meta date=..]]` line.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::SiteError;

/// Per-file info as stored in the sidecar file.
///
/// Only `ctime` is required; other keys are ignored.
#[derive(Debug, Deserialize)]
struct FileInfo {
    /// Creation time as Unix epoch seconds.
    ctime: i64,
}

/// Mapping from source-relative path to creation time.
///
/// Keys use the path as it appears in the source tree, extension included.
#[derive(Debug, Default)]
pub struct Ctimes {
    by_relpath: HashMap<String, i64>,
}

impl Ctimes {
    /// Load the store from a JSON file mapping relpath to `{"ctime": secs}`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Io`] if the file cannot be read and
    /// [`SiteError::Metadata`] if it is not valid JSON of the expected shape.
    pub fn load(path: &Path) -> Result<Self, SiteError> {
        let content = fs::read_to_string(path)?;
        let data: HashMap<String, FileInfo> =
            serde_json::from_str(&content).map_err(|e| SiteError::Metadata {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            by_relpath: data.into_iter().map(|(k, v)| (k, v.ctime)).collect(),
        })
    }

    /// Look up the creation time for a source-relative path.
    #[must_use]
    pub fn get(&self, relpath: &str) -> Option<i64> {
        self.by_relpath.get(relpath).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_and_get() {
        let file = write_tmp(
            r#"{
                "2019/post.mdwn": {"ctime": 1546300800},
                "2019/photo.png": {"ctime": 1546387200, "mtime": 1546387300}
            }"#,
        );

        let ctimes = Ctimes::load(file.path()).unwrap();
        assert_eq!(ctimes.get("2019/post.mdwn"), Some(1_546_300_800));
        assert_eq!(ctimes.get("2019/photo.png"), Some(1_546_387_200));
        assert_eq!(ctimes.get("2019/missing.mdwn"), None);
    }

    #[test]
    fn test_malformed_json() {
        let file = write_tmp("{not json");

        let err = Ctimes::load(file.path()).unwrap_err();
        assert!(matches!(err, SiteError::Metadata { .. }));
    }

    #[test]
    fn test_missing_ctime_field() {
        let file = write_tmp(r#"{"2019/post.mdwn": {"mtime": 1}}"#);

        let err = Ctimes::load(file.path()).unwrap_err();
        assert!(matches!(err, SiteError::Metadata { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Ctimes::load(Path::new("/nonexistent/ctimes.json")).unwrap_err();
        assert!(matches!(err, SiteError::Io(_)));
    }
}
