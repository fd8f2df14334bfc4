//! Source site model for Wikiport.
//!
//! Loads an ikiwiki-style source tree into memory: `.mdwn` files become
//! [`Page`]s with parsed metadata, everything else becomes a [`Static`].
//! The [`Site`] owns both collections and resolves wiki link targets with
//! the ancestor search ikiwiki uses for relative links.

mod ctimes;
mod page;
mod site;

pub use ctimes::Ctimes;
pub use page::{Page, Static};
pub use site::{PAGE_EXTENSION, ResolvedTarget, Site};

/// Error type for site loading.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Malformed `[[!meta date=..]]` payload.
    #[error("{path}:{line}: invalid date: {message}")]
    InvalidDate {
        path: String,
        line: usize,
        message: String,
    },

    /// Malformed ctimes metadata file.
    #[error("{path}: {message}")]
    Metadata { path: String, message: String },
}
