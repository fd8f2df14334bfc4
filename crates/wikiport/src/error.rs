//! CLI error types.

use wikiport_render::WriteError;
use wikiport_site::SiteError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Site(#[from] SiteError),

    #[error("{0}")]
    Write(#[from] WriteError),

    #[error("{0}")]
    Validation(String),
}
