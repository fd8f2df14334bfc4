//! Wikiport CLI - convert an ikiwiki-style source tree to a static-site
//! generator layout.
//!
//! Supported output formats: Hugo, Nikola, Pelican, plus a check-only pass
//! that only reports warnings.

mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use wikiport_render::{
    CheckWriter, HugoWriter, NikolaWriter, PelicanWriter, SiteWriter, WriteSummary,
};
use wikiport_site::Site;

use error::CliError;
use output::Output;

/// Output format to convert to.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Hugo,
    Nikola,
    Pelican,
    /// Report warnings only, write nothing.
    Check,
}

/// Convert an ikiwiki-style source tree to a static-site generator layout.
#[derive(Parser)]
#[command(name = "wikiport", version, about)]
struct Cli {
    /// Output format.
    #[arg(value_enum)]
    format: Format,

    /// Source site root.
    source: PathBuf,

    /// Destination root (not needed for `check`).
    dest: Option<PathBuf>,

    /// JSON file mapping relpath to {"ctime": seconds}.
    #[arg(long)]
    ctimes: Option<PathBuf>,
}

fn run(cli: &Cli) -> Result<WriteSummary, CliError> {
    let mut site = Site::new(&cli.source);
    if let Some(ctimes) = &cli.ctimes {
        site.load_ctimes(ctimes)?;
    }
    site.load()?;

    let dest = || {
        cli.dest.clone().ok_or_else(|| {
            CliError::Validation("destination root is required for this format".to_owned())
        })
    };
    let writer: Box<dyn SiteWriter> = match cli.format {
        Format::Hugo => Box::new(HugoWriter::new(dest()?)),
        Format::Nikola => Box::new(NikolaWriter::new(dest()?)),
        Format::Pelican => Box::new(PelicanWriter::new(dest()?)),
        Format::Check => Box::new(CheckWriter::new()),
    };

    Ok(writer.write(&site)?)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let output = Output::new();

    match run(&cli) {
        Ok(summary) => {
            output.info(&format!(
                "{} pages, {} skipped, {} static files, {} warnings",
                summary.pages, summary.pages_skipped, summary.statics, summary.warnings
            ));
            output.success("done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
