//! Body transformation pipeline for Wikiport.
//!
//! Segments page bodies into typed elements ([`segment`]), replays them
//! through a pluggable [`Dialect`] via the generic [`BodyRenderer`], and
//! drives whole-site conversion with one [`SiteWriter`] per output format
//! (Hugo, Nikola, Pelican, plus a check-only pass).
//!
//! Links and images are resolved against the [`Site`](wikiport_site::Site)
//! once, at segmentation time; dialects only differ in the markup they emit
//! for the already-resolved targets.

mod check;
mod element;
mod hugo;
mod nikola;
mod pelican;
mod renderer;
mod segment;
mod writer;

pub use check::CheckWriter;
pub use element::{BodyLine, Element, LinkTarget, RenderWarning, Span, WarningKind};
pub use hugo::HugoWriter;
pub use nikola::NikolaWriter;
pub use pelican::PelicanWriter;
pub use renderer::{BodyRenderer, Dialect, LineContext};
pub use segment::segment;
pub use writer::{SiteWriter, WriteError, WriteSummary};
