//! Markup extraction for the job board
//!
//! This module turns fetched pages into structured data. It has no network
//! or storage dependency; everything here is synchronous and side-effect
//! free so it can run inside any crawl callback.
//!
//! ## Key Components
//!
//! - `LinkDiscoverer`: finds detail-page URLs on a listing page
//! - `DetailExtractor`: builds a `JobRecord` from a detail page
//! - `classify_row`: maps one info row to typed field assignments

mod classifier;
mod detail;
mod error;
mod links;
mod text;

pub use classifier::{FieldAssignment, InfoRow, apply_row, classify_row};
pub use detail::DetailExtractor;
pub use error::ExtractError;
pub use links::LinkDiscoverer;

#[cfg(test)]
pub(crate) use detail::tests as detail_fixtures;
#[cfg(test)]
pub(crate) use links::tests as listing_fixtures;
