//! Location reconciliation
//!
//! Scraped location strings are free text. This module resolves them
//! against a canonical gazetteer loaded once at startup and shared read-only
//! by every matcher call.

mod error;
mod gazetteer;
mod matcher;

pub use error::GazetteerError;
pub use gazetteer::{
    DEFAULT_COUNTRY, Gazetteer, GazetteerEntry, GazetteerSource, JsonGazetteerSource,
    parse_entries,
};
pub use matcher::{LocationMatcher, MATCH_THRESHOLD, MatchResult};
