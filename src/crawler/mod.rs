//! # Job Board Crawler Module
//!
//! Fetches listing and detail pages and drives extraction, location
//! reconciliation and storage for each posting.
//!
//! ## Key Components
//!
//! - `Crawler`: one bounded, rate-limited fetch stage
//! - `Pipeline`: listing stage feeding the detail stage, then the sink
//! - `PipelineConfig` / `CrawlerConfig`: what to crawl and how politely
//! - `listing_url`: search URL for one profession and page

mod config;
mod error;
mod listing;
mod pipeline;
mod scheduler;

pub use config::{
    CrawlerConfig, CrawlerConfigBuilder, DEFAULT_DETAIL_URL_PATTERN, DEFAULT_LISTING_URL,
    DEFAULT_LOCATION, PipelineConfig, PipelineConfigBuilder,
};
pub use error::{CrawlError, PipelineError};
pub use listing::{Profession, listing_url};
pub use pipeline::{CrawlReport, Pipeline, PipelineState};
pub use scheduler::{Crawler, Page};
