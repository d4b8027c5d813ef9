//! # cake-crawler - Job Board Crawler for Rust
//!
//! This crate crawls a job board's search listings, extracts a structured
//! record from every job posting it links to, reconciles the free-text
//! location against a canonical gazetteer and stores the result.
//!
//! ## Features
//!
//! - Two-stage crawl: listing pages feed detail pages, each stage with its
//!   own parallelism ceiling and per-host rate limit
//! - Selector-driven extraction of company, title, categories, info rows and
//!   description sections
//! - Weighted suffix matching of locations against a hierarchical gazetteer
//! - Pluggable sinks: libsql database or in-memory
//! - Async API with Tokio
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cake_crawler::crawler::{Pipeline, PipelineConfig};
//! use cake_crawler::location::{Gazetteer, JsonGazetteerSource, LocationMatcher};
//! use cake_crawler::store::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gazetteer = Gazetteer::load(&JsonGazetteerSource::new("data/address.json"))?;
//!     let db = Database::new_from_path("cake.db").await?;
//!     db.save_locations(gazetteer.entries()).await?;
//!
//!     let pipeline = Pipeline::new(
//!         PipelineConfig::builder().max_pages(3).build(),
//!         Arc::new(db),
//!         Arc::new(LocationMatcher::new(gazetteer)),
//!     )?;
//!     let report = pipeline.update().await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

mod error;

pub mod crawler;
pub mod extract;
pub mod job;
pub mod location;
pub mod store;

pub use error::{Error, Result};
