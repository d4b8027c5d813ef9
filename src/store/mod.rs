//! Persistence for crawled jobs
//!
//! The crawl pipeline only talks to the `JobSink` trait. `Database` stores
//! records in a local libsql file; `MemorySink` keeps them in process.

mod database;
mod error;
mod filter;
mod memory;
mod schema;

pub use database::{Database, StoredJob};
pub use error::StoreError;
pub use filter::JobFilter;
pub use memory::MemorySink;

use std::future::Future;

use crate::job::JobRecord;

/// Destination for extracted job records
///
/// Both calls may run concurrently for different links. Concurrent calls
/// for the same link are last-writer-wins.
pub trait JobSink: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert or replace the record keyed by its `link`
    ///
    /// Replacing a record drops its canonical location association.
    fn upsert(&self, record: &JobRecord) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Record the canonical address matched for `link`
    fn associate_location(
        &self,
        link: &str,
        address: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
