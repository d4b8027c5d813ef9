//! Listing-to-detail crawl pipeline
//!
//! A run enumerates listing pages for every configured profession, feeds
//! each discovered detail URL to a second crawler, extracts a record from
//! every detail page, reconciles its location and hands it to the sink.
//! The two crawlers have independent budgets and the only edge between them
//! is the listing handler submitting detail visits.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::crawler::config::PipelineConfig;
use crate::crawler::error::{CrawlError, PipelineError};
use crate::crawler::listing::listing_url;
use crate::crawler::scheduler::{Crawler, Page};
use crate::extract::{DetailExtractor, LinkDiscoverer};
use crate::location::{GazetteerEntry, LocationMatcher};
use crate::store::JobSink;

/// Lifecycle of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Enumerating,
    Draining,
    Done,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineState::Idle => "idle",
            PipelineState::Enumerating => "enumerating",
            PipelineState::Draining => "draining",
            PipelineState::Done => "done",
        };
        f.write_str(label)
    }
}

/// Counters for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlReport {
    /// Listing pages fetched successfully
    pub listing_pages: usize,
    /// Listing pages that returned 404, past the last real page
    pub listing_past_end: usize,
    /// Detail pages fetched successfully
    pub detail_pages: usize,
    pub records_saved: usize,
    /// Records associated with their canonical location
    pub locations_matched: usize,
    /// Canonical locations the sink refused to associate
    pub failed_associations: usize,
    /// Visits abandoned on network errors or non-success status
    pub failed_visits: usize,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} listing pages ({} past the end), {} detail pages, {} records saved, {} locations matched ({} failed), {} failed visits",
            self.listing_pages,
            self.listing_past_end,
            self.detail_pages,
            self.records_saved,
            self.locations_matched,
            self.failed_associations,
            self.failed_visits
        )
    }
}

#[derive(Debug, Default)]
struct Counters {
    listing_pages: AtomicUsize,
    listing_past_end: AtomicUsize,
    detail_pages: AtomicUsize,
    records_saved: AtomicUsize,
    locations_matched: AtomicUsize,
    failed_associations: AtomicUsize,
    failed_visits: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn report(&self) -> CrawlReport {
        CrawlReport {
            listing_pages: self.listing_pages.load(Ordering::Relaxed),
            listing_past_end: self.listing_past_end.load(Ordering::Relaxed),
            detail_pages: self.detail_pages.load(Ordering::Relaxed),
            records_saved: self.records_saved.load(Ordering::Relaxed),
            locations_matched: self.locations_matched.load(Ordering::Relaxed),
            failed_associations: self.failed_associations.load(Ordering::Relaxed),
            failed_visits: self.failed_visits.load(Ordering::Relaxed),
        }
    }
}

struct SinkFailure {
    link: String,
    source: Box<dyn std::error::Error + Send + Sync>,
}

/// State shared by the visit handlers of one run
struct Run<S: JobSink> {
    sink: Arc<S>,
    matcher: Arc<LocationMatcher>,
    links: Arc<LinkDiscoverer>,
    details: Arc<DetailExtractor>,
    detail_crawler: Crawler,
    detail_url_pattern: Option<Regex>,
    counters: Counters,
    stopped: AtomicBool,
    failure: Mutex<Option<SinkFailure>>,
}

impl<S: JobSink> Run<S> {
    fn on_listing(self: &Arc<Self>, url: &Url, result: Result<Page, CrawlError>) {
        let page = match result {
            Ok(page) => page,
            Err(e) if e.is_not_found() => {
                Counters::bump(&self.counters.listing_past_end);
                debug!(url = %url, "Listing page past the end");
                return;
            }
            Err(e) => {
                Counters::bump(&self.counters.failed_visits);
                warn!(url = %url, status = ?e.status(), error = %e, "Listing visit failed");
                return;
            }
        };

        Counters::bump(&self.counters.listing_pages);
        let discovered = self.links.discover(&page.html, &page.url);
        debug!(url = %url, links = discovered.len(), "Discovered detail links");

        for link in discovered {
            if !self.accepts(&link) {
                debug!(link = %link, "Skipping link outside detail pages");
                continue;
            }
            let run = Arc::clone(self);
            let visited = link.clone();
            self.detail_crawler
                .submit(link, move |result| async move {
                    run.on_detail(&visited, result).await;
                });
        }
    }

    fn accepts(&self, link: &Url) -> bool {
        self.detail_url_pattern
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(link.as_str()))
    }

    async fn on_detail(&self, url: &Url, result: Result<Page, CrawlError>) {
        let page = match result {
            Ok(page) => page,
            Err(e) => {
                Counters::bump(&self.counters.failed_visits);
                warn!(url = %url, status = ?e.status(), error = %e, "Detail visit failed");
                return;
            }
        };
        Counters::bump(&self.counters.detail_pages);

        if self.stopped.load(Ordering::Acquire) {
            debug!(url = %url, "Sink failed earlier, not storing");
            return;
        }

        let record = self.details.extract(&page.html, &page.url);
        let canonical = self
            .matcher
            .best_match(&record.location)
            .entry
            .map(GazetteerEntry::address);

        if let Err(e) = self.sink.upsert(&record).await {
            error!(link = %record.link, error = %e, "Failed to store record");
            self.stopped.store(true, Ordering::Release);
            let mut failure = self.failure.lock().await;
            if failure.is_none() {
                *failure = Some(SinkFailure {
                    link: record.link.clone(),
                    source: Box::new(e),
                });
            }
            return;
        }
        Counters::bump(&self.counters.records_saved);

        let Some(address) = canonical else {
            debug!(link = %record.link, location = %record.location, "No canonical location");
            return;
        };
        match self.sink.associate_location(&record.link, &address).await {
            Ok(()) => Counters::bump(&self.counters.locations_matched),
            Err(e) => {
                Counters::bump(&self.counters.failed_associations);
                warn!(link = %record.link, address = %address, error = %e, "Failed to associate location");
            }
        }
    }
}

/// Crawls listing and detail pages into a sink
pub struct Pipeline<S: JobSink> {
    config: PipelineConfig,
    sink: Arc<S>,
    matcher: Arc<LocationMatcher>,
    links: Arc<LinkDiscoverer>,
    details: Arc<DetailExtractor>,
    listing_crawler: Crawler,
    detail_crawler: Crawler,
    state: watch::Sender<PipelineState>,
    run_lock: Mutex<()>,
}

impl<S: JobSink> Pipeline<S> {
    /// Build a pipeline; the matcher is shared read-only by every visit
    pub fn new(
        config: PipelineConfig,
        sink: Arc<S>,
        matcher: Arc<LocationMatcher>,
    ) -> Result<Self, PipelineError> {
        let listing_crawler = Crawler::new("listing", &config.listing)?;
        let detail_crawler = Crawler::new("detail", &config.detail)?;
        let (state, _) = watch::channel(PipelineState::Idle);

        Ok(Self {
            links: Arc::new(LinkDiscoverer::new()?),
            details: Arc::new(DetailExtractor::new()?),
            config,
            sink,
            matcher,
            listing_crawler,
            detail_crawler,
            state,
            run_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn sink(&self) -> &Arc<S> {
        &self.sink
    }

    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    /// Follow state changes of current and future runs
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Visits currently queued or running, listing then detail
    pub fn pending(&self) -> (usize, usize) {
        (self.listing_crawler.pending(), self.detail_crawler.pending())
    }

    /// Crawl the configured number of listing pages per profession
    pub async fn update(&self) -> Result<CrawlReport, PipelineError> {
        self.update_pages(self.config.max_pages).await
    }

    /// Crawl pages `1..=max_pages` of every profession and wait for all
    /// detail pages they link to
    ///
    /// Safe to call again after a run finishes; already stored links are
    /// upserted again.
    #[instrument(skip(self))]
    pub async fn update_pages(&self, max_pages: u32) -> Result<CrawlReport, PipelineError> {
        let _running = self
            .run_lock
            .try_lock()
            .map_err(|_| PipelineError::AlreadyRunning)?;
        let base = Url::parse(&self.config.listing_url)?;

        let run = Arc::new(Run {
            sink: Arc::clone(&self.sink),
            matcher: Arc::clone(&self.matcher),
            links: Arc::clone(&self.links),
            details: Arc::clone(&self.details),
            detail_crawler: self.detail_crawler.clone(),
            detail_url_pattern: self.config.detail_url_pattern.clone(),
            counters: Counters::default(),
            stopped: AtomicBool::new(false),
            failure: Mutex::new(None),
        });

        self.state.send_replace(PipelineState::Enumerating);
        for profession in &self.config.professions {
            for page in 1..=max_pages {
                let url = listing_url(&base, &self.config.location, profession, page);
                let run = Arc::clone(&run);
                let visited = url.clone();
                self.listing_crawler
                    .submit(url, move |result| async move {
                        run.on_listing(&visited, result);
                    });
            }
        }
        info!(
            professions = self.config.professions.len(),
            max_pages, "Submitted listing pages"
        );

        self.state.send_replace(PipelineState::Draining);
        self.listing_crawler.wait().await;
        self.detail_crawler.wait().await;
        self.state.send_replace(PipelineState::Done);

        let report = run.counters.report();
        info!(%report, "Crawl finished");

        let failure = run.failure.lock().await.take();
        match failure {
            Some(failure) => Err(PipelineError::Sink {
                link: failure.link,
                source: failure.source,
            }),
            None => Ok(report),
        }
    }
}
