//! # Crawler Configuration Module
//!
//! Politeness and scope settings for a crawl run. Both config structs use a
//! builder so callers only override what they need.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: limits for one scheduler (parallelism, delay, timeout)
//! - `PipelineConfig`: what to enumerate and how each stage is configured

use regex::Regex;
use std::time::Duration;

use crate::crawler::listing::Profession;

/// Listing search endpoint of the job board
pub const DEFAULT_LISTING_URL: &str = "https://www.cake.me/jobs";

/// Location filter applied to listing searches
pub const DEFAULT_LOCATION: &str = "Taiwan";

/// Shape of a job detail URL: `/companies/<company>/jobs/<job>`
pub const DEFAULT_DETAIL_URL_PATTERN: &str =
    r"^https?://[^/]+/companies/[^/?#]+/jobs/[^/?#]+/?(?:[?#].*)?$";

/// Configuration for one crawl scheduler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight at once
    pub parallelism: usize,

    /// Upper bound of the random delay added before each request
    pub random_delay_ms: u64,

    /// Sustained request rate allowed per host
    pub requests_per_second: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent to use for requests
    pub user_agent: String,

    /// Value of the `locale` cookie sent with every request
    pub locale: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            parallelism: 30,
            random_delay_ms: 200,
            requests_per_second: 10,
            timeout_secs: 30,
            user_agent: format!("cake-crawler/{}", env!("CARGO_PKG_VERSION")),
            locale: Some("en".to_string()),
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of concurrent requests
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.config.parallelism = parallelism;
        self
    }

    /// Set the upper bound of the random per-request delay
    pub fn random_delay_ms(mut self, random_delay_ms: u64) -> Self {
        self.config.random_delay_ms = random_delay_ms;
        self
    }

    /// Set the sustained per-host request rate
    pub fn requests_per_second(mut self, requests_per_second: u32) -> Self {
        self.config.requests_per_second = requests_per_second;
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set or clear the `locale` cookie
    pub fn locale(mut self, locale: Option<String>) -> Self {
        self.config.locale = locale;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the random delay bound as a Duration
    pub fn random_delay(&self) -> Duration {
        Duration::from_millis(self.random_delay_ms)
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration for a full listing-to-detail crawl
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Listing search endpoint, without query
    pub listing_url: String,

    /// Value of the location filter
    pub location: String,

    /// Profession filters, each enumerated separately
    pub professions: Vec<Profession>,

    /// Pages enumerated per profession by `update`
    pub max_pages: u32,

    /// Scheduler settings for listing pages
    pub listing: CrawlerConfig,

    /// Scheduler settings for detail pages
    pub detail: CrawlerConfig,

    /// Discovered URLs not matching this are skipped; `None` accepts all
    pub detail_url_pattern: Option<Regex>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            professions: Profession::defaults(),
            max_pages: 10,
            listing: CrawlerConfig::default(),
            detail: CrawlerConfig::default(),
            detail_url_pattern: Regex::new(DEFAULT_DETAIL_URL_PATTERN).ok(),
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn listing_url(mut self, listing_url: impl Into<String>) -> Self {
        self.config.listing_url = listing_url.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.config.location = location.into();
        self
    }

    pub fn professions(mut self, professions: Vec<Profession>) -> Self {
        self.config.professions = professions;
        self
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    pub fn listing(mut self, listing: CrawlerConfig) -> Self {
        self.config.listing = listing;
        self
    }

    pub fn detail(mut self, detail: CrawlerConfig) -> Self {
        self.config.detail = detail;
        self
    }

    /// Apply the same scheduler settings to both stages
    pub fn crawler(self, crawler: CrawlerConfig) -> Self {
        self.listing(crawler.clone()).detail(crawler)
    }

    pub fn detail_url_pattern(mut self, pattern: Option<Regex>) -> Self {
        self.config.detail_url_pattern = pattern;
        self
    }

    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}
