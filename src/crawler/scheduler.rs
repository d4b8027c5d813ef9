//! Bounded, rate-limited page fetching
//!
//! A `Crawler` accepts fire-and-forget visits. Each visit waits for a
//! parallelism permit and for the per-host rate limiter, fetches the page,
//! releases the permit and then runs its handler. A visit only counts as
//! finished once its handler returns, so work a handler submits elsewhere is
//! registered before this crawler can report idle.

use governor::{DefaultKeyedRateLimiter, Jitter, Quota, RateLimiter};
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};
use tracing::{Instrument, debug, debug_span, info_span};
use url::Url;

use crate::crawler::config::CrawlerConfig;
use crate::crawler::error::CrawlError;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// Final URL after redirects
    pub url: Url,
    pub status: u16,
    pub html: String,
}

/// Counts queued and running visits and wakes waiters at zero
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn enter(self: &Arc<Self>) -> VisitGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        VisitGuard {
            tracker: Arc::clone(self),
        }
    }

    fn leave(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }

    fn pending(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Marks one visit as finished when dropped, even if its task panics
struct VisitGuard {
    tracker: Arc<InFlight>,
}

impl Drop for VisitGuard {
    fn drop(&mut self) {
        self.tracker.leave();
    }
}

struct Inner {
    name: &'static str,
    client: reqwest::Client,
    permits: Semaphore,
    limiter: DefaultKeyedRateLimiter<String>,
    jitter: Duration,
}

/// One crawl stage with its own parallelism and politeness budget
#[derive(Clone)]
pub struct Crawler {
    inner: Arc<Inner>,
    tracker: Arc<InFlight>,
}

impl Crawler {
    /// Create a crawler; `name` labels its log spans
    pub fn new(name: &'static str, config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        if let Some(locale) = &config.locale {
            let cookie = HeaderValue::from_str(&format!("locale={}", locale))
                .map_err(|e| CrawlError::Other(format!("Invalid locale cookie: {}", e)))?;
            headers.insert(header::COOKIE, cookie);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::keyed(Quota::per_second(rate));

        Ok(Self {
            inner: Arc::new(Inner {
                name,
                client,
                permits: Semaphore::new(config.parallelism.max(1)),
                limiter,
                jitter: config.random_delay(),
            }),
            tracker: Arc::new(InFlight::default()),
        })
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Visits queued or running
    pub fn pending(&self) -> usize {
        self.tracker.pending()
    }

    /// Queue a visit of `url`; `handler` receives the outcome
    pub fn submit<F, Fut>(&self, url: Url, handler: F)
    where
        F: FnOnce(Result<Page, CrawlError>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let guard = self.tracker.enter();
        let inner = Arc::clone(&self.inner);
        let span = info_span!("visit", crawler = inner.name, url = %url);

        tokio::spawn(
            async move {
                let _guard = guard;
                let result = inner.fetch(url).await;
                handler(result).await;
            }
            .instrument(span),
        );
    }

    /// Resolve once nothing is queued or running
    pub async fn wait(&self) {
        self.tracker.wait_idle().await;
    }
}

impl Inner {
    async fn fetch(&self, url: Url) -> Result<Page, CrawlError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| CrawlError::Other(format!("Crawler closed: {}", e)))?;

        if let Some(host) = url.host_str() {
            let delay = Jitter::up_to(self.jitter) + Duration::ZERO;
            async {
                tokio::time::sleep(delay).await;
                self.limiter
                    .until_key_ready_with_jitter(&host.to_string(), Jitter::up_to(self.jitter))
                    .await;
            }
            .instrument(debug_span!("limiter", delay_ms = delay.as_millis() as u64))
            .await;
        }

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let html = response.text().await?;
        debug!(status = status.as_u16(), bytes = html.len(), "Fetched page");

        Ok(Page {
            url: final_url,
            status: status.as_u16(),
            html,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tokio::sync::Mutex;

    fn fast_config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .parallelism(2)
            .random_delay_ms(0)
            .requests_per_second(1000)
            .build()
    }

    #[tokio::test]
    async fn test_visits_run_handlers_and_drain() {
        let mut server = Server::new_async().await;
        let ok = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_body("<html>hello</html>")
            .match_header("cookie", "locale=en")
            .expect(3)
            .create_async()
            .await;
        let broken = server
            .mock("GET", "/broken")
            .with_status(500)
            .create_async()
            .await;

        let crawler = Crawler::new("test", &fast_config()).unwrap();
        let outcomes = Arc::new(Mutex::new(Vec::new()));

        let base = Url::parse(&server.url()).unwrap();
        for path in ["/ok", "/ok", "/ok", "/broken"] {
            let outcomes = Arc::clone(&outcomes);
            crawler.submit(base.join(path).unwrap(), move |result| async move {
                let outcome = match result {
                    Ok(page) => Ok(page.html),
                    Err(e) => Err(e.status()),
                };
                outcomes.lock().await.push(outcome);
            });
        }
        crawler.wait().await;

        assert_eq!(crawler.pending(), 0);
        let outcomes = outcomes.lock().await;
        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            outcomes.iter().filter(|o| o.as_deref() == Ok("<html>hello</html>")).count(),
            3
        );
        assert!(outcomes.contains(&Err(Some(500))));

        ok.assert_async().await;
        broken.assert_async().await;
    }

    #[tokio::test]
    async fn test_handler_submissions_are_awaited() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Any)
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let first = Crawler::new("first", &fast_config()).unwrap();
        let second = Crawler::new("second", &fast_config()).unwrap();
        let done = Arc::new(AtomicUsize::new(0));

        let base = Url::parse(&server.url()).unwrap();
        for n in 0..3 {
            let second = second.clone();
            let done = Arc::clone(&done);
            let next = base.join(&format!("/next/{}", n)).unwrap();
            first.submit(base.join("/start").unwrap(), move |_| async move {
                second.submit(next, move |_| async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    done.fetch_add(1, Ordering::SeqCst);
                });
            });
        }

        first.wait().await;
        second.wait().await;

        assert_eq!(done.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_wait_without_work_returns() {
        let crawler = Crawler::new("idle", &fast_config()).unwrap();
        crawler.wait().await;
        assert_eq!(crawler.pending(), 0);
    }

    #[tokio::test]
    async fn test_locale_cookie_can_be_disabled() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header("cookie", mockito::Matcher::Missing)
            .match_header("user-agent", "test-agent")
            .with_status(200)
            .create_async()
            .await;

        let config = CrawlerConfig::builder()
            .locale(None)
            .user_agent("test-agent")
            .random_delay_ms(0)
            .build();
        let crawler = Crawler::new("plain", &config).unwrap();
        let status = Arc::new(Mutex::new(None));

        let seen = Arc::clone(&status);
        crawler.submit(Url::parse(&server.url()).unwrap(), move |result| async move {
            *seen.lock().await = result.ok().map(|page| page.status);
        });
        crawler.wait().await;

        assert_eq!(*status.lock().await, Some(200));
        mock.assert_async().await;
    }
}
