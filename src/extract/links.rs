//! Detail-page link discovery on listing pages

use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

use crate::extract::error::ExtractError;

const SEARCH_HITS: &str = "div[class^='JobSearchHits_list__']";
const JOB_TITLE_LINK: &str = "a[class^='JobSearchItem_jobTitle__']";

/// Finds job detail URLs on a listing page
pub struct LinkDiscoverer {
    search_hits: Selector,
    job_title_link: Selector,
}

impl LinkDiscoverer {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            search_hits: Selector::parse(SEARCH_HITS)
                .map_err(|e| ExtractError::selector(SEARCH_HITS, e))?,
            job_title_link: Selector::parse(JOB_TITLE_LINK)
                .map_err(|e| ExtractError::selector(JOB_TITLE_LINK, e))?,
        })
    }

    /// Absolute detail URLs found on the page at `page_url`
    ///
    /// Empty hrefs are dropped, relative ones are resolved against
    /// `page_url` and duplicates are reported once, in document order.
    pub fn discover(&self, html: &str, page_url: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for hits in document.select(&self.search_hits) {
            for anchor in hits.select(&self.job_title_link) {
                let Some(href) = anchor.value().attr("href").map(str::trim) else {
                    continue;
                };
                if href.is_empty() {
                    continue;
                }
                match page_url.join(href) {
                    Ok(link) => {
                        if seen.insert(link.clone()) {
                            links.push(link);
                        }
                    }
                    Err(e) => debug!(href, error = %e, "Skipping unresolvable href"),
                }
            }
        }

        links
    }
}
