//! Listing search URLs

use std::borrow::Cow;
use std::fmt;
use url::Url;

/// Profession filter code understood by the listing search
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profession(Cow<'static, str>);

impl Profession {
    pub const BACK_END_ENGINEER: Profession = Profession(Cow::Borrowed("it_back-end-engineer"));
    pub const DATA_ENGINEER: Profession = Profession(Cow::Borrowed("it_data-engineer"));
    pub const FRONT_END_ENGINEER: Profession = Profession(Cow::Borrowed("it_front-end-engineer"));

    /// Any other code accepted by the site
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    /// Professions crawled when none are configured
    pub fn defaults() -> Vec<Profession> {
        vec![
            Self::BACK_END_ENGINEER,
            Self::DATA_ENGINEER,
            Self::FRONT_END_ENGINEER,
        ]
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL of one page of search results, newest postings first
pub fn listing_url(base: &Url, location: &str, profession: &Profession, page: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("location_list[0]", location)
        .append_pair("profession[0]", profession.code())
        .append_pair("order", "latest")
        .append_pair("page", &page.to_string());
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url_query() {
        let base = Url::parse("https://www.cake.me/jobs").unwrap();
        let url = listing_url(&base, "Taiwan", &Profession::DATA_ENGINEER, 3);

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("location_list[0]".to_string(), "Taiwan".to_string()),
                ("profession[0]".to_string(), "it_data-engineer".to_string()),
                ("order".to_string(), "latest".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(url.path(), "/jobs");
    }

    #[test]
    fn test_listing_url_replaces_existing_query() {
        let base = Url::parse("https://www.cake.me/jobs?page=9").unwrap();
        let url = listing_url(&base, "Taiwan", &Profession::new("it_qa-engineer"), 1);

        assert_eq!(url.query_pairs().filter(|(k, _)| k == "page").count(), 1);
        assert!(url.query_pairs().any(|(k, v)| k == "profession[0]" && v == "it_qa-engineer"));
    }

    #[test]
    fn test_default_professions() {
        let codes: Vec<String> = Profession::defaults().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            codes,
            vec![
                "it_back-end-engineer",
                "it_data-engineer",
                "it_front-end-engineer"
            ]
        );
    }
}
