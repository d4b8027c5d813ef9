//! Job detail page extraction

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

use crate::extract::classifier::{InfoRow, apply_row};
use crate::extract::error::ExtractError;
use crate::extract::text::{child_attr, child_text, child_texts, plain_text};
use crate::job::{JobRecord, Remote};

const COMPANY: &str = "div[class^='JobDescriptionLeftColumn_companyInfo__'] > a > h2";
const TITLE: &str = "h1[class^='JobDescriptionLeftColumn_title__']";
const BREADCRUMBS: &str = "div[class^='Breadcrumbs_wrapper__']";
const BREADCRUMB_LABEL: &str = "a > span";
const INFO_ROW: &str = "div[class^='JobDescriptionRightColumn_jobInfo__'] > div[class^='JobDescriptionRightColumn_row__']";
const CONTENT_SECTION: &str = "div[class^='ContentSection_contentSection__']";
const SECTION_TITLE: &str = "h3[class^='ContentSection_title__']";
const SECTION_BODY: &str = "div[class^='RailsHtml_container__']";

/// Free-text sections recognised by their heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentSection {
    InterviewProcess,
    JobDescription,
    Requirements,
}

impl ContentSection {
    fn from_heading(heading: &str) -> Option<Self> {
        match heading {
            "Interview process" => Some(Self::InterviewProcess),
            "Job Description" => Some(Self::JobDescription),
            "Requirements" => Some(Self::Requirements),
            _ => None,
        }
    }

    fn field<'a>(&self, record: &'a mut JobRecord) -> &'a mut String {
        match self {
            Self::InterviewProcess => &mut record.interview_process,
            Self::JobDescription => &mut record.job_description,
            Self::Requirements => &mut record.requirements,
        }
    }
}

struct DetailSelectors {
    company: Selector,
    title: Selector,
    breadcrumbs: Selector,
    breadcrumb_label: Selector,
    info_row: Selector,
    icon: Selector,
    anchor: Selector,
    span: Selector,
    content_section: Selector,
    section_title: Selector,
    section_body: Selector,
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::selector(selector, e))
}

/// Builds a [`JobRecord`] from a job detail page
pub struct DetailExtractor {
    selectors: DetailSelectors,
}

impl DetailExtractor {
    /// Create an extractor with the job board's markup selectors
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            selectors: DetailSelectors {
                company: compile(COMPANY)?,
                title: compile(TITLE)?,
                breadcrumbs: compile(BREADCRUMBS)?,
                breadcrumb_label: compile(BREADCRUMB_LABEL)?,
                info_row: compile(INFO_ROW)?,
                icon: compile("i")?,
                anchor: compile("a")?,
                span: compile("span")?,
                content_section: compile(CONTENT_SECTION)?,
                section_title: compile(SECTION_TITLE)?,
                section_body: compile(SECTION_BODY)?,
            },
        })
    }

    /// Parse `html` and extract the record for the page at `url`
    #[instrument(skip_all, fields(url = %url))]
    pub fn extract(&self, html: &str, url: &Url) -> JobRecord {
        let document = Html::parse_document(html);
        self.extract_document(&document, url)
    }

    /// Extract the record from an already parsed page
    pub fn extract_document(&self, document: &Html, url: &Url) -> JobRecord {
        let root = document.root_element();
        let selectors = &self.selectors;

        let mut record = JobRecord::new(url.as_str());
        record.company = child_text(root, &selectors.company);
        record.title = child_text(root, &selectors.title);
        // The page was opened, so on-site is confirmed unless a row says otherwise
        record.remote = Remote::None;

        // Only one- and two-level trails are categories
        for breadcrumbs in root.select(&selectors.breadcrumbs) {
            match child_texts(breadcrumbs, &selectors.breadcrumb_label).as_slice() {
                [main] => record.main_category = main.clone(),
                [main, sub] => {
                    record.main_category = main.clone();
                    record.sub_category = sub.clone();
                }
                _ => {}
            }
        }

        for row in self.info_rows(document) {
            apply_row(&mut record, &row);
        }

        for section in root.select(&selectors.content_section) {
            self.apply_section(&mut record, section);
        }

        debug!(
            company = %record.company,
            title = %record.title,
            tags = record.tags.len(),
            "Extracted job record"
        );
        record
    }

    /// Info rows of the page in document order
    pub fn info_rows(&self, document: &Html) -> Vec<InfoRow> {
        let selectors = &self.selectors;
        document
            .select(&selectors.info_row)
            .map(|row| InfoRow {
                icons: child_attr(row, &selectors.icon, "class")
                    .map(|classes| classes.split_whitespace().map(String::from).collect())
                    .unwrap_or_default(),
                anchors: child_texts(row, &selectors.anchor),
                spans: child_texts(row, &selectors.span),
            })
            .collect()
    }

    fn apply_section(&self, record: &mut JobRecord, section: ElementRef<'_>) {
        let heading = child_text(section, &self.selectors.section_title);
        let Some(kind) = ContentSection::from_heading(&heading) else {
            debug!(heading = %heading, "Skipping unrecognised content section");
            return;
        };

        let content = section
            .select(&self.selectors.section_body)
            .next()
            .map(plain_text)
            .unwrap_or_default();
        if content.is_empty() {
            return;
        }
        *kind.field(record) = content;
    }
}
