//! Job record model
//!
//! A `JobRecord` is created empty when a detail page is dequeued, filled
//! field by field while the page is classified, and handed to a sink once
//! the whole page has been processed. `link` is the identity used for
//! upserts and stays stable across re-crawls.

mod kinds;

pub use kinds::{EmploymentType, Remote, Seniority};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Structured fields of a single job posting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Canonical URL of the detail page
    pub link: String,

    /// Hiring company
    pub company: String,

    /// Job title
    pub title: String,

    /// First breadcrumb level
    pub main_category: String,

    /// Second breadcrumb level
    pub sub_category: String,

    pub employment_type: EmploymentType,

    pub seniority: Seniority,

    /// Location text exactly as scraped
    pub location: String,

    pub number_to_hire: u32,

    pub experience: String,

    pub salary: String,

    pub remote: Remote,

    pub interview_process: String,

    pub job_description: String,

    pub requirements: String,

    /// Free-form tags, deduplicated
    pub tags: BTreeSet<String>,
}

impl JobRecord {
    /// Create an empty record for a detail page
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = JobRecord::new("https://www.cake.me/companies/acme/jobs/backend");

        assert_eq!(record.link, "https://www.cake.me/companies/acme/jobs/backend");
        assert!(record.company.is_empty());
        assert_eq!(record.number_to_hire, 0);
        assert_eq!(record.remote, Remote::Unknown);
        assert_eq!(record.employment_type, EmploymentType::Unknown);
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut record = JobRecord::new("https://example.com/jobs/1");
        record.company = "Google".to_string();
        record.title = "Software Engineer".to_string();
        record.employment_type = EmploymentType::FullTime;
        record.seniority = Seniority::MidSeniorLevel;
        record.remote = Remote::Full;
        record.number_to_hire = 10;
        record.tags.insert("Go".to_string());
        record.tags.insert("Python".to_string());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"employment_type\":\"Full-time\""));

        let parsed: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
