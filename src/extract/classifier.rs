//! Info-row field classification
//!
//! A detail page lists most job attributes as "info rows". A row either
//! carries an icon, in which case the icon decides which field its text
//! belongs to, or it is a bare list of link chips holding the employment
//! type, the seniority and free-form tags.
//!
//! Classification is pure: a row becomes a list of [`FieldAssignment`]s
//! which are then applied to a record. Missing anchors or spans simply
//! produce no assignment.

use crate::job::{EmploymentType, JobRecord, Remote, Seniority};

/// Raw content of one info row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoRow {
    /// Class tokens of the row's icon, empty when the row has no icon
    pub icons: Vec<String>,

    /// Trimmed anchor texts, in document order
    pub anchors: Vec<String>,

    /// Trimmed span texts, in document order
    pub spans: Vec<String>,
}

/// A single field value produced by classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldAssignment {
    EmploymentType(EmploymentType),
    Seniority(Seniority),
    Tag(String),
    Location(String),
    NumberToHire(u32),
    Experience(String),
    Salary(String),
    Remote(Remote),
}

impl FieldAssignment {
    /// Write the value into `record`; scalars overwrite, tags accumulate
    pub fn apply(self, record: &mut JobRecord) {
        match self {
            Self::EmploymentType(value) => record.employment_type = value,
            Self::Seniority(value) => record.seniority = value,
            Self::Tag(tag) => {
                record.tags.insert(tag);
            }
            Self::Location(value) => record.location = value,
            Self::NumberToHire(value) => record.number_to_hire = value,
            Self::Experience(value) => record.experience = value,
            Self::Salary(value) => record.salary = value,
            Self::Remote(value) => record.remote = value,
        }
    }
}

/// Icons the job board uses to label info rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoIcon {
    MapMarker,
    User,
    BusinessTime,
    DollarSign,
    House,
    Ellipsis,
}

impl InfoIcon {
    fn from_class(token: &str) -> Option<Self> {
        match token {
            "fa-map-marker-alt" => Some(Self::MapMarker),
            "fa-user" => Some(Self::User),
            "fa-business-time" => Some(Self::BusinessTime),
            "fa-dollar-sign" => Some(Self::DollarSign),
            "fa-house" => Some(Self::House),
            "fa-ellipsis-h" => Some(Self::Ellipsis),
            _ => None,
        }
    }

    fn classify(self, row: &InfoRow) -> Option<FieldAssignment> {
        let first_anchor = row.anchors.first();
        let first_span = row.spans.first();

        match self {
            Self::MapMarker => first_anchor.map(|text| FieldAssignment::Location(text.clone())),
            Self::User => first_span
                .and_then(|text| text.trim().parse().ok())
                .map(FieldAssignment::NumberToHire),
            Self::BusinessTime => first_span.map(|text| FieldAssignment::Experience(text.clone())),
            Self::DollarSign => first_span.map(|text| FieldAssignment::Salary(text.clone())),
            // An unrecognised label keeps whatever remote value is already set
            Self::House => first_span
                .and_then(|text| Remote::from_label(text))
                .map(FieldAssignment::Remote),
            Self::Ellipsis => first_anchor
                .filter(|text| !text.is_empty())
                .map(|text| FieldAssignment::Tag(text.clone())),
        }
    }
}

/// Classify one info row into field assignments
pub fn classify_row(row: &InfoRow) -> Vec<FieldAssignment> {
    if row.icons.is_empty() {
        return row
            .anchors
            .iter()
            .filter_map(|anchor| classify_chip(anchor))
            .collect();
    }

    row.icons
        .iter()
        .filter_map(|token| InfoIcon::from_class(token))
        .filter_map(|icon| icon.classify(row))
        .collect()
}

/// Classify `row` and apply every assignment to `record`
pub fn apply_row(record: &mut JobRecord, row: &InfoRow) {
    for assignment in classify_row(row) {
        assignment.apply(record);
    }
}

fn classify_chip(text: &str) -> Option<FieldAssignment> {
    if let Some(employment_type) = EmploymentType::from_label(text) {
        Some(FieldAssignment::EmploymentType(employment_type))
    } else if let Some(seniority) = Seniority::from_label(text) {
        Some(FieldAssignment::Seniority(seniority))
    } else if text.is_empty() {
        None
    } else {
        Some(FieldAssignment::Tag(text.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(icons: &[&str], anchors: &[&str], spans: &[&str]) -> InfoRow {
        InfoRow {
            icons: icons.iter().map(|s| s.to_string()).collect(),
            anchors: anchors.iter().map(|s| s.to_string()).collect(),
            spans: spans.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_chips_without_icon() {
        let assignments = classify_row(&row(
            &[],
            &["Full-time", "Mid-Senior level", "Rust", "Kubernetes"],
            &[],
        ));

        assert_eq!(
            assignments,
            vec![
                FieldAssignment::EmploymentType(EmploymentType::FullTime),
                FieldAssignment::Seniority(Seniority::MidSeniorLevel),
                FieldAssignment::Tag("Rust".to_string()),
                FieldAssignment::Tag("Kubernetes".to_string()),
            ]
        );
    }

    #[test]
    fn test_icon_rows_select_their_field() {
        let mut record = JobRecord::new("https://example.com/jobs/1");
        record.remote = Remote::None;

        apply_row(&mut record, &row(&["fas", "fa-map-marker-alt"], &["Taipei, Taiwan"], &[]));
        apply_row(&mut record, &row(&["fas", "fa-user"], &[], &["3"]));
        apply_row(&mut record, &row(&["fas", "fa-business-time"], &[], &["3 years"]));
        apply_row(&mut record, &row(&["fas", "fa-dollar-sign"], &[], &["80K ~ 120K TWD / month"]));
        apply_row(&mut record, &row(&["fas", "fa-house"], &[], &["Partial Remote Work"]));
        apply_row(&mut record, &row(&["fas", "fa-ellipsis-h"], &["Backend"], &[]));

        assert_eq!(record.location, "Taipei, Taiwan");
        assert_eq!(record.number_to_hire, 3);
        assert_eq!(record.experience, "3 years");
        assert_eq!(record.salary, "80K ~ 120K TWD / month");
        assert_eq!(record.remote, Remote::Partial);
        assert!(record.tags.contains("Backend"));
    }

    #[test]
    fn test_icons_with_missing_sources_never_panic() {
        for icon in [
            "fa-map-marker-alt",
            "fa-user",
            "fa-business-time",
            "fa-dollar-sign",
            "fa-house",
            "fa-ellipsis-h",
        ] {
            assert!(classify_row(&row(&[icon], &[], &[])).is_empty(), "{icon}");
        }

        let mut record = JobRecord::new("https://example.com/jobs/1");
        apply_row(&mut record, &row(&["fa-user", "fa-map-marker-alt"], &[], &[]));
        assert_eq!(record, JobRecord::new("https://example.com/jobs/1"));
    }

    #[test]
    fn test_malformed_number_keeps_prior_value() {
        let mut record = JobRecord::new("https://example.com/jobs/1");
        apply_row(&mut record, &row(&["fa-user"], &[], &["2"]));
        apply_row(&mut record, &row(&["fa-user"], &[], &["a few"]));

        assert_eq!(record.number_to_hire, 2);
    }

    #[test]
    fn test_unmapped_remote_label_keeps_none() {
        let mut record = JobRecord::new("https://example.com/jobs/1");
        record.remote = Remote::None;
        apply_row(&mut record, &row(&["fa-house"], &[], &["Hybrid, ask us"]));
        apply_row(&mut record, &row(&["fa-house"], &[], &[""]));

        assert_eq!(record.remote, Remote::None);
    }

    #[test]
    fn test_unknown_icons_are_ignored() {
        assert!(classify_row(&row(&["fas", "fa-rocket"], &["Launch"], &["soon"])).is_empty());
    }

    #[test]
    fn test_later_rows_overwrite_scalars_and_append_tags() {
        let mut record = JobRecord::new("https://example.com/jobs/1");
        apply_row(&mut record, &row(&["fa-dollar-sign"], &[], &["50K"]));
        apply_row(&mut record, &row(&["fa-ellipsis-h"], &["Go"], &[]));
        apply_row(&mut record, &row(&["fa-dollar-sign"], &[], &["60K"]));
        apply_row(&mut record, &row(&[], &["Go", "SQL"], &[]));

        assert_eq!(record.salary, "60K");
        assert_eq!(
            record.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Go", "SQL"]
        );
    }
}
