//! Labelled job attribute enums
//!
//! Each variant corresponds to the label the job board renders in its
//! markup. The same label is used for display, serialization and storage so a
//! stored record reads back identically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract type of a posting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    #[serde(rename = "Internship")]
    Internship,
    #[serde(rename = "Contract")]
    Contract,
    #[serde(rename = "Temporary")]
    Temporary,
    #[serde(rename = "Volunteer")]
    Volunteer,
    #[serde(rename = "Freelance")]
    Freelance,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl EmploymentType {
    /// Parse a site label, `None` if the label is not an employment type
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Full-time" => Some(Self::FullTime),
            "Part-time" => Some(Self::PartTime),
            "Internship" => Some(Self::Internship),
            "Contract" => Some(Self::Contract),
            "Temporary" => Some(Self::Temporary),
            "Volunteer" => Some(Self::Volunteer),
            "Freelance" => Some(Self::Freelance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTime => "Full-time",
            Self::PartTime => "Part-time",
            Self::Internship => "Internship",
            Self::Contract => "Contract",
            Self::Temporary => "Temporary",
            Self::Volunteer => "Volunteer",
            Self::Freelance => "Freelance",
            Self::Unknown => "Unknown",
        }
    }
}

/// Seniority level of a posting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seniority {
    #[serde(rename = "Entry level")]
    EntryLevel,
    #[serde(rename = "Mid-Senior level")]
    MidSeniorLevel,
    #[serde(rename = "Intern")]
    Intern,
    #[serde(rename = "Assistant")]
    Assistant,
    #[serde(rename = "Director")]
    Director,
    #[serde(rename = "Executive (VP, GM, C-Level)")]
    Executive,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Seniority {
    /// Parse a site label, `None` if the label is not a seniority level
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Entry level" => Some(Self::EntryLevel),
            "Mid-Senior level" => Some(Self::MidSeniorLevel),
            "Intern" => Some(Self::Intern),
            "Assistant" => Some(Self::Assistant),
            "Director" => Some(Self::Director),
            "Executive (VP, GM, C-Level)" => Some(Self::Executive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntryLevel => "Entry level",
            Self::MidSeniorLevel => "Mid-Senior level",
            Self::Intern => "Intern",
            Self::Assistant => "Assistant",
            Self::Director => "Director",
            Self::Executive => "Executive (VP, GM, C-Level)",
            Self::Unknown => "Unknown",
        }
    }
}

/// Remote work policy of a posting
///
/// `Unknown` means no detail page has confirmed anything yet, while `None`
/// means the page was opened and offered no remote option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Remote {
    #[serde(rename = "100% Remote Work")]
    Full,
    #[serde(rename = "Partial Remote Work")]
    Partial,
    #[serde(rename = "Optional Remote Work")]
    Optional,
    #[serde(rename = "No Remote Work")]
    None,
    #[default]
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Remote {
    /// Parse a site label, `None` if the label is not a remote policy
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "100% Remote Work" => Some(Self::Full),
            "Partial Remote Work" => Some(Self::Partial),
            "Optional Remote Work" => Some(Self::Optional),
            "No Remote Work" => Some(Self::None),
            _ => Option::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "100% Remote Work",
            Self::Partial => "Partial Remote Work",
            Self::Optional => "Optional Remote Work",
            Self::None => "No Remote Work",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_label() {
        for kind in [
            EmploymentType::FullTime,
            EmploymentType::PartTime,
            EmploymentType::Internship,
            EmploymentType::Contract,
            EmploymentType::Temporary,
            EmploymentType::Volunteer,
            EmploymentType::Freelance,
        ] {
            assert_eq!(EmploymentType::from_label(kind.as_str()), Some(kind));
        }
        assert_eq!(
            Seniority::from_label("Executive (VP, GM, C-Level)"),
            Some(Seniority::Executive)
        );
        assert_eq!(Remote::from_label("No Remote Work"), Some(Remote::None));
    }

    #[test]
    fn test_unknown_is_never_parsed() {
        assert_eq!(EmploymentType::from_label("Unknown"), None);
        assert_eq!(Seniority::from_label("Unknown"), None);
        assert_eq!(Remote::from_label("Unknown"), None);
        assert_eq!(Remote::from_label(""), None);
        assert_eq!(EmploymentType::from_label("full-time"), None);
    }

    #[test]
    fn test_defaults_are_unknown() {
        assert_eq!(EmploymentType::default(), EmploymentType::Unknown);
        assert_eq!(Seniority::default(), Seniority::Unknown);
        assert_eq!(Remote::default(), Remote::Unknown);
    }

    #[test]
    fn test_serializes_as_site_label() {
        let json = serde_json::to_string(&Remote::Full).unwrap();
        assert_eq!(json, "\"100% Remote Work\"");
        let parsed: Seniority = serde_json::from_str("\"Mid-Senior level\"").unwrap();
        assert_eq!(parsed, Seniority::MidSeniorLevel);
    }
}
