//! Canonical place list used to reconcile scraped locations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::location::error::GazetteerError;

/// Country every entry of the bundled dataset belongs to
pub const DEFAULT_COUNTRY: &str = "Taiwan";

/// One canonical place
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub country: String,
    pub city: String,
    pub area: String,
    /// Stored as metadata only, never part of the address
    pub zip_code: String,
}

impl GazetteerEntry {
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        area: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            area: area.into(),
            zip_code: zip_code.into(),
        }
    }

    /// Display address, finest component first: `Area, City, Country`
    pub fn address(&self) -> String {
        [&self.area, &self.city, &self.country]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for GazetteerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

/// Source of gazetteer entries, read once per process
pub trait GazetteerSource {
    fn load(&self) -> Result<Vec<GazetteerEntry>, GazetteerError>;
}

#[derive(Debug, Deserialize)]
struct CityRecord {
    #[serde(rename = "city_name_en")]
    name: String,
    #[serde(rename = "area_list", default)]
    areas: Vec<AreaRecord>,
}

#[derive(Debug, Deserialize)]
struct AreaRecord {
    #[serde(rename = "area_name_en")]
    name: String,
    #[serde(default)]
    zip_code: String,
}

/// Hierarchical JSON dataset: an array of cities, each with its areas
#[derive(Debug, Clone)]
pub struct JsonGazetteerSource {
    path: PathBuf,
    country: String,
}

impl JsonGazetteerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Country name to attach to every entry
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GazetteerSource for JsonGazetteerSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<GazetteerEntry>, GazetteerError> {
        let data = std::fs::read_to_string(&self.path).map_err(|source| GazetteerError::Io {
            path: self.path.clone(),
            source,
        })?;
        let entries = parse_entries(&self.country, &data)?;
        info!("Loaded {} gazetteer entries", entries.len());
        Ok(entries)
    }
}

/// Flatten the city/area hierarchy into entries
///
/// The bare country comes first, then each city followed by its areas.
pub fn parse_entries(country: &str, json: &str) -> Result<Vec<GazetteerEntry>, GazetteerError> {
    let cities: Vec<CityRecord> = serde_json::from_str(json)?;

    let mut entries = vec![GazetteerEntry::new(country, "", "", "")];
    for city in cities {
        entries.push(GazetteerEntry::new(country, city.name.as_str(), "", ""));
        for area in city.areas {
            entries.push(GazetteerEntry::new(
                country,
                city.name.as_str(),
                area.name,
                area.zip_code,
            ));
        }
    }
    Ok(entries)
}

/// Immutable, ordered list of canonical places
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
}

impl Gazetteer {
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        Self { entries }
    }

    /// Load every entry from `source`
    pub fn load(source: &impl GazetteerSource) -> Result<Self, GazetteerError> {
        source.load().map(Self::new)
    }

    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"city_name": "臺北市", "city_name_en": "Taipei City", "area_list": [
            {"zip_code": "100", "area_name": "中正區", "area_name_en": "Zhongzheng District"},
            {"zip_code": "103", "area_name": "大同區", "area_name_en": "Datong District"}
        ]},
        {"city_name_en": "Keelung City", "area_list": []}
    ]"#;

    #[test]
    fn test_address_skips_empty_parts() {
        assert_eq!(GazetteerEntry::new("Taiwan", "", "", "").address(), "Taiwan");
        assert_eq!(
            GazetteerEntry::new("Taiwan", "Taipei City", "", "").address(),
            "Taipei City, Taiwan"
        );
        assert_eq!(
            GazetteerEntry::new("Taiwan", "Taipei City", "Zhongzheng District", "100").address(),
            "Zhongzheng District, Taipei City, Taiwan"
        );
    }

    #[test]
    fn test_parse_entries_flattens_hierarchy() {
        let entries = parse_entries("Taiwan", SAMPLE).unwrap();

        let addresses: Vec<String> = entries.iter().map(GazetteerEntry::address).collect();
        assert_eq!(
            addresses,
            vec![
                "Taiwan",
                "Taipei City, Taiwan",
                "Zhongzheng District, Taipei City, Taiwan",
                "Datong District, Taipei City, Taiwan",
                "Keelung City, Taiwan",
            ]
        );
        assert_eq!(entries[2].zip_code, "100");
    }

    #[test]
    fn test_json_source_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = JsonGazetteerSource::new(file.path()).with_country("Republic of China");
        let gazetteer = Gazetteer::load(&source).unwrap();

        assert_eq!(gazetteer.len(), 5);
        assert_eq!(gazetteer.entries()[0].country, "Republic of China");
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let source = JsonGazetteerSource::new("/nonexistent/address.json");
        assert!(matches!(source.load(), Err(GazetteerError::Io { .. })));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            parse_entries("Taiwan", "{\"city\": 1}"),
            Err(GazetteerError::Json(_))
        ));
    }
}
