//! In-process sink used for dry runs and tests

use std::collections::BTreeMap;
use std::convert::Infallible;
use tokio::sync::Mutex;

use crate::job::JobRecord;
use crate::store::JobSink;

/// Keeps the latest record and location association for every link
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<BTreeMap<String, JobRecord>>,
    locations: Mutex<BTreeMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records ordered by link
    pub async fn records(&self) -> Vec<JobRecord> {
        self.records.lock().await.values().cloned().collect()
    }

    pub async fn record(&self, link: &str) -> Option<JobRecord> {
        self.records.lock().await.get(link).cloned()
    }

    /// Canonical address associated with `link`
    pub async fn association(&self, link: &str) -> Option<String> {
        self.locations.lock().await.get(link).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl JobSink for MemorySink {
    type Error = Infallible;

    async fn upsert(&self, record: &JobRecord) -> Result<(), Self::Error> {
        self.locations.lock().await.remove(&record.link);
        self.records
            .lock()
            .await
            .insert(record.link.clone(), record.clone());
        Ok(())
    }

    async fn associate_location(&self, link: &str, address: &str) -> Result<(), Self::Error> {
        self.locations
            .lock()
            .await
            .insert(link.to_string(), address.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_replaces_by_link() {
        let sink = MemorySink::new();
        let mut record = JobRecord::new("https://www.cake.me/companies/acme/jobs/backend");
        record.title = "Backend Engineer".to_string();
        sink.upsert(&record).await.unwrap();

        record.title = "Senior Backend Engineer".to_string();
        sink.upsert(&record).await.unwrap();

        assert_eq!(sink.len().await, 1);
        let stored = sink.record(&record.link).await.unwrap();
        assert_eq!(stored.title, "Senior Backend Engineer");
    }

    #[tokio::test]
    async fn test_upsert_clears_previous_association() {
        let sink = MemorySink::new();
        let record = JobRecord::new("https://www.cake.me/companies/acme/jobs/backend");

        sink.upsert(&record).await.unwrap();
        sink.associate_location(&record.link, "Taipei City, Taiwan")
            .await
            .unwrap();
        assert_eq!(
            sink.association(&record.link).await.as_deref(),
            Some("Taipei City, Taiwan")
        );

        sink.upsert(&record).await.unwrap();
        assert_eq!(sink.association(&record.link).await, None);
    }
}
