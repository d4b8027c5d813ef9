//! Database operations for crawled jobs

use libsql::params::Params;
use libsql::{Connection, Row, Rows, params};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::job::{EmploymentType, JobRecord, Remote, Seniority};
use crate::location::GazetteerEntry;
use crate::store::JobSink;
use crate::store::error::StoreError;
use crate::store::filter::JobFilter;
use crate::store::schema;

/// A stored posting and its canonical location, if one was matched
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoredJob {
    #[serde(flatten)]
    pub record: JobRecord,
    pub canonical_location: Option<String>,
    pub updated_at: String,
}

/// Database manager for crawled jobs
#[derive(Clone)]
pub struct Database {
    conn: Connection,
    writes: Arc<Mutex<()>>,
}

impl Database {
    /// Create a new database manager
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection) -> Result<Self, StoreError> {
        schema::initialize_schema(&conn).await?;

        Ok(Self {
            conn,
            writes: Arc::new(Mutex::new(())),
        })
    }

    /// Create a new database manager from a path
    pub async fn new_from_path(path: &str) -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn).await
    }

    /// Execute a custom query with parameters
    pub async fn execute_query<P>(&self, sql: &str, params: P) -> Result<Rows, StoreError>
    where
        P: libsql::params::IntoParams,
    {
        self.conn
            .query(sql, params)
            .await
            .map_err(|e| StoreError::Query(format!("Failed to execute query: {}", e)))
    }

    /// Insert or update gazetteer entries keyed by address
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn save_locations(&self, entries: &[GazetteerEntry]) -> Result<usize, StoreError> {
        let _write = self.writes.lock().await;
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to start transaction: {}", e)))?;

        for entry in entries {
            tx.execute(
                "INSERT INTO locations (address, country, city, area, zip_code)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(address) DO UPDATE SET
                 country = excluded.country,
                 city = excluded.city,
                 area = excluded.area,
                 zip_code = excluded.zip_code",
                params![
                    entry.address(),
                    entry.country.clone(),
                    entry.city.clone(),
                    entry.area.clone(),
                    entry.zip_code.clone(),
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to save location: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to commit transaction: {}", e)))?;

        info!("Saved {} locations", entries.len());
        Ok(entries.len())
    }

    /// Number of seeded locations
    pub async fn location_count(&self) -> Result<i64, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM locations", params![])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to count locations: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| StoreError::Data(format!("Failed to get count: {}", e))),
            Ok(None) => Ok(0),
            Err(e) => Err(StoreError::Data(format!("Failed to get count: {}", e))),
        }
    }

    /// Insert or update a job by link, replacing its tags
    ///
    /// Any previous location association of the job is dropped.
    #[instrument(skip(self, record), fields(link = %record.link))]
    pub async fn upsert_job(&self, record: &JobRecord) -> Result<i64, StoreError> {
        let _write = self.writes.lock().await;
        let now = chrono::Utc::now().to_rfc3339();

        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to start transaction: {}", e)))?;

        tx.execute(
            "INSERT INTO jobs (link, company, title, main_category, sub_category,
                employment_type, seniority, location, number_to_hire, experience, salary,
                remote, interview_process, job_description, requirements, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(link) DO UPDATE SET
             company = excluded.company,
             title = excluded.title,
             main_category = excluded.main_category,
             sub_category = excluded.sub_category,
             employment_type = excluded.employment_type,
             seniority = excluded.seniority,
             location = excluded.location,
             number_to_hire = excluded.number_to_hire,
             experience = excluded.experience,
             salary = excluded.salary,
             remote = excluded.remote,
             interview_process = excluded.interview_process,
             job_description = excluded.job_description,
             requirements = excluded.requirements,
             updated_at = excluded.updated_at",
            params![
                record.link.clone(),
                record.company.clone(),
                record.title.clone(),
                record.main_category.clone(),
                record.sub_category.clone(),
                record.employment_type.as_str(),
                record.seniority.as_str(),
                record.location.clone(),
                i64::from(record.number_to_hire),
                record.experience.clone(),
                record.salary.clone(),
                record.remote.as_str(),
                record.interview_process.clone(),
                record.job_description.clone(),
                record.requirements.clone(),
                now,
            ],
        )
        .await
        .map_err(|e| StoreError::Query(format!("Failed to upsert job: {}", e)))?;

        let mut rows = tx
            .query("SELECT id FROM jobs WHERE link = ?", params![record.link.clone()])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to get job ID: {}", e)))?;
        let job_id: i64 = match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| StoreError::Data(format!("Failed to get ID: {}", e)))?,
            Ok(None) => {
                return Err(StoreError::Data(format!(
                    "No ID returned for job {}",
                    record.link
                )));
            }
            Err(e) => return Err(StoreError::Data(format!("Failed to get ID: {}", e))),
        };

        tx.execute("DELETE FROM jobs_tags WHERE job_id = ?", params![job_id])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to delete tags: {}", e)))?;
        tx.execute("DELETE FROM jobs_locations WHERE job_id = ?", params![job_id])
            .await
            .map_err(|e| StoreError::Query(format!("Failed to delete location: {}", e)))?;

        for tag in &record.tags {
            tx.execute(
                "INSERT INTO tags (name) VALUES (?) ON CONFLICT(name) DO NOTHING",
                params![tag.clone()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to add tag: {}", e)))?;
            tx.execute(
                "INSERT INTO jobs_tags (job_id, tag_id) SELECT ?, id FROM tags WHERE name = ?",
                params![job_id, tag.clone()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to tag job: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Transaction(format!("Failed to commit transaction: {}", e)))?;

        debug!(job_id, tags = record.tags.len(), "Stored job");
        Ok(job_id)
    }

    /// Point a stored job at a seeded canonical location
    #[instrument(skip(self))]
    pub async fn associate_job_location(&self, link: &str, address: &str) -> Result<(), StoreError> {
        let _write = self.writes.lock().await;

        let changed = self
            .conn
            .execute(
                "INSERT INTO jobs_locations (job_id, location_id)
                 SELECT j.id, l.id FROM jobs j, locations l
                 WHERE j.link = ? AND l.address = ?
                 ON CONFLICT(job_id) DO UPDATE SET location_id = excluded.location_id",
                params![link, address],
            )
            .await
            .map_err(|e| StoreError::Query(format!("Failed to associate location: {}", e)))?;

        if changed == 0 {
            return Err(StoreError::Data(format!(
                "No stored job {} or seeded location {}",
                link, address
            )));
        }
        Ok(())
    }

    /// Stored jobs matching `filter` with their tags and canonical location,
    /// ordered by link
    #[instrument(skip(self))]
    pub async fn find_jobs(&self, filter: &JobFilter) -> Result<Vec<StoredJob>, StoreError> {
        let mut tags: HashMap<i64, BTreeSet<String>> = HashMap::new();
        let mut rows = self
            .execute_query(
                "SELECT jt.job_id, t.name FROM jobs_tags jt JOIN tags t ON t.id = jt.tag_id",
                params![],
            )
            .await?;
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Data(format!("Failed to read tags: {}", e)))?
        {
            let job_id: i64 = row
                .get(0)
                .map_err(|e| StoreError::Data(format!("Failed to get job_id: {}", e)))?;
            let name: String = row
                .get(1)
                .map_err(|e| StoreError::Data(format!("Failed to get tag name: {}", e)))?;
            tags.entry(job_id).or_default().insert(name);
        }

        let (conditions, values) = filter.to_sql();
        let sql = format!(
            "SELECT j.id, j.link, j.company, j.title, j.main_category, j.sub_category,
                j.employment_type, j.seniority, j.location, j.number_to_hire, j.experience,
                j.salary, j.remote, j.interview_process, j.job_description, j.requirements,
                j.updated_at, l.address
             FROM jobs j
             LEFT JOIN jobs_locations jl ON jl.job_id = j.id
             LEFT JOIN locations l ON l.id = jl.location_id{}",
            conditions
        );
        let mut rows = self
            .execute_query(&sql, Params::Positional(values))
            .await?;

        let mut jobs = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Data(format!("Failed to read jobs: {}", e)))?
        {
            let (job_id, mut job) = self.row_to_job(&row)?;
            job.record.tags = tags.remove(&job_id).unwrap_or_default();
            jobs.push(job);
        }

        Ok(jobs)
    }

    /// Convert a database row to a StoredJob
    fn row_to_job(&self, row: &Row) -> Result<(i64, StoredJob), StoreError> {
        let text = |idx: i32, name: &str| -> Result<String, StoreError> {
            row.get(idx)
                .map_err(|e| StoreError::Data(format!("Failed to get {}: {}", name, e)))
        };

        let job_id: i64 = row
            .get(0)
            .map_err(|e| StoreError::Data(format!("Failed to get id: {}", e)))?;
        let number_to_hire: i64 = row
            .get(9)
            .map_err(|e| StoreError::Data(format!("Failed to get number_to_hire: {}", e)))?;
        let canonical_location: Option<String> = row
            .get(17)
            .map_err(|e| StoreError::Data(format!("Failed to get address: {}", e)))?;

        let record = JobRecord {
            link: text(1, "link")?,
            company: text(2, "company")?,
            title: text(3, "title")?,
            main_category: text(4, "main_category")?,
            sub_category: text(5, "sub_category")?,
            employment_type: EmploymentType::from_label(&text(6, "employment_type")?)
                .unwrap_or_default(),
            seniority: Seniority::from_label(&text(7, "seniority")?).unwrap_or_default(),
            location: text(8, "location")?,
            number_to_hire: u32::try_from(number_to_hire).unwrap_or_default(),
            experience: text(10, "experience")?,
            salary: text(11, "salary")?,
            remote: Remote::from_label(&text(12, "remote")?).unwrap_or_default(),
            interview_process: text(13, "interview_process")?,
            job_description: text(14, "job_description")?,
            requirements: text(15, "requirements")?,
            tags: BTreeSet::new(),
        };

        Ok((
            job_id,
            StoredJob {
                record,
                canonical_location,
                updated_at: text(16, "updated_at")?,
            },
        ))
    }
}

impl JobSink for Database {
    type Error = StoreError;

    async fn upsert(&self, record: &JobRecord) -> Result<(), Self::Error> {
        self.upsert_job(record).await.map(|_| ())
    }

    async fn associate_location(&self, link: &str, address: &str) -> Result<(), Self::Error> {
        self.associate_job_location(link, address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    async fn setup_test_db() -> Result<(Database, tempfile::TempDir), StoreError> {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();

        let db = Database::new_from_path(&db_path).await?;

        Ok((db, temp_dir))
    }

    fn sample_job() -> JobRecord {
        let mut record = JobRecord::new("https://www.cake.me/companies/acme/jobs/backend");
        record.company = "Acme".to_string();
        record.title = "Backend Engineer".to_string();
        record.employment_type = EmploymentType::FullTime;
        record.seniority = Seniority::MidSeniorLevel;
        record.location = "Taipei, Taiwan".to_string();
        record.number_to_hire = 2;
        record.remote = Remote::Optional;
        record.tags = ["Rust", "SQL"].into_iter().map(String::from).collect();
        record
    }

    fn locations() -> Vec<GazetteerEntry> {
        vec![
            GazetteerEntry::new("Taiwan", "", "", ""),
            GazetteerEntry::new("Taiwan", "Taipei City", "", ""),
            GazetteerEntry::new("Taiwan", "Taipei City", "Zhongzheng District", "100"),
        ]
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        let mut result = db
            .execute_query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                params![],
            )
            .await
            .unwrap();

        let mut tables = Vec::new();
        while let Ok(Some(row)) = result.next().await {
            let table_name: String = row.get(0).unwrap();
            tables.push(table_name);
        }

        for name in schema::table_names() {
            assert!(tables.contains(&name.to_string()), "missing table {}", name);
        }
    }

    #[tokio::test]
    async fn test_upsert_and_find_job() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();
        let record = sample_job();

        db.upsert(&record).await.unwrap();
        let jobs = db.find_jobs(&JobFilter::new()).await.unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].record, record);
        assert_eq!(jobs[0].canonical_location, None);
        assert!(!jobs[0].updated_at.is_empty());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_and_replaces_tags() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();
        let mut record = sample_job();

        let first = db.upsert_job(&record).await.unwrap();
        let again = db.upsert_job(&record).await.unwrap();
        assert_eq!(first, again);

        record.tags = ["Go"].into_iter().map(String::from).collect();
        record.title = "Staff Engineer".to_string();
        db.upsert_job(&record).await.unwrap();

        let jobs = db.find_jobs(&JobFilter::new()).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].record.title, "Staff Engineer");
        assert_eq!(
            jobs[0].record.tags.iter().collect::<Vec<_>>(),
            vec!["Go"]
        );
    }

    #[tokio::test]
    async fn test_location_association() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();
        let record = sample_job();

        assert_eq!(db.save_locations(&locations()).await.unwrap(), 3);
        assert_eq!(db.save_locations(&locations()).await.unwrap(), 3);
        assert_eq!(db.location_count().await.unwrap(), 3);

        db.upsert(&record).await.unwrap();
        db.associate_location(&record.link, "Taipei City, Taiwan")
            .await
            .unwrap();
        db.associate_location(&record.link, "Zhongzheng District, Taipei City, Taiwan")
            .await
            .unwrap();

        let jobs = db.find_jobs(&JobFilter::new()).await.unwrap();
        assert_eq!(
            jobs[0].canonical_location.as_deref(),
            Some("Zhongzheng District, Taipei City, Taiwan")
        );

        db.upsert(&record).await.unwrap();
        let jobs = db.find_jobs(&JobFilter::new()).await.unwrap();
        assert_eq!(jobs[0].canonical_location, None);
    }

    #[tokio::test]
    async fn test_unseeded_location_is_rejected() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();
        let record = sample_job();
        db.upsert(&record).await.unwrap();

        let result = db.associate_location(&record.link, "Tokyo, Japan").await;

        assert!(matches!(result, Err(StoreError::Data(_))));
    }

    #[tokio::test]
    async fn test_reseeding_adds_new_addresses() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();
        let record = sample_job();
        db.save_locations(&locations()).await.unwrap();
        db.upsert(&record).await.unwrap();

        let address = "Banqiao District, New Taipei City, Taiwan";
        assert!(db.associate_location(&record.link, address).await.is_err());

        let mut extended = locations();
        extended.push(GazetteerEntry::new(
            "Taiwan",
            "New Taipei City",
            "Banqiao District",
            "220",
        ));
        assert_eq!(db.save_locations(&extended).await.unwrap(), 4);
        assert_eq!(db.location_count().await.unwrap(), 4);

        db.associate_location(&record.link, address).await.unwrap();
        let jobs = db.find_jobs(&JobFilter::new()).await.unwrap();
        assert_eq!(jobs[0].canonical_location.as_deref(), Some(address));
    }

    #[tokio::test]
    async fn test_find_jobs_filters_and_pages() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        let backend = sample_job();
        let mut data = sample_job();
        data.link = "https://www.cake.me/companies/globex/jobs/data".to_string();
        data.company = "Globex".to_string();
        data.remote = Remote::Full;
        data.tags = ["Python"].into_iter().map(String::from).collect();
        let mut intern = sample_job();
        intern.link = "https://www.cake.me/companies/acme/jobs/intern".to_string();
        intern.seniority = Seniority::Intern;
        intern.tags = BTreeSet::new();
        for record in [&backend, &data, &intern] {
            db.upsert_job(record).await.unwrap();
        }

        let links = |jobs: Vec<StoredJob>| -> Vec<String> {
            jobs.into_iter().map(|job| job.record.link).collect()
        };

        let acme = db.find_jobs(&JobFilter::new().company("Acme")).await.unwrap();
        assert_eq!(links(acme), vec![backend.link.clone(), intern.link.clone()]);

        let remote = db
            .find_jobs(&JobFilter::new().remote(Remote::Full).remote(Remote::Partial))
            .await
            .unwrap();
        assert_eq!(links(remote), vec![data.link.clone()]);

        let tagged = db
            .find_jobs(&JobFilter::new().tag("SQL").tag("Python"))
            .await
            .unwrap();
        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|job| !job.record.tags.is_empty()));

        let senior_acme = db
            .find_jobs(
                &JobFilter::new()
                    .company("Acme")
                    .seniority(Seniority::MidSeniorLevel)
                    .employment_type(EmploymentType::FullTime),
            )
            .await
            .unwrap();
        assert_eq!(links(senior_acme), vec![backend.link.clone()]);

        let second_page = db.find_jobs(&JobFilter::new().page(2, 2)).await.unwrap();
        assert_eq!(links(second_page), vec![data.link.clone()]);

        let none = db.find_jobs(&JobFilter::new().title("Chef")).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_upserts() {
        let (db, _temp_dir) = setup_test_db().await.unwrap();

        let mut handles = Vec::new();
        for n in 0..8 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                let mut record = sample_job();
                record.link = format!("https://www.cake.me/companies/acme/jobs/{}", n % 4);
                db.upsert_job(&record).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(db.find_jobs(&JobFilter::new()).await.unwrap().len(), 4);
    }
}
