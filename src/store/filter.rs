//! Query conditions for stored jobs

use libsql::Value;

use crate::job::{EmploymentType, Remote, Seniority};

/// Conditions for [`Database::find_jobs`](crate::store::Database::find_jobs)
///
/// Every set condition must hold. List conditions match any of their
/// values; an empty list places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub company: Option<String>,
    pub title: Option<String>,
    pub employment_types: Vec<EmploymentType>,
    pub seniorities: Vec<Seniority>,
    pub remotes: Vec<Remote>,
    /// Jobs carrying at least one of these tags
    pub tags: Vec<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn employment_type(mut self, employment_type: EmploymentType) -> Self {
        self.employment_types.push(employment_type);
        self
    }

    pub fn seniority(mut self, seniority: Seniority) -> Self {
        self.seniorities.push(seniority);
        self
    }

    pub fn remote(mut self, remote: Remote) -> Self {
        self.remotes.push(remote);
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Restrict to 1-based `page` of `per_page` jobs
    pub fn page(mut self, page: u32, per_page: u32) -> Self {
        self.limit = Some(per_page);
        self.offset = page.saturating_sub(1).saturating_mul(per_page);
        self
    }

    /// `WHERE`, ordering and paging clauses over `jobs j`, with their
    /// positional parameters
    pub(crate) fn to_sql(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(company) = &self.company {
            clauses.push("j.company = ?".to_string());
            values.push(Value::Text(company.clone()));
        }
        if let Some(title) = &self.title {
            clauses.push("j.title = ?".to_string());
            values.push(Value::Text(title.clone()));
        }
        push_in(
            &mut clauses,
            &mut values,
            "j.employment_type",
            self.employment_types.iter().map(EmploymentType::as_str),
        );
        push_in(
            &mut clauses,
            &mut values,
            "j.seniority",
            self.seniorities.iter().map(Seniority::as_str),
        );
        push_in(
            &mut clauses,
            &mut values,
            "j.remote",
            self.remotes.iter().map(Remote::as_str),
        );
        if !self.tags.is_empty() {
            clauses.push(format!(
                "j.id IN (SELECT jt.job_id FROM jobs_tags jt JOIN tags t ON t.id = jt.tag_id WHERE t.name IN ({}))",
                placeholders(self.tags.len())
            ));
            values.extend(self.tags.iter().cloned().map(Value::Text));
        }

        let mut sql = String::new();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY j.link");

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded
        if self.limit.is_some() || self.offset > 0 {
            sql.push_str(" LIMIT ? OFFSET ?");
            values.push(Value::Integer(self.limit.map_or(-1, i64::from)));
            values.push(Value::Integer(i64::from(self.offset)));
        }

        (sql, values)
    }
}

fn push_in<'a>(
    clauses: &mut Vec<String>,
    values: &mut Vec<Value>,
    column: &str,
    labels: impl ExactSizeIterator<Item = &'a str>,
) {
    if labels.len() == 0 {
        return;
    }
    clauses.push(format!("{} IN ({})", column, placeholders(labels.len())));
    values.extend(labels.map(|label| Value::Text(label.to_string())));
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_only_orders() {
        let (sql, values) = JobFilter::new().to_sql();

        assert_eq!(sql, " ORDER BY j.link");
        assert!(values.is_empty());
    }

    #[test]
    fn test_conditions_are_joined_in_order() {
        let (sql, values) = JobFilter::new()
            .company("Acme")
            .remote(Remote::Full)
            .remote(Remote::Partial)
            .tag("Rust")
            .to_sql();

        assert_eq!(
            sql,
            " WHERE j.company = ? AND j.remote IN (?, ?) AND j.id IN (SELECT jt.job_id FROM jobs_tags jt JOIN tags t ON t.id = jt.tag_id WHERE t.name IN (?)) ORDER BY j.link"
        );
        assert_eq!(
            values,
            vec![
                Value::Text("Acme".to_string()),
                Value::Text("100% Remote Work".to_string()),
                Value::Text("Partial Remote Work".to_string()),
                Value::Text("Rust".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_sets_limit_and_offset() {
        let filter = JobFilter::new().page(3, 20);
        assert_eq!((filter.limit, filter.offset), (Some(20), 40));

        let (sql, values) = filter.to_sql();
        assert!(sql.ends_with(" LIMIT ? OFFSET ?"));
        assert_eq!(values, vec![Value::Integer(20), Value::Integer(40)]);

        let first = JobFilter::new().page(0, 10);
        assert_eq!(first.offset, 0);
    }
}
