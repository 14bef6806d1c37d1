//! Applicant repository

use relocrm_common::db::like_pattern;
use relocrm_common::{PageRequest, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{Applicant, ApplicantStatus, BoardDecision};

/// All columns in the applicants table, used for SELECT and RETURNING clauses.
pub(crate) const APPLICANT_COLUMNS: &str = "\
    id, husband, wife, address, phone, current_kehila, shabbos_shul, \
    children, status, board_review, notes, created_by, \
    is_deleted, deleted_at, deleted_by, created_at, updated_at";

/// First email in `$1` already used by another non-deleted applicant
pub(crate) const TAKEN_EMAIL_SQL: &str = r#"
    SELECT taken.email FROM (
        SELECT LOWER(TRIM(husband->>'email')) AS email
        FROM applicants
        WHERE is_deleted = FALSE AND ($2::uuid IS NULL OR id <> $2)
        UNION ALL
        SELECT LOWER(TRIM(wife->>'email')) AS email
        FROM applicants
        WHERE is_deleted = FALSE AND wife IS NOT NULL AND ($2::uuid IS NULL OR id <> $2)
    ) AS taken
    WHERE taken.email = ANY($1)
    LIMIT 1
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ApplicantSort {
    #[default]
    CreatedAt,
    LastName,
    Status,
}

impl ApplicantSort {
    pub fn parse(value: Option<&str>) -> Result<Self> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("createdat") => Ok(Self::CreatedAt),
            Some("lastname") => Ok(Self::LastName),
            Some("status") => Ok(Self::Status),
            Some(_) => Err(relocrm_common::Error::validation(format!(
                "'{}' is not a valid sort field. Expected one of: createdAt, lastName, status",
                value.unwrap_or_default()
            ))),
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::LastName => "LOWER(husband->>'lastName')",
            Self::Status => "status",
        }
    }

    /// Newest first for dates, alphabetical otherwise
    pub fn default_descending(&self) -> bool {
        matches!(self, Self::CreatedAt)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApplicantFilter {
    pub status: Option<ApplicantStatus>,
    pub board_decision: Option<BoardDecision>,
    pub search: Option<String>,
    pub include_deleted: bool,
    pub sort: ApplicantSort,
    pub descending: bool,
}

impl ApplicantFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE TRUE");
        if !self.include_deleted {
            qb.push(" AND is_deleted = FALSE");
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(decision) = self.board_decision {
            qb.push(" AND COALESCE(board_review->>'decision', 'Pending') = ")
                .push_bind(decision.as_str());
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (");
            let fields = [
                "husband->>'firstName'",
                "husband->>'lastName'",
                "husband->>'email'",
                "wife->>'firstName'",
                "wife->>'lastName'",
                "wife->>'email'",
            ];
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*field).push(" ILIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }
}

#[derive(Clone)]
pub struct ApplicantRepository {
    pool: PgPool,
}

impl ApplicantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a non-deleted applicant by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Applicant>> {
        let query = format!(
            "SELECT {APPLICANT_COLUMNS} FROM applicants WHERE id = $1 AND is_deleted = FALSE"
        );
        let applicant = sqlx::query_as::<_, Applicant>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(applicant)
    }

    pub async fn list(
        &self,
        filter: &ApplicantFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Applicant>, i64)> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM applicants");
        filter.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::new(format!("SELECT {APPLICANT_COLUMNS} FROM applicants"));
        filter.push_where(&mut query);
        let direction = if filter.descending { "DESC" } else { "ASC" };
        query
            .push(format!(
                " ORDER BY {} {}, id {} LIMIT ",
                filter.sort.column(),
                direction,
                direction
            ))
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let applicants = query
            .build_query_as::<Applicant>()
            .fetch_all(&self.pool)
            .await?;

        Ok((applicants, total))
    }

    /// Case-insensitive check across husband and wife emails
    pub async fn email_exists(&self, email: &str, exclude: Option<Uuid>) -> Result<bool> {
        let normalized = vec![email.trim().to_lowercase()];
        let taken: Option<String> = sqlx::query_scalar(TAKEN_EMAIL_SQL)
            .bind(&normalized)
            .bind(exclude)
            .fetch_optional(&self.pool)
            .await?;

        Ok(taken.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(ApplicantSort::parse(None).unwrap(), ApplicantSort::CreatedAt);
        assert_eq!(
            ApplicantSort::parse(Some("LastName")).unwrap(),
            ApplicantSort::LastName
        );
        assert_eq!(
            ApplicantSort::parse(Some("status")).unwrap(),
            ApplicantSort::Status
        );
        assert!(ApplicantSort::parse(Some("salary")).is_err());
    }

    #[test]
    fn test_default_direction() {
        assert!(ApplicantSort::CreatedAt.default_descending());
        assert!(!ApplicantSort::LastName.default_descending());
    }

    #[test]
    fn test_filter_sql_excludes_deleted_by_default() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM applicants");
        ApplicantFilter::default().push_where(&mut qb);
        assert!(qb.sql().contains("is_deleted = FALSE"));

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM applicants");
        ApplicantFilter {
            include_deleted: true,
            ..ApplicantFilter::default()
        }
        .push_where(&mut qb);
        assert!(!qb.sql().contains("is_deleted"));
    }

    #[test]
    fn test_filter_sql_search_covers_both_spouses() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM applicants");
        ApplicantFilter {
            search: Some("cohen".to_string()),
            ..ApplicantFilter::default()
        }
        .push_where(&mut qb);
        let sql = qb.sql();
        assert!(sql.contains("husband->>'lastName' ILIKE"));
        assert!(sql.contains("wife->>'email' ILIKE"));
    }
}
