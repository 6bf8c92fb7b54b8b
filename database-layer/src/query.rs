//! Query builder utilities for consistent SQL query construction
//!
//! Repositories build their list queries here so filtering, ordering and
//! pagination read the same everywhere.

use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{Postgres, QueryBuilder};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Paginated query builder
///
/// Example usage:
/// ```rust,ignore
/// let mut query = PaginatedQuery::new("SELECT * FROM patients WHERE 1=1");
/// query
///     .filter_not_deleted()
///     .filter_eq("gender", filter.gender)
///     .order_by("last_name", "ASC")
///     .paginate(Some(page), Some(page_size));
///
/// let patients: Vec<Patient> = query.build_query_as().fetch_all(&pool).await?;
/// ```
pub struct PaginatedQuery<'a> {
    query: QueryBuilder<'a, Postgres>,
    page: u32,
    page_size: u32,
}

impl<'a> PaginatedQuery<'a> {
    /// Create a new paginated query builder. The base query must end in a
    /// WHERE clause so filters can be appended with AND.
    pub fn new(base_query: &'static str) -> Self {
        Self {
            query: QueryBuilder::new(base_query),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Add an equality filter (only if value is Some)
    pub fn filter_eq<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'static,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {column} = "));
            self.query.push_bind(val);
        }
        self
    }

    /// Add a `column >= value` filter (only if value is Some)
    pub fn filter_gte<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'static,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {column} >= "));
            self.query.push_bind(val);
        }
        self
    }

    /// Add a `column < value` filter (only if value is Some)
    pub fn filter_lt<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + 'static,
    {
        if let Some(val) = value {
            self.query.push(format!(" AND {column} < "));
            self.query.push_bind(val);
        }
        self
    }

    /// Case-insensitive substring match across several columns
    pub fn filter_search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
            return self;
        };
        if columns.is_empty() {
            return self;
        }

        let pattern = format!("%{}%", escape_like(term));
        self.query.push(" AND (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.query.push(" OR ");
            }
            self.query.push(format!("{column} ILIKE "));
            self.query.push_bind(pattern.clone());
        }
        self.query.push(")");
        self
    }

    /// Filter for active records
    pub fn filter_active(&mut self) -> &mut Self {
        self.query.push(" AND is_active = true");
        self
    }

    /// Filter for non-deleted records only
    pub fn filter_not_deleted(&mut self) -> &mut Self {
        self.query.push(" AND is_deleted = false");
        self
    }

    /// Rows whose `[start, end)` interval contains `at`; a NULL end is open
    pub fn filter_active_at<T>(&mut self, start_column: &str, end_column: &str, at: T) -> &mut Self
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + Sync + Clone + 'static,
    {
        self.query.push(format!(" AND {start_column} <= "));
        self.query.push_bind(at.clone());
        self.query.push(format!(" AND ({end_column} IS NULL OR {end_column} > "));
        self.query.push_bind(at);
        self.query.push(")");
        self
    }

    /// Add ORDER BY clause
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.query.push(format!(" ORDER BY {column} {direction}"));
        self
    }

    /// Add ORDER BY created_at DESC (common pattern)
    pub fn order_by_created_desc(&mut self) -> &mut Self {
        self.order_by("created_at", "DESC")
    }

    /// Apply pagination
    pub fn paginate(&mut self, page: Option<u32>, page_size: Option<u32>) -> &mut Self {
        self.page = page.unwrap_or(1).max(1);
        self.page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = i64::from(self.page - 1) * i64::from(self.page_size);
        self.query.push(" LIMIT ");
        self.query.push_bind(i64::from(self.page_size));
        self.query.push(" OFFSET ");
        self.query.push_bind(offset);
        self
    }

    /// Build the final query as a typed query for fetching rows
    pub fn build_query_as<T>(&mut self) -> QueryAs<'_, Postgres, T, sqlx::postgres::PgArguments>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_as()
    }

    /// Build the final query as a single-value query, e.g. a `COUNT(*)`
    pub fn build_query_scalar<T>(&mut self) -> QueryScalar<'_, Postgres, T, sqlx::postgres::PgArguments>
    where
        T: sqlx::Type<Postgres> + for<'r> sqlx::Decode<'r, Postgres>,
        (T,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_scalar()
    }

    /// Get the underlying query builder for conditions the helpers don't cover
    pub fn query_builder(&mut self) -> &mut QueryBuilder<'a, Postgres> {
        &mut self.query
    }

    /// SQL text built so far
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    /// Get current page
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Get current page size
    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

/// Escape LIKE wildcards so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// One page of results plus the unpaginated total
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_paginated_query_builder() {
        let mut query = PaginatedQuery::new("SELECT * FROM rooms WHERE 1=1");
        query
            .filter_eq("floor", Some(3_i32))
            .filter_active()
            .order_by("room_number", "ASC")
            .paginate(Some(2), Some(10));

        assert_eq!(query.page(), 2);
        assert_eq!(query.page_size(), 10);
        assert_eq!(
            query.sql(),
            "SELECT * FROM rooms WHERE 1=1 AND floor = $1 AND is_active = true ORDER BY room_number ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_filter_eq_with_none() {
        let mut query = PaginatedQuery::new("SELECT * FROM patients WHERE 1=1");
        query.filter_eq("gender", None::<String>);
        assert_eq!(query.sql(), "SELECT * FROM patients WHERE 1=1");
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_range_filters() {
        let mut query = PaginatedQuery::new("SELECT * FROM appointments WHERE 1=1");
        query
            .filter_eq("doctor_id", Some(Uuid::new_v4()))
            .filter_gte("scheduled_at", Some(chrono::Utc::now()))
            .filter_lt("scheduled_at", None::<chrono::DateTime<chrono::Utc>>);
        assert_eq!(
            query.sql(),
            "SELECT * FROM appointments WHERE 1=1 AND doctor_id = $1 AND scheduled_at >= $2"
        );
    }

    #[test]
    fn test_filter_active_at() {
        let mut query = PaginatedQuery::new("SELECT * FROM bed_assignments WHERE 1=1");
        query.filter_active_at("admission_date", "discharge_date", chrono::Utc::now());
        assert_eq!(
            query.sql(),
            "SELECT * FROM bed_assignments WHERE 1=1 AND admission_date <= $1 AND (discharge_date IS NULL OR discharge_date > $2)"
        );
    }

    #[test]
    fn test_filter_search_multiple_columns() {
        let mut query = PaginatedQuery::new("SELECT * FROM patients WHERE 1=1");
        query.filter_search(&["first_name", "mrn"], Some("  smith "));
        assert_eq!(
            query.sql(),
            "SELECT * FROM patients WHERE 1=1 AND (first_name ILIKE $1 OR mrn ILIKE $2)"
        );
    }

    #[test]
    fn test_filter_search_blank_is_ignored() {
        let mut query = PaginatedQuery::new("SELECT * FROM patients WHERE 1=1");
        query.filter_search(&["first_name"], Some("   "));
        query.filter_search(&["first_name"], None);
        assert_eq!(query.sql(), "SELECT * FROM patients WHERE 1=1");
    }

    #[test]
    fn test_pagination_clamps() {
        let mut query = PaginatedQuery::new("SELECT * FROM staff WHERE 1=1");
        query.paginate(Some(0), Some(500));
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), MAX_PAGE_SIZE);

        let mut query = PaginatedQuery::new("SELECT * FROM staff WHERE 1=1");
        query.paginate(None, Some(0));
        assert_eq!(query.page_size(), 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
