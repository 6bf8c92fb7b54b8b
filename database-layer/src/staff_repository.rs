use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult, OptionalExt};
use crate::models::{CreateStaff, StaffMember, StaffRole, UpdateStaff};
use crate::query::{Page, PaginatedQuery};

const SEARCH_COLUMNS: [&str; 4] = ["first_name", "last_name", "employee_code", "email"];

#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    pub role: Option<StaffRole>,
    pub department: Option<String>,
    pub search: Option<String>,
    pub active_only: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Repository for the staff directory
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &CreateStaff, password_hash: Option<String>) -> DatabaseResult<StaffMember> {
        let member = sqlx::query_as::<_, StaffMember>(
            r#"
            INSERT INTO staff (
                id, employee_code, first_name, last_name, role, department,
                specialization, email, phone, license_number, shift, password_hash
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 'day'::shift_type), $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.employee_code.trim())
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(input.role)
        .bind(&input.department)
        .bind(&input.specialization)
        .bind(input.email.trim().to_lowercase())
        .bind(&input.phone)
        .bind(&input.license_number)
        .bind(input.shift)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        debug!(staff_id = %member.id, role = %member.role, "Staff member created");
        Ok(member)
    }

    pub async fn get(&self, id: Uuid) -> DatabaseResult<StaffMember> {
        sqlx::query_as::<_, StaffMember>("SELECT * FROM staff WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Staff member")
    }

    /// Active staff member looked up by login email
    pub async fn find_active_by_email(&self, email: &str) -> DatabaseResult<Option<StaffMember>> {
        let member = sqlx::query_as::<_, StaffMember>(
            "SELECT * FROM staff WHERE LOWER(email) = LOWER($1) AND is_active = true",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(member)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &UpdateStaff,
        password_hash: Option<String>,
    ) -> DatabaseResult<StaffMember> {
        sqlx::query_as::<_, StaffMember>(
            r#"
            UPDATE staff
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                role = COALESCE($4, role),
                department = COALESCE($5, department),
                specialization = COALESCE($6, specialization),
                email = COALESCE($7, email),
                phone = COALESCE($8, phone),
                license_number = COALESCE($9, license_number),
                shift = COALESCE($10, shift),
                password_hash = COALESCE($11, password_hash),
                updated_at = $12
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.first_name.as_deref().map(str::trim))
        .bind(input.last_name.as_deref().map(str::trim))
        .bind(input.role)
        .bind(&input.department)
        .bind(&input.specialization)
        .bind(input.email.as_deref().map(|e| e.trim().to_lowercase()))
        .bind(&input.phone)
        .bind(&input.license_number)
        .bind(input.shift)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .or_not_found("Staff member")
    }

    pub async fn deactivate(&self, id: Uuid) -> DatabaseResult<StaffMember> {
        let member = self.get(id).await?;
        if !member.is_active {
            return Err(DatabaseError::Conflict("Staff member is already inactive".to_string()));
        }

        sqlx::query_as::<_, StaffMember>(
            "UPDATE staff SET is_active = false, updated_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list(&self, filter: &StaffFilter) -> DatabaseResult<Page<StaffMember>> {
        let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM staff WHERE 1=1");
        apply_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = PaginatedQuery::new("SELECT * FROM staff WHERE 1=1");
        apply_filter(&mut query, filter);
        query
            .order_by("last_name, first_name", "ASC")
            .paginate(filter.page, filter.page_size);
        let items = query.build_query_as::<StaffMember>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    /// Ids of deactivated staff
    pub async fn inactive_ids(&self) -> DatabaseResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM staff WHERE is_active = false")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    /// Every active staff member, for the on-duty figures
    pub async fn list_active(&self) -> DatabaseResult<Vec<StaffMember>> {
        let members = sqlx::query_as::<_, StaffMember>("SELECT * FROM staff WHERE is_active = true")
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }
}

fn apply_filter(query: &mut PaginatedQuery<'_>, filter: &StaffFilter) {
    query
        .filter_eq("role", filter.role)
        .filter_eq("department", filter.department.clone())
        .filter_search(&SEARCH_COLUMNS, filter.search.as_deref());
    if filter.active_only {
        query.filter_active();
    }
}
