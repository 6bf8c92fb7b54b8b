use billing_service::{PaymentMethod, PaymentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, Pool, Postgres};
use tracing::info;
use uuid::Uuid;

use crate::error::{DatabaseResult, OptionalExt};
use crate::models::{BillingRecord, PricedInvoice};
use crate::query::{Page, PaginatedQuery};

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub patient_id: Option<Uuid>,
    /// Matched against the effective status, so `overdue` includes unpaid invoices past due
    pub status: Option<PaymentStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Repository for invoices (`billing_records`)
#[derive(Debug, Clone)]
pub struct BillingRepository {
    pool: Pool<Postgres>,
}

impl BillingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, invoice_number: &str, invoice: &PricedInvoice) -> DatabaseResult<BillingRecord> {
        let record = sqlx::query_as::<_, BillingRecord>(
            r#"
            INSERT INTO billing_records (
                id, invoice_number, patient_id, appointment_id, bed_assignment_id, services,
                subtotal, tax_rate, tax_amount, discount, insurance_coverage, total,
                payment_status, due_date, notes, paid_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                      CASE WHEN $13 = 'paid'::payment_status THEN NOW() END)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(invoice_number)
        .bind(invoice.patient_id)
        .bind(invoice.appointment_id)
        .bind(invoice.bed_assignment_id)
        .bind(Json(&invoice.services))
        .bind(invoice.subtotal)
        .bind(invoice.tax_rate)
        .bind(invoice.tax_amount)
        .bind(invoice.discount)
        .bind(invoice.insurance_coverage)
        .bind(invoice.total)
        .bind(invoice.payment_status)
        .bind(invoice.due_date)
        .bind(&invoice.notes)
        .fetch_one(&self.pool)
        .await?;

        info!(invoice_id = %record.id, invoice_number = %record.invoice_number, total = %record.total, "Invoice created");
        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> DatabaseResult<BillingRecord> {
        sqlx::query_as::<_, BillingRecord>("SELECT * FROM billing_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Invoice")
    }

    /// Re-price an invoice. `reprice` receives the locked row and returns the
    /// new amounts, or an error if the invoice may not change.
    pub async fn update<F>(&self, id: Uuid, reprice: F) -> DatabaseResult<BillingRecord>
    where
        F: FnOnce(&BillingRecord) -> DatabaseResult<PricedInvoice>,
    {
        let mut tx = self.pool.begin().await?;
        let current = lock_invoice(&mut tx, id).await?;
        current.balance().ensure_editable()?;
        let priced = reprice(&current)?;

        let updated = sqlx::query_as::<_, BillingRecord>(
            r#"
            UPDATE billing_records
            SET
                services = $2,
                subtotal = $3,
                tax_rate = $4,
                tax_amount = $5,
                discount = $6,
                insurance_coverage = $7,
                total = $8,
                payment_status = $9,
                due_date = $10,
                notes = $11,
                paid_at = CASE WHEN $9 = 'paid'::payment_status THEN NOW() END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(&priced.services))
        .bind(priced.subtotal)
        .bind(priced.tax_rate)
        .bind(priced.tax_amount)
        .bind(priced.discount)
        .bind(priced.insurance_coverage)
        .bind(priced.total)
        .bind(priced.payment_status)
        .bind(priced.due_date)
        .bind(&priced.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn record_payment(
        &self,
        id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        now: DateTime<Utc>,
    ) -> DatabaseResult<BillingRecord> {
        let mut tx = self.pool.begin().await?;
        let current = lock_invoice(&mut tx, id).await?;
        let outcome = current.balance().apply_payment(amount)?;

        let updated = sqlx::query_as::<_, BillingRecord>(
            r#"
            UPDATE billing_records
            SET
                amount_paid = $2,
                payment_status = $3,
                payment_method = $4,
                paid_at = CASE WHEN $5 THEN $6 ELSE paid_at END,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(outcome.amount_paid)
        .bind(outcome.status)
        .bind(method)
        .bind(outcome.settled)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(invoice_id = %id, status = %updated.payment_status, "Payment recorded");
        Ok(updated)
    }

    pub async fn cancel(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<BillingRecord> {
        let mut tx = self.pool.begin().await?;
        let current = lock_invoice(&mut tx, id).await?;
        current.balance().ensure_cancellable()?;

        let updated = sqlx::query_as::<_, BillingRecord>(
            "UPDATE billing_records SET payment_status = 'cancelled', updated_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(invoice_id = %id, "Invoice cancelled");
        Ok(updated)
    }

    pub async fn list(&self, filter: &InvoiceFilter, today: NaiveDate) -> DatabaseResult<Page<BillingRecord>> {
        let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM billing_records WHERE 1=1");
        apply_filter(&mut count, filter, today);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = PaginatedQuery::new("SELECT * FROM billing_records WHERE 1=1");
        apply_filter(&mut query, filter, today);
        query.order_by_created_desc().paginate(filter.page, filter.page_size);
        let items = query.build_query_as::<BillingRecord>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    /// Persist the overdue status for unpaid invoices past their due date
    pub async fn mark_overdue(&self, today: NaiveDate) -> DatabaseResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE billing_records
            SET payment_status = 'overdue', updated_at = NOW()
            WHERE payment_status IN ('pending', 'partially-paid')
              AND due_date < $1
            "#,
        )
        .bind(today)
        .execute(&self.pool)
        .await?;

        info!(updated = result.rows_affected(), "Overdue invoices marked");
        Ok(result.rows_affected())
    }

    /// Every invoice created in `[from, to)`, for the financial dashboard
    pub async fn created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DatabaseResult<Vec<BillingRecord>> {
        let records = sqlx::query_as::<_, BillingRecord>(
            "SELECT * FROM billing_records WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}

fn apply_filter(query: &mut PaginatedQuery<'_>, filter: &InvoiceFilter, today: NaiveDate) {
    query
        .filter_eq("patient_id", filter.patient_id)
        .filter_gte("created_at", filter.from)
        .filter_lt("created_at", filter.to);

    let Some(status) = filter.status else { return };
    let builder = query.query_builder();
    match status {
        PaymentStatus::Overdue => {
            builder.push(
                " AND (payment_status = 'overdue' OR (payment_status IN ('pending', 'partially-paid') AND due_date < ",
            );
            builder.push_bind(today);
            builder.push("))");
        }
        PaymentStatus::Pending | PaymentStatus::PartiallyPaid => {
            builder.push(" AND payment_status = ");
            builder.push_bind(status);
            builder.push(" AND (due_date IS NULL OR due_date >= ");
            builder.push_bind(today);
            builder.push(")");
        }
        PaymentStatus::Paid | PaymentStatus::Cancelled => {
            builder.push(" AND payment_status = ");
            builder.push_bind(status);
        }
    }
}

async fn lock_invoice(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<BillingRecord> {
    sqlx::query_as::<_, BillingRecord>("SELECT * FROM billing_records WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .or_not_found("Invoice")
}
