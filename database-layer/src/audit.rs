// Audit trail for mutating operations
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres};
use tracing::{error, info};
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::AuditLog;

const SENSITIVE_FIELDS: [&str; 6] = [
    "password",
    "password_hash",
    "access_token",
    "token",
    "secret",
    "insurance_policy_number",
];

/// One audited action, before it is written
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: JsonValue,
}

/// Writes and reads `audit_logs`
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store an entry. A failed insert is logged and swallowed so the audited
    /// operation itself still succeeds.
    pub async fn record(&self, entry: AuditEntry) {
        info!(
            target: "audit",
            user_id = ?entry.user_id,
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = ?entry.entity_id,
            "Audited operation"
        );

        if let Err(e) = self.insert(entry).await {
            error!(target: "audit", error = %e, "Failed to store audit log");
        }
    }

    async fn insert(&self, entry: AuditEntry) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(redact_sensitive_fields(entry.details))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent entries for one entity, newest first
    pub async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: Uuid,
        limit: i64,
    ) -> DatabaseResult<Vec<AuditLog>> {
        let logs = sqlx::query_as::<_, AuditLog>(
            r#"
            SELECT * FROM audit_logs
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}

/// Mask credential-like keys at any depth of the details object
pub fn redact_sensitive_fields(mut details: JsonValue) -> JsonValue {
    redact_in_place(&mut details);
    details
}

fn redact_in_place(value: &mut JsonValue) {
    match value {
        JsonValue::Object(obj) => {
            for (key, field) in obj.iter_mut() {
                if SENSITIVE_FIELDS.contains(&key.as_str()) {
                    *field = JsonValue::String("***REDACTED***".to_string());
                } else {
                    redact_in_place(field);
                }
            }
        }
        JsonValue::Array(items) => items.iter_mut().for_each(redact_in_place),
        _ => {}
    }
}
