use database_layer::{AuditEntry, AuditLog, AuditRepository, DatabaseResult};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::middleware::AuthContext;

/// Records who changed what; failures never fail the request
#[derive(Debug, Clone)]
pub struct AuditService {
    repository: AuditRepository,
}

impl AuditService {
    pub fn new(repository: AuditRepository) -> Self {
        Self { repository }
    }

    pub async fn log_action(
        &self,
        auth: &AuthContext,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        details: JsonValue,
    ) {
        self.repository
            .record(AuditEntry {
                user_id: Some(auth.user_id),
                action: action.to_string(),
                entity_type: entity_type.to_string(),
                entity_id: Some(entity_id),
                details,
            })
            .await;
    }

    /// Login attempts carry no authenticated user yet
    pub async fn log_login(&self, staff_id: Option<Uuid>, email: &str, success: bool) {
        self.repository
            .record(AuditEntry {
                user_id: staff_id,
                action: if success { "login" } else { "login_failed" }.to_string(),
                entity_type: "staff".to_string(),
                entity_id: staff_id,
                details: serde_json::json!({ "email": email }),
            })
            .await;
    }

    pub async fn history(&self, entity_type: &str, entity_id: Uuid, limit: i64) -> DatabaseResult<Vec<AuditLog>> {
        self.repository.list_for_entity(entity_type, entity_id, limit).await
    }
}
