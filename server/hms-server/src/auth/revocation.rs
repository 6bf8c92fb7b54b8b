//! Deactivated staff whose tokens must stop working before they expire

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct RevokedStaff {
    ids: Arc<RwLock<HashSet<Uuid>>>,
}

impl RevokedStaff {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn revoke(&self, staff_id: Uuid) {
        self.ids.write().await.insert(staff_id);
    }

    pub async fn extend(&self, staff_ids: impl IntoIterator<Item = Uuid>) {
        self.ids.write().await.extend(staff_ids);
    }

    pub async fn is_revoked(&self, staff_id: Uuid) -> bool {
        self.ids.read().await.contains(&staff_id)
    }

    pub async fn len(&self) -> usize {
        self.ids.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revocation_is_shared_between_clones() {
        let revoked = RevokedStaff::new();
        let handle = revoked.clone();
        let id = Uuid::new_v4();

        assert!(!revoked.is_revoked(id).await);
        handle.revoke(id).await;
        assert!(revoked.is_revoked(id).await);

        revoked.extend([Uuid::new_v4(), id]).await;
        assert_eq!(handle.len().await, 2);
    }
}
