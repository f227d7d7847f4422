//! Development implementations of the engine's outward-facing collaborators.
//! The real deployments plug in an actual notification gateway, venue
//! directory and object storage at these seams.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use service::notification::{NotificationEvent, NotificationService};
use service::owner_directory::{BankInfo, OwnerDirectoryService};
use service::proof_storage::ProofStorageService;
use service::ServiceError;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Writes every notification to the log instead of delivering it.
pub struct NotificationServiceDev;

#[async_trait]
impl NotificationService for NotificationServiceDev {
    async fn notify(
        &self,
        user_id: &str,
        event: NotificationEvent,
        booking_id: Uuid,
    ) -> Result<(), ServiceError> {
        let payload = serde_json::json!({
            "user_id": user_id,
            "event": event,
            "booking_id": booking_id,
        });
        info!("Notification: {}", payload);
        Ok(())
    }
}

/// Reports the same bank details for every venue.
pub struct OwnerDirectoryServiceDev {
    bank_info: BankInfo,
}

impl OwnerDirectoryServiceDev {
    pub fn new() -> Self {
        Self {
            bank_info: BankInfo {
                bank_name: "Dev Bank".into(),
                account_number: "000-000-000".into(),
                account_holder_name: "Dev Venue Owner".into(),
            },
        }
    }
}

impl Default for OwnerDirectoryServiceDev {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OwnerDirectoryService for OwnerDirectoryServiceDev {
    async fn get_bank_info(&self, _venue_id: Uuid) -> Result<BankInfo, ServiceError> {
        Ok(self.bank_info.clone())
    }
}

/// Keeps uploaded proof images in memory and hands out `memory://` URLs.
#[derive(Default)]
pub struct ProofStorageServiceDev {
    proofs: RwLock<HashMap<Arc<str>, (Arc<str>, Vec<u8>)>>,
}

impl ProofStorageServiceDev {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProofStorageService for ProofStorageServiceDev {
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<Arc<str>, ServiceError> {
        let url: Arc<str> = format!("memory://proofs/{}", Uuid::new_v4()).into();
        let mut proofs = self.proofs.write().await;
        proofs.insert(url.clone(), (content_type.into(), bytes.to_vec()));
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), ServiceError> {
        let mut proofs = self.proofs.write().await;
        proofs.remove(url);
        Ok(())
    }
}
