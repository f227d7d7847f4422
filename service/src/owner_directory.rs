use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankInfo {
    pub bank_name: Arc<str>,
    pub account_number: Arc<str>,
    pub account_holder_name: Arc<str>,
}

/// Interface to the venue owner directory. Bank details are snapshotted into a
/// booking at creation, never referenced live.
#[automock]
#[async_trait]
pub trait OwnerDirectoryService {
    async fn get_bank_info(&self, venue_id: Uuid) -> Result<BankInfo, ServiceError>;
}
