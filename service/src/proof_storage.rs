use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// External storage for payment proof images. The engine never inspects the
/// bytes, it only keeps the returned URL on the booking. Uploading happens
/// before `upload_proof` is called on the reservation service, never inside
/// its critical section.
#[automock]
#[async_trait]
pub trait ProofStorageService {
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<Arc<str>, ServiceError>;
    async fn delete(&self, url: &str) -> Result<(), ServiceError>;
}
