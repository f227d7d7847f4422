use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewEntity {
    pub id: Uuid,
    /// Unique per review; at most one review exists for a booking.
    pub booking_id: Uuid,
    pub user_id: Arc<str>,
    pub rating: u8,
    pub comment: Arc<str>,
    pub created: PrimitiveDateTime,
    pub updated: PrimitiveDateTime,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait ReviewDao {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewEntity>, DaoError>;
    async fn find_by_booking_id(&self, booking_id: Uuid) -> Result<Option<ReviewEntity>, DaoError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Arc<[ReviewEntity]>, DaoError>;
    async fn create(&self, entity: &ReviewEntity, process: &str) -> Result<(), DaoError>;
    /// Reviews are the only hard-deleted entity: an edited review is deleted
    /// and recreated under a fresh id.
    async fn delete(&self, id: Uuid, process: &str) -> Result<(), DaoError>;
}
