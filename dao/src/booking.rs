use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BookingStatusEntity {
    PendingPayment,
    PaymentUploaded,
    Confirmed,
    Rejected,
    Cancelled,
    Expired,
    Completed,
    NoShow,
}

impl BookingStatusEntity {
    /// A blocking booking reserves its slots against new reservations.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            Self::PendingPayment | Self::PaymentUploaded | Self::Confirmed
        )
    }
}

/// One reserved (court, time range) slot within a booking. Items belong
/// exclusively to their booking and are loaded and stored with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingItemEntity {
    pub court_id: Uuid,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub price_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingEntity {
    pub id: Uuid,
    pub user_id: Arc<str>,
    pub venue_id: Uuid,
    pub items: Arc<[BookingItemEntity]>,
    pub status: BookingStatusEntity,
    pub created: PrimitiveDateTime,
    pub expire_time: Option<PrimitiveDateTime>,
    pub payment_proof_url: Option<Arc<str>>,
    pub payment_proof_uploaded_at: Option<PrimitiveDateTime>,
    pub rejection_reason: Option<Arc<str>>,
    pub bank_name: Arc<str>,
    pub account_number: Arc<str>,
    pub account_holder_name: Arc<str>,
    pub version: Uuid,
}

#[automock]
#[async_trait]
pub trait BookingDao {
    async fn all(&self) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>, DaoError>;
    async fn find_by_user_id(&self, user_id: &str) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Arc<[BookingEntity]>, DaoError>;
    /// All bookings in a blocking status with at least one item on the court.
    async fn find_blocking_by_court_id(
        &self,
        court_id: Uuid,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn find_by_status(
        &self,
        status: BookingStatusEntity,
    ) -> Result<Arc<[BookingEntity]>, DaoError>;
    async fn create(&self, entity: &BookingEntity, process: &str) -> Result<(), DaoError>;
    /// Writes the entity if the stored version still equals `expected_version`,
    /// otherwise fails with [`DaoError::VersionConflict`]. The entity carries
    /// the new version.
    async fn update(
        &self,
        entity: &BookingEntity,
        expected_version: Uuid,
        process: &str,
    ) -> Result<(), DaoError>;
}
