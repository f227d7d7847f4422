use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub user_id: Arc<str>,
    pub rating: u8,
    pub comment: Arc<str>,
    pub created: Option<PrimitiveDateTime>,
    pub updated: Option<PrimitiveDateTime>,
    pub version: Uuid,
}

impl From<&dao::review::ReviewEntity> for Review {
    fn from(review: &dao::review::ReviewEntity) -> Self {
        Self {
            id: review.id,
            booking_id: review.booking_id,
            user_id: review.user_id.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created: Some(review.created),
            updated: Some(review.updated),
            version: review.version,
        }
    }
}

impl TryFrom<&Review> for dao::review::ReviewEntity {
    type Error = ServiceError;
    fn try_from(review: &Review) -> Result<Self, Self::Error> {
        Ok(Self {
            id: review.id,
            booking_id: review.booking_id,
            user_id: review.user_id.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created: review.created.ok_or(ServiceError::InternalError)?,
            updated: review.updated.ok_or(ServiceError::InternalError)?,
            version: review.version,
        })
    }
}

/// Reviews attach one-to-one to COMPLETED bookings.
///
/// `update` is delete-then-recreate: the edited review gets a fresh id and
/// created timestamp, and a create failure after the delete leaves the booking
/// review-less until the caller retries.
#[automock(type Context=();)]
#[async_trait]
pub trait ReviewService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Review, ServiceError>;

    async fn get_for_booking(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Option<Review>, ServiceError>;

    async fn create(
        &self,
        booking_id: Uuid,
        rating: u8,
        comment: &str,
        context: Authentication<Self::Context>,
    ) -> Result<Review, ServiceError>;

    /// Callers must tolerate a new review id after an edit.
    async fn update(
        &self,
        review_id: Uuid,
        rating: u8,
        comment: &str,
        context: Authentication<Self::Context>,
    ) -> Result<Review, ServiceError>;

    async fn delete(
        &self,
        review_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError>;
}
