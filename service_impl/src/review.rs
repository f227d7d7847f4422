use std::sync::Arc;

use async_trait::async_trait;
use dao::booking::BookingStatusEntity;
use service::permission::{Authentication, CUSTOMER_PRIVILEGE, OWNER_PRIVILEGE};
use service::review::Review;
use service::{ServiceError, ValidationFailureItem};
use tokio::join;
use uuid::Uuid;

const REVIEW_SERVICE_PROCESS: &str = "review-service";

pub struct ReviewServiceImpl<ReviewDao, BookingDao, PermissionService, ClockService, UuidService>
where
    ReviewDao: dao::review::ReviewDao + Send + Sync,
    BookingDao: dao::booking::BookingDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    pub review_dao: Arc<ReviewDao>,
    pub booking_dao: Arc<BookingDao>,
    pub permission_service: Arc<PermissionService>,
    pub clock_service: Arc<ClockService>,
    pub uuid_service: Arc<UuidService>,
}
impl<ReviewDao, BookingDao, PermissionService, ClockService, UuidService>
    ReviewServiceImpl<ReviewDao, BookingDao, PermissionService, ClockService, UuidService>
where
    ReviewDao: dao::review::ReviewDao + Send + Sync,
    BookingDao: dao::booking::BookingDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    pub fn new(
        review_dao: Arc<ReviewDao>,
        booking_dao: Arc<BookingDao>,
        permission_service: Arc<PermissionService>,
        clock_service: Arc<ClockService>,
        uuid_service: Arc<UuidService>,
    ) -> Self {
        Self {
            review_dao,
            booking_dao,
            permission_service,
            clock_service,
            uuid_service,
        }
    }

    fn validate_rating(rating: u8) -> Result<(), ServiceError> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::ValidationError(
                [ValidationFailureItem::InvalidValue("rating".into())].into(),
            ));
        }
        Ok(())
    }

    /// Fails with `Forbidden` unless the context belongs to `user_id`.
    /// `Authentication::Full` passes.
    async fn check_caller_is(
        &self,
        user_id: &str,
        context: Authentication<PermissionService::Context>,
    ) -> Result<(), ServiceError> {
        if let Some(current_user) = self.permission_service.current_user_id(context).await? {
            if current_user.as_ref() != user_id {
                return Err(ServiceError::Forbidden);
            }
        }
        Ok(())
    }

    async fn insert_review(
        &self,
        booking_id: Uuid,
        user_id: Arc<str>,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ServiceError> {
        let now = self.clock_service.date_time_now();
        let review = Review {
            id: self.uuid_service.new_uuid("review-id"),
            booking_id,
            user_id,
            rating,
            comment: comment.into(),
            created: Some(now),
            updated: Some(now),
            version: self.uuid_service.new_uuid("review-version"),
        };
        self.review_dao
            .create(&(&review).try_into()?, REVIEW_SERVICE_PROCESS)
            .await?;
        Ok(review)
    }
}

#[async_trait]
impl<ReviewDao, BookingDao, PermissionService, ClockService, UuidService>
    service::review::ReviewService
    for ReviewServiceImpl<ReviewDao, BookingDao, PermissionService, ClockService, UuidService>
where
    ReviewDao: dao::review::ReviewDao + Send + Sync,
    BookingDao: dao::booking::BookingDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Review, ServiceError> {
        let (customer_permission, owner_permission) = join!(
            self.permission_service
                .check_permission(CUSTOMER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(OWNER_PRIVILEGE, context),
        );
        customer_permission.or(owner_permission)?;

        let review = self
            .review_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))?;
        Ok(Review::from(&review))
    }

    async fn get_for_booking(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Option<Review>, ServiceError> {
        let (customer_permission, owner_permission) = join!(
            self.permission_service
                .check_permission(CUSTOMER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(OWNER_PRIVILEGE, context),
        );
        customer_permission.or(owner_permission)?;

        Ok(self
            .review_dao
            .find_by_booking_id(booking_id)
            .await?
            .as_ref()
            .map(Review::from))
    }

    async fn create(
        &self,
        booking_id: Uuid,
        rating: u8,
        comment: &str,
        context: Authentication<Self::Context>,
    ) -> Result<Review, ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        Self::validate_rating(rating)?;

        let booking = self
            .booking_dao
            .find_by_id(booking_id)
            .await?
            .ok_or(ServiceError::EntityNotFound(booking_id))?;
        self.check_caller_is(&booking.user_id, context).await?;
        if booking.status != BookingStatusEntity::Completed {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: booking.status.into(),
            });
        }
        if self
            .review_dao
            .find_by_booking_id(booking_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::ReviewAlreadyExists(booking_id));
        }

        self.insert_review(booking_id, booking.user_id.clone(), rating, comment)
            .await
    }

    async fn update(
        &self,
        review_id: Uuid,
        rating: u8,
        comment: &str,
        context: Authentication<Self::Context>,
    ) -> Result<Review, ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        Self::validate_rating(rating)?;

        let existing = self
            .review_dao
            .find_by_id(review_id)
            .await?
            .ok_or(ServiceError::EntityNotFound(review_id))?;
        self.check_caller_is(&existing.user_id, context).await?;

        // Two-phase edit. If the recreate fails after the delete, the booking
        // is left without a review and the error is surfaced for a retry.
        self.review_dao
            .delete(review_id, REVIEW_SERVICE_PROCESS)
            .await?;
        self.insert_review(
            existing.booking_id,
            existing.user_id.clone(),
            rating,
            comment,
        )
        .await
    }

    async fn delete(
        &self,
        review_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<(), ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        let existing = self
            .review_dao
            .find_by_id(review_id)
            .await?
            .ok_or(ServiceError::EntityNotFound(review_id))?;
        self.check_caller_is(&existing.user_id, context).await?;

        self.review_dao
            .delete(review_id, REVIEW_SERVICE_PROCESS)
            .await?;
        Ok(())
    }
}
