use std::sync::Arc;

use async_trait::async_trait;
use courtly_utils::{TimeRange, TimeRangeError};
use service::court::Court;
use service::permission::{Authentication, CUSTOMER_PRIVILEGE, OWNER_PRIVILEGE};
use service::ServiceError;
use tokio::join;
use uuid::Uuid;

pub struct AvailabilityServiceImpl<BookingDao, CourtDao, PermissionService>
where
    BookingDao: dao::booking::BookingDao + Send + Sync,
    CourtDao: dao::court::CourtDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
{
    pub booking_dao: Arc<BookingDao>,
    pub court_dao: Arc<CourtDao>,
    pub permission_service: Arc<PermissionService>,
}
impl<BookingDao, CourtDao, PermissionService>
    AvailabilityServiceImpl<BookingDao, CourtDao, PermissionService>
where
    BookingDao: dao::booking::BookingDao + Send + Sync,
    CourtDao: dao::court::CourtDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
{
    pub fn new(
        booking_dao: Arc<BookingDao>,
        court_dao: Arc<CourtDao>,
        permission_service: Arc<PermissionService>,
    ) -> Self {
        Self {
            booking_dao,
            court_dao,
            permission_service,
        }
    }

    async fn check_read_permission(
        &self,
        context: Authentication<PermissionService::Context>,
    ) -> Result<(), ServiceError> {
        let (customer_permission, owner_permission) = join!(
            self.permission_service
                .check_permission(CUSTOMER_PRIVILEGE, context.clone()),
            self.permission_service
                .check_permission(OWNER_PRIVILEGE, context),
        );
        customer_permission.or(owner_permission)
    }

    /// Item ranges of every blocking booking on the court, straight from the
    /// live booking set.
    async fn blocking_ranges(&self, court_id: Uuid) -> Result<Vec<TimeRange>, ServiceError> {
        let blocking = self.booking_dao.find_blocking_by_court_id(court_id).await?;
        let ranges = blocking
            .iter()
            .flat_map(|booking| booking.items.iter())
            .filter(|item| item.court_id == court_id)
            .map(|item| TimeRange::new(item.start, item.end))
            .collect::<Result<Vec<_>, TimeRangeError>>()?;
        Ok(ranges)
    }
}

#[async_trait]
impl<BookingDao, CourtDao, PermissionService> service::availability::AvailabilityService
    for AvailabilityServiceImpl<BookingDao, CourtDao, PermissionService>
where
    BookingDao: dao::booking::BookingDao + Send + Sync,
    CourtDao: dao::court::CourtDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn free_intervals(
        &self,
        court_id: Uuid,
        window: TimeRange,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[TimeRange]>, ServiceError> {
        self.check_read_permission(context).await?;

        let court = self
            .court_dao
            .find_by_id(court_id)
            .await?
            .as_ref()
            .map(Court::from)
            .ok_or(ServiceError::EntityNotFound(court_id))?;
        let blockers = self.blocking_ranges(court_id).await?;

        let mut free = Vec::new();
        let mut date = window.start().date();
        let last_date = window.end().date();
        while date <= last_date {
            if let Some(hours) = court.operating_range(date) {
                if let Some(day_window) = hours.intersect(&window) {
                    free.extend(TimeRange::subtract_all(&day_window, &blockers));
                }
            }
            date = date.next_day().ok_or(ServiceError::InternalError)?;
        }
        Ok(free.into())
    }

    async fn is_available(
        &self,
        court_id: Uuid,
        range: TimeRange,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError> {
        self.check_read_permission(context).await?;

        let blockers = self.blocking_ranges(court_id).await?;
        Ok(!blockers.iter().any(|blocker| blocker.overlaps(&range)))
    }
}
