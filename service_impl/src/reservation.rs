use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao::booking::{BookingEntity, BookingStatusEntity};
use service::booking::Booking;
use service::court::Court;
use service::notification::NotificationEvent;
use service::permission::{
    Authentication, ADMIN_PRIVILEGE, CUSTOMER_PRIVILEGE, OWNER_PRIVILEGE,
};
use service::reservation::ReservationRequest;
use service::{ServiceError, ValidationFailureItem};
use time::{Duration, PrimitiveDateTime};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::error;
use uuid::Uuid;

const RESERVATION_SERVICE_PROCESS: &str = "reservation-service";

pub struct ReservationServiceImpl<
    BookingDao,
    CourtDao,
    AvailabilityService,
    PermissionService,
    ClockService,
    UuidService,
    OwnerDirectoryService,
    NotificationService,
> where
    BookingDao: dao::booking::BookingDao + Send + Sync,
    CourtDao: dao::court::CourtDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
    AvailabilityService: service::availability::AvailabilityService<Context = PermissionService::Context>
        + Send
        + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
    OwnerDirectoryService: service::owner_directory::OwnerDirectoryService + Send + Sync,
    NotificationService: service::notification::NotificationService + Send + Sync,
{
    pub booking_dao: Arc<BookingDao>,
    pub court_dao: Arc<CourtDao>,
    pub availability_service: Arc<AvailabilityService>,
    pub permission_service: Arc<PermissionService>,
    pub clock_service: Arc<ClockService>,
    pub uuid_service: Arc<UuidService>,
    pub owner_directory_service: Arc<OwnerDirectoryService>,
    pub notification_service: Arc<NotificationService>,
    /// How long an unpaid booking holds its slots.
    pub hold_duration: Duration,
    /// Per-court mutexes serializing the availability check and insert of
    /// `create`. Unrelated courts never wait on each other.
    court_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<
        BookingDao,
        CourtDao,
        AvailabilityService,
        PermissionService,
        ClockService,
        UuidService,
        OwnerDirectoryService,
        NotificationService,
    >
    ReservationServiceImpl<
        BookingDao,
        CourtDao,
        AvailabilityService,
        PermissionService,
        ClockService,
        UuidService,
        OwnerDirectoryService,
        NotificationService,
    >
where
    BookingDao: dao::booking::BookingDao + Send + Sync,
    CourtDao: dao::court::CourtDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
    AvailabilityService: service::availability::AvailabilityService<Context = PermissionService::Context>
        + Send
        + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
    OwnerDirectoryService: service::owner_directory::OwnerDirectoryService + Send + Sync,
    NotificationService: service::notification::NotificationService + Send + Sync,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        booking_dao: Arc<BookingDao>,
        court_dao: Arc<CourtDao>,
        availability_service: Arc<AvailabilityService>,
        permission_service: Arc<PermissionService>,
        clock_service: Arc<ClockService>,
        uuid_service: Arc<UuidService>,
        owner_directory_service: Arc<OwnerDirectoryService>,
        notification_service: Arc<NotificationService>,
        hold_duration: Duration,
    ) -> Self {
        Self {
            booking_dao,
            court_dao,
            availability_service,
            permission_service,
            clock_service,
            uuid_service,
            owner_directory_service,
            notification_service,
            hold_duration,
            court_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn booking_by_id(&self, id: Uuid) -> Result<BookingEntity, ServiceError> {
        self.booking_dao
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::EntityNotFound(id))
    }

    /// Fails with `Forbidden` unless the context belongs to the booking's
    /// user. `Authentication::Full` passes.
    async fn check_caller_owns_booking(
        &self,
        entity: &BookingEntity,
        context: Authentication<PermissionService::Context>,
    ) -> Result<(), ServiceError> {
        if let Some(current_user) = self.permission_service.current_user_id(context).await? {
            if current_user != entity.user_id {
                return Err(ServiceError::Forbidden);
            }
        }
        Ok(())
    }

    /// Acquires the per-court locks for every distinct court in the request,
    /// in sorted order so concurrent multi-court creates cannot deadlock.
    async fn lock_courts(&self, court_ids: &[Uuid]) -> Vec<OwnedMutexGuard<()>> {
        let mut ids = court_ids.to_vec();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let lock = {
                let mut registry = self.court_locks.lock().await;
                registry
                    .entry(id)
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            };
            guards.push(lock.lock_owned().await);
        }
        guards
    }

    /// CAS write of a status transition: fails with `EntityConflicts` when a
    /// concurrent transition moved the version first.
    async fn persist_transition(
        &self,
        entity: &BookingEntity,
        expected_version: Uuid,
    ) -> Result<(), ServiceError> {
        match self
            .booking_dao
            .update(entity, expected_version, RESERVATION_SERVICE_PROCESS)
            .await
        {
            Ok(()) => Ok(()),
            Err(dao::DaoError::VersionConflict(id, expected, actual)) => {
                Err(ServiceError::EntityConflicts(id, expected, actual))
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Fire-and-forget: a failed notification never rolls back a transition.
    async fn notify(&self, user_id: &str, event: NotificationEvent, booking_id: Uuid) {
        if let Err(notify_error) = self
            .notification_service
            .notify(user_id, event, booking_id)
            .await
        {
            error!(
                "Failed to notify user about booking {}: {:?}",
                booking_id, notify_error
            );
        }
    }

    /// Applies the expiration a sweep would have applied, for operations which
    /// observe a lapsed hold before the next sweep runs.
    async fn expire_now(&self, mut entity: BookingEntity) -> Result<(), ServiceError> {
        let expected_version = entity.version;
        entity.status = BookingStatusEntity::Expired;
        entity.expire_time = None;
        entity.version = self.uuid_service.new_uuid("booking-version");
        self.persist_transition(&entity, expected_version).await?;
        self.notify(&entity.user_id, NotificationEvent::BookingExpired, entity.id)
            .await;
        Ok(())
    }

    fn validate_request(request: &ReservationRequest) -> Vec<ValidationFailureItem> {
        let mut validation = Vec::with_capacity(4);
        if request.items.is_empty() {
            validation.push(ValidationFailureItem::None("items".into()));
        }
        if request
            .items
            .iter()
            .any(|item| item.price_minor < 0)
        {
            validation.push(ValidationFailureItem::InvalidValue("price".into()));
        }
        for (index, item) in request.items.iter().enumerate() {
            if request.items[index + 1..]
                .iter()
                .any(|other| other.court_id == item.court_id && other.range.overlaps(&item.range))
            {
                validation.push(ValidationFailureItem::InvalidValue("items".into()));
                break;
            }
        }
        validation
    }
}

#[async_trait]
impl<
        BookingDao,
        CourtDao,
        AvailabilityService,
        PermissionService,
        ClockService,
        UuidService,
        OwnerDirectoryService,
        NotificationService,
    > service::reservation::ReservationService
    for ReservationServiceImpl<
        BookingDao,
        CourtDao,
        AvailabilityService,
        PermissionService,
        ClockService,
        UuidService,
        OwnerDirectoryService,
        NotificationService,
    >
where
    BookingDao: dao::booking::BookingDao + Send + Sync,
    CourtDao: dao::court::CourtDao + Send + Sync,
    PermissionService: service::permission::PermissionService + Send + Sync,
    AvailabilityService: service::availability::AvailabilityService<Context = PermissionService::Context>
        + Send
        + Sync,
    ClockService: service::clock::ClockService + Send + Sync,
    UuidService: service::uuid_service::UuidService + Send + Sync,
    OwnerDirectoryService: service::owner_directory::OwnerDirectoryService + Send + Sync,
    NotificationService: service::notification::NotificationService + Send + Sync,
{
    type Context = PermissionService::Context;

    async fn get(
        &self,
        id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        let entity = self.booking_by_id(id).await?;
        if self
            .permission_service
            .check_permission(OWNER_PRIVILEGE, context.clone())
            .await
            .is_err()
        {
            self.permission_service
                .check_permission(CUSTOMER_PRIVILEGE, context.clone())
                .await?;
            self.check_caller_owns_booking(&entity, context).await?;
        }
        Booking::try_from(&entity)
    }

    async fn get_for_current_user(
        &self,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        let user_id = self
            .permission_service
            .current_user_id(context)
            .await?
            .ok_or(ServiceError::Forbidden)?;
        self.booking_dao
            .find_by_user_id(&user_id)
            .await?
            .iter()
            .map(Booking::try_from)
            .collect()
    }

    async fn get_for_venue(
        &self,
        venue_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[Booking]>, ServiceError> {
        self.permission_service
            .check_permission(OWNER_PRIVILEGE, context)
            .await?;
        let mut bookings = self
            .booking_dao
            .find_by_venue_id(venue_id)
            .await?
            .iter()
            .map(Booking::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        bookings.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(bookings.into())
    }

    async fn create(
        &self,
        request: &ReservationRequest,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        let user_id = self
            .permission_service
            .current_user_id(context.clone())
            .await?
            .ok_or(ServiceError::Forbidden)?;

        let mut validation = Self::validate_request(request);

        let mut court_ids: Vec<Uuid> = request.items.iter().map(|item| item.court_id).collect();
        court_ids.sort();
        court_ids.dedup();

        let mut courts: HashMap<Uuid, Court> = HashMap::with_capacity(court_ids.len());
        for court_id in &court_ids {
            let court = self
                .court_dao
                .find_by_id(*court_id)
                .await?
                .as_ref()
                .map(Court::from)
                .ok_or(ServiceError::EntityNotFound(*court_id))?;
            if court.venue_id != request.venue_id {
                validation.push(ValidationFailureItem::InvalidValue("venue_id".into()));
            }
            courts.insert(*court_id, court);
        }
        for item in request.items.iter() {
            if courts
                .get(&item.court_id)
                .is_some_and(|court| !court.is_within_operating_hours(&item.range))
            {
                validation.push(ValidationFailureItem::InvalidValue("range".into()));
            }
        }
        if !validation.is_empty() {
            return Err(ServiceError::ValidationError(validation.into()));
        }

        // Availability check and insert are serialized per court so two racing
        // requests for overlapping slots can never both succeed.
        let _guards = self.lock_courts(&court_ids).await;
        for item in request.items.iter() {
            if !self
                .availability_service
                .is_available(item.court_id, item.range, context.clone())
                .await?
            {
                return Err(ServiceError::SlotConflict {
                    court_id: item.court_id,
                    start: item.range.start(),
                    end: item.range.end(),
                });
            }
        }

        let owner_bank = self
            .owner_directory_service
            .get_bank_info(request.venue_id)
            .await?;
        let now = self.clock_service.date_time_now();
        let booking = Booking {
            id: self.uuid_service.new_uuid("booking-id"),
            user_id,
            venue_id: request.venue_id,
            items: request.items.clone(),
            status: service::booking::BookingStatus::PendingPayment,
            created: Some(now),
            expire_time: Some(now + self.hold_duration),
            payment_proof_url: None,
            payment_proof_uploaded_at: None,
            rejection_reason: None,
            owner_bank,
            version: self.uuid_service.new_uuid("booking-version"),
        };
        self.booking_dao
            .create(&(&booking).try_into()?, RESERVATION_SERVICE_PROCESS)
            .await?;

        self.notify(&booking.user_id, NotificationEvent::BookingCreated, booking.id)
            .await;
        Ok(booking)
    }

    async fn upload_proof(
        &self,
        booking_id: Uuid,
        proof_url: Arc<str>,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        let mut entity = self.booking_by_id(booking_id).await?;
        self.check_caller_owns_booking(&entity, context).await?;

        if entity.status != BookingStatusEntity::PendingPayment {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: entity.status.into(),
            });
        }
        // The hold runs until, but not including, expire_time: an upload at
        // the exact deadline is already late.
        let now = self.clock_service.date_time_now();
        if entity.expire_time.is_some_and(|expire| expire <= now) {
            self.expire_now(entity).await?;
            return Err(ServiceError::BookingExpired(booking_id));
        }

        let expected_version = entity.version;
        entity.status = BookingStatusEntity::PaymentUploaded;
        entity.payment_proof_url = Some(proof_url);
        entity.payment_proof_uploaded_at = Some(now);
        entity.version = self.uuid_service.new_uuid("booking-version");
        self.persist_transition(&entity, expected_version).await?;

        self.notify(&entity.user_id, NotificationEvent::PaymentUploaded, entity.id)
            .await;
        Booking::try_from(&entity)
    }

    async fn accept(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(OWNER_PRIVILEGE, context)
            .await?;
        let mut entity = self.booking_by_id(booking_id).await?;

        if entity.status != BookingStatusEntity::PaymentUploaded {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: entity.status.into(),
            });
        }

        let expected_version = entity.version;
        entity.status = BookingStatusEntity::Confirmed;
        entity.expire_time = None;
        entity.version = self.uuid_service.new_uuid("booking-version");
        self.persist_transition(&entity, expected_version).await?;

        self.notify(
            &entity.user_id,
            NotificationEvent::BookingConfirmed,
            entity.id,
        )
        .await;
        Booking::try_from(&entity)
    }

    async fn reject(
        &self,
        booking_id: Uuid,
        reason: &str,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(OWNER_PRIVILEGE, context)
            .await?;
        if reason.trim().is_empty() {
            return Err(ServiceError::MissingRejectionReason);
        }
        let mut entity = self.booking_by_id(booking_id).await?;

        if entity.status != BookingStatusEntity::PaymentUploaded {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: entity.status.into(),
            });
        }

        let expected_version = entity.version;
        entity.status = BookingStatusEntity::Rejected;
        entity.rejection_reason = Some(reason.into());
        entity.expire_time = None;
        entity.version = self.uuid_service.new_uuid("booking-version");
        self.persist_transition(&entity, expected_version).await?;

        self.notify(
            &entity.user_id,
            NotificationEvent::BookingRejected,
            entity.id,
        )
        .await;
        Booking::try_from(&entity)
    }

    async fn cancel(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(CUSTOMER_PRIVILEGE, context.clone())
            .await?;
        let mut entity = self.booking_by_id(booking_id).await?;
        self.check_caller_owns_booking(&entity, context).await?;

        if !matches!(
            entity.status,
            BookingStatusEntity::PendingPayment | BookingStatusEntity::PaymentUploaded
        ) {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: entity.status.into(),
            });
        }

        let expected_version = entity.version;
        entity.status = BookingStatusEntity::Cancelled;
        entity.expire_time = None;
        entity.version = self.uuid_service.new_uuid("booking-version");
        self.persist_transition(&entity, expected_version).await?;

        self.notify(
            &entity.user_id,
            NotificationEvent::BookingCancelled,
            entity.id,
        )
        .await;
        Booking::try_from(&entity)
    }

    async fn mark_no_show(
        &self,
        booking_id: Uuid,
        context: Authentication<Self::Context>,
    ) -> Result<Booking, ServiceError> {
        self.permission_service
            .check_permission(OWNER_PRIVILEGE, context)
            .await?;
        let mut entity = self.booking_by_id(booking_id).await?;

        if entity.status != BookingStatusEntity::Confirmed {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: entity.status.into(),
            });
        }
        let last_end = entity
            .items
            .iter()
            .map(|item| item.end)
            .max()
            .ok_or(ServiceError::InternalError)?;
        if last_end >= self.clock_service.date_time_now() {
            return Err(ServiceError::InvalidStateTransition {
                id: booking_id,
                current: entity.status.into(),
            });
        }

        let expected_version = entity.version;
        entity.status = BookingStatusEntity::NoShow;
        entity.version = self.uuid_service.new_uuid("booking-version");
        self.persist_transition(&entity, expected_version).await?;

        self.notify(&entity.user_id, NotificationEvent::BookingNoShow, entity.id)
            .await;
        Booking::try_from(&entity)
    }

    async fn sweep_expirations(
        &self,
        now: PrimitiveDateTime,
        context: Authentication<Self::Context>,
    ) -> Result<u32, ServiceError> {
        self.permission_service
            .check_permission(ADMIN_PRIVILEGE, context)
            .await?;

        let mut expired = 0u32;
        for status in [
            BookingStatusEntity::PendingPayment,
            BookingStatusEntity::PaymentUploaded,
        ] {
            let holds = self.booking_dao.find_by_status(status).await?;
            for entity in holds.iter() {
                if !entity.expire_time.is_some_and(|expire| expire < now) {
                    continue;
                }
                let mut stale = entity.clone();
                let expected_version = stale.version;
                stale.status = BookingStatusEntity::Expired;
                stale.expire_time = None;
                stale.version = self.uuid_service.new_uuid("booking-version");
                match self.persist_transition(&stale, expected_version).await {
                    Ok(()) => {
                        expired += 1;
                        self.notify(&stale.user_id, NotificationEvent::BookingExpired, stale.id)
                            .await;
                    }
                    Err(sweep_error) => {
                        // A single stuck booking must not abort the sweep.
                        error!(
                            "Failed to expire booking {}: {:?}",
                            stale.id, sweep_error
                        );
                    }
                }
            }
        }
        Ok(expired)
    }

    async fn mark_completed(
        &self,
        now: PrimitiveDateTime,
        context: Authentication<Self::Context>,
    ) -> Result<u32, ServiceError> {
        self.permission_service
            .check_permission(ADMIN_PRIVILEGE, context)
            .await?;

        let mut completed = 0u32;
        let confirmed = self
            .booking_dao
            .find_by_status(BookingStatusEntity::Confirmed)
            .await?;
        for entity in confirmed.iter() {
            let fully_elapsed = entity.items.iter().all(|item| item.end < now);
            if !fully_elapsed {
                continue;
            }
            let mut elapsed = entity.clone();
            let expected_version = elapsed.version;
            elapsed.status = BookingStatusEntity::Completed;
            elapsed.version = self.uuid_service.new_uuid("booking-version");
            match self.persist_transition(&elapsed, expected_version).await {
                Ok(()) => {
                    completed += 1;
                    self.notify(
                        &elapsed.user_id,
                        NotificationEvent::BookingCompleted,
                        elapsed.id,
                    )
                    .await;
                }
                Err(sweep_error) => {
                    error!(
                        "Failed to complete booking {}: {:?}",
                        elapsed.id, sweep_error
                    );
                }
            }
        }
        Ok(completed)
    }
}
