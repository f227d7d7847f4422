use std::sync::Arc;

use courtly_utils::{DayOfWeek, TimeRange};
use dao::booking::{BookingEntity, BookingItemEntity, BookingStatusEntity, MockBookingDao};
use dao::court::{CourtEntity, MockCourtDao, OperatingHoursEntity};
use mockall::predicate::{always, eq};
use service::availability::MockAvailabilityService;
use service::booking::{BookingItem, BookingStatus};
use service::clock::MockClockService;
use service::notification::{MockNotificationService, NotificationEvent};
use service::owner_directory::{BankInfo, MockOwnerDirectoryService};
use service::permission::MockPermissionService;
use service::reservation::{ReservationRequest, ReservationService};
use service::uuid_service::MockUuidService;
use service::{ServiceError, ValidationFailureItem};
use time::macros::{datetime, time};
use time::Duration;
use uuid::{uuid, Uuid};

use crate::reservation::ReservationServiceImpl;
use crate::test::error_test::*;

pub fn default_booking_id() -> Uuid {
    uuid!("712B1288-7AF8-4B7B-B375-FB04EC5C9BA8")
}
pub fn alternate_booking_id() -> Uuid {
    uuid!("15B815BD-1B14-4B59-9B6B-1A2F6E7A65B4")
}
pub fn default_version() -> Uuid {
    uuid!("25B0E551-F931-4A61-A50C-CFC462B0BA12")
}
pub fn alternate_version() -> Uuid {
    uuid!("4B5B7ABC-B8B8-4C37-A375-94C7E33C62E9")
}
pub fn default_court_id() -> Uuid {
    uuid!("BE5EC0FB-2EF4-43A6-A2B3-A45D6A7D04C5")
}
pub fn default_venue_id() -> Uuid {
    uuid!("E5D60CAA-F8A4-4B7D-B2E1-85A176C9569E")
}

pub fn default_user() -> Arc<str> {
    "customer1".into()
}

pub fn default_bank_info() -> BankInfo {
    BankInfo {
        bank_name: "KBank".into(),
        account_number: "123-456-789".into(),
        account_holder_name: "Venue Owner".into(),
    }
}

pub fn default_court_entity() -> CourtEntity {
    // Open every day of the week, 08:00-22:00.
    let operating_hours: Arc<[OperatingHoursEntity]> = (1..=7)
        .filter_map(DayOfWeek::from_number)
        .map(|day_of_week| OperatingHoursEntity {
            day_of_week,
            open_from: time!(8:00),
            open_until: time!(22:00),
        })
        .collect();
    CourtEntity {
        id: default_court_id(),
        venue_id: default_venue_id(),
        name: "Court A".into(),
        operating_hours,
    }
}

pub fn default_range() -> TimeRange {
    TimeRange::new(datetime!(2025-11-18 10:00), datetime!(2025-11-18 11:00)).unwrap()
}

pub fn default_item() -> BookingItem {
    BookingItem {
        court_id: default_court_id(),
        range: default_range(),
        price_minor: 10000,
    }
}

pub fn default_request() -> ReservationRequest {
    ReservationRequest {
        venue_id: default_venue_id(),
        items: [default_item()].into(),
    }
}

pub fn default_item_entity() -> BookingItemEntity {
    BookingItemEntity {
        court_id: default_court_id(),
        start: datetime!(2025-11-18 10:00),
        end: datetime!(2025-11-18 11:00),
        price_minor: 10000,
    }
}

pub fn default_booking_entity() -> BookingEntity {
    BookingEntity {
        id: default_booking_id(),
        user_id: default_user(),
        venue_id: default_venue_id(),
        items: [default_item_entity()].into(),
        status: BookingStatusEntity::PendingPayment,
        created: generate_default_datetime(),
        expire_time: Some(datetime!(2025-11-18 9:15)),
        payment_proof_url: None,
        payment_proof_uploaded_at: None,
        rejection_reason: None,
        bank_name: "KBank".into(),
        account_number: "123-456-789".into(),
        account_holder_name: "Venue Owner".into(),
        version: default_version(),
    }
}

pub struct ReservationServiceDependencies {
    pub booking_dao: MockBookingDao,
    pub court_dao: MockCourtDao,
    pub availability_service: MockAvailabilityService,
    pub permission_service: MockPermissionService,
    pub clock_service: MockClockService,
    pub uuid_service: MockUuidService,
    pub owner_directory_service: MockOwnerDirectoryService,
    pub notification_service: MockNotificationService,
}

pub type ReservationServiceUnderTest = ReservationServiceImpl<
    MockBookingDao,
    MockCourtDao,
    MockAvailabilityService,
    MockPermissionService,
    MockClockService,
    MockUuidService,
    MockOwnerDirectoryService,
    MockNotificationService,
>;

impl ReservationServiceDependencies {
    pub fn build_service(self) -> ReservationServiceUnderTest {
        ReservationServiceImpl::new(
            self.booking_dao.into(),
            self.court_dao.into(),
            self.availability_service.into(),
            self.permission_service.into(),
            self.clock_service.into(),
            self.uuid_service.into(),
            self.owner_directory_service.into(),
            self.notification_service.into(),
            Duration::minutes(15),
        )
    }
}

pub fn build_dependencies(permission: bool, role: &'static str) -> ReservationServiceDependencies {
    let mut permission_service = MockPermissionService::new();
    permission_service
        .expect_check_permission()
        .with(eq(role), always())
        .returning(move |_, _| {
            if permission {
                Ok(())
            } else {
                Err(ServiceError::Forbidden)
            }
        });
    permission_service
        .expect_check_permission()
        .returning(|_, _| Err(ServiceError::Forbidden));

    let mut clock_service = MockClockService::new();
    clock_service
        .expect_date_time_now()
        .returning(generate_default_datetime);

    ReservationServiceDependencies {
        booking_dao: MockBookingDao::new(),
        court_dao: MockCourtDao::new(),
        availability_service: MockAvailabilityService::new(),
        permission_service,
        clock_service,
        uuid_service: MockUuidService::new(),
        owner_directory_service: MockOwnerDirectoryService::new(),
        notification_service: MockNotificationService::new(),
    }
}

pub fn expect_current_user(permission_service: &mut MockPermissionService, user: &'static str) {
    permission_service
        .expect_current_user_id()
        .returning(move |_| Ok(Some(user.into())));
}

fn expect_version_uuid(dependencies: &mut ReservationServiceDependencies) {
    dependencies
        .uuid_service
        .expect_new_uuid()
        .with(eq("booking-version"))
        .returning(|_| alternate_version());
}

fn expect_notification(
    dependencies: &mut ReservationServiceDependencies,
    event: NotificationEvent,
) {
    dependencies
        .notification_service
        .expect_notify()
        .with(eq("customer1"), eq(event), always())
        .times(1)
        .returning(|_, _, _| Ok(()));
}

#[tokio::test]
async fn test_create() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .court_dao
        .expect_find_by_id()
        .with(eq(default_court_id()))
        .returning(|_| Ok(Some(default_court_entity())));
    dependencies
        .availability_service
        .expect_is_available()
        .with(eq(default_court_id()), eq(default_range()), always())
        .returning(|_, _, _| Ok(true));
    dependencies
        .owner_directory_service
        .expect_get_bank_info()
        .with(eq(default_venue_id()))
        .returning(|_| Ok(default_bank_info()));
    dependencies
        .uuid_service
        .expect_new_uuid()
        .with(eq("booking-id"))
        .returning(|_| default_booking_id());
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_create()
        .withf(|entity, process| {
            entity.id == default_booking_id()
                && entity.user_id == default_user()
                && entity.status == BookingStatusEntity::PendingPayment
                && entity.expire_time == Some(datetime!(2025-11-18 9:15))
                && entity.items.as_ref() == [default_item_entity()]
                && process == "reservation-service"
        })
        .times(1)
        .returning(|_, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingCreated);
    let service = dependencies.build_service();

    let result = service.create(&default_request(), ().auth()).await;

    let booking = result.expect("Expected successful creation");
    assert_eq!(booking.id, default_booking_id());
    assert_eq!(booking.status, BookingStatus::PendingPayment);
    assert_eq!(booking.expire_time, Some(datetime!(2025-11-18 9:15)));
    assert_eq!(booking.total_price_minor(), 10000);
    assert_eq!(booking.owner_bank, default_bank_info());
}

#[tokio::test]
async fn test_create_no_permission() {
    let dependencies = build_dependencies(false, "customer");
    let service = dependencies.build_service();

    let result = service.create(&default_request(), ().auth()).await;

    test_forbidden(&result);
}

#[tokio::test]
async fn test_create_slot_conflict() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .court_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_court_entity())));
    dependencies
        .availability_service
        .expect_is_available()
        .returning(|_, _, _| Ok(false));
    let service = dependencies.build_service();

    let result = service.create(&default_request(), ().auth()).await;

    test_slot_conflict(&result, &default_court_id());
}

#[tokio::test]
async fn test_create_outside_operating_hours() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .court_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_court_entity())));
    let service = dependencies.build_service();

    let request = ReservationRequest {
        venue_id: default_venue_id(),
        items: [BookingItem {
            court_id: default_court_id(),
            range: TimeRange::new(datetime!(2025-11-18 7:00), datetime!(2025-11-18 8:30))
                .unwrap(),
            price_minor: 10000,
        }]
        .into(),
    };
    let result = service.create(&request, ().auth()).await;

    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("range".into()),
        1,
    );
}

#[tokio::test]
async fn test_create_court_of_another_venue() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies.court_dao.expect_find_by_id().returning(|_| {
        Ok(Some(CourtEntity {
            venue_id: uuid!("0419BFAB-55E4-4E8A-B493-3A1B7F3F03A9"),
            ..default_court_entity()
        }))
    });
    let service = dependencies.build_service();

    let result = service.create(&default_request(), ().auth()).await;

    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("venue_id".into()),
        1,
    );
}

#[tokio::test]
async fn test_create_unknown_court() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .court_dao
        .expect_find_by_id()
        .returning(|_| Ok(None));
    let service = dependencies.build_service();

    let result = service.create(&default_request(), ().auth()).await;

    test_not_found(&result, &default_court_id());
}

#[tokio::test]
async fn test_create_without_items() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    let service = dependencies.build_service();

    let request = ReservationRequest {
        venue_id: default_venue_id(),
        items: Arc::from([]),
    };
    let result = service.create(&request, ().auth()).await;

    test_validation_error(&result, &ValidationFailureItem::None("items".into()), 1);
}

#[tokio::test]
async fn test_create_with_overlapping_items() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .court_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_court_entity())));
    let service = dependencies.build_service();

    let request = ReservationRequest {
        venue_id: default_venue_id(),
        items: [
            default_item(),
            BookingItem {
                court_id: default_court_id(),
                range: TimeRange::new(
                    datetime!(2025-11-18 10:30),
                    datetime!(2025-11-18 11:30),
                )
                .unwrap(),
                price_minor: 10000,
            },
        ]
        .into(),
    };
    let result = service.create(&request, ().auth()).await;

    test_validation_error(
        &result,
        &ValidationFailureItem::InvalidValue("items".into()),
        1,
    );
}

#[tokio::test]
async fn test_upload_proof() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .with(eq(default_booking_id()))
        .returning(|_| Ok(Some(default_booking_entity())));
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, expected_version, process| {
            entity.status == BookingStatusEntity::PaymentUploaded
                && entity.payment_proof_url.as_deref() == Some("https://proofs.test/1.jpg")
                && entity.payment_proof_uploaded_at == Some(generate_default_datetime())
                && entity.version == alternate_version()
                && *expected_version == default_version()
                && process == "reservation-service"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::PaymentUploaded);
    let service = dependencies.build_service();

    let result = service
        .upload_proof(default_booking_id(), "https://proofs.test/1.jpg".into(), ().auth())
        .await;

    let booking = result.expect("Expected successful proof upload");
    assert_eq!(booking.status, BookingStatus::PaymentUploaded);
}

#[tokio::test]
async fn test_upload_proof_after_hold_lapsed() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            expire_time: Some(datetime!(2025-11-18 8:00)),
            ..default_booking_entity()
        }))
    });
    expect_version_uuid(&mut dependencies);
    // The lapsed hold is expired on the spot.
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| {
            entity.status == BookingStatusEntity::Expired && entity.expire_time.is_none()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingExpired);
    let service = dependencies.build_service();

    let result = service
        .upload_proof(default_booking_id(), "https://proofs.test/1.jpg".into(), ().auth())
        .await;

    test_booking_expired(&result, &default_booking_id());
}

#[tokio::test]
async fn test_upload_proof_at_the_exact_deadline_is_late() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    // expire_time coincides with the clock; the hold excludes its deadline.
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            expire_time: Some(generate_default_datetime()),
            ..default_booking_entity()
        }))
    });
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| {
            entity.status == BookingStatusEntity::Expired && entity.expire_time.is_none()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingExpired);
    let service = dependencies.build_service();

    let result = service
        .upload_proof(default_booking_id(), "https://proofs.test/1.jpg".into(), ().auth())
        .await;

    test_booking_expired(&result, &default_booking_id());
}

#[tokio::test]
async fn test_upload_proof_wrong_state() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            status: BookingStatusEntity::Confirmed,
            ..default_booking_entity()
        }))
    });
    let service = dependencies.build_service();

    let result = service
        .upload_proof(default_booking_id(), "https://proofs.test/1.jpg".into(), ().auth())
        .await;

    test_invalid_state(&result, &default_booking_id());
}

#[tokio::test]
async fn test_upload_proof_of_another_users_booking() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer2");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_booking_entity())));
    let service = dependencies.build_service();

    let result = service
        .upload_proof(default_booking_id(), "https://proofs.test/1.jpg".into(), ().auth())
        .await;

    test_forbidden(&result);
}

#[tokio::test]
async fn test_accept() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            status: BookingStatusEntity::PaymentUploaded,
            ..default_booking_entity()
        }))
    });
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, expected_version, _| {
            entity.status == BookingStatusEntity::Confirmed
                && entity.expire_time.is_none()
                && *expected_version == default_version()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingConfirmed);
    let service = dependencies.build_service();

    let result = service.accept(default_booking_id(), ().auth()).await;

    let booking = result.expect("Expected successful accept");
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.expire_time, None);
}

#[tokio::test]
async fn test_accept_without_uploaded_proof() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_booking_entity())));
    let service = dependencies.build_service();

    let result = service.accept(default_booking_id(), ().auth()).await;

    test_invalid_state(&result, &default_booking_id());
}

#[tokio::test]
async fn test_reject() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            status: BookingStatusEntity::PaymentUploaded,
            ..default_booking_entity()
        }))
    });
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| {
            entity.status == BookingStatusEntity::Rejected
                && entity.rejection_reason.as_deref() == Some("Transfer never arrived")
                && entity.expire_time.is_none()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingRejected);
    let service = dependencies.build_service();

    let result = service
        .reject(default_booking_id(), "Transfer never arrived", ().auth())
        .await;

    let booking = result.expect("Expected successful reject");
    assert_eq!(booking.status, BookingStatus::Rejected);
    assert_eq!(
        booking.rejection_reason.as_deref(),
        Some("Transfer never arrived")
    );
}

#[tokio::test]
async fn test_reject_with_blank_reason() {
    let dependencies = build_dependencies(true, "owner");
    let service = dependencies.build_service();

    let result = service.reject(default_booking_id(), "   ", ().auth()).await;

    test_missing_reason(&result);
}

#[tokio::test]
async fn test_cancel() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_booking_entity())));
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| {
            entity.status == BookingStatusEntity::Cancelled && entity.expire_time.is_none()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingCancelled);
    let service = dependencies.build_service();

    let result = service.cancel(default_booking_id(), ().auth()).await;

    let booking = result.expect("Expected successful cancel");
    assert_eq!(booking.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_confirmed_booking() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            status: BookingStatusEntity::Confirmed,
            ..default_booking_entity()
        }))
    });
    let service = dependencies.build_service();

    let result = service.cancel(default_booking_id(), ().auth()).await;

    test_invalid_state(&result, &default_booking_id());
}

#[tokio::test]
async fn test_cancel_of_another_users_booking() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer2");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_booking_entity())));
    let service = dependencies.build_service();

    let result = service.cancel(default_booking_id(), ().auth()).await;

    test_forbidden(&result);
}

#[tokio::test]
async fn test_mark_no_show() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            status: BookingStatusEntity::Confirmed,
            items: [BookingItemEntity {
                start: datetime!(2025-11-18 7:00),
                end: datetime!(2025-11-18 8:00),
                ..default_item_entity()
            }]
            .into(),
            expire_time: None,
            ..default_booking_entity()
        }))
    });
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| entity.status == BookingStatusEntity::NoShow)
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingNoShow);
    let service = dependencies.build_service();

    let result = service.mark_no_show(default_booking_id(), ().auth()).await;

    let booking = result.expect("Expected successful no-show flag");
    assert_eq!(booking.status, BookingStatus::NoShow);
}

#[tokio::test]
async fn test_mark_no_show_before_booking_end() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies.booking_dao.expect_find_by_id().returning(|_| {
        Ok(Some(BookingEntity {
            status: BookingStatusEntity::Confirmed,
            expire_time: None,
            ..default_booking_entity()
        }))
    });
    let service = dependencies.build_service();

    let result = service.mark_no_show(default_booking_id(), ().auth()).await;

    test_invalid_state(&result, &default_booking_id());
}

#[tokio::test]
async fn test_sweep_expirations() {
    let mut dependencies = build_dependencies(true, "admin");
    dependencies
        .booking_dao
        .expect_find_by_status()
        .with(eq(BookingStatusEntity::PendingPayment))
        .returning(|_| Ok([default_booking_entity()].into()));
    dependencies
        .booking_dao
        .expect_find_by_status()
        .with(eq(BookingStatusEntity::PaymentUploaded))
        .returning(|_| Ok(Arc::new([])));
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, expected_version, _| {
            entity.status == BookingStatusEntity::Expired
                && entity.expire_time.is_none()
                && *expected_version == default_version()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingExpired);
    let service = dependencies.build_service();

    let result = service
        .sweep_expirations(datetime!(2025-11-18 9:16), ().auth())
        .await;

    assert_eq!(result.expect("Expected successful sweep"), 1);
}

#[tokio::test]
async fn test_sweep_expirations_keeps_live_holds() {
    let mut dependencies = build_dependencies(true, "admin");
    dependencies
        .booking_dao
        .expect_find_by_status()
        .returning(|_| Ok([default_booking_entity()].into()));
    let service = dependencies.build_service();

    let result = service
        .sweep_expirations(datetime!(2025-11-18 9:10), ().auth())
        .await;

    assert_eq!(result.expect("Expected successful sweep"), 0);
}

#[tokio::test]
async fn test_sweep_expirations_continues_after_failure() {
    let mut dependencies = build_dependencies(true, "admin");
    dependencies
        .booking_dao
        .expect_find_by_status()
        .with(eq(BookingStatusEntity::PendingPayment))
        .returning(|_| {
            Ok([
                default_booking_entity(),
                BookingEntity {
                    id: alternate_booking_id(),
                    ..default_booking_entity()
                },
            ]
            .into())
        });
    dependencies
        .booking_dao
        .expect_find_by_status()
        .with(eq(BookingStatusEntity::PaymentUploaded))
        .returning(|_| Ok(Arc::new([])));
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| entity.id == default_booking_id())
        .times(1)
        .returning(|_, _, _| Err(dao::DaoError::DatabaseQueryError("disk full".into())));
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| entity.id == alternate_booking_id())
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingExpired);
    let service = dependencies.build_service();

    let result = service
        .sweep_expirations(datetime!(2025-11-18 9:16), ().auth())
        .await;

    assert_eq!(result.expect("Expected successful sweep"), 1);
}

#[tokio::test]
async fn test_sweep_expirations_no_permission() {
    let dependencies = build_dependencies(false, "admin");
    let service = dependencies.build_service();

    let result = service
        .sweep_expirations(generate_default_datetime(), ().auth())
        .await;

    test_forbidden(&result);
}

#[tokio::test]
async fn test_mark_completed() {
    let mut dependencies = build_dependencies(true, "admin");
    dependencies
        .booking_dao
        .expect_find_by_status()
        .with(eq(BookingStatusEntity::Confirmed))
        .returning(|_| {
            Ok([
                BookingEntity {
                    status: BookingStatusEntity::Confirmed,
                    expire_time: None,
                    ..default_booking_entity()
                },
                BookingEntity {
                    id: alternate_booking_id(),
                    status: BookingStatusEntity::Confirmed,
                    expire_time: None,
                    items: [BookingItemEntity {
                        start: datetime!(2025-11-19 10:00),
                        end: datetime!(2025-11-19 11:00),
                        ..default_item_entity()
                    }]
                    .into(),
                    ..default_booking_entity()
                },
            ]
            .into())
        });
    expect_version_uuid(&mut dependencies);
    // Only the fully elapsed booking completes, the future one stays put.
    dependencies
        .booking_dao
        .expect_update()
        .withf(|entity, _, _| {
            entity.id == default_booking_id() && entity.status == BookingStatusEntity::Completed
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    expect_notification(&mut dependencies, NotificationEvent::BookingCompleted);
    let service = dependencies.build_service();

    let result = service
        .mark_completed(datetime!(2025-11-18 12:00), ().auth())
        .await;

    assert_eq!(result.expect("Expected successful completion sweep"), 1);
}

#[tokio::test]
async fn test_create_succeeds_when_notification_fails() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .court_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_court_entity())));
    dependencies
        .availability_service
        .expect_is_available()
        .returning(|_, _, _| Ok(true));
    dependencies
        .owner_directory_service
        .expect_get_bank_info()
        .returning(|_| Ok(default_bank_info()));
    dependencies
        .uuid_service
        .expect_new_uuid()
        .with(eq("booking-id"))
        .returning(|_| default_booking_id());
    expect_version_uuid(&mut dependencies);
    dependencies
        .booking_dao
        .expect_create()
        .returning(|_, _| Ok(()));
    dependencies
        .notification_service
        .expect_notify()
        .returning(|_, _, _| Err(ServiceError::InternalError));
    let service = dependencies.build_service();

    let result = service.create(&default_request(), ().auth()).await;

    assert!(result.is_ok(), "A failed notification must not fail create");
}

#[tokio::test]
async fn test_get_as_owner() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .with(eq(default_booking_id()))
        .returning(|_| Ok(Some(default_booking_entity())));
    let service = dependencies.build_service();

    let result = service.get(default_booking_id(), ().auth()).await;

    assert_eq!(
        result.expect("Expected booking").id,
        default_booking_id()
    );
}

#[tokio::test]
async fn test_get_as_foreign_customer() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer2");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .returning(|_| Ok(Some(default_booking_entity())));
    let service = dependencies.build_service();

    let result = service.get(default_booking_id(), ().auth()).await;

    test_forbidden(&result);
}

#[tokio::test]
async fn test_get_not_found() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies
        .booking_dao
        .expect_find_by_id()
        .returning(|_| Ok(None));
    let service = dependencies.build_service();

    let result = service.get(default_booking_id(), ().auth()).await;

    test_not_found(&result, &default_booking_id());
}

#[tokio::test]
async fn test_get_for_current_user() {
    let mut dependencies = build_dependencies(true, "customer");
    expect_current_user(&mut dependencies.permission_service, "customer1");
    dependencies
        .booking_dao
        .expect_find_by_user_id()
        .with(eq("customer1"))
        .returning(|_| Ok([default_booking_entity()].into()));
    let service = dependencies.build_service();

    let result = service.get_for_current_user(().auth()).await;

    let bookings = result.expect("Expected bookings");
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].id, default_booking_id());
}

#[tokio::test]
async fn test_get_for_venue_newest_first() {
    let mut dependencies = build_dependencies(true, "owner");
    dependencies
        .booking_dao
        .expect_find_by_venue_id()
        .with(eq(default_venue_id()))
        .returning(|_| {
            Ok([
                default_booking_entity(),
                BookingEntity {
                    id: alternate_booking_id(),
                    created: datetime!(2025-11-18 10:00),
                    ..default_booking_entity()
                },
            ]
            .into())
        });
    let service = dependencies.build_service();

    let result = service.get_for_venue(default_venue_id(), ().auth()).await;

    let bookings = result.expect("Expected bookings");
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0].id, alternate_booking_id());
    assert_eq!(bookings[1].id, default_booking_id());
}
