
mod dev;

use std::sync::Arc;

use courtly_utils::DayOfWeek;
use dao::court::{CourtEntity, OperatingHoursEntity};
use dao_impl_memory::{BookingDaoImpl, CourtDaoImpl, ReviewDaoImpl};
use service::scheduler::SchedulerService;
use time::macros::time;
use time::Duration;
use uuid::uuid;
#[cfg(feature = "json_logging")]
use tracing_subscriber::fmt::format::FmtSpan;

use dev::{NotificationServiceDev, OwnerDirectoryServiceDev, ProofStorageServiceDev};

type BookingDao = BookingDaoImpl;
type CourtDao = CourtDaoImpl;
type ReviewDao = ReviewDaoImpl;

// Grant every privilege to a fixed developer user so the engine can be
// exercised locally without a login service.
type PermissionService = service_impl::PermissionServiceDev;
type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;

type AvailabilityService =
    service_impl::AvailabilityServiceImpl<BookingDao, CourtDao, PermissionService>;
type ReservationService = service_impl::ReservationServiceImpl<
    BookingDao,
    CourtDao,
    AvailabilityService,
    PermissionService,
    ClockService,
    UuidService,
    OwnerDirectoryServiceDev,
    NotificationServiceDev,
>;
type ReviewService = service_impl::ReviewServiceImpl<
    ReviewDao,
    BookingDao,
    PermissionService,
    ClockService,
    UuidService,
>;
type SchedulerServiceImpl =
    service_impl::SchedulerServiceImpl<ReservationService, ClockService>;

pub struct EngineState {
    pub court_dao: Arc<CourtDao>,
    pub reservation_service: Arc<ReservationService>,
    pub review_service: Arc<ReviewService>,
    pub availability_service: Arc<AvailabilityService>,
    pub proof_storage_service: Arc<ProofStorageServiceDev>,
    pub clock_service: Arc<ClockService>,
}

impl EngineState {
    pub fn new(hold_duration: Duration) -> Self {
        let booking_dao = Arc::new(BookingDao::new());
        let court_dao = Arc::new(CourtDao::new());
        let review_dao = Arc::new(ReviewDao::new());

        let permission_service = Arc::new(PermissionService::new("DEVUSER"));
        let clock_service = Arc::new(service_impl::clock::ClockServiceImpl);
        let uuid_service = Arc::new(service_impl::uuid_service::UuidServiceImpl);
        let owner_directory_service = Arc::new(OwnerDirectoryServiceDev::new());
        let notification_service = Arc::new(NotificationServiceDev);
        let proof_storage_service = Arc::new(ProofStorageServiceDev::new());

        let availability_service = Arc::new(AvailabilityService::new(
            booking_dao.clone(),
            court_dao.clone(),
            permission_service.clone(),
        ));
        let reservation_service = Arc::new(ReservationService::new(
            booking_dao.clone(),
            court_dao.clone(),
            availability_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            owner_directory_service,
            notification_service,
            hold_duration,
        ));
        let review_service = Arc::new(ReviewService::new(
            review_dao,
            booking_dao,
            permission_service,
            clock_service.clone(),
            uuid_service,
        ));

        Self {
            court_dao,
            reservation_service,
            review_service,
            availability_service,
            proof_storage_service,
            clock_service,
        }
    }
}

/// Seeds one demo venue with two courts, open 08:00-22:00 every day.
async fn seed_demo_catalog(court_dao: &CourtDao) {
    let venue_id = uuid!("1B7C27C0-55E7-43C6-A4E4-1778F3F9D9B3");
    let operating_hours: Arc<[OperatingHoursEntity]> = (1..=7)
        .filter_map(DayOfWeek::from_number)
        .map(|day_of_week| OperatingHoursEntity {
            day_of_week,
            open_from: time!(8:00),
            open_until: time!(22:00),
        })
        .collect();
    for (court_id, name) in [
        (uuid!("9A5B2E6B-8D7E-4C57-8F2D-0C1B8A4E6F21"), "Court A"),
        (uuid!("C4D9A7F1-2B3E-4A68-9E5C-7D8F0B1A2C3D"), "Court B"),
    ] {
        court_dao
            .add(&CourtEntity {
                id: court_id,
                venue_id,
                name: name.into(),
                operating_hours: operating_hours.clone(),
            })
            .await
            .expect("Expected the demo catalog to seed");
    }
    tracing::info!("Seeded demo venue {} with 2 courts", venue_id);
}

#[tokio::main]
async fn main() {
    let version = env!("CARGO_PKG_VERSION");

    #[cfg(feature = "local_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .pretty()
        .with_file(true)
        .finish();

    #[cfg(feature = "json_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    tracing::info!("Courtly booking engine version: {}", version);
    dotenvy::dotenv().ok();

    let hold_minutes: i64 = std::env::var("COURTLY_HOLD_MINUTES")
        .ok()
        .and_then(|minutes| minutes.parse().ok())
        .unwrap_or(15);
    // The scheduler holds the cron expression for the lifetime of the process.
    let sweep_cron: &'static str = match std::env::var("COURTLY_SWEEP_CRON") {
        Ok(cron) => Box::leak(cron.into_boxed_str()),
        Err(_) => "0 * * * * *",
    };

    let state = EngineState::new(Duration::minutes(hold_minutes));
    seed_demo_catalog(state.court_dao.as_ref()).await;

    let scheduler_service = SchedulerServiceImpl::new(
        state.reservation_service.clone(),
        state.clock_service.clone(),
    );
    scheduler_service
        .schedule_booking_sweeps(sweep_cron)
        .await
        .expect("Expected the scheduler to accept the sweep job");

    tokio::signal::ctrl_c()
        .await
        .expect("Expected a shutdown signal");
    tracing::info!("Shutting down");
}
