use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use service::permission::Authentication;
use service::scheduler::SchedulerService;
use service::ServiceError;
use tokio::sync::Mutex;
use tokio_cron::{Job, Scheduler};
use tracing::{error, info};

/// Runs the booking sweeps on a cron schedule. Slot availability visible to
/// other users only becomes accurate once expirations are applied, so the
/// default cadence is every minute.
pub struct SchedulerServiceImpl<ReservationService, ClockService>
where
    ReservationService: service::reservation::ReservationService + Send + Sync + 'static,
    ClockService: service::clock::ClockService + Send + Sync + 'static,
{
    pub reservation_service: Arc<ReservationService>,
    pub clock_service: Arc<ClockService>,
    scheduler: Arc<Mutex<Scheduler<Local>>>,
}

impl<ReservationService, ClockService> SchedulerServiceImpl<ReservationService, ClockService>
where
    ReservationService: service::reservation::ReservationService + Send + Sync + 'static,
    ClockService: service::clock::ClockService + Send + Sync + 'static,
{
    pub fn new(
        reservation_service: Arc<ReservationService>,
        clock_service: Arc<ClockService>,
    ) -> Self {
        Self {
            reservation_service,
            clock_service,
            scheduler: Arc::new(Mutex::new(Scheduler::local())),
        }
    }
}

#[async_trait]
impl<ReservationService, ClockService> SchedulerService
    for SchedulerServiceImpl<ReservationService, ClockService>
where
    ReservationService: service::reservation::ReservationService + Send + Sync + 'static,
    ClockService: service::clock::ClockService + Send + Sync + 'static,
{
    type Context = ReservationService::Context;

    async fn start(&self) -> Result<(), ServiceError> {
        self.schedule_booking_sweeps("0 * * * * *").await?;
        Ok(())
    }

    async fn schedule_booking_sweeps(&self, cron: &'static str) -> Result<(), ServiceError> {
        let mut sched = self.scheduler.lock().await;

        let reservation_service = self.reservation_service.clone();
        let clock_service = self.clock_service.clone();

        sched.add(Job::new(cron, move || {
            let reservation_service = reservation_service.clone();
            let clock_service = clock_service.clone();
            async move {
                let now = clock_service.date_time_now();
                match reservation_service
                    .sweep_expirations(now, Authentication::Full)
                    .await
                {
                    Ok(expired) if expired > 0 => {
                        info!("Expired {} lapsed payment holds", expired)
                    }
                    Ok(_) => {}
                    Err(e) => error!("Failed to sweep expired payment holds: {:?}", e),
                }
                match reservation_service
                    .mark_completed(now, Authentication::Full)
                    .await
                {
                    Ok(completed) if completed > 0 => {
                        info!("Completed {} elapsed bookings", completed)
                    }
                    Ok(_) => {}
                    Err(e) => error!("Failed to complete elapsed bookings: {:?}", e),
                }
            }
        }));

        info!("Scheduled booking sweeps with cron expression: {}", cron);
        Ok(())
    }
}
