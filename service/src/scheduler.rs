use std::fmt::Debug;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

#[automock(type Context=();)]
#[async_trait]
pub trait SchedulerService {
    /// The type of the authentication context your scheduler might need to pass
    /// to other services when invoking them.
    type Context: Clone + Debug + PartialEq + Eq + Send + Sync + 'static;

    /// Start the scheduler in a background task.
    /// After calling this, scheduled jobs (added via other methods) will run automatically.
    async fn start(&self) -> Result<(), ServiceError>;

    /// Schedules the periodic booking sweeps: expiring lapsed payment holds
    /// and completing elapsed confirmed bookings.
    /// The `cron` parameter is a cron expression; availability only becomes
    /// accurate after a sweep applies expirations, so keep the interval at one
    /// minute or below (e.g. `"0 * * * * *"`).
    async fn schedule_booking_sweeps(&self, cron: &'static str) -> Result<(), ServiceError>;
}
