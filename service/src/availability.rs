use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use courtly_utils::TimeRange;
use mockall::automock;
use uuid::Uuid;

use crate::permission::Authentication;
use crate::ServiceError;

/// Answers which sub-intervals of a court are free.
///
/// Availability is always re-derived from the live booking set: the moment a
/// booking leaves the blocking statuses its slots are free again, without any
/// separate unlock bookkeeping.
#[automock(type Context=();)]
#[async_trait]
pub trait AvailabilityService {
    type Context: Clone + PartialEq + Eq + Debug + Send + Sync + 'static;

    /// Free sub-intervals of the court's operating hours within the window,
    /// ascending.
    async fn free_intervals(
        &self,
        court_id: Uuid,
        window: TimeRange,
        context: Authentication<Self::Context>,
    ) -> Result<Arc<[TimeRange]>, ServiceError>;

    /// True when no blocking booking item overlaps the requested range.
    async fn is_available(
        &self,
        court_id: Uuid,
        range: TimeRange,
        context: Authentication<Self::Context>,
    ) -> Result<bool, ServiceError>;
}
