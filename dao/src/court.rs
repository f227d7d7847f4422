use std::sync::Arc;

use async_trait::async_trait;
use courtly_utils::DayOfWeek;
use mockall::automock;
use time::Time;
use uuid::Uuid;

use crate::DaoError;

/// One opening window of a court on one day of the week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatingHoursEntity {
    pub day_of_week: DayOfWeek,
    pub open_from: Time,
    pub open_until: Time,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourtEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: Arc<str>,
    pub operating_hours: Arc<[OperatingHoursEntity]>,
}

/// Courts are owned by the venue catalog, which is maintained elsewhere.
/// The engine only ever reads them.
#[automock]
#[async_trait]
pub trait CourtDao {
    async fn all(&self) -> Result<Arc<[CourtEntity]>, DaoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CourtEntity>, DaoError>;
    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Arc<[CourtEntity]>, DaoError>;
}
