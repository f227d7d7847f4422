use std::sync::Arc;

use courtly_utils::{DayOfWeek, TimeRange};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingHours {
    pub day_of_week: DayOfWeek,
    pub open_from: Time,
    pub open_until: Time,
}
impl From<&dao::court::OperatingHoursEntity> for OperatingHours {
    fn from(hours: &dao::court::OperatingHoursEntity) -> Self {
        Self {
            day_of_week: hours.day_of_week,
            open_from: hours.open_from,
            open_until: hours.open_until,
        }
    }
}
impl From<&OperatingHours> for dao::court::OperatingHoursEntity {
    fn from(hours: &OperatingHours) -> Self {
        Self {
            day_of_week: hours.day_of_week,
            open_from: hours.open_from,
            open_until: hours.open_until,
        }
    }
}
courtly_utils::derive_from_reference!(dao::court::OperatingHoursEntity, OperatingHours);
courtly_utils::derive_from_reference!(OperatingHours, dao::court::OperatingHoursEntity);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Court {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub name: Arc<str>,
    pub operating_hours: Arc<[OperatingHours]>,
}
impl From<&dao::court::CourtEntity> for Court {
    fn from(court: &dao::court::CourtEntity) -> Self {
        Self {
            id: court.id,
            venue_id: court.venue_id,
            name: court.name.clone(),
            operating_hours: court.operating_hours.iter().map(OperatingHours::from).collect(),
        }
    }
}
courtly_utils::derive_from_reference!(dao::court::CourtEntity, Court);

impl Court {
    /// The operating window of the court on the given date, if it opens at all.
    pub fn operating_range(&self, date: Date) -> Option<TimeRange> {
        let day_of_week = DayOfWeek::from(date.weekday());
        self.operating_hours
            .iter()
            .find(|hours| hours.day_of_week == day_of_week)
            .and_then(|hours| {
                TimeRange::new(
                    PrimitiveDateTime::new(date, hours.open_from),
                    PrimitiveDateTime::new(date, hours.open_until),
                )
                .ok()
            })
    }

    /// Whether the requested range falls entirely within one day's operating
    /// hours. Ranges which cross midnight are never within hours.
    pub fn is_within_operating_hours(&self, range: &TimeRange) -> bool {
        if range.start().date() != range.end().date() {
            return false;
        }
        self.operating_range(range.start().date())
            .is_some_and(|hours| hours.contains(range))
    }
}
