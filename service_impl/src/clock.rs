use service::clock::ClockService;
use time::macros::offset;
use time::OffsetDateTime;

/// Wall clock in the canonical local zone (UTC+7).
pub struct ClockServiceImpl;
impl ClockServiceImpl {
    fn now_local() -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(offset!(+7))
    }
}
impl ClockService for ClockServiceImpl {
    fn time_now(&self) -> time::Time {
        Self::now_local().time()
    }
    fn date_now(&self) -> time::Date {
        Self::now_local().date()
    }
    fn date_time_now(&self) -> time::PrimitiveDateTime {
        let now = Self::now_local();
        time::PrimitiveDateTime::new(now.date(), now.time())
    }
}
