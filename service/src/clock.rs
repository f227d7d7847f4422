use mockall::automock;

/// Injectable clock so expiration logic is testable. Implementations report
/// wall time in the canonical local zone (UTC+7).
#[automock]
pub trait ClockService {
    fn time_now(&self) -> time::Time;
    fn date_now(&self) -> time::Date;
    fn date_time_now(&self) -> time::PrimitiveDateTime;
}
