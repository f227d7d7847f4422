pub mod day_of_week;
pub mod time_range;

pub use day_of_week::DayOfWeek;
pub use time_range::{TimeRange, TimeRangeError};

/// Implement `From<T>` for a type which already implement From<&T>
#[macro_export]
macro_rules! derive_from_reference {
    ($from_type:ty, $impl_type:ty) => {
        impl From<$from_type> for $impl_type {
            fn from(value: $from_type) -> Self {
                Self::from(&value)
            }
        }
    };
}
