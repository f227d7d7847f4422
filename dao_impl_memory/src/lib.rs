//! In-memory persistence, keeping the whole state behind `RwLock`ed maps.
//!
//! Version checks behave exactly like the durable backends: `update` is a
//! compare-and-swap on the entity's version uuid.

pub mod booking;
pub mod court;
pub mod review;

pub use booking::BookingDaoImpl;
pub use court::CourtDaoImpl;
pub use review::ReviewDaoImpl;
