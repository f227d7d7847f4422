use std::sync::Arc;

use thiserror::Error;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::booking::BookingStatus;

pub mod availability;
pub mod booking;
pub mod clock;
pub mod court;
pub mod datetime_normalize;
pub mod notification;
pub mod owner_directory;
pub mod permission;
pub mod proof_storage;
pub mod reservation;
pub mod review;
pub mod scheduler;
pub mod uuid_service;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationFailureItem {
    InvalidValue(Arc<str>),
    None(Arc<str>),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] dao::DaoError),

    #[error("Forbidden")]
    Forbidden,

    #[error("Entity {0} not found")]
    EntityNotFound(Uuid),

    #[error("Entity {0} conflicts: expected version {1} but found {2}")]
    EntityConflicts(Uuid, Uuid, Uuid),

    #[error("Validation error: {0:?}")]
    ValidationError(Arc<[ValidationFailureItem]>),

    #[error("Invalid time range: {0}")]
    TimeRange(#[from] courtly_utils::TimeRangeError),

    #[error("Court {court_id} is already booked between {start} and {end}")]
    SlotConflict {
        court_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    },

    #[error("Booking {id} is {current} which does not allow this operation")]
    InvalidStateTransition { id: Uuid, current: BookingStatus },

    #[error("Booking {0} payment hold has expired")]
    BookingExpired(Uuid),

    #[error("A rejection requires a non-blank reason")]
    MissingRejectionReason,

    #[error("Booking {0} already has a review")]
    ReviewAlreadyExists(Uuid),

    #[error("Unparsable timestamp: {0}")]
    UnparsableTimestamp(Arc<str>),

    #[error("Internal error")]
    InternalError,
}
