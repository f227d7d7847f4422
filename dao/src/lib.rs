use thiserror::Error;
use uuid::Uuid;

pub mod booking;
pub mod court;
pub mod review;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("Database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("Entity {0} already exists")]
    EntityAlreadyExists(Uuid),

    #[error("Entity {0} version conflict: expected {1} but found {2}")]
    VersionConflict(Uuid, Uuid, Uuid),
}
