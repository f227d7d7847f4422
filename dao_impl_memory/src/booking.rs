use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao::booking::{BookingDao, BookingEntity, BookingStatusEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
pub struct BookingDaoImpl {
    bookings: RwLock<HashMap<Uuid, BookingEntity>>,
}

impl BookingDaoImpl {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut bookings: Vec<BookingEntity>) -> Arc<[BookingEntity]> {
        bookings.sort_by_key(|booking| booking.created);
        bookings.into()
    }
}

#[async_trait]
impl BookingDao for BookingDaoImpl {
    async fn all(&self) -> Result<Arc<[BookingEntity]>, DaoError> {
        let bookings = self.bookings.read().await;
        Ok(Self::sorted(bookings.values().cloned().collect()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>, DaoError> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Arc<[BookingEntity]>, DaoError> {
        let bookings = self.bookings.read().await;
        Ok(Self::sorted(
            bookings
                .values()
                .filter(|booking| booking.user_id.as_ref() == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Arc<[BookingEntity]>, DaoError> {
        let bookings = self.bookings.read().await;
        Ok(Self::sorted(
            bookings
                .values()
                .filter(|booking| booking.venue_id == venue_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_blocking_by_court_id(
        &self,
        court_id: Uuid,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let bookings = self.bookings.read().await;
        Ok(Self::sorted(
            bookings
                .values()
                .filter(|booking| {
                    booking.status.is_blocking()
                        && booking.items.iter().any(|item| item.court_id == court_id)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_status(
        &self,
        status: BookingStatusEntity,
    ) -> Result<Arc<[BookingEntity]>, DaoError> {
        let bookings = self.bookings.read().await;
        Ok(Self::sorted(
            bookings
                .values()
                .filter(|booking| booking.status == status)
                .cloned()
                .collect(),
        ))
    }

    async fn create(&self, entity: &BookingEntity, process: &str) -> Result<(), DaoError> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&entity.id) {
            return Err(DaoError::EntityAlreadyExists(entity.id));
        }
        debug!(process, booking = %entity.id, "Creating booking");
        bookings.insert(entity.id, entity.clone());
        Ok(())
    }

    async fn update(
        &self,
        entity: &BookingEntity,
        expected_version: Uuid,
        process: &str,
    ) -> Result<(), DaoError> {
        let mut bookings = self.bookings.write().await;
        let stored = bookings
            .get_mut(&entity.id)
            .ok_or_else(|| DaoError::DatabaseQueryError("booking does not exist".into()))?;
        if stored.version != expected_version {
            return Err(DaoError::VersionConflict(
                entity.id,
                expected_version,
                stored.version,
            ));
        }
        debug!(process, booking = %entity.id, "Updating booking");
        *stored = entity.clone();
        Ok(())
    }
}
