use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao::review::{ReviewDao, ReviewEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
pub struct ReviewDaoImpl {
    reviews: RwLock<HashMap<Uuid, ReviewEntity>>,
}

impl ReviewDaoImpl {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewDao for ReviewDaoImpl {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ReviewEntity>, DaoError> {
        let reviews = self.reviews.read().await;
        Ok(reviews.get(&id).cloned())
    }

    async fn find_by_booking_id(&self, booking_id: Uuid) -> Result<Option<ReviewEntity>, DaoError> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .find(|review| review.booking_id == booking_id)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> Result<Arc<[ReviewEntity]>, DaoError> {
        let reviews = self.reviews.read().await;
        let mut matching: Vec<ReviewEntity> = reviews
            .values()
            .filter(|review| review.user_id.as_ref() == user_id)
            .cloned()
            .collect();
        matching.sort_by_key(|review| review.created);
        Ok(matching.into())
    }

    async fn create(&self, entity: &ReviewEntity, process: &str) -> Result<(), DaoError> {
        let mut reviews = self.reviews.write().await;
        if reviews.contains_key(&entity.id) {
            return Err(DaoError::EntityAlreadyExists(entity.id));
        }
        // One review per booking, enforced like the unique index of the
        // durable backends.
        if reviews
            .values()
            .any(|review| review.booking_id == entity.booking_id)
        {
            return Err(DaoError::EntityAlreadyExists(entity.booking_id));
        }
        debug!(process, review = %entity.id, "Creating review");
        reviews.insert(entity.id, entity.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid, process: &str) -> Result<(), DaoError> {
        let mut reviews = self.reviews.write().await;
        reviews
            .remove(&id)
            .ok_or_else(|| DaoError::DatabaseQueryError("review does not exist".into()))?;
        debug!(process, review = %id, "Deleting review");
        Ok(())
    }
}
