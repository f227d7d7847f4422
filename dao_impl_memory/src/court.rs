use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dao::court::{CourtDao, CourtEntity};
use dao::DaoError;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Courts are read-only for the engine; `add` exists for seeding the catalog
/// at startup and in tests.
#[derive(Default)]
pub struct CourtDaoImpl {
    courts: RwLock<HashMap<Uuid, CourtEntity>>,
}

impl CourtDaoImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, entity: &CourtEntity) -> Result<(), DaoError> {
        let mut courts = self.courts.write().await;
        if courts.contains_key(&entity.id) {
            return Err(DaoError::EntityAlreadyExists(entity.id));
        }
        debug!(court = %entity.id, "Seeding court");
        courts.insert(entity.id, entity.clone());
        Ok(())
    }
}

#[async_trait]
impl CourtDao for CourtDaoImpl {
    async fn all(&self) -> Result<Arc<[CourtEntity]>, DaoError> {
        let courts = self.courts.read().await;
        let mut all: Vec<CourtEntity> = courts.values().cloned().collect();
        all.sort_by_key(|court| court.id);
        Ok(all.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CourtEntity>, DaoError> {
        let courts = self.courts.read().await;
        Ok(courts.get(&id).cloned())
    }

    async fn find_by_venue_id(&self, venue_id: Uuid) -> Result<Arc<[CourtEntity]>, DaoError> {
        let courts = self.courts.read().await;
        let mut matching: Vec<CourtEntity> = courts
            .values()
            .filter(|court| court.venue_id == venue_id)
            .cloned()
            .collect();
        matching.sort_by_key(|court| court.id);
        Ok(matching.into())
    }
}
