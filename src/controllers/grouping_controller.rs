use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::cache::view_cache::{self, ViewCache};
use crate::dto::grouping_dto::GroupingRequest;
use crate::models::grouping::Grouping;
use crate::repositories::driver_repository::{DriverRepository, DRIVER_NOT_FOUND_MESSAGE};
use crate::repositories::grouping_repository::{GroupingRepository, GROUPING_NOT_FOUND_MESSAGE};
use crate::repositories::semi_trailer_repository::{
    SemiTrailerRepository, SEMI_TRAILER_NOT_FOUND_MESSAGE,
};
use crate::repositories::vehicle_repository::{TruckRepository, TRUCK_NOT_FOUND_MESSAGE};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, ActionKind, AppResult};

pub struct GroupingController {
    repository: Arc<dyn GroupingRepository>,
    drivers: Arc<dyn DriverRepository>,
    trucks: Arc<dyn TruckRepository>,
    semi_trailers: Arc<dyn SemiTrailerRepository>,
    cache: ViewCache,
}

impl GroupingController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.groupings.clone(),
            drivers: state.repositories.drivers.clone(),
            trucks: state.repositories.trucks.clone(),
            semi_trailers: state.repositories.semi_trailers.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Grouping>> {
        let key = self.cache.list_key(view_cache::GROUPINGS);
        if let Some(groupings) = self.cache.get(&key).await {
            return Ok(groupings);
        }

        let groupings = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &groupings).await;
        Ok(groupings)
    }

    pub async fn get(&self, id: i32) -> AppResult<Grouping> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(GROUPING_NOT_FOUND_MESSAGE))
    }

    pub async fn create(&self, request: GroupingRequest) -> AppResult<Grouping> {
        self.try_create(request)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, request: GroupingRequest) -> AppResult<Grouping> {
        request.validate()?;
        self.ensure_members(&request).await?;

        let grouping = self.repository.create(&request).await?;
        info!("🔗 Agrupamento criado: {}", grouping.id);

        self.cache.invalidate(view_cache::GROUPINGS, grouping.id).await;
        Ok(grouping)
    }

    pub async fn update(&self, id: i32, request: GroupingRequest) -> AppResult<Grouping> {
        self.try_update(id, request)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, id: i32, request: GroupingRequest) -> AppResult<Grouping> {
        request.validate()?;
        self.ensure_members(&request).await?;

        let grouping = self.repository.update(id, &request).await?;
        info!("🔗 Agrupamento atualizado: {}", id);

        self.cache.invalidate(view_cache::GROUPINGS, id).await;
        Ok(grouping)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Agrupamento excluído: {}", id);

        self.cache.invalidate(view_cache::GROUPINGS, id).await;
        Ok(())
    }

    async fn ensure_members(&self, request: &GroupingRequest) -> AppResult<()> {
        if self.drivers.find_by_id(request.driver_id).await?.is_none() {
            return Err(not_found_error(DRIVER_NOT_FOUND_MESSAGE));
        }
        if self.trucks.find_by_id(request.truck_id).await?.is_none() {
            return Err(not_found_error(TRUCK_NOT_FOUND_MESSAGE));
        }
        if self
            .semi_trailers
            .find_by_id(request.semi_trailer_id)
            .await?
            .is_none()
        {
            return Err(not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE));
        }
        Ok(())
    }
}
