use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::cache::view_cache::{self, ViewCache};
use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::driver::Driver;
use crate::repositories::driver_repository::{
    DriverRepository, DRIVER_NOT_FOUND_MESSAGE, DUPLICATE_CNH_MESSAGE,
    DUPLICATE_DRIVER_DOCUMENT_MESSAGE,
};
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, ActionKind, AppResult};

pub struct DriverController {
    repository: Arc<dyn DriverRepository>,
    cache: ViewCache,
}

impl DriverController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.drivers.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Driver>> {
        let key = self.cache.list_key(view_cache::DRIVERS);
        if let Some(drivers) = self.cache.get(&key).await {
            return Ok(drivers);
        }

        let drivers = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &drivers).await;
        Ok(drivers)
    }

    pub async fn get(&self, id: i32) -> AppResult<Driver> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(DRIVER_NOT_FOUND_MESSAGE))
    }

    pub async fn create(&self, request: CreateDriverRequest) -> AppResult<Driver> {
        self.try_create(request)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, request: CreateDriverRequest) -> AppResult<Driver> {
        let request = request.normalized();
        request.validate()?;

        if self
            .repository
            .document_taken(&request.person.document, None)
            .await?
        {
            return Err(conflict_error(DUPLICATE_DRIVER_DOCUMENT_MESSAGE));
        }
        if self.repository.cnh_taken(&request.cnh, None).await? {
            return Err(conflict_error(DUPLICATE_CNH_MESSAGE));
        }

        let driver = self.repository.create(&request).await?;
        info!("🧑‍✈️ Motorista criado: {}", driver.display_name());

        self.cache.invalidate(view_cache::DRIVERS, driver.person_id).await;
        Ok(driver)
    }

    pub async fn update(&self, id: i32, request: UpdateDriverRequest) -> AppResult<Driver> {
        self.try_update(id, request)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, id: i32, request: UpdateDriverRequest) -> AppResult<Driver> {
        let request = request.normalized();
        request.validate()?;

        if let Some(document) = request.person.as_ref().and_then(|p| p.document.as_ref()) {
            if self.repository.document_taken(document, Some(id)).await? {
                return Err(conflict_error(DUPLICATE_DRIVER_DOCUMENT_MESSAGE));
            }
        }
        if let Some(cnh) = &request.cnh {
            if self.repository.cnh_taken(cnh, Some(id)).await? {
                return Err(conflict_error(DUPLICATE_CNH_MESSAGE));
            }
        }

        let driver = self.repository.update(id, &request).await?;
        info!("🧑‍✈️ Motorista atualizado: {}", id);

        self.cache.invalidate(view_cache::DRIVERS, id).await;
        Ok(driver)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Motorista excluído: {}", id);

        self.cache.invalidate(view_cache::DRIVERS, id).await;
        Ok(())
    }
}
