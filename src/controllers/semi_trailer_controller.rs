use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::cache::view_cache::{self, ViewCache};
use crate::dto::vehicle_dto::{CreateSemiTrailerRequest, UpdateSemiTrailerRequest};
use crate::models::vehicle::{Cargo, SemiTrailer};
use crate::repositories::semi_trailer_repository::{
    SemiTrailerRepository, SEMI_TRAILER_NOT_FOUND_MESSAGE,
};
use crate::repositories::vehicle_repository::{VehicleRepository, DUPLICATE_PLATE_MESSAGE};
use crate::state::AppState;
use crate::utils::errors::{
    conflict_error, not_found_error, validation_error, ActionKind, AppResult,
};

pub struct SemiTrailerController {
    repository: Arc<dyn SemiTrailerRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    cache: ViewCache,
}

impl SemiTrailerController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.semi_trailers.clone(),
            vehicles: state.repositories.vehicles.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<SemiTrailer>> {
        let key = self.cache.list_key(view_cache::SEMI_TRAILERS);
        if let Some(semi_trailers) = self.cache.get(&key).await {
            return Ok(semi_trailers);
        }

        let semi_trailers = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &semi_trailers).await;
        Ok(semi_trailers)
    }

    pub async fn get(&self, id: i32) -> AppResult<SemiTrailer> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))
    }

    pub async fn list_cargos(&self) -> AppResult<Vec<Cargo>> {
        let key = self.cache.list_key(view_cache::CARGOS);
        if let Some(cargos) = self.cache.get(&key).await {
            return Ok(cargos);
        }

        let cargos = self
            .repository
            .list_cargos()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &cargos).await;
        Ok(cargos)
    }

    pub async fn create(&self, request: CreateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        self.try_create(request)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, request: CreateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        let request = request.normalized();
        request.validate()?;

        for trailer in &request.trailers {
            if self
                .vehicles
                .plate_taken(&trailer.vehicle.license_plate, None)
                .await?
            {
                return Err(conflict_error(DUPLICATE_PLATE_MESSAGE));
            }
        }

        let semi_trailer = self.repository.create(&request).await?;
        info!(
            "🚚 Conjunto criado: {} ({})",
            semi_trailer.id,
            semi_trailer.plates()
        );

        self.cache.invalidate(view_cache::SEMI_TRAILERS, semi_trailer.id).await;
        self.cache.invalidate_list(view_cache::CARGOS).await;
        Ok(semi_trailer)
    }

    pub async fn update(&self, id: i32, request: UpdateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        self.try_update(id, request)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, id: i32, request: UpdateSemiTrailerRequest) -> AppResult<SemiTrailer> {
        let request = request.normalized();
        request.validate()?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))?;

        // las carretas no se reemplazan en la edición
        if let Some(configuration) = &request.configuration {
            if configuration.number_of_trailers as usize != current.trailers.len() {
                return Err(validation_error(
                    "configuration",
                    "A quantidade de carretas não corresponde à configuração",
                ));
            }
        }

        let semi_trailer = self.repository.update(id, &request).await?;
        info!("🚚 Conjunto atualizado: {}", id);

        self.cache.invalidate(view_cache::SEMI_TRAILERS, id).await;
        self.cache.invalidate_list(view_cache::CARGOS).await;
        Ok(semi_trailer)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Conjunto excluído: {}", id);

        self.cache.invalidate(view_cache::SEMI_TRAILERS, id).await;
        Ok(())
    }
}
