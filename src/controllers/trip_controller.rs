use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::cache::view_cache::{self, ViewCache};
use crate::dto::trip_dto::{TripFilters, TripInput};
use crate::models::trip::{Trip, TripFields};
use crate::repositories::client_repository::ClientRepository;
use crate::repositories::driver_repository::{DriverRepository, DRIVER_NOT_FOUND_MESSAGE};
use crate::repositories::grouping_repository::{GroupingRepository, GROUPING_NOT_FOUND_MESSAGE};
use crate::repositories::semi_trailer_repository::{
    SemiTrailerRepository, SEMI_TRAILER_NOT_FOUND_MESSAGE,
};
use crate::repositories::trip_repository::{TripRepository, TRIP_NOT_FOUND_MESSAGE};
use crate::repositories::vehicle_repository::{TruckRepository, TRUCK_NOT_FOUND_MESSAGE};
use crate::services::trip_wizard::TripActions;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, ActionKind, AppResult};
use crate::utils::validation::normalize_optional;

pub const ORIGIN_NOT_FOUND_MESSAGE: &str = "Origem não encontrada";
pub const DESTINATION_NOT_FOUND_MESSAGE: &str = "Destino não encontrado";
pub const CARGO_NOT_FOUND_MESSAGE: &str = "Carga não encontrada";

pub struct TripController {
    repository: Arc<dyn TripRepository>,
    clients: Arc<dyn ClientRepository>,
    drivers: Arc<dyn DriverRepository>,
    trucks: Arc<dyn TruckRepository>,
    semi_trailers: Arc<dyn SemiTrailerRepository>,
    groupings: Arc<dyn GroupingRepository>,
    cache: ViewCache,
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        let repositories = &state.repositories;
        Self {
            repository: repositories.trips.clone(),
            clients: repositories.clients.clone(),
            drivers: repositories.drivers.clone(),
            trucks: repositories.trucks.clone(),
            semi_trailers: repositories.semi_trailers.clone(),
            groupings: repositories.groupings.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self, filters: TripFilters) -> AppResult<Vec<Trip>> {
        self.repository
            .list(&filters)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Trip> {
        let key = self.cache.detail_key(view_cache::TRIPS, id);
        if let Some(trip) = self.cache.get(&key).await {
            return Ok(trip);
        }

        let trip = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(TRIP_NOT_FOUND_MESSAGE))?;
        self.cache.set(&key, &trip).await;
        Ok(trip)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Viagem excluída: {}", id);

        self.cache.invalidate(view_cache::TRIPS, id).await;
        Ok(())
    }

    async fn try_create(&self, input: TripInput, draft: bool) -> AppResult<Trip> {
        if draft {
            input.validate_draft()?;
        } else {
            input.validate_full()?;
        }

        let fields = self.resolve(&input, draft).await?;
        let trip = self.repository.create(&fields).await?;
        info!(
            "🛣️ Viagem criada: {} (status: {}, rascunho: {})",
            trip.id,
            trip.status.label(),
            trip.draft
        );

        self.cache.invalidate(view_cache::TRIPS, trip.id).await;
        Ok(trip)
    }

    async fn try_update(&self, id: Uuid, input: TripInput, draft: bool) -> AppResult<Trip> {
        if draft {
            input.validate_draft()?;
        } else {
            input.validate_full()?;
        }

        if self.repository.find_by_id(id).await?.is_none() {
            return Err(not_found_error(TRIP_NOT_FOUND_MESSAGE));
        }

        let fields = self.resolve(&input, draft).await?;
        let trip = self.repository.update(id, &fields).await?;
        info!(
            "🛣️ Viagem atualizada: {} (status: {}, rascunho: {})",
            trip.id,
            trip.status.label(),
            trip.draft
        );

        self.cache.invalidate(view_cache::TRIPS, id).await;
        Ok(trip)
    }

    /// Expande el grouping y verifica que cada referencia exista
    async fn resolve(&self, input: &TripInput, draft: bool) -> AppResult<TripFields> {
        let mut fields = TripFields {
            status: input.status.unwrap_or_default(),
            draft,
            origin_id: input.origin_id,
            destination_id: input.destination_id,
            driver_id: input.driver_id,
            truck_id: input.truck_id,
            semi_trailer_id: input.semi_trailer_id,
            cargo_id: input.cargo_id,
            departed_at: input.departed_at,
            arrived_at: input.arrived_at,
            note: normalize_optional(input.note.as_deref()),
            order: normalize_optional(input.order.as_deref()),
        };

        if let Some(grouping_id) = input.grouping_id {
            let grouping = self
                .groupings
                .find_by_id(grouping_id)
                .await?
                .ok_or_else(|| not_found_error(GROUPING_NOT_FOUND_MESSAGE))?;
            fields.driver_id = Some(grouping.driver_id);
            fields.truck_id = Some(grouping.truck_id);
            fields.semi_trailer_id = Some(grouping.semi_trailer_id);
        }

        if let Some(id) = fields.origin_id {
            if self.clients.find_by_company_id(id).await?.is_none() {
                return Err(not_found_error(ORIGIN_NOT_FOUND_MESSAGE));
            }
        }
        if let Some(id) = fields.destination_id {
            if self.clients.find_by_company_id(id).await?.is_none() {
                return Err(not_found_error(DESTINATION_NOT_FOUND_MESSAGE));
            }
        }
        if let Some(id) = fields.driver_id {
            if self.drivers.find_by_id(id).await?.is_none() {
                return Err(not_found_error(DRIVER_NOT_FOUND_MESSAGE));
            }
        }
        if let Some(id) = fields.truck_id {
            if self.trucks.find_by_id(id).await?.is_none() {
                return Err(not_found_error(TRUCK_NOT_FOUND_MESSAGE));
            }
        }

        // la carga tiene que ser una de las del conjunto
        match (fields.semi_trailer_id, fields.cargo_id) {
            (Some(semi_trailer_id), cargo_id) => {
                let semi_trailer = self
                    .semi_trailers
                    .find_by_id(semi_trailer_id)
                    .await?
                    .ok_or_else(|| not_found_error(SEMI_TRAILER_NOT_FOUND_MESSAGE))?;
                if let Some(cargo_id) = cargo_id {
                    if !semi_trailer.cargos.iter().any(|c| c.id == cargo_id) {
                        return Err(not_found_error(CARGO_NOT_FOUND_MESSAGE));
                    }
                }
            }
            (None, Some(cargo_id)) => {
                let cargos = self.semi_trailers.list_cargos().await?;
                if !cargos.iter().any(|c| c.id == cargo_id) {
                    return Err(not_found_error(CARGO_NOT_FOUND_MESSAGE));
                }
            }
            (None, None) => {}
        }

        Ok(fields)
    }
}

#[async_trait]
impl TripActions for TripController {
    async fn create(&self, input: TripInput) -> AppResult<Trip> {
        self.try_create(input, false)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn create_draft(&self, input: TripInput) -> AppResult<Trip> {
        self.try_create(input, true)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn update(&self, id: Uuid, input: TripInput) -> AppResult<Trip> {
        self.try_update(id, input, false)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn update_draft(&self, id: Uuid, input: TripInput) -> AppResult<Trip> {
        self.try_update(id, input, true)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }
}
