use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::cache::view_cache::{self, ViewCache};
use crate::dto::vehicle_dto::{CreateTruckRequest, UpdateTruckRequest};
use crate::models::vehicle::Truck;
use crate::repositories::vehicle_repository::{
    TruckRepository, VehicleRepository, DUPLICATE_PLATE_MESSAGE, TRUCK_NOT_FOUND_MESSAGE,
};
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, ActionKind, AppResult};

pub struct TruckController {
    repository: Arc<dyn TruckRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    cache: ViewCache,
}

impl TruckController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.trucks.clone(),
            vehicles: state.repositories.vehicles.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Truck>> {
        let key = self.cache.list_key(view_cache::TRUCKS);
        if let Some(trucks) = self.cache.get(&key).await {
            return Ok(trucks);
        }

        let trucks = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &trucks).await;
        Ok(trucks)
    }

    pub async fn get(&self, id: i32) -> AppResult<Truck> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))
    }

    pub async fn create(&self, request: CreateTruckRequest) -> AppResult<Truck> {
        self.try_create(request)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, request: CreateTruckRequest) -> AppResult<Truck> {
        let request = CreateTruckRequest {
            vehicle: request.vehicle.normalized(),
            compressor: request.compressor,
        };
        request.validate()?;

        if self
            .vehicles
            .plate_taken(&request.vehicle.license_plate, None)
            .await?
        {
            return Err(conflict_error(DUPLICATE_PLATE_MESSAGE));
        }

        let truck = self.repository.create(&request).await?;
        info!("🚛 Cavalo criado: {}", truck.vehicle.license_plate);

        self.cache.invalidate(view_cache::TRUCKS, truck.id).await;
        Ok(truck)
    }

    pub async fn update(&self, id: i32, request: UpdateTruckRequest) -> AppResult<Truck> {
        self.try_update(id, request)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, id: i32, request: UpdateTruckRequest) -> AppResult<Truck> {
        let request = UpdateTruckRequest {
            vehicle: request.vehicle.map(|v| v.normalized()),
            compressor: request.compressor,
        };
        request.validate()?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(TRUCK_NOT_FOUND_MESSAGE))?;

        if let Some(plate) = request.vehicle.as_ref().and_then(|v| v.license_plate.as_ref()) {
            if self.vehicles.plate_taken(plate, Some(current.vehicle.id)).await? {
                return Err(conflict_error(DUPLICATE_PLATE_MESSAGE));
            }
        }

        let truck = self.repository.update(id, &request).await?;
        info!("🚛 Cavalo atualizado: {}", truck.vehicle.license_plate);

        self.cache.invalidate(view_cache::TRUCKS, id).await;
        Ok(truck)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Cavalo excluído: {}", id);

        self.cache.invalidate(view_cache::TRUCKS, id).await;
        Ok(())
    }
}
