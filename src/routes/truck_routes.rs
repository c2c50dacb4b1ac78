use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::truck_controller::TruckController;
use crate::dto::vehicle_dto::{CreateTruckRequest, UpdateTruckRequest};
use crate::models::vehicle::Truck;
use crate::state::AppState;

pub fn create_truck_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trucks).post(create_truck))
        .route("/:id", get(get_truck).put(update_truck).delete(delete_truck))
}

async fn list_trucks(State(state): State<AppState>) -> ActionResult<Vec<Truck>> {
    ok(TruckController::new(&state).list().await?)
}

async fn get_truck(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<Truck> {
    ok(TruckController::new(&state).get(id).await?)
}

async fn create_truck(
    State(state): State<AppState>,
    Json(request): Json<CreateTruckRequest>,
) -> CreatedResult<Truck> {
    created(TruckController::new(&state).create(request).await?)
}

async fn update_truck(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateTruckRequest>,
) -> ActionResult<Truck> {
    ok(TruckController::new(&state).update(id, request).await?)
}

async fn delete_truck(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<()> {
    ok(TruckController::new(&state).delete(id).await?)
}
