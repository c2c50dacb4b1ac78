use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::driver_controller::DriverController;
use crate::dto::driver_dto::{CreateDriverRequest, UpdateDriverRequest};
use crate::models::driver::Driver;
use crate::state::AppState;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route(
            "/:id",
            get(get_driver).put(update_driver).delete(delete_driver),
        )
}

async fn list_drivers(State(state): State<AppState>) -> ActionResult<Vec<Driver>> {
    ok(DriverController::new(&state).list().await?)
}

async fn get_driver(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<Driver> {
    ok(DriverController::new(&state).get(id).await?)
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> CreatedResult<Driver> {
    created(DriverController::new(&state).create(request).await?)
}

async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateDriverRequest>,
) -> ActionResult<Driver> {
    ok(DriverController::new(&state).update(id, request).await?)
}

async fn delete_driver(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<()> {
    ok(DriverController::new(&state).delete(id).await?)
}
