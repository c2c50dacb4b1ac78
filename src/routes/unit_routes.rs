use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::unit_controller::UnitController;
use crate::dto::unit_dto::{CreateUnitRequest, ImportReport, UpdateUnitRequest};
use crate::models::unit::Unit;
use crate::services::UnitImportService;
use crate::state::AppState;

pub fn create_unit_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/import", post(import_units))
        .route(
            "/:company_id",
            get(get_unit).put(update_unit).delete(delete_unit),
        )
}

async fn list_units(State(state): State<AppState>) -> ActionResult<Vec<Unit>> {
    ok(UnitController::new(&state).list().await?)
}

async fn get_unit(
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
) -> ActionResult<Unit> {
    ok(UnitController::new(&state).get(company_id).await?)
}

async fn create_unit(
    State(state): State<AppState>,
    Json(request): Json<CreateUnitRequest>,
) -> CreatedResult<Unit> {
    created(UnitController::new(&state).create(request).await?)
}

async fn update_unit(
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
    Json(request): Json<UpdateUnitRequest>,
) -> ActionResult<Unit> {
    ok(UnitController::new(&state).update(company_id, request).await?)
}

async fn delete_unit(State(state): State<AppState>, Path(company_id): Path<i32>) -> ActionResult<()> {
    ok(UnitController::new(&state).delete(company_id).await?)
}

/// Planilla CSV en el body (texto plano)
async fn import_units(State(state): State<AppState>, body: String) -> ActionResult<ImportReport> {
    ok(UnitImportService::new(&state).import(&body).await)
}
