use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::company_controller::CompanyController;
use crate::dto::company_dto::{CompanyInput, CompanyPatch};
use crate::models::company::Company;
use crate::state::AppState;

pub fn create_company_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_companies).post(create_company))
        .route(
            "/:id",
            get(get_company).put(update_company).delete(delete_company),
        )
}

async fn list_companies(State(state): State<AppState>) -> ActionResult<Vec<Company>> {
    ok(CompanyController::new(&state).list().await?)
}

async fn get_company(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<Company> {
    ok(CompanyController::new(&state).get(id).await?)
}

async fn create_company(
    State(state): State<AppState>,
    Json(input): Json<CompanyInput>,
) -> CreatedResult<Company> {
    created(CompanyController::new(&state).create(input).await?)
}

async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<CompanyPatch>,
) -> ActionResult<Company> {
    ok(CompanyController::new(&state).update(id, patch).await?)
}

async fn delete_company(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<()> {
    ok(CompanyController::new(&state).delete(id).await?)
}
