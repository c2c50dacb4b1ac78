use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::semi_trailer_controller::SemiTrailerController;
use crate::dto::vehicle_dto::{CreateSemiTrailerRequest, UpdateSemiTrailerRequest};
use crate::models::vehicle::{Cargo, SemiTrailer};
use crate::state::AppState;

pub fn create_semi_trailer_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_semi_trailers).post(create_semi_trailer))
        .route(
            "/:id",
            get(get_semi_trailer)
                .put(update_semi_trailer)
                .delete(delete_semi_trailer),
        )
}

pub fn create_cargo_router() -> Router<AppState> {
    Router::new().route("/", get(list_cargos))
}

async fn list_semi_trailers(State(state): State<AppState>) -> ActionResult<Vec<SemiTrailer>> {
    ok(SemiTrailerController::new(&state).list().await?)
}

async fn get_semi_trailer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ActionResult<SemiTrailer> {
    ok(SemiTrailerController::new(&state).get(id).await?)
}

async fn create_semi_trailer(
    State(state): State<AppState>,
    Json(request): Json<CreateSemiTrailerRequest>,
) -> CreatedResult<SemiTrailer> {
    created(SemiTrailerController::new(&state).create(request).await?)
}

async fn update_semi_trailer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateSemiTrailerRequest>,
) -> ActionResult<SemiTrailer> {
    ok(SemiTrailerController::new(&state).update(id, request).await?)
}

async fn delete_semi_trailer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ActionResult<()> {
    ok(SemiTrailerController::new(&state).delete(id).await?)
}

async fn list_cargos(State(state): State<AppState>) -> ActionResult<Vec<Cargo>> {
    ok(SemiTrailerController::new(&state).list_cargos().await?)
}
