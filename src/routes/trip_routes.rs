use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::trip_controller::TripController;
use crate::dto::trip_dto::{TripFilters, TripInput};
use crate::models::trip::Trip;
use crate::services::TripActions;
use crate::state::AppState;

pub fn create_trip_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/drafts", post(create_draft))
        .route("/:id", get(get_trip).put(update_trip).delete(delete_trip))
        .route("/:id/draft", put(update_draft))
}

async fn list_trips(
    State(state): State<AppState>,
    Query(filters): Query<TripFilters>,
) -> ActionResult<Vec<Trip>> {
    ok(TripController::new(&state).list(filters).await?)
}

async fn get_trip(State(state): State<AppState>, Path(id): Path<Uuid>) -> ActionResult<Trip> {
    ok(TripController::new(&state).get(id).await?)
}

async fn create_trip(
    State(state): State<AppState>,
    Json(input): Json<TripInput>,
) -> CreatedResult<Trip> {
    created(TripController::new(&state).create(input).await?)
}

/// Pré-programação: esquema relajado
async fn create_draft(
    State(state): State<AppState>,
    Json(input): Json<TripInput>,
) -> CreatedResult<Trip> {
    created(TripController::new(&state).create_draft(input).await?)
}

async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TripInput>,
) -> ActionResult<Trip> {
    ok(TripController::new(&state).update(id, input).await?)
}

async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TripInput>,
) -> ActionResult<Trip> {
    ok(TripController::new(&state).update_draft(id, input).await?)
}

async fn delete_trip(State(state): State<AppState>, Path(id): Path<Uuid>) -> ActionResult<()> {
    ok(TripController::new(&state).delete(id).await?)
}
