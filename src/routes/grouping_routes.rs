use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::grouping_controller::GroupingController;
use crate::dto::grouping_dto::GroupingRequest;
use crate::models::grouping::Grouping;
use crate::state::AppState;

pub fn create_grouping_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_groupings).post(create_grouping))
        .route(
            "/:id",
            get(get_grouping).put(update_grouping).delete(delete_grouping),
        )
}

async fn list_groupings(State(state): State<AppState>) -> ActionResult<Vec<Grouping>> {
    ok(GroupingController::new(&state).list().await?)
}

async fn get_grouping(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<Grouping> {
    ok(GroupingController::new(&state).get(id).await?)
}

async fn create_grouping(
    State(state): State<AppState>,
    Json(request): Json<GroupingRequest>,
) -> CreatedResult<Grouping> {
    created(GroupingController::new(&state).create(request).await?)
}

async fn update_grouping(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<GroupingRequest>,
) -> ActionResult<Grouping> {
    ok(GroupingController::new(&state).update(id, request).await?)
}

async fn delete_grouping(State(state): State<AppState>, Path(id): Path<i32>) -> ActionResult<()> {
    ok(GroupingController::new(&state).delete(id).await?)
}
