use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{created, ok, ActionResult, CreatedResult};
use crate::controllers::client_controller::ClientController;
use crate::dto::client_dto::{CreateClientRequest, UpdateClientRequest};
use crate::models::client::Client;
use crate::state::AppState;

pub fn create_client_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:company_id",
            get(get_client).put(update_client).delete(delete_client),
        )
}

async fn list_clients(State(state): State<AppState>) -> ActionResult<Vec<Client>> {
    ok(ClientController::new(&state).list().await?)
}

async fn get_client(
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
) -> ActionResult<Client> {
    ok(ClientController::new(&state).get(company_id).await?)
}

async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> CreatedResult<Client> {
    created(ClientController::new(&state).create(request).await?)
}

async fn update_client(
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
    Json(request): Json<UpdateClientRequest>,
) -> ActionResult<Client> {
    ok(ClientController::new(&state).update(company_id, request).await?)
}

async fn delete_client(
    State(state): State<AppState>,
    Path(company_id): Path<i32>,
) -> ActionResult<()> {
    ok(ClientController::new(&state).delete(company_id).await?)
}
