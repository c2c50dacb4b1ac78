//! Routers HTTP
//!
//! Un router por entidad, anidados bajo `/api`. Todas las respuestas usan
//! el formato `{ "data": ... }` / `{ "error": "..." }`.

pub mod client_routes;
pub mod company_routes;
pub mod dashboard_routes;
pub mod driver_routes;
pub mod grouping_routes;
pub mod semi_trailer_routes;
pub mod trip_routes;
pub mod trip_wizard_routes;
pub mod truck_routes;
pub mod unit_routes;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::dto::action_response::ActionResponse;
use crate::middleware::cors::cors_layer;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Resultado de un handler: `{ "data": ... }` o el error ya convertido
pub type ActionResult<T> = Result<Json<ActionResponse<T>>, AppError>;

/// Resultado de un handler de creación (201)
pub type CreatedResult<T> = Result<(StatusCode, Json<ActionResponse<T>>), AppError>;

pub(crate) fn ok<T>(data: T) -> ActionResult<T> {
    Ok(Json(ActionResponse::data(data)))
}

pub(crate) fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ActionResponse::data(data))))
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api = Router::new()
        .nest("/companies", company_routes::create_company_router())
        .nest("/units", unit_routes::create_unit_router())
        .nest("/clients", client_routes::create_client_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/trucks", truck_routes::create_truck_router())
        .nest("/semi-trailers", semi_trailer_routes::create_semi_trailer_router())
        .nest("/cargos", semi_trailer_routes::create_cargo_router())
        .nest("/groupings", grouping_routes::create_grouping_router())
        .nest("/trips", trip_routes::create_trip_router())
        .nest("/trip-wizard", trip_wizard_routes::create_trip_wizard_router())
        .nest("/dashboard", dashboard_routes::create_dashboard_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "storage": state.config.storage.as_str(),
        "cache": state.cache.backend_name(),
        "cache_available": state.cache.is_available().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
