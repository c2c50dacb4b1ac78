use axum::{extract::State, routing::get, Router};
use chrono::Utc;

use super::{ok, ActionResult};
use crate::dto::dashboard_dto::DashboardResponse;
use crate::services::DashboardService;
use crate::state::AppState;

pub fn create_dashboard_router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

async fn get_dashboard(State(state): State<AppState>) -> ActionResult<DashboardResponse> {
    ok(DashboardService::new(&state).load(Utc::now()).await?)
}
