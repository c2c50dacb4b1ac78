//! Wizard de viaje
//!
//! El cliente envía el estado del wizard junto con el comando; el servidor
//! aplica la transición (llamando la acción que corresponda) y devuelve el
//! nuevo estado.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::{ok, ActionResult};
use crate::controllers::grouping_controller::GroupingController;
use crate::controllers::semi_trailer_controller::SemiTrailerController;
use crate::controllers::trip_controller::TripController;
use crate::models::trip::Trip;
use crate::models::vehicle::SemiTrailer;
use crate::services::{TripWizard, WizardOutcome};
use crate::state::AppState;
use crate::utils::errors::AppResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardCommand {
    /// Cargar un viaje existente para edición
    Edit { trip_id: Uuid },
    Next,
    GoTo { step: u8 },
    SelectGrouping { grouping_id: i32 },
    SelectSemiTrailer { semi_trailer_id: i32 },
    SaveDraft,
    Submit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WizardRequest {
    #[serde(default)]
    pub wizard: TripWizard,
    pub command: WizardCommand,
}

#[derive(Debug, Clone, Serialize)]
pub struct WizardResponse {
    pub wizard: TripWizard,
    pub trip: Option<Trip>,
}

pub fn create_trip_wizard_router() -> Router<AppState> {
    Router::new().route("/", post(run_command))
}

async fn run_command(
    State(state): State<AppState>,
    Json(request): Json<WizardRequest>,
) -> ActionResult<WizardResponse> {
    let mut wizard = request.wizard;
    let trip = apply(&state, &mut wizard, request.command).await?;
    ok(WizardResponse { wizard, trip })
}

async fn apply(
    state: &AppState,
    wizard: &mut TripWizard,
    command: WizardCommand,
) -> AppResult<Option<Trip>> {
    let trips = TripController::new(state);

    match command {
        WizardCommand::Edit { trip_id } => {
            *wizard = TripWizard::editing(&trips.get(trip_id).await?);
        }
        WizardCommand::Next => wizard.next()?,
        WizardCommand::GoTo { step } => wizard.go_to(step)?,
        WizardCommand::SelectGrouping { grouping_id } => {
            let grouping = GroupingController::new(state).get(grouping_id).await?;
            let semi_trailer = loaded_semi_trailer(
                SemiTrailerController::new(state)
                    .get(grouping.semi_trailer_id)
                    .await,
                grouping.id,
            );
            wizard.select_grouping(&grouping, semi_trailer.as_ref());
        }
        WizardCommand::SelectSemiTrailer { semi_trailer_id } => {
            let semi_trailer = SemiTrailerController::new(state).get(semi_trailer_id).await?;
            wizard.select_semi_trailer(&semi_trailer);
        }
        WizardCommand::SaveDraft => return Ok(saved(wizard.save_draft(&trips).await?)),
        WizardCommand::Submit => return Ok(saved(wizard.submit(&trips).await?)),
    }

    Ok(None)
}

/// Sin conjunto cargado el grouping se aplica igual, solo sin carga por defecto
fn loaded_semi_trailer(result: AppResult<SemiTrailer>, grouping_id: i32) -> Option<SemiTrailer> {
    match result {
        Ok(semi_trailer) => Some(semi_trailer),
        Err(e) => {
            warn!(
                "⚠️ Conjunto del grouping {} no disponible, sin carga por defecto: {}",
                grouping_id, e
            );
            None
        }
    }
}

fn saved(outcome: WizardOutcome) -> Option<Trip> {
    match outcome {
        WizardOutcome::Saved(trip) => Some(trip),
        WizardOutcome::Advanced => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::not_found_error;

    #[test]
    fn test_missing_semi_trailer_falls_back_to_none() {
        let result = loaded_semi_trailer(Err(not_found_error("Conjunto não encontrado")), 1);
        assert!(result.is_none());
    }

    #[test]
    fn test_wizard_defaults_when_omitted() {
        let request: WizardRequest =
            serde_json::from_str(r#"{ "command": { "type": "go_to", "step": 3 } }"#).unwrap();
        assert_eq!(request.wizard, TripWizard::new());
        assert!(matches!(request.command, WizardCommand::GoTo { step: 3 }));
    }
}
