//! Wizard de viaje en cinco pasos
//!
//! Pasos 1 y 2 son editables, 3 es el resumen y 4/5 son los pasos de
//! rascunho (pré-programação), a los que solo se llega guardando un rascunho
//! desde los pasos 2 o 3. El wizard decide qué acción llamar
//! (`create`, `create_draft`, `update`, `update_draft`) según el paso y si
//! el viaje ya existe.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::trip_dto::TripInput;
use crate::models::grouping::Grouping;
use crate::models::trip::Trip;
use crate::models::vehicle::SemiTrailer;
use crate::utils::errors::{AppError, AppResult};

pub const DETAILS_STEP: u8 = 1;
pub const ASSIGNMENT_STEP: u8 = 2;
pub const REVIEW_STEP: u8 = 3;
pub const LAST_STEP: u8 = 5;
pub const DRAFT_OFFSET: u8 = 2;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Preencha todos os campos obrigatórios";
pub const INVALID_STEP_MESSAGE: &str = "Passo inválido";
pub const DRAFT_UNAVAILABLE_MESSAGE: &str = "Não é possível salvar rascunho neste passo";

/// Acciones de persistencia que el wizard puede disparar
#[async_trait]
pub trait TripActions: Send + Sync {
    async fn create(&self, input: TripInput) -> AppResult<Trip>;
    async fn create_draft(&self, input: TripInput) -> AppResult<Trip>;
    async fn update(&self, id: Uuid, input: TripInput) -> AppResult<Trip>;
    async fn update_draft(&self, id: Uuid, input: TripInput) -> AppResult<Trip>;
}

/// Resultado de un `submit`
#[derive(Debug, Clone, PartialEq)]
pub enum WizardOutcome {
    /// Paso editable validado, el wizard avanzó
    Advanced,
    /// Se llamó una acción y el viaje quedó guardado
    Saved(Trip),
}

/// Estado del wizard (paso actual, viaje en edición y valores del formulario)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripWizard {
    pub step: u8,
    pub trip_id: Option<Uuid>,
    #[serde(default)]
    pub values: TripInput,
}

impl Default for TripWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl TripWizard {
    pub fn new() -> Self {
        Self {
            step: DETAILS_STEP,
            trip_id: None,
            values: TripInput::default(),
        }
    }

    /// Wizard precargado con un viaje existente
    pub fn editing(trip: &Trip) -> Self {
        Self {
            step: DETAILS_STEP,
            trip_id: Some(trip.id),
            values: TripInput {
                status: Some(trip.status),
                origin_id: trip.origin_id,
                destination_id: trip.destination_id,
                grouping_id: None,
                driver_id: trip.driver_id,
                truck_id: trip.truck_id,
                semi_trailer_id: trip.semi_trailer_id,
                cargo_id: trip.cargo_id,
                departed_at: trip.departed_at,
                arrived_at: trip.arrived_at,
                note: trip.note.clone(),
                order: trip.order.clone(),
            },
        }
    }

    pub fn is_draft_step(&self) -> bool {
        self.step > REVIEW_STEP
    }

    pub fn is_update(&self) -> bool {
        self.trip_id.is_some()
    }

    /// Paso editable correspondiente (4 -> 2, 5 -> 3)
    fn resolved_step(&self) -> u8 {
        if self.is_draft_step() {
            self.step - DRAFT_OFFSET
        } else {
            self.step
        }
    }

    /// Solo los pasos editables y el resumen; a 4/5 se llega con `save_draft`
    pub fn go_to(&mut self, step: u8) -> AppResult<()> {
        if !(DETAILS_STEP..=REVIEW_STEP).contains(&step) {
            return Err(invalid_step());
        }
        self.step = step;
        Ok(())
    }

    /// El estado viene del cliente: fuera de 1..=3 no es un estado en reposo válido
    fn ensure_resting_step(&self) -> AppResult<()> {
        if (DETAILS_STEP..=REVIEW_STEP).contains(&self.step) {
            Ok(())
        } else {
            Err(invalid_step())
        }
    }

    /// Elegir un grouping llena motorista, cavalo y conjunto
    pub fn select_grouping(&mut self, grouping: &Grouping, semi_trailer: Option<&SemiTrailer>) {
        self.values.grouping_id = Some(grouping.id);
        self.values.driver_id = Some(grouping.driver_id);
        self.values.truck_id = Some(grouping.truck_id);
        self.values.semi_trailer_id = Some(grouping.semi_trailer_id);
        if let Some(semi_trailer) = semi_trailer {
            self.apply_default_cargo(semi_trailer);
        }
    }

    pub fn select_semi_trailer(&mut self, semi_trailer: &SemiTrailer) {
        if self.values.semi_trailer_id != Some(semi_trailer.id) {
            self.values.grouping_id = None;
            self.values.cargo_id = None;
        }
        self.values.semi_trailer_id = Some(semi_trailer.id);
        self.apply_default_cargo(semi_trailer);
    }

    fn apply_default_cargo(&mut self, semi_trailer: &SemiTrailer) {
        if self.values.cargo_id.is_none() {
            self.values.cargo_id = semi_trailer.default_cargo().map(|c| c.id);
        }
    }

    /// Validar el paso editable actual y avanzar uno. Nunca llama acciones.
    pub fn next(&mut self) -> AppResult<()> {
        let result = match self.step {
            DETAILS_STEP => self.values.validate_details(),
            ASSIGNMENT_STEP => self.values.validate_assignment(),
            _ => return Err(invalid_step()),
        };
        result.map_err(|errors| self.step_error(AppError::Validation(errors)))?;

        self.step += 1;
        debug!("🧭 Wizard avanzó al paso {}", self.step);
        Ok(())
    }

    /// Pasar al paso de rascunho (+2) y enviar con el esquema relajado
    pub async fn save_draft(&mut self, actions: &dyn TripActions) -> AppResult<WizardOutcome> {
        if !(ASSIGNMENT_STEP..=REVIEW_STEP).contains(&self.step) {
            return Err(AppError::BadRequest(DRAFT_UNAVAILABLE_MESSAGE.to_string()));
        }
        self.step += DRAFT_OFFSET;
        self.submit_step(actions).await
    }

    /// Enviar el paso actual: en pasos editables valida y avanza, en el
    /// resumen llama `create`/`update`.
    pub async fn submit(&mut self, actions: &dyn TripActions) -> AppResult<WizardOutcome> {
        self.ensure_resting_step()?;
        self.submit_step(actions).await
    }

    async fn submit_step(&mut self, actions: &dyn TripActions) -> AppResult<WizardOutcome> {
        match self.step {
            DETAILS_STEP | ASSIGNMENT_STEP => {
                self.next()?;
                Ok(WizardOutcome::Advanced)
            }
            REVIEW_STEP => {
                let trip = self.dispatch(actions, false).await?;
                Ok(WizardOutcome::Saved(trip))
            }
            step if step <= LAST_STEP => {
                // el rascunho siempre vuelve al paso editable, con o sin error
                let result = self.dispatch(actions, true).await;
                self.step = self.resolved_step();
                Ok(WizardOutcome::Saved(result?))
            }
            _ => Err(invalid_step()),
        }
    }

    async fn dispatch(&mut self, actions: &dyn TripActions, draft: bool) -> AppResult<Trip> {
        let input = self.values.clone();
        let result = match (draft, self.trip_id) {
            (false, None) => actions.create(input).await,
            (true, None) => actions.create_draft(input).await,
            (false, Some(id)) => actions.update(id, input).await,
            (true, Some(id)) => actions.update_draft(id, input).await,
        };

        let trip = result.map_err(|e| self.step_error(e))?;
        info!(
            "🧭 Wizard guardó viaje {} (rascunho: {}, edição: {})",
            trip.id,
            draft,
            self.is_update()
        );
        self.trip_id = Some(trip.id);
        Ok(trip)
    }

    /// Fuera del paso 1 los errores de validación se reportan con un solo mensaje
    fn step_error(&self, error: AppError) -> AppError {
        match error {
            AppError::Validation(_) if self.step != DETAILS_STEP => {
                AppError::BadRequest(REQUIRED_FIELDS_MESSAGE.to_string())
            }
            other => other,
        }
    }
}

fn invalid_step() -> AppError {
    AppError::BadRequest(INVALID_STEP_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::sync::Mutex;

    use crate::models::trip::{TripFields, TripStatus};
    use crate::models::vehicle::{Cargo, TrailerConfiguration};

    #[derive(Default)]
    struct RecordingActions {
        calls: Mutex<Vec<&'static str>>,
    }

    impl RecordingActions {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, name: &'static str, input: &TripInput, draft: bool) -> AppResult<Trip> {
            self.calls.lock().unwrap().push(name);
            let fields = TripFields {
                status: input.status.unwrap_or_default(),
                draft,
                origin_id: input.origin_id,
                destination_id: input.destination_id,
                ..TripFields::default()
            };
            Ok(Trip::from_fields(Uuid::new_v4(), &fields, Utc::now()))
        }
    }

    #[async_trait]
    impl TripActions for RecordingActions {
        async fn create(&self, input: TripInput) -> AppResult<Trip> {
            input.validate_full()?;
            self.record("create", &input, false)
        }

        async fn create_draft(&self, input: TripInput) -> AppResult<Trip> {
            input.validate_draft()?;
            self.record("create_draft", &input, true)
        }

        async fn update(&self, _id: Uuid, input: TripInput) -> AppResult<Trip> {
            input.validate_full()?;
            self.record("update", &input, false)
        }

        async fn update_draft(&self, _id: Uuid, input: TripInput) -> AppResult<Trip> {
            input.validate_draft()?;
            self.record("update_draft", &input, true)
        }
    }

    fn filled_details(wizard: &mut TripWizard) {
        let departed_at = Utc::now();
        wizard.values.status = Some(TripStatus::Scheduled);
        wizard.values.origin_id = Some(1);
        wizard.values.destination_id = Some(2);
        wizard.values.departed_at = Some(departed_at);
        wizard.values.arrived_at = Some(departed_at + Duration::hours(8));
    }

    fn filled_assignment(wizard: &mut TripWizard) {
        wizard.values.driver_id = Some(3);
        wizard.values.truck_id = Some(4);
        wizard.values.semi_trailer_id = Some(5);
    }

    fn semi_trailer(id: i32, cargos: &[(i32, &str)]) -> SemiTrailer {
        SemiTrailer {
            id,
            kind: None,
            configuration: TrailerConfiguration {
                name: "LS".into(),
                number_of_trailers: 1,
            },
            cargos: cargos
                .iter()
                .map(|(id, name)| Cargo {
                    id: *id,
                    name: name.to_string(),
                })
                .collect(),
            trailers: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_next_never_calls_actions() {
        let actions = RecordingActions::default();
        let mut wizard = TripWizard::new();
        filled_details(&mut wizard);

        assert_eq!(wizard.submit(&actions).await.unwrap(), WizardOutcome::Advanced);
        assert_eq!(wizard.step, ASSIGNMENT_STEP);

        filled_assignment(&mut wizard);
        wizard.next().unwrap();
        assert_eq!(wizard.step, REVIEW_STEP);
        assert!(actions.calls().is_empty());
    }

    #[tokio::test]
    async fn test_review_submits_create_then_update() {
        let actions = RecordingActions::default();
        let mut wizard = TripWizard::new();
        filled_details(&mut wizard);
        filled_assignment(&mut wizard);
        wizard.go_to(REVIEW_STEP).unwrap();

        let outcome = wizard.submit(&actions).await.unwrap();
        assert!(matches!(outcome, WizardOutcome::Saved(ref trip) if !trip.draft));
        assert!(wizard.is_update());

        wizard.submit(&actions).await.unwrap();
        assert_eq!(actions.calls(), vec!["create", "update"]);
    }

    #[tokio::test]
    async fn test_save_draft_moves_two_steps_and_back() {
        let actions = RecordingActions::default();
        let mut wizard = TripWizard::new();
        wizard.go_to(ASSIGNMENT_STEP).unwrap();

        let outcome = wizard.save_draft(&actions).await.unwrap();
        assert!(matches!(outcome, WizardOutcome::Saved(ref trip) if trip.draft));
        assert_eq!(wizard.step, ASSIGNMENT_STEP);

        wizard.go_to(REVIEW_STEP).unwrap();
        wizard.save_draft(&actions).await.unwrap();
        assert_eq!(wizard.step, REVIEW_STEP);
        assert_eq!(actions.calls(), vec!["create_draft", "update_draft"]);
    }

    #[tokio::test]
    async fn test_save_draft_not_offered_on_first_step() {
        let actions = RecordingActions::default();
        let mut wizard = TripWizard::new();
        assert!(wizard.save_draft(&actions).await.is_err());
        assert_eq!(wizard.step, DETAILS_STEP);
        assert!(actions.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_draft_resolves_back_to_editable_step() {
        let actions = RecordingActions::default();
        let mut wizard = TripWizard::new();
        wizard.go_to(REVIEW_STEP).unwrap();
        let departed_at = Utc::now();
        wizard.values.departed_at = Some(departed_at);
        wizard.values.arrived_at = Some(departed_at - Duration::hours(1));

        let error = wizard.save_draft(&actions).await.unwrap_err();
        assert_eq!(error.user_message(), REQUIRED_FIELDS_MESSAGE);
        assert_eq!(wizard.step, REVIEW_STEP);
        assert!(actions.calls().is_empty());
    }

    #[tokio::test]
    async fn test_validation_messages_per_step() {
        let mut wizard = TripWizard::new();
        let error = wizard.next().unwrap_err();
        assert!(matches!(error, AppError::Validation(_)));
        assert_eq!(wizard.step, DETAILS_STEP);

        wizard.go_to(ASSIGNMENT_STEP).unwrap();
        let error = wizard.next().unwrap_err();
        assert_eq!(error.user_message(), REQUIRED_FIELDS_MESSAGE);
        assert_eq!(wizard.step, ASSIGNMENT_STEP);
    }

    #[test]
    fn test_go_to_rejects_unknown_and_draft_steps() {
        let mut wizard = TripWizard::new();
        assert!(wizard.go_to(0).is_err());
        assert!(wizard.go_to(REVIEW_STEP + DRAFT_OFFSET - 1).is_err());
        assert!(wizard.go_to(LAST_STEP).is_err());
        assert_eq!(wizard.step, DETAILS_STEP);
        assert!(wizard.go_to(REVIEW_STEP).is_ok());
    }

    #[tokio::test]
    async fn test_submit_from_foreign_step_calls_no_action() {
        let actions = RecordingActions::default();
        for step in [0, REVIEW_STEP + 1, LAST_STEP, LAST_STEP + 1] {
            let mut wizard = TripWizard::new();
            filled_details(&mut wizard);
            filled_assignment(&mut wizard);
            wizard.step = step;

            let error = wizard.submit(&actions).await.unwrap_err();
            assert_eq!(error.user_message(), INVALID_STEP_MESSAGE);
            assert_eq!(wizard.step, step);
        }
        assert!(actions.calls().is_empty());
    }

    #[test]
    fn test_semi_trailer_defaults_first_cargo() {
        let mut wizard = TripWizard::new();
        wizard.select_semi_trailer(&semi_trailer(5, &[(7, "CIMENTO"), (8, "CAL")]));
        assert_eq!(wizard.values.cargo_id, Some(7));

        wizard.values.cargo_id = Some(8);
        wizard.select_semi_trailer(&semi_trailer(5, &[(7, "CIMENTO"), (8, "CAL")]));
        assert_eq!(wizard.values.cargo_id, Some(8));

        wizard.select_semi_trailer(&semi_trailer(6, &[]));
        assert_eq!(wizard.values.cargo_id, None);
    }

    #[test]
    fn test_grouping_fills_assignment() {
        let mut wizard = TripWizard::new();
        let grouping = Grouping {
            id: 1,
            driver_id: 3,
            truck_id: 4,
            semi_trailer_id: 5,
            created_at: Utc::now(),
        };
        wizard.select_grouping(&grouping, Some(&semi_trailer(5, &[(9, "SOJA")])));
        assert_eq!(wizard.values.driver_id, Some(3));
        assert_eq!(wizard.values.truck_id, Some(4));
        assert_eq!(wizard.values.semi_trailer_id, Some(5));
        assert_eq!(wizard.values.cargo_id, Some(9));
    }
}
