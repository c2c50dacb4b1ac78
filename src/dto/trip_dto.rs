use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::trip::TripStatus;
use crate::utils::errors::field_error;

// Valores del formulario de viaje. Todos opcionales: el esquema completo
// (programar) y el relajado (pré-programar) se aplican encima.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[validate(schema(function = "validate_date_range"))]
pub struct TripInput {
    pub status: Option<TripStatus>,

    pub origin_id: Option<i32>,
    pub destination_id: Option<i32>,

    pub grouping_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub truck_id: Option<i32>,
    pub semi_trailer_id: Option<i32>,
    pub cargo_id: Option<i32>,

    pub departed_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,

    #[validate(length(max = 500))]
    pub note: Option<String>,

    #[validate(length(max = 50))]
    pub order: Option<String>,
}

fn validate_date_range(input: &TripInput) -> Result<(), ValidationError> {
    if let (Some(departed_at), Some(arrived_at)) = (input.departed_at, input.arrived_at) {
        if arrived_at < departed_at {
            let mut error = ValidationError::new("date_range");
            error.message = Some("A chegada deve ser posterior à partida".into());
            return Err(error);
        }
    }
    Ok(())
}

impl TripInput {
    /// Esquema relajado (pré-programação): solo forma y orden de fechas
    pub fn validate_draft(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }

    /// Esquema completo: detalles + asignación obligatorios
    pub fn validate_full(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();
        self.require_details(&mut errors);
        self.require_assignment(&mut errors);
        into_result(errors)
    }

    /// Campos del paso 1 (status, origen/destino, fechas)
    pub fn validate_details(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();
        self.require_details(&mut errors);
        into_result(errors)
    }

    /// Campos del paso 2 (grouping o motorista/cavalo/conjunto)
    pub fn validate_assignment(&self) -> Result<(), ValidationErrors> {
        self.validate()?;

        let mut errors = ValidationErrors::new();
        self.require_assignment(&mut errors);
        into_result(errors)
    }

    fn require_details(&self, errors: &mut ValidationErrors) {
        if self.status.is_none() {
            errors.add("status", field_error("Selecione o status"));
        }
        if self.origin_id.is_none() {
            errors.add("origin_id", field_error("Selecione a origem"));
        }
        if self.destination_id.is_none() {
            errors.add("destination_id", field_error("Selecione o destino"));
        }
        if self.departed_at.is_none() {
            errors.add("departed_at", field_error("Informe a previsão de partida"));
        }
        if self.arrived_at.is_none() {
            errors.add("arrived_at", field_error("Informe a previsão de chegada"));
        }
    }

    fn require_assignment(&self, errors: &mut ValidationErrors) {
        if self.grouping_id.is_some() {
            return;
        }
        if self.driver_id.is_none() {
            errors.add("driver_id", field_error("Selecione o motorista"));
        }
        if self.truck_id.is_none() {
            errors.add("truck_id", field_error("Selecione o cavalo"));
        }
        if self.semi_trailer_id.is_none() {
            errors.add("semi_trailer_id", field_error("Selecione o conjunto"));
        }
    }
}

fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.errors().is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub const DEFAULT_TRIP_LIMIT: i64 = 100;

// Filtros para listado de viajes
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TripFilters {
    pub status: Option<TripStatus>,
    pub draft: Option<bool>,
    pub limit: Option<i64>,
}

impl TripFilters {
    /// Límite aplicado en ambos backends; negativo equivale a cero
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_TRIP_LIMIT).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn complete() -> TripInput {
        let departed_at = Utc::now();
        TripInput {
            status: Some(TripStatus::Scheduled),
            origin_id: Some(1),
            destination_id: Some(2),
            driver_id: Some(3),
            truck_id: Some(4),
            semi_trailer_id: Some(5),
            departed_at: Some(departed_at),
            arrived_at: Some(departed_at + Duration::hours(10)),
            ..TripInput::default()
        }
    }

    #[test]
    fn test_filters_limit() {
        let mut filters = TripFilters::default();
        assert_eq!(filters.effective_limit(), DEFAULT_TRIP_LIMIT);

        filters.limit = Some(-5);
        assert_eq!(filters.effective_limit(), 0);

        filters.limit = Some(3);
        assert_eq!(filters.effective_limit(), 3);
    }

    #[test]
    fn test_full_schema_accepts_complete_trip() {
        assert!(complete().validate_full().is_ok());
    }

    #[test]
    fn test_full_schema_requires_assignment() {
        let mut input = complete();
        input.truck_id = None;
        let errors = input.validate_full().unwrap_err();
        assert!(errors.field_errors().contains_key("truck_id"));
    }

    #[test]
    fn test_grouping_replaces_manual_assignment() {
        let mut input = complete();
        input.driver_id = None;
        input.truck_id = None;
        input.semi_trailer_id = None;
        input.grouping_id = Some(9);
        assert!(input.validate_full().is_ok());
    }

    #[test]
    fn test_draft_schema_accepts_empty_form() {
        assert!(TripInput::default().validate_draft().is_ok());
        assert!(TripInput::default().validate_full().is_err());
    }

    #[test]
    fn test_arrival_before_departure_is_rejected_in_both_schemas() {
        let mut input = complete();
        input.arrived_at = input.departed_at.map(|d| d - Duration::hours(1));
        assert!(input.validate_full().is_err());
        assert!(input.validate_draft().is_err());
    }
}
