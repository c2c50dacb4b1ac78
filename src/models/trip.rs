//! Modelo de Trip
//!
//! Viaje entre dos clients con motorista, cavalo, conjunto y carga asignados.
//! El status no tiene guarda de transición: cualquier valor del enum es válido.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del viaje - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "trip_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    #[default]
    Scheduled,
    Loaded,
    Departure,
    Terminal,
    Unloaded,
    Finished,
}

impl TripStatus {
    pub const ALL: [TripStatus; 6] = [
        TripStatus::Scheduled,
        TripStatus::Loaded,
        TripStatus::Departure,
        TripStatus::Terminal,
        TripStatus::Unloaded,
        TripStatus::Finished,
    ];

    /// Estados contados como "em progresso" en el dashboard
    pub const IN_PROGRESS: [TripStatus; 4] = [
        TripStatus::Loaded,
        TripStatus::Departure,
        TripStatus::Terminal,
        TripStatus::Unloaded,
    ];

    pub fn is_in_progress(self) -> bool {
        Self::IN_PROGRESS.contains(&self)
    }

    /// Etiqueta para exibição
    pub fn label(self) -> &'static str {
        match self {
            TripStatus::Scheduled => "Programada",
            TripStatus::Loaded => "Carregada",
            TripStatus::Departure => "Em viagem",
            TripStatus::Terminal => "No terminal",
            TripStatus::Unloaded => "Descarregada",
            TripStatus::Finished => "Finalizada",
        }
    }
}

/// Trip principal - mapea a la tabla trips
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub status: TripStatus,
    pub draft: bool,
    pub origin_id: Option<i32>,
    pub destination_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub truck_id: Option<i32>,
    pub semi_trailer_id: Option<i32>,
    pub cargo_id: Option<i32>,
    pub departed_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub order: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campos persistidos de un viaje, ya validados y con el grouping resuelto
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFields {
    pub status: TripStatus,
    pub draft: bool,
    pub origin_id: Option<i32>,
    pub destination_id: Option<i32>,
    pub driver_id: Option<i32>,
    pub truck_id: Option<i32>,
    pub semi_trailer_id: Option<i32>,
    pub cargo_id: Option<i32>,
    pub departed_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub order: Option<String>,
}

impl Trip {
    /// Construir un Trip nuevo a partir de los campos
    pub fn from_fields(id: Uuid, fields: &TripFields, now: DateTime<Utc>) -> Self {
        let mut trip = Self {
            id,
            status: fields.status,
            draft: fields.draft,
            origin_id: None,
            destination_id: None,
            driver_id: None,
            truck_id: None,
            semi_trailer_id: None,
            cargo_id: None,
            departed_at: None,
            arrived_at: None,
            note: None,
            order: None,
            created_at: now,
            updated_at: now,
        };
        trip.apply(fields, now);
        trip
    }

    /// Reemplazar los campos editables (el formulario siempre envía el estado completo)
    pub fn apply(&mut self, fields: &TripFields, now: DateTime<Utc>) {
        self.status = fields.status;
        self.draft = fields.draft;
        self.origin_id = fields.origin_id;
        self.destination_id = fields.destination_id;
        self.driver_id = fields.driver_id;
        self.truck_id = fields.truck_id;
        self.semi_trailer_id = fields.semi_trailer_id;
        self.cargo_id = fields.cargo_id;
        self.departed_at = fields.departed_at;
        self.arrived_at = fields.arrived_at;
        self.note = fields.note.clone();
        self.order = fields.order.clone();
        self.updated_at = now;
    }

    /// Referencia alguno de los ids de client indicados
    pub fn references_client(&self, company_id: i32) -> bool {
        self.origin_id == Some(company_id) || self.destination_id == Some(company_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_statuses() {
        let in_progress: Vec<_> = TripStatus::ALL
            .into_iter()
            .filter(|s| s.is_in_progress())
            .collect();
        assert_eq!(in_progress, TripStatus::IN_PROGRESS.to_vec());
        assert!(!TripStatus::Scheduled.is_in_progress());
        assert!(!TripStatus::Finished.is_in_progress());
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&TripStatus::Departure).unwrap(),
            "\"departure\""
        );
        let status: TripStatus = serde_json::from_str("\"unloaded\"").unwrap();
        assert_eq!(status, TripStatus::Unloaded);
    }

    #[test]
    fn test_apply_replaces_fields() {
        let now = Utc::now();
        let mut trip = Trip::from_fields(
            Uuid::new_v4(),
            &TripFields {
                draft: true,
                note: Some("primeira".into()),
                ..TripFields::default()
            },
            now,
        );
        trip.apply(
            &TripFields {
                status: TripStatus::Loaded,
                origin_id: Some(1),
                ..TripFields::default()
            },
            now,
        );
        assert!(!trip.draft);
        assert_eq!(trip.status, TripStatus::Loaded);
        assert_eq!(trip.origin_id, Some(1));
        assert_eq!(trip.note, None);
    }
}
