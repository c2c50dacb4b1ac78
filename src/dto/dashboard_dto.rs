use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::trip::TripStatus;

// Contadores del dashboard
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardCounts {
    pub scheduled: i64,
    pub in_progress: i64,
    pub finished: i64,
    pub drafts: i64,
}

// Un día de la visión general (7 días)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OverviewDay {
    /// "seg. 19/10"
    pub weekday: String,
    pub date: NaiveDate,
    pub departures: i64,
    pub arrivals: i64,
}

// Extremo de un viaje para exhibición
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripEndpoint {
    pub name: Option<String>,
    /// "CURITIBA, PR"
    pub location: Option<String>,
}

// Viaje en andamento resumido
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripInProgress {
    pub id: Uuid,
    pub status: TripStatus,
    pub truck_plate: Option<String>,
    pub trailer_plates: Option<String>,
    pub origin: TripEndpoint,
    pub destination: TripEndpoint,
}

// Response completa del dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardResponse {
    pub counts: DashboardCounts,
    pub overview: Vec<OverviewDay>,
    pub in_progress: Vec<TripInProgress>,
}
