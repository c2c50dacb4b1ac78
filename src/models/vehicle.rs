//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus especializaciones:
//! Truck (cavalo) y Trailer (carreta), además del agregado SemiTrailer
//! (conjunto de carretas + configuración + cargas).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub id: i32,
    pub license_plate: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<String>,
    pub renavam: Option<String>,
    pub axle: Option<i32>,
    pub unit_id: Option<i32>,
}

/// Truck (unidad tractora)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Truck {
    pub id: i32,
    pub compressor: bool,
    pub vehicle: Vehicle,
    pub created_at: DateTime<Utc>,
}

/// Trailer (unidad de carga)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trailer {
    pub id: i32,
    pub fleet_number: Option<String>,
    pub vehicle: Vehicle,
}

/// Tipo de carga transportada
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cargo {
    pub id: i32,
    pub name: String,
}

/// Configuración del conjunto (ej: "LS" con 1 carreta)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrailerConfiguration {
    pub name: String,
    pub number_of_trailers: i32,
}

/// SemiTrailer - agregado de carretas con configuración y cargas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemiTrailer {
    pub id: i32,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub configuration: TrailerConfiguration,
    pub cargos: Vec<Cargo>,
    pub trailers: Vec<Trailer>,
    pub created_at: DateTime<Utc>,
}

impl SemiTrailer {
    /// Placas de las carretas separadas por " | "
    pub fn plates(&self) -> String {
        self.trailers
            .iter()
            .map(|t| t.vehicle.license_plate.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Primera carga registrada, usada como default en el formulario de viaje
    pub fn default_cargo(&self) -> Option<&Cargo> {
        self.cargos.first()
    }
}
