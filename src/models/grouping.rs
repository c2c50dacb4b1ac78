//! Modelo de Grouping (motorista + cavalo + conjunto)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Grouping {
    pub id: i32,
    pub driver_id: i32,
    pub truck_id: i32,
    pub semi_trailer_id: i32,
    pub created_at: DateTime<Utc>,
}
