//! Modelo de Driver
//!
//! Un driver envuelve una persona (`people`) y agrega el número de CNH.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persona física
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub nickname: Option<String>,
    pub document: String,
    pub phone_number: Option<String>,
    pub unit_id: Option<i32>,
}

/// Driver principal - mapea a la tabla drivers (PK = person_id)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Driver {
    pub person_id: i32,
    pub cnh: String,
    pub person: Person,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    /// Apodo si existe, si no el nombre
    pub fn display_name(&self) -> &str {
        self.person.nickname.as_deref().unwrap_or(&self.person.name)
    }
}
