//! Modelo de Client (origen/destino de viajes)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::company::Company;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub company_id: i32,
    pub company: Company,
    pub created_at: DateTime<Utc>,
}
