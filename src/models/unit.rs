//! Modelo de Unit (unidade operacional)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::company::Company;

/// Unit - una por company, identificada por `company_id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    pub company_id: i32,
    pub identifier: Option<String>,
    pub company: Company,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
