//! Modelo de Company
//!
//! Este módulo contiene el struct Company (persona jurídica o física) y su
//! dirección. Mapea a las tablas `companies` y `addresses` (1:1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Tipo de documento - mapea al ENUM document_type
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "document_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Cnpj,
    Cpf,
}

impl DocumentType {
    /// Cantidad de dígitos esperada
    pub fn digits(self) -> usize {
        match self {
            DocumentType::Cnpj => 14,
            DocumentType::Cpf => 11,
        }
    }
}

/// Dirección de una company
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub locale: Option<String>,
}

/// Company principal - mapea a la tabla companies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub trade_name: Option<String>,
    pub document: String,
    pub document_type: DocumentType,
    pub address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Nombre fantasía si existe, si no la razón social
    pub fn display_name(&self) -> &str {
        self.trade_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn city(&self) -> Option<&str> {
        self.address.as_ref().and_then(|a| a.city.as_deref())
    }

    pub fn state(&self) -> Option<&str> {
        self.address.as_ref().and_then(|a| a.state.as_deref())
    }
}
