use serde::{Deserialize, Serialize};
use validator::Validate;

use super::company_dto::{AddressInput, CompanyInput, CompanyPatch};
use crate::models::company::DocumentType;
use crate::utils::validation::normalize_upper;

// Request para crear una unidad
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUnitRequest {
    #[validate(length(max = 20))]
    pub identifier: Option<String>,

    #[validate]
    pub company: CompanyInput,
}

impl CreateUnitRequest {
    /// Identificador en mayúsculas y sin espacios; vacío equivale a ausente
    pub fn normalized(self) -> Self {
        Self {
            identifier: normalize_upper(self.identifier.as_deref()),
            company: self.company.normalized(),
        }
    }
}

// Request para actualizar una unidad (keyed por company_id en la ruta).
// `identifier` ausente no cambia; `""` lo limpia.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateUnitRequest {
    #[validate(length(max = 20))]
    pub identifier: Option<String>,

    #[validate]
    pub company: Option<CompanyPatch>,
}

impl UpdateUnitRequest {
    /// Trim del identificador (vacío se conserva para limpiar) y de la company
    pub fn normalized(self) -> Self {
        Self {
            identifier: self.identifier.map(|i| i.trim().to_uppercase()),
            company: self.company.map(CompanyPatch::normalized),
        }
    }

    /// `None` = sin cambios, `Some(None)` = limpiar, `Some(Some(id))` = asignar
    pub fn identifier_change(&self) -> Option<Option<String>> {
        self.identifier
            .as_deref()
            .map(|identifier| normalize_upper(Some(identifier)))
    }
}

// Fila de la planilla de importación de unidades
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UnitImportRow {
    #[serde(rename = "Nome")]
    pub name: Option<String>,
    #[serde(rename = "Nome fantasia")]
    pub trade_name: Option<String>,
    #[serde(rename = "CNPJ")]
    pub document: Option<String>,
    #[serde(rename = "CEP")]
    pub zip_code: Option<String>,
    #[serde(rename = "Estado")]
    pub state: Option<String>,
    #[serde(rename = "Cidade")]
    pub city: Option<String>,
    #[serde(rename = "Endereço")]
    pub locale: Option<String>,
}

impl From<UnitImportRow> for CreateUnitRequest {
    fn from(row: UnitImportRow) -> Self {
        Self {
            identifier: None,
            company: CompanyInput {
                name: row.name.unwrap_or_default(),
                trade_name: row.trade_name,
                document: row.document.unwrap_or_default(),
                document_type: DocumentType::Cnpj,
                address: Some(AddressInput {
                    zip_code: row.zip_code,
                    state: row.state,
                    city: row.city,
                    locale: row.locale,
                }),
            },
        }
    }
}

// Error de una fila importada (1-based)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
}

// Resultado de la importación
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportReport {
    pub created: usize,
    pub failed: Vec<ImportRowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_change() {
        let keep = UpdateUnitRequest::default();
        assert_eq!(keep.identifier_change(), None);

        let clear = UpdateUnitRequest {
            identifier: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(clear.identifier_change(), Some(None));

        let set = UpdateUnitRequest {
            identifier: Some(" stz".into()),
            ..Default::default()
        };
        assert_eq!(set.identifier_change(), Some(Some("STZ".into())));
    }

    #[test]
    fn test_update_length_checked_after_trim() {
        let padded = UpdateUnitRequest {
            identifier: Some(format!("   {}   ", "x".repeat(20))),
            ..Default::default()
        };
        assert!(padded.clone().validate().is_err());

        let request = padded.normalized();
        assert!(request.validate().is_ok());
        assert_eq!(request.identifier_change(), Some(Some("X".repeat(20))));
    }
}
