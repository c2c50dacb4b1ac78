use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::company::{Address, Company, DocumentType};
use crate::utils::validation::{
    normalize_optional, only_digits, validate_document, validate_not_empty, validate_zip_code,
};

// Dirección enviada junto con la company
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct AddressInput {
    #[validate(custom = "validate_zip_code")]
    pub zip_code: Option<String>,

    #[validate(length(max = 100))]
    pub state: Option<String>,

    #[validate(length(max = 100))]
    pub city: Option<String>,

    #[validate(length(max = 255))]
    pub locale: Option<String>,
}

impl AddressInput {
    pub fn normalized(self) -> Self {
        Self {
            zip_code: normalize_optional(self.zip_code.as_deref()),
            state: normalize_optional(self.state.as_deref()),
            city: normalize_optional(self.city.as_deref()),
            locale: normalize_optional(self.locale.as_deref()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.zip_code.is_none() && self.state.is_none() && self.city.is_none() && self.locale.is_none()
    }
}

impl From<AddressInput> for Address {
    fn from(input: AddressInput) -> Self {
        Self {
            zip_code: input.zip_code,
            state: input.state,
            city: input.city,
            locale: input.locale,
        }
    }
}

// Request para crear (o reutilizar por documento) una company
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[validate(schema(function = "validate_document_type"))]
pub struct CompanyInput {
    #[validate(length(min = 1, max = 255, message = "Informe o nome"), custom = "validate_not_empty")]
    pub name: String,

    #[validate(length(max = 255))]
    pub trade_name: Option<String>,

    #[validate(custom = "validate_document")]
    pub document: String,

    #[serde(default)]
    pub document_type: DocumentType,

    #[validate]
    pub address: Option<AddressInput>,
}

impl CompanyInput {
    /// Trim de los textos, documento solo con dígitos
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            trade_name: normalize_optional(self.trade_name.as_deref()),
            document: only_digits(&self.document),
            document_type: self.document_type,
            address: self
                .address
                .map(AddressInput::normalized)
                .filter(|a| !a.is_empty()),
        }
    }
}

fn validate_document_type(input: &CompanyInput) -> Result<(), ValidationError> {
    check_document_type(&input.document, input.document_type)
}

fn check_document_type(document: &str, document_type: DocumentType) -> Result<(), ValidationError> {
    if only_digits(document).len() != document_type.digits() {
        let mut error = ValidationError::new("document_type");
        error.message = Some(match document_type {
            DocumentType::Cnpj => "CNPJ deve ter 14 dígitos".into(),
            DocumentType::Cpf => "CPF deve ter 11 dígitos".into(),
        });
        return Err(error);
    }
    Ok(())
}

// Request para actualizar una company (todos los campos opcionales)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[validate(schema(function = "validate_patch_document_type"))]
pub struct CompanyPatch {
    #[validate(length(min = 1, max = 255, message = "Informe o nome"))]
    pub name: Option<String>,

    #[validate(length(max = 255))]
    pub trade_name: Option<String>,

    #[validate(custom = "validate_document")]
    pub document: Option<String>,

    pub document_type: Option<DocumentType>,

    #[validate]
    pub address: Option<AddressInput>,
}

impl CompanyPatch {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            trade_name: self.trade_name.map(|t| t.trim().to_string()),
            document: self.document.map(|d| only_digits(&d)),
            document_type: self.document_type,
            address: self.address.map(AddressInput::normalized),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Documento y tipo efectivos tras aplicar el patch sobre la company actual
    pub fn validate_against(&self, current: &Company) -> Result<(), ValidationErrors> {
        if self.document.is_none() && self.document_type.is_none() {
            return Ok(());
        }

        let document = self.document.as_deref().unwrap_or(&current.document);
        let document_type = self.document_type.unwrap_or(current.document_type);
        check_document_type(document, document_type).map_err(|error| {
            let mut errors = ValidationErrors::new();
            errors.add("document_type", error);
            errors
        })
    }
}

fn validate_patch_document_type(patch: &CompanyPatch) -> Result<(), ValidationError> {
    match (&patch.document, patch.document_type) {
        (Some(document), Some(document_type)) => check_document_type(document, document_type),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(document: &str) -> CompanyInput {
        CompanyInput {
            name: "COMIX TRANSPORTES LTDA".into(),
            trade_name: Some("COMIX SANTA CATARINA".into()),
            document: document.into(),
            document_type: DocumentType::Cnpj,
            address: Some(AddressInput {
                zip_code: Some("88745-000".into()),
                state: Some("SANTA CATARINA".into()),
                city: Some("CAPIVARI DE BAIXO".into()),
                locale: Some(" RODOVIA BR 101 ".into()),
            }),
        }
    }

    #[test]
    fn test_company_input_valid() {
        assert!(company("86.447.224/0001-61").validate().is_ok());
    }

    #[test]
    fn test_company_input_rejects_cpf_length_for_cnpj() {
        let errors = company("10640254047").validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn test_company_input_rejects_blank_name() {
        let mut input = company("86447224000161");
        input.name = "   ".into();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_normalized_strips_document_mask() {
        let input = company("86.447.224/0001-61").normalized();
        assert_eq!(input.document, "86447224000161");
        assert_eq!(
            input.address.unwrap().locale.as_deref(),
            Some("RODOVIA BR 101")
        );
    }

    fn stored(document: &str, document_type: DocumentType) -> Company {
        let now = chrono::Utc::now();
        Company {
            id: 1,
            name: "COMIX TRANSPORTES LTDA".into(),
            trade_name: None,
            document: document.into(),
            document_type,
            address: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_patch_document_checked_against_stored_type() {
        let current = stored("86447224000161", DocumentType::Cnpj);

        let only_document = CompanyPatch {
            document: Some("10640254047".into()),
            ..Default::default()
        };
        assert!(only_document.validate().is_ok());
        let errors = only_document.validate_against(&current).unwrap_err();
        assert!(errors.field_errors().contains_key("document_type"));

        let only_type = CompanyPatch {
            document_type: Some(DocumentType::Cpf),
            ..Default::default()
        };
        assert!(only_type.validate_against(&current).is_err());

        let both = CompanyPatch {
            document: Some("10640254047".into()),
            document_type: Some(DocumentType::Cpf),
            ..Default::default()
        };
        assert!(both.validate_against(&current).is_ok());
        assert!(CompanyPatch::default().validate_against(&current).is_ok());
    }

    #[test]
    fn test_empty_address_is_dropped() {
        let mut input = company("86447224000161");
        input.address = Some(AddressInput::default());
        assert!(input.normalized().address.is_none());
    }
}
