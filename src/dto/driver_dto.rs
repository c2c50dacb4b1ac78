use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::{
    normalize_optional, only_digits, validate_cnh, validate_cpf, validate_not_empty,
    validate_phone,
};

// Datos de la persona que envuelve el driver
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct PersonInput {
    #[validate(length(min = 1, max = 255, message = "Informe o nome"), custom = "validate_not_empty")]
    pub name: String,

    #[validate(length(max = 100))]
    pub nickname: Option<String>,

    #[validate(custom = "validate_cpf")]
    pub document: String,

    #[validate(custom = "validate_phone")]
    pub phone_number: Option<String>,

    pub unit_id: Option<i32>,
}

// Request para crear un driver
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate]
    pub person: PersonInput,

    #[validate(custom = "validate_cnh")]
    pub cnh: String,
}

impl CreateDriverRequest {
    pub fn normalized(self) -> Self {
        Self {
            person: PersonInput {
                name: self.person.name.trim().to_uppercase(),
                nickname: normalize_optional(self.person.nickname.as_deref())
                    .map(|n| n.to_uppercase()),
                document: only_digits(&self.person.document),
                phone_number: self.person.phone_number.map(|p| only_digits(&p)),
                unit_id: self.person.unit_id,
            },
            cnh: only_digits(&self.cnh),
        }
    }
}

// Datos parciales de la persona
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct PersonPatch {
    #[validate(length(min = 1, max = 255, message = "Informe o nome"))]
    pub name: Option<String>,

    #[validate(length(max = 100))]
    pub nickname: Option<String>,

    #[validate(custom = "validate_cpf")]
    pub document: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone_number: Option<String>,

    pub unit_id: Option<i32>,
}

// Request para actualizar un driver
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate]
    pub person: Option<PersonPatch>,

    #[validate(custom = "validate_cnh")]
    pub cnh: Option<String>,
}

impl UpdateDriverRequest {
    pub fn normalized(self) -> Self {
        Self {
            person: self.person.map(|p| PersonPatch {
                name: p.name.map(|n| n.trim().to_uppercase()),
                nickname: p.nickname.map(|n| n.trim().to_uppercase()),
                document: p.document.map(|d| only_digits(&d)),
                phone_number: p.phone_number.map(|n| only_digits(&n)),
                unit_id: p.unit_id,
            }),
            cnh: self.cnh.map(|c| only_digits(&c)),
        }
    }
}
