use serde::{Deserialize, Serialize};
use validator::Validate;

use super::company_dto::{CompanyInput, CompanyPatch};

// Request para crear un client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate]
    pub company: CompanyInput,
}

// Request para actualizar un client
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate]
    pub company: Option<CompanyPatch>,
}
