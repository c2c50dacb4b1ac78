use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::cache::view_cache::{self, ViewCache};
use crate::dto::company_dto::{CompanyInput, CompanyPatch};
use crate::models::company::Company;
use crate::repositories::company_repository::{
    CompanyRepository, COMPANY_NOT_FOUND_MESSAGE, DUPLICATE_DOCUMENT_MESSAGE,
};
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, ActionKind, AppResult};

pub struct CompanyController {
    repository: Arc<dyn CompanyRepository>,
    cache: ViewCache,
}

impl CompanyController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.companies.clone(),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Company>> {
        let key = self.cache.list_key(view_cache::COMPANIES);
        if let Some(companies) = self.cache.get(&key).await {
            return Ok(companies);
        }

        let companies = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &companies).await;
        Ok(companies)
    }

    pub async fn get(&self, id: i32) -> AppResult<Company> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(COMPANY_NOT_FOUND_MESSAGE))
    }

    /// Alta por documento: si ya existe una company con ese documento se
    /// devuelve la existente sin cambios
    pub async fn create(&self, input: CompanyInput) -> AppResult<Company> {
        self.try_create(input)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, input: CompanyInput) -> AppResult<Company> {
        let input = input.normalized();
        input.validate()?;

        let company = self.repository.upsert_by_document(&input).await?;
        info!("🏢 Empresa registrada: {} ({})", company.name, company.id);

        self.cache.invalidate(view_cache::COMPANIES, company.id).await;
        Ok(company)
    }

    /// Actualiza los datos de la company. Usado también por unidades y clientes.
    pub async fn update(&self, id: i32, patch: CompanyPatch) -> AppResult<Company> {
        self.try_update(id, patch)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, id: i32, patch: CompanyPatch) -> AppResult<Company> {
        let patch = patch.normalized();
        patch.validate()?;

        if patch.document.is_some() || patch.document_type.is_some() {
            let current = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| not_found_error(COMPANY_NOT_FOUND_MESSAGE))?;
            patch.validate_against(&current)?;
        }

        if let Some(document) = &patch.document {
            if self.repository.document_taken(document, Some(id)).await? {
                return Err(conflict_error(DUPLICATE_DOCUMENT_MESSAGE));
            }
        }

        let company = self.repository.update(id, &patch).await?;
        info!("🏢 Empresa actualizada: {} ({})", company.name, company.id);

        self.invalidate(id).await;
        Ok(company)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository
            .delete(id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Empresa excluída: {}", id);

        self.invalidate(id).await;
        Ok(())
    }

    /// La company aparece embebida en unidades y clientes
    async fn invalidate(&self, id: i32) {
        self.cache.invalidate(view_cache::COMPANIES, id).await;
        self.cache.invalidate(view_cache::UNITS, id).await;
        self.cache.invalidate(view_cache::CLIENTS, id).await;
    }
}
