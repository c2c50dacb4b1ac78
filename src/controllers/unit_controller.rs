use std::sync::Arc;

use tracing::info;
use validator::Validate;

use super::company_controller::CompanyController;
use crate::cache::view_cache::{self, ViewCache};
use crate::dto::unit_dto::{CreateUnitRequest, UpdateUnitRequest};
use crate::models::unit::Unit;
use crate::repositories::unit_repository::{
    UnitRepository, DUPLICATE_IDENTIFIER_MESSAGE, UNIT_NOT_FOUND_MESSAGE,
};
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, ActionKind, AppResult};

pub struct UnitController {
    repository: Arc<dyn UnitRepository>,
    companies: CompanyController,
    cache: ViewCache,
}

impl UnitController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.units.clone(),
            companies: CompanyController::new(state),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Unit>> {
        let key = self.cache.list_key(view_cache::UNITS);
        if let Some(units) = self.cache.get(&key).await {
            return Ok(units);
        }

        let units = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &units).await;
        Ok(units)
    }

    pub async fn get(&self, company_id: i32) -> AppResult<Unit> {
        let key = self.cache.detail_key(view_cache::UNITS, company_id);
        if let Some(unit) = self.cache.get(&key).await {
            return Ok(unit);
        }

        let unit = self
            .repository
            .find_by_company_id(company_id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))?;
        self.cache.set(&key, &unit).await;
        Ok(unit)
    }

    /// Alta de unidad: verifica el identificador, reutiliza la company por
    /// documento y crea la unidad
    pub async fn create(&self, request: CreateUnitRequest) -> AppResult<Unit> {
        self.try_create(request)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, request: CreateUnitRequest) -> AppResult<Unit> {
        let request = request.normalized();
        request.validate()?;

        if let Some(identifier) = &request.identifier {
            if self.repository.identifier_taken(identifier, None).await? {
                return Err(conflict_error(DUPLICATE_IDENTIFIER_MESSAGE));
            }
        }

        let unit = self
            .repository
            .create_with_company(request.identifier.as_deref(), &request.company)
            .await?;
        info!(
            "🏭 Unidad creada: {} ({:?})",
            unit.company.display_name(),
            unit.identifier
        );

        self.cache.invalidate(view_cache::UNITS, unit.company_id).await;
        self.cache.invalidate_list(view_cache::COMPANIES).await;
        Ok(unit)
    }

    pub async fn update(&self, company_id: i32, request: UpdateUnitRequest) -> AppResult<Unit> {
        self.try_update(company_id, request)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, company_id: i32, request: UpdateUnitRequest) -> AppResult<Unit> {
        let request = request.normalized();
        request.validate()?;

        let current = self
            .repository
            .find_by_company_id(company_id)
            .await?
            .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))?;

        let identifier_change = request.identifier_change();
        if let Some(Some(identifier)) = &identifier_change {
            if self
                .repository
                .identifier_taken(identifier, Some(company_id))
                .await?
            {
                return Err(conflict_error(DUPLICATE_IDENTIFIER_MESSAGE));
            }
        }

        if let Some(patch) = request.company.filter(|patch| !patch.is_empty()) {
            self.companies.update(company_id, patch).await?;
        }

        let unit = match identifier_change {
            Some(identifier) if identifier != current.identifier => {
                self.repository
                    .set_identifier(company_id, identifier.as_deref())
                    .await?
            }
            _ => self
                .repository
                .find_by_company_id(company_id)
                .await?
                .ok_or_else(|| not_found_error(UNIT_NOT_FOUND_MESSAGE))?,
        };
        info!("🏭 Unidad actualizada: {}", company_id);

        self.cache.invalidate(view_cache::UNITS, company_id).await;
        Ok(unit)
    }

    pub async fn delete(&self, company_id: i32) -> AppResult<()> {
        self.repository
            .delete(company_id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Unidad excluída: {}", company_id);

        self.cache.invalidate(view_cache::UNITS, company_id).await;
        Ok(())
    }
}
