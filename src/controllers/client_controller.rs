use std::sync::Arc;

use tracing::info;
use validator::Validate;

use super::company_controller::CompanyController;
use crate::cache::view_cache::{self, ViewCache};
use crate::dto::client_dto::{CreateClientRequest, UpdateClientRequest};
use crate::models::client::Client;
use crate::repositories::client_repository::{ClientRepository, CLIENT_NOT_FOUND_MESSAGE};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, ActionKind, AppResult};

pub struct ClientController {
    repository: Arc<dyn ClientRepository>,
    companies: CompanyController,
    cache: ViewCache,
}

impl ClientController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repositories.clients.clone(),
            companies: CompanyController::new(state),
            cache: state.cache.clone(),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Client>> {
        let key = self.cache.list_key(view_cache::CLIENTS);
        if let Some(clients) = self.cache.get(&key).await {
            return Ok(clients);
        }

        let clients = self
            .repository
            .list_all()
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?;
        self.cache.set(&key, &clients).await;
        Ok(clients)
    }

    pub async fn get(&self, company_id: i32) -> AppResult<Client> {
        let key = self.cache.detail_key(view_cache::CLIENTS, company_id);
        if let Some(client) = self.cache.get(&key).await {
            return Ok(client);
        }

        let client = self
            .repository
            .find_by_company_id(company_id)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))?
            .ok_or_else(|| not_found_error(CLIENT_NOT_FOUND_MESSAGE))?;
        self.cache.set(&key, &client).await;
        Ok(client)
    }

    pub async fn create(&self, request: CreateClientRequest) -> AppResult<Client> {
        self.try_create(request)
            .await
            .map_err(|e| e.for_action(ActionKind::Create))
    }

    async fn try_create(&self, request: CreateClientRequest) -> AppResult<Client> {
        let request = CreateClientRequest {
            company: request.company.normalized(),
        };
        request.validate()?;

        let client = self.repository.create_with_company(&request.company).await?;
        info!("🤝 Cliente criado: {}", client.company.display_name());

        self.cache.invalidate(view_cache::CLIENTS, client.company_id).await;
        self.cache.invalidate_list(view_cache::COMPANIES).await;
        Ok(client)
    }

    pub async fn update(&self, company_id: i32, request: UpdateClientRequest) -> AppResult<Client> {
        self.try_update(company_id, request)
            .await
            .map_err(|e| e.for_action(ActionKind::Update))
    }

    async fn try_update(&self, company_id: i32, request: UpdateClientRequest) -> AppResult<Client> {
        request.validate()?;

        if self.repository.find_by_company_id(company_id).await?.is_none() {
            return Err(not_found_error(CLIENT_NOT_FOUND_MESSAGE));
        }

        if let Some(patch) = request.company.filter(|patch| !patch.is_empty()) {
            self.companies.update(company_id, patch).await?;
        }

        let client = self
            .repository
            .find_by_company_id(company_id)
            .await?
            .ok_or_else(|| not_found_error(CLIENT_NOT_FOUND_MESSAGE))?;

        self.cache.invalidate(view_cache::CLIENTS, company_id).await;
        Ok(client)
    }

    pub async fn delete(&self, company_id: i32) -> AppResult<()> {
        self.repository
            .delete(company_id)
            .await
            .map_err(|e| e.for_action(ActionKind::Delete))?;
        info!("🗑️ Cliente excluído: {}", company_id);

        self.cache.invalidate(view_cache::CLIENTS, company_id).await;
        Ok(())
    }
}
